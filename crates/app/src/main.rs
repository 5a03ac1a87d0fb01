mod terminal;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use services::{
    Debrief, DebriefService, HistoryService, HistoryStore, HistoryTotals, SessionConfig,
    SessionOutcome, SessionRunner,
};
use tracing_subscriber::EnvFilter;
use workout_core::time::format_elapsed;

use terminal::TerminalCues;

#[derive(Debug)]
enum ArgsError {
    InvalidStore { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidStore { raw } => write!(
                f,
                "invalid --store value: {raw} (expected `memory`, `sqlite:<path>` or a .json file)"
            ),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Parser)]
#[command(
    name = "deck",
    about = "Bodyweight workout driven by a shuffled deck of cards",
    long_about = "Every card is a set: hearts are push-ups, diamonds dips, spades crunches, \
clubs burpees. The rank is the rep count (J 11, Q 12, K 13, A 15)."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// History store: `memory`, `sqlite:<path>`, or a path to a .json file
    #[arg(long, global = true, env = "DECK_STORE", default_value = "sqlite://deck.sqlite3")]
    store: String,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Work through a freshly shuffled deck
    Run(RunArgs),
    /// List past workouts, newest first
    History,
    /// Tactical debrief for the most recent workout
    Debrief,
    /// Ask the coach something
    Coach {
        /// Message for the coach
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Delete every stored workout
    ClearHistory,
}

#[derive(Args)]
struct RunArgs {
    /// Pause between drawing a card and starting its set
    #[arg(long, default_value_t = 1_000)]
    presentation_ms: u64,

    /// Draw the next card automatically this long after a card is cleared
    #[arg(long)]
    auto_advance_ms: Option<u64>,

    /// Generate one rep every N ms instead of waiting for Enter
    #[arg(long)]
    simulate_reps_ms: Option<u64>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_store(raw: &str) -> Result<HistoryStore, ArgsError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("memory") {
        return Ok(HistoryStore::Memory);
    }
    if trimmed.starts_with("sqlite:") {
        return Ok(HistoryStore::Sqlite(normalize_sqlite_url(trimmed.to_string())));
    }
    if Path::new(trimmed)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        return Ok(HistoryStore::JsonFile(PathBuf::from(trimmed)));
    }
    Err(ArgsError::InvalidStore {
        raw: raw.to_string(),
    })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// sqlx will not create the database file itself.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidStore {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidStore {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_history(raw: &str) -> Result<HistoryService, Box<dyn std::error::Error>> {
    let store = parse_store(raw)?;
    if let HistoryStore::Sqlite(url) = &store {
        prepare_sqlite_file(url)?;
    }
    tracing::debug!(?store, "opening history store");
    Ok(HistoryService::open(&store).await?)
}

async fn run_session(
    history: HistoryService,
    args: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = SessionConfig::default()
        .with_presentation_delay(Duration::from_millis(args.presentation_ms))
        .with_auto_advance(args.auto_advance_ms.map(Duration::from_millis));
    let cues = Arc::new(TerminalCues);
    let runner = SessionRunner::new(history)
        .with_config(config)
        .with_announcer(cues.clone())
        .with_cues(cues);

    let handle = runner.start_new();
    let control = handle.control().clone();
    let simulate = args.simulate_reps_ms.map(Duration::from_millis);

    if simulate.is_some() {
        println!("Deck shuffled. Reps are simulated; Enter draws the next card, q quits.");
    } else {
        println!("Deck shuffled. Enter starts, logs a rep, or draws the next card. q quits.");
    }

    let input = tokio::spawn(terminal::drive_from_input(
        control.clone(),
        terminal::spawn_line_reader(),
        simulate.is_some(),
    ));
    let simulator = simulate.map(|period| tokio::spawn(terminal::simulate_reps(control, period)));

    let outcome = handle.finished().await?;
    input.abort();
    if let Some(simulator) = simulator {
        simulator.abort();
    }

    match outcome {
        SessionOutcome::Completed(stats) => {
            terminal::print_summary(&stats);
            let debrief = DebriefService::from_env();
            println!("\n{}", debrief.summarize(&stats).await);
        }
        SessionOutcome::Abandoned => println!("\nSession abandoned. Nothing was saved."),
    }
    Ok(())
}

async fn show_history(history: &HistoryService) {
    let workouts = history.load_history().await;
    if workouts.is_empty() {
        println!("No workouts yet.");
        return;
    }
    for stats in &workouts {
        println!(
            "{}  {}  {:>5}  {:>3} reps  {:>2} cards  form {:.0}",
            stats.id().short(),
            stats.date().format("%Y-%m-%d %H:%M"),
            format_elapsed(stats.duration_secs()),
            stats.total_reps(),
            stats.cards_completed(),
            stats.average_form_score(),
        );
    }
    let totals = HistoryTotals::from_history(&workouts);
    println!(
        "\n{} sessions, {} reps, {} total",
        totals.sessions,
        totals.total_reps,
        format_elapsed(totals.total_duration_secs)
    );
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let history = open_history(&cli.store).await?;

    match cli.command {
        Command::Run(args) => run_session(history, &args).await,
        Command::History => {
            show_history(&history).await;
            Ok(())
        }
        Command::Debrief => {
            match history.latest().await {
                Some(stats) => println!("{}", DebriefService::from_env().summarize(&stats).await),
                None => println!("No workouts yet."),
            }
            Ok(())
        }
        Command::Coach { message } => {
            let reply = DebriefService::from_env()
                .coach_reply(&message.join(" "))
                .await;
            println!("{reply}");
            Ok(())
        }
        Command::ClearHistory => {
            history.clear().await?;
            println!("History cleared.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_values_select_backend() {
        assert_eq!(parse_store("memory").unwrap(), HistoryStore::Memory);
        assert_eq!(
            parse_store("/tmp/history.json").unwrap(),
            HistoryStore::JsonFile(PathBuf::from("/tmp/history.json"))
        );
        assert_eq!(
            parse_store("sqlite:///var/deck.sqlite3").unwrap(),
            HistoryStore::Sqlite("sqlite:///var/deck.sqlite3".into())
        );
        assert!(parse_store("deck.txt").is_err());
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:deck.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("deck.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "deck",
            "--store",
            "memory",
            "run",
            "--auto-advance-ms",
            "500",
            "--simulate-reps-ms",
            "200",
        ])
        .unwrap();
        assert_eq!(cli.store, "memory");
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.presentation_ms, 1_000);
        assert_eq!(args.auto_advance_ms, Some(500));
        assert_eq!(args.simulate_reps_ms, Some(200));
    }
}
