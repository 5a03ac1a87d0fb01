use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use workout_core::model::WorkoutStats;

use crate::error::DebriefError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub const SUMMARY_NOT_CONFIGURED: &str =
    "Mission accomplished. Secure the API Key to receive a tactical debrief.";
pub const SUMMARY_FAILED: &str = "Communication link disrupted. Outstanding effort regardless.";
pub const SUMMARY_EMPTY: &str = "Good work, soldier.";
pub const COACH_NOT_CONFIGURED: &str = "Coach radio is offline. Check API Key.";
pub const COACH_FAILED: &str = "Static on the line. Repeat last.";
pub const COACH_EMPTY: &str = "Copy that.";

const SUMMARY_SYSTEM: &str = "You are a hardcore military drill instructor for a fitness app \
called 'The Deck'. The user just finished a deck-of-cards workout. \
Give a short, punchy, motivational debrief (max 3 sentences). \
Use military jargon mixed with fitness encouragement. \
If they did a lot of burpees, commend their soul.";
const COACH_SYSTEM: &str = "You are 'The Deck' Coach. An elite physical trainer. \
You are tough but fair. You provide concise, actionable advice on bodyweight exercises \
(Pushups, Dips, Crunches, Burpees). \
Keep answers under 50 words unless asked for a detailed guide.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebriefConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl DebriefConfig {
    /// Reads `DECK_AI_API_KEY`, `DECK_AI_BASE_URL` and `DECK_AI_MODEL`.
    /// Returns `None` when no usable key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("DECK_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("DECK_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("DECK_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Natural-language feedback after a workout.
///
/// Both calls always yield text; failures surface as fallback lines.
#[async_trait]
pub trait Debrief: Send + Sync {
    async fn summarize(&self, stats: &WorkoutStats) -> String;

    async fn coach_reply(&self, message: &str) -> String;
}

#[derive(Clone)]
pub struct DebriefService {
    client: Client,
    config: Option<DebriefConfig>,
}

impl DebriefService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(DebriefConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<DebriefConfig>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, DebriefError> {
        let config = self.config.as_ref().ok_or(DebriefError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DebriefError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(DebriefError::EmptyResponse)?;

        Ok(content)
    }

    fn settle(
        result: Result<String, DebriefError>,
        not_configured: &str,
        failed: &str,
        empty: &str,
    ) -> String {
        match result {
            Ok(text) => text,
            Err(DebriefError::Disabled) => not_configured.to_string(),
            Err(DebriefError::EmptyResponse) => empty.to_string(),
            Err(error) => {
                tracing::warn!(%error, "debrief request failed");
                failed.to_string()
            }
        }
    }
}

#[async_trait]
impl Debrief for DebriefService {
    async fn summarize(&self, stats: &WorkoutStats) -> String {
        let result = self.generate(SUMMARY_SYSTEM, &debrief_prompt(stats)).await;
        Self::settle(result, SUMMARY_NOT_CONFIGURED, SUMMARY_FAILED, SUMMARY_EMPTY)
    }

    async fn coach_reply(&self, message: &str) -> String {
        let result = self.generate(COACH_SYSTEM, message).await;
        Self::settle(result, COACH_NOT_CONFIGURED, COACH_FAILED, COACH_EMPTY)
    }
}

/// User prompt describing a finished workout.
#[must_use]
pub fn debrief_prompt(stats: &WorkoutStats) -> String {
    let secs = stats.duration_secs();
    let mut prompt = format!(
        "Workout complete.\nDuration: {}m {}s\nTotal reps: {}\nCards completed: {}\n",
        secs / 60,
        secs % 60,
        stats.total_reps(),
        stats.cards_completed(),
    );
    for (exercise, reps) in stats.reps_by_exercise().iter() {
        prompt.push_str(&format!("{exercise}: {reps}\n"));
    }
    prompt
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
