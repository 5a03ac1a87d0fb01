use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("unknown rank: {0}")]
    UnknownRank(String),

    #[error("unknown suit: {0}")]
    UnknownSuit(String),

    #[error("unknown exercise: {0}")]
    UnknownExercise(String),
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// Bodyweight movement assigned to a card through its suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Exercise {
    #[serde(rename = "Push-Ups")]
    PushUps,
    #[serde(rename = "Dips")]
    Dips,
    #[serde(rename = "Crunches")]
    Crunches,
    #[serde(rename = "Burpees")]
    Burpees,
}

impl Exercise {
    pub const ALL: [Exercise; 4] = [
        Exercise::PushUps,
        Exercise::Dips,
        Exercise::Crunches,
        Exercise::Burpees,
    ];

    /// Name used for announcements and persisted keys.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Exercise::PushUps => "Push-Ups",
            Exercise::Dips => "Dips",
            Exercise::Crunches => "Crunches",
            Exercise::Burpees => "Burpees",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Exercise {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exercise::ALL
            .into_iter()
            .find(|e| e.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CardError::UnknownExercise(s.to_string()))
    }
}

//
// ─── SUIT ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suit {
    Hearts,
    Diamonds,
    Spades,
    Clubs,
}

impl Suit {
    /// Canonical enumeration order used when generating a deck.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Spades, Suit::Clubs];

    #[must_use]
    pub fn exercise(self) -> Exercise {
        match self {
            Suit::Hearts => Exercise::PushUps,
            Suit::Diamonds => Exercise::Dips,
            Suit::Spades => Exercise::Crunches,
            Suit::Clubs => Exercise::Burpees,
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Spades => '♠',
            Suit::Clubs => '♣',
        }
    }
}

impl FromStr for Suit {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEARTS" => Ok(Suit::Hearts),
            "DIAMONDS" => Ok(Suit::Diamonds),
            "SPADES" => Ok(Suit::Spades),
            "CLUBS" => Ok(Suit::Clubs),
            _ => Err(CardError::UnknownSuit(s.to_string())),
        }
    }
}

//
// ─── RANK ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Canonical enumeration order within a suit.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    /// Rep target for this rank.
    ///
    /// Number cards count as printed and courts count 11 to 13. The ace is
    /// worth 15, above the king.
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 15,
        }
    }
}

impl FromStr for Rank {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Rank::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CardError::UnknownRank(s.to_string()))
    }
}

//
// ─── CARD ──────────────────────────────────────────────────────────────────────
//

/// One deck unit: a suit/rank pair with its derived exercise and rep target.
///
/// `value` and `exercise` are computed from `rank` and `suit` at construction
/// and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    suit: Suit,
    rank: Rank,
    value: u32,
    exercise: Exercise,
}

impl Card {
    #[must_use]
    pub fn new(id: CardId, suit: Suit, rank: Rank) -> Self {
        Self {
            id,
            suit,
            rank,
            value: rank.value(),
            exercise: suit.exercise(),
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn suit(&self) -> Suit {
        self.suit
    }

    #[must_use]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of reps required to clear this card.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[must_use]
    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    /// Short face label such as `10♥` or `A♣`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.rank.label(), self.suit.symbol())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn court_and_ace_values_are_fixed() {
        assert_eq!(Rank::Jack.value(), 11);
        assert_eq!(Rank::Queen.value(), 12);
        assert_eq!(Rank::King.value(), 13);
        assert_eq!(Rank::Ace.value(), 15);
    }

    #[test]
    fn numeric_ranks_map_to_themselves() {
        let numeric: Vec<u32> = Rank::ALL[..9].iter().map(|r| r.value()).collect();
        assert_eq!(numeric, (2..=10).collect::<Vec<_>>());
        for rank in &Rank::ALL[..9] {
            assert_eq!(rank.label().parse::<u32>().ok(), Some(rank.value()));
        }
    }

    #[test]
    fn rank_values_rise_in_canonical_order() {
        let values: Vec<u32> = Rank::ALL.iter().map(|r| r.value()).collect();
        assert!(values.iter().all(|&v| v >= 2));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn suits_map_to_exercises() {
        assert_eq!(Suit::Hearts.exercise(), Exercise::PushUps);
        assert_eq!(Suit::Diamonds.exercise(), Exercise::Dips);
        assert_eq!(Suit::Spades.exercise(), Exercise::Crunches);
        assert_eq!(Suit::Clubs.exercise(), Exercise::Burpees);
    }

    #[test]
    fn card_derives_value_and_exercise() {
        let card = Card::new(CardId::new(3), Suit::Clubs, Rank::Ace);
        assert_eq!(card.value(), 15);
        assert_eq!(card.exercise(), Exercise::Burpees);
        assert_eq!(card.label(), "A♣");
    }

    #[test]
    fn parses_labels() {
        assert_eq!("10".parse::<Rank>().unwrap(), Rank::Ten);
        assert_eq!("q".parse::<Rank>().unwrap(), Rank::Queen);
        assert_eq!("spades".parse::<Suit>().unwrap(), Suit::Spades);
        assert_eq!("push-ups".parse::<Exercise>().unwrap(), Exercise::PushUps);
        assert!(matches!(
            "1".parse::<Rank>(),
            Err(CardError::UnknownRank(_))
        ));
    }
}
