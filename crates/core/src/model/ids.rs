use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a card within one deck.
///
/// The inner value is the card's position in the canonical (suit, rank)
/// generation order, so it survives shuffling unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u32);

impl CardId {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the generation-order index.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Unique identifier for a finished workout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkoutId(Uuid);

impl WorkoutId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, as shown next to a session in history listings.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardId({})", self.0)
    }
}

impl fmt::Debug for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkoutId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CardId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("card-")
            .and_then(|n| n.parse::<u32>().ok())
            .map(CardId::new)
            .ok_or(ParseIdError { kind: "CardId" })
    }
}

impl FromStr for WorkoutId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(WorkoutId)
            .map_err(|_| ParseIdError { kind: "WorkoutId" })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_id_displays_with_prefix() {
        assert_eq!(CardId::new(7).to_string(), "card-7");
    }

    #[test]
    fn card_id_parses_prefixed_form() {
        let id: CardId = "card-51".parse().unwrap();
        assert_eq!(id, CardId::new(51));
    }

    #[test]
    fn card_id_rejects_bare_number() {
        assert!("51".parse::<CardId>().is_err());
        assert!("card-x".parse::<CardId>().is_err());
    }

    #[test]
    fn workout_ids_are_unique() {
        let a = WorkoutId::generate();
        let b = WorkoutId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn workout_id_parses_its_display() {
        let id = WorkoutId::generate();
        let parsed: WorkoutId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.short().len(), 8);
    }
}
