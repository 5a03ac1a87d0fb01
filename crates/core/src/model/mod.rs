mod card;
mod ids;
mod workout;

pub use ids::{CardId, ParseIdError, WorkoutId};

pub use card::{Card, CardError, Exercise, Rank, Suit};
pub use workout::{RepsByExercise, WorkoutStats, WorkoutStatsError};
