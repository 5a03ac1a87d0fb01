use thiserror::Error;

use crate::model::CardError;
use crate::model::WorkoutStatsError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    WorkoutStats(#[from] WorkoutStatsError),
}
