#![forbid(unsafe_code)]

pub mod json_file;
pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, Storage, StorageError, WorkoutHistoryRepository, WorkoutRecord,
};
