//! Error types shared by the persistence and sensor layers.
//!
//! Nothing in the session core is fatal: callers log these and keep going.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing the record log and accumulator.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Opening, creating or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV writer or reader failed outside of a single row
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The accumulator file holds something other than a single integer
    #[error("Accumulator at {path} is not an integer: {content:?}")]
    InvalidAccumulator { path: PathBuf, content: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StorageError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Failures reported by the temperature/humidity sensor.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("sensor read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("sensor returned no reading")]
    NoReading,

    #[error("sensor returned NaN")]
    NotANumber,
}

/// Result type alias for StorageError
pub type Result<T, E = StorageError> = std::result::Result<T, E>;

/// A workout configuration that cannot be run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorkoutError {
    #[error("exercise time must be at least one second")]
    NoExerciseTime,

    #[error("a workout needs at least one set")]
    NoSets,
}
