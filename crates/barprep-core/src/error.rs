//! Core error types for barprep-core.
//!
//! Errors are split by concern using thiserror. None of them is fatal to
//! navigation: fetch failures fall back to the last known snapshot, flag
//! writes are best effort, and unknown navigation targets resolve to `home`.

use std::path::PathBuf;
use thiserror::Error;

use crate::orchestrator::ViewKind;

/// Core error type for barprep-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external collaborator (counter aggregation, question bank) failed
    #[error("Source '{collaborator}' failed: {message}")]
    Source {
        collaborator: String,
        message: String,
    },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

impl CoreError {
    /// Shorthand for a collaborator failure.
    pub fn source(collaborator: &str, message: impl Into<String>) -> Self {
        CoreError::Source {
            collaborator: collaborator.to_string(),
            message: message.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised by the free-trial gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrialError {
    /// The free quota is used up; only upgrade or exit remain.
    #[error("Free trial locked after {limit} questions")]
    Locked { limit: usize },

    /// Every sampled question was answered but the quota was not reached.
    #[error("No more trial questions available ({consumed} answered)")]
    Exhausted { consumed: usize },
}

/// Rejected view transitions. State is left untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The action has no meaning in the current view.
    #[error("'{action}' is not available from {view:?}")]
    NotAvailable { view: ViewKind, action: &'static str },

    /// The selected option is not one of the question's letters.
    #[error("'{0}' is not an option of this question")]
    InvalidOption(String),

    /// The trial gate refused the answer.
    #[error(transparent)]
    Trial(#[from] TrialError),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
