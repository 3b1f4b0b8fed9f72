//! Error types for easyday-core.
//!
//! Each subsystem carries its own thiserror enum; callers that mix
//! subsystems (the CLI) box them at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open the database or resolve its location
    #[error("Failed to open database at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

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

    /// No such configuration key
    #[error("Unknown config key: {key}")]
    UnknownKey { key: String },
}

/// Reminder-specific errors.
#[derive(Error, Debug)]
pub enum ReminderError {
    /// The user declined (or the platform refused) notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The platform notifier rejected a schedule or cancel call
    #[error("Notification scheduling failed: {0}")]
    Scheduling(String),

    /// The notification record store failed
    #[error("Reminder store error: {0}")]
    Store(#[from] DatabaseError),

    /// No active baby profile to schedule reminders for
    #[error("no active baby profile; add one with `easyday baby add`")]
    NoActiveProfile,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Clock time outside a single day
    #[error("Invalid clock time '{input}': {message}")]
    InvalidClockTime { input: String, message: String },

    /// Phase durations must leave the cycle schedulable
    #[error("Invalid phase duration for '{phase}': {message}")]
    InvalidPhaseDuration { phase: String, message: String },

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}
