mod config;
pub mod adjustments;
pub mod database;
pub mod migrations;
pub mod reminders;

pub use adjustments::AdjustmentStore;
pub use config::Config;
pub use database::Database;
pub use reminders::{NotificationRecord, ReminderKind, ReminderStore};

use std::path::PathBuf;

/// Returns `~/.config/easyday[-dev]/` based on EASYDAY_ENV.
///
/// Set EASYDAY_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("EASYDAY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("easyday-dev")
    } else {
        base_dir.join("easyday")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
