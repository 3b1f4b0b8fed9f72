//! # Easyday Core Library
//!
//! Core business logic for Easyday, an EASY (Eat-Activity-Sleep-Your time)
//! routine tracker for caregivers. All operations are available via the
//! standalone `easyday` CLI binary, which is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Schedule generation**: pure functions that turn a wake time and a
//!   cycle formula into a time-stamped day, with grouping and progress
//!   computed against a caller-supplied "now"
//! - **Storage**: SQLite-based profile, formula, adjustment, and
//!   notification-record persistence; TOML-based configuration
//! - **Reminders**: phase-end notification scheduling through a pluggable
//!   notifier seam, with startup reconciliation against what the notifier
//!   still has pending
//!
//! ## Key Components
//!
//! - [`schedule::generate`]: formula in, time-stamped day out
//! - [`Database`]: profile and formula persistence
//! - [`reminder::ReminderScheduler`]: phase-end reminder lifecycle
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod formula;
pub mod profile;
pub mod reminder;
pub mod schedule;
pub mod storage;

pub use clock::ClockTime;
pub use error::{ConfigError, DatabaseError, ReminderError, ValidationError};
pub use formula::{CyclePhase, Formula, FormulaSelection, PhaseLabels};
pub use profile::BabyProfile;
pub use reminder::{Notifier, ReminderScheduler, SpoolNotifier};
pub use schedule::{ItemKind, ScheduleAdjustment, ScheduleItem};
pub use storage::{AdjustmentStore, Config, Database, NotificationRecord, ReminderKind, ReminderStore};
