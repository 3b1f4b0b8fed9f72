//! Phase-end reminder scheduling, delivery spool, and startup restoration.
//!
//! The [`Notifier`] trait is the seam to the platform notification
//! scheduler; [`SpoolNotifier`] is the shipped SQLite-backed
//! implementation whose due entries the CLI delivery daemon renders as
//! desktop toasts. [`ReminderScheduler`] owns the reminder lifecycle
//! (schedule, cancel, idempotent reschedule of the full set) and
//! [`restoration`] reconciles persisted records against the notifier's
//! pending list on startup.

pub mod notifier;
pub mod restoration;
pub mod scheduler;
pub mod spool;

pub use notifier::{NotificationContent, Notifier, PendingNotification};
pub use restoration::{classify, restore_kind, RecordState, RestorationSummary};
pub use scheduler::{RescheduleSummary, ReminderScheduler};
pub use spool::{DueNotification, SpoolNotifier};
