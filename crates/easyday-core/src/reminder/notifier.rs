//! The platform notification seam.

use serde::{Deserialize, Serialize};

use crate::error::ReminderError;

/// What a scheduled notification shows when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    /// Opaque payload echoed back to whoever consumes the notification.
    pub data: serde_json::Value,
}

/// One notification the platform still has pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    /// The opaque handle handed out by [`Notifier::schedule`].
    pub id: String,
    /// Trigger time in unix seconds.
    pub scheduled_at: i64,
}

/// Every platform notification scheduler implements this trait.
///
/// The pending list it reports is authoritative: restoration reconciles
/// persisted records against it rather than trusting the local store.
/// Test doubles implement it directly.
pub trait Notifier {
    /// Whether the user has granted notification permission.
    fn request_permission(&self) -> Result<bool, ReminderError>;

    /// Schedule a notification `trigger_secs_from_now` seconds out.
    /// Returns the platform's opaque handle for later cancellation.
    fn schedule(
        &self,
        trigger_secs_from_now: i64,
        content: &NotificationContent,
    ) -> Result<String, ReminderError>;

    /// Cancel a pending notification. Cancelling an unknown or
    /// already-fired id is a no-op, not an error.
    fn cancel(&self, id: &str) -> Result<(), ReminderError>;

    /// Everything currently pending, soonest trigger first.
    fn list_scheduled(&self) -> Result<Vec<PendingNotification>, ReminderError>;
}
