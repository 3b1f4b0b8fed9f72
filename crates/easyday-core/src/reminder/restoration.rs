//! Startup reconciliation of persisted notification records.
//!
//! Persisted records are a cache of what should be pending; the
//! notifier's own list is the source of truth. On startup each record
//! is classified against that list and repaired: already-fired and
//! externally-cleared records are dropped, past-due ones still pending
//! are cancelled, and only genuinely future ones survive. This is an
//! explicit reconcile step, never a merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReminderError;
use crate::storage::{NotificationRecord, ReminderKind, ReminderStore};

use super::notifier::{Notifier, PendingNotification};

/// What a persisted record turned out to be on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    /// Still pending at the notifier with a future trigger; kept.
    Active,
    /// Gone from the notifier and its time has passed; record deleted.
    Fired,
    /// Gone from the notifier though its time has not passed (e.g.
    /// externally cleared); record deleted, no error surfaced.
    Orphaned,
    /// Still pending but its time has passed. Should not normally
    /// occur; cancelled defensively and deleted.
    Stale,
}

/// Classify one record against the notifier's pending list.
///
/// Pure function: callers pass the list and "now" so the same inputs
/// always classify the same way.
pub fn classify(
    record: &NotificationRecord,
    pending: &[PendingNotification],
    now: DateTime<Utc>,
) -> RecordState {
    let still_pending = pending.iter().any(|p| p.id == record.notification_id);
    let past = record.scheduled_at <= now.timestamp();

    match (still_pending, past) {
        (true, false) => RecordState::Active,
        (true, true) => RecordState::Stale,
        (false, true) => RecordState::Fired,
        (false, false) => RecordState::Orphaned,
    }
}

/// What one restoration pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorationSummary {
    pub examined: usize,
    pub kept_active: usize,
    pub removed_fired: usize,
    pub removed_orphaned: usize,
    pub removed_stale: usize,
}

impl RestorationSummary {
    /// Whether any drift was repaired.
    pub fn repaired(&self) -> bool {
        self.removed_fired + self.removed_orphaned + self.removed_stale > 0
    }

    /// Human-readable one-liner for logs.
    pub fn message(&self) -> String {
        if !self.repaired() {
            format!("{} record(s) examined, no drift", self.examined)
        } else {
            format!(
                "{} record(s) examined: {} kept, {} fired, {} orphaned, {} stale",
                self.examined,
                self.kept_active,
                self.removed_fired,
                self.removed_orphaned,
                self.removed_stale
            )
        }
    }
}

/// Reconcile all persisted records of one kind against the notifier.
///
/// Returns the records still Active plus a summary of the repairs.
/// Feeding callers take the surviving single slot as-is; Easy callers
/// follow this with a full `reschedule_all`, since the schedule itself
/// may have changed since the records were written.
pub fn restore_kind(
    notifier: &dyn Notifier,
    store: &ReminderStore,
    kind: ReminderKind,
    now: DateTime<Utc>,
) -> Result<(Vec<NotificationRecord>, RestorationSummary), ReminderError> {
    let pending = notifier.list_scheduled()?;
    let records = store.list_kind(kind)?;

    let mut summary = RestorationSummary {
        examined: records.len(),
        kept_active: 0,
        removed_fired: 0,
        removed_orphaned: 0,
        removed_stale: 0,
    };
    let mut active = Vec::new();

    for record in records {
        match classify(&record, &pending, now) {
            RecordState::Active => {
                summary.kept_active += 1;
                active.push(record);
            }
            RecordState::Fired => {
                store.delete(&record.notification_id)?;
                summary.removed_fired += 1;
            }
            RecordState::Orphaned => {
                store.delete(&record.notification_id)?;
                summary.removed_orphaned += 1;
            }
            RecordState::Stale => {
                // Defensive cancel; usually a no-op by the time we get here.
                if let Err(e) = notifier.cancel(&record.notification_id) {
                    log::warn!(
                        "failed to cancel stale notification {}: {e}",
                        record.notification_id
                    );
                }
                store.delete(&record.notification_id)?;
                summary.removed_stale += 1;
            }
        }
    }

    log::info!("restoration ({kind:?}): {}", summary.message());
    Ok((active, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: &str, scheduled_at: i64) -> NotificationRecord {
        NotificationRecord {
            notification_id: id.to_string(),
            kind: ReminderKind::Easy,
            scheduled_at,
            data: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    fn pending(id: &str, scheduled_at: i64) -> PendingNotification {
        PendingNotification {
            id: id.to_string(),
            scheduled_at,
        }
    }

    #[test]
    fn future_and_pending_is_active() {
        let now = Utc::now();
        let at = (now + Duration::hours(1)).timestamp();
        let state = classify(&record("n1", at), &[pending("n1", at)], now);
        assert_eq!(state, RecordState::Active);
    }

    #[test]
    fn absent_and_past_is_fired() {
        let now = Utc::now();
        let at = (now - Duration::hours(1)).timestamp();
        assert_eq!(classify(&record("n1", at), &[], now), RecordState::Fired);
    }

    #[test]
    fn absent_but_future_is_orphaned() {
        let now = Utc::now();
        let at = (now + Duration::hours(1)).timestamp();
        assert_eq!(classify(&record("n1", at), &[], now), RecordState::Orphaned);
    }

    #[test]
    fn pending_but_past_is_stale() {
        let now = Utc::now();
        let at = (now - Duration::minutes(5)).timestamp();
        let state = classify(&record("n1", at), &[pending("n1", at)], now);
        assert_eq!(state, RecordState::Stale);
    }

    #[test]
    fn classification_ignores_other_pending_ids() {
        let now = Utc::now();
        let at = (now + Duration::hours(1)).timestamp();
        let state = classify(&record("n1", at), &[pending("other", at)], now);
        assert_eq!(state, RecordState::Orphaned);
    }
}
