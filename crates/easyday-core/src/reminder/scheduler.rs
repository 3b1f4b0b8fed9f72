//! The reminder scheduler: phase-end triggers from the generated day.
//!
//! Sole authority for time-based side effects. Grouping/progress
//! classification is display-only; everything that actually fires goes
//! through here. Idempotence comes from delete-before-insert per
//! reminder kind, never from locking.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::error::ReminderError;
use crate::formula::{CyclePhase, PhaseLabels};
use crate::schedule::{absolute_spans, generate, overlay, ItemKind, ScheduleAdjustment};
use crate::storage::{NotificationRecord, ReminderKind, ReminderStore};

use super::notifier::{NotificationContent, Notifier};

/// What one `reschedule_all` pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleSummary {
    /// Prior records of the kind cancelled and deleted before inserting.
    pub cancelled_prior: usize,
    /// Notifications scheduled and persisted this pass.
    pub scheduled: usize,
    /// Phase ends already behind "now", silently skipped.
    pub skipped_past_due: usize,
}

impl RescheduleSummary {
    /// Human-readable one-liner for CLI output.
    pub fn message(&self) -> String {
        format!(
            "scheduled {} reminder(s), skipped {} past-due, replaced {} prior",
            self.scheduled, self.skipped_past_due, self.cancelled_prior
        )
    }
}

/// Schedules, cancels, and re-derives phase-end reminders.
///
/// Holds the notifier seam and the record store; every operation runs
/// its store and notifier calls sequentially, and a failure part-way
/// leaves state for the next restoration pass to repair rather than
/// rolling back.
pub struct ReminderScheduler<'a> {
    notifier: &'a dyn Notifier,
    store: &'a ReminderStore,
}

impl<'a> ReminderScheduler<'a> {
    pub fn new(notifier: &'a dyn Notifier, store: &'a ReminderStore) -> Self {
        Self { notifier, store }
    }

    /// Schedule one reminder at `target` and persist its record.
    ///
    /// A target at or before `now` is a routine occurrence (app opened
    /// after the phase already ended) and returns `Ok(None)` with no
    /// notifier call and no record. If the notifier call succeeds but
    /// the record write fails, the notification stays scheduled and the
    /// orphaned state heals on the next restoration pass.
    pub fn schedule_reminder(
        &self,
        kind: ReminderKind,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
        label: &str,
        title: &str,
        body: &str,
    ) -> Result<Option<String>, ReminderError> {
        if !self.notifier.request_permission()? {
            return Err(ReminderError::PermissionDenied);
        }
        if target <= now {
            log::debug!("skipping past-due reminder '{label}' (target {target})");
            return Ok(None);
        }

        let content = NotificationContent {
            title: title.to_string(),
            body: body.to_string(),
            data: serde_json::json!({ "kind": kind, "label": label }),
        };
        let trigger_secs = (target - now).num_seconds();
        let notification_id = self.notifier.schedule(trigger_secs, &content)?;

        let record = NotificationRecord {
            notification_id: notification_id.clone(),
            kind,
            scheduled_at: target.timestamp(),
            data: content.data.clone(),
            created_at: now,
        };
        if let Err(e) = self.store.insert(&record) {
            log::warn!("notification {notification_id} scheduled but record not persisted: {e}");
            return Err(ReminderError::Store(e));
        }

        log::info!("scheduled '{label}' reminder at {target} ({notification_id})");
        Ok(Some(notification_id))
    }

    /// Cancel one notification and delete its record.
    ///
    /// The notifier call and the store call cannot be transactional;
    /// if one half fails it is logged and the other half still runs, so
    /// neither side is left orphaned on purpose.
    pub fn cancel(&self, notification_id: &str) -> Result<(), ReminderError> {
        let mut first_error = None;

        if let Err(e) = self.notifier.cancel(notification_id) {
            log::error!("failed to cancel notification {notification_id}: {e}");
            first_error = Some(e);
        }
        if let Err(e) = self.store.delete(notification_id) {
            log::error!("failed to delete record for {notification_id}: {e}");
            if first_error.is_none() {
                first_error = Some(ReminderError::Store(e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                log::info!("cancelled reminder {notification_id}");
                Ok(())
            }
        }
    }

    /// Cancel every persisted reminder of one kind; returns how many.
    ///
    /// Used when the caregiver disables reminders entirely. Notifier
    /// failures are logged and the sweep continues so the records never
    /// outlive the intent to cancel.
    pub fn cancel_all(&self, kind: ReminderKind) -> Result<usize, ReminderError> {
        let records = self.store.list_kind(kind)?;
        for record in &records {
            if let Err(e) = self.notifier.cancel(&record.notification_id) {
                log::warn!(
                    "failed to cancel notification {}: {e}",
                    record.notification_id
                );
            }
        }
        let deleted = self.store.delete_kind(kind)?;
        if deleted > 0 {
            log::info!("cancelled {deleted} {kind:?} reminder(s)");
        }
        Ok(deleted)
    }

    /// Re-derive the full set of phase-end reminders for one day.
    ///
    /// The central entry point: checks permission, cancels and deletes
    /// every prior Easy record, regenerates the day from the wake time
    /// and phases, overlays the day's adjustments, and schedules one
    /// notification per future phase end minus `advance_min`. Calling it
    /// twice with identical inputs yields the same single set of active
    /// notifications.
    ///
    /// `day_start` is the midnight (UTC instant) the schedule day hangs
    /// off; item offsets from [`absolute_spans`] count from it.
    /// Zero-duration items produce no trigger since their end coincides
    /// with the previous one.
    #[allow(clippy::too_many_arguments)]
    pub fn reschedule_all(
        &self,
        wake: ClockTime,
        phases: &[CyclePhase],
        adjustments: &[ScheduleAdjustment],
        labels: &PhaseLabels,
        advance_min: u32,
        day_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<RescheduleSummary, ReminderError> {
        // Permission gate before any deletion: a denied call must leave
        // the prior notification set fully intact.
        if !self.notifier.request_permission()? {
            return Err(ReminderError::PermissionDenied);
        }

        let cancelled_prior = self.cancel_all(ReminderKind::Easy)?;

        let items = overlay(&generate(wake, phases, labels), adjustments);
        let spans = absolute_spans(&items, wake.minutes() as u32);

        let mut scheduled = 0;
        let mut skipped_past_due = 0;
        for (item, (_, end_min)) in items.iter().zip(&spans) {
            if item.kind == ItemKind::YourTime || item.duration_min == 0 {
                continue;
            }
            let target = day_start + Duration::minutes(*end_min as i64 - advance_min as i64);
            let title = format!("{} ending soon", item.label);
            let body = format!("{} ends at {}", item.label, item.end());
            match self.schedule_reminder(ReminderKind::Easy, target, now, &item.label, &title, &body)? {
                Some(_) => scheduled += 1,
                None => skipped_past_due += 1,
            }
        }

        let summary = RescheduleSummary {
            cancelled_prior,
            scheduled,
            skipped_past_due,
        };
        log::info!("reschedule: {}", summary.message());
        Ok(summary)
    }

    /// Schedule the single-slot next-feeding reminder.
    ///
    /// Replaces any prior feeding record before inserting, so exactly
    /// one feeding reminder is ever active.
    pub fn schedule_feeding(
        &self,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, ReminderError> {
        if !self.notifier.request_permission()? {
            return Err(ReminderError::PermissionDenied);
        }
        self.cancel_all(ReminderKind::Feeding)?;
        self.schedule_reminder(
            ReminderKind::Feeding,
            target,
            now,
            "Feeding",
            "Feeding time",
            "Time for the next feed",
        )
    }
}
