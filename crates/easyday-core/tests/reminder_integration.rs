//! End-to-end reminder lifecycle tests: scheduling, idempotent
//! rescheduling, cancellation, and startup restoration against an
//! in-memory record store and a scripted notifier.

use std::cell::{Cell, RefCell};

use chrono::{DateTime, Duration, TimeZone, Utc};

use easyday_core::clock::ClockTime;
use easyday_core::error::ReminderError;
use easyday_core::formula::{CyclePhase, PhaseLabels};
use easyday_core::reminder::{
    restore_kind, NotificationContent, Notifier, PendingNotification, ReminderScheduler,
};
use easyday_core::storage::{NotificationRecord, ReminderKind, ReminderStore};

/// Scripted notifier standing in for the platform scheduler.
struct FakeNotifier {
    permission: bool,
    now: DateTime<Utc>,
    next_id: Cell<u32>,
    pending: RefCell<Vec<PendingNotification>>,
    schedule_calls: Cell<u32>,
}

impl FakeNotifier {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            permission: true,
            now,
            next_id: Cell::new(0),
            pending: RefCell::new(Vec::new()),
            schedule_calls: Cell::new(0),
        }
    }

    fn denying(now: DateTime<Utc>) -> Self {
        Self {
            permission: false,
            ..Self::new(now)
        }
    }

    fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Simulate the platform firing (or the user clearing) a notification.
    fn drop_pending(&self, id: &str) {
        self.pending.borrow_mut().retain(|p| p.id != id);
    }
}

impl Notifier for FakeNotifier {
    fn request_permission(&self) -> Result<bool, ReminderError> {
        Ok(self.permission)
    }

    fn schedule(
        &self,
        trigger_secs_from_now: i64,
        _content: &NotificationContent,
    ) -> Result<String, ReminderError> {
        self.schedule_calls.set(self.schedule_calls.get() + 1);
        let id = format!("fake-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.pending.borrow_mut().push(PendingNotification {
            id: id.clone(),
            scheduled_at: self.now.timestamp() + trigger_secs_from_now,
        });
        Ok(id)
    }

    fn cancel(&self, id: &str) -> Result<(), ReminderError> {
        self.drop_pending(id);
        Ok(())
    }

    fn list_scheduled(&self) -> Result<Vec<PendingNotification>, ReminderError> {
        Ok(self.pending.borrow().clone())
    }
}

fn day_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).single().unwrap()
}

fn simple_phases() -> Vec<CyclePhase> {
    vec![CyclePhase::new(30, 90, 120)]
}

fn wake() -> ClockTime {
    ClockTime::parse("07:00").unwrap()
}

#[test]
fn reschedule_schedules_one_trigger_per_phase_end() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    let summary = scheduler
        .reschedule_all(
            wake(),
            &simple_phases(),
            &[],
            &PhaseLabels::default(),
            10,
            day_start(),
            now,
        )
        .unwrap();

    // E 07:00-07:30, A 07:30-09:00, S 09:00-11:00; the trailing Y item
    // gets no trigger.
    assert_eq!(summary.scheduled, 3);
    assert_eq!(summary.skipped_past_due, 0);
    assert_eq!(summary.cancelled_prior, 0);

    let records = store.list_kind(ReminderKind::Easy).unwrap();
    assert_eq!(records.len(), 3);
    // Each trigger is phase end minus the 10-minute advance:
    // ends 07:30, 09:00, 11:00 → minutes 450, 540, 660.
    let expected: Vec<i64> = [450, 540, 660]
        .iter()
        .map(|end| (day_start() + Duration::minutes(end - 10)).timestamp())
        .collect();
    let actual: Vec<i64> = records.iter().map(|r| r.scheduled_at).collect();
    assert_eq!(actual, expected);
    assert_eq!(notifier.pending_count(), 3);
}

#[test]
fn reschedule_twice_with_same_inputs_does_not_duplicate() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    let args = (wake(), simple_phases(), PhaseLabels::default());
    scheduler
        .reschedule_all(args.0, &args.1, &[], &args.2, 10, day_start(), now)
        .unwrap();
    let before = store.list_kind(ReminderKind::Easy).unwrap().len();

    let summary = scheduler
        .reschedule_all(args.0, &args.1, &[], &args.2, 10, day_start(), now)
        .unwrap();
    let after = store.list_kind(ReminderKind::Easy).unwrap().len();

    assert_eq!(before, after);
    assert_eq!(summary.cancelled_prior, 3);
    assert_eq!(notifier.pending_count(), 3);
}

#[test]
fn reschedule_skips_phase_ends_already_behind_now() {
    // 08:20: the first eat's trigger (07:50) is behind us.
    let now = day_start() + Duration::minutes(500);
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    let summary = scheduler
        .reschedule_all(
            wake(),
            &simple_phases(),
            &[],
            &PhaseLabels::default(),
            10,
            day_start(),
            now,
        )
        .unwrap();

    assert_eq!(summary.scheduled, 2);
    assert_eq!(summary.skipped_past_due, 1);
    assert_eq!(store.list_kind(ReminderKind::Easy).unwrap().len(), 2);
}

#[test]
fn adjustment_shifts_the_reminder_trigger() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    // Drag the sleep (order 2) from 09:00 to 09:30, same duration.
    let adjustment = easyday_core::schedule::ScheduleAdjustment {
        baby_id: "b1".to_string(),
        date: "2024-03-10".parse().unwrap(),
        item_order: 2,
        start: ClockTime::parse("09:30").unwrap(),
        duration_min: 120,
    };
    scheduler
        .reschedule_all(
            wake(),
            &simple_phases(),
            &[adjustment],
            &PhaseLabels::default(),
            10,
            day_start(),
            now,
        )
        .unwrap();

    let records = store.list_kind(ReminderKind::Easy).unwrap();
    // Sleep now ends at 11:30 (minute 690), trigger at 11:20.
    let last = records.last().unwrap();
    assert_eq!(
        last.scheduled_at,
        (day_start() + Duration::minutes(690 - 10)).timestamp()
    );
}

#[test]
fn permission_denied_leaves_prior_state_intact() {
    let now = day_start();
    let store = ReminderStore::open_memory().unwrap();

    // Seed one prior record through a granting notifier.
    let granting = FakeNotifier::new(now);
    ReminderScheduler::new(&granting, &store)
        .schedule_reminder(
            ReminderKind::Easy,
            now + Duration::hours(2),
            now,
            "Sleep 1",
            "t",
            "b",
        )
        .unwrap();
    assert_eq!(store.list_kind(ReminderKind::Easy).unwrap().len(), 1);

    let denying = FakeNotifier::denying(now);
    let scheduler = ReminderScheduler::new(&denying, &store);
    let result = scheduler.reschedule_all(
        wake(),
        &simple_phases(),
        &[],
        &PhaseLabels::default(),
        10,
        day_start(),
        now,
    );

    assert!(matches!(result, Err(ReminderError::PermissionDenied)));
    assert_eq!(denying.schedule_calls.get(), 0);
    // The prior record survived the denied call untouched.
    assert_eq!(store.list_kind(ReminderKind::Easy).unwrap().len(), 1);
}

#[test]
fn past_due_target_is_skipped_without_side_effects() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    let result = scheduler
        .schedule_reminder(
            ReminderKind::Easy,
            now - Duration::minutes(5),
            now,
            "Sleep 1",
            "t",
            "b",
        )
        .unwrap();

    assert!(result.is_none());
    assert_eq!(notifier.schedule_calls.get(), 0);
    assert!(store.list_kind(ReminderKind::Easy).unwrap().is_empty());
}

#[test]
fn cancel_removes_both_notification_and_record() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    let id = scheduler
        .schedule_reminder(
            ReminderKind::Easy,
            now + Duration::hours(1),
            now,
            "Sleep 1",
            "t",
            "b",
        )
        .unwrap()
        .unwrap();

    scheduler.cancel(&id).unwrap();
    assert_eq!(notifier.pending_count(), 0);
    assert!(store.list_kind(ReminderKind::Easy).unwrap().is_empty());
}

#[test]
fn cancel_all_clears_one_kind_only() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    scheduler
        .reschedule_all(
            wake(),
            &simple_phases(),
            &[],
            &PhaseLabels::default(),
            10,
            day_start(),
            now,
        )
        .unwrap();
    scheduler
        .schedule_feeding(now + Duration::hours(3), now)
        .unwrap();

    let cancelled = scheduler.cancel_all(ReminderKind::Easy).unwrap();
    assert_eq!(cancelled, 3);
    assert!(store.list_kind(ReminderKind::Easy).unwrap().is_empty());
    assert_eq!(store.list_kind(ReminderKind::Feeding).unwrap().len(), 1);
    assert_eq!(notifier.pending_count(), 1);
}

#[test]
fn feeding_reminder_keeps_a_single_slot() {
    let now = day_start();
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();
    let scheduler = ReminderScheduler::new(&notifier, &store);

    scheduler
        .schedule_feeding(now + Duration::hours(3), now)
        .unwrap();
    scheduler
        .schedule_feeding(now + Duration::hours(4), now)
        .unwrap();

    let records = store.list_kind(ReminderKind::Feeding).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].scheduled_at,
        (now + Duration::hours(4)).timestamp()
    );
    assert_eq!(notifier.pending_count(), 1);
}

#[test]
fn restoration_repairs_fired_orphaned_and_stale_records() {
    let now = day_start() + Duration::hours(12);
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();

    let mut insert = |id: &str, at: DateTime<Utc>, keep_pending: bool| {
        store
            .insert(&NotificationRecord {
                notification_id: id.to_string(),
                kind: ReminderKind::Easy,
                scheduled_at: at.timestamp(),
                data: serde_json::Value::Null,
                created_at: now,
            })
            .unwrap();
        if keep_pending {
            notifier.pending.borrow_mut().push(PendingNotification {
                id: id.to_string(),
                scheduled_at: at.timestamp(),
            });
        }
    };

    insert("active", now + Duration::hours(1), true);
    insert("fired", now - Duration::hours(1), false);
    insert("orphaned", now + Duration::hours(2), false);
    insert("stale", now - Duration::minutes(10), true);

    let (active, summary) = restore_kind(&notifier, &store, ReminderKind::Easy, now).unwrap();

    assert_eq!(summary.examined, 4);
    assert_eq!(summary.kept_active, 1);
    assert_eq!(summary.removed_fired, 1);
    assert_eq!(summary.removed_orphaned, 1);
    assert_eq!(summary.removed_stale, 1);
    assert!(summary.repaired());

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].notification_id, "active");
    // Only the Active record survives in the store; the stale one was
    // cancelled at the notifier too.
    assert_eq!(store.list_kind(ReminderKind::Easy).unwrap().len(), 1);
    assert_eq!(notifier.pending_count(), 1);
}

#[test]
fn startup_flow_restores_then_rederives_the_easy_set() {
    // Simulate a restart: two records persisted yesterday, one of which
    // already fired. Restoration repairs the drift, then reschedule_all
    // rebuilds the whole set from today's schedule.
    let now = day_start() + Duration::minutes(300); // 05:00
    let notifier = FakeNotifier::new(now);
    let store = ReminderStore::open_memory().unwrap();

    store
        .insert(&NotificationRecord {
            notification_id: "old-1".to_string(),
            kind: ReminderKind::Easy,
            scheduled_at: (now - Duration::hours(10)).timestamp(),
            data: serde_json::Value::Null,
            created_at: now - Duration::days(1),
        })
        .unwrap();

    let (active, _) = restore_kind(&notifier, &store, ReminderKind::Easy, now).unwrap();
    assert!(active.is_empty());

    let scheduler = ReminderScheduler::new(&notifier, &store);
    let summary = scheduler
        .reschedule_all(
            wake(),
            &simple_phases(),
            &[],
            &PhaseLabels::default(),
            10,
            day_start(),
            now,
        )
        .unwrap();

    assert_eq!(summary.scheduled, 3);
    assert_eq!(store.list_kind(ReminderKind::Easy).unwrap().len(), 3);
}
