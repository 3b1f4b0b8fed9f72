//! Reminder commands: toggle, sync, feeding slot, delivery daemon.

use chrono::{Duration, Utc};
use clap::Subcommand;

use easyday_core::reminder::{Notifier, ReminderScheduler, RescheduleSummary, SpoolNotifier};
use easyday_core::storage::{AdjustmentStore, Config, Database, ReminderKind, ReminderStore};

use crate::common;

#[derive(Subcommand)]
pub enum RemindersAction {
    /// Enable reminders and schedule today's set
    Enable,
    /// Disable reminders and cancel everything pending
    Disable,
    /// Show reminder state and pending counts
    Status,
    /// Re-derive today's reminder set from the current schedule
    Sync,
    /// Schedule the next-feeding reminder
    Feed,
    /// Run the delivery daemon: poll for due reminders and show toasts
    Watch,
}

/// Re-derive the full Easy reminder set for today.
///
/// Shared by `reminders enable`, `reminders sync`, and the startup hook.
pub fn sync_now(config: &Config) -> Result<RescheduleSummary, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let profile = common::active_profile(&db)?;
    let adjustments = AdjustmentStore::open()?;
    let date = common::today();

    let formula = db.formula_for_day(&profile, date)?;
    formula.validate()?;
    let overrides = adjustments.for_day(&profile.id, date)?;

    let notifier = SpoolNotifier::open()?;
    let store = ReminderStore::open()?;
    let scheduler = ReminderScheduler::new(&notifier, &store);
    let summary = scheduler.reschedule_all(
        profile.first_wake,
        &formula.phases,
        &overrides,
        &config.labels.phase_labels(),
        config.reminders.advance_min,
        common::local_day_start(date),
        Utc::now(),
    )?;
    Ok(summary)
}

pub fn run(action: RemindersAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();

    match action {
        RemindersAction::Enable => {
            config.reminders.enabled = true;
            config.save()?;
            let summary = sync_now(&config)?;
            println!("reminders enabled: {}", summary.message());
        }
        RemindersAction::Disable => {
            config.reminders.enabled = false;
            config.save()?;
            let notifier = SpoolNotifier::open()?;
            let store = ReminderStore::open()?;
            let scheduler = ReminderScheduler::new(&notifier, &store);
            let easy = scheduler.cancel_all(ReminderKind::Easy)?;
            let feeding = scheduler.cancel_all(ReminderKind::Feeding)?;
            println!("reminders disabled; cancelled {} reminder(s)", easy + feeding);
        }
        RemindersAction::Status => {
            let store = ReminderStore::open()?;
            let notifier = SpoolNotifier::open()?;
            let easy = store.list_kind(ReminderKind::Easy)?.len();
            let feeding = store.list_kind(ReminderKind::Feeding)?.len();
            let pending = notifier.list_scheduled()?.len();
            println!(
                "enabled: {}\nadvance: {} min\nfeeding interval: {} min",
                config.reminders.enabled,
                config.reminders.advance_min,
                config.reminders.feeding_interval_min
            );
            println!("records: {easy} easy, {feeding} feeding; {pending} pending in spool");
        }
        RemindersAction::Sync => {
            if !config.reminders.enabled {
                return Err("reminders are disabled; run `easyday reminders enable` first".into());
            }
            let summary = sync_now(&config)?;
            println!("{}", summary.message());
        }
        RemindersAction::Feed => {
            let notifier = SpoolNotifier::open()?;
            let store = ReminderStore::open()?;
            let scheduler = ReminderScheduler::new(&notifier, &store);
            let now = Utc::now();
            let target = now + Duration::minutes(config.reminders.feeding_interval_min as i64);
            match scheduler.schedule_feeding(target, now)? {
                Some(_) => println!(
                    "feeding reminder in {} min",
                    config.reminders.feeding_interval_min
                ),
                None => println!("feeding reminder target already passed; nothing scheduled"),
            }
        }
        RemindersAction::Watch => {
            let notifier = SpoolNotifier::open()?;
            println!(
                "watching for due reminders every {}s (ctrl-c to stop)",
                config.daemon.poll_secs
            );
            loop {
                match notifier.deliver_due(Utc::now().timestamp()) {
                    Ok(due) => {
                        for n in due {
                            let shown = notify_rust::Notification::new()
                                .appname("easyday")
                                .summary(&n.title)
                                .body(&n.body)
                                .show();
                            match shown {
                                Ok(_) => log::info!("delivered reminder {}", n.id),
                                Err(e) => log::warn!("failed to show toast for {}: {e}", n.id),
                            }
                        }
                    }
                    Err(e) => log::error!("spool poll failed: {e}"),
                }
                std::thread::sleep(std::time::Duration::from_secs(config.daemon.poll_secs));
            }
        }
    }
    Ok(())
}
