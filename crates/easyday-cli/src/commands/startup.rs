//! The app-startup hook: stale-adjustment sweep plus reminder
//! restoration. Every failure here is logged and swallowed — a bad
//! reminder state must never block startup; it just means no reminders
//! this session.

use chrono::Utc;

use easyday_core::reminder::{restore_kind, SpoolNotifier};
use easyday_core::storage::{AdjustmentStore, Config, ReminderKind, ReminderStore};

use crate::commands::reminders;
use crate::common;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match AdjustmentStore::open() {
        Ok(store) => match store.cleanup_stale(common::today()) {
            Ok(removed) => println!("adjustment sweep: removed {removed}"),
            Err(e) => log::error!("adjustment sweep failed: {e}"),
        },
        Err(e) => log::error!("could not open adjustment store: {e}"),
    }

    if !config.reminders.enabled {
        println!("reminders disabled; nothing to restore");
        return Ok(());
    }

    match restore(&config) {
        Ok(()) => {}
        Err(e) => log::error!("reminder restoration failed: {e}"),
    }
    Ok(())
}

fn restore(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = SpoolNotifier::open()?;
    let store = ReminderStore::open()?;
    let now = Utc::now();

    // The feeding slot survives restarts if still pending and future.
    let (feeding, summary) = restore_kind(&notifier, &store, ReminderKind::Feeding, now)?;
    println!("feeding restoration: {}", summary.message());
    if let Some(slot) = feeding.first() {
        log::info!(
            "feeding reminder still active ({})",
            slot.notification_id
        );
    }

    // Easy records are a cache: reconcile the drift, then re-derive the
    // whole set from today's schedule.
    let (_, summary) = restore_kind(&notifier, &store, ReminderKind::Easy, now)?;
    println!("easy restoration: {}", summary.message());

    let summary = reminders::sync_now(config)?;
    println!("reschedule: {}", summary.message());
    Ok(())
}
