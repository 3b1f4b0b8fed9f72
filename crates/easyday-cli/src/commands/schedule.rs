//! Daily schedule display and per-day adjustments.

use clap::Subcommand;

use easyday_core::clock::ClockTime;
use easyday_core::schedule::{compute_progress, group, generate, ItemKind, ScheduleAdjustment};
use easyday_core::storage::{AdjustmentStore, Config, Database};

use crate::common;

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show a day's schedule
    Show {
        /// Day to show (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's schedule with the current phase highlighted
    Now,
    /// Override one item's timing for a single day
    Adjust {
        /// Item order (as shown by `schedule show`)
        order: u32,
        /// New start time (HH:MM)
        #[arg(long)]
        start: String,
        /// New duration in minutes (default: keep the generated duration)
        #[arg(long)]
        duration: Option<u32>,
        /// Day to adjust (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Reset a day to the default schedule
    Reset {
        /// Day to reset (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let adjustments = AdjustmentStore::open()?;
    let config = Config::load_or_default();
    let labels = config.labels.phase_labels();

    match action {
        ScheduleAction::Show { date, json } => {
            let profile = common::active_profile(&db)?;
            let date = common::parse_date_arg(date.as_deref())?;
            let items = common::items_for_day(&db, &adjustments, &profile, date, &labels)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }
            println!("{} — {date}", profile.name);
            for item in &items {
                println!(
                    "{:>2}  {}  {}  {} ({} min)",
                    item.order,
                    item.kind.code(),
                    item.start,
                    item.label,
                    item.duration_min
                );
            }
        }
        ScheduleAction::Now => {
            let profile = common::active_profile(&db)?;
            let date = common::today();
            let items = common::items_for_day(&db, &adjustments, &profile, date, &labels)?;
            let now_min = common::now_minutes();

            let mut active = None;
            let mut past = Vec::new();
            for g in group(&items) {
                let p = compute_progress(&g, g.base_minutes(), now_min);
                if let Some(order) = p.active_order {
                    active = Some((order, p.active_ratio));
                }
                past.extend(p.past_orders);
            }

            println!("{} — {date}", profile.name);
            for item in &items {
                let marker = match active {
                    Some((order, _)) if order == item.order => ">",
                    _ if past.contains(&item.order) => "x",
                    _ => " ",
                };
                print!("{marker} {}  {} ({} min)", item.start, item.label, item.duration_min);
                if let Some((order, ratio)) = active {
                    if order == item.order {
                        print!("  {:.0}%", ratio * 100.0);
                    }
                }
                println!();
            }
            if active.is_none() && past.is_empty() {
                println!("(day has not started yet)");
            }
        }
        ScheduleAction::Adjust {
            order,
            start,
            duration,
            date,
        } => {
            let profile = common::active_profile(&db)?;
            let date = common::parse_date_arg(date.as_deref())?;
            let start = ClockTime::parse(&start)?;

            // Duration defaults to the generated item's own.
            let formula = db.formula_for_day(&profile, date)?;
            let base = generate(profile.first_wake, &formula.phases, &labels);
            let item = base
                .iter()
                .find(|i| i.order == order)
                .ok_or_else(|| format!("no schedule item with order {order}"))?;
            if item.kind == ItemKind::YourTime {
                return Err("the trailing your-time item cannot be adjusted".into());
            }

            adjustments.save(&ScheduleAdjustment {
                baby_id: profile.id.clone(),
                date,
                item_order: order,
                start,
                duration_min: duration.unwrap_or(item.duration_min),
            })?;
            println!("adjusted {} to start {start} on {date}", item.label);
            if config.reminders.enabled {
                println!("run `easyday reminders sync` to update reminders");
            }
        }
        ScheduleAction::Reset { date } => {
            let profile = common::active_profile(&db)?;
            let date = common::parse_date_arg(date.as_deref())?;
            let removed = adjustments.delete_day(&profile.id, date)?;
            println!("removed {removed} adjustment(s) for {date}");
            if removed > 0 && config.reminders.enabled {
                println!("run `easyday reminders sync` to update reminders");
            }
        }
    }
    Ok(())
}
