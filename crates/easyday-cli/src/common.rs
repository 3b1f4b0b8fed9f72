//! Shared helpers for CLI commands.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use easyday_core::profile::BabyProfile;
use easyday_core::schedule::{generate, overlay, ScheduleItem};
use easyday_core::storage::{AdjustmentStore, Database};
use easyday_core::{PhaseLabels, ReminderError};

/// The active baby profile, or a friendly error telling the user how to
/// create one.
pub fn active_profile(db: &Database) -> Result<BabyProfile, Box<dyn std::error::Error>> {
    Ok(db.active_profile()?.ok_or(ReminderError::NoActiveProfile)?)
}

/// Today's calendar date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local wall-clock now, in minutes since midnight.
pub fn now_minutes() -> u32 {
    use chrono::Timelike;
    let t = Local::now().time();
    t.hour() * 60 + t.minute()
}

/// The UTC instant of local midnight on `date`.
///
/// Falls back to UTC midnight when the local midnight does not exist
/// (DST gap), which keeps the anchor within the same day.
pub fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today.
pub fn parse_date_arg(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(s
            .parse()
            .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))?),
        None => Ok(today()),
    }
}

/// One day's generated schedule with that day's adjustments applied.
pub fn items_for_day(
    db: &Database,
    adjustments: &AdjustmentStore,
    profile: &BabyProfile,
    date: NaiveDate,
    labels: &PhaseLabels,
) -> Result<Vec<ScheduleItem>, Box<dyn std::error::Error>> {
    let formula = db.formula_for_day(profile, date)?;
    formula.validate()?;
    let base = generate(profile.first_wake, &formula.phases, labels);
    let overrides = adjustments.for_day(&profile.id, date)?;
    Ok(overlay(&base, &overrides))
}
