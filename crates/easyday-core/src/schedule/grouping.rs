//! Cycle grouping and progress: which item is active right now.
//!
//! Past/active classification here feeds display state only. Reminder
//! side effects are driven by [`crate::reminder::scheduler`] alone.

use crate::clock::MINUTES_PER_DAY;

use super::{ItemKind, ScheduleItem};

/// A maximal Eat-to-next-Eat run of items; one feed/activity/sleep cycle.
///
/// Display only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGroup {
    pub items: Vec<ScheduleItem>,
}

impl ScheduleGroup {
    /// Wall-clock start of the group's first item, in minutes.
    pub fn base_minutes(&self) -> u32 {
        self.items.first().map(|i| i.start.minutes() as u32).unwrap_or(0)
    }

    pub fn total_duration_min(&self) -> u32 {
        self.items.iter().map(|i| i.duration_min).sum()
    }
}

/// Partition a generated sequence into cycles.
///
/// A new group starts at every Eat item; the trailing Your-Time item is
/// excluded from grouping.
pub fn group(items: &[ScheduleItem]) -> Vec<ScheduleGroup> {
    let mut groups: Vec<ScheduleGroup> = Vec::new();
    let mut current: Vec<ScheduleItem> = Vec::new();

    for item in items {
        if item.kind == ItemKind::YourTime {
            continue;
        }
        if item.kind == ItemKind::Eat && !current.is_empty() {
            groups.push(ScheduleGroup {
                items: std::mem::take(&mut current),
            });
        }
        current.push(item.clone());
    }
    if !current.is_empty() {
        groups.push(ScheduleGroup { items: current });
    }

    groups
}

/// Progress of one group at a given moment.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupProgress {
    /// Order of the item "now" falls inside, if any.
    pub active_order: Option<u32>,
    /// Orders already fully elapsed.
    pub past_orders: Vec<u32>,
    /// Elapsed fraction of the active item, clamped to [0, 1].
    pub active_ratio: f64,
}

/// Classify a group's items as past/active/future at `now_min`.
///
/// `base_min` is the group's wall-clock start in minutes and `now_min`
/// the wall-clock now, both wrapped at 1440. When the group spans
/// midnight and now reads earlier than the base, now is lifted by one
/// day onto the group's linear axis before comparing, so a 01:00 check
/// against a sleep that began at 23:00 lands inside it rather than a day
/// away. Zero-duration items are never active and report ratio 0.
pub fn compute_progress(group: &ScheduleGroup, base_min: u32, now_min: u32) -> GroupProgress {
    let day = MINUTES_PER_DAY as u32;
    let spans_midnight = base_min + group.total_duration_min() > day;

    let mut now = now_min;
    if now < base_min && spans_midnight {
        now += day;
    }

    let mut past_orders = Vec::new();
    let mut active_order = None;
    let mut active_ratio = 0.0;

    let mut cursor = base_min;
    for item in &group.items {
        let end = cursor + item.duration_min;
        if now >= end {
            past_orders.push(item.order);
        } else if now >= cursor && active_order.is_none() {
            active_order = Some(item.order);
            active_ratio = if item.duration_min == 0 {
                0.0
            } else {
                ((now - cursor) as f64 / item.duration_min as f64).clamp(0.0, 1.0)
            };
        }
        cursor = end;
    }

    GroupProgress {
        active_order,
        past_orders,
        active_ratio,
    }
}

/// Unwrapped start/end offsets for a whole (possibly adjusted) sequence.
///
/// Offsets are minutes from the midnight of the day the schedule anchors
/// on; `anchor_min` is the wake time on that axis. Each item is placed
/// from its own wall-clock start: a start reading more than half a day
/// behind the running position is a midnight wrap and moves forward one
/// day, more than half a day ahead is a drag back across midnight and
/// moves one day back. Anything within half a day is taken as-is, which
/// keeps dragged-earlier adjustments on the correct day.
pub fn absolute_spans(items: &[ScheduleItem], anchor_min: u32) -> Vec<(u32, u32)> {
    let day = MINUTES_PER_DAY as u32;
    let half = day / 2;
    let mut spans = Vec::with_capacity(items.len());
    let mut track = anchor_min;

    for item in items {
        let day_base = (track / day) * day;
        let mut start = day_base + item.start.minutes() as u32;
        if start + half < track {
            start += day;
        } else if start > track + half {
            start = start.saturating_sub(day);
        }
        let end = start + item.duration_min;
        spans.push((start, end));
        track = track.max(end);
    }

    spans
}
