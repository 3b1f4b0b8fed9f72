//! Per-day adjustment overlay on generated schedules.

use super::{ScheduleAdjustment, ScheduleItem};

/// Substitute adjusted start/duration into a generated sequence.
///
/// Only items whose `order` has an adjustment change; everything else is
/// returned untouched, and nothing ripples — an earlier item's new
/// duration does not shift later items. The generator's output itself is
/// never mutated, so dropping the adjustments restores the base schedule
/// exactly.
pub fn overlay(items: &[ScheduleItem], adjustments: &[ScheduleAdjustment]) -> Vec<ScheduleItem> {
    items
        .iter()
        .map(|item| {
            match adjustments.iter().find(|a| a.item_order == item.order) {
                Some(adj) => ScheduleItem {
                    start: adj.start,
                    duration_min: adj.duration_min,
                    ..item.clone()
                },
                None => item.clone(),
            }
        })
        .collect()
}
