//! Daily schedule generation, grouping, and per-day adjustment overlay.
//!
//! Everything in this module is pure: the generator, grouping, progress,
//! and overlay functions take values and return values, with no I/O. The
//! stores that feed them live under [`crate::storage`].

pub mod generator;
pub mod grouping;
pub mod overlay;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;

pub use generator::generate;
pub use grouping::{absolute_spans, compute_progress, group, GroupProgress, ScheduleGroup};
pub use overlay::overlay;

/// What a schedule item is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "E")]
    Eat,
    #[serde(rename = "A")]
    Activity,
    #[serde(rename = "S")]
    Sleep,
    /// Trailing caregiver's-own-time marker after the last cycle.
    #[serde(rename = "Y")]
    YourTime,
}

impl ItemKind {
    pub fn code(self) -> char {
        match self {
            ItemKind::Eat => 'E',
            ItemKind::Activity => 'A',
            ItemKind::Sleep => 'S',
            ItemKind::YourTime => 'Y',
        }
    }
}

/// One atomic, time-stamped segment of a generated day.
///
/// Derived, never persisted. `order` is the stable key adjustments and
/// reminders refer to. Wall-clock starts wrap at midnight; consumers that
/// need a linear axis use [`grouping::absolute_spans`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub order: u32,
    pub kind: ItemKind,
    pub label: String,
    pub start: ClockTime,
    pub duration_min: u32,
}

impl ScheduleItem {
    /// Wall-clock end, wrapped past midnight.
    pub fn end(&self) -> ClockTime {
        self.start.wrapping_add(self.duration_min)
    }
}

/// A single-day, single-item override of generated timing.
///
/// At most one per `(baby, date, item_order)`; saving a new one replaces
/// the old. Never carried forward to later days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAdjustment {
    pub baby_id: String,
    pub date: NaiveDate,
    pub item_order: u32,
    pub start: ClockTime,
    pub duration_min: u32,
}
