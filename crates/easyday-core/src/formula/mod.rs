//! Cycle formulas: the declarative input to schedule generation.
//!
//! A formula is a named, ordered list of eat/activity/sleep phase
//! durations. Built-in presets are selected by baby age; caregivers can
//! author custom formulas, optionally scoped to a single calendar day.

pub mod presets;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::MINUTES_PER_DAY;
use crate::error::ValidationError;

pub use presets::{builtin_presets, find_preset, preset_by_age, preset_ids, FormulaPreset};

/// One eat/activity/sleep triple within a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePhase {
    /// Feeding duration in minutes.
    pub eat_min: u32,
    /// Awake/activity duration in minutes.
    pub activity_min: u32,
    /// Nap duration in minutes.
    pub sleep_min: u32,
}

impl CyclePhase {
    pub fn new(eat_min: u32, activity_min: u32, sleep_min: u32) -> Self {
        Self {
            eat_min,
            activity_min,
            sleep_min,
        }
    }

    pub fn total_min(&self) -> u32 {
        self.eat_min + self.activity_min + self.sleep_min
    }
}

/// A named, ordered list of cycle phases.
///
/// `valid_date` set means this is a one-day custom schedule: it applies on
/// that date only and is never reused on another day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    pub id: String,
    pub name: String,
    pub phases: Vec<CyclePhase>,
    #[serde(default)]
    pub valid_date: Option<NaiveDate>,
    /// Owning profile for custom formulas; `None` for built-in presets.
    #[serde(default)]
    pub baby_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Formula {
    /// Create a caregiver-authored formula with a fresh id.
    pub fn custom(name: impl Into<String>, phases: Vec<CyclePhase>, baby_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            phases,
            valid_date: None,
            baby_id,
            created_at: Utc::now(),
        }
    }

    /// Scope this formula to a single day.
    pub fn for_day(mut self, date: NaiveDate) -> Self {
        self.valid_date = Some(date);
        self
    }

    pub fn total_duration_min(&self) -> u32 {
        self.phases.iter().map(|p| p.total_min()).sum()
    }

    /// Check that the phases describe a schedulable day.
    ///
    /// A single duration may be zero (the generator emits the item and
    /// the reminder layer skips it), but a phase of all zeros or a cycle
    /// total of a full day or more cannot be laid out.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.phases.is_empty() {
            return Err(ValidationError::EmptyCollection("formula phases".to_string()));
        }
        for (i, phase) in self.phases.iter().enumerate() {
            if phase.total_min() == 0 {
                return Err(ValidationError::InvalidPhaseDuration {
                    phase: format!("cycle {}", i + 1),
                    message: "every duration is zero".to_string(),
                });
            }
        }
        let total = self.total_duration_min();
        if total >= u32::from(MINUTES_PER_DAY) {
            return Err(ValidationError::InvalidPhaseDuration {
                phase: self.name.clone(),
                message: format!("cycles sum to {total} minutes, a full day or more"),
            });
        }
        Ok(())
    }
}

/// Caller-supplied display labels for generated items.
///
/// Localization is a collaborator concern; the generator only numbers and
/// concatenates whatever it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseLabels {
    pub eat: String,
    pub activity: String,
    pub sleep: String,
    pub your_time: String,
}

impl Default for PhaseLabels {
    fn default() -> Self {
        Self {
            eat: "Eat".to_string(),
            activity: "Activity".to_string(),
            sleep: "Sleep".to_string(),
            your_time: "Your time".to_string(),
        }
    }
}

/// Which formula is active for a profile.
///
/// The one-day custom schedule is a real variant rather than a nullable
/// date field, so its expiry is explicit: a `DayOverride` applies only on
/// its own date and resolution falls back to the recurring choice on any
/// other day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormulaSelection {
    /// Auto-select a built-in preset from the baby's age.
    ByAge,
    /// A chosen formula used every day.
    Recurring { formula_id: String },
    /// A custom schedule for one day only.
    DayOverride {
        formula_id: String,
        date: NaiveDate,
        /// What the selection reverts to on any other date.
        recurring: Option<String>,
    },
}

impl FormulaSelection {
    /// The formula id in effect on `date`; `None` means age-based auto-selection.
    pub fn formula_id_for(&self, date: NaiveDate) -> Option<&str> {
        match self {
            FormulaSelection::ByAge => None,
            FormulaSelection::Recurring { formula_id } => Some(formula_id),
            FormulaSelection::DayOverride {
                formula_id,
                date: override_date,
                recurring,
            } => {
                if *override_date == date {
                    Some(formula_id)
                } else {
                    recurring.as_deref()
                }
            }
        }
    }

    /// Collapse an expired day override back to its recurring fallback.
    pub fn normalized(self, today: NaiveDate) -> Self {
        match self {
            FormulaSelection::DayOverride { date, recurring, .. } if date < today => match recurring {
                Some(formula_id) => FormulaSelection::Recurring { formula_id },
                None => FormulaSelection::ByAge,
            },
            other => other,
        }
    }
}

impl Default for FormulaSelection {
    fn default() -> Self {
        FormulaSelection::ByAge
    }
}
