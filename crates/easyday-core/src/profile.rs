//! Baby profiles: who the schedule is for.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::formula::FormulaSelection;

/// A baby profile with its routine anchor points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BabyProfile {
    pub id: String,
    pub name: String,
    pub birthdate: NaiveDate,
    /// Morning wake time the day's schedule starts from.
    pub first_wake: ClockTime,
    #[serde(default)]
    pub selection: FormulaSelection,
    pub created_at: DateTime<Utc>,
}

impl BabyProfile {
    pub fn new(name: impl Into<String>, birthdate: NaiveDate, first_wake: ClockTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            birthdate,
            first_wake,
            selection: FormulaSelection::default(),
            created_at: Utc::now(),
        }
    }

    /// Completed weeks of age on a given date. Dates before the
    /// birthdate count as zero.
    pub fn age_weeks(&self, on: NaiveDate) -> u32 {
        let days = (on - self.birthdate).num_days().max(0);
        (days / 7) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn age_weeks_counts_completed_weeks() {
        let p = BabyProfile::new("Mika", d("2024-01-01"), ClockTime::parse("07:00").unwrap());
        assert_eq!(p.age_weeks(d("2024-01-01")), 0);
        assert_eq!(p.age_weeks(d("2024-01-07")), 0);
        assert_eq!(p.age_weeks(d("2024-01-08")), 1);
        assert_eq!(p.age_weeks(d("2024-03-01")), 8);
    }

    #[test]
    fn age_weeks_is_zero_before_birth() {
        let p = BabyProfile::new("Mika", d("2024-06-01"), ClockTime::parse("07:00").unwrap());
        assert_eq!(p.age_weeks(d("2024-05-01")), 0);
    }
}
