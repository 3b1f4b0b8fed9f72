//! Built-in formula presets with curated phase timings.
//!
//! These presets follow the common age-banded EASY routines
//! (3h, 3.5h, 4h cycles and the 2-3-4 two-nap day).

use super::{CyclePhase, Formula};

/// A built-in formula plus the guidance text shown alongside it.
#[derive(Debug, Clone)]
pub struct FormulaPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub guidance: String,
    /// Inclusive age band in weeks; `None` upper bound means open-ended.
    pub age_weeks: (u32, Option<u32>),
    pub phases: Vec<CyclePhase>,
}

impl FormulaPreset {
    /// Materialize as a formula usable by the generator and stores.
    pub fn to_formula(&self) -> Formula {
        Formula {
            id: self.id.to_string(),
            name: self.name.to_string(),
            phases: self.phases.clone(),
            valid_date: None,
            baby_id: None,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Returns all built-in presets, youngest band first.
pub fn builtin_presets() -> Vec<FormulaPreset> {
    vec![easy_three(), easy_three_half(), easy_four(), two_three_four()]
}

/// Find a built-in preset by ID.
pub fn find_preset(id: &str) -> Option<FormulaPreset> {
    builtin_presets().into_iter().find(|p| p.id == id)
}

/// Get preset IDs for listing.
pub fn preset_ids() -> Vec<&'static str> {
    vec!["easy-3", "easy-3-5", "easy-4", "two-three-four"]
}

/// The preset whose age band contains `age_weeks`.
pub fn preset_by_age(age_weeks: u32) -> FormulaPreset {
    match age_weeks {
        0..=11 => easy_three(),
        12..=17 => easy_three_half(),
        18..=25 => easy_four(),
        _ => two_three_four(),
    }
}

// ============================================================================
// BUILT-IN PRESETS
// ============================================================================

/// EASY 3
///
/// Three-hour cycles for newborns. Five cycles from wake to bedtime.
fn easy_three() -> FormulaPreset {
    FormulaPreset {
        id: "easy-3",
        name: "EASY 3",
        description: "3-hour cycles for newborns (0-3 months)",
        guidance: indoc::indoc! {"
            Newborns run on roughly three-hour loops: a feed, a short
            stretch of awake time, then a long nap. Keeping the feed at
            the start of each cycle (eat after sleep, not before) helps
            the baby fall asleep without feeding to sleep.

            Expect five cycles across the day. Awake windows this young
            are short; if the baby fights the nap, shorten activity
            rather than stretching it.
        "}
        .to_string(),
        age_weeks: (0, Some(11)),
        phases: vec![CyclePhase::new(30, 45, 105); 5],
    }
}

/// EASY 3.5
///
/// Slightly longer cycles as awake windows stretch.
fn easy_three_half() -> FormulaPreset {
    FormulaPreset {
        id: "easy-3-5",
        name: "EASY 3.5",
        description: "3.5-hour cycles for 3-4 month olds",
        guidance: indoc::indoc! {"
            Around three months the awake window stretches and feeds
            space out. The cycle grows to three and a half hours with
            the extra half hour going to activity, not to the nap.

            Four cycles fill the day. If naps shorten to 45 minutes
            during the regression window, keep the cycle boundaries
            where they are and bridge with quiet time.
        "}
        .to_string(),
        age_weeks: (12, Some(17)),
        phases: vec![CyclePhase::new(30, 75, 105); 4],
    }
}

/// EASY 4
///
/// Four-hour cycles, three naps consolidating into two.
fn easy_four() -> FormulaPreset {
    FormulaPreset {
        id: "easy-4",
        name: "EASY 4",
        description: "4-hour cycles for 4-6 month olds",
        guidance: indoc::indoc! {"
            By four months most babies manage a two-hour awake window
            and a four-hour loop between feeds. Naps consolidate: fewer,
            longer, and more predictable.

            Three cycles make up the day. The last nap is often the
            shortest; protect the first two and let the third flex.
        "}
        .to_string(),
        age_weeks: (18, Some(25)),
        phases: vec![CyclePhase::new(30, 120, 90); 3],
    }
}

/// 2-3-4
///
/// Two-nap day driven by awake windows of 2, 3, then 4 hours.
fn two_three_four() -> FormulaPreset {
    FormulaPreset {
        id: "two-three-four",
        name: "2-3-4",
        description: "Two-nap day for 6 months and up",
        guidance: indoc::indoc! {"
            The 2-3-4 routine drops to two naps and counts awake
            windows instead of fixed cycle lengths: two hours from
            morning wake to nap one, three hours from nap one to nap
            two, four hours from nap two to bedtime.

            The final block ends with bedtime; the evening after that
            is yours.
        "}
        .to_string(),
        age_weeks: (26, None),
        phases: vec![
            CyclePhase::new(30, 90, 90),
            CyclePhase::new(30, 150, 90),
            CyclePhase::new(30, 210, 90),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_presets_have_valid_fields() {
        let presets = builtin_presets();
        assert!(!presets.is_empty());

        for preset in &presets {
            assert!(!preset.id.is_empty());
            assert!(!preset.name.is_empty());
            assert!(!preset.description.is_empty());
            assert!(!preset.guidance.is_empty());
            assert!(!preset.phases.is_empty());
            assert!(preset.to_formula().validate().is_ok());
        }
    }

    #[test]
    fn find_preset_returns_correct_preset() {
        let preset = find_preset("easy-3");
        assert!(preset.is_some());
        assert_eq!(preset.unwrap().name, "EASY 3");

        let missing = find_preset("nonexistent");
        assert!(missing.is_none());
    }

    #[test]
    fn preset_ids_match_actual_presets() {
        let ids = preset_ids();
        let presets = builtin_presets();

        assert_eq!(ids.len(), presets.len());
        for id in ids {
            assert!(find_preset(id).is_some(), "Preset {} not found", id);
        }
    }

    #[test]
    fn age_bands_cover_every_week_without_gaps() {
        // Adjacent bands must meet exactly.
        let presets = builtin_presets();
        for pair in presets.windows(2) {
            let upper = pair[0].age_weeks.1.unwrap();
            assert_eq!(pair[1].age_weeks.0, upper + 1);
        }
        assert!(presets.last().unwrap().age_weeks.1.is_none());
    }

    #[test]
    fn preset_by_age_picks_the_containing_band() {
        assert_eq!(preset_by_age(0).id, "easy-3");
        assert_eq!(preset_by_age(11).id, "easy-3");
        assert_eq!(preset_by_age(12).id, "easy-3-5");
        assert_eq!(preset_by_age(20).id, "easy-4");
        assert_eq!(preset_by_age(26).id, "two-three-four");
        assert_eq!(preset_by_age(104).id, "two-three-four");
    }

    #[test]
    fn newborn_cycles_are_three_hours() {
        let preset = find_preset("easy-3").unwrap();
        for phase in &preset.phases {
            assert_eq!(phase.total_min(), 180);
        }
    }

    #[test]
    fn all_presets_fit_within_a_day() {
        for preset in builtin_presets() {
            assert!(preset.to_formula().total_duration_min() < 1440);
        }
    }
}
