//! Cycle formula commands: presets, custom formulas, selection.

use clap::Subcommand;

use easyday_core::formula::{builtin_presets, find_preset, CyclePhase, Formula, FormulaSelection};
use easyday_core::storage::Database;

use crate::common;

#[derive(Subcommand)]
pub enum FormulaAction {
    /// List built-in presets and custom formulas
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one formula's phases (and guidance for presets)
    Show {
        /// Formula id
        id: String,
    },
    /// Add a custom formula
    Add {
        /// Formula name
        name: String,
        /// Phases as eat:activity:sleep minute triples, comma-separated
        /// (e.g. "30:90:120,30:60:90")
        phases: String,
        /// Scope to today only and select it for today
        #[arg(long)]
        today: bool,
    },
    /// Select a formula for every day
    Use {
        /// Formula id, or "age" for age-based auto-selection
        id: String,
    },
    /// Select a formula for today only
    UseToday {
        /// Formula id
        id: String,
        /// Day to override (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
}

fn parse_phases(s: &str) -> Result<Vec<CyclePhase>, Box<dyn std::error::Error>> {
    let mut phases = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let nums: Vec<&str> = part.trim().split(':').collect();
        if nums.len() != 3 {
            return Err(format!(
                "phase {} must be eat:activity:sleep minutes, got '{}'",
                i + 1,
                part.trim()
            )
            .into());
        }
        let parse = |v: &str, field: &str| -> Result<u32, Box<dyn std::error::Error>> {
            v.parse()
                .map_err(|_| format!("phase {}: {field} '{v}' is not a number", i + 1).into())
        };
        phases.push(CyclePhase::new(
            parse(nums[0], "eat")?,
            parse(nums[1], "activity")?,
            parse(nums[2], "sleep")?,
        ));
    }
    if phases.is_empty() {
        return Err("at least one phase is required".into());
    }
    Ok(phases)
}

/// The recurring fallback a new day override should revert to.
fn recurring_fallback(selection: &FormulaSelection) -> Option<String> {
    match selection {
        FormulaSelection::ByAge => None,
        FormulaSelection::Recurring { formula_id } => Some(formula_id.clone()),
        FormulaSelection::DayOverride { recurring, .. } => recurring.clone(),
    }
}

pub fn run(action: FormulaAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        FormulaAction::List { json } => {
            let baby_id = db.active_profile()?.map(|p| p.id);
            let custom = db.list_formulas(baby_id.as_deref())?;
            if json {
                let presets: Vec<Formula> = builtin_presets().iter().map(|p| p.to_formula()).collect();
                let all: Vec<&Formula> = presets.iter().chain(custom.iter()).collect();
                println!("{}", serde_json::to_string_pretty(&all)?);
                return Ok(());
            }
            println!("built-in presets:");
            for preset in builtin_presets() {
                println!(
                    "  {}  {}  ({})",
                    preset.id, preset.name, preset.description
                );
            }
            if !custom.is_empty() {
                println!("custom formulas:");
                for f in custom {
                    let scope = match f.valid_date {
                        Some(d) => format!("  [{d} only]"),
                        None => String::new(),
                    };
                    println!("  {}  {}{}", f.id, f.name, scope);
                }
            }
        }
        FormulaAction::Show { id } => {
            if let Some(preset) = find_preset(&id) {
                println!("{} — {}", preset.name, preset.description);
                println!();
                for (i, p) in preset.phases.iter().enumerate() {
                    println!(
                        "  cycle {}: eat {}m, activity {}m, sleep {}m",
                        i + 1,
                        p.eat_min,
                        p.activity_min,
                        p.sleep_min
                    );
                }
                println!();
                println!("{}", preset.guidance.trim_end());
                return Ok(());
            }
            let formula = db
                .get_formula(&id)?
                .ok_or_else(|| format!("no formula with id '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(&formula)?);
        }
        FormulaAction::Add { name, phases, today } => {
            let phases = parse_phases(&phases)?;
            let profile = common::active_profile(&db)?;
            let mut formula = Formula::custom(name, phases, Some(profile.id.clone()));
            formula.validate()?;
            if today {
                let date = common::today();
                formula = formula.for_day(date);
                db.save_formula(&formula)?;

                let mut profile = profile;
                profile.selection = FormulaSelection::DayOverride {
                    formula_id: formula.id.clone(),
                    date,
                    recurring: recurring_fallback(&profile.selection),
                };
                db.save_profile(&profile)?;
                println!("added {} ({}) and selected it for {date}", formula.name, formula.id);
            } else {
                db.save_formula(&formula)?;
                println!("added {} ({})", formula.name, formula.id);
            }
        }
        FormulaAction::Use { id } => {
            let mut profile = common::active_profile(&db)?;
            if id == "age" {
                profile.selection = FormulaSelection::ByAge;
                db.save_profile(&profile)?;
                println!("selection: age-based preset");
                return Ok(());
            }
            if find_preset(&id).is_none() {
                let formula = db
                    .get_formula(&id)?
                    .ok_or_else(|| format!("no formula with id '{id}'"))?;
                if formula.valid_date.is_some() {
                    return Err(format!(
                        "formula '{id}' is scoped to a single day; use `easyday formula use-today {id}`"
                    )
                    .into());
                }
            }
            profile.selection = FormulaSelection::Recurring {
                formula_id: id.clone(),
            };
            db.save_profile(&profile)?;
            println!("selection: {id} every day");
        }
        FormulaAction::UseToday { id, date } => {
            let mut profile = common::active_profile(&db)?;
            if find_preset(&id).is_none() && db.get_formula(&id)?.is_none() {
                return Err(format!("no formula with id '{id}'").into());
            }
            let date = common::parse_date_arg(date.as_deref())?;
            profile.selection = FormulaSelection::DayOverride {
                formula_id: id.clone(),
                date,
                recurring: recurring_fallback(&profile.selection),
            };
            db.save_profile(&profile)?;
            println!("selection: {id} on {date} only");
        }
    }
    Ok(())
}
