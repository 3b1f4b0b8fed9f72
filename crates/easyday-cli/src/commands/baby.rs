//! Baby profile commands.

use clap::Subcommand;

use easyday_core::clock::ClockTime;
use easyday_core::profile::BabyProfile;
use easyday_core::storage::Database;

use crate::common;

#[derive(Subcommand)]
pub enum BabyAction {
    /// Add a baby profile
    Add {
        /// Baby's name
        name: String,
        /// Birthdate (YYYY-MM-DD)
        #[arg(long)]
        birthdate: String,
        /// Morning wake time (HH:MM)
        #[arg(long, default_value = "07:00")]
        wake: String,
    },
    /// List profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch the active profile
    Use {
        /// Profile id or name
        baby: String,
    },
    /// Show the active profile
    Show,
}

pub fn run(action: BabyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        BabyAction::Add {
            name,
            birthdate,
            wake,
        } => {
            let birthdate = birthdate
                .parse()
                .map_err(|_| format!("invalid birthdate '{birthdate}', expected YYYY-MM-DD"))?;
            let wake = ClockTime::parse(&wake)?;
            let profile = BabyProfile::new(name, birthdate, wake);
            db.save_profile(&profile)?;
            // First profile becomes active automatically.
            if db.active_profile()?.is_none() {
                db.set_active_baby(&profile.id)?;
            }
            println!("added {} ({})", profile.name, profile.id);
        }
        BabyAction::List { json } => {
            let profiles = db.list_profiles()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
                return Ok(());
            }
            let active_id = db.active_profile()?.map(|p| p.id);
            for p in profiles {
                let marker = if Some(&p.id) == active_id.as_ref() { "*" } else { " " };
                println!(
                    "{marker} {}  {}  born {}  wakes {}",
                    p.id, p.name, p.birthdate, p.first_wake
                );
            }
        }
        BabyAction::Use { baby } => {
            let profiles = db.list_profiles()?;
            let found = profiles
                .iter()
                .find(|p| p.id == baby || p.name == baby)
                .ok_or_else(|| format!("no profile matching '{baby}'"))?;
            db.set_active_baby(&found.id)?;
            println!("active profile: {} ({})", found.name, found.id);
        }
        BabyAction::Show => {
            let profile = common::active_profile(&db)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
