pub mod baby;
pub mod config;
pub mod formula;
pub mod reminders;
pub mod schedule;
pub mod startup;
