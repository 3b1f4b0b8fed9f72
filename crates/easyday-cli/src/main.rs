use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "easyday", version, about = "EASY routine schedules and reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Baby profile management
    Baby {
        #[command(subcommand)]
        action: commands::baby::BabyAction,
    },
    /// Cycle formula management
    Formula {
        #[command(subcommand)]
        action: commands::formula::FormulaAction,
    },
    /// Daily schedule display and adjustments
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Phase-end reminder management
    Reminders {
        #[command(subcommand)]
        action: commands::reminders::RemindersAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Startup hook: restore reminders and sweep stale adjustments
    Startup,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Baby { action } => commands::baby::run(action),
        Commands::Formula { action } => commands::formula::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Reminders { action } => commands::reminders::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Startup => commands::startup::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "easyday", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
