use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lucero", version, about = "Lucero CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sleep episode log management
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Sleep debt queries
    Debt {
        #[command(subcommand)]
        action: commands::debt::DebtAction,
    },
    /// Recommendations and bandit feedback
    Coach {
        #[command(subcommand)]
        action: commands::coach::CoachAction,
    },
    /// Sleep habit statistics
    Habits {
        #[command(subcommand)]
        action: commands::habits::HabitsAction,
    },
    /// Closed-loop sleeper simulation
    Sim {
        #[command(subcommand)]
        action: commands::sim::SimAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Preset pack management
    Preset {
        #[command(subcommand)]
        action: commands::preset::PresetAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Log { action } => commands::log::run(action),
        Commands::Debt { action } => commands::debt::run(action),
        Commands::Coach { action } => commands::coach::run(action),
        Commands::Habits { action } => commands::habits::run(action),
        Commands::Sim { action } => commands::sim::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Preset { action } => commands::preset::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "lucero", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
