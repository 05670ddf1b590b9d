use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod config;
mod error;
mod git;
mod github;
mod provision;
mod sync;
mod ui;

pub use error::{NotesSyncError, Result};

use cli::commands::config::SettingKey;

#[derive(Parser)]
#[command(name = "notes-sync")]
#[command(about = "Keeps a Git-backed notes directory synchronized with a private GitHub repository")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the notes repository and provision its GitHub remote
    Init {
        /// Notes directory (defaults to the current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Base name for the hosted repository (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Commit and push local note changes now
    Sync,

    /// Watch the notes directory and sync on save/timer triggers
    Watch,

    /// Show working-copy and upstream status
    Status,

    /// Inspect or update configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Update a configuration value
    Set {
        /// Which setting to change
        key: SettingKey,

        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, name } => {
            cli::commands::init::execute(path, name).await?;
            Ok(())
        }
        Commands::Sync => {
            cli::commands::sync::execute()?;
            Ok(())
        }
        Commands::Watch => {
            cli::commands::watch::execute().await?;
            Ok(())
        }
        Commands::Status => {
            cli::commands::status::execute()?;
            Ok(())
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                cli::commands::config::show()?;
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                cli::commands::config::set(key, &value)?;
                Ok(())
            }
        },
    }
}
