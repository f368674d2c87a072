pub mod commands;

use clap::{Parser, Subcommand};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "feed-cache")]
#[command(about = "Offline-first feed loader with a local cache")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch the remote feed and replace the local cache with it
    Refresh,

    /// Print the cached feed if it is still fresh
    Load,

    /// Delete the cached feed if it is unreadable or expired
    Validate,

    /// Delete the cached feed unconditionally
    Clear,

    /// Show what the store currently holds
    Status,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        if let Commands::Completions { shell } = self.command {
            commands::generate_completions(shell);
            return Ok(());
        }

        if let Commands::Init { force } = self.command {
            commands::init_logging("info", self.debug, self.verbose, self.json_logs)?;
            return commands::init(self.config, force).await;
        }

        let config = commands::load_config(self.config.as_deref())?;
        commands::init_logging(
            &config.logging.level,
            self.debug,
            self.verbose,
            self.json_logs || config.logging.json_format,
        )?;

        match self.command {
            Commands::Refresh => commands::refresh(&config).await,
            Commands::Load => commands::load(&config).await,
            Commands::Validate => commands::validate(&config).await,
            Commands::Clear => commands::clear(&config).await,
            Commands::Status => commands::status(&config).await,
            Commands::Init { .. } | Commands::Completions { .. } => Ok(()),
        }
    }
}
