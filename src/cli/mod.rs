pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::AppState;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tweets-admin")]
#[command(about = "Administration CLI for the Tweets API database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the configured super-admins (safe to repeat)")]
    Bootstrap,

    #[command(about = "Identity management")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Token issuance")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Runs one command against the database named by the environment.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let state = AppState::build(config)
        .await
        .context("Failed to open the database")?;

    let result = match cli.command {
        Commands::Bootstrap => commands::bootstrap::handle(&state, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, &state, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, &state, output_format).await,
    };

    state.db.close().await;
    result
}
