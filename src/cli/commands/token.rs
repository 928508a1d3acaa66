use anyhow::Context;
use clap::Subcommand;

use crate::app::AppState;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Log in locally and print a bearer token")]
    Issue {
        #[arg(long, help = "Email or username")]
        login: String,

        #[arg(long, help = "Password")]
        password: String,
    },
}

pub async fn handle(cmd: TokenCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { login, password } => {
            let response = state
                .admin_service()
                .login(&login, &password)
                .await
                .context("Login failed")?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                // Bare token so shells can capture it.
                OutputFormat::Text => println!("{}", response.token),
            }
            Ok(())
        }
    }
}
