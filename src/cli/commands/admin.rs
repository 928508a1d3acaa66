use anyhow::Context;
use clap::Subcommand;

use crate::app::AppState;
use crate::auth::Role;
use crate::cli::utils::{output_collection, output_success};
use crate::cli::OutputFormat;
use crate::database::models::NewAdmin;
use crate::services::AdminServiceError;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an identity")]
    Create {
        #[arg(long, help = "Email address (unique)")]
        email: String,

        #[arg(long, help = "Username (unique)")]
        username: String,

        #[arg(long, help = "Plaintext password, hashed before storage")]
        password: String,

        #[arg(long, help = "Grant the super-admin role")]
        super_admin: bool,
    },

    #[command(about = "List all identities")]
    List,
}

pub async fn handle(cmd: AdminCommands, state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = state.admin_service();

    match cmd {
        AdminCommands::Create {
            email,
            username,
            password,
            super_admin,
        } => {
            let role = if super_admin { Role::SuperAdmin } else { Role::Standard };
            let admin = match service.create_admin(NewAdmin::new(email, username, password, role)).await {
                Ok(admin) => admin,
                Err(AdminServiceError::Validation(field_errors)) => {
                    let mut fields: Vec<_> = field_errors.into_iter().collect();
                    fields.sort();
                    let details: Vec<String> = fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                    anyhow::bail!("Invalid identity ({})", details.join("; "));
                }
                Err(e) => return Err(e).context("Failed to create identity"),
            };

            output_success(
                output_format,
                &format!("Created {} identity '{}' <{}>", admin.role, admin.username, admin.email),
                Some(serde_json::to_value(&admin)?),
            )
        }
        AdminCommands::List => {
            let admins = service.list().await.context("Failed to list identities")?;
            let header = format!(
                "{:<36}  {:<30}  {:<20}  {:<11}  {}",
                "ID", "EMAIL", "USERNAME", "ROLE", "CREATED"
            );
            output_collection(output_format, &admins, "No identities found", &header, |admin| {
                format!(
                    "{:<36}  {:<30}  {:<20}  {:<11}  {}",
                    admin.id.to_string(),
                    admin.email,
                    admin.username,
                    admin.role.as_str(),
                    admin.created_at.format("%Y-%m-%d %H:%M")
                )
            })
        }
    }
}
