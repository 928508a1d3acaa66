use anyhow::Context;
use serde_json::json;

use crate::app::AppState;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub async fn handle(state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    if state.config.super_admins.is_empty() {
        return output_success(
            output_format,
            "No super-admins configured (set SUPER_ADMINS or SUPER_ADMINS_FILE)",
            None,
        );
    }

    let report = state
        .admin_service()
        .bootstrap(&state.config.super_admins)
        .await
        .context("Bootstrap failed")?;

    let message = format!(
        "Bootstrap complete: {} created, {} already present",
        report.created.len(),
        report.existing.len()
    );
    output_success(
        output_format,
        &message,
        Some(json!({ "created": report.created, "existing": report.existing })),
    )
}
