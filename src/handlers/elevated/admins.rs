// handlers/elevated/admins.rs - GET|POST /api/admins handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::models::{Admin, NewAdmin};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/admins - every identity, oldest first
pub async fn admins_get(State(state): State<AppState>) -> ApiResult<Vec<Admin>> {
    let admins = state.admin_service().list().await?;
    Ok(ApiResponse::success(admins))
}

/**
 * POST /api/admins - Create an identity
 *
 * Body: { "email", "username", "password", "role"? } where role is
 * "standard" (default) or "super-admin". A taken email or username is 409.
 */
pub async fn admins_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewAdmin>, JsonRejection>,
) -> ApiResult<Admin> {
    let Json(new_admin) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let admin = state.admin_service().create_admin(new_admin).await?;
    tracing::info!("'{}' created {} identity '{}'", claims.username, admin.role, admin.username);
    Ok(ApiResponse::created(admin))
}
