// handlers/protected/whoami.rs - GET /api/admins/me handler

use axum::{extract::State, Extension};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::Claims;
use crate::database::models::Admin;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub claims: Claims,
    pub admin: Admin,
}

/// GET /api/admins/me - the verified token claims plus the stored identity
pub async fn whoami_get(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<WhoAmI> {
    let admin = state.admin_service().find(claims.sub).await?;
    Ok(ApiResponse::success(WhoAmI { claims, admin }))
}
