// handlers/elevated/tweets.rs - DELETE /api/tweets/:id handler

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn tweet_delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let not_found = || ApiError::not_found(format!("Tweet '{}' not found", id));
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;

    if !state.tweets.delete(uuid).await? {
        return Err(not_found());
    }

    tracing::info!("Tweet {} deleted by '{}'", uuid, claims.username);
    Ok(ApiResponse::success(json!({ "id": uuid, "deleted": true })))
}
