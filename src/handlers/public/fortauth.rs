// handlers/public/fortauth.rs - POST /api/fortauth handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginResponse;

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Email or username.
    pub login: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// First non-blank of `login`, `email`, `username`.
    fn identifier(&self) -> Option<&str> {
        [&self.login, &self.email, &self.username]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

/**
 * POST /api/fortauth - Authenticate and receive a bearer token
 *
 * Body: { "login": "root@x.com", "password": "..." } (`email` or `username`
 * are accepted in place of `login`; when several are sent, `login` wins,
 * then `email`).
 *
 * Unknown logins and wrong passwords both answer 404 with the same message.
 */
pub async fn fortauth_post(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let login = match request.identifier() {
        Some(login) if !request.password.is_empty() => login,
        _ => return Err(ApiError::bad_request("Both login and password are required")),
    };

    let response = state
        .admin_service()
        .login(login, &request.password)
        .await?;
    Ok(ApiResponse::success(response))
}
