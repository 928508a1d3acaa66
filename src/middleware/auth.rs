use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{authorize, Role, TokenService};
use crate::error::ApiError;

/// Admits any valid token. Inserts the verified `Claims` into request extensions.
pub async fn require_standard(
    State(tokens): State<Arc<TokenService>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate(&tokens, Role::Standard, request, next).await
}

/// Admits only `super-admin` tokens.
pub async fn require_super_admin(
    State(tokens): State<Arc<TokenService>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate(&tokens, Role::SuperAdmin, request, next).await
}

async fn gate(tokens: &TokenService, required: Role, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers());
    let claims = authorize(tokens, token, required)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// `Authorization: Bearer <token>`. Anything else counts as no token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
