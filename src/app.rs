use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{TokenError, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{AdminStore, Database, DatabaseError, TweetStore};
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_standard, require_super_admin};
use crate::services::AdminService;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Token service: {0}")]
    Token(#[from] TokenError),

    #[error("Database: {0}")]
    Database(#[from] DatabaseError),
}

/// Everything a request handler may touch, built once and cloned per request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub admins: AdminStore,
    pub tweets: TweetStore,
}

impl AppState {
    /// Connects to the database, applies the schema and wires the stores.
    pub async fn build(config: AppConfig) -> Result<Self, StartupError> {
        let tokens = TokenService::from_config(&config.security)?;
        let db = Database::connect(&config.database).await?;
        db.migrate().await?;

        Ok(Self {
            admins: AdminStore::new(db.clone(), config.security.bcrypt_cost),
            tweets: TweetStore::new(db.clone(), config.filter.clone()),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            db,
        })
    }

    pub fn admin_service(&self) -> AdminService {
        AdminService::new(self.admins.clone(), self.tokens.clone())
    }
}

pub fn router(state: AppState) -> Router {
    let standard = from_fn_with_state(state.tokens.clone(), require_standard);
    let super_admin = from_fn_with_state(state.tokens.clone(), require_super_admin);

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/fortauth", post(public::fortauth_post))
        .route("/api/tweets", get(public::tweets_get))
        .route("/api/tweets/tweet", get(public::tweets_by_text))
        .route("/api/tweets/author", get(public::tweets_by_author))
        .route("/api/tweets/date", get(public::tweets_by_date))
        .route("/api/tweets/location", get(public::tweets_by_location))
        .route("/api/tweets/source", get(public::tweets_by_source))
        .route("/api/tweets/:id", get(public::tweet_get));

    let protected_routes = Router::new()
        .route("/api/tweets", post(protected::tweet_post))
        .route("/api/admins/me", get(protected::whoami_get))
        .route_layer(standard);

    let elevated_routes = Router::new()
        .route("/api/tweets/:id", delete(elevated::tweet_delete))
        .route("/api/admins", get(elevated::admins_get).post(elevated::admins_post))
        .route_layer(super_admin);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(elevated_routes)
        .fallback(not_found)
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unusable CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Tweets API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "POST /api/fortauth (public - token acquisition)",
                "tweets": "GET /api/tweets[/tweet|/author|/date|/location|/source|/:id] (public)",
                "tweets_write": "POST /api/tweets (standard), DELETE /api/tweets/:id (super-admin)",
                "admins": "GET /api/admins/me (standard), GET|POST /api/admins (super-admin)",
                "health": "GET /health (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
