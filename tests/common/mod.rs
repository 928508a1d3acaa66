#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use tweets_api::app::{router, AppState};
use tweets_api::auth::Role;
use tweets_api::config::AppConfig;
use tweets_api::database::models::{NewAdmin, NewTweet};

pub const ROOT_EMAIL: &str = "root@x.com";
pub const ROOT_USERNAME: &str = "root";
pub const ROOT_PASSWORD: &str = "p@ss";

/// Configuration for one isolated test app. `extra` entries win over the defaults.
pub fn test_config(extra: &[(&str, &str)]) -> Result<AppConfig> {
    let super_admins = json!([
        { "email": ROOT_EMAIL, "username": ROOT_USERNAME, "password": ROOT_PASSWORD }
    ])
    .to_string();

    let defaults = [
        ("JWT_SECRET", "integration-test-secret"),
        ("DATABASE_URL", "sqlite::memory:"),
        ("SECURITY_BCRYPT_COST", "4"),
        ("FILTER_DEFAULT_LIMIT", "5"),
        ("FILTER_MAX_LIMIT", "10"),
    ];

    let config = AppConfig::from_lookup(|key| {
        if let Some((_, v)) = extra.iter().find(|(k, _)| *k == key) {
            return Some(v.to_string());
        }
        if key == "SUPER_ADMINS" {
            return Some(super_admins.clone());
        }
        defaults.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    })?;
    Ok(config)
}

/// A fully wired router over its own in-memory database, already bootstrapped.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(&[]).await
    }

    pub async fn spawn_with(extra: &[(&str, &str)]) -> Result<Self> {
        let config = test_config(extra)?;
        let super_admins = config.super_admins.clone();
        let state = AppState::build(config).await.context("failed to build state")?;
        state.admin_service().bootstrap(&super_admins).await?;

        Ok(Self {
            router: router(state.clone()),
            state,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, payload))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn login(&self, login: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.request(
            Method::POST,
            "/api/fortauth",
            None,
            Some(json!({ "login": login, "password": password })),
        )
        .await
    }

    pub async fn token_for(&self, login: &str, password: &str) -> Result<String> {
        let (status, body) = self.login(login, password).await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn root_token(&self) -> Result<String> {
        self.token_for(ROOT_EMAIL, ROOT_PASSWORD).await
    }

    /// Creates a standard identity directly in the store and logs it in.
    pub async fn standard_token(&self) -> Result<String> {
        self.state
            .admin_service()
            .create_admin(NewAdmin::new("editor@x.com", "editor", "editor-pass", Role::Standard))
            .await?;
        self.token_for("editor", "editor-pass").await
    }

    /// Five tweets over three days, newest last.
    pub async fn seed_tweets(&self) -> Result<()> {
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap();
        let tweets = [
            NewTweet::new("alice", "hello world").location("NYC").source("web").created_at(at(1, 8)),
            NewTweet::new("alice", "discount 100% off").location("LA").source("android").created_at(at(1, 12)),
            NewTweet::new("alicia", "under_score here").location("NYC").source("iphone").created_at(at(2, 9)),
            NewTweet::new("bob", "Hello from bob").location("Paris").source("web").created_at(at(2, 18)),
            NewTweet::new("carol", "good night").source("web").created_at(at(3, 23)),
        ];
        for tweet in tweets {
            self.state.tweets.insert(tweet).await?;
        }
        Ok(())
    }
}

/// Percent-encodes a query value.
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
