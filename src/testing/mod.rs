use crate::app::AppState;
use crate::config::AppConfig;

pub const TEST_SECRET: &str = "unit-test-secret";

/// Configuration for an isolated in-memory database with a cheap bcrypt cost.
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "SECURITY_BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

pub async fn test_state() -> AppState {
    AppState::build(test_config())
        .await
        .expect("in-memory state builds")
}
