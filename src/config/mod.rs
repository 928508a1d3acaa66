use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

/// Longest accepted token lifetime, one year.
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub super_admins: Vec<SuperAdmin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub default_limit: i64,
    pub max_limit: i64,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// A super-admin identity applied at every process start.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperAdmin {
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for SuperAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperAdmin")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct SuperAdminsFile {
    #[serde(default)]
    super_admins: Vec<SuperAdmin>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse super admin list from {origin}: {reason}")]
    SuperAdmins { origin: String, reason: String },
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Filter overrides
        if let Some(v) = lookup("FILTER_DEFAULT_LIMIT") {
            self.filter.default_limit = parse_value("FILTER_DEFAULT_LIMIT", &v)?;
        }
        if let Some(v) = lookup("FILTER_MAX_LIMIT") {
            self.filter.max_limit = parse_value("FILTER_MAX_LIMIT", &v)?;
        }
        if let Some(v) = lookup("FILTER_DEBUG_LOGGING") {
            self.filter.debug_logging = parse_value("FILTER_DEBUG_LOGGING", &v)?;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_QUERY_TIMEOUT_SECS") {
            self.database.query_timeout_secs = parse_value("DATABASE_QUERY_TIMEOUT_SECS", &v)?;
        }

        // API overrides
        if let Some(v) = lookup("API_HOST") {
            self.api.host = v;
        }
        if let Some(v) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.api.port = parse_value("API_PORT", &v)?;
        }

        // Security overrides
        self.security.jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_value("SECURITY_JWT_EXPIRY_HOURS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = parse_value("SECURITY_BCRYPT_COST", &v)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse_value("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Bootstrap identities: inline JSON first, then a YAML settings file
        if let Some(v) = lookup("SUPER_ADMINS") {
            self.super_admins = serde_json::from_str(&v).map_err(|e| ConfigError::SuperAdmins {
                origin: "SUPER_ADMINS".to_string(),
                reason: e.to_string(),
            })?;
        }
        if let Some(path) = lookup("SUPER_ADMINS_FILE") {
            self.super_admins.extend(load_super_admins_file(Path::new(&path))?);
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.security.jwt_secret.len() < 32 {
            tracing::warn!("JWT_SECRET is shorter than 32 bytes; use a longer secret outside development");
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(invalid(
                "SECURITY_JWT_EXPIRY_HOURS",
                &format!("must be between 1 and {}", MAX_JWT_EXPIRY_HOURS),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(invalid("SECURITY_BCRYPT_COST", "must be between 4 and 31"));
        }

        let url = url::Url::parse(&self.database.url)
            .map_err(|e| invalid("DATABASE_URL", &e.to_string()))?;
        if url.scheme() != "sqlite" {
            return Err(invalid("DATABASE_URL", "only sqlite: URLs are supported"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "must be at least 1"));
        }
        if self.database.query_timeout_secs == 0 {
            return Err(invalid("DATABASE_QUERY_TIMEOUT_SECS", "must be at least 1"));
        }

        if self.filter.max_limit <= 0 {
            return Err(invalid("FILTER_MAX_LIMIT", "must be positive"));
        }
        if self.filter.default_limit <= 0 || self.filter.default_limit > self.filter.max_limit {
            return Err(invalid("FILTER_DEFAULT_LIMIT", "must be positive and not exceed FILTER_MAX_LIMIT"));
        }

        for admin in &self.super_admins {
            if admin.email.trim().is_empty() || admin.username.trim().is_empty() || admin.password.is_empty() {
                return Err(ConfigError::SuperAdmins {
                    origin: "super admin list".to_string(),
                    reason: "every entry needs email, username and password".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            filter: FilterConfig {
                default_limit: 50,
                max_limit: 500,
                debug_logging: true,
            },
            database: DatabaseConfig {
                url: "sqlite://tweets.db?mode=rwc".to_string(),
                max_connections: 5,
                query_timeout_secs: 5,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
            super_admins: vec![],
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            filter: FilterConfig {
                default_limit: 50,
                max_limit: 200,
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: "sqlite://tweets.db?mode=rwc".to_string(),
                max_connections: 10,
                query_timeout_secs: 5,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                bcrypt_cost: 12,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            super_admins: vec![],
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            filter: FilterConfig {
                default_limit: 25,
                max_limit: 100,
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: "sqlite://tweets.db?mode=rwc".to_string(),
                max_connections: 20,
                query_timeout_secs: 3,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                bcrypt_cost: 12,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            super_admins: vec![],
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, &e.to_string()))
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.to_string(),
    }
}

fn load_super_admins_file(path: &Path) -> Result<Vec<SuperAdmin>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_super_admins_yaml(&contents, &path.display().to_string())
}

fn parse_super_admins_yaml(contents: &str, origin: &str) -> Result<Vec<SuperAdmin>, ConfigError> {
    let file: SuperAdminsFile = serde_yaml::from_str(contents).map_err(|e| ConfigError::SuperAdmins {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;
    Ok(file.super_admins)
}
