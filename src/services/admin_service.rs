use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{Role, TokenError, TokenService};
use crate::config::SuperAdmin;
use crate::database::models::{Admin, NewAdmin};
use crate::database::{AdminStore, DatabaseError, Upserted};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AdminServiceError {
    #[error("Invalid identity fields")]
    Validation(HashMap<String, String>),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AdminServiceError> for ApiError {
    fn from(err: AdminServiceError) -> Self {
        match err {
            AdminServiceError::Validation(field_errors) => {
                ApiError::validation_error("Invalid identity fields", Some(field_errors))
            }
            AdminServiceError::Database(e) => e.into(),
            AdminServiceError::Token(e) => e.into(),
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub admin: Admin,
}

/// What a bootstrap run did, by email.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Identity operations shared by the HTTP handlers and the admin CLI.
#[derive(Clone, Debug)]
pub struct AdminService {
    admins: AdminStore,
    tokens: Arc<TokenService>,
}

impl AdminService {
    pub fn new(admins: AdminStore, tokens: Arc<TokenService>) -> Self {
        Self { admins, tokens }
    }

    /// Exchanges a login (email or username) and password for a token.
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginResponse, AdminServiceError> {
        let admin = match self.admins.find_by_credentials(login, password).await {
            Ok(admin) => admin,
            Err(DatabaseError::NotFound(msg)) => {
                warn!("Failed login for '{}'", login.trim());
                return Err(DatabaseError::NotFound(msg).into());
            }
            Err(e) => return Err(e.into()),
        };

        let issued = self.tokens.issue(&admin)?;
        info!("Issued token for '{}' ({})", admin.username, admin.role);

        Ok(LoginResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
            expires_at: issued.expires_at,
            admin,
        })
    }

    /// Strict creation through the API or CLI. Duplicates are a `Conflict`.
    pub async fn create_admin(&self, new_admin: NewAdmin) -> Result<Admin, AdminServiceError> {
        let new_admin = NewAdmin::new(new_admin.email, new_admin.username, new_admin.password, new_admin.role);
        new_admin.validate().map_err(AdminServiceError::Validation)?;
        Ok(self.admins.create(new_admin).await?)
    }

    pub async fn find(&self, id: uuid::Uuid) -> Result<Admin, AdminServiceError> {
        self.admins
            .find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Identity {} not found", id)).into())
    }

    pub async fn list(&self) -> Result<Vec<Admin>, AdminServiceError> {
        Ok(self.admins.list().await?)
    }

    /// Ensures every configured super-admin exists. Existing identities are
    /// left untouched, so running this on every start is safe.
    pub async fn bootstrap(&self, super_admins: &[SuperAdmin]) -> Result<BootstrapReport, AdminServiceError> {
        let mut report = BootstrapReport::default();

        for entry in super_admins {
            let new_admin = NewAdmin::new(&entry.email, &entry.username, &entry.password, Role::SuperAdmin);
            new_admin.validate().map_err(AdminServiceError::Validation)?;

            match self.admins.upsert(new_admin).await? {
                Upserted::Created(admin) => report.created.push(admin.email),
                Upserted::Existing(admin) => report.existing.push(admin.email),
            }
        }

        info!(
            "Bootstrap complete: {} created, {} already present",
            report.created.len(),
            report.existing.len()
        );
        Ok(report)
    }
}
