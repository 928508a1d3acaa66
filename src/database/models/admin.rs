use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an identity. The password is plaintext until hashed.
#[derive(Clone, Deserialize)]
pub struct NewAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Standard
}

impl std::fmt::Debug for NewAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl NewAdmin {
    pub fn new(email: impl Into<String>, username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into().trim().to_string(),
            username: username.into().trim().to_string(),
            password: password.into(),
            role,
        }
    }

    /// Field-level validation. Emails must contain `@` and usernames must
    /// not, so a login string can never match two different identities.
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut field_errors = HashMap::new();

        let email = self.email.trim();
        if email.is_empty() || email.len() > 254 || !email.contains('@') || email.chars().any(char::is_whitespace) {
            field_errors.insert("email".to_string(), "Must be a valid email address".to_string());
        }

        let username = self.username.trim();
        if username.len() < 3 || username.len() > 50 {
            field_errors.insert("username".to_string(), "Must be between 3 and 50 characters".to_string());
        } else if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.') {
            field_errors.insert(
                "username".to_string(),
                "Can only contain letters, numbers, underscore, hyphen and dot".to_string(),
            );
        }

        if self.password.is_empty() {
            field_errors.insert("password".to_string(), "This field is required".to_string());
        } else if self.password.len() > 72 {
            field_errors.insert("password".to_string(), "Must be at most 72 bytes".to_string());
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(field_errors)
        }
    }
}
