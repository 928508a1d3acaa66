pub mod gate;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use gate::{authorize, Denied};
pub use token::{IssuedToken, TokenError, TokenService};

/// Privilege tier carried by every identity and every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Standard,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::SuperAdmin => "super-admin",
        }
    }

    /// `super-admin` satisfies every requirement, `standard` only its own tier.
    pub fn satisfies(&self, required: Role) -> bool {
        match (self, required) {
            (Role::SuperAdmin, _) => true,
            (Role::Standard, Role::Standard) => true,
            (Role::Standard, Role::SuperAdmin) => false,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Role::Standard),
            "super-admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}
