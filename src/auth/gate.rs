use thiserror::Error;

use super::{Claims, Role, TokenService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denied {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient privileges")]
    Forbidden,
}

/// Resolves a bearer token into claims that satisfy `required`.
///
/// A missing token is treated exactly like an invalid one.
pub fn authorize(tokens: &TokenService, token: Option<&str>, required: Role) -> Result<Claims, Denied> {
    let token = token.ok_or(Denied::Unauthenticated)?;
    let claims = tokens.verify(token).map_err(|_| Denied::Unauthenticated)?;

    if !claims.role.satisfies(required) {
        tracing::debug!(
            "Denied {} ({}) access requiring {}",
            claims.username,
            claims.role,
            required
        );
        return Err(Denied::Forbidden);
    }

    Ok(claims)
}
