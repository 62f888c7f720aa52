//! Request guards: bearer-token authentication, role authorization and the
//! comment ownership policy.

use thiserror::Error;

use crate::{Claims, Role, TokenError, TokenService};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken(#[source] TokenError),

    /// Role or ownership check failed. Carries no detail so callers cannot
    /// tell a forbidden resource from one they merely do not own.
    #[error("insufficient permissions")]
    Forbidden,
}

/// Extract the token from an `Authorization` header value.
///
/// Absent headers, schemes other than `Bearer` and empty tokens all count as missing.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Authentication gate: header → verified claims.
pub fn authenticate(tokens: &TokenService, header: Option<&str>) -> Result<Claims, AuthError> {
    let token = bearer_token(header)?;

    tokens.verify(token).map_err(|err| {
        match &err {
            TokenError::Expired => tracing::warn!(target: "atrium-authz", "rejected expired token"),
            other => tracing::warn!(target: "atrium-authz", error = %other, "rejected invalid token"),
        }
        AuthError::InvalidToken(err)
    })
}

/// Authorization gate: the authenticated role must be one of `allowed`.
pub fn authorize(claims: Option<&Claims>, allowed: &[Role]) -> Result<(), AuthError> {
    match claims {
        Some(claims) if allowed.contains(&claims.role) => Ok(()),
        Some(claims) => {
            tracing::warn!(
                target: "atrium-authz",
                subject = %claims.sub,
                role = %claims.role,
                "role not permitted on route"
            );
            Err(AuthError::Forbidden)
        }
        None => Err(AuthError::Forbidden),
    }
}

/// Ownership policy: only the author may change or remove a comment.
pub fn ensure_owner(actor: &str, author: &str) -> Result<(), AuthError> {
    if actor == author {
        Ok(())
    } else {
        tracing::warn!(target: "atrium-authz", actor = %actor, "ownership check failed");
        Err(AuthError::Forbidden)
    }
}
