//! Authentication and authorization extractors.
//!
//! `Authenticated` verifies the bearer token and caches the claims in the
//! request extensions. `Authorized<R>` runs it first, then checks the role
//! against the route's fixed role set `R`.

use std::marker::PhantomData;

use atrium_authz::{authenticate, authorize, Claims, Role, TokenService};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;

/// Verified token claims of the caller
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl<S> FromRequestParts<S> for Authenticated
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Self(claims.clone()));
        }

        let tokens = TokenService::from_ref(state);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let claims = authenticate(&tokens, header).inspect_err(|err| {
            tracing::warn!(uri = %parts.uri, reason = %err, "authentication failed");
        })?;

        parts.extensions.insert(claims.clone());
        Ok(Self(claims))
    }
}

/// Fixed set of roles a route accepts
pub trait RoleSet: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Administrators only
pub struct Admin;

impl RoleSet for Admin {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// Regular users
pub struct Member;

impl RoleSet for Member {
    const ALLOWED: &'static [Role] = &[Role::User];
}

/// Claims of a caller whose role is in `R::ALLOWED`
pub struct Authorized<R: RoleSet>(pub Claims, pub PhantomData<fn() -> R>);

impl<R: RoleSet> Authorized<R> {
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    TokenService: FromRef<S>,
    S: Send + Sync,
    R: RoleSet,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Authenticated::from_request_parts(parts, state).await?;

        let claims = parts.extensions.get::<Claims>();
        authorize(claims, R::ALLOWED)?;

        match claims {
            Some(claims) => Ok(Self(claims.clone(), PhantomData)),
            None => Err(AppError::forbidden()),
        }
    }
}
