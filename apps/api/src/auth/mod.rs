//! Bearer-token identity. Handlers take `AuthUser` (required) or
//! `MaybeAuthUser` (optional) and receive the caller's stable user id.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

pub mod firebase;

pub use firebase::FirebaseVerifier;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No bearer token supplied")]
    MissingToken,

    #[error("Invalid or expired authentication token")]
    InvalidToken,

    #[error("Authentication service unavailable")]
    Unavailable,

    #[error("Identity provider error: {0}")]
    Upstream(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken | AuthError::InvalidToken => {
                AppError::Unauthorized(e.to_string())
            }
            AuthError::Unavailable => AppError::ServiceUnavailable(e.to_string()),
            AuthError::Upstream(msg) => {
                AppError::ServiceUnavailable(format!("Identity provider error: {msg}"))
            }
        }
    }
}

/// Resolves a bearer token to a user id.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// False when the verifier cannot verify anything (e.g. not configured).
    fn is_available(&self) -> bool {
        true
    }

    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

pub type SharedVerifier = Arc<dyn IdentityVerifier>;

/// Used when no identity provider is configured. Protected routes answer 503.
pub struct UnconfiguredVerifier;

#[async_trait]
impl IdentityVerifier for UnconfiguredVerifier {
    fn is_available(&self) -> bool {
        false
    }

    async fn verify(&self, _token: &str) -> Result<String, AuthError> {
        Err(AuthError::Unavailable)
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticated caller. Rejects with 401, or 503 when auth is unconfigured.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    SharedVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = SharedVerifier::from_ref(state);
        if !verifier.is_available() {
            return Err(AuthError::Unavailable.into());
        }

        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let user_id = verifier.verify(token).await?;
        Ok(AuthUser(user_id))
    }
}

/// Optionally authenticated caller. Never rejects; failures become anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    SharedVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeAuthUser(None));
        };

        let verifier = SharedVerifier::from_ref(state);
        match verifier.verify(token).await {
            Ok(user_id) => Ok(MaybeAuthUser(Some(user_id))),
            Err(e) => {
                debug!("Optional auth ignored: {e}");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    /// Accepts tokens of the form `valid:<uid>`.
    pub struct FakeVerifier;

    #[async_trait]
    impl IdentityVerifier for FakeVerifier {
        async fn verify(&self, token: &str) -> Result<String, AuthError> {
            token
                .strip_prefix("valid:")
                .map(str::to_string)
                .ok_or(AuthError::InvalidToken)
        }
    }
}
