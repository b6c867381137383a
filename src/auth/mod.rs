//! Authentication for the API.
//!
//! Protected routes take an [`Authenticated`] extractor that checks the
//! `Authorization: Bearer <jwt>` header against the service secret. Tokens
//! come either from the login endpoint or from the `issue_token` binary.

pub mod password;
pub mod token;
pub mod users;

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::AppState;
use token::Claims;

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Authorization header missing")]
    MissingAuth,

    #[error("Authorization header must be in the format 'Bearer <token>'")]
    MalformedHeader,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token lifetime out of range")]
    LifetimeOutOfRange,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Never echo decoder internals back to the caller
        let message = match &self {
            AuthError::InvalidToken(_) => "Invalid token".to_string(),
            other => other.to_string(),
        };

        (StatusCode::FORBIDDEN, Json(json!({ "error": message }))).into_response()
    }
}

/// Claims of a request that passed bearer authentication
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Split `Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            warn!("Authorization header is missing");
            return Err(AuthError::MissingAuth);
        };

        let header = header.to_str().map_err(|_| AuthError::MalformedHeader)?;
        let token = bearer_token(header).inspect_err(|_| {
            warn!("Invalid Authorization header format");
        })?;

        let claims = state.jwt.verify(token).inspect_err(|e| {
            warn!("Token rejected: {}", e);
        })?;

        debug!("Token validated for subject: {:?}", claims.sub);
        Ok(Authenticated(claims))
    }
}
