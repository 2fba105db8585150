//! `Authorization: Bearer <token>` extraction.
//!
//! Runs before any token parsing; a request that fails here never reaches
//! the verifier.

use axum::http::{HeaderMap, header};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("missing authorization header")]
    MissingAuthHeader,
    #[error("invalid token format")]
    MalformedBearerPrefix,
}

impl BearerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthHeader => "MISSING_AUTH_HEADER",
            Self::MalformedBearerPrefix => "MALFORMED_BEARER_PREFIX",
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::MissingAuthHeader)?;

    if value.is_empty() {
        return Err(BearerError::MissingAuthHeader);
    }

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(BearerError::MalformedBearerPrefix)?;

    if token.is_empty() {
        return Err(BearerError::MalformedBearerPrefix);
    }

    Ok(token)
}
