//! Bearer token verification against the user pool's published keys.
//!
//! Checks run in a fixed order and each failure has its own [`VerifyError`]
//! variant:
//! 1. structure (three segments, decodable header)
//! 2. `alg` must be RSA PKCS#1 v1.5 (`none`, HMAC and everything else are rejected)
//! 3. `kid` present
//! 4. key resolved through the [`KeyStore`]
//! 5. signature
//! 6. `iat` present and not more than [`CLOCK_SKEW_SECONDS`] in the future
//! 7. `exp`, when present, not more than [`CLOCK_SKEW_SECONDS`] in the past;
//!    `nbf`, when present, not more than [`CLOCK_SKEW_SECONDS`] in the future
//! 8. `token_use` + `client_id`/`aud`
//! 9. `iss`

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::config::{CognitoConfig, ConfigError, TokenUsePolicy};
use crate::services::auth::claims::ClaimSet;
use crate::services::auth::key_store::{KeyStore, KeyStoreError, SigningKey};

/// Allowed clock difference between the identity provider and this server.
pub const CLOCK_SKEW_SECONDS: i64 = 300;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
    #[error("unsupported signing method: {0}")]
    UnsupportedSigningMethod(String),
    #[error("missing key ID in token header")]
    MissingKeyId,
    #[error("key resolution failed: {0}")]
    KeyResolutionFailed(#[from] KeyStoreError),
    #[error("signature verification failed")]
    BadSignature,
    #[error("missing or invalid claim: {0}")]
    MissingClaim(&'static str),
    #[error("token used before issued (iat={issued_at}, now={now})")]
    ClockSkewViolation { issued_at: i64, now: i64 },
    #[error("token expired (exp={expires_at}, now={now})")]
    TokenExpired { expires_at: i64, now: i64 },
    #[error("token not yet valid (nbf={not_before}, now={now})")]
    TokenNotYetValid { not_before: i64, now: i64 },
    #[error("invalid token_use: {0}")]
    InvalidTokenUse(String),
    #[error("invalid audience: {0} does not match")]
    AudienceMismatch(&'static str),
    #[error("invalid issuer")]
    IssuerMismatch,
}

impl VerifyError {
    /// Stable machine-readable code for responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::UnsupportedSigningMethod(_) => "UNSUPPORTED_SIGNING_METHOD",
            Self::MissingKeyId => "MISSING_KEY_ID",
            Self::KeyResolutionFailed(KeyStoreError::NotFound(_)) => "KEY_NOT_FOUND",
            Self::KeyResolutionFailed(_) => "KEY_RESOLUTION_FAILED",
            Self::BadSignature => "BAD_SIGNATURE",
            Self::MissingClaim(_) => "MISSING_CLAIM",
            Self::ClockSkewViolation { .. } => "CLOCK_SKEW_VIOLATION",
            Self::TokenExpired { .. } => "TOKEN_EXPIRED",
            Self::TokenNotYetValid { .. } => "TOKEN_NOT_YET_VALID",
            Self::InvalidTokenUse(_) => "INVALID_TOKEN_USE",
            Self::AudienceMismatch(_) => "AUDIENCE_MISMATCH",
            Self::IssuerMismatch => "ISSUER_MISMATCH",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// Verifies user pool tokens. Configuration is fixed at construction.
#[derive(Debug)]
pub struct TokenVerifier {
    key_store: Arc<KeyStore>,
    jwks_url: Url,
    issuer: String,
    client_id: String,
    token_use: TokenUsePolicy,
}

impl TokenVerifier {
    pub fn new(config: &CognitoConfig, key_store: Arc<KeyStore>) -> Result<Self, ConfigError> {
        Ok(Self {
            key_store,
            jwks_url: config.jwks_url()?,
            issuer: config.issuer(),
            client_id: config.client_id.clone(),
            token_use: config.token_use,
        })
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    pub async fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError> {
        self.verify_at(token, Utc::now().timestamp()).await
    }

    /// Same as [`verify`](Self::verify) with `now` (Unix seconds) supplied by the caller.
    pub async fn verify_at(&self, token: &str, now: i64) -> Result<ClaimSet, VerifyError> {
        let header = parse_header(token)?;
        let alg = accepted_algorithm(&header.alg)?;
        let kid = header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or(VerifyError::MissingKeyId)?;

        let key = self.key_store.resolve(&self.jwks_url, kid).await?;
        let claims = verify_signature(token, &key, alg)?;

        let issued_at = numeric_claim(&claims, "iat")?.ok_or(VerifyError::MissingClaim("iat"))?;
        // claims saturate at the i64 range, so the skew arithmetic must too
        if now < issued_at.saturating_sub(CLOCK_SKEW_SECONDS) {
            return Err(VerifyError::ClockSkewViolation { issued_at, now });
        }
        if let Some(expires_at) = numeric_claim(&claims, "exp")?
            && now > expires_at.saturating_add(CLOCK_SKEW_SECONDS)
        {
            return Err(VerifyError::TokenExpired { expires_at, now });
        }
        if let Some(not_before) = numeric_claim(&claims, "nbf")?
            && now < not_before.saturating_sub(CLOCK_SKEW_SECONDS)
        {
            return Err(VerifyError::TokenNotYetValid { not_before, now });
        }

        self.check_audience(&claims)?;

        if claims.get("iss").and_then(Value::as_str) != Some(self.issuer.as_str()) {
            return Err(VerifyError::IssuerMismatch);
        }

        tracing::debug!(kid, "token verified");
        Ok(ClaimSet::from_verified(claims))
    }

    fn check_audience(&self, claims: &Map<String, Value>) -> Result<(), VerifyError> {
        let token_use = claims
            .get("token_use")
            .and_then(Value::as_str)
            .ok_or(VerifyError::MissingClaim("token_use"))?;

        // access tokens name the app client in `client_id`, id tokens in `aud`
        let audience_claim = match (token_use, self.token_use) {
            ("access", TokenUsePolicy::Any | TokenUsePolicy::AccessOnly) => "client_id",
            ("id", TokenUsePolicy::Any | TokenUsePolicy::IdOnly) => "aud",
            (other, _) => return Err(VerifyError::InvalidTokenUse(other.to_string())),
        };

        if claims.get(audience_claim).and_then(Value::as_str) != Some(self.client_id.as_str()) {
            return Err(VerifyError::AudienceMismatch(audience_claim));
        }

        Ok(())
    }
}

fn parse_header(token: &str) -> Result<RawHeader, VerifyError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(VerifyError::MalformedToken("expected three segments"));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|_| VerifyError::MalformedToken("header is not base64url"))?;

    serde_json::from_slice(&bytes).map_err(|_| VerifyError::MalformedToken("header is not valid JSON"))
}

fn accepted_algorithm(alg: &str) -> Result<Algorithm, VerifyError> {
    match alg {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(VerifyError::UnsupportedSigningMethod(other.to_string())),
    }
}

fn verify_signature(
    token: &str,
    key: &SigningKey,
    alg: Algorithm,
) -> Result<Map<String, Value>, VerifyError> {
    // Only the signature is checked here; claims are validated afterwards so
    // that each failure keeps its own error.
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<Map<String, Value>>(token, key.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|err| decode_error(err.kind(), key.kid()))
}

fn decode_error(kind: &ErrorKind, kid: &str) -> VerifyError {
    match kind {
        ErrorKind::InvalidSignature => VerifyError::BadSignature,
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            VerifyError::KeyResolutionFailed(KeyStoreError::InvalidKey {
                kid: kid.to_string(),
                reason: "rejected by the RSA backend",
            })
        }
        ErrorKind::Base64(_) => VerifyError::MalformedToken("payload or signature is not base64url"),
        ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            VerifyError::MalformedToken("payload is not a JSON object")
        }
        other => {
            tracing::warn!(kid, error = ?other, "token could not be decoded");
            VerifyError::MalformedToken("token could not be decoded")
        }
    }
}

// `Ok(None)` when absent, `Err` when present but not a number.
fn numeric_claim(claims: &Map<String, Value>, name: &'static str) -> Result<Option<i64>, VerifyError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(|v| Some(v as i64))
            .ok_or(VerifyError::MissingClaim(name)),
    }
}
