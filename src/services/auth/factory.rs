/// Factory: build `TokenVerifier` (+ its HTTP-backed key store) from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{HttpKeySource, KeyStore, TokenVerifier};

pub fn build_token_verifier(config: &Config) -> Result<Arc<TokenVerifier>, AppError> {
    let source = HttpKeySource::new(config.jwks_fetch_timeout).map_err(|e| {
        tracing::error!(error = %e, "failed to build JWKS http client");
        AppError::Internal
    })?;
    let key_store = Arc::new(KeyStore::new(Arc::new(source)));

    let verifier = TokenVerifier::new(&config.cognito, key_store)?;
    tracing::info!(jwks_url = %verifier.jwks_url(), "token verifier ready");

    Ok(Arc::new(verifier))
}
