//! Public signing keys fetched from the identity provider's JWKS endpoint.
//!
//! Keys are resolved by `kid` and cached for the lifetime of the process.
//! A single lock covers lookup-or-fetch-and-insert, so concurrent misses for
//! the same `kid` cause one fetch. Misses for different `kid`s are serialized
//! as well; fetches are rare once the cache is warm.

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("failed to fetch JWKS: {0}")]
    Fetch(String),
    #[error("invalid JWKS document: {0}")]
    InvalidDocument(String),
    #[error("key id {0} not found in JWKS")]
    NotFound(String),
    #[error("invalid key {kid}: {reason}")]
    InvalidKey { kid: String, reason: &'static str },
}

/// One entry of the `keys` array. Non-RSA members are simply left empty.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkEntry {
    #[serde(default)]
    pub kid: String,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub e: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwkSetDocument {
    pub keys: Vec<JwkEntry>,
}

/// RSA public key published under `kid`.
///
/// `modulus` and `exponent` are canonical big-endian integers (no leading
/// zero bytes), so two keys built from the same JWKS entry compare equal.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    modulus: Vec<u8>,
    exponent: Vec<u8>,
    decoding_key: DecodingKey,
}

impl SigningKey {
    pub fn from_jwk(entry: &JwkEntry) -> Result<Self, KeyStoreError> {
        let invalid = |reason| KeyStoreError::InvalidKey {
            kid: entry.kid.clone(),
            reason,
        };

        let modulus = decode_unsigned(&entry.n).ok_or_else(|| invalid("modulus is not base64url"))?;
        let exponent =
            decode_unsigned(&entry.e).ok_or_else(|| invalid("exponent is not base64url"))?;

        if modulus.is_empty() {
            return Err(invalid("empty modulus"));
        }
        if exponent.is_empty() {
            return Err(invalid("empty exponent"));
        }

        let decoding_key = DecodingKey::from_rsa_raw_components(&modulus, &exponent);

        Ok(Self {
            kid: entry.kid.clone(),
            modulus,
            exponent,
            decoding_key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.kid == other.kid && self.modulus == other.modulus && self.exponent == other.exponent
    }
}

impl Eq for SigningKey {}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("modulus_bits", &(self.modulus.len() * 8))
            .finish_non_exhaustive()
    }
}

// Base64url big-endian integer -> canonical bytes. Padding is tolerated.
fn decode_unsigned(raw: &str) -> Option<Vec<u8>> {
    let bytes = URL_SAFE_NO_PAD.decode(raw.trim_end_matches('=')).ok()?;
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    Some(bytes[first..].to_vec())
}

/// Where the key store gets JWKS documents from.
///
/// Implementations must not cache; caching belongs to [`KeyStore`].
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    async fn fetch(&self, url: &Url) -> Result<JwkSetDocument, KeyStoreError>;
}

/// Fetches JWKS documents over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    client: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(timeout: Duration) -> Result<Self, KeyStoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyStoreError::Fetch(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self, url: &Url) -> Result<JwkSetDocument, KeyStoreError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| KeyStoreError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyStoreError::Fetch(format!("unexpected status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| KeyStoreError::Fetch(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| KeyStoreError::InvalidDocument(e.to_string()))
    }
}

/// Process-wide cache of signing keys, keyed by `kid`.
pub struct KeyStore {
    keys: Mutex<HashMap<String, Arc<SigningKey>>>,
    source: Arc<dyn KeySource>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore").finish_non_exhaustive()
    }
}

impl KeyStore {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self::with_keys(source, std::iter::empty())
    }

    /// Key store pre-seeded with `keys`; seeded identifiers never hit `source`.
    pub fn with_keys(
        source: Arc<dyn KeySource>,
        keys: impl IntoIterator<Item = SigningKey>,
    ) -> Self {
        let keys = keys
            .into_iter()
            .map(|key| (key.kid.clone(), Arc::new(key)))
            .collect();

        Self {
            keys: Mutex::new(keys),
            source,
        }
    }

    /// Return the key cached under `kid`, fetching `jwks_url` on a miss.
    ///
    /// Failures are not cached and the fetch is not retried here.
    pub async fn resolve(&self, jwks_url: &Url, kid: &str) -> Result<Arc<SigningKey>, KeyStoreError> {
        let mut keys = self.keys.lock().await;

        if let Some(key) = keys.get(kid) {
            tracing::debug!(kid, "signing key cache hit");
            return Ok(Arc::clone(key));
        }

        tracing::info!(kid, url = %jwks_url, "fetching JWKS");
        let document = self.source.fetch(jwks_url).await.inspect_err(|err| {
            tracing::warn!(kid, error = %err, "JWKS fetch failed");
        })?;

        let entry = document
            .keys
            .iter()
            .find(|entry| entry.kid == kid)
            .ok_or_else(|| KeyStoreError::NotFound(kid.to_string()))?;

        let key = Arc::new(SigningKey::from_jwk(entry)?);
        let cached = Arc::clone(
            keys.entry(kid.to_string())
                .or_insert_with(|| Arc::clone(&key)),
        );
        tracing::info!(kid, cached = keys.len(), "signing key cached");

        Ok(cached)
    }
}
