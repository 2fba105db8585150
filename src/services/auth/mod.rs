pub mod authorization;
pub mod claims;
pub mod factory;
pub mod key_store;
pub mod verifier;

pub use authorization::{AccessDenied, authorize};
pub use claims::ClaimSet;
pub use factory::build_token_verifier;
pub use key_store::{HttpKeySource, KeySource, KeyStore, KeyStoreError, SigningKey};
pub use verifier::{TokenVerifier, VerifyError};
