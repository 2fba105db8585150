/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - records: AccessControlService, verifier: TokenVerifier, required_group
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{access_control::AccessControlService, auth::TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn AccessControlService>,
    pub verifier: Arc<TokenVerifier>,
    pub required_group: Arc<str>,
}

impl AppState {
    pub fn new(
        records: Arc<dyn AccessControlService>,
        verifier: Arc<TokenVerifier>,
        required_group: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            records,
            verifier,
            required_group: required_group.into(),
        }
    }
}
