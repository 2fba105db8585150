//! Record service for access control rows.
//!
//! Handlers only see [`AccessControlService`]; the Postgres implementation
//! delegates to `repos::access_control_repo`.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::repos::{
    access_control_repo::{self, AccessControlRow},
    error::RepoError,
};

pub type AccessControlRecord = AccessControlRow;

/// Full replacement of the mutable columns of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControlUpdate {
    pub project_key: String,
    pub data_access_type: String,
    pub delay_range: String,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("access control record {0} not found")]
    NotFound(i32),
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepoError),
}

#[async_trait]
pub trait AccessControlService: Send + Sync + 'static {
    async fn list_all(&self) -> Result<Vec<AccessControlRecord>, RecordError>;

    async fn update_by_id(&self, id: i32, update: AccessControlUpdate) -> Result<(), RecordError>;
}

#[derive(Debug, Clone)]
pub struct PgAccessControlService {
    db: PgPool,
}

impl PgAccessControlService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccessControlService for PgAccessControlService {
    async fn list_all(&self) -> Result<Vec<AccessControlRecord>, RecordError> {
        Ok(access_control_repo::list(&self.db).await?)
    }

    async fn update_by_id(&self, id: i32, update: AccessControlUpdate) -> Result<(), RecordError> {
        let updated = access_control_repo::update(
            &self.db,
            id,
            &update.project_key,
            &update.data_access_type,
            &update.delay_range,
        )
        .await?;

        if updated {
            Ok(())
        } else {
            Err(RecordError::NotFound(id))
        }
    }
}
