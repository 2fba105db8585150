/*
 * Responsibility
 * - access control の request/response DTO
 * - JSON のフィールド名 (rid, project_key, ...) はフロントエンドとの契約
 */
use serde::{Deserialize, Serialize};

use crate::services::access_control::{AccessControlRecord, AccessControlUpdate};

#[derive(Debug, Serialize)]
pub struct AccessControlResponse {
    pub rid: i32,
    pub project_key: String,
    pub data_access_type: String,
    pub delay_range: String,
}

impl From<AccessControlRecord> for AccessControlResponse {
    fn from(row: AccessControlRecord) -> Self {
        Self {
            rid: row.rid,
            project_key: row.project_key,
            data_access_type: row.data_access_type,
            delay_range: row.delay_range,
        }
    }
}

// `rid` in the body is ignored; the path decides which row is written.
#[derive(Debug, Deserialize)]
pub struct UpdateAccessControlRequest {
    pub project_key: String,
    pub data_access_type: String,
    pub delay_range: String,
}

impl From<UpdateAccessControlRequest> for AccessControlUpdate {
    fn from(req: UpdateAccessControlRequest) -> Self {
        Self {
            project_key: req.project_key,
            data_access_type: req.data_access_type,
            delay_range: req.delay_range,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
