/*
 * Responsibility
 * - /access-control 系 handler (一覧 + id 指定の全置換)
 * - 認証/認可は middleware::auth::access 済みの前提。ここでは AuthCtx を監査ログにだけ使う
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    api::v1::{
        dto::access_control::{AccessControlResponse, MessageResponse, UpdateAccessControlRequest},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn list_access_controls(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccessControlResponse>>, AppError> {
    let rows = state.records.list_all().await.map_err(|e| {
        tracing::error!(error = %e, "failed to fetch access control records");
        AppError::from(e)
    })?;

    Ok(Json(rows.into_iter().map(AccessControlResponse::from).collect()))
}

pub async fn update_access_control(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateAccessControlRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::bad_request("INVALID_RECORD_ID", "invalid record id"))?;
    let Json(req) =
        body.map_err(|e| AppError::bad_request("INVALID_PAYLOAD", format!("invalid request payload: {e}")))?;

    state
        .records
        .update_by_id(id, req.into())
        .await
        .inspect_err(|e| tracing::warn!(rid = id, error = %e, "access control update failed"))?;

    tracing::info!(
        rid = id,
        sub = auth.subject.as_deref().unwrap_or_default(),
        username = auth.username.as_deref().unwrap_or_default(),
        token_use = auth.token_use.as_deref().unwrap_or_default(),
        groups = ?auth.groups,
        "access control record updated"
    );

    Ok(Json(MessageResponse {
        message: "Access control record updated successfully",
    }))
}
