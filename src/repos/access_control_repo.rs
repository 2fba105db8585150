/*
 * Responsibility
 * - access_manager.data_access_control テーブル向け SQLx 操作
 * - 行の作成/削除はしない (読み取りと 3 カラムの書き換えのみ)
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccessControlRow {
    pub rid: i32,
    #[sqlx(rename = "ProjectKey")]
    pub project_key: String,
    pub data_access_type: String,
    pub delay_range: String,
}

pub async fn list(db: &PgPool) -> Result<Vec<AccessControlRow>, RepoError> {
    let rows = sqlx::query_as::<_, AccessControlRow>(
        r#"
        SELECT rid, "ProjectKey", data_access_type, delay_range
        FROM access_manager.data_access_control
        ORDER BY rid
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Returns `false` when no row has `rid`.
pub async fn update(
    db: &PgPool,
    rid: i32,
    project_key: &str,
    data_access_type: &str,
    delay_range: &str,
) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE access_manager.data_access_control
        SET
            "ProjectKey" = $2,
            data_access_type = $3,
            delay_range = $4
        WHERE rid = $1
        "#,
    )
    .bind(rid)
    .bind(project_key)
    .bind(data_access_type)
    .bind(delay_range)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
