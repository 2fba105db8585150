/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証 + 認可して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - 署名検証や JWKS 取得は services::auth の責務
 * - ClaimSet 全体は持ち回らず、監査ログに必要な値だけを抜き出す
 */

use crate::services::auth::ClaimSet;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `subject` / `username` は監査ログ用
/// - `groups` は `cognito:groups` のうち文字列の要素だけ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub username: Option<String>,
    pub groups: Vec<String>,
    pub token_use: Option<String>,
}

impl AuthCtx {
    pub fn from_claims(claims: &ClaimSet) -> Self {
        let groups = claims
            .groups()
            .unwrap_or_default()
            .iter()
            .filter_map(|group| group.as_str().map(str::to_owned))
            .collect();

        Self {
            subject: claims.subject().map(str::to_owned),
            username: claims.username().map(str::to_owned),
            groups,
            token_use: claims.token_use().map(str::to_owned),
        }
    }
}
