//! access token 検証 → グループ認可 → AuthCtx を extensions に入れる
//!
//! 順序:
//! 1. `Authorization: Bearer <jwt>` の抽出 (なければ 401、claim は一切読まない)
//! 2. TokenVerifier で署名 / iat / exp / token_use / aud / iss を検証 (401)
//! 3. `cognito:groups` に required_group が含まれるか (403)
//!
//! route_layer で掛けるので、存在しない route は 404 のまま。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::services::auth::authorize;
use crate::state::AppState;

/// 保護したい Router に認証 + 認可を掛ける。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .inspect_err(|err| tracing::info!(code = err.code(), "rejected request without bearer token"))?
        .to_owned();

    let claims = match state.verifier.verify(&token).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "access token verification failed");
            return Err(err.into());
        }
    };

    if let Err(denied) = authorize(&claims, &state.required_group) {
        tracing::warn!(
            code = denied.code(),
            sub = claims.subject().unwrap_or_default(),
            "access denied"
        );
        return Err(denied.into());
    }

    // middleware → extractor への受け渡し。ClaimSet 自体はここで捨てる
    req.extensions_mut().insert(AuthCtx::from_claims(&claims));

    Ok(next.run(req).await)
}
