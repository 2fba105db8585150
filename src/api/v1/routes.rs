/*
 * Responsibility
 * - URL 構造を定義 (/access-control, /access-control/{id})
 * - Bearer + グループ認可が必要な範囲に middleware::auth::access を route_layer で適用
 */
use axum::{
    Router,
    routing::{get, put},
};

use crate::api::v1::handlers::access_control::{list_access_controls, update_access_control};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/access-control", get(list_access_controls))
        .route("/access-control/{id}", put(update_access_control));

    access::apply(protected, state)
}
