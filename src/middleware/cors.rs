//! CORS policy for the browser front-end.
//!
//! Policy:
//! - Configured origins (exact match) are allowed WITH credentials.
//! - Empty allowlist: development allows any origin WITHOUT credentials,
//!   production allows none.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header, request::Parts};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

pub fn apply(router: Router, config: &Config) -> Router {
    let allowed: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    let base = if !allowed.is_empty() {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_credentials(true)
    } else if config.app_env.is_production() {
        CorsLayer::new().allow_origin(AllowOrigin::predicate(|_: &HeaderValue, _: &Parts| false))
    } else {
        // Wildcard origin must never be combined with credentials.
        CorsLayer::new().allow_origin(Any)
    };

    let cors = base
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10));

    router.layer(cors)
}
