pub mod admin;
pub mod public;

use crate::AppState;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;

/// Response header carrying the overall recipe count alongside a page.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Requests made by the listing page's "load more" script.
pub fn is_partial_request(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// The complete application router, with state applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .nest("/Admin", admin::router())
        .route("/Recipes", get(admin::index::index))
        .with_state(state)
}
