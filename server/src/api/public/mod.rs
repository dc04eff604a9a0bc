pub mod auth;
pub mod details;
pub mod home;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Returns the router for pages that do not require the Admin role
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/recipes/{slug}", get(details::recipe_details))
        .route("/Auth/Login", get(auth::login::login_form).post(auth::login::login))
        .route(
            "/Auth/Register",
            get(auth::register::register_form).post(auth::register::register),
        )
        .route("/Auth/Logout", post(auth::logout::logout))
        .route("/Auth/AccessDenied", get(auth::access_denied::access_denied))
}
