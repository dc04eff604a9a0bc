use crate::auth::AuthError;
use crate::recipes::RecipeError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html><html><head><title>Not Found</title></head>\
<body><h1>404 - Not Found</h1><p>The page you requested does not exist.</p>\
<p><a href=\"/\">Home</a></p></body></html>";

const FORBIDDEN_PAGE: &str = "<!DOCTYPE html><html><head><title>Forbidden</title></head>\
<body><h1>403 - Forbidden</h1></body></html>";

const ERROR_PAGE: &str = "<!DOCTYPE html><html><head><title>Error</title></head>\
<body><h1>Something went wrong</h1><p>Please try again later.</p></body></html>";

/// Handler-facing error. Validation failures are normally handled in the
/// handler by re-rendering the form; anything reaching `into_response` is
/// terminal for the request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl From<RecipeError> for AppError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Forbidden(_) => AppError::Forbidden,
            RecipeError::NotFound => AppError::NotFound,
            RecipeError::Invalid(errors) => AppError::BadRequest(format!("{errors:?}")),
            RecipeError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
            AppError::Forbidden => (StatusCode::FORBIDDEN, Html(FORBIDDEN_PAGE)).into_response(),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::Store(_) | AppError::Auth(_) | AppError::Template(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response()
            }
        }
    }
}
