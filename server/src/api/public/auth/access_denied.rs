use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn access_denied(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Response, AppError> {
    let context = base_context(principal.as_ref());
    let html = state.views.render("auth/access_denied.html", &context)?;
    Ok((StatusCode::FORBIDDEN, html).into_response())
}
