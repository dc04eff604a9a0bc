use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};

/// Anonymous visitors land on the login page.
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Response, AppError> {
    let Some(principal) = principal else {
        return Ok(Redirect::to(&state.config.login_path).into_response());
    };

    let context = base_context(Some(&principal));
    Ok(state.views.render("home.html", &context)?.into_response())
}
