use super::render_form;
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::recipes::{FieldErrors, RecipeError, RecipeInput};
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};

pub async fn new_form(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Response, AppError> {
    render_form(
        &state,
        &admin,
        &RecipeInput::default(),
        &FieldErrors::default(),
        None,
    )
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(input): Form<RecipeInput>,
) -> Result<Response, AppError> {
    match state.recipes.create(&admin, &input) {
        Ok(_) => Ok(Redirect::to("/Admin").into_response()),
        Err(RecipeError::Invalid(errors)) => render_form(&state, &admin, &input, &errors, None),
        Err(e) => Err(e.into()),
    }
}
