use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

pub async fn recipe_details(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let recipe = state.recipes.get_by_slug(&slug)?;

    let mut context = base_context(principal.as_ref());
    context.insert("recipe", &recipe);
    Ok(state.views.render("recipes/details.html", &context)?.into_response())
}
