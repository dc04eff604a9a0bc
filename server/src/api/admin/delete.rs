use crate::auth::AdminUser;
use crate::error::AppError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

pub async fn confirm(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let recipe = state.recipes.get(&admin, id)?;

    let mut context = base_context(Some(&admin));
    context.insert("recipe", &recipe);
    Ok(state.views.render("admin/delete.html", &context)?.into_response())
}

pub async fn delete_confirmed(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    state.recipes.delete(&admin, id)?;
    Ok(Redirect::to("/Admin").into_response())
}
