pub mod count;
pub mod create;
pub mod delete;
pub mod edit;
pub mod index;

use crate::auth::Principal;
use crate::error::AppError;
use crate::recipes::{FieldErrors, RecipeInput};
use crate::views::base_context;
use crate::AppState;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

/// Returns the router for recipe management (mounted at /Admin)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/Index", get(index::index))
        .route("/GetTotalRecipeCount", get(count::total_recipe_count))
        .route("/Create", get(create::new_form).post(create::create))
        .route("/Edit", post(edit::update))
        .route("/Edit/{id}", get(edit::edit_form))
        .route("/Delete/{id}", get(delete::confirm))
        .route("/DeleteConfirmed/{id}", post(delete::delete_confirmed))
}

/// Create and edit share one form; `recipe_id` switches it to edit mode.
fn render_form(
    state: &AppState,
    admin: &Principal,
    input: &RecipeInput,
    errors: &FieldErrors,
    recipe_id: Option<i32>,
) -> Result<Response, AppError> {
    let mut context = base_context(Some(admin));
    context.insert("input", input);
    context.insert("errors", errors);
    context.insert("recipe_id", &recipe_id);
    Ok(state.views.render("admin/form.html", &context)?.into_response())
}
