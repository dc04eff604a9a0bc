use crate::auth::AdminUser;
use crate::error::AppError;
use crate::AppState;
use axum::{extract::State, Json};

pub async fn total_recipe_count(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<i64>, AppError> {
    Ok(Json(state.recipes.total_count(&admin)?))
}
