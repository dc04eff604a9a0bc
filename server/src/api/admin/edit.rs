use super::render_form;
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::recipes::{FieldErrors, RecipeError, RecipeInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

/// The edit form posts the recipe id alongside the editable fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditRecipeForm {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub ingredients: String,
    pub instructions_html: String,
}

impl EditRecipeForm {
    fn into_parts(self) -> (i32, RecipeInput) {
        let input = RecipeInput {
            name: self.name,
            image_url: self.image_url,
            ingredients: self.ingredients,
            instructions_html: self.instructions_html,
        };
        (self.id, input)
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let recipe = state.recipes.get(&admin, id)?;
    render_form(
        &state,
        &admin,
        &RecipeInput::from(&recipe),
        &FieldErrors::default(),
        Some(recipe.id),
    )
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<EditRecipeForm>,
) -> Result<Response, AppError> {
    let (id, input) = form.into_parts();
    match state.recipes.edit(&admin, id, &input) {
        Ok(_) => Ok(Redirect::to("/Admin").into_response()),
        Err(RecipeError::Invalid(errors)) => {
            render_form(&state, &admin, &input, &errors, Some(id))
        }
        Err(e) => Err(e.into()),
    }
}
