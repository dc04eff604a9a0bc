//! Admin recipe management and the public read path.

mod service;

pub use service::RecipeService;

use crate::auth::Forbidden;
use crate::models::Recipe;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("recipe not found")]
    NotFound,

    #[error("invalid recipe: {0:?}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Field name -> message, rendered next to the offending form input.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// The editable part of a recipe, as submitted by the admin form.
///
/// Missing form fields deserialize as empty strings so they surface as
/// validation messages rather than a rejected request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeInput {
    pub name: String,
    pub image_url: String,
    pub ingredients: String,
    pub instructions_html: String,
}

impl RecipeInput {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        let required = [
            ("name", "Name", &self.name),
            ("imageUrl", "Image URL", &self.image_url),
            ("ingredients", "Ingredients", &self.ingredients),
            ("instructionsHtml", "Instructions", &self.instructions_html),
        ];
        for (field, label, value) in required {
            if value.trim().is_empty() {
                errors.add(field, format!("The {label} field is required."));
            }
        }
        errors.into_result()
    }
}

impl From<&Recipe> for RecipeInput {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            image_url: recipe.image_url.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions_html: recipe.instructions_html.clone(),
        }
    }
}

/// One window of the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecipePage {
    pub items: Vec<Recipe>,
    pub total_count: i64,
    pub skip: i64,
}

impl RecipePage {
    /// Offset of the following page, if any recipes remain past this one.
    pub fn next_skip(&self) -> Option<i64> {
        let next = self.skip + self.items.len() as i64;
        (next < self.total_count && !self.items.is_empty()).then_some(next)
    }
}
