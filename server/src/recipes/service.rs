use super::{RecipeError, RecipeInput, RecipePage};
use crate::auth::{Permission, Principal};
use crate::models::{NewRecipe, Recipe, RecipeChanges, RecipeWithAuthor};
use crate::slug::generate_slug;
use crate::store::SharedStore;
use chrono::Utc;

/// Recipe use cases. Every admin operation checks
/// [`Permission::ManageRecipes`] before touching the store.
pub struct RecipeService {
    store: SharedStore,
    page_size: i64,
}

impl RecipeService {
    pub fn new(store: SharedStore, page_size: i64) -> Self {
        Self { store, page_size }
    }

    /// Newest-first page starting at `skip`, plus the overall recipe count.
    pub fn list(&self, actor: &Principal, skip: i64) -> Result<RecipePage, RecipeError> {
        actor.require(Permission::ManageRecipes)?;

        let skip = skip.max(0);
        let items = self.store.list_recipes(skip, self.page_size)?;
        let total_count = self.store.count_recipes()?;

        Ok(RecipePage {
            items,
            total_count,
            skip,
        })
    }

    pub fn total_count(&self, actor: &Principal) -> Result<i64, RecipeError> {
        actor.require(Permission::ManageRecipes)?;
        Ok(self.store.count_recipes()?)
    }

    pub fn get(&self, actor: &Principal, id: i32) -> Result<Recipe, RecipeError> {
        actor.require(Permission::ManageRecipes)?;
        self.store.find_recipe(id)?.ok_or(RecipeError::NotFound)
    }

    pub fn create(&self, actor: &Principal, input: &RecipeInput) -> Result<Recipe, RecipeError> {
        actor.require(Permission::ManageRecipes)?;
        input.validate().map_err(RecipeError::Invalid)?;

        let slug = generate_slug(&input.name);
        let new_recipe = NewRecipe {
            name: &input.name,
            slug: &slug,
            image_url: &input.image_url,
            ingredients: &input.ingredients,
            instructions_html: &input.instructions_html,
            date_added: Utc::now(),
            author_id: actor.user.id,
        };

        let recipe = self.store.insert_recipe(&new_recipe)?;
        tracing::info!(recipe_id = recipe.id, slug = %recipe.slug, "recipe created");
        Ok(recipe)
    }

    /// Overwrite the editable fields and regenerate the slug from the
    /// (possibly unchanged) name.
    pub fn edit(
        &self,
        actor: &Principal,
        id: i32,
        input: &RecipeInput,
    ) -> Result<Recipe, RecipeError> {
        actor.require(Permission::ManageRecipes)?;
        input.validate().map_err(RecipeError::Invalid)?;

        let slug = generate_slug(&input.name);
        let changes = RecipeChanges {
            name: &input.name,
            slug: &slug,
            image_url: &input.image_url,
            ingredients: &input.ingredients,
            instructions_html: &input.instructions_html,
        };

        let recipe = self
            .store
            .update_recipe(id, &changes)?
            .ok_or(RecipeError::NotFound)?;
        tracing::info!(recipe_id = recipe.id, slug = %recipe.slug, "recipe updated");
        Ok(recipe)
    }

    pub fn delete(&self, actor: &Principal, id: i32) -> Result<(), RecipeError> {
        actor.require(Permission::ManageRecipes)?;

        if !self.store.delete_recipe(id)? {
            return Err(RecipeError::NotFound);
        }
        tracing::info!(recipe_id = id, "recipe deleted");
        Ok(())
    }

    /// Public lookup; needs no principal.
    pub fn get_by_slug(&self, slug: &str) -> Result<RecipeWithAuthor, RecipeError> {
        self.store
            .find_recipe_by_slug(slug)?
            .ok_or(RecipeError::NotFound)
    }
}
