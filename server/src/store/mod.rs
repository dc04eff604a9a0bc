//! Persistence seams for recipes and identity data.
//!
//! Handlers and services talk to [`Store`] trait objects so the PostgreSQL
//! implementation can be swapped for the in-memory one in tests.

#[cfg(test)]
mod memory;
mod pg;

#[cfg(test)]
pub use memory::MemoryStore;
pub use pg::PgStore;

use crate::models::{NewRecipe, NewUser, Recipe, RecipeChanges, RecipeWithAuthor, User};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Recipe persistence. Every mutating call is a single atomic operation.
pub trait RecipeStore: Send + Sync {
    /// One page of recipes, newest `date_added` first, ties by id descending.
    fn list_recipes(&self, skip: i64, limit: i64) -> Result<Vec<Recipe>, StoreError>;

    /// Total number of recipes, independent of any page window.
    fn count_recipes(&self) -> Result<i64, StoreError>;

    fn find_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError>;

    /// Recipe plus author for a slug. With duplicate slugs the lowest id wins.
    fn find_recipe_by_slug(&self, slug: &str) -> Result<Option<RecipeWithAuthor>, StoreError>;

    /// Insert a recipe, suffixing `recipe.slug` if another recipe holds it.
    fn insert_recipe(&self, recipe: &NewRecipe<'_>) -> Result<Recipe, StoreError>;

    /// Overwrite the editable columns of recipe `id`, suffixing the slug if
    /// a *different* recipe holds it. `None` when the id is unknown.
    fn update_recipe(
        &self,
        id: i32,
        changes: &RecipeChanges<'_>,
    ) -> Result<Option<Recipe>, StoreError>;

    /// `false` when the id is unknown.
    fn delete_recipe(&self, id: i32) -> Result<bool, StoreError>;
}

/// Users, roles and login sessions.
pub trait IdentityStore: Send + Sync {
    /// Create the role if missing. Returns whether it was created.
    fn ensure_role(&self, name: &str) -> Result<bool, StoreError>;

    /// Case-insensitive email lookup.
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Create a user holding `role` in one atomic write. Fails with
    /// [`StoreError::Conflict`] when the email is taken and
    /// [`StoreError::UnknownRole`] when the role does not exist; either way no
    /// user row is left behind.
    fn insert_user_with_role(&self, user: &NewUser<'_>, role: &str) -> Result<User, StoreError>;

    /// Grant a role; granting twice is a no-op.
    fn add_user_to_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError>;

    fn user_roles(&self, user_id: Uuid) -> Result<Vec<String>, StoreError>;

    fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// The owner of an unexpired session.
    fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    fn delete_session(&self, token_hash: &str) -> Result<(), StoreError>;

    /// Drop the user's sessions that expired at or before `now`. Returns how
    /// many were removed.
    fn delete_expired_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
}

pub trait Store: RecipeStore + IdentityStore {}

impl<T: RecipeStore + IdentityStore> Store for T {}

pub type SharedStore = Arc<dyn Store>;
