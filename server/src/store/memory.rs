//! In-memory store for tests.
//!
//! Mirrors the ordering, slug and uniqueness rules of [`super::PgStore`] so
//! service and router tests can run without a database.

use super::{IdentityStore, RecipeStore, StoreError};
use crate::models::{
    Author, NewRecipe, NewUser, Recipe, RecipeChanges, RecipeWithAuthor, User,
};
use crate::slug::disambiguate;
use chrono::{DateTime, Utc};
use std::convert::Infallible;
use std::sync::RwLock;
use uuid::Uuid;

struct StoredSession {
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    recipes: Vec<Recipe>,
    next_recipe_id: i32,
    users: Vec<User>,
    roles: Vec<String>,
    user_roles: Vec<(Uuid, String)>,
    sessions: Vec<StoredSession>,
}

impl State {
    fn slug_taken(&self, slug: &str, excluding: Option<i32>) -> bool {
        self.recipes
            .iter()
            .any(|r| r.slug == slug && Some(r.id) != excluding)
    }

    fn unique_slug(&self, base: &str, excluding: Option<i32>) -> String {
        match disambiguate(base, |candidate| {
            Ok::<_, Infallible>(self.slug_taken(candidate, excluding))
        }) {
            Ok(slug) => slug,
            Err(never) => match never {},
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a recipe row verbatim, bypassing slug disambiguation. Used to
    /// reproduce rows written before slugs were kept unique.
    pub fn insert_raw_recipe(&self, recipe: &NewRecipe<'_>) -> Recipe {
        let mut state = self.state.write().unwrap();
        state.next_recipe_id += 1;
        let row = Recipe {
            id: state.next_recipe_id,
            name: recipe.name.to_string(),
            slug: recipe.slug.to_string(),
            image_url: recipe.image_url.to_string(),
            ingredients: recipe.ingredients.to_string(),
            instructions_html: recipe.instructions_html.to_string(),
            date_added: recipe.date_added,
            author_id: recipe.author_id,
        };
        state.recipes.push(row.clone());
        row
    }

    pub fn recipe_count(&self) -> usize {
        self.state.read().unwrap().recipes.len()
    }

    pub fn user_count(&self) -> usize {
        self.state.read().unwrap().users.len()
    }

    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }
}

impl RecipeStore for MemoryStore {
    fn list_recipes(&self, skip: i64, limit: i64) -> Result<Vec<Recipe>, StoreError> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<Recipe> = state.recipes.clone();
        rows.sort_by(|a, b| b.date_added.cmp(&a.date_added).then(b.id.cmp(&a.id)));

        Ok(rows
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    fn count_recipes(&self) -> Result<i64, StoreError> {
        Ok(self.state.read().unwrap().recipes.len() as i64)
    }

    fn find_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state.recipes.iter().find(|r| r.id == id).cloned())
    }

    fn find_recipe_by_slug(&self, slug: &str) -> Result<Option<RecipeWithAuthor>, StoreError> {
        let state = self.state.read().unwrap();

        let recipe = state
            .recipes
            .iter()
            .filter(|r| r.slug == slug)
            .min_by_key(|r| r.id);

        Ok(recipe.and_then(|recipe| {
            state
                .users
                .iter()
                .find(|u| u.id == recipe.author_id)
                .map(|user| RecipeWithAuthor {
                    recipe: recipe.clone(),
                    author: Author::from(user),
                })
        }))
    }

    fn insert_recipe(&self, recipe: &NewRecipe<'_>) -> Result<Recipe, StoreError> {
        let mut state = self.state.write().unwrap();
        let slug = state.unique_slug(recipe.slug, None);
        state.next_recipe_id += 1;

        let row = Recipe {
            id: state.next_recipe_id,
            name: recipe.name.to_string(),
            slug,
            image_url: recipe.image_url.to_string(),
            ingredients: recipe.ingredients.to_string(),
            instructions_html: recipe.instructions_html.to_string(),
            date_added: recipe.date_added,
            author_id: recipe.author_id,
        };
        state.recipes.push(row.clone());

        Ok(row)
    }

    fn update_recipe(
        &self,
        id: i32,
        changes: &RecipeChanges<'_>,
    ) -> Result<Option<Recipe>, StoreError> {
        let mut state = self.state.write().unwrap();
        let slug = state.unique_slug(changes.slug, Some(id));

        let Some(recipe) = state.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        recipe.name = changes.name.to_string();
        recipe.slug = slug;
        recipe.image_url = changes.image_url.to_string();
        recipe.ingredients = changes.ingredients.to_string();
        recipe.instructions_html = changes.instructions_html.to_string();

        Ok(Some(recipe.clone()))
    }

    fn delete_recipe(&self, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.write().unwrap();
        let before = state.recipes.len();
        state.recipes.retain(|r| r.id != id);
        Ok(state.recipes.len() != before)
    }
}

impl IdentityStore for MemoryStore {
    fn ensure_role(&self, name: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().unwrap();
        if state.roles.iter().any(|r| r == name) {
            return Ok(false);
        }
        state.roles.push(name.to_string());
        Ok(true)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn insert_user_with_role(&self, user: &NewUser<'_>, role: &str) -> Result<User, StoreError> {
        let mut state = self.state.write().unwrap();
        if !state.roles.iter().any(|r| r == role) {
            return Err(StoreError::UnknownRole(role.to_string()));
        }
        if state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(user.email))
        {
            return Err(StoreError::Conflict(format!("user {}", user.email)));
        }

        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
            email_confirmed: user.email_confirmed,
            created_at: now,
            updated_at: now,
        };
        state.users.push(row.clone());
        state.user_roles.push((row.id, role.to_string()));

        Ok(row)
    }

    fn add_user_to_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        if !state.roles.iter().any(|r| r == role) {
            return Err(StoreError::UnknownRole(role.to_string()));
        }
        let grant = (user_id, role.to_string());
        if !state.user_roles.contains(&grant) {
            state.user_roles.push(grant);
        }
        Ok(())
    }

    fn user_roles(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().unwrap();
        let mut names: Vec<String> = state
            .user_roles
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, role)| role.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.sessions.push(StoredSession {
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
        });
        Ok(())
    }

    fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let state = self.state.read().unwrap();
        let Some(session) = state
            .sessions
            .iter()
            .find(|s| s.token_hash == token_hash && s.expires_at > now)
        else {
            return Ok(None);
        };
        Ok(state.users.iter().find(|u| u.id == session.user_id).cloned())
    }

    fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        state.sessions.retain(|s| s.token_hash != token_hash);
        Ok(())
    }

    fn delete_expired_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let mut state = self.state.write().unwrap();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| s.user_id != user_id || s.expires_at > now);
        Ok(before - state.sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_recipe<'a>(name: &'a str, slug: &'a str, author_id: Uuid) -> NewRecipe<'a> {
        NewRecipe {
            name,
            slug,
            image_url: "https://img.example/x.jpg",
            ingredients: "salt",
            instructions_html: "<p>cook</p>",
            date_added: Utc::now(),
            author_id,
        }
    }

    #[test]
    fn test_insert_suffixes_taken_slug() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();

        let first = store.insert_recipe(&new_recipe("Soup", "soup", author)).unwrap();
        let second = store.insert_recipe(&new_recipe("Soup", "soup", author)).unwrap();

        assert_eq!(first.slug, "soup");
        assert_eq!(second.slug, "soup-2");
    }

    #[test]
    fn test_update_ignores_own_slug() {
        let store = MemoryStore::new();
        let recipe = store
            .insert_recipe(&new_recipe("Soup", "soup", Uuid::new_v4()))
            .unwrap();

        let changes = RecipeChanges {
            name: "Soup",
            slug: "soup",
            image_url: "https://img.example/y.jpg",
            ingredients: "pepper",
            instructions_html: "<p>stir</p>",
        };
        let updated = store.update_recipe(recipe.id, &changes).unwrap().unwrap();

        assert_eq!(updated.slug, "soup");
        assert_eq!(updated.ingredients, "pepper");
        assert_eq!(updated.date_added, recipe.date_added);
    }

    fn new_user(email: &str) -> NewUser<'_> {
        NewUser {
            email,
            password_hash: "x",
            email_confirmed: false,
        }
    }

    #[test]
    fn test_expired_sessions_are_ignored_and_pruned() {
        let store = MemoryStore::new();
        store.ensure_role("Customer").unwrap();
        let user = store
            .insert_user_with_role(&new_user("a@example.com"), "Customer")
            .unwrap();
        let other = store
            .insert_user_with_role(&new_user("b@example.com"), "Customer")
            .unwrap();
        let now = Utc::now();
        store
            .create_session(user.id, "old", now - Duration::minutes(1))
            .unwrap();
        store
            .create_session(user.id, "live", now + Duration::days(1))
            .unwrap();
        store
            .create_session(other.id, "other-old", now - Duration::minutes(1))
            .unwrap();

        assert!(store.find_session_user("old", now).unwrap().is_none());

        assert_eq!(store.delete_expired_sessions(user.id, now).unwrap(), 1);
        assert_eq!(store.session_count(), 2);
        assert!(store.find_session_user("live", now).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_email_conflicts_case_insensitively() {
        let store = MemoryStore::new();
        store.ensure_role("Customer").unwrap();
        store
            .insert_user_with_role(&new_user("Chef@Example.com"), "Customer")
            .unwrap();

        let err = store
            .insert_user_with_role(&new_user("chef@example.com"), "Customer")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_unknown_role_leaves_no_user_behind() {
        let store = MemoryStore::new();

        let err = store
            .insert_user_with_role(&new_user("chef@example.com"), "Customer")
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownRole(_)));
        assert!(store.find_user_by_email("chef@example.com").unwrap().is_none());

        store.ensure_role("Customer").unwrap();
        let user = store
            .insert_user_with_role(&new_user("chef@example.com"), "Customer")
            .unwrap();
        assert_eq!(store.user_roles(user.id).unwrap(), vec!["Customer"]);
    }
}
