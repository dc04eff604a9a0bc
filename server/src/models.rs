use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub email_confirmed: bool,
}

/// The public face of a user, as joined onto a recipe detail page.
#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Author {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub image_url: String,
    pub ingredients: String,
    pub instructions_html: String,
    pub date_added: DateTime<Utc>,
    pub author_id: Uuid,
}

/// Insert payload. `slug` is the generated base slug; the store may suffix
/// it to keep slugs unique.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub image_url: &'a str,
    pub ingredients: &'a str,
    pub instructions_html: &'a str,
    pub date_added: DateTime<Utc>,
    pub author_id: Uuid,
}

/// Columns an edit may overwrite. `date_added` and `author_id` are absent on
/// purpose: they are fixed at creation.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChanges<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub image_url: &'a str,
    pub ingredients: &'a str,
    pub instructions_html: &'a str,
}

#[derive(Serialize, Debug, Clone)]
pub struct RecipeWithAuthor {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub author: Author,
}
