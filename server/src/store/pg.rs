use super::{IdentityStore, RecipeStore, StoreError};
use crate::db::{DbConn, DbPool};
use crate::models::{
    Author, NewRecipe, NewSession, NewUser, Recipe, RecipeChanges, RecipeWithAuthor, User,
};
use crate::schema::{recipes, roles, sessions, user_roles, users};
use crate::slug::disambiguate;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Bool, Text};
use tracing::span::EnteredSpan;
use uuid::Uuid;

/// PostgreSQL-backed store over an r2d2 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, StoreError> {
        Ok(self.pool.get()?)
    }
}

/// Each store call opens a `db.query` span; the telemetry layer counts them
/// per request.
fn query_span(op: &'static str) -> EnteredSpan {
    tracing::info_span!("db.query", op).entered()
}

fn slug_taken(
    conn: &mut PgConnection,
    slug: &str,
    excluding: Option<i32>,
) -> Result<bool, StoreError> {
    let mut query = recipes::table
        .filter(recipes::slug.eq(slug))
        .select(recipes::id)
        .into_boxed();
    if let Some(id) = excluding {
        query = query.filter(recipes::id.ne(id));
    }
    Ok(query.first::<i32>(conn).optional()?.is_some())
}

impl RecipeStore for PgStore {
    fn list_recipes(&self, skip: i64, limit: i64) -> Result<Vec<Recipe>, StoreError> {
        let _span = query_span("list_recipes");
        let mut conn = self.conn()?;

        let rows = recipes::table
            .order((recipes::date_added.desc(), recipes::id.desc()))
            .offset(skip)
            .limit(limit)
            .select(Recipe::as_select())
            .load(&mut conn)?;

        Ok(rows)
    }

    fn count_recipes(&self) -> Result<i64, StoreError> {
        let _span = query_span("count_recipes");
        let mut conn = self.conn()?;
        Ok(recipes::table.count().get_result(&mut conn)?)
    }

    fn find_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        let _span = query_span("find_recipe");
        let mut conn = self.conn()?;

        let recipe = recipes::table
            .find(id)
            .select(Recipe::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(recipe)
    }

    fn find_recipe_by_slug(&self, slug: &str) -> Result<Option<RecipeWithAuthor>, StoreError> {
        let _span = query_span("find_recipe_by_slug");
        let mut conn = self.conn()?;

        let row = recipes::table
            .inner_join(users::table)
            .filter(recipes::slug.eq(slug))
            .order(recipes::id.asc())
            .select((Recipe::as_select(), Author::as_select()))
            .first::<(Recipe, Author)>(&mut conn)
            .optional()?;

        Ok(row.map(|(recipe, author)| RecipeWithAuthor { recipe, author }))
    }

    fn insert_recipe(&self, recipe: &NewRecipe<'_>) -> Result<Recipe, StoreError> {
        let _span = query_span("insert_recipe");
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let slug = disambiguate(recipe.slug, |candidate| slug_taken(conn, candidate, None))?;

            let row = NewRecipe {
                name: recipe.name,
                slug: &slug,
                image_url: recipe.image_url,
                ingredients: recipe.ingredients,
                instructions_html: recipe.instructions_html,
                date_added: recipe.date_added,
                author_id: recipe.author_id,
            };

            let inserted = diesel::insert_into(recipes::table)
                .values(&row)
                .returning(Recipe::as_returning())
                .get_result(conn)?;

            Ok(inserted)
        })
    }

    fn update_recipe(
        &self,
        id: i32,
        changes: &RecipeChanges<'_>,
    ) -> Result<Option<Recipe>, StoreError> {
        let _span = query_span("update_recipe");
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let existing: Option<i32> = recipes::table
                .find(id)
                .select(recipes::id)
                .for_update()
                .first(conn)
                .optional()?;
            if existing.is_none() {
                return Ok(None);
            }

            let slug =
                disambiguate(changes.slug, |candidate| slug_taken(conn, candidate, Some(id)))?;

            let row = RecipeChanges {
                name: changes.name,
                slug: &slug,
                image_url: changes.image_url,
                ingredients: changes.ingredients,
                instructions_html: changes.instructions_html,
            };

            let updated = diesel::update(recipes::table.find(id))
                .set(&row)
                .returning(Recipe::as_returning())
                .get_result(conn)?;

            Ok(Some(updated))
        })
    }

    fn delete_recipe(&self, id: i32) -> Result<bool, StoreError> {
        let _span = query_span("delete_recipe");
        let mut conn = self.conn()?;
        let deleted = diesel::delete(recipes::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

impl IdentityStore for PgStore {
    fn ensure_role(&self, name: &str) -> Result<bool, StoreError> {
        let _span = query_span("ensure_role");
        let mut conn = self.conn()?;

        let inserted = diesel::insert_into(roles::table)
            .values(roles::name.eq(name))
            .on_conflict(roles::name)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted > 0)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let _span = query_span("find_user_by_email");
        let mut conn = self.conn()?;

        let user = users::table
            .filter(
                diesel::dsl::sql::<Bool>("LOWER(email) = LOWER(")
                    .bind::<Text, _>(email)
                    .sql(")"),
            )
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user)
    }

    fn insert_user_with_role(&self, user: &NewUser<'_>, role: &str) -> Result<User, StoreError> {
        let _span = query_span("insert_user_with_role");
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let role_id: i32 = roles::table
                .filter(roles::name.eq(role))
                .select(roles::id)
                .first(conn)
                .optional()?
                .ok_or_else(|| StoreError::UnknownRole(role.to_string()))?;

            let created = match diesel::insert_into(users::table)
                .values(user)
                .returning(User::as_returning())
                .get_result(conn)
            {
                Ok(u) => u,
                Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    return Err(StoreError::Conflict(format!("user {}", user.email)));
                }
                Err(e) => return Err(e.into()),
            };

            diesel::insert_into(user_roles::table)
                .values((
                    user_roles::user_id.eq(created.id),
                    user_roles::role_id.eq(role_id),
                ))
                .execute(conn)?;

            Ok(created)
        })
    }

    fn add_user_to_role(&self, user_id: Uuid, role: &str) -> Result<(), StoreError> {
        let _span = query_span("add_user_to_role");
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let role_id: i32 = roles::table
                .filter(roles::name.eq(role))
                .select(roles::id)
                .first(conn)
                .optional()?
                .ok_or_else(|| StoreError::UnknownRole(role.to_string()))?;

            diesel::insert_into(user_roles::table)
                .values((
                    user_roles::user_id.eq(user_id),
                    user_roles::role_id.eq(role_id),
                ))
                .on_conflict_do_nothing()
                .execute(conn)?;

            Ok(())
        })
    }

    fn user_roles(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        let _span = query_span("user_roles");
        let mut conn = self.conn()?;

        let names = user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq(user_id))
            .select(roles::name)
            .order(roles::name.asc())
            .load::<String>(&mut conn)?;

        Ok(names)
    }

    fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let _span = query_span("create_session");
        let mut conn = self.conn()?;

        let new_session = NewSession {
            user_id,
            token_hash,
            expires_at,
        };

        diesel::insert_into(sessions::table)
            .values(&new_session)
            .execute(&mut conn)?;

        Ok(())
    }

    fn find_session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let _span = query_span("find_session_user");
        let mut conn = self.conn()?;

        let user = sessions::table
            .inner_join(users::table)
            .filter(sessions::token_hash.eq(token_hash))
            .filter(sessions::expires_at.gt(now))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(user)
    }

    fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let _span = query_span("delete_session");
        let mut conn = self.conn()?;

        diesel::delete(sessions::table.filter(sessions::token_hash.eq(token_hash)))
            .execute(&mut conn)?;

        Ok(())
    }

    fn delete_expired_sessions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let _span = query_span("delete_expired_sessions");
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::expires_at.le(now)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }
}
