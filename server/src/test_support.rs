//! Shared fixtures for router tests: an app over [`MemoryStore`] plus
//! helpers for building requests and reading responses.

use crate::auth::session::{start_session, SESSION_COOKIE};
use crate::auth::{hash_password, HashingMode, Role};
use crate::config::Config;
use crate::models::{NewRecipe, NewUser, Recipe, User};
use crate::slug::generate_slug;
use crate::store::{IdentityStore, MemoryStore, RecipeStore, SharedStore};
use crate::AppState;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower::ServiceExt;
use url::form_urlencoded;

pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new(page_size: i64) -> Self {
        let page_size = page_size.to_string();
        Self::build(&[("RECIPE_PAGE_SIZE", &page_size)], true)
    }

    /// App with extra config variables on top of the test defaults; roles are
    /// only created when `seed_roles` is set.
    pub fn build(vars: &[(&str, &str)], seed_roles: bool) -> Self {
        let config = Config::from_lookup(|key| {
            if let Some((_, value)) = vars.iter().find(|(k, _)| *k == key) {
                return Some(value.to_string());
            }
            match key {
                "DATABASE_URL" => Some("postgres://unused".to_string()),
                "INSECURE_PASSWORD_HASHING" => Some("1".to_string()),
                _ => None,
            }
        })
        .unwrap();

        let store = Arc::new(MemoryStore::new());
        if seed_roles {
            for role in Role::ALL {
                store.ensure_role(role.as_str()).unwrap();
            }
        }

        let shared: SharedStore = store.clone();
        let state = AppState::new(shared, config).unwrap();
        Self {
            store,
            router: crate::app(state),
        }
    }

    pub fn user(&self, email: &str, role: Role) -> User {
        let hash = hash_password(PASSWORD, HashingMode::Fast).unwrap();
        self.store
            .insert_user_with_role(
                &NewUser {
                    email,
                    password_hash: &hash,
                    email_confirmed: true,
                },
                role.as_str(),
            )
            .unwrap()
    }

    /// A `Cookie` header value for a fresh session of `user`.
    pub fn session_for(&self, user: &User) -> String {
        let token = start_session(self.store.as_ref(), user.id).unwrap();
        format!("{SESSION_COOKIE}={token}")
    }

    pub fn admin_session(&self) -> (User, String) {
        let admin = self.user("admin@example.com", Role::Admin);
        let cookie = self.session_for(&admin);
        (admin, cookie)
    }

    pub fn recipe(&self, author: &User, name: &str, date_added: DateTime<Utc>) -> Recipe {
        let slug = generate_slug(name);
        self.store
            .insert_recipe(&NewRecipe {
                name,
                slug: &slug,
                image_url: "https://img.example/food.jpg",
                ingredients: "1 cup rice",
                instructions_html: "<p>Cook it.</p>",
                date_added,
                author_id: author.id,
            })
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location<B>(response: &Response<B>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// `name=value` of the session cookie set by the response, if any.
pub fn session_cookie_set<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| {
            pair.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .is_some_and(|value| !value.is_empty())
        })
        .map(str::to_string)
}
