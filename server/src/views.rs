//! Server-rendered HTML pages.

use crate::auth::{Principal, Role};
use crate::error::AppError;
use axum::response::Html;
use tera::{Context, Tera};

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("home.html", include_str!("../templates/home.html")),
    (
        "admin/_recipe_cards.html",
        include_str!("../templates/admin/_recipe_cards.html"),
    ),
    (
        "admin/index.html",
        include_str!("../templates/admin/index.html"),
    ),
    ("admin/form.html", include_str!("../templates/admin/form.html")),
    (
        "admin/delete.html",
        include_str!("../templates/admin/delete.html"),
    ),
    (
        "recipes/details.html",
        include_str!("../templates/recipes/details.html"),
    ),
    ("auth/login.html", include_str!("../templates/auth/login.html")),
    (
        "auth/register.html",
        include_str!("../templates/auth/register.html"),
    ),
    (
        "auth/access_denied.html",
        include_str!("../templates/auth/access_denied.html"),
    ),
];

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}

/// Context every page gets: who is signed in, for the header.
pub fn base_context(principal: Option<&Principal>) -> Context {
    let mut context = Context::new();
    context.insert("current_user", &principal.map(|p| p.user.email.as_str()));
    context.insert(
        "is_admin",
        &principal.is_some_and(|p| p.has_role(Role::Admin)),
    );
    context
}
