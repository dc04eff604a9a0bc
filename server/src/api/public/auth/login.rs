use super::local_return_url;
use crate::auth::session::{authenticate, principal_for, session_cookie, start_session};
use crate::auth::{Permission, Principal};
use crate::error::AppError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tera::Context;

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    #[serde(rename = "ReturnUrl")]
    pub return_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    pub return_url: String,
}

fn login_context(email: &str, return_url: &str) -> Context {
    let mut context = base_context(None);
    context.insert("email", email);
    context.insert("return_url", return_url);
    context
}

fn default_destination(principal: &Principal) -> &'static str {
    if principal.can(Permission::ManageRecipes) {
        "/Admin"
    } else {
        "/"
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Result<Response, AppError> {
    let context = login_context("", params.return_url.as_deref().unwrap_or(""));
    Ok(state.views.render("auth/login.html", &context)?.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let store = state.store.as_ref();

    let Some(user) = authenticate(store, &form.email, &form.password)? else {
        tracing::info!("rejected login attempt");
        let mut context = login_context(&form.email, &form.return_url);
        context.insert("error", "Invalid login attempt.");
        return Ok(state.views.render("auth/login.html", &context)?.into_response());
    };

    let token = start_session(store, user.id)?;
    let principal = principal_for(store, user)?;
    tracing::info!(user_id = %principal.user.id, "user logged in");

    let destination = local_return_url(&form.return_url)
        .unwrap_or_else(|| default_destination(&principal))
        .to_string();
    let jar = jar.add(session_cookie(
        token,
        form.remember_me,
        state.config.secure_cookies,
    ));
    Ok((jar, Redirect::to(&destination)).into_response())
}
