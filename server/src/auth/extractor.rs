use super::roles::{Permission, Principal};
use super::session::{resolve_principal, SESSION_COOKIE};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use url::form_urlencoded;

/// The signed-in user, if any. Never rejects anonymous requests.
pub struct CurrentUser(pub Option<Principal>);

/// A signed-in user allowed to manage recipes.
///
/// Anonymous requests are sent to the login page with a `ReturnUrl`;
/// signed-in users without the permission are sent to the access-denied page.
/// Either way the handler body never runs.
pub struct AdminUser(pub Principal);

#[derive(Debug)]
pub enum AuthRejection {
    Login { location: String },
    AccessDenied { location: String },
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login { location } | AuthRejection::AccessDenied { location } => {
                Redirect::to(&location).into_response()
            }
            AuthRejection::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Something went wrong</h1>"),
            )
                .into_response(),
        }
    }
}

/// Session token from the cookie, falling back to an `Authorization: Bearer`
/// header for non-browser clients.
fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn principal_from_parts(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<Principal>, AuthRejection> {
    let Some(token) = session_token(parts) else {
        return Ok(None);
    };

    resolve_principal(state.store.as_ref(), &token).map_err(|e| {
        tracing::error!("Failed to resolve session: {}", e);
        AuthRejection::Unavailable
    })
}

pub fn login_redirect(login_path: &str, return_to: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{login_path}?ReturnUrl={encoded}")
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(principal_from_parts(parts, state)?))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(principal) = principal_from_parts(parts, state)? else {
            // Nested routers see a stripped URI; redirect back to the full one.
            let uri = parts
                .extensions
                .get::<OriginalUri>()
                .map(|original| original.0.clone())
                .unwrap_or_else(|| parts.uri.clone());
            let return_to = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

            return Err(AuthRejection::Login {
                location: login_redirect(&state.config.login_path, return_to),
            });
        };

        if !principal.can(Permission::ManageRecipes) {
            tracing::warn!(user_id = %principal.user.id, "admin access denied");
            return Err(AuthRejection::AccessDenied {
                location: state.config.access_denied_path.clone(),
            });
        }

        Ok(AdminUser(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_return_url() {
        assert_eq!(
            login_redirect("/Auth/Login", "/Admin/Edit/3?x=1"),
            "/Auth/Login?ReturnUrl=%2FAdmin%2FEdit%2F3%3Fx%3D1"
        );
    }
}
