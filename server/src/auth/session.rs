use super::crypto::{generate_token, hash_token, verify_password};
use super::roles::{Principal, Role};
use super::AuthError;
use crate::models::User;
use crate::store::IdentityStore;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "recipe_session";
pub const SESSION_TTL_DAYS: i64 = 30;

/// Open a session for `user_id` and return the raw token. Only its hash is
/// persisted. The user's expired sessions are cleared first.
pub fn start_session<S>(store: &S, user_id: Uuid) -> Result<String, AuthError>
where
    S: IdentityStore + ?Sized,
{
    let token = generate_token()?;
    let now = Utc::now();
    let pruned = store.delete_expired_sessions(user_id, now)?;
    if pruned > 0 {
        tracing::debug!(%user_id, pruned, "removed expired sessions");
    }
    let expires_at = now + Duration::days(SESSION_TTL_DAYS);
    store.create_session(user_id, &hash_token(&token), expires_at)?;
    Ok(token)
}

pub fn end_session<S>(store: &S, token: &str) -> Result<(), AuthError>
where
    S: IdentityStore + ?Sized,
{
    store.delete_session(&hash_token(token))?;
    Ok(())
}

/// Check credentials. `None` covers both an unknown email and a wrong
/// password.
pub fn authenticate<S>(store: &S, email: &str, password: &str) -> Result<Option<User>, AuthError>
where
    S: IdentityStore + ?Sized,
{
    let Some(user) = store.find_user_by_email(email.trim())? else {
        return Ok(None);
    };

    if verify_password(password, &user.password_hash) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

pub fn principal_for<S>(store: &S, user: User) -> Result<Principal, AuthError>
where
    S: IdentityStore + ?Sized,
{
    let roles = store
        .user_roles(user.id)?
        .iter()
        .filter_map(|name| Role::from_name(name))
        .collect();
    Ok(Principal { user, roles })
}

/// Resolve a raw session token to its principal, ignoring expired sessions.
pub fn resolve_principal<S>(store: &S, token: &str) -> Result<Option<Principal>, AuthError>
where
    S: IdentityStore + ?Sized,
{
    match store.find_session_user(&hash_token(token), Utc::now())? {
        Some(user) => Ok(Some(principal_for(store, user)?)),
        None => Ok(None),
    }
}

/// The session cookie. Without `persistent` it is a browser-session cookie.
pub fn session_cookie(token: String, persistent: bool, secure: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    if persistent {
        builder = builder.max_age(time::Duration::days(SESSION_TTL_DAYS));
    }
    builder.build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
