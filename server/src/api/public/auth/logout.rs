use crate::auth::session::{end_session, removal_cookie, SESSION_COOKIE};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        end_session(state.store.as_ref(), cookie.value())?;
    }
    let jar = jar.remove(removal_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}
