use crate::auth::session::{session_cookie, start_session};
use crate::auth::{hash_password, Role, MIN_PASSWORD_LENGTH};
use crate::error::AppError;
use crate::models::NewUser;
use crate::recipes::FieldErrors;
use crate::store::StoreError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim();

        if email.is_empty() {
            errors.add("email", "The Email field is required.");
        } else if !looks_like_email(email) {
            errors.add("email", "The Email field is not a valid e-mail address.");
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("The Password must be at least {MIN_PASSWORD_LENGTH} characters long."),
            );
        }

        if self.password != self.confirm_password {
            errors.add(
                "confirmPassword",
                "The password and confirmation password do not match.",
            );
        }

        errors.into_result()
    }
}

fn render_register(
    state: &AppState,
    email: &str,
    errors: &FieldErrors,
) -> Result<Response, AppError> {
    let mut context = base_context(None);
    context.insert("email", email);
    context.insert("errors", errors);
    Ok(state.views.render("auth/register.html", &context)?.into_response())
}

pub async fn register_form(State(state): State<AppState>) -> Result<Response, AppError> {
    render_register(&state, "", &FieldErrors::default())
}

/// New accounts get the Customer role and are signed in straight away.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return render_register(&state, &form.email, &errors);
    }

    let email = form.email.trim();
    let password_hash = hash_password(&form.password, state.config.password_hashing())?;
    let store = state.store.as_ref();

    let new_user = NewUser {
        email,
        password_hash: &password_hash,
        email_confirmed: false,
    };
    let user = match store.insert_user_with_role(&new_user, Role::Customer.as_str()) {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => {
            let mut errors = FieldErrors::default();
            errors.add("email", format!("Email '{email}' is already taken."));
            return render_register(&state, email, &errors);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, "user registered");

    let token = start_session(store, user.id)?;
    let jar = jar.add(session_cookie(token, false, state.config.secure_cookies));
    Ok((jar, Redirect::to("/")).into_response())
}
