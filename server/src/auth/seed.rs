//! One-time bootstrap of roles and the default administrator.

use super::crypto::{hash_password, HashingMode};
use super::roles::Role;
use super::{AuthError, MIN_PASSWORD_LENGTH};
use crate::config::SeedAdmin;
use crate::models::NewUser;
use crate::store::{IdentityStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed admin email/password are not configured")]
    MissingCredentials,

    #[error("failed to create admin user: {0}")]
    InvalidAdmin(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
    pub roles_created: Vec<Role>,
    pub admin_created: bool,
    pub admin_role_granted: bool,
}

/// Ensure every [`Role`] exists and that the configured admin account exists
/// with the `Admin` role. Safe to run on every startup. An existing account
/// keeps its password; it only regains the `Admin` role if it lost it.
pub fn seed_roles_and_admin<S>(
    store: &S,
    seed_admin: Option<&SeedAdmin>,
    hashing: HashingMode,
) -> Result<SeedReport, SeedError>
where
    S: IdentityStore + ?Sized,
{
    let mut report = SeedReport::default();

    for role in Role::ALL {
        if store.ensure_role(role.as_str())? {
            report.roles_created.push(role);
        }
    }

    let seed = seed_admin.ok_or(SeedError::MissingCredentials)?;

    if let Some(existing) = store.find_user_by_email(&seed.email)? {
        let is_admin = store
            .user_roles(existing.id)?
            .iter()
            .any(|name| name == Role::Admin.as_str());
        if !is_admin {
            store.add_user_to_role(existing.id, Role::Admin.as_str())?;
            report.admin_role_granted = true;
            tracing::warn!(email = %seed.email, "seed admin was missing the Admin role");
        }
        return Ok(report);
    }

    if seed.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(SeedError::InvalidAdmin(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = hash_password(&seed.password, hashing)?;
    store.insert_user_with_role(
        &NewUser {
            email: &seed.email,
            password_hash: &password_hash,
            email_confirmed: true,
        },
        Role::Admin.as_str(),
    )?;
    report.admin_created = true;

    tracing::info!(email = %seed.email, "seeded admin user");
    Ok(report)
}
