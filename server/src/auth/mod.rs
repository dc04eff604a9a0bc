mod crypto;
mod extractor;
pub mod roles;
pub mod seed;
pub mod session;

pub use crypto::{hash_password, HashingMode};
pub use extractor::{AdminUser, CurrentUser};
pub use roles::{Forbidden, Permission, Principal, Role};

use crate::store::StoreError;
use thiserror::Error;

/// Shortest password accepted at registration and for the seeded admin.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to generate random bytes: {0}")]
    Random(String),

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
