use super::AuthError;
use argon2::{
    password_hash::{
        rand_core::OsRng as SaltRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};

/// Argon2 cost used for new password hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashingMode {
    /// Library default cost.
    Standard,
    /// Minimal cost for dev and test databases. Not for production.
    Fast,
}

impl HashingMode {
    pub fn from_insecure_flag(insecure: bool) -> Self {
        if insecure {
            HashingMode::Fast
        } else {
            HashingMode::Standard
        }
    }
}

pub fn generate_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Random(e.to_string()))?;
    Ok(hex::encode(bytes))
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn get_argon2(mode: HashingMode) -> Result<Argon2<'static>, AuthError> {
    match mode {
        HashingMode::Standard => Ok(Argon2::default()),
        HashingMode::Fast => {
            let params =
                Params::new(1024, 1, 1, None).map_err(|e| AuthError::Hash(e.to_string()))?;
            Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
        }
    }
}

pub fn hash_password(password: &str, mode: HashingMode) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut SaltRng);
    let hash = get_argon2(mode)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    // Cost parameters come from the PHC string, not from the instance.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
