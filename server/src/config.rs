use std::{env, fmt, fmt::Display, str::FromStr};

use crate::auth::HashingMode;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const DEFAULT_LOGIN_PATH: &str = "/Auth/Login";
pub const DEFAULT_ACCESS_DENIED_PATH: &str = "/Auth/AccessDenied";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Credentials for the administrator account created at startup.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

/// Process-wide settings, loaded once in `main` and handed to the components
/// that need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub page_size: i64,
    pub seed_admin: Option<SeedAdmin>,
    pub login_path: String,
    pub access_denied_path: String,
    pub bind_addr: String,
    pub secure_cookies: bool,
    pub insecure_password_hashing: bool,
    pub track_db_query_count: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests need not touch the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let page_size: i64 = try_load(&lookup, "RECIPE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size < 1 {
            return Err(ConfigError::Invalid {
                key: "RECIPE_PAGE_SIZE",
                value: page_size.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let seed_admin = match (lookup("SEED_ADMIN_EMAIL"), lookup("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            page_size,
            seed_admin,
            login_path: lookup("LOGIN_PATH").unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            access_denied_path: lookup("ACCESS_DENIED_PATH")
                .unwrap_or_else(|| DEFAULT_ACCESS_DENIED_PATH.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            secure_cookies: try_load(&lookup, "SECURE_COOKIES", false)?,
            insecure_password_hashing: try_load(
                &lookup,
                "INSECURE_PASSWORD_HASHING",
                Flag(false),
            )?
            .0,
            track_db_query_count: try_load(&lookup, "TRACK_DB_QUERY_COUNT", Flag(false))?.0,
        })
    }

    pub fn password_hashing(&self) -> HashingMode {
        HashingMode::from_insecure_flag(self.insecure_password_hashing)
    }
}

/// On/off switch written as `1`/`0` or `true`/`false`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Flag(bool);

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Flag(true)),
            "0" | "false" | "no" | "off" | "" => Ok(Flag(false)),
            other => Err(format!("expected 1/0 or true/false, got {other:?}")),
        }
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.0 { "1" } else { "0" })
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
