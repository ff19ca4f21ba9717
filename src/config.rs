// src/config.rs
use std::env;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    database_url: String,
    database_max_connections: u32,
    save_max_attempts: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_database_url() -> String {
    "sqlite://unique_slug.db?mode=rwc".into()
}

fn default_database_max_connections() -> u32 {
    4
}

fn default_save_max_attempts() -> u32 {
    3
}

/// Read a positive integer variable, falling back to `default` when unset.
fn positive_var<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Result<String, env::VarError>,
{
    match lookup(key) {
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => {
            Err(ConfigError::Invalid(format!("{key} is not valid unicode")))
        }
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(ConfigError::Invalid(format!(
                "{key} must be a positive integer, got `{raw}`"
            ))),
            Ok(value) => Ok(value),
        },
    }
}

impl AppConfig {
    /// Build configuration from environment variables, loading `.env` first
    /// when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is blank or not a positive
    /// integer where one is expected.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|_| default_database_url());
        if database_url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            database_url,
            database_max_connections: positive_var(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                default_database_max_connections(),
            )?,
            save_max_attempts: positive_var(
                &lookup,
                "SLUG_SAVE_MAX_ATTEMPTS",
                default_save_max_attempts(),
            )?,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn database_max_connections(&self) -> u32 {
        self.database_max_connections
    }

    /// How many times a save is resolved and attempted before a slug conflict
    /// is reported to the caller.
    #[must_use]
    pub const fn save_max_attempts(&self) -> u32 {
        self.save_max_attempts
    }
}
