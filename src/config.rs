//! Process configuration, assembled once at startup from environment variables
//! and passed by reference to everything that needs a credential.
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_NOTION_VERSION: &str = "NOTION_VERSION";
pub const ENV_BUNDLES_DB: &str = "NOTION_BUNDLES_DB";
pub const ENV_BOOKS_DB: &str = "NOTION_BOOKS_DB";
pub const ENV_HUMBLE_EMAIL: &str = "HUMBLE_EMAIL";
pub const ENV_HUMBLE_PASSWORD: &str = "HUMBLE_PASSWORD";
pub const ENV_WEBDRIVER_URL: &str = "WEBDRIVER_URL";
pub const ENV_BACKUP_DIR: &str = "BACKUP_DIR";

pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_BACKUP_DIR: &str = "./backups";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Everything a script can need. Built before any network activity; a missing
/// required variable is a fatal startup condition.
#[derive(Debug, Clone)]
pub struct Config {
    pub notion: NotionConfig,
    pub humble: Option<HumbleCredentials>,
    /// Default container ids so most scripts can run without a positional argument.
    pub bundles_db: Option<String>,
    pub books_db: Option<String>,
    pub webdriver_url: String,
    pub backup_dir: PathBuf,
}

#[derive(Clone)]
pub struct NotionConfig {
    pub token: String,
    pub version: String,
}

/// Storefront login, only required by the scraping scripts.
#[derive(Clone, PartialEq, Eq)]
pub struct HumbleCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionConfig")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for HumbleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HumbleCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an injected lookup so tests can supply fake credentials
    /// without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = required(&lookup, ENV_NOTION_TOKEN)?;
        let version = lookup(ENV_NOTION_VERSION)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string());

        let humble = match (lookup(ENV_HUMBLE_EMAIL), lookup(ENV_HUMBLE_PASSWORD)) {
            (Some(email), Some(password))
                if !email.trim().is_empty() && !password.trim().is_empty() =>
            {
                Some(HumbleCredentials { email, password })
            }
            _ => None,
        };

        Ok(Config {
            notion: NotionConfig { token, version },
            humble,
            bundles_db: lookup(ENV_BUNDLES_DB).filter(|v| !v.trim().is_empty()),
            books_db: lookup(ENV_BOOKS_DB).filter(|v| !v.trim().is_empty()),
            webdriver_url: lookup(ENV_WEBDRIVER_URL)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
            backup_dir: lookup(ENV_BACKUP_DIR)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR)),
        })
    }

    /// Storefront credentials, or a fatal config error for the scraping scripts.
    pub fn require_humble(&self) -> Result<&HumbleCredentials, ConfigError> {
        self.humble
            .as_ref()
            .ok_or(ConfigError::MissingVar(ENV_HUMBLE_EMAIL))
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
