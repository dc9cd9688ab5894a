use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};

use crate::interface_adapters::clients::DEFAULT_TIMEOUT;

// Runtime configuration for the API client. Env vars win over the optional TOML file.

pub const BASE_URL_VAR: &str = "PROCUREMENT_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "PROCUREMENT_API_TIMEOUT_MS";
pub const EMAIL_VAR: &str = "PROCUREMENT_EMAIL";
pub const PASSWORD_VAR: &str = "PROCUREMENT_PASSWORD";
pub const CONFIG_FILE_VAR: &str = "PROCUREMENT_CONFIG";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid api base url {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

// Shape of the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    api_timeout_ms: Option<u64>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_timeout: DEFAULT_TIMEOUT,
            credentials: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            self.api_base_url = validate_url(url)?;
        }
        Ok(self)
    }
}

fn validate_url(url: String) -> Result<String, ConfigError> {
    match url::Url::parse(&url) {
        Ok(_) => Ok(url),
        Err(source) => Err(ConfigError::InvalidUrl { url, source }),
    }
}

fn parse_millis(value: Option<String>) -> Option<Duration> {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
}

// Merge the file (if any) with a lookup of env vars. Split from `load` so tests
// do not touch the process environment.
pub fn from_sources<F>(file: Option<&str>, lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file: FileConfig = match file {
        Some(raw) => toml::from_str(raw)?,
        None => FileConfig::default(),
    };

    let api_base_url = lookup(BASE_URL_VAR)
        .or(file.api_base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let api_base_url = validate_url(api_base_url)?;

    let api_timeout = parse_millis(lookup(TIMEOUT_VAR))
        .or_else(|| file.api_timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis))
        .unwrap_or(DEFAULT_TIMEOUT);

    let email = lookup(EMAIL_VAR).or(file.email);
    let password = lookup(PASSWORD_VAR).or(file.password);
    let credentials = match (email, password) {
        (Some(email), Some(password)) => Some(Credentials { email, password }),
        _ => None,
    };

    Ok(ClientConfig {
        api_base_url,
        api_timeout,
        credentials,
    })
}

pub fn load() -> Result<ClientConfig, ConfigError> {
    let raw = match env::var(CONFIG_FILE_VAR) {
        Ok(path) => {
            let path = PathBuf::from(path);
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path, source })?;
            Some(raw)
        }
        Err(_) => None,
    };
    from_sources(raw.as_deref(), |key| env::var(key).ok())
}
