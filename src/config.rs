// src/config.rs
//! Runtime configuration, read from the environment.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `FUNDFOLIO_API_URL` | Backend base URL | `http://localhost:8000` |
//! | `FUNDFOLIO_SESSION_FILE` | Persisted session file | `$HOME/.fundfolio/session.json` |
//! | `FUNDFOLIO_TOKEN_TRANSPORT` | `legacy` or `bearer` | `legacy` |
//! | `RUST_LOG` | Log level filter | `warn` |

use crate::error::ConfigError;
use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const API_URL_ENV: &str = "FUNDFOLIO_API_URL";
pub const SESSION_FILE_ENV: &str = "FUNDFOLIO_SESSION_FILE";
pub const TOKEN_TRANSPORT_ENV: &str = "FUNDFOLIO_TOKEN_TRANSPORT";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const SESSION_DIR: &str = ".fundfolio";
const SESSION_FILE: &str = "session.json";

/// How a bearer token travels with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenTransport {
    /// `Authorization: Bearer` on every method.
    #[default]
    BearerHeader,
    /// GET carries the token as `?token=`, every other method uses the header.
    /// Required by the current backend.
    Legacy,
}

impl FromStr for TokenTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(TokenTransport::BearerHeader),
            "legacy" => Ok(TokenTransport::Legacy),
            other => Err(ConfigError::Invalid {
                var: TOKEN_TRANSPORT_ENV,
                reason: format!("unknown token transport '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub token_transport: TokenTransport,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            session_file: default_session_file(env::var_os("HOME").map(PathBuf::from)),
            token_transport: TokenTransport::Legacy,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(raw) = lookup(API_URL_ENV) {
            config.api_url = parse_api_url(&raw)?;
        }
        if let Some(path) = lookup(SESSION_FILE_ENV) {
            config.session_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup(TOKEN_TRANSPORT_ENV) {
            config.token_transport = raw.parse()?;
        }

        Ok(config)
    }
}

pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        var: API_URL_ENV,
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            var: API_URL_ENV,
            reason: format!("'{raw}' cannot be used as a base URL"),
        });
    }
    Ok(url)
}

fn default_session_file(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_else(|| PathBuf::from("."))
        .join(SESSION_DIR)
        .join(SESSION_FILE)
}
