//! Configuration management for the check suite.
//!
//! Settings come from environment variables, optionally seeded from a `.env`
//! file in the working directory.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;

/// Configuration for the check suite tooling.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the local definition store (default: ".check-suite")
    pub local_dir: PathBuf,

    /// Remote definition store base URL; the local store is used when unset
    pub remote_url: Option<String>,

    /// API key for the remote store
    pub api_key: String,

    /// Project the remote store files definitions under (default: "default")
    pub project: String,

    /// HTTP request timeout in seconds (default: 10)
    pub request_timeout: u64,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `CHECK_SUITE_LOCAL_DIR`: Local store root (default: ".check-suite")
    /// - `CHECK_SUITE_REMOTE_URL`: Remote store base URL
    /// - `CHECK_SUITE_API_KEY`: API key, required when a remote URL is set
    /// - `CHECK_SUITE_PROJECT`: Remote project (default: "default")
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 10)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // dotenvy::dotenv() does not print to stdout
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let local_dir = env::var("CHECK_SUITE_LOCAL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.local_dir);

        let remote_url = env::var("CHECK_SUITE_REMOTE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let api_key = env::var("CHECK_SUITE_API_KEY").unwrap_or_default();

        if let Some(url) = &remote_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    var: "CHECK_SUITE_REMOTE_URL".to_string(),
                    reason: "Must start with http:// or https://".to_string(),
                });
            }

            if api_key.trim().is_empty() {
                return Err(ConfigError::MissingVar("CHECK_SUITE_API_KEY".to_string()));
            }
        }

        let project = env::var("CHECK_SUITE_PROJECT").unwrap_or(defaults.project);
        if project.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "CHECK_SUITE_PROJECT".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", defaults.request_timeout)?;
        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            local_dir,
            remote_url,
            api_key,
            project,
            request_timeout,
            log_level,
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            local_dir: PathBuf::from(".check-suite"),
            remote_url: None,
            api_key: String::new(),
            project: "default".to_string(),
            request_timeout: 10,
            log_level: "error".to_string(),
        }
    }
}
