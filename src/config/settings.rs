//! Client configuration settings
//!
//! Defines the configuration consumed by the API client and its environment loader

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default service URL
pub const DEFAULT_SERVICE_URL: &str = "https://sandbox.api.com";

/// Stream identifier for standard output, the default debug sink
pub const STDOUT_DEBUG_FILE: &str = "stdout";

/// Stream identifier for standard error
pub const STDERR_DEBUG_FILE: &str = "stderr";

/// Default User-Agent header value
pub const DEFAULT_USER_AGENT: &str = concat!("apiconnector/", env!("CARGO_PKG_VERSION"));

/// How outbound POST requests are authorized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// No Authorization header
    #[default]
    None,
    /// Fetch an OAuth2 client-credentials token and send it as a bearer token
    BearerToken,
}

impl FromStr for AuthMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(AuthMode::None),
            "bearer_token" | "bearer" => Ok(AuthMode::BearerToken),
            other => anyhow::bail!("Invalid auth mode: {}", other),
        }
    }
}

/// API client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    /// Base URL of the remote service
    pub service_url: String,
    /// Value of the `x-api-key` header
    pub api_key: String,
    /// Enable wire tracing to `debug_file`
    pub debug: bool,
    /// Path (or stream identifier) the wire trace is written to
    pub debug_file: String,
    /// OAuth2 token endpoint
    pub auth_token_url: Option<String>,
    /// OAuth2 grant type
    pub grant_type: Option<String>,
    /// OAuth2 client id
    pub client_id: Option<String>,
    /// OAuth2 client secret
    pub client_secret: Option<String>,
    /// Content-Type of POST requests
    pub content_type: String,
    /// User-Agent of GET/PATCH requests
    pub user_agent: String,
    /// Authorization mode for POST requests
    pub auth_mode: AuthMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            api_key: String::new(),
            debug: false,
            debug_file: STDOUT_DEBUG_FILE.to_string(),
            auth_token_url: None,
            grant_type: None,
            client_id: None,
            client_secret: None,
            content_type: "application/json".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth_mode: AuthMode::None,
        }
    }
}

impl Configuration {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            service_url: get_env_or_default("CONNECTOR_SERVICE_URL", &defaults.service_url),
            api_key: get_env_or_default("CONNECTOR_API_KEY", &defaults.api_key),
            debug: get_env_or_default("CONNECTOR_DEBUG", "false")
                .parse()
                .context("Invalid debug flag")?,
            debug_file: get_env_or_default("CONNECTOR_DEBUG_FILE", &defaults.debug_file),
            auth_token_url: env::var("CONNECTOR_AUTH_TOKEN_URL").ok(),
            grant_type: env::var("CONNECTOR_GRANT_TYPE").ok(),
            client_id: env::var("CONNECTOR_CLIENT_ID").ok(),
            client_secret: env::var("CONNECTOR_CLIENT_SECRET").ok(),
            content_type: get_env_or_default("CONNECTOR_CONTENT_TYPE", &defaults.content_type),
            user_agent: get_env_or_default("CONNECTOR_USER_AGENT", &defaults.user_agent),
            auth_mode: get_env_or_default("CONNECTOR_AUTH_MODE", "none")
                .parse()
                .context("Invalid CONNECTOR_AUTH_MODE")?,
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            level: get_env_or_default("RUST_LOG", "info"),
            format: get_env_or_default("LOG_FORMAT", "text"),
        };

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&config.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", config.format);
        }

        Ok(config)
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
