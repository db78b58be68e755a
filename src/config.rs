//! Client Configuration
//!
//! Provides configuration for the client core: server URL, bearer
//! token, cache location and retry policy. Values come from the
//! builder, falling back to environment variables and defaults.

use std::path::PathBuf;

use thiserror::Error;

use crate::outbox::RetryPolicy;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Environment variable overriding the default server URL
const SERVER_URL_ENV: &str = "DESKCHAT_API_URL";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    server_url: String,
    token: Option<String>,
    cache_path: Option<PathBuf>,
    retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        let server_url =
            std::env::var(SERVER_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self {
            server_url,
            token: None,
            cache_path: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ConfigBuilder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Set the bearer token after login
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the bearer token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Get the push channel URL derived from the server URL
    pub fn socket_url(&self) -> Result<String, ConfigError> {
        let ws_base = if let Some(rest) = self.server_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.server_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            return Err(ConfigError::InvalidUrl(self.server_url.clone()));
        };
        Ok(format!("{}/socket", ws_base))
    }

    /// Override for the cache database location, if set
    pub fn cache_path(&self) -> Option<&PathBuf> {
        self.cache_path.as_ref()
    }

    /// Retry policy for the outbox
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    server_url: Option<String>,
    token: Option<String>,
    cache_path: Option<PathBuf>,
    retry: Option<RetryPolicy>,
}

impl ConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the cache database path
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Set the retry policy
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let server_url = self.server_url.unwrap_or(defaults.server_url);
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(server_url));
        }
        Ok(Config {
            server_url: server_url.trim_end_matches('/').to_string(),
            token: self.token,
            cache_path: self.cache_path,
            retry: self.retry.unwrap_or(defaults.retry),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
