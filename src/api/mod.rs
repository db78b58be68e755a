//! REST API Client
//!
//! Thin async wrappers over the backend's chat endpoints. Every
//! endpoint answers with a uniform `{success, data, message}` envelope;
//! failures come back as structured [`ClientError`] values, never
//! panics, so call sites decide whether to surface or swallow them.
//!
//! The API is a consumed contract: nothing here defines server
//! behavior.

pub mod admins;
pub mod messages;
pub mod rooms;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::error::ClientError;

/// Uniform response envelope returned by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Config,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a GET request with auth headers applied
    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(self.config.api_url(path)))
    }

    /// Build a POST request with auth headers applied
    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(self.config.api_url(path)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Decode an envelope response into its data payload.
    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| status.to_string());
            // Error bodies use the same envelope when the backend
            // produced them; proxies may hand back plain text.
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or(text);
            return Err(ClientError::api(format!("{}: {}", status, message)));
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ClientError::api(
                envelope
                    .message
                    .unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::api("response envelope is missing data"))
    }

    /// Decode an envelope response that carries no data payload.
    pub(crate) async fn decode_ok(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| status.to_string());
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or(text);
            return Err(ClientError::api(format!("{}: {}", status, message)));
        }

        let envelope: Envelope<serde_json::Value> = response.json().await?;
        if !envelope.success {
            return Err(ClientError::api(
                envelope
                    .message
                    .unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(())
    }
}
