//! Upstream relay client shared by the token exchange and query proxies.
//!
//! The relay forwards one request, reads the provider's status and JSON body,
//! and hands both back untouched. Only local failures (transport errors,
//! non-JSON bodies) become errors.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;

use crate::error::{OAuthError, Result};

/// OAuth token endpoint path, relative to the audience.
pub const TOKEN_PATH: &str = "/services/oauth2/token";

/// REST API version used for SOQL queries.
pub const DEFAULT_API_VERSION: &str = "v60.0";

/// Bound on every upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the relay client.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub token_path: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            token_path: TOKEN_PATH.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RelayConfig {
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A provider response, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamResponse {
    /// HTTP status code returned by the provider.
    pub status: u16,
    /// JSON body returned by the provider, unmodified.
    pub body: serde_json::Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for forwarding requests to Salesforce.
#[derive(Debug, Clone)]
pub struct Relay {
    client: Client,
    config: RelayConfig,
}

impl Relay {
    /// Create a relay with the default config.
    pub fn new() -> Result<Self> {
        Self::with_config(RelayConfig::default())
    }

    /// Create a relay with a custom config.
    pub fn with_config(config: RelayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Get the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Send a prepared request and capture the provider's status and body.
    pub(crate) async fn forward(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<UpstreamResponse> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint = %endpoint, error = %e, "Upstream request failed");
            OAuthError::Network(format!("Request to {} failed: {}", endpoint, e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OAuthError::Network(format!("Failed to read response: {}", e)))?;

        tracing::info!(
            endpoint = %endpoint,
            status = status.as_u16(),
            bytes = text.len(),
            "Upstream responded"
        );

        let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            OAuthError::InvalidResponse(format!(
                "{} returned a non-JSON body (status {}): {}",
                endpoint, status, e
            ))
        })?;

        if !status.is_success() {
            tracing::debug!(endpoint = %endpoint, body = %body, "Relaying upstream error");
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// An error reported by the provider, in either of its conventions.
///
/// The OAuth endpoint answers `{error, error_description}`; the REST API
/// answers `[{errorCode, message}]`. Both collapse into this view for
/// display; the relayed body itself is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderError {
    pub code: String,
    pub description: Option<String>,
}

impl ProviderError {
    /// Read one error object.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let code = obj
            .get("error")
            .or_else(|| obj.get("errorCode"))
            .and_then(|v| v.as_str())?;
        let description = obj
            .get("error_description")
            .or_else(|| obj.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Some(Self {
            code: code.to_string(),
            description,
        })
    }

    /// Read every error in a body that is either one object or an array.
    pub fn list_from_body(body: &serde_json::Value) -> Vec<Self> {
        match body {
            serde_json::Value::Array(items) => items.iter().filter_map(Self::from_value).collect(),
            other => Self::from_value(other).into_iter().collect(),
        }
    }

    /// Fallback for a failure body that matches neither convention.
    pub(crate) fn unrecognized(status: u16) -> Self {
        Self {
            code: "unknown_error".to_string(),
            description: Some(format!("HTTP {} with an unrecognized body", status)),
        }
    }

    /// Best human-readable message: description, else code.
    pub fn message(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.code)
    }
}

/// Join a base URL and an absolute path, dropping one trailing `/` from the base.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim();
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{}{}", base, path)
}
