//! JWT Bearer grant exchange.
//!
//! Posts the signed assertion to `<audience>/services/oauth2/token` and relays
//! whatever the provider answers.

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};
use crate::relay::{ProviderError, Relay, UpstreamResponse, join_url};

/// OAuth 2.0 grant type for JWT Bearer assertions (RFC 7523).
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Exchange request as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenExchangeRequest {
    /// Signed compact JWT.
    #[serde(default)]
    pub jwt: Option<String>,
    /// Login host, e.g. `https://login.salesforce.com`.
    #[serde(default)]
    pub audience: Option<String>,
}

impl TokenExchangeRequest {
    pub fn new(jwt: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwt: Some(jwt.into()),
            audience: Some(audience.into()),
        }
    }

    /// Return `(assertion, audience)` or the first missing field.
    pub fn validate(&self) -> Result<(&str, &str)> {
        let jwt = non_blank(&self.jwt).ok_or(OAuthError::MissingAssertion)?;
        let audience = non_blank(&self.audience).ok_or(OAuthError::MissingAudience)?;
        Ok((jwt, audience))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Relay {
    /// Exchange a JWT assertion for an access token.
    ///
    /// Validation failures return before any network call. Any HTTP answer
    /// from the provider, success or not, is returned as `Ok`.
    pub async fn exchange_token(&self, request: &TokenExchangeRequest) -> Result<UpstreamResponse> {
        let (assertion, audience) = request.validate()?;
        let endpoint = join_url(audience, &self.config().token_path);

        tracing::info!(endpoint = %endpoint, "Exchanging JWT assertion for access token");

        let req = self
            .client()
            .post(&endpoint)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion),
            ]);

        self.forward(&endpoint, req).await
    }
}

/// Successful token response fields this system reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub instance_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Every other field the provider returned (e.g. `scope`).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Typed view over a relayed token exchange response.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenExchangeResult {
    Success(TokenGrant),
    Failure(ProviderError),
}

impl TokenExchangeResult {
    /// Interpret a relayed response.
    ///
    /// Success requires a 2xx status and non-empty `access_token` and
    /// `instance_url`.
    pub fn from_response(response: &UpstreamResponse) -> Self {
        if response.is_success()
            && let Ok(grant) = serde_json::from_value::<TokenGrant>(response.body.clone())
            && !grant.access_token.is_empty()
            && !grant.instance_url.is_empty()
        {
            return TokenExchangeResult::Success(grant);
        }

        TokenExchangeResult::Failure(
            ProviderError::from_value(&response.body)
                .unwrap_or_else(|| ProviderError::unrecognized(response.status)),
        )
    }

    pub fn grant(&self) -> Option<&TokenGrant> {
        match self {
            TokenExchangeResult::Success(grant) => Some(grant),
            TokenExchangeResult::Failure(_) => None,
        }
    }
}
