//! SOQL query relay.
//!
//! Issues a bearer-authenticated GET to
//! `<instance_url>/services/data/<version>/query/?q=<soql>` and relays the
//! result. Only the first page is fetched; `nextRecordsUrl` is surfaced to
//! the caller but never followed.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};
use crate::relay::{ProviderError, Relay, UpstreamResponse, join_url};

/// Query request as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub instance_url: Option<String>,
}

impl QueryRequest {
    pub fn new(
        query: impl Into<String>,
        access_token: impl Into<String>,
        instance_url: impl Into<String>,
    ) -> Self {
        Self {
            query: Some(query.into()),
            access_token: Some(access_token.into()),
            instance_url: Some(instance_url.into()),
        }
    }

    /// Return `(query, access_token, instance_url)` or the first missing field.
    pub fn validate(&self) -> Result<(&str, &str, &str)> {
        let query = non_blank(&self.query).ok_or(OAuthError::MissingQuery)?;
        let token = non_blank(&self.access_token).ok_or(OAuthError::MissingToken)?;
        let instance = non_blank(&self.instance_url).ok_or(OAuthError::MissingInstanceUrl)?;
        Ok((query, token, instance))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Characters escaped in the `q` parameter. Alphanumerics and
/// `- _ . ! ~ * ' ( )` pass through, so SOQL literals and subqueries stay
/// readable in the URL.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the REST query URL for a SOQL string.
pub fn build_query_url(instance_url: &str, api_version: &str, query: &str) -> String {
    let base = join_url(instance_url, &format!("/services/data/{}/query/", api_version));
    format!(
        "{}?q={}",
        base,
        utf8_percent_encode(query.trim(), QUERY_ENCODE_SET)
    )
}

impl Relay {
    /// Run a SOQL query with a bearer token.
    pub async fn query(&self, request: &QueryRequest) -> Result<UpstreamResponse> {
        let (query, token, instance_url) = request.validate()?;
        let url = build_query_url(instance_url, &self.config().api_version, query);

        tracing::info!(endpoint = %url, "Executing SOQL query");

        let req = self
            .client()
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json");

        self.forward(&url, req).await
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    pub total_size: u64,
    pub done: bool,
    pub records: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_records_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl QueryPage {
    /// Number of records matched, falling back to the page length.
    pub fn record_count(&self) -> u64 {
        if self.total_size > 0 {
            self.total_size
        } else {
            self.records.len() as u64
        }
    }

    /// True when the provider holds more records beyond this page.
    pub fn has_more(&self) -> bool {
        !self.done
    }

    /// One-line summary for display.
    pub fn summary(&self) -> String {
        let count = self.record_count();
        let noun = if count == 1 { "record" } else { "records" };
        format!("Retrieved {} {} from Salesforce.", count, noun)
    }
}

/// Typed view over a relayed query response.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Success(QueryPage),
    Failure(Vec<ProviderError>),
}

impl QueryResult {
    pub fn from_response(response: &UpstreamResponse) -> Self {
        if response.is_success()
            && let Ok(page) = serde_json::from_value::<QueryPage>(response.body.clone())
        {
            return QueryResult::Success(page);
        }

        let mut errors = ProviderError::list_from_body(&response.body);
        if errors.is_empty() {
            errors.push(ProviderError::unrecognized(response.status));
        }
        QueryResult::Failure(errors)
    }
}
