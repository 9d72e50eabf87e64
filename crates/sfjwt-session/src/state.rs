//! Flow state carried by one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sfjwt_oauth::{ClaimsParams, SignedAssertion, SigningAlgorithm};

/// The signing form as last submitted, minus the private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtFormData {
    pub issuer: String,
    pub subject: String,
    pub audience: String,
    pub expiration_seconds: u64,
    pub algorithm: SigningAlgorithm,
}

impl JwtFormData {
    /// Capture everything in `params` except the key.
    pub fn from_params(params: &ClaimsParams) -> Self {
        Self {
            issuer: params.issuer.trim().to_string(),
            subject: params.subject.trim().to_string(),
            audience: params.effective_audience().to_string(),
            expiration_seconds: params.expiration_seconds,
            algorithm: params.algorithm,
        }
    }
}

/// State of one JWT Bearer walkthrough.
///
/// Fields are independent: signing a new assertion keeps an access token
/// obtained earlier until it is replaced or [`clear`](Self::clear)ed.
#[derive(Clone)]
pub struct SessionState {
    jwt_form: Option<JwtFormData>,
    jwt_token: Option<String>,
    access_token: Option<String>,
    instance_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            jwt_form: None,
            jwt_token: None,
            access_token: None,
            instance_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a freshly signed assertion and the form that produced it.
    pub fn set_jwt(&mut self, form: JwtFormData, assertion: &SignedAssertion) {
        self.jwt_form = Some(form);
        self.jwt_token = Some(assertion.token.clone());
        self.touch();
    }

    /// Record the result of a successful token exchange.
    pub fn set_access(&mut self, access_token: impl Into<String>, instance_url: impl Into<String>) {
        self.access_token = Some(access_token.into());
        self.instance_url = Some(instance_url.into());
        self.touch();
    }

    /// Forget everything the session has accumulated.
    pub fn clear(&mut self) {
        self.jwt_form = None;
        self.jwt_token = None;
        self.access_token = None;
        self.instance_url = None;
        self.touch();
    }

    pub fn jwt_form(&self) -> Option<&JwtFormData> {
        self.jwt_form.as_ref()
    }

    pub fn jwt_token(&self) -> Option<&str> {
        self.jwt_token.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn instance_url(&self) -> Option<&str> {
        self.instance_url.as_deref()
    }

    /// True once both an access token and an instance URL are held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.instance_url.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("jwt_form", &self.jwt_form)
            .field("has_jwt", &self.jwt_token.is_some())
            .field("has_access_token", &self.access_token.is_some())
            .field("instance_url", &self.instance_url)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
