//! Error types for assertion signing and the upstream relay.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors produced locally by this crate.
///
/// Upstream (provider) errors are deliberately absent: a non-2xx answer from
/// Salesforce is relayed as an [`UpstreamResponse`](crate::UpstreamResponse),
/// never converted into an `OAuthError`.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Issuer (consumer key) was empty after trimming.
    #[error("Issuer (consumer key) is required")]
    MissingIssuer,

    /// Subject (username) was empty after trimming.
    #[error("Subject (username) is required")]
    MissingSubject,

    /// Private key was empty after trimming.
    #[error("Private key is required")]
    MissingPrivateKey,

    /// Expiration must be a positive number of seconds.
    #[error("Expiration must be greater than zero seconds")]
    InvalidExpiration,

    /// Algorithm is unknown or not enabled.
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Private key could not be parsed.
    #[error("Invalid private key format. Please ensure it's in valid PEM format ({0})")]
    KeyFormat(String),

    /// Key parsed, but its type cannot sign with the requested algorithm.
    #[error("Algorithm mismatch: {key_type} key cannot sign {algorithm}. Please verify your private key supports {algorithm}")]
    AlgorithmMismatch {
        algorithm: String,
        key_type: &'static str,
    },

    /// Signing failed after the key was accepted.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Token is not a well-formed compact JWT.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Exchange request carried no assertion.
    #[error("JWT token is required")]
    MissingAssertion,

    /// Exchange request carried no audience.
    #[error("Audience parameter is required")]
    MissingAudience,

    /// Query request carried no SOQL.
    #[error("SOQL query is required")]
    MissingQuery,

    /// Query request carried no access token.
    #[error("Access token is required")]
    MissingToken,

    /// Query request carried no instance URL.
    #[error("Instance URL is required")]
    MissingInstanceUrl,

    /// The upstream call could not be completed.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream answered with something that is not JSON.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl OAuthError {
    /// Stable machine-readable tag used as the `error` field on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::MissingIssuer => "missing_issuer",
            OAuthError::MissingSubject => "missing_subject",
            OAuthError::MissingPrivateKey => "missing_private_key",
            OAuthError::InvalidExpiration => "invalid_expiration",
            OAuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            OAuthError::KeyFormat(_) => "invalid_key_format",
            OAuthError::AlgorithmMismatch { .. } => "algorithm_mismatch",
            OAuthError::MalformedToken(_) => "malformed_token",
            OAuthError::MissingAssertion => "missing_jwt",
            OAuthError::MissingAudience => "missing_audience",
            OAuthError::MissingQuery => "missing_query",
            OAuthError::MissingToken => "missing_token",
            OAuthError::MissingInstanceUrl => "missing_instance_url",
            OAuthError::Signing(_) | OAuthError::Network(_) | OAuthError::InvalidResponse(_) => {
                "internal_error"
            }
        }
    }

    /// True when the caller supplied bad input (a "bad request" class error).
    pub fn is_validation(&self) -> bool {
        !self.is_local_failure()
    }

    /// True when this crate itself failed to complete the operation.
    pub fn is_local_failure(&self) -> bool {
        matches!(
            self,
            OAuthError::Signing(_) | OAuthError::Network(_) | OAuthError::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}
