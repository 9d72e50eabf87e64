//! Salesforce OAuth 2.0 JWT Bearer flow tooling.
//!
//! Builds and signs JWT assertions, exchanges them for access tokens at the
//! org's token endpoint, and issues SOQL queries with the resulting bearer
//! token. Upstream responses are relayed verbatim; only the fields this crate
//! needs are given typed views.
//!
//! # Components
//!
//! - [`claims`]: claim set construction, RSA signing and unverified decoding
//! - [`relay`]: shared upstream HTTP client and opaque response type
//! - [`exchange`]: JWT Bearer grant exchange against `/services/oauth2/token`
//! - [`query`]: SOQL queries against `/services/data/<version>/query/`

pub mod claims;
pub mod error;
pub mod exchange;
pub mod query;
pub mod relay;

pub use claims::{
    ClaimsParams, DEFAULT_AUDIENCE, DEFAULT_EXPIRATION_SECS, DecodedToken, JwtClaims,
    SignedAssertion, SigningAlgorithm, build_claims, decode_unverified, sign_assertion,
};
pub use error::{OAuthError, Result};
pub use exchange::{JWT_BEARER_GRANT_TYPE, TokenExchangeRequest, TokenExchangeResult, TokenGrant};
pub use query::{QueryPage, QueryRequest, QueryResult, build_query_url};
pub use relay::{ProviderError, Relay, RelayConfig, UpstreamResponse};
