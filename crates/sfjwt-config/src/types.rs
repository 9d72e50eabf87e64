//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]       # HTTP listener and middleware
//! [salesforce]   # upstream defaults
//! [signing]      # assertion defaults and algorithm allow-list
//! [session]      # per-session store bounds
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sfjwt_oauth::SigningAlgorithm;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// Every section is optional so a partial file can be layered over another.
/// Use the section accessors to read a value with defaults filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SfjwtConfig {
    pub server: Option<ServerConfig>,
    pub salesforce: Option<SalesforceConfig>,
    pub signing: Option<SigningConfig>,
    pub session: Option<SessionConfig>,
}

impl SfjwtConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Layer `other` on top of this config. Sections present in `other` win.
    pub fn merge(&mut self, other: SfjwtConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.salesforce.is_some() {
            self.salesforce = other.salesforce;
        }
        if other.signing.is_some() {
            self.signing = other.signing;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn salesforce(&self) -> SalesforceConfig {
        self.salesforce.clone().unwrap_or_default()
    }

    pub fn signing(&self) -> SigningConfig {
        self.signing.clone().unwrap_or_default()
    }

    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// The same config with every section materialized.
    pub fn effective(&self) -> Self {
        Self {
            server: Some(self.server()),
            salesforce: Some(self.salesforce()),
            signing: Some(self.signing()),
            session: Some(self.session()),
        }
    }

    /// Values that parse but will not behave as the user likely intended.
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let server = self.server();
        if server.rate_limiting && server.api_rpm == 0 {
            warnings.push(
                "[server] api_rpm is 0 with rate_limiting enabled; rate limiting will be skipped"
                    .to_string(),
            );
        }
        if self.signing().allowed_algorithms.is_empty() {
            warnings.push(
                "[signing] allowed_algorithms is empty; falling back to RS256".to_string(),
            );
        }
        if self.signing().default_expiration_secs == 0 {
            warnings.push(
                "[signing] default_expiration_secs is 0; signing requests must pass an expiration"
                    .to_string(),
            );
        }
        if self.session().max_sessions == 0 {
            warnings.push("[session] max_sessions is 0; treating it as 1".to_string());
        }

        warnings
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_API_RPM: u32 = 120;
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Enable global rate limiting of `/api` routes.
    pub rate_limiting: bool,
    /// Requests per minute allowed across all clients.
    pub api_rpm: u32,
    /// Log method, path, status and duration of each request.
    pub request_logging: bool,
    /// Allowed CORS origins. Empty disables CORS headers.
    pub cors_origins: Vec<String>,
    /// Maximum request body in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            rate_limiting: true,
            api_rpm: DEFAULT_API_RPM,
            request_logging: true,
            cors_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Salesforce Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[salesforce]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesforceConfig {
    /// Login host used when a request leaves the audience blank.
    pub default_audience: String,
    /// REST API version for SOQL queries, e.g. `v60.0`.
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for SalesforceConfig {
    fn default() -> Self {
        Self {
            default_audience: sfjwt_oauth::DEFAULT_AUDIENCE.to_string(),
            api_version: sfjwt_oauth::relay::DEFAULT_API_VERSION.to_string(),
            timeout_secs: sfjwt_oauth::relay::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl SalesforceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Signing Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[signing]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    pub default_expiration_secs: u64,
    /// Algorithms callers may request, e.g. `["RS256", "RS512"]`.
    pub allowed_algorithms: Vec<SigningAlgorithm>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            default_expiration_secs: sfjwt_oauth::DEFAULT_EXPIRATION_SECS,
            allowed_algorithms: vec![SigningAlgorithm::Rs256],
        }
    }
}

impl SigningConfig {
    /// The allow-list, never empty.
    pub fn algorithms(&self) -> Vec<SigningAlgorithm> {
        if self.allowed_algorithms.is_empty() {
            vec![SigningAlgorithm::Rs256]
        } else {
            self.allowed_algorithms.clone()
        }
    }

    pub fn allows(&self, algorithm: SigningAlgorithm) -> bool {
        self.algorithms().contains(&algorithm)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_sessions: usize,
    /// Idle lifetime in seconds. 0 disables expiry.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            ttl_secs: 3600,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SfjwtConfig::from_toml("").unwrap();
        assert!(config.server.is_none());

        let server = config.server();
        assert_eq!(server.bind, "127.0.0.1");
        assert_eq!(server.port, 8080);
        assert!(server.rate_limiting);
        assert_eq!(server.api_rpm, 120);
        assert_eq!(server.max_body_size, 1024 * 1024);

        let salesforce = config.salesforce();
        assert_eq!(salesforce.default_audience, "https://login.salesforce.com");
        assert_eq!(salesforce.api_version, "v60.0");
        assert_eq!(salesforce.timeout(), Duration::from_secs(30));

        assert_eq!(config.signing().algorithms(), vec![SigningAlgorithm::Rs256]);
        assert_eq!(config.session().ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_parse_full_config() {
        let config = SfjwtConfig::from_toml(
            r#"
[server]
port = 9090
cors_origins = ["http://localhost:3000"]

[salesforce]
default_audience = "https://test.salesforce.com"
api_version = "v59.0"

[signing]
allowed_algorithms = ["RS256", "RS512"]

[session]
ttl_secs = 0
"#,
        )
        .unwrap();

        let server = config.server();
        assert_eq!(server.port, 9090);
        assert_eq!(server.bind, "127.0.0.1");
        assert_eq!(server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(
            config.salesforce().default_audience,
            "https://test.salesforce.com"
        );
        assert!(config.signing().allows(SigningAlgorithm::Rs512));
        assert!(!config.signing().allows(SigningAlgorithm::Rs384));
        assert_eq!(config.session().ttl(), None);
    }

    #[test]
    fn test_unknown_algorithm_is_parse_error() {
        let err = SfjwtConfig::from_toml("[signing]\nallowed_algorithms = [\"HS256\"]\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_merge_replaces_whole_sections() {
        let mut base = SfjwtConfig::from_toml("[server]\nport = 9000\napi_rpm = 10\n").unwrap();
        let overlay = SfjwtConfig::from_toml("[server]\nport = 9100\n").unwrap();
        base.merge(overlay);

        let server = base.server();
        assert_eq!(server.port, 9100);
        assert_eq!(server.api_rpm, 120);
    }

    #[test]
    fn test_merge_keeps_absent_sections() {
        let mut base =
            SfjwtConfig::from_toml("[salesforce]\napi_version = \"v58.0\"\n").unwrap();
        base.merge(SfjwtConfig::from_toml("[server]\nport = 1\n").unwrap());

        assert_eq!(base.salesforce().api_version, "v58.0");
        assert_eq!(base.server().port, 1);
    }

    #[test]
    fn test_effective_round_trips_through_toml() {
        let effective = SfjwtConfig::new().effective();
        let rendered = effective.to_toml().unwrap();
        assert!(rendered.contains("[signing]"));
        assert!(rendered.contains("\"RS256\""));
        assert_eq!(SfjwtConfig::from_toml(&rendered).unwrap(), effective);
    }

    #[test]
    fn test_lint() {
        assert!(SfjwtConfig::new().lint().is_empty());

        let config = SfjwtConfig::from_toml(
            "[server]\napi_rpm = 0\n[signing]\nallowed_algorithms = []\n",
        )
        .unwrap();
        let warnings = config.lint();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("api_rpm"));
        assert_eq!(config.signing().algorithms(), vec![SigningAlgorithm::Rs256]);
    }
}
