//! Server configuration.

use std::net::{IpAddr, SocketAddr};

use sfjwt_config::SfjwtConfig;
use sfjwt_oauth::{DEFAULT_AUDIENCE, DEFAULT_EXPIRATION_SECS, SigningAlgorithm};

use crate::error::{Result, ServerError};

/// Default max body size for REST requests (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable rate limiting.
    pub rate_limiting: bool,

    /// Requests per minute, shared by all clients.
    pub api_rpm: u32,

    /// Enable request logging.
    pub request_logging: bool,

    /// CORS allowed origins (empty = no CORS, `*` = any).
    pub cors_origins: Vec<String>,

    /// Maximum REST request body size in bytes.
    pub max_body_size: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Flow defaults
    // ─────────────────────────────────────────────────────────────────────────
    /// Audience used when a signing or session exchange request leaves it blank.
    pub default_audience: String,

    /// Assertion lifetime used when a signing request omits it.
    pub default_expiration_secs: u64,

    /// Algorithms callers may request.
    pub allowed_algorithms: Vec<SigningAlgorithm>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            rate_limiting: true,
            api_rpm: 120,
            request_logging: true,
            cors_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            default_audience: DEFAULT_AUDIENCE.to_string(),
            default_expiration_secs: DEFAULT_EXPIRATION_SECS,
            allowed_algorithms: vec![SigningAlgorithm::Rs256],
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the loaded file configuration.
    pub fn from_config(config: &SfjwtConfig) -> Result<Self> {
        let server = config.server();
        let salesforce = config.salesforce();
        let signing = config.signing();

        let ip: IpAddr = server.bind.parse().map_err(|e| {
            ServerError::Config(format!("invalid bind address '{}': {}", server.bind, e))
        })?;

        Ok(Self {
            bind_address: SocketAddr::new(ip, server.port),
            rate_limiting: server.rate_limiting,
            api_rpm: server.api_rpm,
            request_logging: server.request_logging,
            cors_origins: server.cors_origins,
            max_body_size: server.max_body_size,
            default_audience: salesforce.default_audience,
            default_expiration_secs: signing.default_expiration_secs,
            allowed_algorithms: signing.algorithms(),
        })
    }

    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    pub fn with_rate_limiting(mut self, enabled: bool) -> Self {
        self.rate_limiting = enabled;
        self
    }

    pub fn with_api_rpm(mut self, rpm: u32) -> Self {
        self.api_rpm = rpm;
        self
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    pub fn with_default_audience(mut self, audience: impl Into<String>) -> Self {
        self.default_audience = audience.into();
        self
    }

    pub fn with_allowed_algorithms(mut self, algorithms: Vec<SigningAlgorithm>) -> Self {
        self.allowed_algorithms = algorithms;
        self
    }

    /// Whether a caller may sign with `algorithm`.
    pub fn allows(&self, algorithm: SigningAlgorithm) -> bool {
        self.allowed_algorithms.contains(&algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.default_audience, "https://login.salesforce.com");
        assert!(config.allows(SigningAlgorithm::Rs256));
        assert!(!config.allows(SigningAlgorithm::Rs512));
    }

    #[test]
    fn test_from_config() {
        let file = SfjwtConfig::from_toml(
            r#"
[server]
bind = "0.0.0.0"
port = 9000
rate_limiting = false

[salesforce]
default_audience = "https://test.salesforce.com"

[signing]
default_expiration_secs = 300
allowed_algorithms = ["RS256", "RS384"]
"#,
        )
        .unwrap();

        let config = ServerConfig::from_config(&file).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:9000");
        assert!(!config.rate_limiting);
        assert_eq!(config.default_audience, "https://test.salesforce.com");
        assert_eq!(config.default_expiration_secs, 300);
        assert!(config.allows(SigningAlgorithm::Rs384));
    }

    #[test]
    fn test_from_config_rejects_bad_bind() {
        let file = SfjwtConfig::from_toml("[server]\nbind = \"localhost:80\"\n").unwrap();
        let err = ServerConfig::from_config(&file).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::new()
            .with_bind_address("0.0.0.0:9100".parse().unwrap())
            .with_rate_limiting(false)
            .with_request_logging(false)
            .with_max_body_size(16)
            .with_allowed_algorithms(vec![SigningAlgorithm::Rs512]);

        assert_eq!(config.bind_address.port(), 9100);
        assert!(!config.rate_limiting);
        assert!(!config.request_logging);
        assert_eq!(config.max_body_size, 16);
        assert!(!config.allows(SigningAlgorithm::Rs256));
    }
}
