//! Application state shared across handlers.

use std::sync::Arc;

use sfjwt_config::SfjwtConfig;
use sfjwt_oauth::{Relay, RelayConfig};
use sfjwt_session::{CacheConfig, SessionCache, SessionState};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::middleware::{SharedRateLimiter, create_rate_limiter};

/// Per-session flow store.
pub type SessionStore = SessionCache<SessionState>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Upstream relay client.
    pub relay: Arc<Relay>,

    /// Per-session flow state.
    pub sessions: SessionStore,

    /// Global limiter, present when rate limiting is enabled.
    pub limiter: Option<SharedRateLimiter>,
}

impl AppState {
    pub fn new(config: ServerConfig, relay: Relay, sessions: CacheConfig) -> Self {
        let limiter = (config.rate_limiting && config.api_rpm > 0)
            .then(|| create_rate_limiter(config.api_rpm));
        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
            sessions: SessionCache::new(sessions),
            limiter,
        }
    }

    /// Build everything from the loaded file configuration.
    pub fn from_config(file: &SfjwtConfig) -> Result<Self> {
        let config = ServerConfig::from_config(file)?;
        let relay = relay_from_config(file)?;
        Ok(Self::new(config, relay, cache_config(file)))
    }

    /// Same as [`from_config`](Self::from_config) with a replacement server config.
    pub fn with_server_config(file: &SfjwtConfig, config: ServerConfig) -> Result<Self> {
        let relay = relay_from_config(file)?;
        Ok(Self::new(config, relay, cache_config(file)))
    }
}

fn relay_from_config(file: &SfjwtConfig) -> Result<Relay> {
    let salesforce = file.salesforce();
    let relay_config = RelayConfig::default()
        .with_api_version(salesforce.api_version.clone())
        .with_timeout(salesforce.timeout());
    Relay::with_config(relay_config).map_err(|e| ServerError::Config(e.to_string()))
}

fn cache_config(file: &SfjwtConfig) -> CacheConfig {
    let session = file.session();
    let config = CacheConfig::new().with_max_sessions(session.max_sessions);
    match session.ttl() {
        Some(ttl) => config.with_ttl(ttl),
        None => config.without_ttl(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_config() {
        let file = SfjwtConfig::from_toml(
            "[salesforce]\napi_version = \"v59.0\"\ntimeout_secs = 5\n[session]\nmax_sessions = 3\nttl_secs = 0\n",
        )
        .unwrap();
        let state = AppState::from_config(&file).unwrap();

        assert_eq!(state.relay.config().api_version, "v59.0");
        assert_eq!(state.relay.config().timeout, Duration::from_secs(5));
        assert_eq!(state.sessions.config().max_sessions, 3);
        assert!(state.sessions.config().ttl.is_none());
        assert!(state.limiter.is_some());
    }

    #[test]
    fn test_no_limiter_when_disabled() {
        let state = AppState::new(
            ServerConfig::new().with_rate_limiting(false),
            Relay::new().unwrap(),
            CacheConfig::default(),
        );
        assert!(state.limiter.is_none());
    }
}
