//! Configuration for the session store.

use std::time::Duration;

/// Default maximum number of live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

/// Default idle lifetime of a session.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Sessions kept before the least recently used one is evicted.
    pub max_sessions: usize,

    /// Idle time after which a session expires. `None` disables expiry.
    pub ttl: Option<Duration>,

    /// Interval of the background sweep started by
    /// [`SessionCache::spawn_cleanup_task`](crate::SessionCache::spawn_cleanup_task).
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            ttl: Some(DEFAULT_TTL),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sessions never expire; only LRU eviction removes them.
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}
