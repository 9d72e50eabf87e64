//! Per-session flow state for the JWT Bearer workflow.
//!
//! Each session carries the last signing form, the signed assertion, and the
//! access token obtained by exchanging it. Sessions live only in memory:
//! the store is bounded by LRU eviction and idle sessions expire after a TTL.
//!
//! # Example
//!
//! ```rust,ignore
//! use sfjwt_session::{CacheConfig, SessionCache, SessionState};
//!
//! let cache: SessionCache<SessionState> = SessionCache::new(
//!     CacheConfig::default()
//!         .with_max_sessions(1000)
//!         .with_ttl(Duration::from_secs(3600)),
//! );
//! let id = cache.create(SessionState::new()).await;
//! ```

mod cache;
mod config;
mod error;
mod state;
mod ttl;

pub use cache::{CacheStats, SessionCache};
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use state::{JwtFormData, SessionState};
pub use ttl::TtlTracker;
