//! Idle-time tracking for session expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Last-access bookkeeping for each live session.
#[derive(Debug)]
pub struct TtlTracker {
    last_seen: HashMap<Uuid, Instant>,
    ttl: Option<Duration>,
}

impl TtlTracker {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            last_seen: HashMap::new(),
            ttl,
        }
    }

    /// Mark a session as used now.
    pub fn touch(&mut self, id: Uuid) {
        self.last_seen.insert(id, Instant::now());
    }

    /// Untracked ids count as expired once a TTL is set.
    pub fn is_expired(&self, id: &Uuid) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        match self.last_seen.get(id) {
            Some(seen) => seen.elapsed() > ttl,
            None => true,
        }
    }

    pub fn remove(&mut self, id: &Uuid) {
        self.last_seen.remove(id);
    }

    /// Forget every expired id and return them.
    pub fn drain_expired(&mut self) -> Vec<Uuid> {
        let Some(ttl) = self.ttl else {
            return Vec::new();
        };
        let now = Instant::now();
        let expired: Vec<Uuid> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.duration_since(**seen) > ttl)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.last_seen.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
