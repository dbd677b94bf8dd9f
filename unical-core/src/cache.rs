//! Time-bounded memoization of serialized calendars.
//!
//! Entries expire a fixed TTL after they were stored. Independently, a
//! periodic sweep drops entries that have expired or have not been read for
//! a longer idle window, so the map does not grow with keys nobody asks for.
//!
//! Only successful results are ever stored. There is no request coalescing:
//! two concurrent misses for the same key both compute, and the later `put`
//! wins. Both results come from the same inputs so either is fine to serve.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::clock::Clock;
use crate::config::CacheSettings;

struct CacheEntry {
    value: Arc<[u8]>,
    expires_at: DateTime<Utc>,
    last_access: DateTime<Utc>,
}

/// Thread-safe cache from request fingerprint to serialized calendar bytes.
pub struct ArtifactCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: TimeDelta,
    idle: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl ArtifactCache {
    pub fn new(ttl: Duration, idle: Duration, clock: Arc<dyn Clock>) -> Self {
        ArtifactCache {
            entries: Mutex::new(HashMap::new()),
            ttl: to_delta(ttl),
            idle: to_delta(idle),
            clock,
        }
    }

    pub fn from_settings(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self::new(settings.ttl, settings.idle, clock)
    }

    /// Look up a fresh value. Expired entries are dropped on the way.
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let entry = entries.get_mut(key)?;
        if now >= entry.expires_at {
            entries.remove(key);
            return None;
        }

        entry.last_access = now;
        Some(Arc::clone(&entry.value))
    }

    /// Store `value` under `key`, replacing any previous entry and restarting its TTL.
    pub fn put(&self, key: impl Into<String>, value: Arc<[u8]>) {
        let now = self.clock.now();
        let entry = CacheEntry {
            value,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            last_access: now,
        };
        self.lock().insert(key.into(), entry);
    }

    /// Remove expired and idle entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();

        entries.retain(|_, entry| now < entry.expires_at && now - entry.last_access < self.idle);

        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run [`sweep`](Self::sweep) every `every` on the tokio runtime.
    ///
    /// The task holds a weak reference and exits once the cache is dropped.
    pub fn spawn_sweeper(cache: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(cache);
        let every = every.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    break;
                };
                let removed = cache.sweep();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "Swept calendar cache");
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}
