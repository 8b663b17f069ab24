//! # Repository Cache Module
//!
//! ## Purpose
//! Process-wide, time-bounded cache of repository listings. Entries past
//! their TTL are retained rather than evicted so they remain servable as a
//! fallback when a refresh fails.
//!
//! ## Key Features
//! - Whole-entry installs: `(fetched_at, repos)` can never be observed torn
//! - No eviction; low-cardinality by design (a handful of account keys)
//! - No lock held across network I/O (callers fetch outside the lock)

use crate::github::Repository;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// A cached repository listing for one account key
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Time the entry was populated
    pub fetched_at: DateTime<Utc>,
    /// Repositories, sorted by `updated_at` descending at install time
    pub repos: Vec<Repository>,
}

impl CacheEntry {
    /// Whether the entry is within its TTL at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(age) => age < ttl,
            // fetched_at in the future (clock adjustment): treat as fresh
            Err(_) => true,
        }
    }
}

/// Shared cache map, keyed by account (case-sensitive)
pub struct RepoCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl RepoCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the payload for `key` if a fresh entry exists
    pub async fn get_fresh(
        &self,
        key: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<Vec<Repository>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.repos.clone())
    }

    /// Return the payload for `key` regardless of freshness
    pub async fn get_any(&self, key: &str) -> Option<Vec<Repository>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.repos.clone())
    }

    /// Install a new entry for `key`, overwriting any prior one
    pub async fn insert(&self, key: &str, entry: CacheEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }

    /// Timestamp of the stored entry, if any (used by tests and diagnostics)
    pub async fn fetched_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.fetched_at)
    }
}

impl Default for RepoCache {
    fn default() -> Self {
        Self::new()
    }
}
