//! # Repository Cache Service
//!
//! ## Purpose
//! Serves repository listings from a time-bounded cache, refreshing from the
//! GitHub upstream on expiry and degrading to the last-known snapshot (or an
//! empty listing) when the upstream is unreachable.
//!
//! ## Contract
//! `get_repositories` never fails: upstream errors are logged and absorbed.
//! Exactly one upstream attempt is made per cache-miss invocation; concurrent
//! misses for the same key may each fetch (no single-flight), with the last
//! writer winning.

use crate::cache::{CacheEntry, RepoCache};
use crate::config::GithubConfig;
use crate::errors::Result;
use crate::github::{GithubClient, Repository};
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Listing returned to callers; always well-formed even on upstream failure
#[derive(Debug, Serialize)]
pub struct RepoListing {
    pub user: String,
    pub repos: Vec<Repository>,
}

/// Cached repository listing service
pub struct RepoService {
    client: GithubClient,
    cache: RepoCache,
    ttl: Duration,
}

impl RepoService {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let ttl = Duration::from_secs(config.cache_ttl_seconds);
        let client = GithubClient::new(config)?;

        Ok(Self {
            client,
            cache: RepoCache::new(),
            ttl,
        })
    }

    /// Look up the listing for `user`: fresh cache hit, else one upstream
    /// fetch, else stale/empty fallback.
    pub async fn get_repositories(&self, user: &str) -> RepoListing {
        let now = Utc::now();

        // Fast path: fresh entry, no network call
        if let Some(repos) = self.cache.get_fresh(user, now, self.ttl).await {
            return RepoListing {
                user: user.to_string(),
                repos,
            };
        }

        // Miss or stale: exactly one upstream attempt
        match self.client.fetch_user_repos(user).await {
            Ok(repos) => {
                self.cache
                    .insert(
                        user,
                        CacheEntry {
                            fetched_at: now,
                            repos: repos.clone(),
                        },
                    )
                    .await;

                RepoListing {
                    user: user.to_string(),
                    repos,
                }
            }
            Err(e) => {
                warn!(
                    category = e.category(),
                    user, "Repository fetch failed, serving fallback: {}", e
                );

                // Stale entry if present; fetched_at stays untouched so the
                // next lookup retries immediately
                let repos = self.cache.get_any(user).await.unwrap_or_default();
                RepoListing {
                    user: user.to_string(),
                    repos,
                }
            }
        }
    }

    /// Test/diagnostic access to the underlying cache
    #[cfg(test)]
    pub(crate) fn cache(&self) -> &RepoCache {
        &self.cache
    }
}
