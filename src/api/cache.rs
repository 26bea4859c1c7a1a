//! On-disk cache of the last successful user list.
//!
//! Stored as JSON in `<cache dir>/user-dashboard/users.json`. An entry older
//! than the configured max age is treated as missing, which makes the store
//! fetch again (the "revalidate hourly" handoff). A stale entry is still
//! served when that fetch fails.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::UserSource;
use crate::config::APP_NAME;
use crate::error::{CacheError, FetchError};
use crate::model::User;

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Unix seconds.
    fetched_at: u64,
    users: Vec<User>,
}

#[derive(Clone, Debug)]
pub struct UserCache {
    path: Option<PathBuf>,
}

impl UserCache {
    /// Cache under the platform cache directory.
    pub fn new() -> Self {
        let path = dirs::cache_dir().map(|d| d.join(APP_NAME).join("users.json"));
        Self { path }
    }

    pub fn new_with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(dir.into().join("users.json")),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load_fresh(&self, max_age: Duration) -> Option<Vec<User>> {
        self.load_fresh_at(max_age, SystemTime::now())
    }

    /// Return the cached list if it is younger than `max_age` at `now`.
    pub fn load_fresh_at(&self, max_age: Duration, now: SystemTime) -> Option<Vec<User>> {
        let entry = self.read_entry()?;
        let age = unix_secs(now).saturating_sub(entry.fetched_at);
        if age >= max_age.as_secs() {
            debug!(age, "user cache is stale");
            return None;
        }
        Some(entry.users)
    }

    /// Return the cached list whatever its age.
    pub fn load_any(&self) -> Option<Vec<User>> {
        self.read_entry().map(|e| e.users)
    }

    fn read_entry(&self) -> Option<CacheEntry> {
        let path = self.path.as_ref()?;
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable user cache");
                None
            }
        }
    }

    pub fn save(&self, users: &[User]) -> Result<(), CacheError> {
        self.save_at(users, SystemTime::now())
    }

    pub fn save_at(&self, users: &[User], now: SystemTime) -> Result<(), CacheError> {
        let path = self.path.as_ref().ok_or(CacheError::NoDirectory)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let entry = CacheEntry {
            fetched_at: unix_secs(now),
            users: users.to_vec(),
        };
        std::fs::write(path, serde_json::to_string(&entry)?)?;
        Ok(())
    }
}

impl Default for UserCache {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Writes every successful fetch of `inner` through to the cache, and falls
/// back to the last cached list (of any age) when `inner` fails.
///
/// File access runs on the blocking pool.
pub struct CachingSource<S> {
    inner: S,
    cache: UserCache,
}

impl<S> CachingSource<S> {
    pub fn new(inner: S, cache: UserCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<S: UserSource> UserSource for CachingSource<S> {
    async fn fetch_users(&self, cancel: CancellationToken) -> Result<Vec<User>, FetchError> {
        match self.inner.fetch_users(cancel).await {
            Ok(users) => {
                let cache = self.cache.clone();
                let copy = users.clone();
                match tokio::task::spawn_blocking(move || cache.save(&copy)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "failed to write user cache"),
                    Err(e) => warn!(error = %e, "user cache write task failed"),
                }
                Ok(users)
            }
            Err(e) if e.is_abort() => Err(e),
            Err(e) => {
                let cache = self.cache.clone();
                match tokio::task::spawn_blocking(move || cache.load_any()).await {
                    Ok(Some(users)) => {
                        warn!(error = %e, count = users.len(), "fetch failed, serving cached users");
                        Ok(users)
                    }
                    _ => Err(e),
                }
            }
        }
    }
}
