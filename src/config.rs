//! Command-line / environment configuration.
//!
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::{DEFAULT_API_URL, UserCache};

pub const APP_NAME: &str = "user-dashboard";

#[derive(Debug, Clone, Parser)]
#[command(name = "user-dashboard", version, about = "Browse, filter and edit users from a remote API")]
pub struct Cli {
    /// Base URL of the users API (`/users` is appended).
    #[arg(long, env = "USER_DASHBOARD_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "USER_DASHBOARD_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// How long the search text must stay unchanged before filtering.
    #[arg(long, default_value_t = 300)]
    pub debounce_ms: u64,

    /// Maximum age of the cached user list before it is fetched again.
    #[arg(long, env = "USER_DASHBOARD_CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Neither read nor write the on-disk user cache.
    #[arg(long)]
    pub no_cache: bool,

    #[arg(long, env = "USER_DASHBOARD_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding theme.conf and keybinds.conf.
    #[arg(long, env = "USER_DASHBOARD_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[arg(long, env = "USER_DASHBOARD_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.config_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir().join(name)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.config_file("user-dashboard.log"))
    }

    /// `None` when caching is disabled.
    pub fn cache(&self) -> Option<UserCache> {
        if self.no_cache {
            return None;
        }
        Some(match &self.cache_dir {
            Some(dir) => UserCache::new_with_dir(dir),
            None => UserCache::new(),
        })
    }
}
