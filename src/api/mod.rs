//! Data source layer: fetches the user list from the remote API.
//!
//! The store only talks to the [`UserSource`] trait so tests (and the
//! response cache) can stand in for the network.
//!
pub mod cache;

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::model::User;

pub use cache::{CachingSource, UserCache};

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";
pub const USER_AGENT: &str = concat!("user-dashboard/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce the full user list once per call.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Single attempt, no retries. Must return [`FetchError::Aborted`] once
    /// `cancel` fires.
    async fn fetch_users(&self, cancel: CancellationToken) -> Result<Vec<User>, FetchError>;
}

/// `GET {base_url}/users` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpUserSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(format!("client setup: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn users_url(&self) -> String {
        format!("{}/users", self.base_url.trim_end_matches('/'))
    }

    async fn get_users(&self) -> Result<Vec<User>, FetchError> {
        let url = self.users_url();
        debug!(%url, "requesting users");
        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let users: Vec<User> = resp
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        info!(count = users.len(), "fetched users");
        Ok(users)
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_users(&self, cancel: CancellationToken) -> Result<Vec<User>, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Aborted),
            res = self.get_users() => res,
        }
    }
}
