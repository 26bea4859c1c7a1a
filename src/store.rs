//! User state store: the editable user list, search/city filter inputs and
//! load status, plus the derived filtered rows and city list.
//!
//! The store is driven from a single-threaded event loop. The only
//! asynchronous work is the initial fetch, which runs on a tokio runtime and
//! hands its result back over a oneshot channel picked up by [`UserStore::tick`].

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::UserSource;
use crate::debounce::Debouncer;
use crate::error::FetchError;
use crate::model::{User, UserFormData};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

type LoadResult = Result<Vec<User>, FetchError>;

struct PendingLoad {
    cancel: CancellationToken,
    rx: oneshot::Receiver<LoadResult>,
}

pub struct UserStore {
    users: Vec<User>,
    cities: Vec<String>,
    search_query: String,
    search: Debouncer<String>,
    city_filter: String,
    loading: bool,
    error: Option<String>,
    load: Option<PendingLoad>,
}

impl UserStore {
    /// A store seeded with `users` and no load in flight.
    pub fn new(users: Vec<User>, debounce: Duration) -> Self {
        let mut store = Self {
            users: Vec::new(),
            cities: Vec::new(),
            search_query: String::new(),
            search: Debouncer::new(String::new(), debounce),
            city_filter: String::new(),
            loading: false,
            error: None,
            load: None,
        };
        store.set_users(users);
        store
    }

    /// Seed from `initial_users` when non-empty; otherwise start fetching
    /// from `source` on `handle`.
    pub fn initialize(
        initial_users: Vec<User>,
        source: Arc<dyn UserSource>,
        handle: &Handle,
        debounce: Duration,
    ) -> Self {
        let mut store = Self::new(initial_users, debounce);
        if store.users.is_empty() {
            store.start_load(source, handle);
        } else {
            info!(count = store.users.len(), "seeded users from initial data");
        }
        store
    }

    /// Retry after a failed load. Any load still in flight is cancelled first.
    pub fn reload(&mut self, source: Arc<dyn UserSource>, handle: &Handle) {
        self.start_load(source, handle);
    }

    fn start_load(&mut self, source: Arc<dyn UserSource>, handle: &Handle) {
        self.cancel_load();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (tx, rx) = oneshot::channel();
        handle.spawn(async move {
            let res = source.fetch_users(token).await;
            // Receiver is gone when the store was torn down; nothing to do.
            let _ = tx.send(res);
        });
        self.loading = true;
        self.error = None;
        self.load = Some(PendingLoad { cancel, rx });
        info!("loading users");
    }

    fn cancel_load(&mut self) {
        if let Some(load) = self.load.take() {
            debug!("cancelling in-flight user load");
            load.cancel.cancel();
        }
    }

    /// Cancel in-flight work. The store stays readable afterwards.
    pub fn shutdown(&mut self) {
        self.cancel_load();
        self.loading = false;
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Apply a finished load and commit the debounced search if due.
    /// Returns `true` when anything observable changed.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let mut changed = self.poll_load();
        if self.search.poll_at(now) {
            debug!(search = %self.search.value(), "debounced search committed");
            changed = true;
        }
        changed
    }

    /// Wait for the in-flight load, if any, and apply its result.
    pub async fn settle(&mut self) {
        if let Some(load) = self.load.as_mut() {
            let res = (&mut load.rx)
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("load task ended unexpectedly".into())));
            self.load = None;
            self.finish_load(res);
        }
    }

    fn poll_load(&mut self) -> bool {
        let Some(load) = self.load.as_mut() else {
            return false;
        };
        let res = match load.rx.try_recv() {
            Ok(res) => res,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => Err(FetchError::Network("load task ended unexpectedly".into())),
        };
        self.load = None;
        self.finish_load(res);
        true
    }

    fn finish_load(&mut self, res: LoadResult) {
        self.loading = false;
        match res {
            Ok(users) => {
                info!(count = users.len(), "users loaded");
                self.set_users(users);
            }
            Err(e) if e.is_abort() => debug!("user load aborted"),
            Err(e) => {
                warn!(error = %e, "user load failed");
                self.error = Some(e.to_string());
            }
        }
    }

    fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
        self.refresh_cities();
    }

    fn refresh_cities(&mut self) {
        let set: BTreeSet<&str> = self.users.iter().map(|u| u.city()).collect();
        self.cities = set.into_iter().map(str::to_string).collect();
        self.reconcile_city_filter();
    }

    /// The selected city must be empty or one of the current cities.
    fn reconcile_city_filter(&mut self) {
        if !self.city_filter.is_empty() && self.cities.binary_search(&self.city_filter).is_err() {
            debug!(city = %self.city_filter, "city filter no longer matches any user; resetting");
            self.city_filter.clear();
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.set_search_query_at(query, Instant::now());
    }

    pub fn set_search_query_at(&mut self, query: impl Into<String>, now: Instant) {
        self.search_query = query.into();
        self.search.set_at(self.search_query.clone(), now);
    }

    pub fn set_city_filter(&mut self, city: impl Into<String>) {
        self.city_filter = city.into();
        self.reconcile_city_filter();
    }

    /// Drop both search text and city filter, without waiting for the debounce.
    pub fn clear_filters(&mut self) {
        self.search_query.clear();
        self.search.reset(String::new());
        self.city_filter.clear();
    }

    /// Local edit of name, email and city. Unknown ids are ignored.
    pub fn update_user(&mut self, id: u64, data: &UserFormData) {
        let Some(user) = self.users.iter_mut().find(|u| u.id == id) else {
            debug!(id, "update for unknown user ignored");
            return;
        };
        user.name = data.name.clone();
        user.email = data.email.clone();
        user.address.city = data.city.clone();
        debug!(id, "user updated");
        self.refresh_cities();
    }

    /// Users matching the debounced search (case-insensitive, by name) and
    /// the city filter, in source order.
    pub fn filtered_users(&self) -> Vec<&User> {
        let needle = self.search.value().to_lowercase();
        self.users
            .iter()
            .filter(|u| needle.is_empty() || u.name.to_lowercase().contains(&needle))
            .filter(|u| self.city_filter.is_empty() || u.city() == self.city_filter)
            .collect()
    }

    /// Sorted, de-duplicated cities across all users.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn debounced_search(&self) -> &str {
        self.search.value()
    }

    /// When the pending search commits, so the event loop can wake for it.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    pub fn city_filter(&self) -> &str {
        &self.city_filter
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Drop for UserStore {
    fn drop(&mut self) {
        self.cancel_load();
    }
}
