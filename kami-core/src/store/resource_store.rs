use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::StatusCode;
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::resource::{Patchable, Resource};
use crate::api::{ApiClient, ApiError};
use crate::models::{Customer, CustomerDetails, Transaction};
use crate::session::SessionStore;
use crate::storage::{load_json, save_json, KeyValueStore};

/// Where a store is in its last fetch or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::Idle => write!(f, "idle"),
            StoreStatus::Loading => write!(f, "loading"),
            StoreStatus::Success => write!(f, "success"),
            StoreStatus::Error => write!(f, "error"),
        }
    }
}

struct StoreState<R> {
    items: Vec<R>,
    status: StoreStatus,
    last_error: Option<String>,
}

impl<R> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: StoreStatus::Idle,
            last_error: None,
        }
    }
}

/// In-memory list of one resource, mirrored from the server and persisted
/// under the resource's storage key.
///
/// Every successful mutation is followed by a full [`refresh`](Self::refresh),
/// so the local list only ever holds what the server returned.
pub struct ResourceStore<R: Resource> {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    session: Arc<SessionStore>,
    state: RwLock<StoreState<R>>,
    // Keeps the write-then-read-back of one refresh from interleaving with another.
    refresh_lock: Mutex<()>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(
        api: ApiClient,
        storage: Arc<dyn KeyValueStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            api,
            storage,
            session,
            state: RwLock::new(StoreState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    // ========== Snapshots ==========

    pub fn items(&self) -> Vec<R> {
        self.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> StoreStatus {
        self.read().status
    }

    /// Message of the last failure, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Looks a record up in the in-memory list.
    pub fn find_by_id(&self, id: &str) -> Option<R> {
        self.read().items.iter().find(|r| r.matches_id(id)).cloned()
    }

    /// Looks a record up in the persisted list without touching memory.
    pub fn find_cached(&self, id: &str) -> Option<R> {
        match load_json::<Vec<R>>(self.storage.as_ref(), R::STORAGE_KEY) {
            Ok(items) => items?.into_iter().find(|r| r.matches_id(id)),
            Err(e) => {
                tracing::warn!("Failed to read cached {}s: {}", R::NAME, e);
                None
            }
        }
    }

    // ========== Sync ==========

    /// Populates memory from the persisted list without contacting the server.
    ///
    /// Returns false when nothing was cached or the cache was unreadable.
    pub fn load_from_cache(&self) -> bool {
        match load_json::<Vec<R>>(self.storage.as_ref(), R::STORAGE_KEY) {
            Ok(Some(items)) => {
                tracing::debug!("Loaded {} cached {}s", items.len(), R::NAME);
                self.write().items = items;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to load cached {}s: {}", R::NAME, e);
                false
            }
        }
    }

    /// Fetches the full list, persists it and reloads memory from storage.
    ///
    /// On failure the status becomes [`StoreStatus::Error`] and the previous
    /// list stays in place. Concurrent calls run one after the other.
    pub async fn refresh(&self) -> bool {
        let _guard = self.refresh_lock.lock().await;
        self.begin();

        match self.sync().await {
            Ok(items) => {
                tracing::info!("Synced {} {}s", items.len(), R::NAME);
                let mut state = self.write();
                state.items = items;
                state.status = StoreStatus::Success;
                state.last_error = None;
                true
            }
            Err(e) => {
                tracing::error!("Failed to refresh {}s: {}", R::NAME, e);
                self.fail(&e);
                false
            }
        }
    }

    async fn sync(&self) -> StoreResult<Vec<R>> {
        let fetched: Vec<R> = self.api.list(R::ENDPOINT).await?;
        save_json(self.storage.as_ref(), R::STORAGE_KEY, &fetched)?;
        Ok(load_json(self.storage.as_ref(), R::STORAGE_KEY)?.unwrap_or_default())
    }

    // ========== Mutations ==========

    /// Creates a record on the server and returns it as listed after the
    /// follow-up refresh.
    ///
    /// Unlike the other mutations this propagates its errors.
    pub async fn create(&self, draft: &R::Draft) -> StoreResult<R> {
        R::validate_draft(draft).map_err(StoreError::Validation)?;
        let token = self.session.token().ok_or(StoreError::NotAuthenticated)?;

        self.begin();
        let created: R = match self.api.create(R::ENDPOINT, draft, &token).await {
            Ok(created) => created,
            Err(e) => {
                self.rejected(&e, &token);
                let e = StoreError::from(e);
                self.fail(&e);
                return Err(e);
            }
        };
        tracing::info!("Created {} {}", R::NAME, created.id());

        self.refresh().await;
        Ok(self.find_by_id(created.id()).unwrap_or(created))
    }

    /// Deletes a record. For transactions the server cancels instead.
    pub async fn remove(&self, id: &str) -> bool {
        let Some(token) = self.session.token() else {
            tracing::warn!("Cannot delete {} {}: not logged in", R::NAME, id);
            return false;
        };

        self.begin();
        match self.api.delete(R::ENDPOINT, id, &token).await {
            Ok(()) => {
                tracing::info!("Deleted {} {}", R::NAME, id);
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete {} {}: {}", R::NAME, id, e);
                self.rejected(&e, &token);
                self.fail(&StoreError::from(e));
                false
            }
        }
    }

    // ========== Detail ==========

    /// Fetches a single record from the server. The cache is not touched.
    pub async fn fetch_one(&self, id: &str) -> StoreResult<R> {
        self.api
            .get(R::ENDPOINT, id)
            .await
            .map_err(|e| not_found(e, R::NAME, id))
    }

    // ========== Helpers ==========

    fn read(&self) -> RwLockReadGuard<'_, StoreState<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState<R>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        self.write().status = StoreStatus::Loading;
    }

    fn fail(&self, error: &StoreError) {
        let mut state = self.write();
        state.status = StoreStatus::Error;
        state.last_error = Some(error.to_string());
    }

    fn rejected(&self, error: &ApiError, token: &str) {
        if error.is_unauthorized() {
            self.session.expire(token);
        }
    }
}

impl<R: Patchable> ResourceStore<R> {
    /// Sends a partial update and refreshes on success.
    ///
    /// Returns false without any network call when logged out or when the
    /// patch is invalid.
    pub async fn update(&self, id: &str, patch: &R::Patch) -> bool {
        let Some(token) = self.session.token() else {
            tracing::warn!("Cannot update {} {}: not logged in", R::NAME, id);
            return false;
        };
        if let Err(message) = R::validate_patch(patch) {
            tracing::warn!("Invalid update for {} {}: {}", R::NAME, id, message);
            return false;
        }

        self.begin();
        match self.api.update(R::ENDPOINT, id, patch, &token).await {
            Ok(()) => {
                tracing::info!("Updated {} {}", R::NAME, id);
                self.refresh().await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to update {} {}: {}", R::NAME, id, e);
                self.rejected(&e, &token);
                self.fail(&StoreError::from(e));
                false
            }
        }
    }
}

impl ResourceStore<Customer> {
    /// Fetches a customer together with their transactions.
    pub async fn fetch_details(&self, id: &str) -> StoreResult<CustomerDetails> {
        self.api
            .get(Customer::ENDPOINT, id)
            .await
            .map_err(|e| not_found(e, Customer::NAME, id))
    }
}

impl ResourceStore<Transaction> {
    /// Transactions that have not been cancelled.
    pub fn active(&self) -> Vec<Transaction> {
        self.read()
            .items
            .iter()
            .filter(|t| t.is_active())
            .cloned()
            .collect()
    }

    pub fn cancelled(&self) -> Vec<Transaction> {
        self.read()
            .items
            .iter()
            .filter(|t| !t.is_active())
            .cloned()
            .collect()
    }
}

fn not_found(error: ApiError, name: &str, id: &str) -> StoreError {
    if error.status() == Some(StatusCode::NOT_FOUND) {
        StoreError::NotFound(format!("{} '{}'", name, id))
    } else {
        error.into()
    }
}
