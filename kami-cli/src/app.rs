use std::sync::Arc;

use kami_core::{ApiClient, ApiError, FileStore, Resource, ResourceStore, Stores};

use crate::config::Config;

/// Stores and flags shared by every command.
pub struct App {
    pub stores: Stores,
    pub offline: bool,
}

impl App {
    /// Builds the stores over the configured data directory and restores any
    /// saved session.
    pub fn new(config: &Config, offline: bool) -> Result<Self, ApiError> {
        tracing::debug!(
            "Using {} with data dir {}",
            config.api_url.value,
            config.data_dir.value.display()
        );
        let api = ApiClient::with_timeout(config.api_url.value.clone(), config.timeout())?;
        let storage = Arc::new(FileStore::new(config.data_dir.value.clone()));
        let stores = Stores::new(api, storage);
        stores.session.restore();
        Ok(Self { stores, offline })
    }

    /// Fills a store from the cache, then from the server unless offline.
    ///
    /// A failed refresh only warns; the cached list is still shown.
    pub async fn load<R: Resource>(&self, store: &ResourceStore<R>) {
        store.load_from_cache();
        if self.offline {
            return;
        }
        if !store.refresh().await {
            eprintln!(
                "Warning: could not reach server, showing cached data ({})",
                store.last_error().unwrap_or_default()
            );
        }
    }

    /// Errors unless a mutation can be sent right now.
    pub fn require_login(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.offline {
            return Err("Cannot modify data in offline mode".into());
        }
        if !self.stores.session.is_authenticated() {
            return Err("Not logged in. Run 'kami auth login' first.".into());
        }
        Ok(())
    }
}

/// Error for a mutation that reported failure.
pub fn failed<R: Resource>(
    action: &str,
    store: &ResourceStore<R>,
) -> Box<dyn std::error::Error> {
    match store.last_error() {
        Some(reason) => format!("Failed to {} {}: {}", action, R::NAME, reason).into(),
        None => format!("Failed to {} {}", action, R::NAME).into(),
    }
}
