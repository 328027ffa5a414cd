//! Resource stores.
//!
//! One generic [`ResourceStore`] is instantiated per record type. Each store
//! owns its in-memory list and the persisted blob under its storage key, and
//! reads the session token from the shared [`SessionStore`] right before every
//! gated call.
//!
//! # State machine
//!
//! ```text
//! idle -> loading -> success
//!                 -> error
//! ```
//!
//! Every fetch or mutation re-enters `loading`.

mod error;
mod resource;
mod resource_store;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::models::{Customer, Service, Transaction};
use crate::session::SessionStore;
use crate::storage::KeyValueStore;

pub use error::{StoreError, StoreResult};
pub use resource::{Patchable, Resource};
pub use resource_store::{ResourceStore, StoreStatus};

pub type ServiceStore = ResourceStore<Service>;
pub type CustomerStore = ResourceStore<Customer>;
pub type TransactionStore = ResourceStore<Transaction>;

/// The session and the three resource stores, built once and handed to
/// whatever consumes them.
#[derive(Clone)]
pub struct Stores {
    pub session: Arc<SessionStore>,
    pub services: Arc<ServiceStore>,
    pub customers: Arc<CustomerStore>,
    pub transactions: Arc<TransactionStore>,
}

impl Stores {
    /// Wires every store to the same client and storage.
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(SessionStore::new(api.clone(), storage.clone()));
        Self {
            services: Arc::new(ResourceStore::new(
                api.clone(),
                storage.clone(),
                session.clone(),
            )),
            customers: Arc::new(ResourceStore::new(
                api.clone(),
                storage.clone(),
                session.clone(),
            )),
            transactions: Arc::new(ResourceStore::new(api, storage, session.clone())),
            session,
        }
    }

    /// Restores the session and fills every store from the local cache.
    pub fn load_from_cache(&self) {
        self.session.restore();
        self.services.load_from_cache();
        self.customers.load_from_cache();
        self.transactions.load_from_cache();
    }

    /// Refreshes all three stores concurrently. True if every refresh succeeded.
    pub async fn refresh_all(&self) -> bool {
        let (services, customers, transactions) = tokio::join!(
            self.services.refresh(),
            self.customers.refresh(),
            self.transactions.refresh()
        );
        services && customers && transactions
    }
}
