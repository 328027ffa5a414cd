//! Kami Core Library
//!
//! Models, local persistence and API-backed stores for Kami clients.

pub mod api;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError, ApiResult, Endpoint, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use models::{
    Customer, CustomerDetails, CustomerPatch, Loyalty, NewCustomer, NewService, NewTransaction,
    Service, ServicePatch, SessionData, SoldService, Transaction, TransactionItem,
    TransactionStatus,
};
pub use session::{SessionError, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageKey};
pub use store::{
    CustomerStore, Patchable, Resource, ResourceStore, ServiceStore, StoreError, StoreResult,
    StoreStatus, Stores, TransactionStore,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
