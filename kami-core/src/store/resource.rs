use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::Endpoint;
use crate::models::{
    Customer, CustomerPatch, NewCustomer, NewService, NewTransaction, Service, ServicePatch,
    Transaction,
};
use crate::storage::StorageKey;

/// A record type mirrored by a [`ResourceStore`](super::ResourceStore).
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection endpoint on the server.
    const ENDPOINT: Endpoint;
    /// Key of the persisted list.
    const STORAGE_KEY: StorageKey;
    /// Singular name used in logs and messages.
    const NAME: &'static str;

    /// Fields submitted on create.
    type Draft: Serialize + Send + Sync;

    fn id(&self) -> &str;

    fn matches_id(&self, id: &str) -> bool {
        self.id() == id
    }

    fn validate_draft(draft: &Self::Draft) -> Result<(), String>;
}

/// A resource that accepts partial updates.
pub trait Patchable: Resource {
    type Patch: Serialize + Send + Sync;

    fn validate_patch(patch: &Self::Patch) -> Result<(), String>;
}

impl Resource for Service {
    const ENDPOINT: Endpoint = Endpoint::Services;
    const STORAGE_KEY: StorageKey = StorageKey::Services;
    const NAME: &'static str = "service";

    type Draft = NewService;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_draft(draft: &NewService) -> Result<(), String> {
        draft.validate()
    }
}

impl Patchable for Service {
    type Patch = ServicePatch;

    fn validate_patch(patch: &ServicePatch) -> Result<(), String> {
        if patch.is_empty() {
            return Err("Nothing to update".to_string());
        }
        patch.validate()
    }
}

impl Resource for Customer {
    const ENDPOINT: Endpoint = Endpoint::Customers;
    const STORAGE_KEY: StorageKey = StorageKey::Customers;
    const NAME: &'static str = "customer";

    type Draft = NewCustomer;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_draft(draft: &NewCustomer) -> Result<(), String> {
        draft.validate()
    }
}

impl Patchable for Customer {
    type Patch = CustomerPatch;

    fn validate_patch(patch: &CustomerPatch) -> Result<(), String> {
        if patch.is_empty() {
            return Err("Nothing to update".to_string());
        }
        patch.validate()
    }
}

impl Resource for Transaction {
    const ENDPOINT: Endpoint = Endpoint::Transactions;
    const STORAGE_KEY: StorageKey = StorageKey::Transactions;
    const NAME: &'static str = "transaction";

    type Draft = NewTransaction;

    fn id(&self) -> &str {
        &self.id
    }

    /// Transactions are also looked up by their display code.
    fn matches_id(&self, id: &str) -> bool {
        self.matches(id)
    }

    fn validate_draft(draft: &NewTransaction) -> Result<(), String> {
        draft.validate()
    }
}
