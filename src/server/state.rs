//! In-memory data behind the stub server.
//!
//! A sale is priced from the current service catalogue, with 10% off for
//! `high` loyalty customers. The final price is added to the customer's
//! `totalSpent`. Cancelling only flips the status.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use kami_core::{
    Customer, CustomerDetails, CustomerPatch, Loyalty, NewCustomer, NewService, NewTransaction,
    Service, ServicePatch, SoldService, Transaction, TransactionStatus,
};
use uuid::Uuid;

use super::config::{StubConfig, UserEntry};
use super::error::StubError;

/// Share of the amount taken off for `high` loyalty customers.
const HIGH_LOYALTY_DISCOUNT: f64 = 0.10;

#[derive(Debug, Default)]
struct Data {
    users: HashMap<String, UserEntry>,
    tokens: HashSet<String>,
    services: Vec<Service>,
    customers: Vec<Customer>,
    transactions: Vec<Transaction>,
}

/// Shared, cloneable handle to the stub's data.
#[derive(Debug, Clone, Default)]
pub struct StubState {
    data: Arc<RwLock<Data>>,
    requests: Arc<AtomicUsize>,
}

impl StubState {
    /// Builds the state from seed data. Seeded records without an id get one.
    pub fn new(config: StubConfig) -> Self {
        let mut data = Data::default();
        for user in config.users {
            data.users.insert(user.phone.clone(), user);
        }
        data.services = config
            .services
            .into_iter()
            .map(|mut s| {
                if s.id.is_empty() {
                    s.id = new_id();
                }
                s
            })
            .collect();
        data.customers = config
            .customers
            .into_iter()
            .map(|mut c| {
                if c.id.is_empty() {
                    c.id = new_id();
                }
                c
            })
            .collect();

        Self {
            data: Arc::new(RwLock::new(data)),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    // ========== Bookkeeping ==========

    /// Number of requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub(crate) fn count_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Invalidates every issued token.
    pub fn revoke_tokens(&self) {
        self.write().tokens.clear();
    }

    // ========== Auth ==========

    pub fn login(&self, phone: &str, password: &str) -> Result<String, StubError> {
        let mut data = self.write();
        let token = match data.users.get(phone) {
            Some(user) if user.password == password => user.token.clone().unwrap_or_else(new_id),
            _ => return Err(StubError::Unauthorized),
        };
        data.tokens.insert(token.clone());
        Ok(token)
    }

    pub fn register(&self, email: &str, password: &str) -> Result<(), StubError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(StubError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        let mut data = self.write();
        if data.users.contains_key(email) {
            return Err(StubError::Conflict(format!("{} is already registered", email)));
        }
        data.users
            .insert(email.to_string(), UserEntry::new(email, password));
        Ok(())
    }

    pub fn authorize(&self, token: Option<&str>) -> Result<(), StubError> {
        match token {
            Some(token) if self.read().tokens.contains(token) => Ok(()),
            _ => Err(StubError::Unauthorized),
        }
    }

    // ========== Services ==========

    pub fn services(&self) -> Vec<Service> {
        self.read().services.clone()
    }

    pub fn service(&self, id: &str) -> Result<Service, StubError> {
        self.read()
            .services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| StubError::NotFound(format!("Service {}", id)))
    }

    pub fn create_service(&self, draft: NewService) -> Result<Service, StubError> {
        draft.validate().map_err(StubError::BadRequest)?;
        let service = Service {
            id: new_id(),
            name: draft.name,
            price: draft.price,
            category: draft.category,
            description: draft.description,
            image_url: draft.image_url,
        };
        self.write().services.push(service.clone());
        Ok(service)
    }

    pub fn update_service(&self, id: &str, patch: &ServicePatch) -> Result<Service, StubError> {
        patch.validate().map_err(StubError::BadRequest)?;
        let mut data = self.write();
        let service = data
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StubError::NotFound(format!("Service {}", id)))?;
        patch.apply(service);
        Ok(service.clone())
    }

    pub fn delete_service(&self, id: &str) -> Result<(), StubError> {
        let mut data = self.write();
        let before = data.services.len();
        data.services.retain(|s| s.id != id);
        if data.services.len() == before {
            return Err(StubError::NotFound(format!("Service {}", id)));
        }
        Ok(())
    }

    // ========== Customers ==========

    pub fn customers(&self) -> Vec<Customer> {
        self.read().customers.clone()
    }

    /// A customer with every transaction recorded against them.
    pub fn customer_details(&self, id: &str) -> Result<CustomerDetails, StubError> {
        let data = self.read();
        let customer = data
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StubError::NotFound(format!("Customer {}", id)))?;
        let transactions = data
            .transactions
            .iter()
            .filter(|t| t.customer.as_ref().is_some_and(|c| c.id == id))
            .cloned()
            .collect();
        Ok(CustomerDetails {
            customer,
            transactions,
        })
    }

    pub fn create_customer(&self, draft: NewCustomer) -> Result<Customer, StubError> {
        draft.validate().map_err(StubError::BadRequest)?;
        let customer = Customer {
            id: new_id(),
            name: draft.name,
            phone: draft.phone,
            loyalty: draft.loyalty.unwrap_or_default(),
            total_spent: 0.0,
        };
        self.write().customers.push(customer.clone());
        Ok(customer)
    }

    pub fn update_customer(&self, id: &str, patch: &CustomerPatch) -> Result<Customer, StubError> {
        patch.validate().map_err(StubError::BadRequest)?;
        let mut data = self.write();
        let customer = data
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StubError::NotFound(format!("Customer {}", id)))?;
        patch.apply(customer);
        Ok(customer.clone())
    }

    pub fn delete_customer(&self, id: &str) -> Result<(), StubError> {
        let mut data = self.write();
        let before = data.customers.len();
        data.customers.retain(|c| c.id != id);
        if data.customers.len() == before {
            return Err(StubError::NotFound(format!("Customer {}", id)));
        }
        Ok(())
    }

    // ========== Transactions ==========

    pub fn transactions(&self) -> Vec<Transaction> {
        self.read().transactions.clone()
    }

    pub fn transaction(&self, id: &str) -> Result<Transaction, StubError> {
        self.read()
            .transactions
            .iter()
            .find(|t| t.matches(id))
            .cloned()
            .ok_or_else(|| StubError::NotFound(format!("Transaction {}", id)))
    }

    /// Prices and records a sale.
    pub fn create_transaction(&self, draft: NewTransaction) -> Result<Transaction, StubError> {
        let draft = draft.selected();
        draft.validate().map_err(StubError::BadRequest)?;

        let mut data = self.write();

        let mut sold = Vec::with_capacity(draft.services.len());
        for item in &draft.services {
            let service = data
                .services
                .iter()
                .find(|s| s.id == item.service_id)
                .ok_or_else(|| {
                    StubError::BadRequest(format!("Unknown service {}", item.service_id))
                })?;
            sold.push(SoldService {
                id: service.id.clone(),
                name: service.name.clone(),
                price: service.price * f64::from(item.quantity),
                quantity: Some(item.quantity),
            });
        }

        let customer = data
            .customers
            .iter_mut()
            .find(|c| c.id == draft.customer_id)
            .ok_or_else(|| {
                StubError::BadRequest(format!("Unknown customer {}", draft.customer_id))
            })?;

        let amount: f64 = sold.iter().map(|s| s.price).sum();
        let price = match customer.loyalty {
            Loyalty::High => amount * (1.0 - HIGH_LOYALTY_DISCOUNT),
            Loyalty::Normal | Loyalty::Low => amount,
        };
        customer.total_spent += price;
        let customer = customer.clone();

        let transaction = Transaction {
            id: new_id(),
            code: Some(new_code(data.transactions.len() + 1)),
            customer: Some(customer),
            services: sold,
            price_before_promotion: Some(amount),
            price,
            status: TransactionStatus::Available,
        };
        data.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Marks a transaction unavailable. The record stays listed.
    pub fn cancel_transaction(&self, id: &str) -> Result<Transaction, StubError> {
        let mut data = self.write();
        let transaction = data
            .transactions
            .iter_mut()
            .find(|t| t.matches(id))
            .ok_or_else(|| StubError::NotFound(format!("Transaction {}", id)))?;
        transaction.status = TransactionStatus::Unavailable;
        Ok(transaction.clone())
    }

    // ========== Helpers ==========

    fn read(&self) -> RwLockReadGuard<'_, Data> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Data> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Display code: `HD`, the local date and time as `DDMMYYYYHHMMSS`, then a
/// running number so codes made within the same second stay distinct.
fn new_code(seq: usize) -> String {
    format!("HD{}{:04}", chrono::Local::now().format("%d%m%Y%H%M%S"), seq)
}
