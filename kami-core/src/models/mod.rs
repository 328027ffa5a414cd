mod customer;
mod service;
mod session;
mod transaction;

pub use customer::{Customer, CustomerDetails, CustomerPatch, Loyalty, NewCustomer};
pub use service::{NewService, Service, ServicePatch};
pub use session::SessionData;
pub use transaction::{
    NewTransaction, SoldService, Transaction, TransactionItem, TransactionStatus,
};
