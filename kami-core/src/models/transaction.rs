use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::customer::Customer;
use super::service::Service;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Available,
    /// Cancelled transactions keep their row on the server.
    Unavailable,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Available => write!(f, "available"),
            TransactionStatus::Unavailable => write!(f, "cancelled"),
        }
    }
}

/// A service as it was sold, with the price it had at the time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SoldService {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl SoldService {
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Human-facing code; its digits carry the creation date and time.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(rename = "service", default, deserialize_with = "one_or_many")]
    pub services: Vec<SoldService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_before_promotion: Option<f64>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Available
    }

    /// Matches either the server id or the display code.
    pub fn matches(&self, id: &str) -> bool {
        self.id == id || self.code.as_deref() == Some(id)
    }

    /// Decodes the timestamp embedded in the display code.
    ///
    /// The code is a two character prefix followed by `DDMMYYYY`, `HHMM` and
    /// optionally two digits of seconds.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        let code = self.code.as_deref()?;
        let date = NaiveDate::parse_from_str(code.get(2..10)?, "%d%m%Y").ok()?;
        let hour: u32 = code.get(10..12)?.parse().ok()?;
        let minute: u32 = code.get(12..14)?.parse().ok()?;
        let second: u32 = code
            .get(14..16)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Some(NaiveDateTime::new(date, time))
    }

    /// Sum of the sold services' prices.
    pub fn services_total(&self) -> f64 {
        self.services.iter().map(|s| s.price).sum()
    }

    /// Amount before discount; falls back to the services total when the
    /// server did not report a pre-promotion price.
    pub fn amount(&self) -> f64 {
        match self.price_before_promotion {
            Some(amount) if amount > 0.0 => amount,
            _ => self.services_total(),
        }
    }

    pub fn discount(&self) -> f64 {
        self.amount() - self.price
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!(
            "Transaction {}",
            self.code.as_deref().unwrap_or(self.id.as_str())
        );
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;

        if let Some(created_at) = self.created_at() {
            writeln!(f, "Date: {}", created_at.format("%d/%m/%Y %H:%M"))?;
        }
        if let Some(customer) = &self.customer {
            writeln!(f, "Customer: {} ({})", customer.name, customer.phone)?;
        }
        writeln!(f, "Status: {}", self.status)?;

        if !self.services.is_empty() {
            writeln!(f, "\nServices:")?;
            for service in &self.services {
                if service.quantity() > 1 {
                    writeln!(
                        f,
                        "  - {} x{}: {:.2}",
                        service.name,
                        service.quantity(),
                        service.price
                    )?;
                } else {
                    writeln!(f, "  - {}: {:.2}", service.name, service.price)?;
                }
            }
        }

        writeln!(f, "\nAmount: {:.2}", self.amount())?;
        writeln!(f, "Discount: {:.2}", self.discount())?;
        writeln!(f, "Payment: {:.2}", self.price)
    }
}

/// The server sends a single object when a transaction has one service.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<SoldService>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<SoldService>),
        One(SoldService),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(services)) => services,
        Some(OneOrMany::One(service)) => vec![service],
        None => Vec::new(),
    })
}

/// One line of a transaction being submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionItem {
    #[serde(rename = "id")]
    pub service_id: String,
    pub quantity: u32,
    #[serde(rename = "userID", default)]
    pub user_id: String,
}

/// Request to record a sale; the server computes pricing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub customer_id: String,
    pub services: Vec<TransactionItem>,
}

impl NewTransaction {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, service_id: impl Into<String>, quantity: u32) -> Self {
        self.services.push(TransactionItem {
            service_id: service_id.into(),
            quantity,
            user_id: self.customer_id.clone(),
        });
        self
    }

    /// Drops lines with a zero quantity.
    pub fn selected(mut self) -> Self {
        self.services.retain(|item| item.quantity > 0);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.customer_id.trim().is_empty() {
            return Err("Customer is required".to_string());
        }
        if !self.services.iter().any(|item| item.quantity > 0) {
            return Err("Please select at least one service".to_string());
        }
        Ok(())
    }

    /// Estimates the total from a service catalogue. Unknown services count as zero.
    pub fn estimated_total(&self, catalogue: &[Service]) -> f64 {
        self.services
            .iter()
            .map(|item| {
                let price = catalogue
                    .iter()
                    .find(|s| s.id == item.service_id)
                    .map(|s| s.price)
                    .unwrap_or(0.0);
                price * f64::from(item.quantity)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn transaction(code: &str) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_created_at_from_code() {
        let created = transaction("HD03012025143005").created_at().unwrap();
        assert_eq!(created.day(), 3);
        assert_eq!(created.month(), 1);
        assert_eq!(created.year(), 2025);
        assert_eq!(created.hour(), 14);
        assert_eq!(created.minute(), 30);
        assert_eq!(created.second(), 5);
    }

    #[test]
    fn test_created_at_without_seconds() {
        let created = transaction("HD031220250915").created_at().unwrap();
        assert_eq!(created.month(), 12);
        assert_eq!(created.hour(), 9);
        assert_eq!(created.second(), 0);
    }

    #[test]
    fn test_created_at_invalid_code() {
        assert!(transaction("HD").created_at().is_none());
        assert!(transaction("HD99999999999999").created_at().is_none());
        assert!(Transaction::default().created_at().is_none());
    }

    #[test]
    fn test_service_accepts_single_object() {
        let json = r#"{"_id":"t1","service":{"_id":"s1","name":"Cut","price":10}}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.services.len(), 1);
        assert_eq!(tx.services[0].name, "Cut");
    }

    #[test]
    fn test_service_accepts_list_and_null() {
        let json = r#"{"_id":"t1","service":[{"_id":"s1","price":10},{"_id":"s2","price":5}]}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.services.len(), 2);
        assert_eq!(tx.services_total(), 15.0);

        let tx: Transaction = serde_json::from_str(r#"{"_id":"t1","service":null}"#).unwrap();
        assert!(tx.services.is_empty());
    }

    #[test]
    fn test_nested_records_with_both_id_keys() {
        let json = r#"{
            "_id": "t1",
            "customer": {"_id": "c1", "id": "c1", "name": "Ann"},
            "service": [{"_id": "s1", "id": "s1", "name": "Cut", "price": 10}]
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.customer.map(|c| c.id).as_deref(), Some("c1"));
        assert_eq!(tx.services[0].id, "s1");
    }

    #[test]
    fn test_both_ids_are_kept() {
        let json = r#"{"_id":"abc","id":"HD03012025143005","status":"unavailable"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, "abc");
        assert_eq!(tx.code.as_deref(), Some("HD03012025143005"));
        assert!(tx.matches("abc"));
        assert!(tx.matches("HD03012025143005"));
        assert!(!tx.is_active());
    }

    #[test]
    fn test_amount_and_discount() {
        let mut tx = Transaction {
            services: vec![
                SoldService {
                    price: 30.0,
                    ..Default::default()
                },
                SoldService {
                    price: 20.0,
                    ..Default::default()
                },
            ],
            price: 45.0,
            ..Default::default()
        };
        assert_eq!(tx.amount(), 50.0);
        assert_eq!(tx.discount(), 5.0);

        tx.price_before_promotion = Some(60.0);
        assert_eq!(tx.amount(), 60.0);
        assert_eq!(tx.discount(), 15.0);
    }

    #[test]
    fn test_new_transaction_wire_format() {
        let draft = NewTransaction::new("c1").with_service("s1", 2);
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["customerId"], "c1");
        assert_eq!(value["services"][0]["id"], "s1");
        assert_eq!(value["services"][0]["quantity"], 2);
        assert_eq!(value["services"][0]["userID"], "c1");
    }

    #[test]
    fn test_new_transaction_requires_a_service() {
        assert!(NewTransaction::new("c1").validate().is_err());
        assert!(NewTransaction::new("c1")
            .with_service("s1", 0)
            .validate()
            .is_err());
        assert!(NewTransaction::new("c1")
            .with_service("s1", 1)
            .validate()
            .is_ok());
        assert!(NewTransaction::new("")
            .with_service("s1", 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_selected_drops_zero_quantities() {
        let draft = NewTransaction::new("c1")
            .with_service("s1", 0)
            .with_service("s2", 3)
            .selected();
        assert_eq!(draft.services.len(), 1);
        assert_eq!(draft.services[0].service_id, "s2");
    }

    #[test]
    fn test_estimated_total() {
        let catalogue = vec![
            Service {
                id: "s1".to_string(),
                price: 20.0,
                ..Default::default()
            },
            Service {
                id: "s2".to_string(),
                price: 7.5,
                ..Default::default()
            },
        ];
        let draft = NewTransaction::new("c1")
            .with_service("s1", 2)
            .with_service("s2", 2)
            .with_service("missing", 4);
        assert_eq!(draft.estimated_total(&catalogue), 55.0);
    }
}
