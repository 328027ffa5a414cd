use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Loyalty {
    #[default]
    Normal,
    High,
    Low,
}

impl fmt::Display for Loyalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loyalty::Normal => write!(f, "normal"),
            Loyalty::High => write!(f, "high"),
            Loyalty::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Loyalty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Loyalty::Normal),
            "high" => Ok(Loyalty::High),
            "low" => Ok(Loyalty::Low),
            _ => Err(format!(
                "Invalid loyalty '{}'. Valid options: normal, high, low",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub loyalty: Loyalty,
    /// Computed by the server from the customer's transactions.
    #[serde(default)]
    pub total_spent: f64,
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Phone: {}", self.phone)?;
        writeln!(f, "Loyalty: {}", self.loyalty)?;
        writeln!(f, "Total spent: {:.2}", self.total_spent)
    }
}

/// A customer together with their transaction history, as returned by the
/// single-customer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerDetails {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<Loyalty>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            loyalty: None,
        }
    }

    pub fn with_loyalty(mut self, loyalty: Loyalty) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Customer name is required".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("Phone is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loyalty: Option<Loyalty>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.loyalty.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Customer name cannot be empty".to_string());
        }
        if matches!(&self.phone, Some(phone) if phone.trim().is_empty()) {
            return Err("Phone cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn apply(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(loyalty) = self.loyalty {
            customer.loyalty = loyalty;
        }
    }
}
