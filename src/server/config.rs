//! Seed data for the stub server.
//!
//! # File Format
//!
//! ```yaml
//! users:
//!   - phone: "555-0100"
//!     password: "secret"
//!     token: "abc"          # optional; a random token is issued otherwise
//! services:
//!   - _id: s1
//!     name: Cleaning
//!     price: 20
//! customers:
//!   - name: Ann
//!     phone: "555-0199"
//!     loyalty: high
//! ```

use kami_core::{Customer, Service};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// An account that can log in.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    /// Phone number or email used as the login identity.
    pub phone: String,
    pub password: String,
    /// Fixed token handed out on login.
    #[serde(default)]
    pub token: Option<String>,
}

impl UserEntry {
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StubConfig {
    #[serde(default)]
    pub users: Vec<UserEntry>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub customers: Vec<Customer>,
}

impl StubConfig {
    pub fn load(path: &Path) -> Result<Self, StubConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StubConfigError::Read(path.to_path_buf(), e))?;
        serde_yaml::from_str(&contents).map_err(|e| StubConfigError::Parse(path.to_path_buf(), e))
    }
}

#[derive(Debug)]
pub enum StubConfigError {
    Read(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for StubConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StubConfigError::Read(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            StubConfigError::Parse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StubConfigError {}
