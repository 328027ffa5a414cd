//! HTTP client for the Kami backend.
//!
//! All bodies are JSON. Mutations carry the session token inside the request
//! body rather than in an `Authorization` header, matching what the backend
//! expects.

mod client;
mod endpoint;
mod error;

pub use client::{ApiClient, LoginResponse, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use endpoint::Endpoint;
pub use error::{ApiError, ApiResult};
