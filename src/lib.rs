//! Kami stub backend.
//!
//! The client library lives in `kami-core` and the command-line front-end in
//! `kami-cli`. This crate serves an in-memory copy of the backend API for
//! local development and for the end-to-end tests of the client stores.

pub mod server;

pub use server::{router, spawn, StubConfig, StubState};
