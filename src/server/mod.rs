//! In-memory stand-in for the Kami backend.
//!
//! Serves the same routes the client talks to, keeps everything in memory and
//! checks the token carried in mutation bodies. Used by the
//! `kami-stub-server` binary and by the integration tests.
//!
//! # Endpoints
//!
//! - `POST /auth`, `POST /auth/register`
//! - `GET|POST /services`, `GET|PUT|DELETE /services/{id}`
//! - `GET|POST /Customers`, `GET|PUT|DELETE /Customers/{id}`
//! - `GET|POST /transactions`, `GET|DELETE /transactions/{id}`

pub mod config;
mod error;
mod routes;
mod state;

#[cfg(test)]
mod client_tests;

use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use config::{StubConfig, StubConfigError, UserEntry};
pub use error::StubError;
pub use state::StubState;

/// Builds the router over shared state.
pub fn router(state: StubState) -> Router {
    Router::new()
        .route("/auth", post(routes::login))
        .route("/auth/register", post(routes::register))
        .route(
            "/services",
            get(routes::list_services).post(routes::create_service),
        )
        .route(
            "/services/{id}",
            get(routes::get_service)
                .put(routes::update_service)
                .delete(routes::delete_service),
        )
        .route(
            "/Customers",
            get(routes::list_customers).post(routes::create_customer),
        )
        .route(
            "/Customers/{id}",
            get(routes::get_customer)
                .put(routes::update_customer)
                .delete(routes::delete_customer),
        )
        .route(
            "/transactions",
            get(routes::list_transactions).post(routes::create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(routes::get_transaction).delete(routes::cancel_transaction),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::count_requests,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serves `state` on `addr` in a background task and returns the bound address.
///
/// Bind to port 0 to get a free port.
pub async fn spawn(state: StubState, addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(state);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Stub server stopped: {}", e);
        }
    });

    tracing::info!("Stub server listening on {}", local);
    Ok(local)
}
