//! Kami Stub Server
//!
//! Serves an in-memory copy of the Kami backend for local development.
//!
//! # Configuration
//!
//! Environment variables:
//! - `KAMI_STUB_PORT`: Port to listen on (default: 8080)
//! - `KAMI_STUB_CONFIG`: Path to seed file (default: ~/.config/kami-stub/config.yaml)
//!
//! See [`kami::server::config`] for the seed file format. Without a seed
//! file the server starts empty and nobody can log in until someone
//! registers.

use std::net::SocketAddr;
use std::path::PathBuf;

use kami::server::{self, StubConfig, StubState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Config {
    port: u16,
    config_path: PathBuf,
}

impl Config {
    fn from_env() -> Self {
        let port = std::env::var("KAMI_STUB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let config_path = std::env::var("KAMI_STUB_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("kami-stub")
                    .join("config.yaml")
            });

        Self { port, config_path }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kami=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let seed = if config.config_path.exists() {
        match StubConfig::load(&config.config_path) {
            Ok(seed) => {
                tracing::info!(
                    "Loaded {} user(s), {} service(s), {} customer(s) from {}",
                    seed.users.len(),
                    seed.services.len(),
                    seed.customers.len(),
                    config.config_path.display()
                );
                seed
            }
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    } else {
        tracing::warn!(
            "No seed file at {}, starting empty",
            config.config_path.display()
        );
        StubConfig::default()
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    if let Err(e) = server::spawn(StubState::new(seed), addr).await {
        tracing::error!("Failed to bind {}: {}", addr, e);
        std::process::exit(1);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
