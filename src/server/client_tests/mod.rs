//! Client stores from `kami-core` driven against a live stub server over HTTP.

mod resource_stores;
mod session_flow;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use kami_core::{ApiClient, Customer, FileStore, Loyalty, Service, Stores};
use tempfile::TempDir;

use super::{spawn, StubConfig, StubState, UserEntry};

const PHONE: &str = "555-0100";
const PASSWORD: &str = "secret";
const TOKEN: &str = "abc";

/// A stub server plus a set of stores talking to it over a temp data dir.
struct TestEnv {
    state: StubState,
    addr: SocketAddr,
    storage: Arc<FileStore>,
    stores: Stores,
    _temp_dir: TempDir,
}

impl TestEnv {
    /// Fresh stores over the same data directory, as after a restart.
    fn restart(&self) -> Stores {
        Stores::new(client(self.addr), self.storage.clone())
    }
}

fn client(addr: SocketAddr) -> ApiClient {
    ApiClient::new(format!("http://{}", addr)).unwrap()
}

fn seed() -> StubConfig {
    StubConfig {
        users: vec![UserEntry::new(PHONE, PASSWORD).with_token(TOKEN)],
        services: vec![Service {
            id: "s1".to_string(),
            name: "Cleaning".to_string(),
            price: 20.0,
            ..Default::default()
        }],
        customers: vec![Customer {
            id: "c1".to_string(),
            name: "Ann".to_string(),
            phone: "555-0199".to_string(),
            loyalty: Loyalty::High,
            total_spent: 0.0,
        }],
    }
}

async fn setup() -> TestEnv {
    setup_with(seed()).await
}

async fn setup_with(config: StubConfig) -> TestEnv {
    let state = StubState::new(config);
    let addr = spawn(state.clone(), "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStore::new(temp_dir.path().join("data")));
    let stores = Stores::new(client(addr), storage.clone());

    TestEnv {
        state,
        addr,
        storage,
        stores,
        _temp_dir: temp_dir,
    }
}

/// Like [`setup`], with the stores already logged in.
async fn logged_in() -> TestEnv {
    let env = setup().await;
    env.stores.session.login(PHONE, PASSWORD).await.unwrap();
    env
}

/// Serves a hand-built router for cases the stub does not model.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}
