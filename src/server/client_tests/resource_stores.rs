use std::sync::Arc;

use axum::{routing::get, Json, Router};
use kami_core::{
    storage::load_json, ApiError, Customer, CustomerPatch, FileStore, KeyValueStore, Loyalty,
    NewCustomer, NewService, NewTransaction, Service, ServicePatch, StorageKey, StoreError,
    StoreStatus, Stores, TransactionStatus,
};
use tempfile::TempDir;

use super::{client, logged_in, serve, setup, setup_with, StubConfig};

#[tokio::test]
async fn refresh_mirrors_server_list_into_storage() {
    let env = setup().await;
    let store = &env.stores.services;
    assert_eq!(store.status(), StoreStatus::Idle);

    assert!(store.refresh().await);
    assert_eq!(store.status(), StoreStatus::Success);

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "s1");
    assert_eq!(items[0].name, "Cleaning");
    assert_eq!(items[0].price, 20.0);

    let persisted: Vec<Service> = load_json(env.storage.as_ref(), StorageKey::Services)
        .unwrap()
        .unwrap();
    assert_eq!(persisted, items);

    let raw: serde_json::Value =
        serde_json::from_str(&env.storage.get("services").unwrap().unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!([{"_id": "s1", "name": "Cleaning", "price": 20.0}])
    );
}

#[tokio::test]
async fn cached_list_is_available_offline() {
    let env = setup().await;
    assert!(env.stores.services.refresh().await);

    let stores = env.restart();
    assert!(stores.services.load_from_cache());
    assert_eq!(stores.services.find_by_id("s1").unwrap().name, "Cleaning");
    assert_eq!(stores.services.find_cached("s1").unwrap().price, 20.0);
}

#[tokio::test]
async fn create_then_refresh_has_server_fields() {
    let env = logged_in().await;
    let store = &env.stores.customers;

    let created = store
        .create(&NewCustomer::new("Bob", "555-0142").with_loyalty(Loyalty::Low))
        .await
        .unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.loyalty, Loyalty::Low);
    assert_eq!(created.total_spent, 0.0);
    assert_eq!(store.status(), StoreStatus::Success);
    assert_eq!(store.find_by_id(&created.id), Some(created.clone()));
    assert!(store.find_cached(&created.id).is_some());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn create_without_login_sends_nothing() {
    let env = setup().await;
    let before = env.state.requests();

    let result = env
        .stores
        .services
        .create(&NewService::new("Nails", 5.0))
        .await;
    assert!(matches!(result, Err(StoreError::NotAuthenticated)));
    assert_eq!(env.state.requests(), before);
}

#[tokio::test]
async fn update_without_token_returns_false_and_sends_nothing() {
    let env = setup().await;
    let before = env.state.requests();

    let patch = ServicePatch {
        price: Some(25.0),
        ..Default::default()
    };
    assert!(!env.stores.services.update("s1", &patch).await);
    assert_eq!(env.state.requests(), before);
    assert_eq!(env.state.services()[0].price, 20.0);
}

#[tokio::test]
async fn update_refreshes_local_copy() {
    let env = logged_in().await;
    let store = &env.stores.services;
    assert!(store.refresh().await);

    let patch = ServicePatch {
        price: Some(25.0),
        category: Some("home".to_string()),
        ..Default::default()
    };
    assert!(store.update("s1", &patch).await);

    let updated = store.find_by_id("s1").unwrap();
    assert_eq!(updated.price, 25.0);
    assert_eq!(updated.category.as_deref(), Some("home"));
    assert_eq!(store.find_cached("s1").unwrap().price, 25.0);
}

#[tokio::test]
async fn update_of_unknown_record_fails() {
    let env = logged_in().await;
    let patch = CustomerPatch {
        name: Some("Nobody".to_string()),
        ..Default::default()
    };

    assert!(!env.stores.customers.update("missing", &patch).await);
    assert_eq!(env.stores.customers.status(), StoreStatus::Error);
    assert!(env.stores.customers.last_error().is_some());
    // A 404 leaves the session alone.
    assert!(env.stores.session.is_authenticated());
}

#[tokio::test]
async fn remove_service_drops_it_after_refresh() {
    let env = logged_in().await;
    let store = &env.stores.services;
    assert!(store.refresh().await);

    assert!(store.remove("s1").await);
    assert!(store.find_by_id("s1").is_none());
    assert!(store.is_empty());
    assert!(store.find_cached("s1").is_none());
}

#[tokio::test]
async fn transaction_remove_is_soft_cancel() {
    let env = logged_in().await;
    let store = &env.stores.transactions;

    let draft = NewTransaction::new("c1").with_service("s1", 2);
    let created = store.create(&draft).await.unwrap();
    assert_eq!(created.status, TransactionStatus::Available);
    assert_eq!(store.active().len(), 1);

    assert!(store.remove(&created.id).await);

    let cancelled = store.find_by_id(&created.id).unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Unavailable);
    assert!(store.active().is_empty());
    assert_eq!(store.cancelled().len(), 1);

    let code = cancelled.code.clone().unwrap();
    assert_eq!(store.find_by_id(&code).unwrap().id, created.id);
}

#[tokio::test]
async fn transaction_pricing_comes_from_server() {
    let env = logged_in().await;

    let draft = NewTransaction::new("c1")
        .with_service("s1", 2)
        .with_service("s1", 0)
        .selected();
    assert!(env.stores.services.refresh().await);
    assert_eq!(draft.estimated_total(&env.stores.services.items()), 40.0);

    let tx = env.stores.transactions.create(&draft).await.unwrap();
    assert_eq!(tx.amount(), 40.0);
    assert!((tx.price - 36.0).abs() < 1e-9);
    assert!((tx.discount() - 4.0).abs() < 1e-9);
    assert!(tx.created_at().is_some());
    assert_eq!(tx.customer.as_ref().map(|c| c.id.as_str()), Some("c1"));

    // Customer totals are server-computed and picked up on refresh.
    assert!(env.stores.customers.refresh().await);
    let customer = env.stores.customers.find_by_id("c1").unwrap();
    assert!((customer.total_spent - 36.0).abs() < 1e-9);

    let details = env.stores.customers.fetch_details("c1").await.unwrap();
    assert_eq!(details.customer.id, "c1");
    assert_eq!(details.transactions.len(), 1);
    assert_eq!(details.transactions[0].id, tx.id);
}

#[tokio::test]
async fn fetch_one_reports_missing_records() {
    let env = setup().await;

    let service = env.stores.services.fetch_one("s1").await.unwrap();
    assert_eq!(service.name, "Cleaning");
    // Detail fetches never touch the cache.
    assert!(env.storage.get("services").unwrap().is_none());

    let missing = env.stores.services.fetch_one("nope").await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn failed_refresh_keeps_stale_items() {
    let env = setup().await;
    assert!(env.stores.services.refresh().await);

    // Same data dir, but nothing listens at this address.
    let dead = kami_core::ApiClient::new("http://127.0.0.1:9").unwrap();
    let stores = Stores::new(dead, env.storage.clone());
    stores.services.load_from_cache();

    assert!(!stores.services.refresh().await);
    assert_eq!(stores.services.status(), StoreStatus::Error);
    assert_eq!(stores.services.len(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_both_complete() {
    let env = setup().await;
    let store = env.stores.services.clone();
    let other = env.stores.services.clone();
    let state = env.state.clone();

    let mutate = async move {
        state
            .create_service(NewService::new("Nails", 5.0))
            .unwrap();
    };
    let (first, second, ()) = tokio::join!(store.refresh(), other.refresh(), mutate);
    assert!(first);
    assert!(second);

    let snapshot: Vec<Service> = env.state.services();
    let items = store.items();
    assert!(items == snapshot || items == snapshot[..1].to_vec());

    let persisted: Vec<Service> = load_json(env.storage.as_ref(), StorageKey::Services)
        .unwrap()
        .unwrap();
    assert_eq!(persisted, items);
}

#[tokio::test]
async fn refresh_all_fills_every_store() {
    let env = setup_with(StubConfig {
        services: vec![
            Service {
                name: "Cut".to_string(),
                price: 10.0,
                ..Default::default()
            },
            Service {
                name: "Wash".to_string(),
                price: 4.0,
                ..Default::default()
            },
        ],
        customers: vec![Customer {
            name: "Cy".to_string(),
            phone: "555-0123".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    })
    .await;

    assert!(env.stores.refresh_all().await);
    assert_eq!(env.stores.services.len(), 2);
    assert_eq!(env.stores.customers.len(), 1);
    assert!(env.stores.transactions.is_empty());
    assert_eq!(env.stores.transactions.status(), StoreStatus::Success);
}

#[tokio::test]
async fn create_rejected_by_server_is_an_error() {
    let env = logged_in().await;

    let draft = NewTransaction::new("c1").with_service("unknown", 1);
    let result = env.stores.transactions.create(&draft).await;
    match result {
        Err(StoreError::Api(ApiError::Status { status, .. })) => {
            assert_eq!(status.as_u16(), 400)
        }
        other => panic!("expected 400, got {:?}", other.map(|t| t.id)),
    }
    assert_eq!(env.stores.transactions.status(), StoreStatus::Error);
}

#[tokio::test]
async fn refresh_accepts_records_with_both_id_keys() {
    let app = Router::new().route(
        "/services",
        get(|| async {
            Json(serde_json::json!([
                {"_id": "s1", "id": "s1", "name": "Cleaning", "price": 20, "__v": 0},
                {"_id": "s2", "id": "s2", "name": "Nails", "price": 5}
            ]))
        }),
    );
    let addr = serve(app).await;
    let temp_dir = TempDir::new().unwrap();
    let stores = Stores::new(client(addr), Arc::new(FileStore::new(temp_dir.path())));

    assert!(stores.services.refresh().await);
    assert_eq!(stores.services.status(), StoreStatus::Success);
    assert_eq!(stores.services.len(), 2);
    assert_eq!(stores.services.find_by_id("s2").unwrap().name, "Nails");
    assert_eq!(stores.services.find_cached("s1").unwrap().price, 20.0);
}
