use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use kami_core::{
    storage::{load_json, save_json},
    ApiError, CustomerPatch, KeyValueStore, MemoryStore, ServicePatch, SessionData,
    SessionError, StorageKey, Stores,
};

use super::{client, logged_in, serve, setup, PASSWORD, PHONE, TOKEN};

#[tokio::test]
async fn fresh_install_then_login_persists_session() {
    let env = setup().await;
    assert!(env.stores.session.restore().is_none());

    let session = env.stores.session.login(PHONE, PASSWORD).await.unwrap();
    assert_eq!(session, SessionData::new(PHONE, TOKEN));

    let raw = env.storage.get("userData").unwrap().unwrap();
    let persisted: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        persisted,
        serde_json::json!({"identity": "555-0100", "token": "abc", "loggedIn": true})
    );
    assert_eq!(env.stores.session.token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn session_survives_restart() {
    let env = logged_in().await;

    let stores = env.restart();
    assert!(stores.session.current().is_none());

    let restored = stores.session.restore().unwrap();
    assert_eq!(restored.identity, PHONE);
    assert!(stores.session.is_authenticated());
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let env = setup().await;

    let result = env.stores.session.login(PHONE, "wrong").await;
    assert!(matches!(result, Err(SessionError::InvalidCredentials)));
    assert!(env.storage.get("userData").unwrap().is_none());
    assert!(!env.stores.session.is_authenticated());
}

#[tokio::test]
async fn logout_then_restore_yields_no_session() {
    let env = logged_in().await;

    env.stores.session.logout().unwrap();
    assert!(env.stores.session.current().is_none());

    let stores = env.restart();
    assert!(stores.session.restore().is_none());
    assert!(stores.session.current().is_none());
    let stored: Option<SessionData> =
        load_json(env.storage.as_ref(), StorageKey::UserData).unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn register_then_login_with_email() {
    let env = setup().await;

    env.stores
        .session
        .register("ann@example.com", "pw123")
        .await
        .unwrap();
    // Registering does not log in.
    assert!(!env.stores.session.is_authenticated());

    let again = env.stores.session.register("ann@example.com", "pw123").await;
    match again {
        Err(SessionError::Api(e @ ApiError::Status { .. })) => {
            assert_eq!(e.status().map(|s| s.as_u16()), Some(409));
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    let session = env
        .stores
        .session
        .login("ann@example.com", "pw123")
        .await
        .unwrap();
    assert_eq!(session.identity, "ann@example.com");
}

#[tokio::test]
async fn rejected_token_expires_session() {
    let env = logged_in().await;
    env.state.revoke_tokens();

    let patch = CustomerPatch {
        name: Some("Annie".to_string()),
        ..Default::default()
    };
    assert!(!env.stores.customers.update("c1", &patch).await);

    assert!(!env.stores.session.is_authenticated());
    assert!(env.storage.get("userData").unwrap().is_none());
    assert_eq!(env.state.customers()[0].name, "Ann");
}

#[tokio::test]
async fn late_rejection_keeps_newer_login() {
    // The update is rejected only after the user has logged in again.
    let app = Router::new()
        .route(
            "/auth",
            post(|| async { Json(serde_json::json!({"token": "new"})) }),
        )
        .route(
            "/services/{id}",
            put(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                StatusCode::UNAUTHORIZED
            }),
        );
    let addr = serve(app).await;

    let storage = Arc::new(MemoryStore::new());
    save_json(
        storage.as_ref(),
        StorageKey::UserData,
        &SessionData::new(PHONE, "old"),
    )
    .unwrap();
    let stores = Stores::new(client(addr), storage.clone());
    stores.session.restore();

    let patch = ServicePatch {
        price: Some(25.0),
        ..Default::default()
    };
    let relogin = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        stores.session.login(PHONE, PASSWORD).await.unwrap();
    };
    let (updated, ()) = tokio::join!(stores.services.update("s1", &patch), relogin);

    assert!(!updated);
    assert_eq!(stores.session.token().as_deref(), Some("new"));
    let stored: Option<SessionData> =
        load_json(storage.as_ref(), StorageKey::UserData).unwrap();
    assert_eq!(stored.and_then(|s| s.token).as_deref(), Some("new"));
}
