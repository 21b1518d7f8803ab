use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query};
use chrono::Utc;
use spotted::{
    api::{CallbackState, callback},
    error::SpotError,
    management::TokenManager,
    spotify::auth::{Credentials, authorize_url},
    types::{PkceToken, Token},
};
use tempfile::TempDir;
use tokio::sync::{Mutex, oneshot};

fn credentials() -> Credentials {
    Credentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        auth_url: "https://accounts.example.com/authorize".to_string(),
        token_url: "https://accounts.example.com/api/token".to_string(),
        redirect_uri: "http://127.0.0.1:4000/callback".to_string(),
        scope: "user-top-read".to_string(),
    }
}

fn token(expires_in: u64, obtained_at: u64) -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: Some("refresh".to_string()),
        scope: "user-top-read".to_string(),
        expires_in,
        obtained_at,
    }
}

fn now() -> u64 {
    Utc::now().timestamp() as u64
}

#[test]
fn test_authorize_url_carries_pkce_parameters() {
    let url = authorize_url(&credentials(), "challenge123", "state456");

    assert!(url.starts_with("https://accounts.example.com/authorize?"));
    assert!(url.contains("client_id=client"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("code_challenge=challenge123"));
    assert!(url.contains("code_challenge_method=S256"));
    assert!(url.contains("state=state456"));
}

#[test]
fn test_token_expiry_margin() {
    let fresh = TokenManager::new(token(3600, now()), None);
    assert!(!fresh.is_expired());

    // Inside the four minute margin
    let closing = TokenManager::new(token(3600, now() - 3600 + 120), None);
    assert!(closing.is_expired());

    let stale = TokenManager::new(token(3600, now() - 7200), None);
    assert!(stale.is_expired());
}

#[tokio::test]
async fn test_token_cache_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("token.json");

    assert!(TokenManager::load(&path).await.unwrap().is_none());

    let manager = TokenManager::new(token(3600, 42), Some(path.clone()));
    manager.persist().await.unwrap();

    let loaded = TokenManager::load(&path).await.unwrap().unwrap();
    assert_eq!(loaded.current_token().access_token, "access");
    assert_eq!(loaded.current_token().refresh_token.as_deref(), Some("refresh"));
    assert_eq!(loaded.current_token().obtained_at, 42);
}

#[tokio::test]
async fn test_callback_handles_a_single_request() {
    let (sender, receiver) = oneshot::channel();
    let state = Arc::new(Mutex::new(CallbackState {
        pkce: PkceToken {
            code_verifier: "verifier".to_string(),
            state: "expected".to_string(),
        },
        credentials: credentials(),
        sender: Some(sender),
    }));

    let params = HashMap::from([
        ("code".to_string(), "code".to_string()),
        ("state".to_string(), "forged".to_string()),
    ]);
    let page = callback(Query(params.clone()), Extension(Arc::clone(&state))).await;
    assert!(page.0.contains("Login failed"));

    match receiver.await.unwrap() {
        Err(SpotError::Auth(message)) => assert!(message.contains("state mismatch")),
        other => panic!("expected a state mismatch, got {:?}", other),
    }

    let page = callback(Query(params), Extension(state)).await;
    assert!(page.0.contains("already handled"));
}

#[tokio::test]
async fn test_callback_reports_denied_authorization() {
    let (sender, receiver) = oneshot::channel();
    let state = Arc::new(Mutex::new(CallbackState {
        pkce: PkceToken {
            code_verifier: "verifier".to_string(),
            state: "expected".to_string(),
        },
        credentials: credentials(),
        sender: Some(sender),
    }));

    let params = HashMap::from([
        ("error".to_string(), "access_denied".to_string()),
        ("state".to_string(), "expected".to_string()),
    ]);
    callback(Query(params), Extension(state)).await;

    assert!(matches!(receiver.await.unwrap(), Err(SpotError::Auth(m)) if m.contains("access_denied")));
}
