use std::collections::BTreeSet;

use chrono::Utc;
use spotapi::{
    Error,
    auth::{Token, TokenStore},
};

fn sample_token() -> Token {
    let scopes: BTreeSet<String> = ["user-read-email".to_string()].into();
    Token::new("abc", Some("r1".to_string()), 3600, scopes, Utc::now())
}

#[tokio::test]
async fn test_persist_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("nested/cache/token.json"));
    let token = sample_token();

    store.persist(&token).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(loaded, token);
}

#[tokio::test]
async fn test_load_missing_token_is_io_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));

    match store.load().await {
        Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_corrupt_token_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = TokenStore::new(&path).load().await;
    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().join("token.json"));
    store.persist(&sample_token()).await.unwrap();

    store.clear().await.unwrap();
    store.clear().await.unwrap();
    assert!(!store.path().exists());
}
