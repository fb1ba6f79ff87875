use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use spotapi::{
    ApiOptions, Credentials, Error,
    auth::{Scope, Token, flows},
};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn options(server: &MockServer) -> ApiOptions {
    ApiOptions {
        api_base_url: server.uri(),
        accounts_base_url: server.uri(),
        ..ApiOptions::default()
    }
}

fn query(url: &str) -> HashMap<String, String> {
    Url::parse(url).unwrap().query_pairs().into_owned().collect()
}

#[tokio::test]
async fn test_client_credentials_uses_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        // base64("id:secret")
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::new("id").with_secret("secret");
    let token = flows::client_credentials(&Client::new(), &options(&server), &credentials)
        .await
        .unwrap();

    assert_eq!(token.access_token, "app-token");
    assert!(token.refresh_token.is_none());
    assert!(!token.should_refresh(Utc::now()));
}

#[tokio::test]
async fn test_rejected_credentials_are_authentication_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client secret"
        })))
        .mount(&server)
        .await;

    let credentials = Credentials::new("id").with_secret("wrong");
    let err = flows::client_credentials(&Client::new(), &options(&server), &credentials)
        .await
        .unwrap_err();

    match err {
        Error::Authentication { error, description } => {
            assert_eq!(error, "invalid_client");
            assert_eq!(description.as_deref(), Some("Invalid client secret"));
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_credentials_require_secret() {
    let server = MockServer::start().await;
    let err = flows::client_credentials(&Client::new(), &options(&server), &Credentials::new("id"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_pkce_exchange_sends_verifier_without_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("code_verifier=the-verifier"))
        .and(body_string_contains("client_id=id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-token",
            "refresh_token": "r1",
            "expires_in": 3600,
            "scope": "user-read-email"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::new("id").with_redirect_uri("http://127.0.0.1:8888/callback");
    let token = flows::exchange_pkce_code(
        &Client::new(),
        &options(&server),
        &credentials,
        "the-code",
        "the-verifier",
    )
    .await
    .unwrap();

    assert_eq!(token.refresh_token.as_deref(), Some("r1"));
    assert!(token.has_scopes(&[Scope::UserReadEmail]));
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "renewed",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let old = Token::new("old", Some("r1".to_string()), 10, BTreeSet::new(), Utc::now());
    let fresh = flows::refresh(&Client::new(), &options(&server), &Credentials::new("id"), &old)
        .await
        .unwrap();

    assert_eq!(fresh.access_token, "renewed");
    assert_eq!(fresh.refresh_token.as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_refresh_without_refresh_token_needs_reauthentication() {
    let server = MockServer::start().await;
    let token = Token::new("old", None, 10, BTreeSet::new(), Utc::now());

    let err = flows::refresh(&Client::new(), &options(&server), &Credentials::new("id"), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReAuthenticationNeeded));
}

#[test]
fn test_authorization_urls() {
    let options = ApiOptions::default();
    let credentials = Credentials::new("id").with_redirect_uri("http://127.0.0.1:8888/callback");
    let scopes = [Scope::UserReadEmail, Scope::UserFollowRead];

    let url = flows::authorization_url(&options, &credentials, &scopes, Some("s1"), true).unwrap();
    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    let params = query(&url);
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["client_id"], "id");
    assert_eq!(params["redirect_uri"], "http://127.0.0.1:8888/callback");
    assert_eq!(params["scope"], "user-read-email user-follow-read");
    assert_eq!(params["state"], "s1");
    assert_eq!(params["show_dialog"], "true");

    let pkce = flows::pkce_authorization_url(&options, &credentials, &scopes, "challenge", None)
        .unwrap();
    let params = query(&pkce);
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["code_challenge"], "challenge");
    assert!(!params.contains_key("state"));

    let implicit = flows::implicit_grant_url(&options, &credentials, &[], None, false).unwrap();
    let params = query(&implicit);
    assert_eq!(params["response_type"], "token");
    assert!(!params.contains_key("scope"));
    assert!(!params.contains_key("show_dialog"));
}

#[test]
fn test_authorization_url_requires_redirect_uri() {
    let result = flows::authorization_url(
        &ApiOptions::default(),
        &Credentials::new("id"),
        &[],
        None,
        false,
    );
    assert!(matches!(result, Err(Error::Config(_))));
}
