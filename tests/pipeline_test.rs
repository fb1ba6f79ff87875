use std::{
    collections::BTreeSet,
    error::Error as _,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use chrono::Utc;
use serde_json::json;
use spotapi::{
    ApiOptions, Credentials, Error, Grant, SpotifyApi, SpotifyAppApi, SpotifyClientApi,
    auth::Token,
    error::MALFORMED_REQUEST,
    http::MAX_DELTA_SECS,
};
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

fn token(access_token: &str, expires_in: i64) -> Token {
    Token::new(
        access_token,
        Some("refresh".to_string()),
        expires_in,
        BTreeSet::new(),
        Utc::now(),
    )
}

fn app_api(options: ApiOptions, token: Token) -> SpotifyApi {
    let credentials = Credentials::new("id").with_secret("secret");
    SpotifyApi::new(credentials, token, Grant::ClientCredentials, options)
}

fn user_json() -> serde_json::Value {
    json!({ "id": "u1", "uri": "spotify:user:u1", "display_name": "User One" })
}

async fn mount_token_endpoint(server: &MockServer, access_token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "expires_in": 3600
        })))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cached_response_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "max-age=60")
                .set_body_json(user_json()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let first = api.users().profile("u1").await.unwrap();
    let second = api.users().profile("u1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.cache().endpoint_len("users"), 1);
}

#[tokio::test]
async fn test_stale_entry_is_revalidated_with_etag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .and(header("if-none-match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304).insert_header("cache-control", "max-age=60"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "max-age=0")
                .insert_header("etag", "\"v1\"")
                .set_body_json(user_json()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let first = api.users().profile("u1").await.unwrap();
    let revalidated = api.users().profile("u1").await.unwrap();
    let cached = api.users().profile("u1").await.unwrap();

    assert_eq!(first, revalidated);
    assert_eq!(first, cached);
}

#[tokio::test]
async fn test_not_modified_without_cached_etag_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let err = api.users().profile("u1").await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn test_error_and_no_store_responses_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("cache-control", "max-age=60")
                .set_body_json(json!({ "error": { "status": 404, "message": "Not found" } })),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "no-store")
                .set_body_json(user_json()),
        )
        .expect(2)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    for _ in 0..2 {
        let err = api.users().profile("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        api.users().profile("u1").await.unwrap();
    }
    assert!(api.cache().is_empty());
}

#[tokio::test]
async fn test_server_error_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": { "status": 500, "message": "boom" } })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    match api.users().profile("u1").await.unwrap_err() {
        Error::BadRequest {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let user = api.users().profile("u1").await.unwrap();
    assert_eq!(user.id, "u1");
}

#[tokio::test]
async fn test_rate_limit_waits_retry_after_plus_one_second() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let started = Instant::now();
    api.users().profile("u1").await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_rate_limit_without_retry_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(
        ApiOptions {
            retry_when_rate_limited: false,
            ..options(&server)
        },
        token("valid", 3600),
    );
    match api.users().profile("u1").await.unwrap_err() {
        Error::RateLimited { retry_after } => assert_eq!(retry_after, Duration::from_secs(8)),
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "fresh", 1).await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({ "error": { "status": 401, "message": "The access token expired" } }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("revoked", 3600));
    api.users().profile("u1").await.unwrap();

    assert_eq!(api.token().access_token, "fresh");
}

#[tokio::test]
async fn test_second_unauthorized_is_returned() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "fresh", 1).await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({ "error": { "status": 401, "message": "Invalid access token" } }),
        ))
        .expect(2)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("revoked", 3600));
    let err = api.users().profile("u1").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_expired_token_without_automatic_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(0)
        .mount(&server)
        .await;

    let api = app_api(
        ApiOptions {
            automatic_refresh: false,
            ..options(&server)
        },
        token("old", 10),
    );
    let err = api.users().profile("u1").await.unwrap_err();
    assert!(matches!(err, Error::ReAuthenticationNeeded));
}

#[tokio::test]
async fn test_implicit_token_cannot_be_refreshed() {
    let server = MockServer::start().await;
    let implicit = Token::new("implicit", None, 10, BTreeSet::new(), Utc::now());
    let api = SpotifyClientApi::from_implicit_token(
        Credentials::new("id"),
        implicit,
        options(&server),
    );

    assert!(!api.can_refresh());
    let err = api.profile().current_user().await.unwrap_err();
    assert!(matches!(err, Error::ReAuthenticationNeeded));
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_before_request() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "fresh", 1).await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let refreshes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&refreshes);
    let api = app_api(
        ApiOptions {
            on_token_refresh: Some(Arc::new(move |token: &Token| {
                assert_eq!(token.access_token, "fresh");
                counter.fetch_add(1, Ordering::SeqCst);
            })),
            ..options(&server)
        },
        token("old", 100),
    );

    api.users().profile("u1").await.unwrap();
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_user_token_refresh_uses_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "uri": "spotify:user:u1",
            "email": "one@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = SpotifyClientApi::from_token(Credentials::new("id"), token("old", 10), options(&server));
    let me = api.profile().current_user().await.unwrap();

    assert_eq!(me.email.as_deref(), Some("one@example.com"));
    assert_eq!(api.token().refresh_token.as_deref(), Some("refresh"));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "fresh", "expires_in": 3600 }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(5)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("old", 10));
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let api = api.clone();
            tokio::spawn(async move { api.users().profile("u1").await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let api = app_api(
        ApiOptions {
            request_timeout: Some(Duration::from_millis(200)),
            ..options(&server)
        },
        token("valid", 3600),
    );
    let err = api.users().profile("u1").await.unwrap_err();
    assert!(matches!(err, Error::Timeout(limit) if limit == Duration::from_millis(200)));
}

#[tokio::test]
async fn test_accepted_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    assert_eq!(api.users().profile("u1").await.unwrap().id, "u1");
}

#[tokio::test]
async fn test_malformed_error_body_keeps_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>bad</html>"))
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let err = api.users().profile("u1").await.unwrap_err();

    assert!(err.source().is_some());
    match err {
        Error::BadRequest {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, MALFORMED_REQUEST);
        }
        other => panic!("expected bad request, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/playlists/p1/tracks"))
        .and(header("content-type", "application/json"))
        .and(body_string_contains("spotify:track:t1"))
        .and(body_string_contains("\"snapshot_id\":\"s1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "snapshot_id": "s2" })))
        .expect(1)
        .mount(&server)
        .await;

    let api = SpotifyClientApi::from_token(Credentials::new("id"), token("valid", 3600), options(&server));
    let snapshot = api
        .client_playlists()
        .remove_tracks("p1", &["spotify:track:t1"], Some("s1"))
        .await
        .unwrap();

    assert_eq!(snapshot, "s2");
}

#[tokio::test]
async fn test_expired_entry_goes_back_to_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "max-age=1")
                .set_body_json(user_json()),
        )
        .expect(2)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    api.users().profile("u1").await.unwrap();
    api.users().profile("u1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    api.users().profile("u1").await.unwrap();

    assert_eq!(api.cache().endpoint_len("users"), 1);
}

#[tokio::test]
async fn test_oversized_max_age_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "max-age=9223372036854775807")
                .set_body_json(user_json()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(options(&server), token("valid", 3600));
    let task = {
        let api = api.clone();
        tokio::spawn(async move {
            api.users().profile("u1").await?;
            api.users().profile("u1").await
        })
    };

    let user = task.await.unwrap().unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(api.cache().endpoint_len("users"), 1);
}

#[tokio::test]
async fn test_oversized_token_lifetime_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "long-lived",
            "expires_in": i64::MAX
        })))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let api = SpotifyAppApi::from_client_credentials(
        Credentials::new("id").with_secret("secret"),
        options(&server),
    )
    .await
    .unwrap();

    let token = api.token();
    assert_eq!(token.access_token, "long-lived");
    assert!(token.expires_at <= Utc::now() + chrono::Duration::seconds(MAX_DELTA_SECS));
    assert!(token.expires_at >= before + chrono::Duration::seconds(MAX_DELTA_SECS));
}

#[tokio::test]
async fn test_huge_retry_after_saturates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("retry-after", u64::MAX.to_string().as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = app_api(
        ApiOptions {
            retry_when_rate_limited: false,
            ..options(&server)
        },
        token("valid", 3600),
    );
    match api.users().profile("u1").await.unwrap_err() {
        Error::RateLimited { retry_after } => {
            assert_eq!(retry_after, Duration::from_secs(u64::MAX))
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}
