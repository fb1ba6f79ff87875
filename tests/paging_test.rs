use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::json;
use spotapi::{
    ApiOptions, Credentials, SpotifyClientApi,
    auth::Token,
    models::{Artist, SimpleTrack},
    paging::{CursorBasedPagingObject, PagingObject, decode_page},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn client_api(server: &MockServer) -> SpotifyClientApi {
    let token = Token::new("valid", None, 3600, BTreeSet::new(), Utc::now());
    let options = ApiOptions {
        api_base_url: server.uri(),
        accounts_base_url: server.uri(),
        ..ApiOptions::default()
    };
    SpotifyClientApi::from_token(Credentials::new("id"), token, options)
}

fn track(n: u32) -> serde_json::Value {
    json!({ "name": format!("t{n}"), "uri": format!("spotify:track:{n}"), "duration_ms": 1000 })
}

#[tokio::test]
async fn test_offset_pages_walk_forward_and_back() {
    let server = MockServer::start().await;
    let base = format!("{}/albums/a1/tracks", server.uri());
    Mock::given(method("GET"))
        .and(path("/albums/a1/tracks"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "href": format!("{base}?offset=2&limit=2"),
            "items": [track(3)],
            "limit": 2,
            "next": null,
            "offset": 2,
            "previous": format!("{base}?offset=0&limit=2"),
            "total": 3
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/albums/a1/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "href": format!("{base}?offset=0&limit=2"),
            "items": [track(1), track(2)],
            "limit": 2,
            "next": format!("{base}?offset=2&limit=2"),
            "offset": 0,
            "previous": null,
            "total": 3
        })))
        .mount(&server)
        .await;

    let api = client_api(&server);
    let first = api.albums().album_tracks("a1", Some(2), None, None).await.unwrap();
    assert!(first.has_next());
    assert!(!first.has_previous());
    assert!(first.previous(&api).await.unwrap().is_none());

    let second = first.next(&api).await.unwrap().expect("second page");
    assert_eq!(second.offset, 2);
    assert!(!second.has_next());

    let back = second.previous(&api).await.unwrap().expect("first page again");
    assert_eq!(back, first);

    let names: Vec<String> = first
        .all_items(&api)
        .await
        .unwrap()
        .into_iter()
        .map(|t: SimpleTrack| t.name)
        .collect();
    assert_eq!(names, ["t1", "t2", "t3"]);
}

#[tokio::test]
async fn test_cursor_pages_follow_after() {
    let server = MockServer::start().await;
    let base = format!("{}/me/following", server.uri());
    let artist = |id: &str| json!({ "id": id, "name": id.to_uppercase(), "uri": format!("spotify:artist:{id}") });

    Mock::given(method("GET"))
        .and(path("/me/following"))
        .and(query_param("after", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": {
                "href": format!("{base}?type=artist&after=b"),
                "items": [artist("c")],
                "limit": 2,
                "next": null,
                "cursors": { "after": null },
                "total": 3
            }
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/following"))
        .and(query_param("type", "artist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": {
                "href": format!("{base}?type=artist"),
                "items": [artist("a"), artist("b")],
                "limit": 2,
                "next": format!("{base}?type=artist&after=b"),
                "cursors": { "after": "b" },
                "total": 3
            }
        })))
        .mount(&server)
        .await;

    let api = client_api(&server);
    let first = api.following().followed_artists(Some(2), None).await.unwrap();
    assert_eq!(first.cursors.after.as_deref(), Some("b"));
    assert_eq!(first.total, Some(3));

    let artists: Vec<Artist> = first.all_items(&api).await.unwrap();
    let ids: Vec<&str> = artists.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn test_decode_page_unwraps_single_key_objects() {
    let bare = r#"{"href":"h","items":[1,2],"limit":2,"next":null,"offset":0,"previous":null,"total":2}"#;
    let wrapped = format!(r#"{{"numbers":{bare}}}"#);

    let a: PagingObject<u32> = decode_page(bare).unwrap();
    let b: PagingObject<u32> = decode_page(&wrapped).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.items, vec![1, 2]);

    let cursor: CursorBasedPagingObject<u32> =
        decode_page(r#"{"href":"h","items":[],"limit":20,"next":null}"#).unwrap();
    assert!(cursor.cursors.after.is_none());
    assert!(cursor.total.is_none());
}

#[test]
fn test_decode_page_rejects_garbage() {
    let result: spotapi::Result<PagingObject<u32>> = decode_page("[]");
    assert!(matches!(result, Err(spotapi::Error::Parse { .. })));
}
