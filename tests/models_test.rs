use serde_json::json;
use spotapi::{
    cli::table::{artist_names, format_duration},
    models::{Playable, PlaylistTrack, SearchResult, SearchType},
};

#[test]
fn test_playlist_items_can_be_tracks_episodes_or_missing() {
    let items: Vec<PlaylistTrack> = serde_json::from_value(json!([
        {
            "added_at": "2024-05-01T12:00:00Z",
            "track": {
                "type": "track",
                "name": "Song",
                "uri": "spotify:track:1",
                "duration_ms": 180000,
                "artists": [{ "name": "Band", "id": "b1" }]
            }
        },
        {
            "track": {
                "type": "episode",
                "id": "e1",
                "name": "Show #1",
                "uri": "spotify:episode:e1",
                "duration_ms": 3600000
            }
        },
        { "is_local": true, "track": null }
    ]))
    .unwrap();

    match &items[0].track {
        Some(Playable::Track(track)) => assert_eq!(artist_names(&track.artists), "Band"),
        other => panic!("expected a track, got {other:?}"),
    }
    assert!(matches!(items[1].track, Some(Playable::Episode(_))));
    assert_eq!(items[1].track.as_ref().map(Playable::uri), Some("spotify:episode:e1"));
    assert!(items[2].track.is_none());
    assert!(items[2].is_local);
}

#[test]
fn test_search_result_only_has_requested_types() {
    let result: SearchResult = serde_json::from_value(json!({
        "playlists": {
            "href": "h",
            "items": [null],
            "limit": 1,
            "next": null,
            "offset": 0,
            "previous": null,
            "total": 1
        }
    }))
    .unwrap();

    assert!(result.tracks.is_none());
    assert_eq!(result.playlists.map(|p| p.items), Some(vec![None]));
    assert_eq!(SearchType::Playlist.to_string(), "playlist");
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0:00");
    assert_eq!(format_duration(61_500), "1:01");
    assert_eq!(format_duration(3_723_000), "1:02:03");
}
