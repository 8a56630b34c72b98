//! Integration tests for the HTTP client against a mock server

use serde_json::json;
use shuflowspotify::{PageRequest, Paginator, PlaylistItem, RemoteCatalog, SpotifyApi, SpotifyError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn saved_album(id: &str, name: &str) -> serde_json::Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "album": { "id": id, "name": name, "uri": format!("spotify:album:{id}"), "album_type": "album", "artists": [] }
    })
}

#[tokio::test]
async fn test_saved_albums_are_paged_by_offset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/albums"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [saved_album("a3", "Third")],
            "next": null,
            "total": 3
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/albums"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [saved_album("a1", "First"), saved_album("a2", "Second")],
            "next": format!("{}/me/albums?offset=2&limit=2", server.uri()),
            "total": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = SpotifyApi::with_base_url(server.uri(), "token").unwrap();
    let albums = Paginator::with_limit(|request| RemoteCatalog::saved_albums(&api, request), 2)
        .collect_all()
        .await
        .unwrap();

    let ids: Vec<&str> = albums.iter().map(|a| a.album.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn test_followed_artists_are_paged_by_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me/following"))
        .and(query_param("after", "ar2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": { "items": [{ "id": "ar3", "name": "Three" }], "next": null }
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/following"))
        .and(query_param("type", "artist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": {
                "items": [{ "id": "ar1", "name": "One" }, { "id": "ar2", "name": "Two" }],
                "next": format!("{}/me/following?type=artist&after=ar2&limit=2", server.uri()),
                "cursors": { "after": "ar2" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = SpotifyApi::with_base_url(server.uri(), "token").unwrap();
    let artists = Paginator::with_limit(|request| RemoteCatalog::followed_artists(&api, request), 2)
        .collect_all()
        .await
        .unwrap();

    assert_eq!(artists.len(), 3);
    assert_eq!(artists[2].id, "ar3");
}

#[tokio::test]
async fn test_error_status_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tracks/t1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tracks/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = SpotifyApi::with_base_url(server.uri(), "token").unwrap();

    match api.track("t1").await {
        Err(SpotifyError::Unauthorized(message)) => assert_eq!(message, "The access token expired"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        api.track("missing").await,
        Err(SpotifyError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_playlist_items_and_album_expansion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "is_local": false, "track": { "type": "track", "id": "t1", "name": "One" } },
                { "is_local": false, "track": { "type": "episode", "id": "e1", "name": "Episode" } }
            ],
            "next": null
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/artists/ar1/albums"))
        .and(query_param("include_groups", "album,single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "al1", "name": "Debut" }],
            "next": null
        })))
        .mount(&server)
        .await;

    let api = SpotifyApi::with_base_url(server.uri(), "token").unwrap();

    let items = api
        .playlist_items("p1", PageRequest::first(50))
        .await
        .unwrap();
    let tracks: Vec<_> = items
        .items
        .into_iter()
        .filter_map(PlaylistItem::into_track)
        .collect();
    assert_eq!(tracks.len(), 1);

    let albums = api
        .artist_albums("ar1", PageRequest::first(50))
        .await
        .unwrap();
    assert_eq!(albums.items[0].id, "al1");
}
