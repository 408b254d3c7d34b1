//! HTTP round-trips through the full router over an in-memory database.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::Query,
    http::{Method, Request, StatusCode, header},
    response::Response,
    routing::get,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use songbook_query::{MetadataProvider, QueryError, QueryResult, SongDetails};
use songbook_server::{AppState, HttpMetadataClient, SongCatalog, app};
use songbook_sqlite::{GroupStore, SongStore, SqliteConfig, SqlitePool, migrate};

const LYRICS: &str = "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\n\
    You caught me under false pretenses\nHow long before you let me go?\n\n\
    Ooh\nYou set my soul alight";

/// Answers from a fixed table keyed by `(song, group)`.
struct FakeMetadata {
    songs: HashMap<(String, String), SongDetails>,
}

impl FakeMetadata {
    fn new() -> Self {
        let mut songs = HashMap::new();
        songs.insert(
            ("Supermassive Black Hole".to_string(), "Muse".to_string()),
            SongDetails {
                release_date: "16.07.2006".into(),
                text: LYRICS.into(),
                link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".into(),
            },
        );
        songs.insert(
            ("Uprising".to_string(), "Muse".to_string()),
            SongDetails {
                release_date: "07.09.2009".into(),
                text: "They will not force us\n\nThey will stop degrading us".into(),
                link: "https://example.com/uprising".into(),
            },
        );
        songs.insert(
            ("Broken".to_string(), "Nobody".to_string()),
            SongDetails {
                release_date: "2009-09-07".into(),
                text: String::new(),
                link: String::new(),
            },
        );
        Self { songs }
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn song_details(&self, song: &str, group: &str) -> QueryResult<SongDetails> {
        self.songs
            .get(&(song.to_string(), group.to_string()))
            .cloned()
            .ok_or_else(|| QueryError::upstream(format!("no details for {} by {}", song, group)))
    }
}

async fn test_app() -> Router {
    let pool = SqlitePool::new(SqliteConfig::memory()).await.unwrap();
    migrate(&pool).await.unwrap();
    let catalog = SongCatalog::new(
        Arc::new(SongStore::new(pool.clone())),
        Arc::new(GroupStore::new(pool)),
        Arc::new(FakeMetadata::new()),
    )
    .unwrap();
    app(AppState::new(catalog, Duration::from_millis(500)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn add(app: &Router, song: &str, group: &str) -> Value {
    let response = send(
        app,
        Method::POST,
        "/api/v1/songs/add",
        Some(json!({ "song": song, "group": group })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let response = send(&app, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_add_then_get() {
    let app = test_app().await;
    let added = add(&app, "Supermassive Black Hole", "Muse").await;
    assert_eq!(added["releaseDate"], "2006-07-16");
    assert_eq!(added["group"], "Muse");

    let id = added["id"].as_i64().unwrap();
    let response = send(&app, Method::GET, &format!("/api/v1/songs/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let song = json_body(response).await;
    assert_eq!(song["song"], "Supermassive Black Hole");
    assert_eq!(song["link"], "https://www.youtube.com/watch?v=Xsp3_a-PMTw");
}

#[tokio::test]
async fn test_second_song_reuses_existing_group() {
    let app = test_app().await;
    let first = add(&app, "Supermassive Black Hole", "Muse").await;
    let second = add(&app, "Uprising", "Muse").await;
    assert_eq!(first["groupId"], second["groupId"]);
}

#[tokio::test]
async fn test_add_rejects_blank_fields_and_bad_json() {
    let app = test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/v1/songs/add",
        Some(json!({ "song": " ", "group": "Muse" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, Method::POST, "/api/v1/songs/add", Some(json!({ "song": 1 }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_upstream_failures_are_server_errors() {
    let app = test_app().await;
    let response = send(
        &app,
        Method::POST,
        "/api/v1/songs/add",
        Some(json!({ "song": "Unknown", "group": "Muse" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"]["code"], "S8001");

    // The metadata service sent an ISO date instead of DD.MM.YYYY.
    let response = send(
        &app,
        Method::POST,
        "/api/v1/songs/add",
        Some(json!({ "song": "Broken", "group": "Nobody" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_search_and_paginate() {
    let app = test_app().await;
    add(&app, "Supermassive Black Hole", "Muse").await;
    add(&app, "Uprising", "Muse").await;

    let response = send(&app, Method::GET, "/api/v1/songs?group=Muse", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(page["songs"].as_array().unwrap().len(), 2);
    assert_eq!((page["page"].as_u64(), page["limit"].as_u64()), (Some(0), Some(0)));

    let response = send(&app, Method::GET, "/api/v1/songs?group=Muse&page=2&limit=1", None).await;
    let page = json_body(response).await;
    assert_eq!(page["songs"][0]["song"], "Uprising");
    assert_eq!(page["page"], 2);

    let response = send(&app, Method::GET, "/api/v1/songs?releaseDate=07.09.2009", None).await;
    let page = json_body(response).await;
    assert_eq!(page["songs"][0]["song"], "Uprising");
}

#[tokio::test]
async fn test_search_without_matches_is_not_found() {
    let app = test_app().await;
    add(&app, "Uprising", "Muse").await;
    let response = send(&app, Method::GET, "/api/v1/songs?group=Queen", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_reports_every_invalid_field() {
    let app = test_app().await;
    let response = send(
        &app,
        Method::GET,
        "/api/v1/songs?releaseDate=2006-07-16&link=not-a-url",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("releaseDate"), "{}", message);
    assert!(message.contains("link"), "{}", message);
    assert_eq!(body["error"]["code"], "S1003");
}

#[tokio::test]
async fn test_search_rejects_malformed_page() {
    let app = test_app().await;
    let response = send(&app, Method::GET, "/api/v1/songs?page=two", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for uri in [
        "/api/v1/songs?page=18446744073709551615",
        "/api/v1/songs?page=1&limit=9223372036854775808",
        "/api/v1/songs/1/text?page=18446744073709551615",
    ] {
        let response = send(&app, Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "S1005", "{}", uri);
    }
}

#[tokio::test]
async fn test_lyrics_pages() {
    let app = test_app().await;
    let id = add(&app, "Supermassive Black Hole", "Muse").await["id"].as_i64().unwrap();

    let response = send(&app, Method::GET, &format!("/api/v1/songs/{}/text?page=2&limit=1", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(
        page,
        json!({
            "couplets": ["You caught me under false pretenses\nHow long before you let me go?"],
            "page": 2,
            "limit": 1
        })
    );

    let response = send(&app, Method::GET, &format!("/api/v1/songs/{}/text", id), None).await;
    let page = json_body(response).await;
    assert_eq!(page["couplets"].as_array().unwrap().len(), 3);
    assert_eq!((page["page"].as_u64(), page["limit"].as_u64()), (Some(1), Some(3)));

    let response = send(&app, Method::GET, &format!("/api/v1/songs/{}/text?page=4&limit=1", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_song() {
    let app = test_app().await;
    let id = add(&app, "Uprising", "Muse").await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/songs/{}", id);

    let response = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "releaseDate": "01.01.2010", "group": "MUSE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let song = json_body(send(&app, Method::GET, &uri, None).await).await;
    assert_eq!(song["releaseDate"], "2010-01-01");
    assert_eq!(song["group"], "MUSE");
    assert_eq!(song["song"], "Uprising");

    let response = send(&app, Method::PUT, &uri, Some(json!({ "link": "nope", "releaseDate": "1.1.10" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, Method::PUT, "/api/v1/songs/999", Some(json!({ "text": "x" }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_song() {
    let app = test_app().await;
    let id = add(&app, "Uprising", "Muse").await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/songs/{}", id);

    assert_eq!(send(&app, Method::DELETE, &uri, None).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&app, Method::DELETE, &uri, None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, Method::GET, &uri, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = test_app().await;
    let response = send(&app, Method::GET, "/api/v1/songs/abc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = test_app().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/songs")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    let methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("PUT"), "{}", methods);
}

async fn metadata_stub() -> String {
    async fn info(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
        match (params.get("song").map(String::as_str), params.get("group").map(String::as_str)) {
            (Some("Uprising"), Some("Muse")) => Ok(Json(json!({
                "releaseDate": "07.09.2009",
                "text": "They will not force us",
                "link": "https://example.com/uprising"
            }))),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().route("/info", get(info)))
            .await
            .unwrap();
    });
    format!("http://{}/info", addr)
}

#[tokio::test]
async fn test_http_metadata_client() {
    let url = metadata_stub().await;
    let client = HttpMetadataClient::new(url, Duration::from_secs(5)).unwrap();

    let details = client.song_details("Uprising", "Muse").await.unwrap();
    assert_eq!(details.release_date, "07.09.2009");

    let err = client.song_details("Unknown", "Muse").await.unwrap_err();
    assert_eq!(err.code, songbook_query::ErrorCode::UpstreamFailed);
}
