use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use notekeeper_api::{router, AppState};
use notekeeper_core::db::open_db_in_memory;
use notekeeper_core::{Config, NoteService, ServerConfig, SqliteNoteStore};
use serde_json::{json, Value};
use std::collections::HashSet;
use tower::ServiceExt;

fn app() -> Router {
    app_with(&ServerConfig::default())
}

fn app_with(config: &ServerConfig) -> Router {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteStore::try_new(conn).unwrap());
    router(AppState::new(service), config)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, _, json) = send(app, Method::POST, "/api/v1/notes", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json
}

#[tokio::test]
async fn create_then_get_returns_identical_note() {
    let app = app();
    let created = create(&app, json!({"title": "A", "content": "B"})).await;

    assert_eq!(created["tags"], json!([]));
    assert_eq!(created["archived"], json!(false));
    assert_eq!(created["created_at"], created["updated_at"]);

    let id = created["id"].as_str().unwrap();
    let (status, _, fetched) = send(&app, Method::GET, &format!("/api/v1/notes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_out_of_range_fields_with_422() {
    let app = app();
    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/notes",
        Some(json!({"title": "", "content": "x".repeat(10_001)})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_rejects_missing_fields_and_bad_json_with_422() {
    let app = app();
    let (status, _, body) =
        send(&app, Method::POST, "/api/v1/notes", Some(json!({"title": "only"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/notes")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = app();
    let created = create(&app, json!({"title": "A", "content": "B"})).await;
    let uri = format!("/api/v1/notes/{}", created["id"].as_str().unwrap());

    let (status, _, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
    assert_eq!(body["detail"], "Note not found");

    let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_uuid_id_is_not_found() {
    let app = app();
    let (status, _, body) = send(&app, Method::GET, "/api/v1/notes/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn update_applies_only_supplied_fields() {
    let app = app();
    let created = create(
        &app,
        json!({"title": "t", "content": "c", "tags": ["a", "b"]}),
    )
    .await;
    let uri = format!("/api/v1/notes/{}", created["id"].as_str().unwrap());

    let (status, _, updated) =
        send(&app, Method::PUT, &uri, Some(json!({"archived": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["archived"], json!(true));
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["content"], created["content"]);
    assert_eq!(updated["tags"], json!(["a", "b"]));
    assert_eq!(updated["created_at"], created["created_at"]);

    let (status, _, cleared) = send(&app, Method::PUT, &uri, Some(json!({"tags": []}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["tags"], json!([]));
    assert_eq!(cleared["archived"], json!(true));
}

#[tokio::test]
async fn update_rejects_null_title_and_missing_note() {
    let app = app();
    let created = create(&app, json!({"title": "t", "content": "c"})).await;
    let uri = format!("/api/v1/notes/{}", created["id"].as_str().unwrap());

    let (status, _, body) = send(&app, Method::PUT, &uri, Some(json!({"title": null}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "title");

    let missing = "/api/v1/notes/00000000-0000-4000-8000-000000000000";
    let (status, _, _) = send(&app, Method::PUT, missing, Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_paginates_fifteen_notes_without_overlap() {
    let app = app();
    for idx in 0..15 {
        create(&app, json!({"title": format!("note {idx}"), "content": "body"})).await;
    }

    let (status, headers, first) =
        send(&app, Method::GET, "/api/v1/notes?page=1&per_page=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-total-count"], "15");
    let (_, _, second) = send(&app, Method::GET, "/api/v1/notes?page=2&per_page=10", None).await;

    let first = first.as_array().unwrap();
    let second = second.as_array().unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 5);

    let first_ids: HashSet<&str> = first.iter().map(|note| note["id"].as_str().unwrap()).collect();
    assert!(second
        .iter()
        .all(|note| !first_ids.contains(note["id"].as_str().unwrap())));
}

#[tokio::test]
async fn list_filters_by_search_and_archived() {
    let app = app();
    create(&app, json!({"title": "foo one", "content": "x", "archived": true})).await;
    create(&app, json!({"title": "two", "content": "has foo"})).await;
    create(&app, json!({"title": "Foo three", "content": "x"})).await;

    let count = |uri: &'static str| {
        let app = app.clone();
        async move {
            let (status, _, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK);
            body.as_array().unwrap().len()
        }
    };

    assert_eq!(count("/api/v1/notes").await, 3);
    assert_eq!(count("/api/v1/notes?search=foo").await, 2);
    assert_eq!(count("/api/v1/notes?archived=true").await, 1);
    assert_eq!(count("/api/v1/notes?archived=false").await, 2);
    assert_eq!(count("/api/v1/notes?search=foo&archived=false").await, 1);
    assert_eq!(count("/api/v1/notes?archived=yes").await, 1);
    assert_eq!(count("/api/v1/notes?archived=0").await, 2);
}

#[tokio::test]
async fn list_rejects_invalid_query_params() {
    let app = app();
    for uri in [
        "/api/v1/notes?page=0",
        "/api/v1/notes?per_page=101",
        "/api/v1/notes?per_page=0",
        "/api/v1/notes?page=abc",
        "/api/v1/notes?archived=maybe",
    ] {
        let (status, _, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "uri: {uri}");
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn root_health_and_headers() {
    let app = app();
    let (status, headers, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));

    let (status, _, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notes API");

    let (status, _, body) = send(&app, Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let app = app();
    let allowed = app
        .clone()
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");

    let denied = app
        .clone()
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();
    assert!(!denied
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn wildcard_origin_config_builds_router_and_allows_any_origin() {
    let config = Config::from_toml_str("[server]\ncors_origins = [\"*\"]\n").unwrap();
    let app = app_with(&config.server);

    let response = app
        .clone()
        .oneshot(preflight("http://anywhere.example"))
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(!response
        .headers()
        .contains_key("access-control-allow-credentials"));

    let (status, _, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

fn preflight(origin: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/notes")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap()
}
