//! Integration tests for the node and content-item API
//!
//! Tests cover:
//! - Health endpoint
//! - Node creation with parent-type invariants
//! - Node scalar updates (name, knowledgeText, furtherReading)
//! - Children and museum listings
//! - Content item CRUD

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

use mcm_cm::{build_router, AppState};

/// Test helper: in-memory database with the full schema
async fn setup_pool() -> SqlitePool {
    // Single connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should connect to in-memory database");
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Should enable foreign keys");
    mcm_common::db::create_schema(&pool)
        .await
        .expect("Should create schema");
    pool
}

/// Test helper: app with fresh state
async fn setup_app() -> Router {
    let pool = setup_pool().await;
    build_router(AppState::new(pool))
}

/// Test helper: request with a JSON body
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: bodyless GET request
fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: create a node and return its response body
async fn create_node(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/nodes", body))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mcm-cm");
    assert!(body["version"].is_string());
}

// =============================================================================
// Node Creation Tests
// =============================================================================

#[tokio::test]
async fn test_create_museum() {
    let app = setup_app().await;

    let (status, body) =
        create_node(&app, json!({"type": "MUSEUM", "name": "Natural History"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "MUSEUM");
    assert_eq!(body["name"], "Natural History");
    assert!(body["parentId"].is_null());
    assert!(body["knowledgeText"].is_null());
    assert_eq!(body["furtherReading"], json!([]));
    assert!(body["outline"].is_null());
    assert!(body["outlineUpdatedAt"].is_null());
}

#[tokio::test]
async fn test_create_museum_with_parent_rejected() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;

    let (status, body) = create_node(
        &app,
        json!({"type": "MUSEUM", "name": "M2", "parentId": museum["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invariant violation"));
}

#[tokio::test]
async fn test_create_room_under_museum() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;

    let (status, room) = create_node(
        &app,
        json!({"type": "ROOM", "name": "Hall of Gems", "parentId": museum["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["type"], "ROOM");
    assert_eq!(room["parentId"], museum["id"]);
}

#[tokio::test]
async fn test_create_room_without_parent_rejected() {
    let app = setup_app().await;

    let (status, body) = create_node(&app, json!({"type": "ROOM", "name": "Hall"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("parentId"));
}

#[tokio::test]
async fn test_create_room_with_missing_parent_is_not_found() {
    let app = setup_app().await;

    let (status, body) = create_node(
        &app,
        json!({"type": "ROOM", "name": "Hall", "parentId": "00000000-0000-0000-0000-000000000001"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_create_room_under_artifact_rejected() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;
    let (_, room) =
        create_node(&app, json!({"type": "ROOM", "name": "R", "parentId": museum["id"]})).await;
    let (_, artifact) =
        create_node(&app, json!({"type": "ARTIFACT", "name": "A", "parentId": room["id"]})).await;

    let (status, body) = create_node(
        &app,
        json!({"type": "ROOM", "name": "R2", "parentId": artifact["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("MUSEUM"));
}

#[tokio::test]
async fn test_create_artifact_under_museum_rejected() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;

    let (status, body) = create_node(
        &app,
        json!({"type": "ARTIFACT", "name": "A", "parentId": museum["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ROOM"));
}

#[tokio::test]
async fn test_create_node_with_unknown_type_rejected() {
    let app = setup_app().await;

    let (status, body) = create_node(&app, json!({"type": "GALLERY", "name": "G"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("MUSEUM, ROOM, or ARTIFACT"));
}

#[tokio::test]
async fn test_create_node_requires_type_and_name() {
    let app = setup_app().await;

    let (status, body) = create_node(&app, json!({"type": "MUSEUM"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("required"));
}

// =============================================================================
// Node Read/Update Tests
// =============================================================================

#[tokio::test]
async fn test_get_node_not_found() {
    let app = setup_app().await;

    let response = app
        .oneshot(get_request("/nodes/00000000-0000-0000-0000-000000000099"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_node_with_invalid_id_is_bad_request() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/nodes/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_nodes_and_children() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;
    let (_, room) =
        create_node(&app, json!({"type": "ROOM", "name": "R", "parentId": museum["id"]})).await;

    let response = app.clone().oneshot(get_request("/nodes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!("/nodes/{}/children", museum["id"].as_str().unwrap());
    let response = app.clone().oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let children = extract_json(response.into_body()).await;
    assert_eq!(children.as_array().unwrap().len(), 1);
    assert_eq!(children[0]["id"], room["id"]);
}

#[tokio::test]
async fn test_list_museums_only_returns_top_level() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;
    create_node(&app, json!({"type": "ROOM", "name": "R", "parentId": museum["id"]})).await;

    let response = app.oneshot(get_request("/nodes/museums")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let museums = body.as_array().unwrap();
    assert_eq!(museums.len(), 1);
    assert_eq!(museums[0]["type"], "MUSEUM");
}

#[tokio::test]
async fn test_update_node_scalars() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;
    let uri = format!("/nodes/{}", museum["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            json!({
                "name": "Renamed",
                "knowledgeText": "Founded in 1869.",
                "furtherReading": ["https://example.com/a", "https://example.com/b"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["knowledgeText"], "Founded in 1869.");
    assert_eq!(body["furtherReading"].as_array().unwrap().len(), 2);

    // Empty knowledgeText clears the field; omitted fields stay put
    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, json!({"knowledgeText": ""})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["knowledgeText"].is_null());
    assert_eq!(body["name"], "Renamed");
}

#[tokio::test]
async fn test_update_node_rejects_bad_further_reading() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;
    let uri = format!("/nodes/{}", museum["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, json!({"furtherReading": "not-a-list"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, json!({"furtherReading": [1, 2]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_node_is_not_found() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/nodes/00000000-0000-0000-0000-000000000099",
            json!({"name": "X"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Content Item Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_fetch_content_item() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/content-items",
            json!({
                "nodeId": museum["id"],
                "type": "intro",
                "title": "Welcome",
                "body": "Hello visitors"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let item = extract_json(response.into_body()).await;
    assert_eq!(item["type"], "intro");
    assert_eq!(item["body"], "Hello visitors");
    assert!(item["audioUrl"].is_null());
    assert!(item["outlineKey"].is_null());

    let uri = format!("/content-items/{}", item["id"].as_str().unwrap());
    let response = app.clone().oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = extract_json(response.into_body()).await;
    assert_eq!(fetched["id"], item["id"]);
}

#[tokio::test]
async fn test_create_content_item_requires_fields() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request("POST", "/content-items", json!({"title": "T"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_content_item_for_missing_node() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/content-items",
            json!({
                "nodeId": "00000000-0000-0000-0000-000000000099",
                "type": "intro",
                "title": "T"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_content_item_body_and_audio() {
    let app = setup_app().await;
    let (_, museum) = create_node(&app, json!({"type": "MUSEUM", "name": "M"})).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/content-items",
            json!({"nodeId": museum["id"], "type": "intro", "title": "T"}),
        ))
        .await
        .unwrap();
    let item = extract_json(response.into_body()).await;
    let uri = format!("/content-items/{}", item["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            json!({"body": "Generated text", "audioUrl": "https://cdn.example.com/a.mp3"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["body"], "Generated text");
    assert_eq!(body["audioUrl"], "https://cdn.example.com/a.mp3");

    // Empty audioUrl clears it
    let response = app
        .clone()
        .oneshot(json_request("PATCH", &uri, json!({"audioUrl": ""})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["audioUrl"].is_null());
    assert_eq!(body["body"], "Generated text");
}

#[tokio::test]
async fn test_list_content_items_filtered_by_node() {
    let app = setup_app().await;
    let (_, m1) = create_node(&app, json!({"type": "MUSEUM", "name": "M1"})).await;
    let (_, m2) = create_node(&app, json!({"type": "MUSEUM", "name": "M2"})).await;
    for (node, title) in [(&m1, "A"), (&m1, "B"), (&m2, "C")] {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/content-items",
                json!({"nodeId": node["id"], "type": "intro", "title": title}),
            ))
            .await
            .unwrap();
    }

    let uri = format!("/content-items?nodeId={}", m1["id"].as_str().unwrap());
    let response = app.clone().oneshot(get_request(&uri)).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!("/nodes/{}/content-items", m2["id"].as_str().unwrap());
    let response = app.clone().oneshot(get_request(&uri)).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "C");

    let response = app.clone().oneshot(get_request("/content-items")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_patch_missing_content_item_is_not_found() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/content-items/00000000-0000-0000-0000-000000000099",
            json!({"body": "X"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
