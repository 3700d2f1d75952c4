//! Integration tests for foundry-store
//!
//! These tests cover on-disk persistence of the SQLite archive and the
//! request flow of the Notion sink against a local stand-in server.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use foundry_domain::{
    ArticleInput, SeenIndex, SourceChunk, UseCaseCandidate, UseCaseResult, UseCaseSink,
};
use foundry_store::{NotionSink, SqliteStore, StoreError, NOTION_VERSION};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn result(url: &str, title: &str, published: &str) -> UseCaseResult {
    let article = ArticleInput::new("text", "headline", url).with_published_str(published);
    let mut candidate = UseCaseCandidate::new(title, "computer vision")
        .with_problem("Scrap from undetected cracks")
        .with_source_chunk(SourceChunk::Chunk(2));
    candidate.category = vec!["Manufacturing".to_string(), "Logistics".to_string()];
    UseCaseResult::new(candidate, &article)
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
    assert_eq!(store.unwrap().count().unwrap(), 0);
}

#[test]
fn test_archive_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foundry.db");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        store
            .insert(&result("https://example.com/a", "Weld QA", "2024-01-05T10:00:00Z"))
            .unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    let loaded = store.get_by_source("https://example.com/a").unwrap().unwrap();
    assert_eq!(loaded.use_case.category, vec!["Manufacturing", "Logistics"]);
    assert_eq!(loaded.use_case.industry, vec!["General"]);
    assert_eq!(loaded.use_case.source_chunk, SourceChunk::Chunk(2));
    assert_eq!(loaded.use_case.problem, "Scrap from undetected cracks");
}

#[test]
fn test_list_orders_by_date_and_limits() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    store
        .insert(&result("https://example.com/old", "Old", "2023-12-01T00:00:00Z"))
        .unwrap();
    store
        .insert(&result("https://example.com/new", "New", "2024-02-01T00:00:00Z"))
        .unwrap();
    store
        .insert(&result("https://example.com/mid", "Mid", "2024-01-01T00:00:00Z"))
        .unwrap();

    let listed = store.list(2).unwrap();
    let titles: Vec<&str> = listed.iter().map(|r| r.use_case.title.as_str()).collect();
    assert_eq!(titles, vec!["New", "Mid"]);
}

#[tokio::test]
async fn test_sink_traits_on_sqlite() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let record = result("https://example.com/a", "Weld QA", "2024-01-05T10:00:00Z");

    assert!(!store.is_seen("https://example.com/a", "Headline").await.unwrap());
    store.publish(&record).await.unwrap();
    assert!(store.is_seen("https://example.com/a", "Headline").await.unwrap());

    let again = store.publish(&record).await;
    assert!(matches!(again, Err(StoreError::Duplicate(_))));
}

#[derive(Clone, Default)]
struct NotionStandIn {
    pages: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    queries: Arc<Mutex<Vec<(String, Value)>>>,
    reject_pages: bool,
}

async fn create_page(
    State(state): State<NotionStandIn>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if state.reject_pages {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "object": "error", "message": "Category is not a property" })),
        );
    }
    state.pages.lock().unwrap().push((headers, body));
    (StatusCode::OK, Json(json!({ "object": "page", "id": "p-1" })))
}

async fn query_database(
    State(state): State<NotionStandIn>,
    Path(database_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let wanted = body["filter"]["or"][0]["url"]["equals"].clone();
    let known = state
        .pages
        .lock()
        .unwrap()
        .iter()
        .any(|(_, page)| page["properties"]["Source"]["url"] == wanted);
    state.queries.lock().unwrap().push((database_id, body));
    let results = if known { vec![json!({ "object": "page" })] } else { vec![] };
    Json(json!({ "object": "list", "results": results }))
}

async fn spawn_notion(state: NotionStandIn) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/v1/pages", post(create_page))
        .route("/v1/databases/:id/query", post(query_database))
        .with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

#[tokio::test]
async fn test_notion_publish_then_seen() {
    let state = NotionStandIn::default();
    let base = spawn_notion(state.clone()).await;
    let mut sink = NotionSink::new("secret_token", "db-42")
        .unwrap()
        .with_base_url(base);
    let record = result("https://example.com/n", "Weld QA", "2024-01-05T10:00:00Z");

    assert!(!sink.is_seen("https://example.com/n", "Headline").await.unwrap());
    sink.publish(&record).await.unwrap();
    assert!(sink.is_seen("https://example.com/n", "Headline").await.unwrap());

    let pages = state.pages.lock().unwrap();
    let (headers, body) = &pages[0];
    assert_eq!(headers["authorization"], "Bearer secret_token");
    assert_eq!(headers["notion-version"], NOTION_VERSION);
    assert_eq!(body["parent"]["database_id"], "db-42");
    assert_eq!(body["properties"]["Date"]["date"]["start"], "2024-01-05");

    let queries = state.queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].0, "db-42");
}

#[tokio::test]
async fn test_notion_rejection_is_remote_error() {
    let state = NotionStandIn {
        reject_pages: true,
        ..NotionStandIn::default()
    };
    let base = spawn_notion(state).await;
    let mut sink = NotionSink::new("t", "db").unwrap().with_base_url(base);

    let err = sink
        .publish(&result("https://example.com/r", "R", "2024-01-05T10:00:00Z"))
        .await
        .unwrap_err();

    match err {
        StoreError::Remote { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Category is not a property"));
        }
        other => panic!("Expected Remote error, got {:?}", other),
    }
}
