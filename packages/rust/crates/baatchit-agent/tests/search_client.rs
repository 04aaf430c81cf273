//! Tavily search client against a throwaway HTTP server.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use baatchit_agent::{SearchBackend, SearchError, TavilySearchClient};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Captured {
    body: Arc<Mutex<Option<Value>>>,
    authorization: Arc<Mutex<Option<String>>>,
}

async fn spawn_server(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("read test listener addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/search"), handle)
}

fn tavily_app(captured: Captured) -> Router {
    Router::new()
        .route(
            "/search",
            post(
                |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    *captured.body.lock().expect("body lock") = Some(body);
                    *captured.authorization.lock().expect("auth lock") = headers
                        .get("authorization")
                        .and_then(|value| value.to_str().ok())
                        .map(ToString::to_string);
                    Json(json!({
                        "query": "bitcoin price",
                        "results": [
                            {"title": "CoinDesk", "content": "BTC trades near $64,000.", "url": "https://a"},
                            {"title": "Reuters", "content": "Bitcoin steady.", "url": "https://b"},
                            {"title": "Bloomberg", "content": "Crypto markets calm.", "url": "https://c"},
                            {"title": "Extra", "content": "never shown", "url": "https://d"}
                        ]
                    }))
                },
            ),
        )
        .with_state(captured)
}

#[tokio::test]
async fn results_are_flattened_into_a_digest() {
    let captured = Captured::default();
    let (url, server) = spawn_server(tavily_app(captured.clone())).await;
    let client = TavilySearchClient::new(url, Some("tvly-test".to_string()));

    let digest = client.search("bitcoin price").await.expect("search");
    server.abort();

    assert_eq!(
        digest,
        "CoinDesk: BTC trades near $64,000.\n\nReuters: Bitcoin steady.\n\nBloomberg: Crypto markets calm."
    );
    let body = captured.body.lock().expect("body lock").clone().expect("body");
    assert_eq!(body["query"], "bitcoin price");
    assert_eq!(body["max_results"], 3);
    assert_eq!(body["search_depth"], "basic");
    assert_eq!(body["include_answer"], false);
    assert_eq!(
        captured.authorization.lock().expect("auth lock").as_deref(),
        Some("Bearer tvly-test")
    );
}

#[tokio::test]
async fn max_results_narrows_the_digest() {
    let captured = Captured::default();
    let (url, server) = spawn_server(tavily_app(captured.clone())).await;
    let client = TavilySearchClient::new(url, Some("k".to_string()))
        .with_max_results(1)
        .with_search_depth("advanced");

    let digest = client.search("bitcoin").await.expect("search");
    server.abort();

    assert_eq!(digest, "CoinDesk: BTC trades near $64,000.");
    let body = captured.body.lock().expect("body lock").clone().expect("body");
    assert_eq!(body["max_results"], 1);
    assert_eq!(body["search_depth"], "advanced");
}

#[tokio::test]
async fn quota_errors_surface_as_status() {
    let app = Router::new().route(
        "/search",
        post(|| async { (StatusCode::from_u16(432).unwrap_or(StatusCode::TOO_MANY_REQUESTS), "quota") }),
    );
    let (url, server) = spawn_server(app).await;

    let error = TavilySearchClient::new(url, Some("k".to_string()))
        .search("anything")
        .await
        .expect_err("status");
    server.abort();
    assert!(matches!(error, SearchError::Status { status: 432 }));
}

#[tokio::test]
async fn empty_result_list_gives_empty_digest() {
    let app = Router::new().route("/search", post(|| async { Json(json!({"results": []})) }));
    let (url, server) = spawn_server(app).await;

    let digest = TavilySearchClient::new(url, Some("k".to_string()))
        .search("nothing")
        .await
        .expect("search");
    server.abort();
    assert!(digest.is_empty());
}

#[tokio::test]
async fn missing_key_fails_without_network() {
    let client = TavilySearchClient::new("http://127.0.0.1:9/search", Some("  ".to_string()));
    assert!(!client.is_configured());
    let error = client.search("q").await.expect_err("not configured");
    assert!(matches!(error, SearchError::NotConfigured(_)));
}
