//! Integration tests for the JSON API.

use axum::http::StatusCode;
use serde_json::json;
use sql_whisperer_integration_tests::TestClient;

// ============================================================================
// Resolve
// ============================================================================

#[tokio::test]
async fn test_resolve_revenue() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/api/resolve", &json!({ "prompt": "Top orders by REVENUE" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["intent"], "revenue_ranking");
    assert_eq!(body["params"], json!([]));
    assert!(
        body["sql"]
            .as_str()
            .unwrap_or_default()
            .starts_with("SELECT o.product_name, SUM(o.price * o.quantity) as total_revenue")
    );
}

#[tokio::test]
async fn test_resolve_fallback_binds_first_word() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/api/resolve", &json!({ "prompt": "100% cotton" }))
        .await;

    let body = response.json();
    assert_eq!(body["intent"], "product_search");
    assert_eq!(body["params"], json!(["100\\%"]));
}

#[tokio::test]
async fn test_resolve_empty_prompt_searches_default() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/api/resolve", &json!({ "prompt": "" }))
        .await;
    assert_eq!(response.json()["params"], json!(["laptop"]));
}

// ============================================================================
// Query and execute
// ============================================================================

#[tokio::test]
async fn test_query_returns_rows_in_projection_order() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/api/query", &json!({ "prompt": "Show top sales by revenue" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["query"]["intent"], "revenue_ranking");
    assert_eq!(body["result"]["columns"], json!(["product_name", "total_revenue"]));

    let first = &body["result"]["rows"][0];
    assert_eq!(first["product_name"], "Laptop");
    let revenue = first["total_revenue"].as_f64().unwrap_or_default();
    assert!((revenue - 2199.98).abs() < 1e-6);

    assert_eq!(body["summary"]["columns"], 2);
    assert_eq!(body["chart"]["title"], "total_revenue by product_name");
}

#[tokio::test]
async fn test_execute_error_is_unprocessable() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/api/execute", &json!({ "sql": "SELEKT * FROM orders" }))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = response.json()["error"].as_str().unwrap_or_default().to_owned();
    assert!(error.contains("syntax error"), "{error}");

    // The store is still usable afterwards.
    let response = client
        .post_json("/api/execute", &json!({ "sql": "SELECT COUNT(*) AS n FROM orders" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["result"]["rows"][0]["n"], 8);
}

#[tokio::test]
async fn test_execute_empty_result_keeps_columns() {
    let mut client = TestClient::new();
    let response = client
        .post_json(
            "/api/execute",
            &json!({ "sql": "SELECT id, name FROM customers WHERE city = 'Atlantis'" }),
        )
        .await;

    let body = response.json();
    assert_eq!(body["result"]["columns"], json!(["id", "name"]));
    assert_eq!(body["result"]["rows"], json!([]));
    assert!(body["chart"].is_null());
}

// ============================================================================
// History and stats
// ============================================================================

#[tokio::test]
async fn test_history_newest_first_and_limited() {
    let mut client = TestClient::new();
    for prompt in ["customers by city", "recent orders", "laptop"] {
        let response = client
            .post_json("/api/query", &json!({ "prompt": prompt }))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    // Ad-hoc SQL and failures are not recorded.
    client
        .post_json("/api/execute", &json!({ "sql": "SELECT 1" }))
        .await;

    let history = client.get("/api/history").await.json();
    let prompts: Vec<&str> = history
        .as_array()
        .map(|entries| entries.iter().filter_map(|e| e["prompt"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(prompts, ["laptop", "recent orders", "customers by city"]);

    let limited = client.get("/api/history?limit=1").await.json();
    assert_eq!(limited.as_array().map(Vec::len), Some(1));
    assert_eq!(
        limited[0]["sql"],
        "SELECT * FROM orders WHERE product_name LIKE '%' || 'laptop' || '%' ESCAPE '\\' LIMIT 10;"
    );
}

#[tokio::test]
async fn test_stats_reflect_session_changes() {
    let mut client = TestClient::new();
    assert_eq!(
        client.get("/api/stats").await.json(),
        json!({ "customers": 5, "orders": 8, "products": 7 })
    );

    client
        .post_json("/api/execute", &json!({ "sql": "DELETE FROM products WHERE stock < 50" }))
        .await;
    assert_eq!(client.get("/api/stats").await.json()["products"], 4);
}
