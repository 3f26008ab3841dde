//! Integration tests for the browser console flow.
//!
//! Each test drives the router in-process with its own session.

use axum::http::StatusCode;
use serde_json::json;
use sql_whisperer_integration_tests::TestClient;

// ============================================================================
// Page rendering
// ============================================================================

#[tokio::test]
async fn test_console_renders_stats_and_samples() {
    let mut client = TestClient::new();
    let page = client.get("/").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(r#"<dd id="stat-customers">5</dd>"#));
    assert!(page.body.contains(r#"<dd id="stat-orders">8</dd>"#));
    assert!(page.body.contains(r#"<dd id="stat-products">7</dd>"#));
    assert!(page.body.contains("Display highest priced products"));
    assert!(page.body.contains("No queries executed yet."));
}

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let mut client = TestClient::new();
    let response = client.get("/static/css/console.css").await;
    assert_eq!(response.status, StatusCode::OK);
}

// ============================================================================
// Generate and execute
// ============================================================================

#[tokio::test]
async fn test_generate_then_execute() {
    let mut client = TestClient::new();

    let response = client
        .post_form("/generate", "prompt=Show+top+10+products+by+revenue&sample=")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/"));

    let page = client.get("/").await;
    assert!(page.body.contains("SELECT * FROM products ORDER BY price DESC;"));
    assert!(page.body.contains("Products by price"));

    let response = client.post_form("/execute", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let page = client.get("/").await;
    assert!(page.body.contains("<td>Laptop</td>"));
    assert!(page.body.contains("<td>999.99</td>"));
    assert!(
        page.body
            .contains(r#"<span class="history-prompt">Show top 10 products by revenue</span>"#)
    );
    assert!(page.body.contains("id by name"));
}

#[tokio::test]
async fn test_sample_takes_precedence() {
    let mut client = TestClient::new();
    client
        .post_form(
            "/generate",
            "prompt=ignored&sample=Show+customer+distribution+by+city",
        )
        .await;

    let page = client.get("/").await;
    assert!(page.body.contains("SELECT city, COUNT(*) as customer_count FROM customers"));
}

#[tokio::test]
async fn test_empty_prompt_warns_once() {
    let mut client = TestClient::new();
    client.post_form("/generate", "prompt=+++&sample=").await;

    let page = client.get("/").await;
    assert!(page.body.contains("Please enter a query first!"));
    assert!(!page.body.contains("Generated SQL"));

    let page = client.get("/").await;
    assert!(!page.body.contains("Please enter a query first!"));
}

#[tokio::test]
async fn test_execute_without_generate_is_bad_request() {
    let mut client = TestClient::new();
    let response = client.post_form("/execute", "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_prompt_with_quote_is_escaped_in_page() {
    let mut client = TestClient::new();
    client.post_form("/generate", "prompt=O%27Brien").await;
    client.post_form("/execute", "").await;

    let page = client.get("/").await;
    // Nothing matches, the query still succeeded and was recorded.
    assert!(page.body.contains("O&#39;Brien") || page.body.contains("O&#x27;Brien"));
    assert!(!page.body.contains("Query Error"));
    assert!(page.body.contains("<strong>0</strong>"));
}

// ============================================================================
// Export and reset
// ============================================================================

#[tokio::test]
async fn test_export_without_result_is_not_found() {
    let mut client = TestClient::new();
    let response = client.get("/export.csv").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_csv() {
    let mut client = TestClient::new();
    client
        .post_form("/generate", "prompt=top+orders+by+revenue")
        .await;
    client.post_form("/execute", "").await;

    let response = client.get("/export.csv").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/csv; charset=utf-8")
    );

    let disposition = response.header("content-disposition").unwrap_or_default();
    assert!(disposition.starts_with("attachment; filename=\"query_results_"));
    assert!(disposition.ends_with(".csv\""));

    let mut lines = response.body.lines();
    assert_eq!(lines.next(), Some("product_name,total_revenue"));
    assert_eq!(lines.next(), Some("Laptop,2199.98"));
}

#[tokio::test]
async fn test_reset_starts_over() {
    let mut client = TestClient::new();
    client.post_form("/generate", "prompt=recent+orders").await;
    client.post_form("/execute", "").await;
    assert!(
        client
            .get("/")
            .await
            .body
            .contains(r#"<span class="history-prompt">recent orders</span>"#)
    );

    let response = client.post_form("/reset", "").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let page = client.get("/").await;
    assert!(page.body.contains("No queries executed yet."));
    assert!(!page.body.contains("Generated SQL"));
}

#[tokio::test]
async fn test_dropped_table_still_renders_and_resets() {
    let mut client = TestClient::new();
    let response = client
        .post_json("/api/execute", &json!({ "sql": "DROP TABLE orders" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let page = client.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(r#"<dd id="stat-orders">n/a</dd>"#));
    assert!(page.body.contains(r#"action="/reset""#));

    client.post_form("/reset", "").await;
    let page = client.get("/").await;
    assert!(page.body.contains(r#"<dd id="stat-orders">8</dd>"#));
}
