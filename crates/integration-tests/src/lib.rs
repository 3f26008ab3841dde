//! Integration tests for SQL Whisperer.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sql-whisperer-integration-tests
//! ```
//!
//! Tests drive the full router in-process: no server, no network, and every
//! [`TestClient`] gets its own session cookie and therefore its own store.
//!
//! # Test Categories
//!
//! - `console` - Browser console flow (generate, execute, export, reset)
//! - `api` - JSON API
//! - `sessions` - Isolation between sessions

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use sql_whisperer_web::config::WhispererConfig;
use sql_whisperer_web::state::AppState;

/// A response with its body already read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("invalid JSON ({e}): {}", self.body))
    }

    /// A header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Drives the router like a browser: remembers the session cookie between
/// requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// A client against a fresh application.
    #[must_use]
    pub fn new() -> Self {
        Self::with_app(sql_whisperer_web::app(AppState::new(WhispererConfig::default())))
    }

    /// A client against an existing application, with no session yet.
    #[must_use]
    pub const fn with_app(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// A second client sharing this client's application but not its session.
    #[must_use]
    pub fn stranger(&self) -> Self {
        Self::with_app(self.app.clone())
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(builder, Body::from(form.to_owned())).await
    }

    pub async fn post_json(&mut self, uri: &str, json: &Value) -> TestResponse {
        let builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        self.send(builder, Body::from(json.to_string())).await
    }

    async fn send(
        &mut self,
        mut builder: axum::http::request::Builder,
        body: Body,
    ) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(body)
            .unwrap_or_else(|e| panic!("bad request: {e}"));

        let response: Response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_owned());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
