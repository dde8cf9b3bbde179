//! Integration tests for UrbanPlan.
//!
//! Each test spawns the dashboard router on an ephemeral local port and
//! drives it over HTTP with a cookie-keeping client, so sessions behave as
//! they do in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p urbanplan-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Login, logout, demo role switch, session restore
//! - `screen_access` - Role-based screen access for API and page requests
//! - `catalog` - Dashboard, projects and calendar endpoints
//! - `analysis_flow` - The analysis workflow over HTTP

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, redirect};
use serde_json::{Value, json};

use urbanplan_admin::{app, config::AdminConfig, state::AppState};

/// A running server and a client with its own cookie jar.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

/// Configuration used by default: demo mode on, no login delay and a short
/// analysis.
#[must_use]
pub fn test_config() -> AdminConfig {
    AdminConfig {
        demo_mode: true,
        login_latency: Duration::ZERO,
        analysis_latency: Duration::from_millis(50),
        ..AdminConfig::default()
    }
}

impl TestContext {
    /// Spawn a server with [`test_config`].
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Spawn a server with `config`.
    pub async fn with_config(config: AdminConfig) -> Self {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let router = app(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self {
            client: new_client(),
            base_url: format!("http://{addr}"),
        }
    }

    /// Another browser against the same server.
    #[must_use]
    pub fn second_client(&self) -> Self {
        Self {
            client: new_client(),
            base_url: self.base_url.clone(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post(&self, path: &str) -> Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Log in with email and password; returns the identity JSON.
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .post_json("/auth/login", &json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login failed");
        response.json().await.expect("login body")
    }

    /// Switch to the demo account of `role`.
    pub async fn demo(&self, role: &str) -> Value {
        let response = self.post(&format!("/auth/demo/{role}")).await;
        assert_eq!(response.status(), StatusCode::OK, "demo login failed");
        response.json().await.expect("demo body")
    }
}

/// Keeps cookies, does not follow redirects so tests can assert on them.
fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Body of a response as JSON.
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("response is not JSON")
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
