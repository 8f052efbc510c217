//! Integration tests for the Preforma storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p preforma-integration-tests
//! ```
//!
//! Each test spawns the full application on an ephemeral port with its own
//! data file, so tests run in parallel without a shared server.
//!
//! # Test Categories
//!
//! - `catalog` - Listing, filtering and product detail
//! - `quote_flow` - Cart and quote request lifecycle
//! - `admin_editor` - Admin gate, record editor and deletion

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;

use preforma_storefront::config::StorefrontConfig;
use preforma_storefront::state::AppState;

/// Password used by every test instance.
pub const ADMIN_PASSWORD: &str = "preformas-test";

/// A running storefront bound to a local port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
    _data_dir: Option<TempDir>,
}

impl TestApp {
    /// Spawn an app with a fresh data file and no submission delay.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir or the listener cannot be created.
    pub async fn spawn() -> Self {
        Self::spawn_with_delay(Duration::ZERO).await
    }

    /// Spawn an app with a fresh data file and the given submission delay.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir or the listener cannot be created.
    #[allow(clippy::expect_used)]
    pub async fn spawn_with_delay(delay: Duration) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data_path = dir.path().join("local_storage.json");
        let mut app = Self::spawn_at(&data_path, delay).await;
        app._data_dir = Some(dir);
        app
    }

    /// Spawn an app over an existing data file.
    ///
    /// Used to check what survives a restart.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built or the listener cannot bind.
    #[allow(clippy::expect_used)]
    pub async fn spawn_at(data_path: &Path, delay: Duration) -> Self {
        let config = test_config(data_path, delay);
        let state = AppState::new(config).expect("Failed to build app state");
        let app = preforma_storefront::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            data_path: data_path.to_path_buf(),
            _data_dir: None,
        }
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A new visitor with its own cookie jar (and so its own session).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn visitor(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// A visitor that has logged in to the admin panel.
    ///
    /// # Panics
    ///
    /// Panics if the login is refused.
    #[allow(clippy::expect_used)]
    pub async fn admin(&self) -> Client {
        let client = self.visitor();
        let resp = client
            .post(self.url("/admin/login"))
            .json(&json!({ "password": ADMIN_PASSWORD }))
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::OK);
        client
    }
}

/// Configuration for a test instance.
#[must_use]
pub fn test_config(data_path: &Path, delay: Duration) -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        data_path: data_path.to_path_buf(),
        admin_password: SecretString::from(ADMIN_PASSWORD),
        submission_delay: delay,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        quote_email: None,
    }
}

/// Read a response body as JSON, asserting the status first.
///
/// # Panics
///
/// Panics if the status differs or the body is not JSON.
#[allow(clippy::expect_used)]
pub async fn json_body(resp: Response, expected: StatusCode) -> Value {
    assert_eq!(resp.status(), expected, "unexpected status");
    resp.json().await.expect("Response body is not JSON")
}

/// Ids of the products in a listing body.
#[must_use]
pub fn product_ids(listing: &Value) -> Vec<String> {
    listing["products"]
        .as_array()
        .map(|products| {
            products
                .iter()
                .filter_map(|p| p["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
