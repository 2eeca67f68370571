//! Integration tests for the store onboarding admin API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate the database and start the server
//! cargo run -p onboarding-cli -- migrate
//! cargo run -p onboarding-admin
//!
//! # Run integration tests
//! cargo test -p onboarding-integration-tests -- --ignored
//! ```
//!
//! `ADMIN_BASE_URL` overrides the server address (default
//! `http://localhost:3001`).

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client for the tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A store name no other test run will produce.
#[must_use]
pub fn unique_store_name(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("{prefix} {suffix}")
}

/// Create a store through the API, returning the response body.
///
/// # Panics
///
/// Panics if the request fails or the store is not created.
#[allow(clippy::expect_used)]
pub async fn create_store(client: &Client, name: &str, region: &str) -> Value {
    let resp = client
        .post(format!("{}/api/stores", admin_base_url()))
        .json(&json!({"name": name, "region": region, "confirm_duplicates": true}))
        .send()
        .await
        .expect("Failed to create store");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    resp.json().await.expect("Invalid store response")
}
