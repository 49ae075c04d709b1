//! HTTP client helpers for tests.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    pub async fn health(&self) -> reqwest::Result<Value> {
        self.client
            .get(self.url("/healthz"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn suggest(&self, body: Value) -> reqwest::Result<(Value, StatusCode)> {
        self.post("/api/suggest-collections", body).await
    }

    pub async fn apply(&self, body: Value) -> reqwest::Result<(Value, StatusCode)> {
        self.post("/api/apply-suggestion", body).await
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Result<(Value, StatusCode)> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        let status = resp.status();
        Ok((resp.json().await?, status))
    }
}
