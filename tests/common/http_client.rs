//! HTTP client helpers for tests.

use std::time::Duration;

use memeforge::gateway::MEMEFORGE_STATUS_HEADER;
use serde_json::Value;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status code, `X-MemeForge-Status` header and JSON body of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub tag: String,
    pub retry_after: Option<String>,
    pub body: Value,
}

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
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse, TestClientError> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn get_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Result<TestResponse, TestClientError> {
        let mut builder = self.client.get(self.url(path));
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<TestResponse, TestClientError> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn post_with_key(
        &self,
        path: &str,
        key: &str,
        body: &Value,
    ) -> Result<TestResponse, TestClientError> {
        self.send(self.client.post(self.url(path)).header("x-api-key", key).json(body))
            .await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<TestResponse, TestClientError> {
        let resp = builder.send().await?;

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };
        let tag = header(MEMEFORGE_STATUS_HEADER).unwrap_or_else(|| "unknown".to_string());
        let retry_after = header("retry-after");
        let status = resp.status().as_u16();

        let text = resp.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|_| TestClientError::NotJson(status, text))?
        };

        Ok(TestResponse {
            status,
            tag,
            retry_after,
            body,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Non-JSON body with status {0}: {1}")]
    NotJson(u16, String),
}
