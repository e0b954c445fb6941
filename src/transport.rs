//! HTTP transport to the catalog REST API.
//!
//! The rest of the SDK talks to the backend only through the [`Transport`]
//! trait, so tests and embedding applications can swap in their own
//! implementation. [`HttpTransport`] is the reqwest-backed default.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::error::{PimError, Result};

/// Query-string parameters as ordered key/value pairs.
pub type Params = [(String, String)];

/// A JSON-over-HTTP client for the catalog API.
///
/// Implementations must map any non-2xx response to [`PimError::Api`]
/// carrying the status code, status text and the parsed error body.
/// Empty successful responses map to `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<Value>;

    async fn get(&self, path: &str, params: &Params) -> Result<Value> {
        self.request(Method::GET, path, params, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str, params: &Params) -> Result<Value> {
        self.request(Method::DELETE, path, params, None).await
    }
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// reqwest-backed [`Transport`] with an optional bearer token.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn handle_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = if text.trim().is_empty() {
                None
            } else {
                Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
            };
            return Err(PimError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "sending request");

        let mut req = self.client.request(method, &url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await?;
        Self::handle_response(response).await
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}
