//! Authenticated HTTP session shared by all resource managers.
//!
//! Low-level client that handles authentication, raw requests and error
//! envelopes. Resource-specific operations live in the managers of the
//! [`apple`](crate::apple) and [`firebase`](crate::firebase) modules.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppDistError, Result};

const USER_AGENT: &str = concat!("appdist/", env!("CARGO_PKG_VERSION"));

/// Query parameters in the order they are sent.
pub type QueryParams = Vec<(String, String)>;

/// Pre-authenticated API session.
///
/// Holds a bearer token and a base URL. Every manager built from the same
/// client shares one session; clones reference the same connection pool
/// and configuration, which is never mutated after construction.
#[derive(Clone)]
pub struct ApiSession {
    http: Client,
    base_url: Arc<Url>,
    token: Arc<str>,
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiSession {
    /// Create a new session with the provided bearer token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(AppDistError::ConfigMissing(
                "an API bearer token is required".to_string(),
            ));
        }

        // Ensure base URL ends with / so relative paths are appended
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(AppDistError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: Arc::from(token),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path relative to the base URL, or accept an absolute URL
    /// as returned in pagination links.
    pub fn resolve(&self, path_or_url: &str) -> Result<Url> {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            return Ok(Url::parse(path_or_url)?);
        }
        Ok(self.base_url.join(path_or_url.trim_start_matches('/'))?)
    }

    /// Make a GET request with query parameters and decode the JSON body.
    #[tracing::instrument(skip(self, query))]
    pub async fn get<T: DeserializeOwned>(&self, path_or_url: &str, query: &QueryParams) -> Result<T> {
        let url = self.resolve(path_or_url)?;
        tracing::debug!("GET {}", url);
        let request = self.http.get(url).query(query);
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Make a POST request with a JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        tracing::debug!("POST {}", url);
        let request = self.http.post(url).json(body);
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Make a PATCH request with a JSON body.
    #[tracing::instrument(skip(self, body))]
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        tracing::debug!("PATCH {}", url);
        let request = self.http.patch(url).json(body);
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Make a DELETE request. Any response body is discarded.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.resolve(path)?;
        tracing::debug!("DELETE {}", url);
        let request = self.http.delete(url);
        self.send(request).await?;
        Ok(())
    }

    /// Fetch a raw binary body, e.g. a stored signing file.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.resolve(path)?;
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(AppDistError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(AppDistError::Http)?;
            Self::check_body(status, &body)?;
            return Err(AppDistError::Api {
                message: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }
        let bytes = response.bytes().await.map_err(AppDistError::Http)?;
        Ok(bytes.to_vec())
    }

    /// Attach credentials, send, and check the response.
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(AppDistError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(AppDistError::Http)?;
        Self::check_body(status, &body)
    }

    /// Check status and body, converting error envelopes into errors.
    fn check_body(status: StatusCode, body: &str) -> Result<Value> {
        let json = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(body) {
                Ok(json) => json,
                Err(e) if status.is_success() => return Err(AppDistError::Parse(e)),
                Err(_) => Value::String(body.to_string()),
            }
        };

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            let message = error_message(&json).unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AppDistError::Authentication(message));
        }

        if !status.is_success() {
            let message = error_message(&json).unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AppDistError::Api {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        // Some endpoints answer 200 with an error envelope
        if has_error_envelope(&json) {
            let message = error_message(&json).unwrap_or_else(|| "unknown error".to_string());
            return Err(AppDistError::Api {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        Ok(json)
    }
}

fn has_error_envelope(json: &Value) -> bool {
    json.get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty())
        || json.get("error").is_some_and(Value::is_object)
}

/// Extract the server-provided reason from an error body.
///
/// Understands the App Store Connect `errors` array, the Google
/// `error.message` object, and plain `message`/`error` strings.
fn error_message(json: &Value) -> Option<String> {
    if let Some(errors) = json.get("errors").and_then(Value::as_array) {
        let reasons: Vec<String> = errors
            .iter()
            .filter_map(|e| {
                let title = e.get("title").and_then(Value::as_str);
                let detail = e.get("detail").and_then(Value::as_str);
                match (title, detail) {
                    (Some(t), Some(d)) => Some(format!("{t} - {d}")),
                    (Some(t), None) => Some(t.to_string()),
                    (None, Some(d)) => Some(d.to_string()),
                    (None, None) => None,
                }
            })
            .collect();
        if !reasons.is_empty() {
            return Some(reasons.join("; "));
        }
    }

    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }

    if let Some(msg) = json.get("message").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    if let Some(err) = json.get("error").and_then(Value::as_str) {
        return Some(err.to_string());
    }

    json.as_str().map(str::to_string)
}
