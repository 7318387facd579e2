//! Transport core for the Paylio API.
//!
//! [`HttpClient`] issues exactly one HTTP exchange per call and turns the
//! outcome into either the decoded JSON object of a 2xx response or a
//! classified [`ApiError`]. It keeps no state between calls apart from its
//! immutable configuration and the shared connection pool.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::errors::{ApiError, ErrorDetails};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.paylio.pro/flying/v1";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// SDK version sent in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SDK_SOURCE: &str = "rust";

/// A decoded JSON object.
pub type JsonObject = Map<String, Value>;

/// Executes single requests against the API and classifies their responses.
pub struct HttpClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    /// `None` once the client has been closed.
    client: RwLock<Option<reqwest::Client>>,
}

impl HttpClient {
    /// Creates a transport. Trailing slashes are stripped from `base_url`;
    /// request paths are appended to it as-is.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: RwLock::new(Some(client)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one request and returns the JSON object of a 2xx response.
    ///
    /// `params` are merged into the query string of `path`, replacing keys
    /// already present there. `body` is sent as JSON.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        params: Option<&BTreeMap<String, String>>,
        body: Option<&B>,
    ) -> Result<JsonObject, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path, params)?;

        let body = body
            .map(|b| serde_json::to_vec(b))
            .transpose()
            .map_err(|e| {
                tracing::error!("Failed to serialize request body: {}", e);
                ApiError::connection(format!("failed to marshal body: {}", e))
            })?;

        let client = self.pool()?;
        tracing::debug!("{} {}", method, url);

        let mut builder = client
            .request(method, url)
            .timeout(self.timeout)
            .header("X-API-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", format!("paylio-rust/{}", VERSION))
            .header("X-SDK-Source", SDK_SOURCE);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::error!("Request timed out: {}", e);
                ApiError::connection("Request timed out")
            } else {
                tracing::error!("Failed to send request: {}", e);
                ApiError::connection(format!("Connection error: {}", e))
            }
        })?;

        RawResponse::read(resp).await?.into_result()
    }

    /// `GET` with optional query parameters.
    pub async fn get(
        &self,
        path: &str,
        params: Option<&BTreeMap<String, String>>,
    ) -> Result<JsonObject, ApiError> {
        self.request::<()>(Method::GET, path, params, None).await
    }

    /// `POST` with a JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<JsonObject, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, None, Some(body)).await
    }

    /// Drops this client's handle on the connection pool. Idle connections
    /// are released once in-flight requests holding the pool finish.
    /// Calling it again is a no-op.
    ///
    /// A `reqwest::Client` passed in by the caller shares its pool with the
    /// caller's clones, so closing releases nothing while those clones live;
    /// they stay usable. Requests through this transport fail with a
    /// connection error from then on.
    pub fn close(&self) {
        let mut client = self.client.write().unwrap_or_else(PoisonError::into_inner);
        if client.take().is_some() {
            tracing::debug!("HTTP client closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn pool(&self) -> Result<reqwest::Client, ApiError> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ApiError::connection("Client has been closed"))
    }

    fn build_url(
        &self,
        path: &str,
        params: Option<&BTreeMap<String, String>>,
    ) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            ApiError::connection(format!("failed to parse URL: {}", e))
        })?;

        if let Some(params) = params {
            let mut query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
            query.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
            if query.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(&query);
            }
        }
        Ok(url)
    }
}

/// A fully read HTTP response, before classification.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Reads the whole body. Failing to read it is a connection error even
    /// though a status line was received.
    pub async fn read(resp: reqwest::Response) -> Result<Self, ApiError> {
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            ApiError::connection(format!("failed to read response body: {}", e))
        })?;
        Ok(Self {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    /// Returns the JSON object of a 2xx response, or the classified error.
    pub fn into_result(self) -> Result<JsonObject, ApiError> {
        let json_body = serde_json::from_str::<JsonObject>(&self.body).ok();

        if (200..300).contains(&self.status) {
            return match json_body {
                Some(json) => Ok(json),
                None => {
                    tracing::error!("Status {} with non-JSON body", self.status);
                    Err(ApiError::api(ErrorDetails {
                        message: "Invalid JSON in response body".to_string(),
                        http_status: self.status,
                        http_body: self.body,
                        headers: self.headers,
                        ..ErrorDetails::default()
                    }))
                }
            };
        }

        let (message, code) = error_fields(json_body.as_ref());
        let message = message.unwrap_or_else(|| self.body.clone());
        let err = ApiError::for_status(
            self.status,
            ErrorDetails {
                message,
                http_status: self.status,
                http_body: self.body,
                json_body,
                headers: self.headers,
                code,
            },
        );
        tracing::warn!(
            status = err.http_status(),
            kind = %err.kind(),
            code = err.code().unwrap_or(""),
            "Request failed: {}",
            err.message()
        );
        Err(err)
    }
}

/// Pulls `(message, code)` out of the error shapes the API is known to send:
/// `{"error": {"code", "message"}}`, `{"error": "..."}` and `{"detail": "..."}`.
/// Non-string values are ignored.
fn error_fields(json: Option<&JsonObject>) -> (Option<String>, Option<String>) {
    let Some(json) = json else {
        return (None, None);
    };
    match json.get("error") {
        Some(Value::Object(error)) => (
            error.get("message").and_then(Value::as_str).map(str::to_owned),
            error.get("code").and_then(Value::as_str).map(str::to_owned),
        ),
        Some(Value::String(message)) => (Some(message.clone()), None),
        Some(_) => (None, None),
        None => (
            json.get("detail").and_then(Value::as_str).map(str::to_owned),
            None,
        ),
    }
}
