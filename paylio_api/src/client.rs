//! Entry point for the Paylio SDK.

use std::time::Duration;

use crate::{
    errors::{ApiError, ErrorDetails},
    http::{HttpClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT},
    subscription::SubscriptionService,
    Error,
};

/// Client for the Paylio API.
///
/// Holds an immutable configuration and a shared connection pool. Requests
/// may be issued concurrently from many tasks through `&Client`.
pub struct Client {
    http: HttpClient,
}

impl Client {
    /// Creates a client for the production API with the default timeout.
    ///
    /// Returns an authentication error if `api_key` is empty.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Self::builder(api_key).build()
    }

    /// Starts a builder for a client with custom settings.
    pub fn builder(api_key: &str) -> ClientBuilder {
        ClientBuilder {
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http_client: None,
        }
    }

    /// Subscription operations.
    pub fn subscription(&self) -> SubscriptionService<'_> {
        SubscriptionService { http: &self.http }
    }

    /// The underlying transport, for endpoints without a typed wrapper.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Releases pooled connections. Safe to call more than once. Has no
    /// effect on a pool shared with a client passed to
    /// [`ClientBuilder::http_client`]. See [`HttpClient::close`].
    pub fn close(&self) {
        self.http.close();
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Overrides the API base URL. Used for testing with wiremock.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses an existing `reqwest::Client` and its connection pool. The pool
    /// stays owned by the caller's clones; [`Client::close`] does not tear it
    /// down.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        if self.api_key.is_empty() {
            return Err(ApiError::authentication(ErrorDetails::new(
                "No API key provided. Set your API key when creating the client: \
                 paylio_api::Client::new(\"sk_live_xxx\")",
            ))
            .into());
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                ApiError::connection(format!("failed to build HTTP client: {}", e))
            })?,
        };

        Ok(Client {
            http: HttpClient::new(self.api_key, &self.base_url, self.timeout, http_client),
        })
    }
}
