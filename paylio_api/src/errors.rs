//! Error types for the API client.
//!
//! Every failure that comes out of the transport core is an [`ApiError`]: one
//! shared record ([`ErrorDetails`]) tagged with an [`ErrorKind`]. Callers can
//! branch on the kind or treat all of them through the shared details.

use std::fmt;

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::decode::DecodeError;

/// The closed set of API error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Server error, unmapped status, or a 2xx response that was not JSON.
    Api,
    /// Invalid or missing API key (HTTP 401).
    Authentication,
    /// Bad request parameters (HTTP 400).
    InvalidRequest,
    /// Resource not found (HTTP 404).
    NotFound,
    /// Rate limit exceeded (HTTP 429).
    RateLimit,
    /// No usable HTTP exchange happened: DNS, refused connection, timeout,
    /// body read or request serialization failure.
    Connection,
}

impl ErrorKind {
    /// Maps a non-2xx HTTP status to its error kind.
    pub fn for_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Authentication,
            400 => ErrorKind::InvalidRequest,
            404 => ErrorKind::NotFound,
            429 => ErrorKind::RateLimit,
            _ => ErrorKind::Api,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Api => "APIError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::InvalidRequest => "InvalidRequestError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::RateLimit => "RateLimitError",
            ErrorKind::Connection => "ConnectionError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context shared by every [`ApiError`] kind.
#[derive(Debug, Clone, Default)]
pub struct ErrorDetails {
    /// Human-readable message, server supplied when available.
    pub message: String,
    /// HTTP status, `0` when no HTTP exchange occurred.
    pub http_status: u16,
    /// Raw response body text.
    pub http_body: String,
    /// Response body parsed as a JSON object, if it was one.
    pub json_body: Option<Map<String, Value>>,
    /// Response headers.
    pub headers: HeaderMap,
    /// Machine-readable error code from `error.code`.
    pub code: Option<String>,
}

impl ErrorDetails {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// An error returned by the transport core. Displays as its message.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{}", .details.message)]
pub struct ApiError {
    kind: ErrorKind,
    details: ErrorDetails,
}

impl ApiError {
    pub fn new(kind: ErrorKind, details: ErrorDetails) -> Self {
        Self { kind, details }
    }

    /// Builds the error for a non-2xx response.
    pub fn for_status(status: u16, details: ErrorDetails) -> Self {
        Self::new(ErrorKind::for_status(status), details)
    }

    pub fn api(details: ErrorDetails) -> Self {
        Self::new(ErrorKind::Api, details)
    }

    pub fn authentication(details: ErrorDetails) -> Self {
        Self::new(ErrorKind::Authentication, details)
    }

    pub fn invalid_request(details: ErrorDetails) -> Self {
        Self::new(ErrorKind::InvalidRequest, details)
    }

    pub fn not_found(details: ErrorDetails) -> Self {
        Self::new(ErrorKind::NotFound, details)
    }

    pub fn rate_limit(details: ErrorDetails) -> Self {
        Self::new(ErrorKind::RateLimit, details)
    }

    /// A failure with no HTTP exchange behind it; status is `0`.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, ErrorDetails::new(message))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn into_details(self) -> ErrorDetails {
        self.details
    }

    pub fn message(&self) -> &str {
        &self.details.message
    }

    pub fn http_status(&self) -> u16 {
        self.details.http_status
    }

    pub fn code(&self) -> Option<&str> {
        self.details.code.as_deref()
    }
}

/// Errors returned by the client and its services.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request failed in the transport core or the server rejected it.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A successful response could not be shaped into the expected type.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A required argument was blank; no request was sent.
    #[error("{0} is required")]
    InvalidArgument(&'static str),
}

impl Error {
    /// The API error kind, if this error came from the transport core.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
