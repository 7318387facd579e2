//! Client library for the Paylio subscription API.
//!
//! Retrieve a user's subscription, page through subscription history and
//! cancel subscriptions. Every request goes through one transport core,
//! [`HttpClient`], which classifies failures into [`ApiError`] kinds.

mod client;
pub mod decode;
mod errors;
pub mod http;
mod subscription;
pub mod types;
pub use self::client::{Client, ClientBuilder};
pub use self::decode::{from_mapping, DecodeError};
pub use self::errors::{ApiError, Error, ErrorDetails, ErrorKind};
pub use self::http::{HttpClient, JsonObject, RawResponse, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, VERSION};
pub use self::subscription::{CancelOptions, ListOptions, SubscriptionService};
