use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A subscription plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Billing interval, e.g. `month` or `year`.
    #[serde(deserialize_with = "null_as_default")]
    pub interval: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
}

/// A time period bounded by two RFC 3339 timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    #[serde(deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end: String,
}

/// A user's current subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plan: Plan,
    #[serde(deserialize_with = "null_as_default")]
    pub subscription_period: Period,
    #[serde(deserialize_with = "null_as_default")]
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<String>,
    /// Payment provider that owns the subscription, e.g. `stripe`.
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
}

/// Result of cancelling a subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionCancel {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub cancel_at_period_end: bool,
}

/// One entry in a user's subscription history. Plan fields are flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionHistoryItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plan_slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plan_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plan_amount: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub plan_currency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub plan_interval: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_period_start: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_period_end: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
}
