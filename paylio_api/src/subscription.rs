//! Subscription endpoints.

use std::collections::BTreeMap;

use serde_json::json;

use crate::{
    decode::from_mapping,
    http::HttpClient,
    types::{PaginatedList, Subscription, SubscriptionCancel, SubscriptionHistoryItem},
    Error,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Pagination for [`SubscriptionService::list`]. Non-positive values use the
/// defaults (page 1, 20 per page).
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub page: i64,
    pub page_size: i64,
}

/// Cancellation behaviour for [`SubscriptionService::cancel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelOptions {
    /// Cancel immediately instead of at the end of the billing period.
    pub cancel_now: bool,
}

/// Subscription operations, obtained from [`crate::Client::subscription`].
pub struct SubscriptionService<'a> {
    pub(crate) http: &'a HttpClient,
}

impl SubscriptionService<'_> {
    /// Fetches the current subscription for a user.
    pub async fn retrieve(&self, user_id: &str) -> Result<Subscription, Error> {
        require("user_id", user_id)?;
        let data = self
            .http
            .get(&format!("/subscription/{}", user_id), None)
            .await?;
        Ok(from_mapping(&data)?)
    }

    /// Fetches one page of a user's subscription history.
    pub async fn list(
        &self,
        user_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<PaginatedList<SubscriptionHistoryItem>, Error> {
        require("user_id", user_id)?;
        let opts = opts.unwrap_or_default();
        let page = if opts.page > 0 { opts.page } else { DEFAULT_PAGE };
        let page_size = if opts.page_size > 0 {
            opts.page_size
        } else {
            DEFAULT_PAGE_SIZE
        };

        let params = BTreeMap::from([
            ("page".to_string(), page.to_string()),
            ("page_size".to_string(), page_size.to_string()),
        ]);
        let data = self
            .http
            .get(&format!("/users/{}/subscriptions", user_id), Some(&params))
            .await?;
        Ok(from_mapping(&data)?)
    }

    /// Cancels a subscription, by default at the end of the billing period.
    pub async fn cancel(
        &self,
        subscription_id: &str,
        opts: Option<CancelOptions>,
    ) -> Result<SubscriptionCancel, Error> {
        require("subscription_id", subscription_id)?;
        let cancel_now = opts.map(|o| o.cancel_now).unwrap_or(false);
        let body = json!({ "cancel_at_period_end": !cancel_now });
        let data = self
            .http
            .post(&format!("/subscription/{}/cancel", subscription_id), &body)
            .await?;
        Ok(from_mapping(&data)?)
    }
}

fn require(name: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(name));
    }
    Ok(())
}
