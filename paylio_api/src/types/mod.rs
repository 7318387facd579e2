use serde::{Deserialize, Deserializer};

mod meta;
pub use self::meta::{has_more, PaginatedList};

mod subscription;
pub use self::subscription::{
    Period, Plan, Subscription, SubscriptionCancel, SubscriptionHistoryItem,
};

/// Reads a JSON `null` as the field's zero value, the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
