//! Shaping untyped response mappings into typed resources.

use serde::{de::DeserializeOwned, Serialize};

/// Failure while converting a mapping into a typed shape.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The mapping could not be written out as JSON.
    #[error("failed to marshal response: {0}")]
    Encode(#[source] serde_json::Error),
    /// The JSON did not fit the target shape.
    #[error("failed to unmarshal response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Converts a mapping into `T` by round-tripping it through JSON text, so
/// the target's serde attributes (renames, defaults, nested shapes) apply
/// exactly as they would to a raw response body.
pub fn from_mapping<T, M>(data: &M) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
    M: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(data).map_err(DecodeError::Encode)?;
    serde_json::from_slice(&bytes).map_err(DecodeError::Decode)
}
