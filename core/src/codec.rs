//! JSON encoding and decoding for request and response bodies.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::status::Outcome;

pub fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Decode a single entity. A 204 carries nothing to decode.
pub fn decode_one<T: DeserializeOwned>(outcome: Outcome) -> Result<T, ApiError> {
    match outcome {
        Outcome::Body(body) => decode(&body),
        Outcome::NoContent => Err(ApiError::Deserialization(
            "expected a body, got 204 No Content".to_string(),
        )),
    }
}

/// Decode a list. An accepted 204 is the same as `[]`; a blank 200 body is
/// malformed.
pub fn decode_list<T: DeserializeOwned>(outcome: Outcome) -> Result<Vec<T>, ApiError> {
    match outcome {
        Outcome::Body(body) => decode(&body),
        Outcome::NoContent => Ok(Vec::new()),
    }
}

/// Deserialize a nullable field, treating `null` and `""` as absent.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(de::Error::custom),
    }
}

/// Deserialize a required field, treating `null` as the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
