//! Value encodings.
//!
//! Fixed-shape records (props, outputs, inputs, authors) are bincode.
//! Unit content and address definitions carry free-form JSON and are
//! stored as JSON.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(serde_json::from_slice(bytes)?)
}
