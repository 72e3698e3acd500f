//! Transport codec: JSON wrapped in standard base64
//!
//! Every request body and every response `data` field goes through this pair.

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{de::DeserializeOwned, Serialize};

/// Serialize `value` to JSON and base64-encode the bytes
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(BASE64.encode(json))
}

/// Base64-decode `encoded` and parse the JSON inside
pub fn decode<T: DeserializeOwned>(encoded: &str) -> Result<T> {
    let bytes = BASE64.decode(encoded.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}
