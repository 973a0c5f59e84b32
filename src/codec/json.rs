//! JSON codec using `serde_json`.
//!
//! Native messaging payloads are UTF-8 JSON. Encoding is compact (no
//! pretty-printing) so the length prefix matches exactly what is written.
//!
//! # Example
//!
//! ```
//! use c8y_session_host::codec::JsonCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Probe {
//!     r#type: String,
//! }
//!
//! let msg = Probe { r#type: "test_auth".to_string() };
//! let encoded = JsonCodec::encode(&msg).unwrap();
//! assert_eq!(encoded, br#"{"type":"test_auth"}"#);
//! let decoded: Probe = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use crate::error::Result;

/// JSON codec for frame payloads.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not valid JSON for type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode JSON bytes into an untyped value.
    #[inline]
    pub fn decode_value(bytes: &[u8]) -> Result<serde_json::Value> {
        Self::decode(bytes)
    }
}
