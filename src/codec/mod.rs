//! Codec module - payload serialization.
//!
//! Native messaging payloads are always JSON, so a single codec is provided:
//! - [`JsonCodec`] - compact `serde_json` encoding for requests and responses

mod json;

pub use json::JsonCodec;
