//! Inbound request decoding.
//!
//! A payload is either the authentication probe `{"type":"test_auth"}` or a
//! session query. Missing query fields default to empty; anything that is not
//! a JSON object, has mistyped fields, or names an unknown `type` is rejected.

use serde::Deserialize;

use crate::codec::JsonCodec;
use crate::error::{HostError, Result};

/// Control token identifying the authentication probe.
pub const TEST_AUTH_TYPE: &str = "test_auth";

/// A session query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Vaults to search; empty means every vault visible to the host.
    pub vaults: Vec<String>,
    /// Tags a session must all carry.
    pub tags: Vec<String>,
    /// Case-insensitive substring term; empty matches everything.
    pub search: String,
    /// Emit real passwords instead of the mask.
    pub reveal: bool,
}

impl Query {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    pub fn with_vaults<I, T>(mut self, vaults: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.vaults = dedup(vaults.into_iter().map(Into::into));
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = dedup(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_reveal(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `{"type":"test_auth"}`
    AuthProbe,
    /// Session lookup.
    Query(Query),
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    vaults: Option<Vec<String>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    reveal: Option<bool>,
}

impl Request {
    /// Decode a frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Decode`] for invalid JSON, non-object payloads,
    /// mistyped fields, and unknown request types.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.is_empty() {
            return Err(HostError::Decode("empty message".to_string()));
        }

        let value = JsonCodec::decode_value(payload)
            .map_err(|e| HostError::Decode(format!("Invalid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(HostError::Decode("expected a JSON object".to_string()));
        }
        let raw: RawRequest = serde_json::from_value(value)
            .map_err(|e| HostError::Decode(format!("Invalid JSON: {}", e)))?;

        match raw.kind.as_deref() {
            Some(TEST_AUTH_TYPE) => return Ok(Request::AuthProbe),
            Some(other) if !other.is_empty() => {
                return Err(HostError::Decode(format!("unsupported request type: {}", other)));
            }
            _ => {}
        }

        let query = Query::new(raw.search.unwrap_or_default())
            .with_vaults(raw.vaults.unwrap_or_default())
            .with_tags(raw.tags.unwrap_or_default())
            .with_reveal(raw.reveal.unwrap_or(false));
        Ok(Request::Query(query))
    }
}

/// Drop exact duplicates, keeping first-seen order.
fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
