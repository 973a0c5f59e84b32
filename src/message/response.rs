//! Outbound response shapes.
//!
//! [`Response`] serializes untagged, so each variant produces exactly the
//! JSON shape the browser side expects.

use serde::Serialize;

use crate::codec::JsonCodec;
use crate::error::Result;
use crate::source::SessionRecord;

/// Replacement emitted for a password when reveal is off.
pub const MASK_TOKEN: &str = "***";

/// Whether session passwords leave the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPolicy {
    #[default]
    Mask,
    Reveal,
}

impl RevealPolicy {
    pub fn from_flag(reveal: bool) -> Self {
        if reveal {
            RevealPolicy::Reveal
        } else {
            RevealPolicy::Mask
        }
    }

    /// Apply the policy to a password. Empty passwords are masked too, so a
    /// masked response never tells whether a password exists.
    pub fn apply(self, password: &str) -> String {
        match self {
            RevealPolicy::Reveal => password.to_string(),
            RevealPolicy::Mask => MASK_TOKEN.to_string(),
        }
    }

    /// Like [`RevealPolicy::apply`], but an empty value stays empty so the
    /// field is left out of the response.
    pub fn apply_optional(self, value: &str) -> String {
        if value.is_empty() {
            String::new()
        } else {
            self.apply(value)
        }
    }
}

/// A session as written to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tenant: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vault_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vault_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub session_uri: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub totp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub totp_secret: String,
}

impl SessionView {
    /// Project a record, masking or disclosing its secrets per `policy`.
    pub fn from_record(record: &SessionRecord, policy: RevealPolicy) -> Self {
        Self {
            name: record.name.clone(),
            host: record.host.clone(),
            username: record.username.clone(),
            password: policy.apply(&record.password),
            tenant: record.tenant.clone(),
            tags: record.tags.clone(),
            vault_id: record.vault_id.clone(),
            vault_name: record.vault_name.clone(),
            item_id: record.item_id.clone(),
            item_name: record.item_name.clone(),
            session_uri: record.session_uri.clone(),
            totp: policy.apply_optional(&record.totp),
            totp_secret: policy.apply_optional(&record.totp_secret),
        }
    }
}

/// One response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// `{"success": bool}`
    Auth { success: bool },
    /// A single session object.
    Single(SessionView),
    /// An array of two or more session objects.
    List(Vec<SessionView>),
    /// `{"error": "..."}`
    Error { error: String },
}

impl Response {
    pub fn auth(success: bool) -> Self {
        Response::Auth { success }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    /// Shape matched records: one record gives [`Response::Single`], more give
    /// [`Response::List`], none gives an error carrying `empty_message`.
    pub fn from_matches(
        records: &[SessionRecord],
        policy: RevealPolicy,
        empty_message: impl FnOnce() -> String,
    ) -> Self {
        match records {
            [] => Response::error(empty_message()),
            [only] => Response::Single(SessionView::from_record(only, policy)),
            many => Response::List(
                many.iter()
                    .map(|record| SessionView::from_record(record, policy))
                    .collect(),
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Serialize to a JSON payload.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        JsonCodec::encode(self)
    }
}
