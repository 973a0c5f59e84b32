//! Session record as returned by a credential source.

use serde::{Deserialize, Serialize};

/// One stored credential entry.
///
/// Owned by the credential source. The resolver only reads it, and only for
/// the lifetime of a single query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub name: String,
    pub host: String,
    pub username: String,
    pub password: String,
    pub tags: Vec<String>,
    /// Vault identifier the record was read from.
    pub vault_id: String,
    pub vault_name: String,
    pub tenant: String,
    pub item_id: String,
    pub item_name: String,
    /// `op://<vault>/<item>` reference.
    pub session_uri: String,
    /// Base32 TOTP secret (or otpauth URI) when the item has a one-time password.
    pub totp_secret: String,
    /// Current one-time code, filled in at query time.
    pub totp: String,
}

impl SessionRecord {
    /// Create a record with the four fields every session carries.
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Set the tags.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the vault id and display name.
    pub fn with_vault(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.vault_id = id.into();
        self.vault_name = name.into();
        self
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }

    /// Whether this record lives in `vault` (matched by id or by name).
    pub fn in_vault(&self, vault: &str) -> bool {
        self.vault_id == vault || self.vault_name.eq_ignore_ascii_case(vault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_helpers() {
        let record = SessionRecord::new("prod", "https://prod.example.com", "admin", "pw")
            .with_tags(["c8y", "prod"])
            .with_vault("abc", "Employee");

        assert_eq!(record.tags, vec!["c8y", "prod"]);
        assert_eq!(record.vault_id, "abc");
        assert_eq!(record.vault_name, "Employee");
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let record = SessionRecord::new("a", "b", "c", "d").with_tags(["C8Y", "Shared"]);

        assert!(record.has_tag("c8y"));
        assert!(record.has_tag("SHARED"));
        assert!(!record.has_tag("c8"));
    }

    #[test]
    fn test_in_vault_by_id_or_name() {
        let record = SessionRecord::new("a", "b", "c", "d").with_vault("vlt123", "Employee");

        assert!(record.in_vault("vlt123"));
        assert!(record.in_vault("employee"));
        assert!(!record.in_vault("Private"));
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let record: SessionRecord = serde_json::from_str(
            r#"{"name":"sap-apm-gf","host":"https://sap.example.com","username":"u","password":"p","vaultId":"v1","tags":["c8y"]}"#,
        )
        .unwrap();

        assert_eq!(record.name, "sap-apm-gf");
        assert_eq!(record.vault_id, "v1");
        assert!(record.tenant.is_empty());
    }
}
