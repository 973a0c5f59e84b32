//! In-memory credential source.
//!
//! Serves a fixed snapshot of records. Used by tests and, through
//! `C8YOP_SESSIONS_FILE`, to run the host without a vault.

use std::path::Path;

use super::{BoxFuture, CredentialSource, SessionRecord};
use crate::error::{HostError, Result};

/// Credential source backed by a `Vec<SessionRecord>`.
#[derive(Debug, Clone)]
pub struct MemorySource {
    records: Vec<SessionRecord>,
    authenticated: bool,
    unavailable: Option<String>,
}

impl MemorySource {
    /// Create a signed-in source serving `records` in insertion order.
    pub fn new(records: Vec<SessionRecord>) -> Self {
        Self {
            records,
            authenticated: true,
            unavailable: None,
        }
    }

    /// Load records from a JSON array file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let records: Vec<SessionRecord> = serde_json::from_slice(&data)?;
        tracing::debug!("Loaded {} sessions from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    /// Set what `check_auth` reports.
    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Make every call fail with `message`, as an unreachable backend would.
    pub fn unavailable(mut self, message: impl Into<String>) -> Self {
        self.unavailable = Some(message.into());
        self
    }

    /// Records held by this source.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    fn select(&self, vaults: &[String]) -> Result<Vec<SessionRecord>> {
        if let Some(message) = &self.unavailable {
            return Err(HostError::Backend(message.clone()));
        }

        if vaults.is_empty() {
            return Ok(self.records.clone());
        }

        Ok(self
            .records
            .iter()
            .filter(|record| vaults.iter().any(|vault| record.in_vault(vault)))
            .cloned()
            .collect())
    }
}

impl CredentialSource for MemorySource {
    fn fetch_sessions<'a>(&'a self, vaults: &'a [String]) -> BoxFuture<'a, Result<Vec<SessionRecord>>> {
        let result = self.select(vaults);
        Box::pin(async move { result })
    }

    fn check_auth(&self) -> BoxFuture<'_, Result<bool>> {
        let result = match &self.unavailable {
            Some(message) => Err(HostError::Backend(message.clone())),
            None => Ok(self.authenticated),
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> MemorySource {
        MemorySource::new(vec![
            SessionRecord::new("one", "https://one.example.com", "u1", "p1").with_vault("v1", "Employee"),
            SessionRecord::new("two", "https://two.example.com", "u2", "p2").with_vault("v2", "Shared"),
            SessionRecord::new("three", "https://three.example.com", "u3", "p3").with_vault("v1", "Employee"),
        ])
    }

    #[tokio::test]
    async fn test_fetch_all_in_order() {
        let sessions = sample().fetch_sessions(&[]).await.unwrap();
        let names: Vec<_> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_fetch_by_vault_id_and_name() {
        let source = sample();

        let by_id = source.fetch_sessions(&["v2".to_string()]).await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name, "two");

        let by_name = source.fetch_sessions(&["employee".to_string()]).await.unwrap();
        assert_eq!(by_name.len(), 2);
    }

    #[tokio::test]
    async fn test_check_auth_flag() {
        assert!(sample().check_auth().await.unwrap());
        assert!(!sample().with_authenticated(false).check_auth().await.unwrap());
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let source = sample().unavailable("not signed in to 1Password");

        let err = source.fetch_sessions(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "not signed in to 1Password");
        assert!(source.check_auth().await.is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"dtm-test-1","host":"https://a","username":"u","password":"p","tags":["c8y"]}}]"#
        )
        .unwrap();

        let source = MemorySource::from_json_file(file.path()).unwrap();
        assert_eq!(source.records().len(), 1);
        assert_eq!(source.records()[0].tags, vec!["c8y"]);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = MemorySource::from_json_file("/nonexistent/sessions.json").unwrap_err();
        assert!(matches!(err, HostError::Io(_)));
    }
}
