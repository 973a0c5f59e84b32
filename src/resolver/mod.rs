//! Query resolution.
//!
//! [`Resolver`] turns one decoded [`Request`] into exactly one [`Response`].
//! Backend failures never escape: they become error responses (or a failed
//! auth result for the probe) so the host loop keeps running.

mod filter;

pub use filter::{filter_by_search, filter_by_tags};

use crate::message::{Query, Request, Response, RevealPolicy};
use crate::source::{CredentialSource, SessionRecord};
use crate::totp;

/// Resolves requests against a [`CredentialSource`].
pub struct Resolver<S> {
    source: S,
    default_vaults: Vec<String>,
}

impl<S: CredentialSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            default_vaults: Vec::new(),
        }
    }

    /// Vaults searched when a query names none.
    pub fn with_default_vaults(mut self, vaults: Vec<String>) -> Self {
        self.default_vaults = vaults;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn default_vaults(&self) -> &[String] {
        &self.default_vaults
    }

    /// Resolve one request.
    pub async fn resolve(&self, request: Request) -> Response {
        match request {
            Request::AuthProbe => self.check_auth().await,
            Request::Query(query) => self.query(query).await,
        }
    }

    async fn check_auth(&self) -> Response {
        match self.source.check_auth().await {
            Ok(success) => {
                tracing::debug!("Authentication probe: {}", success);
                Response::auth(success)
            }
            Err(e) => {
                tracing::warn!("Authentication probe failed: {}", e);
                Response::auth(false)
            }
        }
    }

    async fn query(&self, query: Query) -> Response {
        let vaults = if query.vaults.is_empty() {
            &self.default_vaults
        } else {
            &query.vaults
        };

        let candidates = match self.source.fetch_sessions(vaults).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Failed to fetch sessions: {}", e);
                return Response::error(e.to_string());
            }
        };
        tracing::debug!("Fetched {} candidate sessions", candidates.len());

        let tagged = filter_by_tags(candidates, &query.tags);
        if tagged.is_empty() {
            return Response::error(format!(
                "no sessions found matching vaults: {} and tags: {}",
                display_list(vaults),
                display_list(&query.tags)
            ));
        }

        let mut matched = filter_by_search(tagged, &query.search);
        tracing::debug!("{} sessions matched search {:?}", matched.len(), query.search);
        fill_totp_codes(&mut matched);

        Response::from_matches(&matched, RevealPolicy::from_flag(query.reveal), || {
            format!("no sessions found matching filter: {}", query.search)
        })
    }
}

/// Generate the current code for every record with a TOTP secret.
///
/// A bad secret leaves the code empty; the session is still returned.
fn fill_totp_codes(records: &mut [SessionRecord]) {
    for record in records.iter_mut().filter(|r| !r.totp_secret.is_empty()) {
        match totp::current_code(&record.totp_secret) {
            Ok(code) => record.totp = code,
            Err(e) => tracing::warn!("No TOTP code for {}: {}", record.name, e),
        }
    }
}

/// `[a b c]`
fn display_list(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MASK_TOKEN;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new(vec![
            SessionRecord::new("sap-apm-gf", "https://sap.example.com", "admin", "s3cret")
                .with_tags(["c8y"])
                .with_vault("v1", "Employee"),
            SessionRecord::new("dtm-test-1", "https://dtm1.example.com", "u1", "p1")
                .with_tags(["c8y", "dtm"])
                .with_vault("v1", "Employee"),
            SessionRecord::new("dtm-test-2", "https://dtm2.example.com", "u2", "p2")
                .with_tags(["c8y", "dtm"])
                .with_vault("v2", "Shared"),
        ])
    }

    fn query(search: &str) -> Request {
        Request::Query(Query::new(search).with_tags(["c8y"]))
    }

    #[tokio::test]
    async fn test_single_match_masked() {
        let response = Resolver::new(source()).resolve(query("sap-apm-gf")).await;

        let Response::Single(view) = response else {
            panic!("expected single session, got {:?}", response);
        };
        assert_eq!(view.name, "sap-apm-gf");
        assert_eq!(view.password, MASK_TOKEN);
    }

    #[tokio::test]
    async fn test_single_match_revealed() {
        let request = Request::Query(Query::new("sap-apm-gf").with_tags(["c8y"]).with_reveal(true));
        let response = Resolver::new(source()).resolve(request).await;

        let Response::Single(view) = response else {
            panic!("expected single session, got {:?}", response);
        };
        assert_eq!(view.password, "s3cret");
    }

    #[tokio::test]
    async fn test_multiple_matches_in_source_order() {
        let response = Resolver::new(source()).resolve(query("dtm-test")).await;

        let Response::List(views) = response else {
            panic!("expected list, got {:?}", response);
        };
        let names: Vec<_> = views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["dtm-test-1", "dtm-test-2"]);
        assert!(views.iter().all(|v| v.password == MASK_TOKEN));
    }

    #[tokio::test]
    async fn test_no_search_match() {
        let response = Resolver::new(source()).resolve(query("does-not-exist")).await;
        assert_eq!(
            response,
            Response::error("no sessions found matching filter: does-not-exist")
        );
    }

    #[tokio::test]
    async fn test_no_tag_match() {
        let request = Request::Query(Query::new("").with_tags(["c8y", "prod"]));
        let response = Resolver::new(source()).resolve(request).await;
        assert_eq!(
            response,
            Response::error("no sessions found matching vaults: [] and tags: [c8y prod]")
        );
    }

    #[tokio::test]
    async fn test_query_vaults_restrict_candidates() {
        let request = Request::Query(Query::new("dtm").with_vaults(["Shared"]));
        let response = Resolver::new(source()).resolve(request).await;

        let Response::Single(view) = response else {
            panic!("expected single session, got {:?}", response);
        };
        assert_eq!(view.name, "dtm-test-2");
    }

    #[tokio::test]
    async fn test_default_vaults_apply_when_query_has_none() {
        let resolver = Resolver::new(source()).with_default_vaults(vec!["v2".to_string()]);

        let response = resolver.resolve(query("dtm")).await;
        assert!(matches!(response, Response::Single(ref view) if view.name == "dtm-test-2"));

        let request = Request::Query(Query::new("dtm").with_vaults(["v1"]));
        let response = resolver.resolve(request).await;
        assert!(matches!(response, Response::Single(ref view) if view.name == "dtm-test-1"));
    }

    #[tokio::test]
    async fn test_auth_probe() {
        assert_eq!(Resolver::new(source()).resolve(Request::AuthProbe).await, Response::auth(true));

        let signed_out = source().with_authenticated(false);
        assert_eq!(Resolver::new(signed_out).resolve(Request::AuthProbe).await, Response::auth(false));
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let resolver = Resolver::new(source().unavailable("could not find 'op'"));

        assert_eq!(resolver.resolve(query("x")).await, Response::error("could not find 'op'"));
        assert_eq!(resolver.resolve(Request::AuthProbe).await, Response::auth(false));
    }

    fn with_totp(secret: &str) -> MemorySource {
        let mut record = SessionRecord::new("mfa", "https://mfa.example.com", "admin", "pw").with_tags(["c8y"]);
        record.totp_secret = secret.to_string();
        MemorySource::new(vec![record])
    }

    #[tokio::test]
    async fn test_totp_code_generated_and_revealed() {
        let request = Request::Query(Query::new("mfa").with_tags(["c8y"]).with_reveal(true));
        let response = Resolver::new(with_totp("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")).resolve(request).await;

        let Response::Single(view) = response else {
            panic!("expected single session, got {:?}", response);
        };
        assert_eq!(view.totp.len(), 6);
        assert!(view.totp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(view.totp_secret, "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ");
    }

    #[tokio::test]
    async fn test_totp_masked_by_default() {
        let response = Resolver::new(with_totp("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ")).resolve(query("mfa")).await;

        let Response::Single(view) = response else {
            panic!("expected single session, got {:?}", response);
        };
        assert_eq!(view.totp, MASK_TOKEN);
        assert_eq!(view.totp_secret, MASK_TOKEN);
    }

    #[tokio::test]
    async fn test_invalid_totp_secret_still_returns_session() {
        let request = Request::Query(Query::new("mfa").with_reveal(true));
        let response = Resolver::new(with_totp("not base32!")).resolve(request).await;

        let Response::Single(view) = response else {
            panic!("expected single session, got {:?}", response);
        };
        assert_eq!(view.password, "pw");
        assert!(view.totp.is_empty());
    }

    #[test]
    fn test_display_list() {
        assert_eq!(display_list(&[]), "[]");
        assert_eq!(display_list(&["a".to_string(), "b".to_string()]), "[a b]");
    }
}
