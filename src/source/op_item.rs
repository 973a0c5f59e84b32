//! 1Password item model and item → session mapping.
//!
//! An item becomes one session per URL it carries. URLs come from the
//! `urls` array first, then from URL-typed fields (or fields labelled
//! `website`/`url`); primary URLs sort to the front.

use std::collections::HashMap;

use serde::Deserialize;

use super::SessionRecord;

/// Vault reference embedded in an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpVault {
    pub id: String,
    pub name: String,
}

/// URL entry of an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpUrl {
    pub label: String,
    pub primary: bool,
    pub href: String,
}

/// `totp` member of an OTP field: the secret details, or just the current code.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OpTotp {
    Details { secret: String },
    Code(String),
}

/// Field of an item (username, password, custom fields).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub value: String,
    pub totp: Option<OpTotp>,
}

/// Item as printed by `op item get --format json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub vault: OpVault,
    pub fields: Vec<OpField>,
    pub urls: Vec<OpUrl>,
    pub tags: Vec<String>,
}

struct UrlSource<'a> {
    href: &'a str,
    label: &'a str,
    primary: bool,
}

#[derive(Default)]
struct Credentials {
    username: String,
    password: String,
    tenant: String,
    totp_secret: String,
}

impl OpField {
    /// TOTP secret of an OTP field. Falls back to the field value, which
    /// `op` prints as an otpauth URI.
    fn otp_secret(&self) -> Option<&str> {
        if !self.kind.eq_ignore_ascii_case("OTP") {
            return None;
        }
        let secret = match &self.totp {
            Some(OpTotp::Details { secret }) if !secret.trim().is_empty() => secret.as_str(),
            _ => self.value.as_str(),
        };
        (!secret.trim().is_empty()).then_some(secret)
    }

    fn is_url(&self) -> bool {
        if self.value.trim().is_empty() {
            return false;
        }
        let label = self.label.to_lowercase();
        label == "website" || label == "url" || self.kind.eq_ignore_ascii_case("URL")
    }
}

impl OpItem {
    /// Items that cannot produce a session: non-logins and logins without a URL.
    pub fn skip(&self) -> bool {
        if self.category != "LOGIN" {
            tracing::debug!("Item {} skipped: category {} is not LOGIN", self.id, self.category);
            return true;
        }
        if self.urls.is_empty() && !self.fields.iter().any(OpField::is_url) {
            tracing::debug!("Item {} skipped: no URLs found", self.id);
            return true;
        }
        false
    }

    fn credentials(&self) -> Credentials {
        let mut creds = Credentials::default();

        for field in &self.fields {
            match field.id.as_str() {
                "username" => creds.username = field.value.clone(),
                "password" => creds.password = field.value.clone(),
                _ => {}
            }
            if creds.tenant.is_empty() && field.label.to_lowercase().starts_with("tenant") {
                creds.tenant = field.value.clone();
            }
            if creds.totp_secret.is_empty() {
                if let Some(secret) = field.otp_secret() {
                    creds.totp_secret = secret.to_string();
                }
            }
        }

        // "tenant/user" logins carry the tenant in the username
        if let Some((tenant, user)) = creds.username.split_once('/') {
            if creds.tenant.is_empty() {
                creds.tenant = tenant.to_string();
            }
            creds.username = user.to_string();
        }

        creds
    }

    fn url_sources(&self) -> Vec<UrlSource<'_>> {
        let mut sources: Vec<UrlSource<'_>> = self
            .urls
            .iter()
            .map(|u| UrlSource {
                href: &u.href,
                label: &u.label,
                primary: u.primary,
            })
            .chain(self.fields.iter().filter(|f| f.is_url()).map(|f| UrlSource {
                href: &f.value,
                label: &f.label,
                primary: false,
            }))
            .collect();

        // stable: non-primary URLs keep their relative order
        sources.sort_by_key(|s| !s.primary);
        sources
    }

    /// Map this item to one session per URL.
    ///
    /// `vault_names` maps vault ids to display names; the item's embedded
    /// vault name is used when the id is unknown.
    pub fn to_sessions(&self, vault_names: &HashMap<String, String>) -> Vec<SessionRecord> {
        let vault_name = vault_names
            .get(&self.vault.id)
            .cloned()
            .unwrap_or_else(|| self.vault.name.clone());
        let creds = self.credentials();
        let urls = self.url_sources();
        let multiple = urls.len() > 1;

        urls.iter()
            .map(|url| {
                let label = url.label.trim();
                let specific = !label.is_empty()
                    && !label.eq_ignore_ascii_case("website")
                    && !label.eq_ignore_ascii_case("url");
                let name = if multiple && specific {
                    format!("{} ({})", self.title, label)
                } else {
                    self.title.clone()
                };

                SessionRecord {
                    name,
                    host: url.href.to_string(),
                    username: creds.username.clone(),
                    password: creds.password.clone(),
                    tags: self.tags.clone(),
                    vault_id: self.vault.id.clone(),
                    vault_name: vault_name.clone(),
                    tenant: creds.tenant.clone(),
                    item_id: self.id.clone(),
                    item_name: self.title.clone(),
                    session_uri: format!("op://{}/{}", self.vault.id, self.id),
                    totp_secret: creds.totp_secret.clone(),
                    totp: String::new(),
                }
            })
            .collect()
    }
}

/// Strip the protocol and trailing slash for display and sorting.
///
/// ```
/// use c8y_session_host::source::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com:8080/"), "example.com:8080");
/// assert_eq!(normalize_url("example.com/"), "example.com");
/// ```
pub fn normalize_url(url: &str) -> &str {
    let without_scheme = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };
    without_scheme.strip_suffix('/').unwrap_or(without_scheme)
}
