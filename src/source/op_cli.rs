//! Credential source backed by the 1Password CLI.
//!
//! Every call shells out to `op` and parses its JSON output. Each command
//! runs under a timeout; a command that overruns is killed.
//!
//! # Workflow
//!
//! 1. `op vault list` resolves vault names to ids (and display names)
//! 2. `op item list --categories Login` lists candidate items per vault
//! 3. `op item get -` fetches full items in one call, reading the list on stdin
//! 4. Items are mapped to sessions and sorted by normalized host

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::op_item::{normalize_url, OpItem, OpVault};
use super::{BoxFuture, CredentialSource, SessionRecord};
use crate::error::{HostError, Result};

/// Default `op` executable, looked up on `PATH`.
pub const DEFAULT_OP_BINARY: &str = "op";

/// Default per-command timeout.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`OpCliSource`].
#[derive(Debug, Clone)]
pub struct OpCliConfig {
    /// Path or name of the `op` executable.
    pub binary: PathBuf,
    /// Timeout applied to every `op` invocation.
    pub timeout: Duration,
}

impl Default for OpCliConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_OP_BINARY),
            timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}

/// Credential source that queries 1Password through `op`.
#[derive(Debug, Clone, Default)]
pub struct OpCliSource {
    config: OpCliConfig,
}

impl OpCliSource {
    pub fn new(config: OpCliConfig) -> Self {
        Self { config }
    }

    /// Run `op` with `args`, optionally feeding `input` on stdin.
    async fn run(&self, args: &[&str], input: Option<&[u8]>) -> Result<Output> {
        tracing::debug!("op command: op {}", args.join(" "));
        let started = std::time::Instant::now();

        let mut child = Command::new(&self.config.binary)
            .args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => HostError::Backend(format!(
                    "could not find '{}' (1Password CLI). Check if it is installed on your machine",
                    self.config.binary.display()
                )),
                _ => HostError::Io(e),
            })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(input)) = (stdin, input) {
                pipe.write_all(input).await?;
                pipe.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let run = async { tokio::join!(feed, child.wait_with_output()) };
        let (fed, output) = tokio::time::timeout(self.config.timeout, run)
            .await
            .map_err(|_| HostError::Timeout(self.config.timeout))?;
        fed?;
        let output = output?;

        tracing::debug!(
            "op command completed in {}ms (status {})",
            started.elapsed().as_millis(),
            output.status
        );
        Ok(output)
    }

    /// Run `op` and parse its stdout as JSON, failing on a non-zero exit.
    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let output = self.run(args, None).await?;
        ensure_success(args, &output)?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    async fn list_vaults(&self) -> Result<Vec<OpVault>> {
        self.run_json(&["vault", "list", "--format", "json"]).await
    }

    /// Resolve a vault term to an id: ids pass through, names match by substring.
    fn resolve_vault(term: &str, vaults: &[OpVault]) -> Result<String> {
        if is_uid(term) {
            return Ok(term.to_string());
        }
        let needle = term.to_lowercase();
        vaults
            .iter()
            .find(|v| v.name.to_lowercase().contains(&needle))
            .map(|v| v.id.clone())
            .ok_or_else(|| HostError::Backend(format!("Vault '{}' not found", term)))
    }

    async fn fetch_from_vault(
        &self,
        vault_id: Option<&str>,
        vault_names: &HashMap<String, String>,
    ) -> Result<Vec<SessionRecord>> {
        let mut list_args = vec!["item", "list", "--format", "json", "--categories", "Login"];
        if let Some(id) = vault_id {
            list_args.extend(["--vault", id]);
        }

        let listing = self.run(&list_args, None).await?;
        ensure_success(&list_args, &listing)?;
        let summaries: Vec<OpItem> = serde_json::from_slice(&listing.stdout)?;
        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        let items = if summaries.len() > 1 {
            match self.bulk_get_items(&listing.stdout).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Bulk fetch failed, falling back to individual fetches: {}", e);
                    self.individual_get_items(&summaries).await
                }
            }
        } else {
            self.individual_get_items(&summaries).await
        };

        let sessions: Vec<SessionRecord> = items
            .iter()
            .filter(|item| !item.skip())
            .flat_map(|item| item.to_sessions(vault_names))
            .collect();

        tracing::debug!(
            "Mapped {} items to {} sessions (vault {:?})",
            items.len(),
            sessions.len(),
            vault_id
        );
        Ok(sessions)
    }

    /// `op item list ... | op item get - --format json`
    async fn bulk_get_items(&self, listing: &[u8]) -> Result<Vec<OpItem>> {
        let args = ["item", "get", "-", "--format", "json"];
        let output = self.run(&args, Some(listing)).await?;
        ensure_success(&args, &output)?;

        let mut items = Vec::new();
        for parsed in serde_json::Deserializer::from_slice(&output.stdout).into_iter::<OpItem>() {
            match parsed {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!("Failed to parse item from bulk output: {}", e);
                    break;
                }
            }
        }
        Ok(items)
    }

    async fn individual_get_items(&self, summaries: &[OpItem]) -> Vec<OpItem> {
        let mut items = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let args = ["item", "get", summary.id.as_str(), "--format", "json"];
            match self.run_json::<OpItem>(&args).await {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("Failed to get item details for {}: {}", summary.id, e),
            }
        }
        items
    }

    async fn fetch_all(&self, vaults: &[String]) -> Result<Vec<SessionRecord>> {
        let known = match self.list_vaults().await {
            Ok(known) => known,
            Err(e) if vaults.is_empty() => {
                tracing::warn!("Failed to list vaults: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let vault_names: HashMap<String, String> =
            known.iter().map(|v| (v.id.clone(), v.name.clone())).collect();

        let mut sessions = Vec::new();
        if vaults.is_empty() {
            sessions = self.fetch_from_vault(None, &vault_names).await?;
        } else {
            for term in vaults {
                let fetched = match Self::resolve_vault(term, &known) {
                    Ok(id) => self.fetch_from_vault(Some(&id), &vault_names).await,
                    Err(e) => Err(e),
                };
                match fetched {
                    Ok(found) => sessions.extend(found),
                    Err(e) if vaults.len() == 1 => return Err(e),
                    Err(e) => tracing::warn!("Failed to search vault {}: {}", term, e),
                }
            }
        }

        sessions.sort_by(|a, b| normalize_url(&a.host).cmp(normalize_url(&b.host)));
        Ok(sessions)
    }
}

impl CredentialSource for OpCliSource {
    fn fetch_sessions<'a>(&'a self, vaults: &'a [String]) -> BoxFuture<'a, Result<Vec<SessionRecord>>> {
        Box::pin(self.fetch_all(vaults))
    }

    fn check_auth(&self) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let output = self.run(&["account", "get"], None).await?;
            if !output.status.success() {
                tracing::debug!(
                    "op account get failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(output.status.success())
        })
    }
}

fn ensure_success(args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(HostError::Backend(format!(
        "op {} failed ({}): {}",
        args.join(" "),
        output.status,
        stderr.trim()
    )))
}

/// 1Password ids are 26 alphanumeric characters.
fn is_uid(value: &str) -> bool {
    value.len() == 26 && value.chars().all(|c| c.is_ascii_alphanumeric())
}
