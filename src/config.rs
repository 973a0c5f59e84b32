//! Host configuration.
//!
//! Defaults are overridden by environment variables; there is no config
//! file. Unparseable numeric values are ignored and reported back as
//! warnings, since logging is configured from this same config.

use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::DEFAULT_MAX_MESSAGE_SIZE;
use crate::source::{OpCliConfig, DEFAULT_OP_BINARY, DEFAULT_OP_TIMEOUT};

/// Default log level when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Runtime configuration for the native host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Vaults searched when a query names none. Empty means all vaults.
    pub default_vaults: Vec<String>,
    /// Serve sessions from this JSON file instead of the 1Password CLI.
    pub sessions_file: Option<PathBuf>,
    /// `op` executable.
    pub op_binary: PathBuf,
    /// Per-command timeout for `op`.
    pub op_timeout: Duration,
    /// Inbound frame limit in bytes.
    pub max_message_size: u32,
    pub log_level: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            default_vaults: Vec::new(),
            sessions_file: None,
            op_binary: PathBuf::from(DEFAULT_OP_BINARY),
            op_timeout: DEFAULT_OP_TIMEOUT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl HostConfig {
    /// Defaults merged with the process environment, plus any warnings.
    pub fn from_env() -> (Self, Vec<String>) {
        let mut config = Self::default();
        let warnings = config.merge_env_with(|key| std::env::var(key).ok());
        (config, warnings)
    }

    /// Merge variables from `lookup` into this config (variables take precedence).
    ///
    /// Returns a warning for each value that was ignored.
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(val) = get("C8YOP_VAULT").or_else(|| get("CYOP_VAULT")) {
            self.default_vaults = split_and_trim(&val);
        }

        if let Some(val) = get("C8YOP_SESSIONS_FILE") {
            self.sessions_file = Some(PathBuf::from(val));
        }

        if let Some(val) = get("C8YOP_OP_BIN") {
            self.op_binary = PathBuf::from(val);
        }

        if let Some(val) = get("C8YOP_OP_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.op_timeout = Duration::from_secs(secs),
                _ => warnings.push(format!("Invalid C8YOP_OP_TIMEOUT_SECS '{}', using default", val)),
            }
        }

        if let Some(val) = get("C8YOP_MAX_MESSAGE_SIZE") {
            match val.trim().parse::<u32>() {
                Ok(size) if size > 0 => self.max_message_size = size,
                _ => warnings.push(format!("Invalid C8YOP_MAX_MESSAGE_SIZE '{}', using default", val)),
            }
        }

        if let Some(val) = get("C8YOP_LOG_LEVEL").or_else(|| get("LOG_LEVEL")) {
            self.log_level = val.trim().to_lowercase();
        }

        warnings
    }

    /// Settings for the 1Password CLI source.
    pub fn op_cli(&self) -> OpCliConfig {
        OpCliConfig {
            binary: self.op_binary.clone(),
            timeout: self.op_timeout,
        }
    }
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_and_trim(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn merged_with_warnings(vars: &[(&str, &str)]) -> (HostConfig, Vec<String>) {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = HostConfig::default();
        let warnings = config.merge_env_with(|key| vars.get(key).cloned());
        (config, warnings)
    }

    fn merged(vars: &[(&str, &str)]) -> HostConfig {
        merged_with_warnings(vars).0
    }

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();

        assert!(config.default_vaults.is_empty());
        assert!(config.sessions_file.is_none());
        assert_eq!(config.op_binary, PathBuf::from("op"));
        assert_eq!(config.op_timeout, Duration::from_secs(30));
        assert_eq!(config.max_message_size, 1024 * 1024);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_env_overrides() {
        let config = merged(&[
            ("C8YOP_VAULT", "Employee, Shared ,"),
            ("C8YOP_SESSIONS_FILE", "/tmp/sessions.json"),
            ("C8YOP_OP_BIN", "/usr/local/bin/op"),
            ("C8YOP_OP_TIMEOUT_SECS", "5"),
            ("C8YOP_MAX_MESSAGE_SIZE", "2048"),
            ("C8YOP_LOG_LEVEL", "DEBUG"),
        ]);

        assert_eq!(config.default_vaults, vec!["Employee", "Shared"]);
        assert_eq!(config.sessions_file, Some(PathBuf::from("/tmp/sessions.json")));
        assert_eq!(config.op_cli().binary, PathBuf::from("/usr/local/bin/op"));
        assert_eq!(config.op_cli().timeout, Duration::from_secs(5));
        assert_eq!(config.max_message_size, 2048);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_valid_values_produce_no_warnings() {
        let (_, warnings) = merged_with_warnings(&[("C8YOP_OP_TIMEOUT_SECS", "10")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_fallback_variables() {
        let config = merged(&[("CYOP_VAULT", "Legacy"), ("LOG_LEVEL", "info")]);

        assert_eq!(config.default_vaults, vec!["Legacy"]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_primary_variable_wins() {
        let config = merged(&[("C8YOP_VAULT", "New"), ("CYOP_VAULT", "Legacy")]);
        assert_eq!(config.default_vaults, vec!["New"]);
    }

    #[test]
    fn test_invalid_numbers_ignored() {
        let (config, warnings) =
            merged_with_warnings(&[("C8YOP_OP_TIMEOUT_SECS", "soon"), ("C8YOP_MAX_MESSAGE_SIZE", "0")]);

        assert_eq!(config.op_timeout, DEFAULT_OP_TIMEOUT);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("C8YOP_OP_TIMEOUT_SECS 'soon'"));
        assert!(warnings[1].contains("C8YOP_MAX_MESSAGE_SIZE '0'"));
    }

    #[test]
    fn test_split_and_trim() {
        assert_eq!(split_and_trim("a,b"), vec!["a", "b"]);
        assert_eq!(split_and_trim(" a , , b "), vec!["a", "b"]);
        assert!(split_and_trim("").is_empty());
    }
}
