//! Tracing setup.
//!
//! stdout carries the native messaging wire, so every log line goes to
//! stderr. `RUST_LOG`, when set, takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

/// Filter for `level`, or from `RUST_LOG` when present.
pub fn build_filter(level: &str) -> EnvFilter {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(normalize_level(level)),
    }
}

/// Map loose level names onto tracing levels; unknown names fall back to `warn`.
fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" | "none" => "off",
        _ => "warn",
    }
}

/// Install the global subscriber writing to stderr.
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(level: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("DEBUG"), "debug");
        assert_eq!(normalize_level("warning"), "warn");
        assert_eq!(normalize_level("none"), "off");
        assert_eq!(normalize_level("verbose"), "warn");
    }
}
