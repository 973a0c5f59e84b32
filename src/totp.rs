//! One-time codes for sessions that carry a TOTP secret.
//!
//! Codes are RFC 6238 defaults: SHA-1, 6 digits, 30 second period. When the
//! current window is about to close, the code for the next window is
//! returned instead so it is still valid by the time it is typed in.

use std::time::{SystemTime, UNIX_EPOCH};

use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::{HostError, Result};

/// Length of one code window in seconds.
pub const TOTP_PERIOD_SECS: u64 = 30;

/// Below this many seconds left in a window, use the next window.
const MIN_REMAINING_SECS: u64 = 5;

const TOTP_DIGITS: usize = 6;

/// Time to generate a code for, given the current unix time.
pub fn generation_time(unix_secs: u64) -> u64 {
    let remaining = TOTP_PERIOD_SECS - unix_secs % TOTP_PERIOD_SECS;
    if remaining < MIN_REMAINING_SECS {
        unix_secs + TOTP_PERIOD_SECS
    } else {
        unix_secs
    }
}

/// Code for `secret` at exactly `unix_secs`.
///
/// `secret` is base32 (case, spaces and padding ignored) or an
/// `otpauth://` URI carrying a `secret` parameter.
pub fn code_at(secret: &str, unix_secs: u64) -> Result<String> {
    let encoded = normalize_secret(secret);
    if encoded.is_empty() {
        return Err(HostError::Backend("invalid TOTP secret: empty".to_string()));
    }

    let bytes = Secret::Encoded(encoded)
        .to_bytes()
        .map_err(|e| HostError::Backend(format!("invalid TOTP secret: {:?}", e)))?;
    let totp = TOTP::new_unchecked(Algorithm::SHA1, TOTP_DIGITS, 1, TOTP_PERIOD_SECS, bytes);
    Ok(totp.generate(unix_secs))
}

/// Code for `secret` now, moved to the next window near a boundary.
pub fn current_code(secret: &str) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| HostError::Backend(format!("system clock before unix epoch: {}", e)))?
        .as_secs();
    code_at(secret, generation_time(now))
}

fn normalize_secret(secret: &str) -> String {
    let raw = match secret.trim().strip_prefix("otpauth://") {
        Some(uri) => uri_secret(uri).unwrap_or_default(),
        None => secret,
    };
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// `secret` query parameter of an otpauth URI (scheme already stripped).
fn uri_secret(uri: &str) -> Option<&str> {
    let (_, query) = uri.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("secret"))
        .map(|(_, value)| value)
}
