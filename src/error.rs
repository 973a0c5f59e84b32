//! Error types for the session host.

use thiserror::Error;

/// Main error type for all host operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// I/O error on stdin/stdout or while talking to the vault CLI.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Truncated or otherwise malformed frame.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Length prefix announced more bytes than the host accepts.
    #[error("Message length {length} exceeds maximum {max}")]
    FrameTooLarge { length: u32, max: u32 },

    /// Payload was valid framing but not a usable request.
    #[error("Invalid request: {0}")]
    Decode(String),

    /// Credential source failed or denied access.
    #[error("{0}")]
    Backend(String),

    /// Credential source did not answer in time.
    #[error("Credential source timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl HostError {
    /// Whether this error must terminate the read loop.
    ///
    /// Domain failures (decode, backend, timeout) are reported to the peer
    /// as error responses; only transport failures end the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HostError::Io(_)
                | HostError::Framing(_)
                | HostError::FrameTooLarge { .. }
        )
    }
}

/// Result type alias using HostError.
pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(HostError::Framing("short payload".into()).is_fatal());
        assert!(HostError::FrameTooLarge { length: 10, max: 1 }.is_fatal());
        assert!(HostError::Io(std::io::Error::other("broken pipe")).is_fatal());

        assert!(!HostError::Decode("bad".into()).is_fatal());
        assert!(!HostError::Backend("not signed in".into()).is_fatal());
        assert!(!HostError::Timeout(std::time::Duration::from_secs(1)).is_fatal());
    }

    #[test]
    fn test_backend_message_is_verbatim() {
        let err = HostError::Backend("Vault 'Employee' not found".into());
        assert_eq!(err.to_string(), "Vault 'Employee' not found");
    }
}
