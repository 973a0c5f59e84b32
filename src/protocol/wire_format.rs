//! Wire format encoding and decoding.
//!
//! Native messaging frames carry a 4-byte length header:
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ Length       │ Payload                  │
//! │ 4 bytes      │ `Length` bytes           │
//! │ uint32 LE    │ UTF-8 JSON               │
//! └──────────────┴──────────────────────────┘
//! ```
//!
//! The length uses native byte order on the browser side, which is Little
//! Endian on every platform the browsers ship for.

use crate::error::{HostError, Result};

/// Header size in bytes (fixed, exactly 4).
pub const HEADER_SIZE: usize = 4;

/// Default maximum inbound message size (1 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

/// Largest message the browser accepts from a native host (1 MiB).
pub const MAX_OUTBOUND_MESSAGE_SIZE: usize = 1024 * 1024;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl Header {
    /// Create a new header.
    pub fn new(payload_length: u32) -> Self {
        Self { payload_length }
    }

    /// Create a header for a payload, rejecting payloads over `u32::MAX`.
    pub fn for_payload(payload: &[u8]) -> Result<Self> {
        let payload_length = u32::try_from(payload.len()).map_err(|_| {
            HostError::Framing(format!("payload of {} bytes cannot be framed", payload.len()))
        })?;
        Ok(Self { payload_length })
    }

    /// Encode header to bytes (Little Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use c8y_session_host::protocol::Header;
    ///
    /// let bytes = Header::new(17).encode();
    /// assert_eq!(bytes, [17, 0, 0, 0]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        self.payload_length.to_le_bytes()
    }

    /// Decode header from bytes (Little Endian).
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let bytes: [u8; HEADER_SIZE] = buf.get(..HEADER_SIZE)?.try_into().ok()?;
        Some(Self {
            payload_length: u32::from_le_bytes(bytes),
        })
    }

    /// Validate the announced length against the inbound limit.
    pub fn validate(&self, max_message_size: u32) -> Result<()> {
        if self.payload_length > max_message_size {
            return Err(HostError::FrameTooLarge {
                length: self.payload_length,
                max: max_message_size,
            });
        }
        Ok(())
    }
}
