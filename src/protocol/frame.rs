//! Frame struct and frame building.
//!
//! A frame is one length-prefixed JSON message. The payload is held as
//! `bytes::Bytes` so it can be handed from the buffer to the decoder
//! without copying.
//!
//! # Example
//!
//! ```
//! use c8y_session_host::protocol::{build_frame, Frame, HEADER_SIZE};
//! use bytes::Bytes;
//!
//! let frame = Frame::new(Bytes::from_static(b"{}"));
//! assert_eq!(frame.payload_len(), 2);
//!
//! let bytes = build_frame(b"{}").unwrap();
//! assert_eq!(bytes.len(), HEADER_SIZE + 2);
//! ```

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE};
use crate::error::Result;

/// A complete inbound or outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes (UTF-8 JSON on a well-behaved peer).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from a payload.
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Header describing this frame.
    pub fn header(&self) -> Result<Header> {
        Header::for_payload(&self.payload)
    }

    /// Payload as UTF-8, or `None` if the peer sent invalid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Build a complete frame as a single byte vector.
pub fn build_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let header = Header::for_payload(payload)?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    Ok(buf)
}
