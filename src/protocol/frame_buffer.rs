//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented frames:
//! - `WaitingForHeader`: Need at least 4 bytes
//! - `WaitingForPayload`: Header parsed, need N more payload bytes
//!
//! When the peer closes its end, [`FrameBuffer::finish`] tells a clean
//! end-of-session (fewer than 4 header bytes pending) apart from a frame that
//! was cut off mid-payload.
//!
//! # Example
//!
//! ```
//! use c8y_session_host::protocol::{build_frame, FrameBuffer};
//!
//! let mut buffer = FrameBuffer::new();
//! let bytes = build_frame(br#"{"type":"test_auth"}"#).unwrap();
//!
//! assert!(buffer.push(&bytes[..3]).unwrap().is_empty());
//! let frames = buffer.push(&bytes[3..]).unwrap();
//! assert_eq!(frames.len(), 1);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{Header, DEFAULT_MAX_MESSAGE_SIZE, HEADER_SIZE};
use super::Frame;
use crate::error::{HostError, Result};

/// State machine for frame parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for complete header (need 4 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for payload bytes.
    WaitingForPayload { remaining: u32 },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
pub struct FrameBuffer {
    /// Accumulated bytes from stdin reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed payload size.
    max_message_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 8KB, max payload: 1MiB.
    pub fn new() -> Self {
        Self::with_max_message_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a new frame buffer with custom max payload size.
    pub fn with_max_message_size(max_message_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::WaitingForHeader,
            max_message_size,
        }
    }

    /// Append bytes without extracting anything.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Partial data is kept for the next push. Frames that precede an
    /// over-limit header are still returned; the error is raised by the
    /// next call, since the offending header stays buffered.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::FrameTooLarge`] if the first header in the
    /// buffer announces a payload over the limit. The payload is never
    /// buffered in that case.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.extend(data);

        let mut frames = Vec::new();
        loop {
            match self.next_frame() {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(e) if frames.is_empty() => return Err(e),
                Err(_) => break,
            }
        }

        Ok(frames)
    }

    /// Extract the next complete frame, if one is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::FrameTooLarge`] when the next header is over the
    /// limit. The header is left in place, so the error repeats.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.state {
            State::WaitingForHeader => {
                let header = match Header::decode(&self.buffer) {
                    Some(header) => header,
                    None => return Ok(None),
                };
                header.validate(self.max_message_size)?;

                let _ = self.buffer.split_to(HEADER_SIZE);

                if header.payload_length == 0 {
                    return Ok(Some(Frame::new(Bytes::new())));
                }

                self.state = State::WaitingForPayload {
                    remaining: header.payload_length,
                };
                self.next_frame()
            }

            State::WaitingForPayload { remaining } => {
                let remaining = remaining as usize;
                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let payload = self.buffer.split_to(remaining).freeze();
                self.state = State::WaitingForHeader;

                Ok(Some(Frame::new(payload)))
            }
        }
    }

    /// Classify the end of the inbound stream.
    ///
    /// Fewer than 4 pending header bytes is a clean end of session. A
    /// rejected header, or one whose payload never fully arrived, is an error.
    pub fn finish(&self) -> Result<()> {
        match self.state {
            State::WaitingForHeader => {
                if let Some(header) = Header::decode(&self.buffer) {
                    header.validate(self.max_message_size)?;
                }
                if !self.buffer.is_empty() {
                    tracing::debug!(
                        "Discarding {} trailing header bytes at end of stream",
                        self.buffer.len()
                    );
                }
                Ok(())
            }
            State::WaitingForPayload { remaining } => Err(HostError::Framing(format!(
                "stream closed after {} of {} payload bytes",
                self.buffer.len(),
                remaining
            ))),
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
