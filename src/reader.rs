//! Frame reader for browser → host requests.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::protocol::{Frame, FrameBuffer, DEFAULT_MAX_MESSAGE_SIZE};

/// Read buffer size.
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Pulls complete frames out of an [`AsyncRead`], one at a time.
///
/// Frames already buffered are handed out before more input is read, and
/// before an over-limit header behind them is reported.
pub struct FrameReader<R> {
    inner: R,
    buffer: FrameBuffer,
    chunk: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_message_size(inner, DEFAULT_MAX_MESSAGE_SIZE)
    }

    pub fn with_max_message_size(inner: R, max_message_size: u32) -> Self {
        Self {
            inner,
            buffer: FrameBuffer::with_max_message_size(max_message_size),
            chunk: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    /// Wait for the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed the stream between frames.
    ///
    /// # Errors
    ///
    /// A frame cut off by end of stream is [`HostError::Framing`]; an
    /// announced length over the limit is [`HostError::FrameTooLarge`].
    ///
    /// [`HostError::Framing`]: crate::error::HostError::Framing
    /// [`HostError::FrameTooLarge`]: crate::error::HostError::FrameTooLarge
    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.buffer.next_frame()? {
                return Ok(Some(frame));
            }

            let n = self.inner.read(&mut self.chunk).await?;
            if n == 0 {
                self.buffer.finish()?;
                return Ok(None);
            }

            tracing::trace!("Read {} bytes", n);
            self.buffer.extend(&self.chunk[..n]);
        }
    }
}
