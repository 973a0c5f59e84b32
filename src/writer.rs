//! Frame writer for host → browser responses.
//!
//! Each response is written as one vectored write of header and payload,
//! continuing after partial writes, then flushed. The host loop owns the
//! only writer, so frames never interleave.
//!
//! Chrome refuses host messages over 1 MiB. A response whose encoding
//! exceeds the outbound limit is replaced by an error response instead of
//! being sent.

use std::io::IoSlice;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{HostError, Result};
use crate::message::Response;
use crate::protocol::{Header, HEADER_SIZE, MAX_OUTBOUND_MESSAGE_SIZE};

/// A frame ready to be written.
#[derive(Debug)]
pub struct OutboundFrame {
    /// Pre-encoded 4-byte length prefix.
    pub header: [u8; HEADER_SIZE],
    pub payload: Bytes,
}

impl OutboundFrame {
    /// Frame a payload.
    pub fn new(payload: Bytes) -> Result<Self> {
        let header = Header::for_payload(&payload)?;
        Ok(Self {
            header: header.encode(),
            payload,
        })
    }

    /// Total size of this frame (header + payload).
    #[inline]
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Writes framed responses to an [`AsyncWrite`].
pub struct FrameWriter<W> {
    inner: W,
    max_outbound_size: usize,
    frames_written: u64,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            max_outbound_size: MAX_OUTBOUND_MESSAGE_SIZE,
            frames_written: 0,
        }
    }

    /// Override the outbound payload limit.
    pub fn with_max_outbound_size(mut self, max: usize) -> Self {
        self.max_outbound_size = max;
        self
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Encode and write one response.
    ///
    /// An oversize response is swapped for an error response.
    pub async fn write_response(&mut self, response: &Response) -> Result<()> {
        let mut payload = response.to_payload()?;

        if payload.len() > self.max_outbound_size {
            tracing::warn!(
                "Response of {} bytes exceeds outbound limit {}",
                payload.len(),
                self.max_outbound_size
            );
            let replacement = Response::error(format!(
                "response too large: {} bytes exceeds maximum {}",
                payload.len(),
                self.max_outbound_size
            ));
            payload = replacement.to_payload()?;
        }

        self.write_payload(Bytes::from(payload)).await
    }

    /// Frame and write a raw payload, then flush.
    pub async fn write_payload(&mut self, payload: Bytes) -> Result<()> {
        let frame = OutboundFrame::new(payload)?;
        write_frame(&mut self.inner, &frame).await?;
        self.frames_written += 1;
        tracing::debug!("Wrote frame of {} bytes", frame.payload.len());
        Ok(())
    }
}

/// Write one frame with `write_vectored`, resuming after partial writes.
async fn write_frame<W>(writer: &mut W, frame: &OutboundFrame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let total_size = frame.size();
    let mut total_written = 0;

    while total_written < total_size {
        let slices = remaining_slices(frame, total_written);
        let written = writer.write_vectored(&slices).await?;
        if written == 0 {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }
        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Slices for the part of `frame` not yet written.
fn remaining_slices(frame: &OutboundFrame, skip_bytes: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(2);

    if skip_bytes < HEADER_SIZE {
        slices.push(IoSlice::new(&frame.header[skip_bytes..]));
    }

    let start_in_payload = skip_bytes.saturating_sub(HEADER_SIZE);
    if start_in_payload < frame.payload.len() {
        slices.push(IoSlice::new(&frame.payload[start_in_payload..]));
    }

    slices
}
