//! Native host builder and request loop.
//!
//! The [`NativeHostBuilder`] configures the credential source and limits.
//! [`NativeHost::serve`] then runs one session over a reader/writer pair:
//! 1. Await a frame (`AwaitingFrame`)
//! 2. Decode and resolve it (`Dispatching`)
//! 3. Write exactly one response (`Responding`)
//! 4. Repeat until the peer closes the input (`Closed`)
//!
//! Requests are handled strictly one at a time. Decode and backend failures
//! are answered with an error response; framing and I/O failures end the
//! session.
//!
//! # Example
//!
//! ```no_run
//! use c8y_session_host::{MemorySource, NativeHost};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> c8y_session_host::Result<()> {
//!     let host = NativeHost::builder()
//!         .default_vaults(vec!["Employee".to_string()])
//!         .build(MemorySource::new(Vec::new()));
//!
//!     host.serve(tokio::io::stdin(), tokio::io::stdout()).await
//! }
//! ```

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::HostConfig;
use crate::error::{HostError, Result};
use crate::message::{Request, Response};
use crate::protocol::{Frame, DEFAULT_MAX_MESSAGE_SIZE, MAX_OUTBOUND_MESSAGE_SIZE};
use crate::reader::FrameReader;
use crate::resolver::Resolver;
use crate::source::CredentialSource;
use crate::writer::FrameWriter;

/// Builder for a [`NativeHost`].
#[derive(Debug, Clone)]
pub struct NativeHostBuilder {
    default_vaults: Vec<String>,
    max_message_size: u32,
    max_outbound_size: usize,
}

impl NativeHostBuilder {
    pub fn new() -> Self {
        Self {
            default_vaults: Vec::new(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_outbound_size: MAX_OUTBOUND_MESSAGE_SIZE,
        }
    }

    /// Start from a loaded [`HostConfig`].
    pub fn from_config(config: &HostConfig) -> Self {
        Self::new()
            .default_vaults(config.default_vaults.clone())
            .max_message_size(config.max_message_size)
    }

    /// Vaults searched when a query names none.
    pub fn default_vaults(mut self, vaults: Vec<String>) -> Self {
        self.default_vaults = vaults;
        self
    }

    /// Largest inbound payload accepted.
    ///
    /// Default: 1 MiB
    pub fn max_message_size(mut self, max: u32) -> Self {
        self.max_message_size = max;
        self
    }

    /// Largest outbound payload written before it is replaced by an error.
    ///
    /// Default: 1 MiB
    pub fn max_outbound_size(mut self, max: usize) -> Self {
        self.max_outbound_size = max;
        self
    }

    /// Build the host around `source`.
    pub fn build<S: CredentialSource>(self, source: S) -> NativeHost<S> {
        NativeHost {
            resolver: Resolver::new(source).with_default_vaults(self.default_vaults),
            max_message_size: self.max_message_size,
            max_outbound_size: self.max_outbound_size,
        }
    }
}

impl Default for NativeHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Loop states. `Closed` is terminal.
#[derive(Debug)]
enum LoopState {
    AwaitingFrame,
    Dispatching(Frame),
    Responding(Response),
    Closed,
}

/// Running native messaging host.
pub struct NativeHost<S> {
    resolver: Resolver<S>,
    max_message_size: u32,
    max_outbound_size: usize,
}

impl NativeHost<()> {
    pub fn builder() -> NativeHostBuilder {
        NativeHostBuilder::new()
    }
}

impl<S: CredentialSource> NativeHost<S> {
    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    /// Serve requests from `reader` until it closes.
    ///
    /// # Errors
    ///
    /// Returns the fatal framing or I/O error that ended the session.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = FrameReader::with_max_message_size(reader, self.max_message_size);
        let mut writer = FrameWriter::new(writer).with_max_outbound_size(self.max_outbound_size);
        let mut state = LoopState::AwaitingFrame;

        loop {
            state = match state {
                LoopState::AwaitingFrame => match reader.next_frame().await {
                    Ok(Some(frame)) => {
                        tracing::debug!("Received frame of {} bytes", frame.payload_len());
                        LoopState::Dispatching(frame)
                    }
                    Ok(None) => LoopState::Closed,
                    Err(e) => return Err(fatal("read", e)),
                },

                LoopState::Dispatching(frame) => LoopState::Responding(self.dispatch(&frame).await),

                LoopState::Responding(response) => {
                    if let Err(e) = writer.write_response(&response).await {
                        return Err(fatal("write", e));
                    }
                    LoopState::AwaitingFrame
                }

                LoopState::Closed => {
                    tracing::debug!(
                        "Input closed after {} responses, shutting down",
                        writer.frames_written()
                    );
                    return Ok(());
                }
            };
        }
    }

    /// Decode and resolve one frame. Never fails: errors become responses.
    async fn dispatch(&self, frame: &Frame) -> Response {
        match Request::decode(frame.payload()) {
            Ok(request) => {
                tracing::debug!("Dispatching {:?}", RequestKind::of(&request));
                self.resolver.resolve(request).await
            }
            Err(e) => {
                tracing::warn!("Rejecting request: {}", e);
                Response::error(e.to_string())
            }
        }
    }
}

fn fatal(stage: &str, error: HostError) -> HostError {
    tracing::error!("Fatal {} error: {}", stage, error);
    error
}

/// Log-safe summary of a request; search terms stay out of the logs.
#[derive(Debug)]
enum RequestKind {
    AuthProbe,
    Query { vaults: usize, tags: usize, reveal: bool },
}

impl RequestKind {
    fn of(request: &Request) -> Self {
        match request {
            Request::AuthProbe => RequestKind::AuthProbe,
            Request::Query(query) => RequestKind::Query {
                vaults: query.vaults.len(),
                tags: query.tags.len(),
                reveal: query.reveal,
            },
        }
    }
}
