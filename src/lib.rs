//! # c8y-session-host
//!
//! Native messaging host that serves go-c8y-cli sessions to a browser
//! extension from a password vault.
//!
//! The browser starts the host and speaks Chrome's native messaging
//! protocol over stdio: every message is a 4-byte little-endian length
//! followed by UTF-8 JSON. Each request is answered with exactly one
//! response, and the host exits when the browser closes its end.
//!
//! ## Architecture
//!
//! - **Transport** ([`protocol`], [`reader`], [`writer`]): length-prefixed framing
//! - **Messages** ([`message`]): request decoding and response shapes
//! - **Resolver** ([`resolver`]): tag and search filtering, password masking
//! - **TOTP** ([`totp`]): one-time codes for sessions with a TOTP secret
//! - **Sources** ([`source`]): the vault backend behind [`CredentialSource`]
//!
//! ## Example
//!
//! ```no_run
//! use c8y_session_host::{HostConfig, NativeHostBuilder, OpCliSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> c8y_session_host::Result<()> {
//!     let (config, _warnings) = HostConfig::from_env();
//!     let host = NativeHostBuilder::from_config(&config).build(OpCliSource::new(config.op_cli()));
//!
//!     host.serve(tokio::io::stdin(), tokio::io::stdout()).await
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod protocol;
pub mod reader;
pub mod resolver;
pub mod source;
pub mod totp;
pub mod writer;

mod host;

pub use config::HostConfig;
pub use error::{HostError, Result};
pub use host::{NativeHost, NativeHostBuilder};
pub use message::{Query, Request, Response, RevealPolicy, SessionView};
pub use resolver::Resolver;
pub use source::{CredentialSource, MemorySource, OpCliSource, SessionRecord};
