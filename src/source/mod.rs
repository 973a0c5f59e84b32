//! Credential source module - the boundary to the vault backend.
//!
//! Provides:
//! - [`CredentialSource`] - the narrow trait the resolver queries
//! - [`SessionRecord`] - one stored credential entry
//! - [`MemorySource`] - in-memory snapshot, optionally loaded from JSON
//! - [`OpCliSource`] - adapter over the 1Password CLI (`op`)
//!
//! # Example
//!
//! ```
//! use c8y_session_host::source::{CredentialSource, MemorySource, SessionRecord};
//!
//! # tokio_test_block_on(async {
//! let source = MemorySource::new(vec![
//!     SessionRecord::new("dev", "https://dev.example.com", "admin", "secret"),
//! ]);
//! let sessions = source.fetch_sessions(&[]).await.unwrap();
//! assert_eq!(sessions.len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod memory;
mod op_cli;
mod op_item;
mod record;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

pub use memory::MemorySource;
pub use op_cli::{OpCliConfig, OpCliSource, DEFAULT_OP_BINARY, DEFAULT_OP_TIMEOUT};
pub use op_item::{normalize_url, OpField, OpItem, OpTotp, OpUrl, OpVault};
pub use record::SessionRecord;

/// Boxed future for source results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for credential backends.
///
/// Both calls may fail. The resolver turns a failed fetch into an error
/// response and a failed auth check into `{"success": false}`.
pub trait CredentialSource: Send + Sync {
    /// Fetch every session visible under `vaults` (empty = no restriction).
    ///
    /// Records are returned in the order the resolver should emit them.
    fn fetch_sessions<'a>(&'a self, vaults: &'a [String]) -> BoxFuture<'a, Result<Vec<SessionRecord>>>;

    /// Lightweight reachability / sign-in check.
    fn check_auth(&self) -> BoxFuture<'_, Result<bool>>;
}

impl<S: CredentialSource + ?Sized> CredentialSource for Box<S> {
    fn fetch_sessions<'a>(&'a self, vaults: &'a [String]) -> BoxFuture<'a, Result<Vec<SessionRecord>>> {
        (**self).fetch_sessions(vaults)
    }

    fn check_auth(&self) -> BoxFuture<'_, Result<bool>> {
        (**self).check_auth()
    }
}

impl<S: CredentialSource + ?Sized> CredentialSource for std::sync::Arc<S> {
    fn fetch_sessions<'a>(&'a self, vaults: &'a [String]) -> BoxFuture<'a, Result<Vec<SessionRecord>>> {
        (**self).fetch_sessions(vaults)
    }

    fn check_auth(&self) -> BoxFuture<'_, Result<bool>> {
        (**self).check_auth()
    }
}
