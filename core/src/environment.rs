//! Ports to the outside world.
//!
//! A tickflow application never touches a timer, a storage backend, or an
//! input device directly. It receives them through the traits below, injected
//! via the reducer's `Environment` or handed to the session that merges the
//! sources.
//!
//! # Implementations
//!
//! - `TokioTimer` (in the `ticker` crate): interval ticks on the tokio clock
//! - `InMemoryStorage`, `CommandChannel`, `ScriptedTimer` (in `tickflow-testing`):
//!   deterministic doubles for tests and demos

use futures::stream::BoxStream;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Errors a storage backend may report when reading.
///
/// Writes are fire-and-forget and have no error channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend was reached but the read failed.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Periodic timer source.
///
/// Yields sequence numbers `0, 1, .., count - 1`, one per `interval`, the
/// first one a full `interval` after subscription. The stream ends after
/// `count` items; ending is the completion signal.
pub trait Timer: Send + Sync {
    /// Subscribe to a bounded tick sequence.
    fn ticks(&self, interval: Duration, count: u64) -> BoxStream<'static, u64>;
}

/// Key/value storage read side.
///
/// # Dyn Compatibility
///
/// Returns a boxed future so the trait can be used as `Arc<dyn StorageRead>`.
pub trait StorageRead: Send + Sync {
    /// Load the raw stored value for `key`.
    ///
    /// `Ok(None)` means nothing has been stored yet. The raw value is handed
    /// back untouched; interpreting it is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot serve the read.
    fn load(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StorageError>> + Send + '_>>;
}

/// Key/value storage write side.
///
/// Fire-and-forget: the caller does not wait for, or learn about, the
/// outcome. Implementations must not block.
pub trait StorageWrite: Send + Sync {
    /// Request that `value` be stored under `key`.
    fn write(&self, key: &str, value: &str);
}

/// External command input (buttons, stdin, a control socket).
pub trait CommandInput: Send + Sync {
    /// The command type this input produces
    type Command: Send + 'static;

    /// Subscribe to the command stream.
    ///
    /// The stream is unbounded in principle; it ends only when the input is
    /// closed.
    fn subscribe(&self) -> BoxStream<'static, Self::Command>;
}
