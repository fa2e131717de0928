//! # Ticker
//!
//! A tick session built on tickflow.
//!
//! Three independent sources feed one session:
//!
//! - a bounded periodic timer (`Tick` events, then a completion signal)
//! - a one-shot load of the persisted counter (`Loaded`)
//! - reset commands from outside (`Reset`)
//!
//! The [`Session`] merges them in arrival order, folds each event into a new
//! [`ApplicationState`] snapshot, publishes the snapshot, and hands
//! [`PersistenceWriteRequest`]s to the storage writer when the tick source
//! completes or a reset arrives.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticker::{Session, SessionConfig, TokioTimer};
//! use tickflow_testing::{CommandChannel, InMemoryStorage};
//!
//! # async fn example() -> Result<(), ticker::SessionError> {
//! let storage = InMemoryStorage::new().with_value("counter", "5");
//! let (commands, _resets) = CommandChannel::new();
//!
//! let session = Session::new(SessionConfig::default(), Arc::new(storage.clone()));
//! let final_state = session
//!     .run(&TokioTimer, Arc::new(storage.clone()), &commands)
//!     .await?;
//!
//! assert_eq!(final_state.tick_count, 8);
//! # Ok(())
//! # }
//! ```

/// Session configuration
pub mod config;
/// Completion-triggered persistence emitter
pub mod emitter;
/// Session errors
pub mod error;
/// Session reducer
pub mod reducer;
/// Merge scheduler and session
pub mod scheduler;
/// Event sources
pub mod sources;
/// Data model
pub mod state;

pub use config::SessionConfig;
pub use emitter::{PersistenceEmitter, WriteTrigger};
pub use error::SessionError;
pub use reducer::{SessionAction, SessionEnvironment, SessionReducer, SessionState};
pub use scheduler::{Session, merge_sources};
pub use sources::{TokioTimer, parse_command};
pub use state::{
    ApplicationState, InputEvent, PersistenceWriteRequest, ResetCommand, SessionPhase,
};
