//! Merge scheduler and the session that drives it.
//!
//! The three sources are merged into one stream in arrival order and each
//! action is folded through the store before the next one is pulled. The
//! snapshot produced by every input event is published on the snapshot
//! sink; persistence writes leave through the storage writer instead.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::reducer::{SessionAction, SessionEnvironment, SessionReducer, SessionState};
use crate::sources::{load_event, reset_events, tick_events};
use crate::state::{ApplicationState, ResetCommand, SessionPhase};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tickflow_core::environment::{CommandInput, StorageRead, StorageWrite, Timer};
use tickflow_runtime::{EffectHandle, Store};
use tokio::sync::broadcast;

type SessionStore = Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

/// Merge source streams into one
///
/// Whichever source yields first is forwarded first. Nothing is reordered
/// by source; sources that are ready in the same poll come out in whatever
/// order the underlying wakeups arrive. The merged stream ends once every
/// source has ended.
pub fn merge_sources(
    sources: impl IntoIterator<Item = BoxStream<'static, SessionAction>>,
) -> BoxStream<'static, SessionAction> {
    stream::select_all(sources).boxed()
}

/// One tick session
///
/// Owns the store that holds the session state. Consumers observe state only
/// through [`Session::subscribe`] and the read accessors.
pub struct Session {
    config: SessionConfig,
    store: SessionStore,
    snapshots: broadcast::Sender<ApplicationState>,
    started: AtomicBool,
}

impl Session {
    /// Create a session that hands persistence writes to `writer`
    #[must_use]
    pub fn new(config: SessionConfig, writer: Arc<dyn StorageWrite>) -> Self {
        let (snapshots, _) = broadcast::channel(config.snapshot_capacity.max(1));
        let store = Store::new(
            SessionState::new(config.storage_key.clone()),
            SessionReducer::new(),
            SessionEnvironment::new(writer),
        );

        Self {
            config,
            store,
            snapshots,
            started: AtomicBool::new(false),
        }
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Subscribe to the snapshot sink
    ///
    /// Receives every snapshot published after this call, in fold order.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApplicationState> {
        self.snapshots.subscribe()
    }

    /// Latest snapshot
    pub async fn snapshot(&self) -> ApplicationState {
        self.store.state(|s| s.snapshot).await
    }

    /// Phase of the tick source
    pub async fn phase(&self) -> SessionPhase {
        self.store.state(SessionState::phase).await
    }

    /// Fold one action and publish the resulting snapshot
    ///
    /// Input events publish a snapshot; the completion signal does not, as
    /// it leaves the snapshot untouched. The snapshot is published while the
    /// fold still holds the state lock, so concurrent callers publish their
    /// own snapshots, in fold order.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store has shut down.
    #[tracing::instrument(skip(self), name = "session_dispatch")]
    pub async fn dispatch(&self, action: SessionAction) -> Result<EffectHandle, SessionError> {
        let publish = match &action {
            SessionAction::Input(event) => {
                metrics::counter!("ticker.events.total", "kind" => event.kind()).increment(1);
                true
            },
            SessionAction::TicksCompleted => false,
        };

        let (handle, ()) = self
            .store
            .send_with(action, |state| {
                if publish {
                    let snapshot = state.snapshot;
                    tracing::debug!(
                        tick_count = snapshot.tick_count,
                        is_tick = snapshot.is_tick,
                        is_reset = snapshot.is_reset,
                        "Published snapshot"
                    );
                    // No subscribers is fine; the snapshot is simply not observed.
                    let _ = self.snapshots.send(snapshot);
                }
            })
            .await?;

        Ok(handle)
    }

    /// Run the session to the end
    ///
    /// Merges the timer, the one-shot load and the reset commands, folds
    /// every action in arrival order, and returns the final snapshot once
    /// every source has ended and in-flight writes have been handed off.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyStarted`] if this session already ran
    /// - [`SessionError::Store`] if in-flight writes outlast the shutdown timeout
    pub async fn run<T, C>(
        &self,
        timer: &T,
        storage: Arc<dyn StorageRead>,
        commands: &C,
    ) -> Result<ApplicationState, SessionError>
    where
        T: Timer + ?Sized,
        C: CommandInput<Command = ResetCommand> + ?Sized,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SessionError::AlreadyStarted);
        }

        tracing::info!(
            key = %self.config.storage_key,
            tick_count = self.config.tick_count,
            interval_ms = u64::try_from(self.config.tick_interval.as_millis()).unwrap_or(u64::MAX),
            "Session started"
        );

        let mut merged = merge_sources([
            tick_events(timer, self.config.tick_interval, self.config.tick_count),
            load_event(storage, self.config.storage_key.clone()),
            reset_events(commands),
        ]);

        while let Some(action) = merged.next().await {
            self.dispatch(action).await?;
        }

        self.store.shutdown(self.config.shutdown_timeout).await?;

        let snapshot = self.snapshot().await;
        tracing::info!(tick_count = snapshot.tick_count, "Session finished");
        Ok(snapshot)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("started", &self.started.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
