//! Session reducer: folds merged source events onto the session state.

use crate::emitter::{PersistenceEmitter, WriteTrigger};
use crate::state::{ApplicationState, InputEvent, PersistenceWriteRequest, SessionPhase};
use std::sync::Arc;
use tickflow_core::environment::StorageWrite;
use tickflow_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Everything the merge scheduler feeds the reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// An event from one of the three sources
    Input(InputEvent),
    /// The tick source reached its terminal state
    TicksCompleted,
}

impl From<InputEvent> for SessionAction {
    fn from(event: InputEvent) -> Self {
        Self::Input(event)
    }
}

/// State owned by the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Latest application snapshot
    pub snapshot: ApplicationState,
    /// Persistence trigger bookkeeping (including the session phase)
    pub emitter: PersistenceEmitter,
}

impl SessionState {
    /// Fresh session state for the value stored under `key`
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            snapshot: ApplicationState::INITIAL,
            emitter: PersistenceEmitter::new(key),
        }
    }

    /// Phase of the tick source
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.emitter.phase()
    }
}

/// Session environment
///
/// Holds the storage writer that persistence requests are handed to.
#[derive(Clone)]
pub struct SessionEnvironment {
    writer: Arc<dyn StorageWrite>,
}

impl SessionEnvironment {
    /// Create an environment around a storage writer
    #[must_use]
    pub fn new(writer: Arc<dyn StorageWrite>) -> Self {
        Self { writer }
    }

    /// Describe handing `request` to the storage writer
    ///
    /// The store runs these in fold order, so a reset's zero write always
    /// lands after any earlier completion write.
    fn persist(&self, trigger: WriteTrigger, request: PersistenceWriteRequest) -> Effect {
        let writer = Arc::clone(&self.writer);
        Effect::fire_and_forget(move || {
            tracing::debug!(
                key = %request.key,
                value = request.value,
                trigger = trigger.as_str(),
                "Issuing persistence write"
            );
            metrics::counter!("ticker.persistence.requests", "trigger" => trigger.as_str())
                .increment(1);
            writer.write(&request.key, &request.value.to_string());
        })
    }
}

impl std::fmt::Debug for SessionEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEnvironment").finish_non_exhaustive()
    }
}

/// Session reducer
///
/// Input events replace the snapshot with `snapshot.apply(event)`; resets
/// and the tick-completion signal additionally yield a persistence effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Create a new session reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> SmallVec<[Effect; 4]> {
        let request = match action {
            SessionAction::Input(event) => {
                state.snapshot = state.snapshot.apply(&event);
                state.emitter.on_input(&event)
            },
            SessionAction::TicksCompleted => state.emitter.on_ticks_completed(&state.snapshot),
        };

        match request {
            Some((trigger, request)) => smallvec![environment.persist(trigger, request)],
            None => smallvec![Effect::None],
        }
    }
}
