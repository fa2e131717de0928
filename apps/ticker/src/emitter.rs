//! Completion-triggered persistence emitter.
//!
//! Two independent triggers produce [`PersistenceWriteRequest`]s:
//!
//! - the tick source reaching its terminal state persists the current count,
//!   once per session
//! - every reset command persists zero
//!
//! The emitter only decides *what* to write. Issuing the write is an effect
//! executed by the runtime.

use crate::state::{ApplicationState, InputEvent, PersistenceWriteRequest, SessionPhase};

/// What caused a write request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteTrigger {
    /// The tick source completed
    Completion,
    /// A reset command arrived
    Reset,
}

impl WriteTrigger {
    /// Short label for logs and metrics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Reset => "reset",
        }
    }
}

/// Decides when the tracked value must be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceEmitter {
    key: String,
    phase: SessionPhase,
}

impl PersistenceEmitter {
    /// Create an emitter for the value stored under `key`
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            phase: SessionPhase::Running,
        }
    }

    /// Storage key of the tracked value
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current phase of the tick source
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Write request triggered by an input event, if any
    ///
    /// Only resets trigger a write here, regardless of phase.
    #[must_use]
    pub fn on_input(&self, event: &InputEvent) -> Option<(WriteTrigger, PersistenceWriteRequest)> {
        match event {
            InputEvent::Reset => Some((WriteTrigger::Reset, self.request(0))),
            InputEvent::Tick { .. } | InputEvent::Loaded { .. } => None,
        }
    }

    /// Record that the tick source completed
    ///
    /// The first call moves the phase to `Completed` and returns the request
    /// persisting `snapshot.tick_count`. Later calls return `None`.
    pub fn on_ticks_completed(
        &mut self,
        snapshot: &ApplicationState,
    ) -> Option<(WriteTrigger, PersistenceWriteRequest)> {
        match self.phase {
            SessionPhase::Running => {
                self.phase = SessionPhase::Completed;
                Some((WriteTrigger::Completion, self.request(snapshot.tick_count)))
            },
            SessionPhase::Completed => {
                tracing::debug!("Tick source already completed, ignoring repeat signal");
                None
            },
        }
    }

    fn request(&self, value: u64) -> PersistenceWriteRequest {
        PersistenceWriteRequest {
            key: self.key.clone(),
            value,
        }
    }
}
