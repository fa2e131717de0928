//! Event sources and their production implementations.
//!
//! Each source is turned into a stream of [`SessionAction`]s so the
//! scheduler can merge them without knowing where they came from.

use crate::reducer::SessionAction;
use crate::state::{InputEvent, ResetCommand};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::sync::Arc;
use std::time::Duration;
use tickflow_core::environment::{CommandInput, StorageRead, Timer};
use tokio::time::{Instant, MissedTickBehavior};

/// Timer backed by `tokio::time::interval_at`
///
/// The first tick fires one full interval after the stream is first polled.
/// A zero interval is raised to one millisecond.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn ticks(&self, interval: Duration, count: u64) -> BoxStream<'static, u64> {
        let period = interval.max(Duration::from_millis(1));
        async_stream::stream! {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for sequence in 0..count {
                ticker.tick().await;
                yield sequence;
            }
        }
        .boxed()
    }
}

/// Tick events followed by the completion signal
///
/// `TicksCompleted` is appended when the timer stream ends, which is how
/// the emitter observes the terminal transition.
pub fn tick_events<T>(timer: &T, interval: Duration, count: u64) -> BoxStream<'static, SessionAction>
where
    T: Timer + ?Sized,
{
    timer
        .ticks(interval, count)
        .map(|sequence| SessionAction::Input(InputEvent::Tick { sequence }))
        .chain(stream::once(async {
            tracing::info!("Tick source completed");
            SessionAction::TicksCompleted
        }))
        .boxed()
}

/// The one-shot persisted-value load
///
/// A failed read degrades to `Loaded { value: None }`, as does a malformed
/// stored value.
pub fn load_event(storage: Arc<dyn StorageRead>, key: String) -> BoxStream<'static, SessionAction> {
    stream::once(async move {
        let raw = match storage.load(&key).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "Stored value unreadable, using baseline 0");
                None
            },
        };
        SessionAction::Input(InputEvent::loaded_from_raw(raw.as_deref()))
    })
    .boxed()
}

/// Reset commands as input events
pub fn reset_events<C>(input: &C) -> BoxStream<'static, SessionAction>
where
    C: CommandInput<Command = ResetCommand> + ?Sized,
{
    input
        .subscribe()
        .map(|command| SessionAction::Input(InputEvent::from(command)))
        .boxed()
}

/// Interpret one line of text input as a command
///
/// `reset` or `r` (case-insensitive, surrounding whitespace ignored) is a
/// reset; anything else is not a command.
#[must_use]
pub fn parse_command(line: &str) -> Option<ResetCommand> {
    let command = line.trim();
    (command.eq_ignore_ascii_case("reset") || command.eq_ignore_ascii_case("r"))
        .then_some(ResetCommand)
}
