//! Data model: application snapshots, input events, write requests.

use serde::{Deserialize, Serialize};

/// Application state snapshot
///
/// Produced once per [`InputEvent`] and never edited afterwards; the next
/// event produces a new snapshot via [`ApplicationState::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationState {
    /// Ticks observed so far, on top of the loaded baseline
    pub tick_count: u64,
    /// This snapshot was produced by a tick
    pub is_tick: bool,
    /// This snapshot was produced by a reset command
    pub is_reset: bool,
}

impl ApplicationState {
    /// State at session start: no ticks, no flags
    pub const INITIAL: Self = Self {
        tick_count: 0,
        is_tick: false,
        is_reset: false,
    };

    /// Fold one event onto this snapshot, producing the next one.
    ///
    /// The flags come from the event kind alone, so `is_tick` and `is_reset`
    /// are never both set. A reset leaves `tick_count` alone; only the
    /// persisted value is zeroed (see `PersistenceEmitter`).
    #[must_use]
    pub const fn apply(self, event: &InputEvent) -> Self {
        match *event {
            InputEvent::Tick { .. } => Self {
                tick_count: self.tick_count.saturating_add(1),
                is_tick: true,
                is_reset: false,
            },
            InputEvent::Loaded { value } => Self {
                tick_count: match value {
                    Some(value) => value,
                    None => 0,
                },
                is_tick: false,
                is_reset: false,
            },
            InputEvent::Reset => Self {
                tick_count: self.tick_count,
                is_tick: false,
                is_reset: true,
            },
        }
    }

    /// One-line status for logs and plain-text displays
    #[must_use]
    pub fn summary(&self) -> String {
        let marker = if self.is_tick {
            " (tick)"
        } else if self.is_reset {
            " (reset requested)"
        } else {
            ""
        };
        format!("{} seconds elapsed{marker}", self.tick_count)
    }
}

/// An event from one of the three sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Periodic timer tick, numbered from 0
    Tick {
        /// Position of this tick in the timer sequence
        sequence: u64,
    },
    /// Result of reading the persisted counter
    Loaded {
        /// Stored value, `None` when nothing (or nothing usable) was stored
        value: Option<u64>,
    },
    /// External reset command
    Reset,
}

impl InputEvent {
    /// Short label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Loaded { .. } => "loaded",
            Self::Reset => "reset",
        }
    }

    /// Build a `Loaded` event from a raw stored value
    ///
    /// A value [`parse_stored_value`] rejects is treated as absent.
    #[must_use]
    pub fn loaded_from_raw(raw: Option<&str>) -> Self {
        let value = raw.and_then(|raw| {
            let parsed = parse_stored_value(raw);
            if parsed.is_none() {
                tracing::warn!(raw, "Ignoring malformed stored value");
            }
            parsed
        });
        Self::Loaded { value }
    }
}

/// Parse a stored counter value
///
/// Reads the leading base-10 integer the way stored values have always been
/// read: leading whitespace and one `+` or `-` sign are skipped, then the
/// run of digits is taken and anything after it is ignored, so `"12abc"` is
/// 12 and `"3.7"` is 3. No digits, a negative number or a value beyond
/// `u64::MAX` yields `None`.
#[must_use]
pub fn parse_stored_value(raw: &str) -> Option<u64> {
    let text = raw.trim_start();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let (digits, _) = unsigned.split_at(digits_end);
    if digits.is_empty() {
        return None;
    }

    let value: u64 = digits.parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

/// Request to persist the counter
///
/// Handed to the storage writer and forgotten; nothing waits on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistenceWriteRequest {
    /// Storage key of the tracked value
    pub key: String,
    /// Value to store
    pub value: u64,
}

/// Phase of the timer source within a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Ticks are still arriving
    #[default]
    Running,
    /// The tick source is exhausted; ticks never resume
    Completed,
}

/// The command a reset input produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResetCommand;

impl From<ResetCommand> for InputEvent {
    fn from(_: ResetCommand) -> Self {
        Self::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(ApplicationState::INITIAL, ApplicationState::default());
    }

    #[test]
    fn test_tick_increments_and_flags() {
        let state = ApplicationState::INITIAL.apply(&InputEvent::Tick { sequence: 0 });
        assert_eq!(
            state,
            ApplicationState {
                tick_count: 1,
                is_tick: true,
                is_reset: false
            }
        );
    }

    #[test]
    fn test_loaded_sets_baseline_without_incrementing() {
        let state = ApplicationState {
            tick_count: 9,
            is_tick: true,
            is_reset: false,
        }
        .apply(&InputEvent::Loaded { value: Some(5) });

        assert_eq!(state.tick_count, 5);
        assert!(!state.is_tick);
        assert!(!state.is_reset);
    }

    #[test]
    fn test_loaded_absent_is_zero() {
        let state = ApplicationState {
            tick_count: 4,
            ..ApplicationState::INITIAL
        }
        .apply(&InputEvent::Loaded { value: None });

        assert_eq!(state.tick_count, 0);
    }

    #[test]
    fn test_reset_keeps_count_in_memory() {
        let state = ApplicationState::INITIAL
            .apply(&InputEvent::Tick { sequence: 0 })
            .apply(&InputEvent::Reset);

        assert_eq!(state.tick_count, 1);
        assert!(state.is_reset);
        assert!(!state.is_tick);
    }

    #[test]
    fn test_tick_saturates() {
        let state = ApplicationState {
            tick_count: u64::MAX,
            ..ApplicationState::INITIAL
        }
        .apply(&InputEvent::Tick { sequence: 0 });

        assert_eq!(state.tick_count, u64::MAX);
    }

    #[test]
    fn test_parse_stored_value() {
        assert_eq!(parse_stored_value("12"), Some(12));
        assert_eq!(parse_stored_value(" 7\n"), Some(7));
        assert_eq!(parse_stored_value("+4"), Some(4));
        assert_eq!(parse_stored_value("-0"), Some(0));
        assert_eq!(parse_stored_value(""), None);
        assert_eq!(parse_stored_value("   "), None);
        assert_eq!(parse_stored_value("-3"), None);
        assert_eq!(parse_stored_value("NaN"), None);
        assert_eq!(parse_stored_value("abc12"), None);
        assert_eq!(parse_stored_value("+-1"), None);
        assert_eq!(parse_stored_value("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_stored_value_takes_leading_digits() {
        assert_eq!(parse_stored_value("12abc"), Some(12));
        assert_eq!(parse_stored_value("3.7"), Some(3));
        assert_eq!(parse_stored_value("  42 seconds"), Some(42));
        assert_eq!(parse_stored_value("1e3"), Some(1));
    }

    #[test]
    fn test_loaded_from_raw_degrades_to_absent() {
        assert_eq!(
            InputEvent::loaded_from_raw(Some("garbage")),
            InputEvent::Loaded { value: None }
        );
        assert_eq!(
            InputEvent::loaded_from_raw(None),
            InputEvent::Loaded { value: None }
        );
        assert_eq!(
            InputEvent::loaded_from_raw(Some("5")),
            InputEvent::Loaded { value: Some(5) }
        );
    }

    #[test]
    fn test_summary() {
        let tick = ApplicationState {
            tick_count: 3,
            is_tick: true,
            is_reset: false,
        };
        assert_eq!(tick.summary(), "3 seconds elapsed (tick)");
        assert_eq!(ApplicationState::INITIAL.summary(), "0 seconds elapsed");
    }
}
