//! # Tickflow Core
//!
//! Core traits and types for tickflow.
//!
//! This crate provides the abstractions a tickflow application is built from:
//! a pure reducer that folds actions onto state, effect descriptions that the
//! runtime executes, and the ports through which the outside world (timers,
//! storage, command input) is reached.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```
//! use tickflow_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct TallyState {
//!     total: u64,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum TallyAction {
//!     Add(u64),
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = TallyState;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TallyState,
//!         action: TallyAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect; 4]> {
//!         match action {
//!             TallyAction::Add(n) => state.total += n,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = TallyState::default();
//! TallyReducer.reduce(&mut state, TallyAction::Add(2), &());
//! assert_eq!(state.total, 2);
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// External-interface ports (timer, storage, command input)
pub mod environment;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Folds the action onto the state
        /// 2. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution).
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime in the order the
    /// reducer produced them.
    pub enum Effect {
        /// No-op effect
        None,

        /// Arbitrary async computation
        Future(Pin<Box<dyn Future<Output = ()> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl std::fmt::Debug for Effect {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl Effect {
        /// Run a side effect whose outcome nobody awaits
        #[must_use]
        pub fn fire_and_forget<F>(f: F) -> Effect
        where
            F: FnOnce() + Send + 'static,
        {
            Effect::Future(Box::pin(async move { f() }))
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_effect_debug() {
        assert_eq!(format!("{:?}", Effect::None), "Effect::None");
        assert_eq!(
            format!("{:?}", Effect::fire_and_forget(|| {})),
            "Effect::Future(<future>)"
        );
    }

    #[test]
    fn test_is_none() {
        assert!(Effect::None.is_none());
        assert!(!Effect::fire_and_forget(|| {}).is_none());
    }

    #[test]
    #[allow(clippy::panic)]
    fn test_fire_and_forget_runs_closure_when_polled() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let effect = Effect::fire_and_forget(move || flag.store(true, Ordering::SeqCst));

        let Effect::Future(fut) = effect else {
            panic!("expected Effect::Future");
        };
        assert!(!ran.load(Ordering::SeqCst));

        tokio_test::block_on(fut);
        assert!(ran.load(Ordering::SeqCst));
    }
}
