//! Given-When-Then testing for reducers
//!
//! Drives a reducer synchronously, without a store or a runtime, and runs
//! assertions against the final state and the effects each action produced.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use tickflow_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion = Box<dyn FnOnce(&[Effect])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Several actions may be queued with repeated `when_action` calls; they are
/// folded in order. State assertions see the state after the last action.
/// Effect assertions see the effects of the last action only; use
/// [`ReducerTest::then_all_effects`] to inspect every effect.
///
/// # Example
///
/// ```ignore
/// use tickflow_testing::ReducerTest;
///
/// ReducerTest::new(SessionReducer::new())
///     .with_env(environment)
///     .given_state(SessionState::default())
///     .when_action(SessionAction::Input(InputEvent::Tick { sequence: 0 }))
///     .then_state(|state| {
///         assert_eq!(state.snapshot.tick_count, 1);
///     })
///     .then_effects(|effects| {
///         assert_eq!(effects.len(), 1);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    last_effect_assertions: Vec<EffectAssertion>,
    all_effect_assertions: Vec<EffectAssertion>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            last_effect_assertions: Vec::new(),
            all_effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Queue an action (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Queue several actions in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect]) + 'static,
    {
        self.last_effect_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of every action, concatenated (Then)
    #[must_use]
    pub fn then_all_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect]) + 'static,
    {
        self.all_effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut all_effects = Vec::new();
        let mut last_len = 0;
        for action in self.actions {
            let effects = self.reducer.reduce(&mut state, action, &env);
            last_len = effects.len();
            all_effects.extend(effects);
        }
        let last_effects = &all_effects[all_effects.len() - last_len..];

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.last_effect_assertions {
            assertion(last_effects);
        }

        for assertion in self.all_effect_assertions {
            assertion(&all_effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use tickflow_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// `Effect::None` counts as no effect.
    ///
    /// # Panics
    ///
    /// Panics if any effect would do work when executed.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects(effects: &[Effect]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects that would do work
    ///
    /// # Panics
    ///
    /// Panics if the count doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_active_effects_count(effects: &[Effect], expected: usize) {
        let active = effects.iter().filter(|e| !e.is_none()).count();
        assert_eq!(
            active, expected,
            "Expected {expected} active effects, but found {active}"
        );
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect(effects: &[Effect]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickflow_core::{SmallVec, smallvec};

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Announce,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect; 4]> {
            match action {
                TestAction::Increment => {
                    state.count += 1;
                    smallvec![Effect::None]
                },
                TestAction::Announce => smallvec![Effect::fire_and_forget(|| {})],
            }
        }
    }

    #[test]
    fn test_single_action() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Increment)
            .then_state(|state| assert_eq!(state.count, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_actions_fold_in_order() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState { count: 5 })
            .when_actions([TestAction::Increment, TestAction::Announce, TestAction::Increment])
            .then_state(|state| assert_eq!(state.count, 7))
            .then_effects(assertions::assert_no_effects)
            .then_all_effects(|effects| {
                assert_eq!(effects.len(), 3);
                assertions::assert_active_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_assertions_no_effects() {
        assertions::assert_no_effects(&[Effect::None]);
        assertions::assert_no_effects(&[]);
        assertions::assert_no_effects(&[Effect::None, Effect::None]);
    }

    #[test]
    #[should_panic(expected = "Expected no effects")]
    fn test_assert_no_effects_rejects_future() {
        assertions::assert_no_effects(&[Effect::fire_and_forget(|| {})]);
    }
}
