//! # Tickflow Testing
//!
//! Testing utilities and helpers for tickflow.
//!
//! This crate provides:
//! - In-memory implementations of the environment ports
//! - A Given-When-Then builder for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```
//! use tickflow_core::environment::{StorageRead, StorageWrite};
//! use tickflow_testing::InMemoryStorage;
//!
//! # tokio_test::block_on(async {
//! let storage = InMemoryStorage::new().with_value("counter", "5");
//! assert_eq!(storage.load("counter").await, Ok(Some("5".to_string())));
//!
//! storage.write("counter", "0");
//! assert_eq!(storage.writes(), vec![("counter".to_string(), "0".to_string())]);
//! # });
//! ```

/// Ergonomic testing utilities for reducers
pub mod reducer_test;

/// Mock implementations of the environment ports
pub mod mocks {
    use futures::StreamExt;
    use futures::stream::BoxStream;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;
    use tickflow_core::environment::{CommandInput, StorageError, StorageRead, StorageWrite, Timer};
    use tokio::sync::mpsc;

    #[derive(Debug, Default)]
    struct StorageInner {
        values: HashMap<String, String>,
        writes: Vec<(String, String)>,
        read_failure: Option<StorageError>,
    }

    /// In-memory key/value storage
    ///
    /// Implements both [`StorageRead`] and [`StorageWrite`]. Every write is
    /// applied immediately and appended to a log that tests can inspect.
    /// Clones share the same backing map.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryStorage {
        inner: Arc<Mutex<StorageInner>>,
    }

    impl InMemoryStorage {
        /// Create an empty storage
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a raw value under `key`
        #[must_use]
        pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.lock().values.insert(key.into(), value.into());
            self
        }

        /// Make every subsequent read fail with `error`
        #[must_use]
        pub fn with_read_failure(self, error: StorageError) -> Self {
            self.lock().read_failure = Some(error);
            self
        }

        /// Current raw value under `key`
        #[must_use]
        pub fn get(&self, key: &str) -> Option<String> {
            self.lock().values.get(key).cloned()
        }

        /// Every write seen so far, in the order it was issued
        #[must_use]
        pub fn writes(&self) -> Vec<(String, String)> {
            self.lock().writes.clone()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, StorageInner> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl StorageRead for InMemoryStorage {
        fn load(
            &self,
            key: &str,
        ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StorageError>> + Send + '_>>
        {
            let inner = self.lock();
            let result = match &inner.read_failure {
                Some(error) => Err(error.clone()),
                None => Ok(inner.values.get(key).cloned()),
            };
            drop(inner);
            Box::pin(futures::future::ready(result))
        }
    }

    impl StorageWrite for InMemoryStorage {
        fn write(&self, key: &str, value: &str) {
            let mut inner = self.lock();
            inner.values.insert(key.to_string(), value.to_string());
            inner.writes.push((key.to_string(), value.to_string()));
        }
    }

    /// Channel-backed command input
    ///
    /// Commands pushed through the sender returned by [`CommandChannel::new`]
    /// come out of the stream returned by the first
    /// [`CommandInput::subscribe`] call. The stream ends once every sender has
    /// been dropped. Later subscriptions get an empty stream.
    #[derive(Debug)]
    pub struct CommandChannel<C> {
        receiver: Mutex<Option<mpsc::UnboundedReceiver<C>>>,
    }

    impl<C> CommandChannel<C> {
        /// Create an open channel and the sender that feeds it
        #[must_use]
        pub fn new() -> (Self, mpsc::UnboundedSender<C>) {
            let (sender, receiver) = mpsc::unbounded_channel();
            let channel = Self {
                receiver: Mutex::new(Some(receiver)),
            };
            (channel, sender)
        }

        /// A channel whose stream yields `commands` and then ends
        #[must_use]
        pub fn closed_with(commands: impl IntoIterator<Item = C>) -> Self {
            let (channel, sender) = Self::new();
            for command in commands {
                let _ = sender.send(command);
            }
            channel
        }
    }

    impl<C: Send + 'static> CommandInput for CommandChannel<C> {
        type Command = C;

        fn subscribe(&self) -> BoxStream<'static, C> {
            let receiver = self
                .receiver
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            match receiver {
                Some(mut rx) => async_stream::stream! {
                    while let Some(command) = rx.recv().await {
                        yield command;
                    }
                }
                .boxed(),
                None => futures::stream::empty().boxed(),
            }
        }
    }

    /// Timer that yields all ticks immediately
    ///
    /// Ignores the interval. Records every subscription so tests can check
    /// what was asked for.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedTimer {
        subscriptions: Arc<Mutex<Vec<(Duration, u64)>>>,
    }

    impl ScriptedTimer {
        /// Create a new scripted timer
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Every `(interval, count)` this timer was subscribed with
        #[must_use]
        pub fn subscriptions(&self) -> Vec<(Duration, u64)> {
            self.subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl Timer for ScriptedTimer {
        fn ticks(&self, interval: Duration, count: u64) -> BoxStream<'static, u64> {
            self.subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((interval, count));
            futures::stream::iter(0..count).boxed()
        }
    }

    /// Timer whose ticks are released by hand
    ///
    /// Each `()` pushed through the sender returned by [`ManualTimer::new`]
    /// releases one tick. The stream ends after `count` ticks, or early once
    /// every sender has been dropped. Later subscriptions get an empty stream.
    #[derive(Debug)]
    pub struct ManualTimer {
        releases: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
    }

    impl ManualTimer {
        /// Create a timer and the sender that releases its ticks
        #[must_use]
        pub fn new() -> (Self, mpsc::UnboundedSender<()>) {
            let (sender, receiver) = mpsc::unbounded_channel();
            let timer = Self {
                releases: Mutex::new(Some(receiver)),
            };
            (timer, sender)
        }
    }

    impl Timer for ManualTimer {
        fn ticks(&self, _interval: Duration, count: u64) -> BoxStream<'static, u64> {
            let releases = self
                .releases
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            match releases {
                Some(mut rx) => async_stream::stream! {
                    for sequence in 0..count {
                        if rx.recv().await.is_none() {
                            break;
                        }
                        yield sequence;
                    }
                }
                .boxed(),
                None => futures::stream::empty().boxed(),
            }
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a `fmt` subscriber that writes through the test harness
    ///
    /// Safe to call from every test; only the first call installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{CommandChannel, InMemoryStorage, ManualTimer, ScriptedTimer};
pub use reducer_test::{ReducerTest, assertions};
