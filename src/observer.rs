//! Observer hooks for resolution events.
//!
//! Observers see every call to [`Container::resolve`](crate::Container::resolve),
//! including nested dependency resolutions, plus descriptor introspection and
//! eviction in the reflection cache.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;

/// Observer of resolution events.
///
/// All hooks default to no-ops. Calls are synchronous and happen on the
/// resolving thread, so implementations should stay cheap.
///
/// # Examples
///
/// ```
/// use ferrous_autowire::{Container, Key, ResolutionObserver, TypeCatalog};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting(AtomicUsize);
///
/// impl ResolutionObserver for Counting {
///     fn resolved(&self, _key: &Key, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// struct Clock;
///
/// let catalog = TypeCatalog::new();
/// let clock = catalog.register::<Clock>().construct_with(|| Clock);
///
/// let counting = Arc::new(Counting::default());
/// let container = Container::builder(Arc::new(catalog))
///     .add_observer(counting.clone())
///     .build()
///     .unwrap();
///
/// container.resolve(&clock).unwrap();
/// assert_eq!(counting.0.load(Ordering::Relaxed), 1);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Resolution of `key` (as requested, before canonicalization) starts.
    fn resolving(&self, key: &Key) {
        let _ = key;
    }

    /// Resolution of `key` succeeded.
    fn resolved(&self, key: &Key, duration: Duration) {
        let _ = (key, duration);
    }

    /// Resolution of `key` failed with `error`.
    fn failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }

    /// A descriptor for the concrete `key` was built by introspection.
    fn introspected(&self, key: &Key) {
        let _ = key;
    }

    /// The descriptor for `key` was evicted from the reflection cache.
    fn evicted(&self, key: &Key) {
        let _ = key;
    }
}

/// Registered observers.
///
/// Cheap to check when empty; the container skips timing entirely then.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.failed(key, error);
        }
    }

    #[inline]
    pub(crate) fn introspected(&self, key: &Key) {
        for observer in &self.observers {
            observer.introspected(key);
        }
    }

    #[inline]
    pub(crate) fn evicted(&self, key: &Key) {
        for observer in &self.observers {
            observer.evicted(key);
        }
    }
}

/// Observer forwarding every event to `tracing`.
///
/// Resolutions are logged at `debug`, failures at `warn`, cache activity at
/// `trace`. Events carry the observer's prefix in a `container` field so several
/// containers can be told apart.
///
/// ```
/// use ferrous_autowire::{Container, LoggingObserver, TypeCatalog};
/// use std::sync::Arc;
///
/// let container = Container::builder(Arc::new(TypeCatalog::new()))
///     .add_observer(Arc::new(LoggingObserver::with_prefix("app")))
///     .build()
///     .unwrap();
/// # let _ = container;
/// ```
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self::with_prefix("ferrous-autowire")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(container = %self.prefix, key = %key.as_str(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(
            container = %self.prefix,
            key = %key.as_str(),
            elapsed = ?duration,
            "resolved"
        );
    }

    fn failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(
            container = %self.prefix,
            key = %key.as_str(),
            error = %error,
            "resolution failed"
        );
    }

    fn introspected(&self, key: &Key) {
        tracing::trace!(container = %self.prefix, key = %key.as_str(), "introspected");
    }

    fn evicted(&self, key: &Key) {
        tracing::trace!(container = %self.prefix, key = %key.as_str(), "descriptor evicted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl ResolutionObserver for Recording {
        fn resolving(&self, key: &Key) {
            self.0.lock().push(format!("resolving {key}"));
        }

        fn failed(&self, key: &Key, _error: &DiError) {
            self.0.lock().push(format!("failed {key}"));
        }
    }

    #[test]
    fn fans_out_to_every_observer() {
        let first = Arc::new(Recording::default());
        let second = Arc::new(Recording::default());

        let mut observers = Observers::new();
        assert!(!observers.has_observers());
        observers.add(first.clone());
        observers.add(second.clone());
        assert!(observers.has_observers());

        let key = Key::new("app::Mailer");
        observers.resolving(&key);
        observers.failed(&key, &DiError::DepthExceeded(1));
        // Hooks without overrides are no-ops
        observers.evicted(&key);

        for recording in [first, second] {
            assert_eq!(
                *recording.0.lock(),
                vec!["resolving app::Mailer".to_string(), "failed app::Mailer".to_string()]
            );
        }
    }

    #[test]
    fn logging_observer_prefix() {
        assert_eq!(LoggingObserver::new().prefix(), "ferrous-autowire");
        assert_eq!(LoggingObserver::with_prefix("api").prefix(), "api");
    }
}
