//! Diagnostic observers for resolution traceability.
//!
//! Observers are notified around every construction the container performs
//! (cache hits are not reported). They are called synchronously, so keep
//! implementations lightweight.

use std::sync::Arc;
use std::time::Duration;

use crate::error::IocError;

/// Observer trait for resolution events.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, Definition, IocError, ResolutionObserver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     events: Mutex<Vec<String>>,
/// }
///
/// impl ResolutionObserver for Recorder {
///     fn resolving(&self, id: &str) {
///         self.events.lock().unwrap().push(format!("resolving {}", id));
///     }
///
///     fn resolved(&self, id: &str, _duration: Duration) {
///         self.events.lock().unwrap().push(format!("resolved {}", id));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Container::new();
/// container.add_observer(recorder.clone());
/// container.register("n", Definition::singleton(|_| Ok(1u8))).unwrap();
/// container.resolve::<u8>("n").unwrap();
///
/// assert_eq!(*recorder.events.lock().unwrap(), vec!["resolving n", "resolved n"]);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called before dependencies and the construction rule run.
    fn resolving(&self, id: &str);

    /// Called after both hook passes completed.
    fn resolved(&self, id: &str, duration: Duration);

    /// Called when construction or a hook failed.
    fn failed(&self, _id: &str, _error: &IocError) {}
}

/// Registered observers, snapshotted before each notification round.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, id: &str) {
        for observer in &self.observers {
            observer.resolving(id);
        }
    }

    pub(crate) fn resolved(&self, id: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(id, duration);
        }
    }

    pub(crate) fn failed(&self, id: &str, error: &IocError) {
        for observer in &self.observers {
            observer.failed(id, error);
        }
    }
}

/// Built-in observer emitting `tracing` events.
///
/// ```
/// use ferrous_ioc::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.add_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "ferrous-ioc".to_string(),
        }
    }

    /// Creates a logging observer whose events carry a custom `source` field.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, id: &str) {
        tracing::info!(source = %self.prefix, id, "resolving");
    }

    fn resolved(&self, id: &str, duration: Duration) {
        tracing::info!(source = %self.prefix, id, ?duration, "resolved");
    }

    fn failed(&self, id: &str, error: &IocError) {
        tracing::warn!(source = %self.prefix, id, %error, "resolution failed");
    }
}
