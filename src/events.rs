//! Container lifecycle events and listeners.

use crate::container::Container;
use crate::error::BoxError;

/// Events published by the container to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEvent {
    /// The container became active: definition processors have run and
    /// eager singletons exist. Listeners may resolve objects and see them
    /// fully post-processed, which makes this the place for work that must
    /// run on the final (possibly wrapped) objects.
    Started,
    /// Shutdown began. Singletons are still reachable; destroy hooks have
    /// not run yet.
    Closing,
}

impl ContainerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerEvent::Started => "started",
            ContainerEvent::Closing => "closing",
        }
    }
}

/// Receives [`ContainerEvent`]s in registration order.
///
/// Closures taking `(&ContainerEvent, &Container)` implement this trait.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{BoxError, Container, ContainerEvent, Definition};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let started = Arc::new(AtomicBool::new(false));
/// let flag = started.clone();
///
/// let container = Container::new();
/// container.register("greeting", Definition::singleton(|_| Ok("hi")).eager()).unwrap();
/// container.add_listener(Arc::new(move |event: &ContainerEvent, c: &Container| -> Result<(), BoxError> {
///     if *event == ContainerEvent::Started {
///         assert_eq!(*c.resolve::<&str>("greeting")?, "hi");
///         flag.store(true, Ordering::SeqCst);
///     }
///     Ok(())
/// }));
///
/// container.start().unwrap();
/// assert!(started.load(Ordering::SeqCst));
/// ```
pub trait ContainerListener: Send + Sync {
    fn on_event(&self, event: &ContainerEvent, container: &Container) -> Result<(), BoxError>;
}

impl<F> ContainerListener for F
where
    F: Fn(&ContainerEvent, &Container) -> Result<(), BoxError> + Send + Sync,
{
    fn on_event(&self, event: &ContainerEvent, container: &Container) -> Result<(), BoxError> {
        self(event, container)
    }
}
