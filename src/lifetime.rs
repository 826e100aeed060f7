//! Lifecycle mode definitions.

/// Lifecycle modes controlling instance caching behavior
///
/// Defines how instances are created, cached, and destroyed by the
/// container.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Definition, Lifetime};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let container = Container::new();
/// container.register("color", Definition::singleton(|_| Ok(42u32))).unwrap();
///
/// let counter = Arc::new(AtomicU32::new(0));
/// let c = counter.clone();
/// container
///     .register("ticket", Definition::prototype(move |_| Ok(c.fetch_add(1, Ordering::SeqCst) + 1)))
///     .unwrap();
///
/// // Singleton: same instance every time
/// let a = container.resolve::<u32>("color").unwrap();
/// let b = container.resolve::<u32>("color").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Prototype: always a new instance
/// assert_eq!(*container.resolve::<u32>("ticket").unwrap(), 1);
/// assert_eq!(*container.resolve::<u32>("ticket").unwrap(), 2);
///
/// assert_eq!(Definition::prototype(|_| Ok(())).lifetime(), Lifetime::Prototype);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per container, cached until shutdown
    ///
    /// Created lazily on first request (or at start for eager definitions)
    /// and returned with the same identity afterwards. Destroy hooks run
    /// during shutdown in reverse creation order.
    Singleton,
    /// New instance per resolution, never cached
    ///
    /// The container never tracks prototype instances, so a declared
    /// destroy hook is never invoked by it.
    Prototype,
    /// Instance caching delegated to a named [`Scope`](crate::Scope)
    ///
    /// The scope must be registered with
    /// [`Container::register_scope`](crate::Container::register_scope)
    /// before the definition is resolved. Like prototypes, custom-scoped
    /// instances are not destroyed by the container.
    Custom(&'static str),
}

impl Lifetime {
    /// Short name used in logs and descriptors.
    pub fn name(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Prototype => "prototype",
            Lifetime::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
