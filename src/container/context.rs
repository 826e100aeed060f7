//! Resolver context handed to factories.

use std::any::type_name;
use std::sync::Arc;

use crate::container::Container;
use crate::definition::Instance;
use crate::error::{IocError, IocResult};
use crate::internal::ResolutionPath;

/// Context passed to factory functions for resolving dependencies.
///
/// Nested resolutions made through the context are checked for cycles and
/// depth against the identifiers currently under construction on this
/// thread.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, Definition};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// let container = Container::new();
/// container.register("config", Definition::instance(Config { port: 8080 })).unwrap();
/// container
///     .register("server", Definition::singleton(|ctx| {
///         // ctx is a ResolverContext that provides access to other objects
///         Ok(Server { config: ctx.resolve::<Config>("config")? })
///     }))
///     .unwrap();
///
/// assert_eq!(container.resolve::<Server>("server").unwrap().config.port, 8080);
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
    path: &'a ResolutionPath,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(container: &'a Container, path: &'a ResolutionPath) -> Self {
        Self { container, path }
    }

    /// Resolves `id` as a `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self, id: &str) -> IocResult<Arc<T>> {
        self.resolve_any(id)?
            .downcast::<T>()
            .map_err(|_| IocError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolves `id` without downcasting.
    pub fn resolve_any(&self, id: &str) -> IocResult<Instance> {
        self.container.resolve_in(self.path, id)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.container.contains(id)
    }

    /// Number of resolutions currently nested, including the one in progress.
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}
