//! Instance processors and definition processors.
//!
//! Every constructed object goes through two passes over the registered
//! [`InstanceProcessor`]s: `before_init` on the raw object, then the
//! definition's init hook, then `after_init`. Both passes run in
//! registration order and each processor may hand back a replacement. The
//! object coming out of the post-init pass is what callers receive, which is
//! how wrapping (proxying) is expressed.
//!
//! [`DefinitionProcessor`]s run once at container start, before any object
//! exists, and may inspect or replace definitions.

use std::any::type_name;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::definition::{Definition, Instance};
use crate::error::{BoxError, IocError, IocResult};

/// A processor observing both hook passes.
///
/// Both methods default to returning the object untouched, so an
/// implementation only overrides the pass it cares about.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{BoxError, Container, Definition, Instance, InstanceProcessor};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct CountingProcessor {
///     seen: AtomicUsize,
/// }
///
/// impl InstanceProcessor for CountingProcessor {
///     fn before_init(&self, _id: &str, instance: Instance) -> Result<Instance, BoxError> {
///         self.seen.fetch_add(1, Ordering::SeqCst);
///         Ok(instance)
///     }
/// }
///
/// let counting = Arc::new(CountingProcessor::default());
/// let container = Container::new();
/// container.add_processor(counting.clone());
/// container.register("answer", Definition::singleton(|_| Ok(42u32))).unwrap();
///
/// container.resolve::<u32>("answer").unwrap();
/// container.resolve::<u32>("answer").unwrap(); // cached, no second pass
/// assert_eq!(counting.seen.load(Ordering::SeqCst), 1);
/// ```
pub trait InstanceProcessor: Send + Sync {
    /// Called with the raw constructed object, before the init hook.
    fn before_init(&self, _id: &str, instance: Instance) -> Result<Instance, BoxError> {
        Ok(instance)
    }

    /// Called after the init hook; the returned object is what callers see.
    fn after_init(&self, _id: &str, instance: Instance) -> Result<Instance, BoxError> {
        Ok(instance)
    }

    /// Name used in error reports.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

/// Which pass a closure hook participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Before,
    After,
}

/// Closure hook over erased instances, registered via
/// `add_pre_init_hook` / `add_post_init_hook`.
pub(crate) struct FnHook<F> {
    pass: Pass,
    name: String,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&str, Instance) -> Result<Instance, BoxError> + Send + Sync + 'static,
{
    pub(crate) fn new(pass: Pass, index: usize, f: F) -> Self {
        let name = match pass {
            Pass::Before => format!("pre-init hook #{index}"),
            Pass::After => format!("post-init hook #{index}"),
        };
        Self { pass, name, f }
    }
}

impl<F> InstanceProcessor for FnHook<F>
where
    F: Fn(&str, Instance) -> Result<Instance, BoxError> + Send + Sync + 'static,
{
    fn before_init(&self, id: &str, instance: Instance) -> Result<Instance, BoxError> {
        match self.pass {
            Pass::Before => (self.f)(id, instance),
            Pass::After => Ok(instance),
        }
    }

    fn after_init(&self, id: &str, instance: Instance) -> Result<Instance, BoxError> {
        match self.pass {
            Pass::After => (self.f)(id, instance),
            Pass::Before => Ok(instance),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Typed closure hook applied only to instances of type `T`.
///
/// Instances of any other type pass through untouched. The replacement must
/// be a `T` as well, so typed callers keep resolving successfully.
pub(crate) struct TypedHook<T, F> {
    pass: Pass,
    name: String,
    f: F,
    _marker: PhantomData<fn(Arc<T>) -> Arc<T>>,
}

impl<T, F> TypedHook<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&str, Arc<T>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
{
    pub(crate) fn new(pass: Pass, f: F) -> Self {
        let name = match pass {
            Pass::Before => format!("pre-init hook for {}", type_name::<T>()),
            Pass::After => format!("post-init hook for {}", type_name::<T>()),
        };
        Self {
            pass,
            name,
            f,
            _marker: PhantomData,
        }
    }

    fn apply(&self, id: &str, instance: Instance) -> Result<Instance, BoxError> {
        match instance.downcast::<T>() {
            Ok(typed) => (self.f)(id, typed).map(|replaced| replaced as Instance),
            Err(other) => Ok(other),
        }
    }
}

impl<T, F> InstanceProcessor for TypedHook<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&str, Arc<T>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
{
    fn before_init(&self, id: &str, instance: Instance) -> Result<Instance, BoxError> {
        match self.pass {
            Pass::Before => self.apply(id, instance),
            Pass::After => Ok(instance),
        }
    }

    fn after_init(&self, id: &str, instance: Instance) -> Result<Instance, BoxError> {
        match self.pass {
            Pass::After => self.apply(id, instance),
            Pass::Before => Ok(instance),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Start-time hook over the definition table.
///
/// Runs once, when the container moves from unstarted to active, before any
/// object is constructed. Typical use is swapping an implementation for
/// another one without touching the registration code.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{BoxError, Container, Definition, DefinitionProcessor, DefinitionRegistry};
/// use std::sync::Arc;
///
/// struct UpgradeQuoter;
///
/// impl DefinitionProcessor for UpgradeQuoter {
///     fn process(&self, registry: &mut DefinitionRegistry) -> Result<(), BoxError> {
///         if registry.contains("quoter") {
///             registry.replace("quoter", Definition::singleton(|_| Ok("I'll be back, v2")))?;
///         }
///         Ok(())
///     }
/// }
///
/// let container = Container::new();
/// container.register("quoter", Definition::singleton(|_| Ok("I'll be back"))).unwrap();
/// container.add_definition_processor(Arc::new(UpgradeQuoter));
///
/// assert_eq!(*container.resolve::<&str>("quoter").unwrap(), "I'll be back, v2");
/// ```
pub trait DefinitionProcessor: Send + Sync {
    fn process(&self, registry: &mut DefinitionRegistry) -> Result<(), BoxError>;
}

impl<F> DefinitionProcessor for F
where
    F: Fn(&mut DefinitionRegistry) -> Result<(), BoxError> + Send + Sync,
{
    fn process(&self, registry: &mut DefinitionRegistry) -> Result<(), BoxError> {
        self(registry)
    }
}

/// Mutable view of the definition table handed to definition processors.
pub struct DefinitionRegistry<'a> {
    definitions: &'a mut HashMap<String, Arc<Definition>>,
}

impl<'a> DefinitionRegistry<'a> {
    pub(crate) fn new(definitions: &'a mut HashMap<String, Arc<Definition>>) -> Self {
        Self { definitions }
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.definitions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(id).map(|d| d.as_ref())
    }

    /// Replaces an existing definition.
    pub fn replace(&mut self, id: &str, definition: Definition) -> IocResult<()> {
        match self.definitions.get_mut(id) {
            Some(slot) => {
                tracing::debug!(id, "definition replaced by processor");
                *slot = Arc::new(definition);
                Ok(())
            }
            None => Err(IocError::UnknownIdentifier(id.to_string())),
        }
    }

    /// Adds a new definition.
    pub fn register(&mut self, id: impl Into<String>, definition: Definition) -> IocResult<()> {
        let id = id.into();
        if self.definitions.contains_key(&id) {
            return Err(IocError::DuplicateDefinition(id));
        }
        self.definitions.insert(id, Arc::new(definition));
        Ok(())
    }
}
