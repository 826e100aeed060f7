//! The container: definitions, singleton cache and lifecycle state machine.
//!
//! This module contains the [`Container`] type and the [`ResolverContext`]
//! handed to factories while an object is being constructed.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::config::ContainerConfig;
use crate::definition::{ConstructorArg, ConstructorArgs, Construction, Definition, Instance};
use crate::descriptors::DefinitionDescriptor;
use crate::error::{BoxError, HookPhase, IocError, IocResult};
use crate::events::{ContainerEvent, ContainerListener};
use crate::hooks::{DefinitionProcessor, DefinitionRegistry, FnHook, InstanceProcessor, Pass, TypedHook};
use crate::internal::{DestroyQueue, ResolutionPath};
use crate::lifetime::Lifetime;
use crate::observer::{Observers, ResolutionObserver};
use crate::scope::Scope;
use crate::validation::{self, ValidationReport};

pub mod context;
pub use context::ResolverContext;

/// Lifecycle state of a [`Container`].
///
/// `Unstarted → Active → Closed`; there is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Definitions and hooks can be registered; nothing was built yet.
    Unstarted,
    /// Objects can be resolved and definitions registered.
    Active,
    /// Terminal: `resolve` and `register` fail with `ContainerClosed`.
    Closed,
}

/// Inversion-of-control container.
///
/// Owns object definitions, constructs objects on request, runs the
/// two-pass hook pipeline, caches singletons and destroys them on
/// [`shutdown`](Container::shutdown).
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone (it shares an `Arc`
/// internally). Concurrent first requests for the same singleton are
/// serialized per identifier, so at most one instance is ever built.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, Definition};
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
/// let a = container.resolve::<u32>("color").unwrap();
/// let b = container.resolve::<u32>("color").unwrap();
/// assert_eq!(*a, 42);
/// assert!(Arc::ptr_eq(&a, &b));
///
/// let tickets: Vec<u32> = (0..3).map(|_| *container.resolve::<u32>("ticket").unwrap()).collect();
/// assert_eq!(tickets, vec![1, 2, 3]);
///
/// container.shutdown().unwrap();
/// assert!(container.resolve::<u32>("color").is_err());
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    config: ContainerConfig,
    /// Per-thread stack of identifiers under construction.
    path: ResolutionPath,
    state: RwLock<ContainerState>,
    /// Serializes start and shutdown.
    lifecycle: Mutex<()>,
    definitions: RwLock<HashMap<String, Arc<Definition>>>,
    singletons: RwLock<HashMap<String, Instance>>,
    destroy_queue: Mutex<DestroyQueue>,
    creation_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    processors: RwLock<Vec<Arc<dyn InstanceProcessor>>>,
    definition_processors: RwLock<Vec<Arc<dyn DefinitionProcessor>>>,
    listeners: RwLock<Vec<Arc<dyn ContainerListener>>>,
    observers: RwLock<Observers>,
    scopes: RwLock<HashMap<&'static str, Arc<dyn Scope>>>,
}

impl Container {
    /// Creates an unstarted container with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                path: ResolutionPath::new(config.max_depth),
                config,
                state: RwLock::new(ContainerState::Unstarted),
                lifecycle: Mutex::new(()),
                definitions: RwLock::new(HashMap::new()),
                singletons: RwLock::new(HashMap::new()),
                destroy_queue: Mutex::new(DestroyQueue::default()),
                creation_locks: Mutex::new(HashMap::new()),
                processors: RwLock::new(Vec::new()),
                definition_processors: RwLock::new(Vec::new()),
                listeners: RwLock::new(Vec::new()),
                observers: RwLock::new(Observers::default()),
                scopes: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ContainerState {
        *self.inner.state.read()
    }

    // ===== Registration =====

    /// Adds a definition under a unique identifier.
    ///
    /// Fails with [`IocError::DuplicateDefinition`] if `id` is taken and with
    /// [`IocError::ContainerClosed`] after shutdown.
    pub fn register(&self, id: impl Into<String>, definition: Definition) -> IocResult<()> {
        let id = id.into();
        let state = self.inner.state.read();
        if *state == ContainerState::Closed {
            return Err(IocError::ContainerClosed);
        }

        let mut definitions = self.inner.definitions.write();
        if definitions.contains_key(&id) {
            return Err(IocError::DuplicateDefinition(id));
        }
        tracing::debug!(id = %id, lifetime = %definition.lifetime, type_name = definition.type_name, "definition registered");
        definitions.insert(id, Arc::new(definition));
        Ok(())
    }

    /// Adds a hook to the pre-init pass. It receives the raw object and
    /// returns it or a replacement.
    pub fn add_pre_init_hook<F>(&self, hook: F)
    where
        F: Fn(&str, Instance) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        let mut processors = self.inner.processors.write();
        let index = processors.len();
        processors.push(Arc::new(FnHook::new(Pass::Before, index, hook)));
    }

    /// Adds a hook to the post-init pass. Whatever it returns is what
    /// callers of `resolve` receive.
    ///
    /// ```
    /// use ferrous_ioc::{Container, Definition};
    /// use std::sync::Arc;
    ///
    /// let container = Container::new();
    /// container.register("name", Definition::singleton(|_| Ok(String::from("bean")))).unwrap();
    /// container.add_post_init_hook(|_id, instance| {
    ///     match instance.downcast::<String>() {
    ///         Ok(name) => Ok(Arc::new(format!("proxy({})", name))),
    ///         Err(other) => Ok(other),
    ///     }
    /// });
    ///
    /// assert_eq!(*container.resolve::<String>("name").unwrap(), "proxy(bean)");
    /// ```
    pub fn add_post_init_hook<F>(&self, hook: F)
    where
        F: Fn(&str, Instance) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        let mut processors = self.inner.processors.write();
        let index = processors.len();
        processors.push(Arc::new(FnHook::new(Pass::After, index, hook)));
    }

    /// Pre-init hook applied only to objects of type `T`.
    pub fn add_pre_init_hook_for<T, F>(&self, hook: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&str, Arc<T>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.add_processor(Arc::new(TypedHook::new(Pass::Before, hook)));
    }

    /// Post-init hook applied only to objects of type `T`.
    pub fn add_post_init_hook_for<T, F>(&self, hook: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&str, Arc<T>) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.add_processor(Arc::new(TypedHook::new(Pass::After, hook)));
    }

    /// Adds a processor taking part in both hook passes.
    ///
    /// Hooks only apply to objects constructed after registration.
    pub fn add_processor(&self, processor: Arc<dyn InstanceProcessor>) {
        self.inner.processors.write().push(processor);
    }

    /// Adds a definition processor; it runs once, at start.
    ///
    /// Processors added after the container started never run. They must
    /// use the [`DefinitionRegistry`] they receive rather than calling back
    /// into the container.
    pub fn add_definition_processor(&self, processor: Arc<dyn DefinitionProcessor>) {
        if self.state() != ContainerState::Unstarted {
            tracing::warn!("definition processor added after start; it will never run");
        }
        self.inner.definition_processors.write().push(processor);
    }

    /// Adds a listener for [`ContainerEvent`]s.
    ///
    /// Listeners may resolve objects but must not call `start` or
    /// `shutdown` themselves.
    pub fn add_listener(&self, listener: Arc<dyn ContainerListener>) {
        self.inner.listeners.write().push(listener);
    }

    pub fn add_observer(&self, observer: Arc<dyn ResolutionObserver>) {
        self.inner.observers.write().add(observer);
    }

    /// Registers a custom scope for definitions with `Lifetime::Custom(name)`.
    /// A later registration under the same name replaces the earlier one.
    pub fn register_scope(&self, name: &'static str, scope: Arc<dyn Scope>) {
        tracing::debug!(scope = name, "scope registered");
        self.inner.scopes.write().insert(name, scope);
    }

    // ===== Lifecycle =====

    /// Moves the container from `Unstarted` to `Active`.
    ///
    /// Runs definition processors in registration order, builds eager
    /// singletons (sorted by identifier) and publishes
    /// [`ContainerEvent::Started`]. If any of these steps fails, singletons
    /// built so far are destroyed, the container is closed and the error is
    /// returned.
    ///
    /// Calling `start` on an active container does nothing. The first
    /// `resolve` on an unstarted container starts it implicitly.
    pub fn start(&self) -> IocResult<()> {
        let _lifecycle = self.inner.lifecycle.lock();
        match self.state() {
            ContainerState::Active => return Ok(()),
            ContainerState::Closed => return Err(IocError::ContainerClosed),
            ContainerState::Unstarted => {}
        }

        self.run_definition_processors()?;
        *self.inner.state.write() = ContainerState::Active;
        tracing::debug!("container active");

        if let Err(err) = self.instantiate_eager_singletons() {
            self.abort_start(&err);
            return Err(err);
        }

        if let Err(err) = self.publish(ContainerEvent::Started) {
            self.abort_start(&err);
            return Err(err);
        }

        tracing::info!(definitions = self.inner.definitions.read().len(), "container started");
        Ok(())
    }

    /// Destroys cached singletons and closes the container.
    ///
    /// Publishes [`ContainerEvent::Closing`] first, then invokes destroy
    /// hooks on cached singletons in reverse creation order. Prototype and
    /// custom-scoped objects are never visited. Every destroy hook runs even
    /// if an earlier one fails; all failures are returned together as
    /// [`IocError::DestroyFailures`]. Calling `shutdown` on a closed
    /// container does nothing.
    pub fn shutdown(&self) -> IocResult<()> {
        let _lifecycle = self.inner.lifecycle.lock();
        let mut failures = Vec::new();

        match self.state() {
            ContainerState::Closed => return Ok(()),
            ContainerState::Active => {
                if let Err(err) = self.publish(ContainerEvent::Closing) {
                    failures.push(err);
                }
            }
            ContainerState::Unstarted => {}
        }

        *self.inner.state.write() = ContainerState::Closed;
        failures.extend(self.destroy_singletons());
        tracing::info!(failures = failures.len(), "container closed");

        if failures.is_empty() {
            Ok(())
        } else {
            Err(IocError::DestroyFailures(failures))
        }
    }

    fn run_definition_processors(&self) -> IocResult<()> {
        let processors = self.inner.definition_processors.read().clone();
        if processors.is_empty() {
            return Ok(());
        }

        let mut definitions = self.inner.definitions.write();
        let mut registry = DefinitionRegistry::new(&mut definitions);
        for processor in &processors {
            processor
                .process(&mut registry)
                .map_err(|e| IocError::ProcessorFailure(e.to_string()))?;
        }
        tracing::debug!(count = processors.len(), "definition processors applied");
        Ok(())
    }

    fn instantiate_eager_singletons(&self) -> IocResult<()> {
        let eager_all = self.inner.config.eager_singletons;
        let mut ids: Vec<String> = self
            .inner
            .definitions
            .read()
            .iter()
            .filter(|(_, def)| def.lifetime == Lifetime::Singleton && (eager_all || def.eager))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();

        for id in &ids {
            self.resolve_any(id)?;
        }
        Ok(())
    }

    fn abort_start(&self, err: &IocError) {
        tracing::error!(error = %err, "container start failed; destroying singletons");
        *self.inner.state.write() = ContainerState::Closed;
        for failure in self.destroy_singletons() {
            tracing::error!(error = %failure, "teardown after failed start");
        }
    }

    fn destroy_singletons(&self) -> Vec<IocError> {
        let mut queue = std::mem::take(&mut *self.inner.destroy_queue.lock());
        self.inner.singletons.write().clear();
        queue.run_all_reverse()
    }

    fn publish(&self, event: ContainerEvent) -> IocResult<()> {
        let listeners = self.inner.listeners.read().clone();
        let mut first_failure = None;
        for listener in &listeners {
            if let Err(e) = listener.on_event(&event, self) {
                tracing::error!(event = event.name(), error = %e, "listener failed");
                first_failure.get_or_insert(IocError::ListenerFailure {
                    event: event.name(),
                    message: e.to_string(),
                });
            }
        }
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ===== Resolution =====

    /// Resolves `id` and downcasts it to `T`.
    ///
    /// Fails with [`IocError::TypeMismatch`] when the final object (after
    /// the post-init pass) is not a `T`.
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
        self.resolve_in(&self.inner.path, id)
    }

    pub(crate) fn resolve_in(&self, path: &ResolutionPath, id: &str) -> IocResult<Instance> {
        self.ensure_active()?;
        let definition = self
            .inner
            .definitions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| IocError::UnknownIdentifier(id.to_string()))?;

        match definition.lifetime {
            Lifetime::Singleton => self.resolve_singleton(path, id, &definition),
            Lifetime::Prototype => {
                let _guard = path.enter(id)?;
                self.create(path, id, &definition)
            }
            Lifetime::Custom(scope_name) => {
                let scope = self.inner.scopes.read().get(scope_name).cloned().ok_or_else(|| {
                    IocError::UnknownScope {
                        id: id.to_string(),
                        scope: scope_name,
                    }
                })?;
                let _guard = path.enter(id)?;
                scope.get(id, &mut || self.create(path, id, &definition))
            }
        }
    }

    fn ensure_active(&self) -> IocResult<()> {
        match self.state() {
            ContainerState::Active => Ok(()),
            ContainerState::Closed => Err(IocError::ContainerClosed),
            ContainerState::Unstarted => self.start(),
        }
    }

    fn resolve_singleton(&self, path: &ResolutionPath, id: &str, definition: &Definition) -> IocResult<Instance> {
        // Fast path: already cached
        if let Some(hit) = self.inner.singletons.read().get(id) {
            return Ok(hit.clone());
        }

        // Cycle check before taking the creation lock, so same-thread
        // re-entry fails instead of deadlocking
        let _guard = path.enter(id)?;

        let lock = self.creation_lock(id);
        let _creating = lock.lock();

        // Double-checked: another thread may have finished meanwhile
        if let Some(hit) = self.inner.singletons.read().get(id) {
            return Ok(hit.clone());
        }

        let instance = self.create(path, id, definition)?;
        self.cache_singleton(id, definition, instance)
    }

    fn creation_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.inner
            .creation_locks
            .lock()
            .entry(id.to_string())
            .or_default()
            .clone()
    }

    fn cache_singleton(&self, id: &str, definition: &Definition, instance: Instance) -> IocResult<Instance> {
        let state = self.inner.state.read();
        if *state == ContainerState::Closed {
            // Shut down while we were building; nobody will destroy it
            return Err(IocError::ContainerClosed);
        }

        self.inner.singletons.write().insert(id.to_string(), instance.clone());
        if let Some(hook) = &definition.destroy {
            self.inner
                .destroy_queue
                .lock()
                .push(id.to_string(), instance.clone(), hook.clone());
        }
        tracing::debug!(id, "singleton cached");
        Ok(instance)
    }

    fn create(&self, path: &ResolutionPath, id: &str, definition: &Definition) -> IocResult<Instance> {
        let observers = self.inner.observers.read().clone();
        if !observers.has_observers() {
            return self.build(path, id, definition);
        }

        let start = Instant::now();
        observers.resolving(id);
        let result = self.build(path, id, definition);
        match &result {
            Ok(_) => observers.resolved(id, start.elapsed()),
            Err(err) => observers.failed(id, err),
        }
        result
    }

    fn build(&self, path: &ResolutionPath, id: &str, definition: &Definition) -> IocResult<Instance> {
        tracing::trace!(id, lifetime = %definition.lifetime, depth = path.depth(), "constructing");

        for dependency in &definition.depends_on {
            self.resolve_in(path, dependency)?;
        }

        let raw = match &definition.construction {
            Construction::Factory(factory) => factory(&ResolverContext::new(self, path))?,
            Construction::Constructor { args, ctor } => {
                let values = args
                    .iter()
                    .map(|arg| match arg {
                        ConstructorArg::Value(value) => Ok(value.clone()),
                        ConstructorArg::Ref(other) => self.resolve_in(path, other),
                    })
                    .collect::<IocResult<Vec<_>>>()?;
                ctor(&ConstructorArgs::new(id, values))?
            }
        };

        let processors = self.inner.processors.read().clone();

        let mut instance = raw;
        for processor in &processors {
            instance = processor
                .before_init(id, instance)
                .map_err(|e| IocError::hook(id, HookPhase::BeforeInit, processor.name(), e))?;
        }

        if let Some(init) = &definition.init {
            (init.f)(&instance).map_err(|e| IocError::hook(id, HookPhase::Init, &init.name, e))?;
        }

        for processor in &processors {
            instance = processor
                .after_init(id, instance)
                .map_err(|e| IocError::hook(id, HookPhase::AfterInit, processor.name(), e))?;
        }

        Ok(instance)
    }

    // ===== Introspection =====

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.definitions.read().contains_key(id)
    }

    /// Number of singletons currently cached.
    pub fn singleton_count(&self) -> usize {
        self.inner.singletons.read().len()
    }

    /// Descriptors of every registered definition, sorted by identifier.
    pub fn definitions(&self) -> Vec<DefinitionDescriptor> {
        let mut descriptors: Vec<DefinitionDescriptor> = self
            .inner
            .definitions
            .read()
            .iter()
            .map(|(id, def)| DefinitionDescriptor::new(id, def))
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// Checks the declared dependency graph without building anything.
    pub fn validate(&self) -> ValidationReport {
        let scopes: Vec<&'static str> = self.inner.scopes.read().keys().copied().collect();
        validation::validate(&self.inner.definitions.read(), &scopes)
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str(&format!("State: {:?}\n", self.state()));
        s.push_str("Definitions:\n");
        let singletons = self.inner.singletons.read();
        for d in self.definitions() {
            let cached = if singletons.contains_key(&d.id) { " (cached)" } else { "" };
            s.push_str(&format!("  {}: {} [{}]{}\n", d.id, d.type_name, d.lifetime, cached));
        }
        s.push_str(&format!("Processors: {}\n", self.inner.processors.read().len()));
        s
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("state", &self.state())
            .field("definitions", &self.inner.definitions.read().len())
            .field("singletons", &self.singleton_count())
            .finish()
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        if *self.state.get_mut() == ContainerState::Active && !self.destroy_queue.get_mut().is_empty() {
            tracing::warn!("container dropped with destroy hooks pending; call shutdown() before dropping");
        }
    }
}
