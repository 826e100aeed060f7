//! Object definitions: construction rules, lifecycle mode and lifecycle hooks.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::container::ResolverContext;
use crate::error::{BoxError, IocError, IocResult};
use crate::lifetime::Lifetime;

/// Type-erased object handled by the container.
///
/// Callers normally go through [`Container::resolve`](crate::Container::resolve)
/// which downcasts to the concrete type; hooks see the erased form.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type FactoryFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> IocResult<Instance> + Send + Sync>;
pub(crate) type ConstructorFn = Arc<dyn Fn(&ConstructorArgs) -> IocResult<Instance> + Send + Sync>;
pub(crate) type LifecycleFn = Arc<dyn Fn(&Instance) -> Result<(), BoxError> + Send + Sync>;

/// How a definition produces its object.
#[derive(Clone)]
pub(crate) enum Construction {
    /// Arbitrary factory with access to the container.
    Factory(FactoryFn),
    /// Recorded constructor arguments plus the constructor itself.
    Constructor {
        args: Vec<ConstructorArg>,
        ctor: ConstructorFn,
    },
}

/// A recorded constructor argument.
///
/// `Ref` arguments are resolved through the container right before the
/// constructor runs, so they take part in cycle detection like any other
/// dependency.
#[derive(Clone)]
pub enum ConstructorArg {
    /// A literal value handed to the constructor as-is.
    Value(Instance),
    /// The identifier of another definition.
    Ref(String),
}

impl ConstructorArg {
    /// Literal argument.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        ConstructorArg::Value(Arc::new(value))
    }

    /// Reference to another definition.
    pub fn reference(id: impl Into<String>) -> Self {
        ConstructorArg::Ref(id.into())
    }
}

impl fmt::Debug for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::Value(_) => f.write_str("Value(..)"),
            ConstructorArg::Ref(id) => f.debug_tuple("Ref").field(id).finish(),
        }
    }
}

/// Resolved constructor arguments, accessed by position.
pub struct ConstructorArgs {
    id: String,
    values: Vec<Instance>,
}

impl ConstructorArgs {
    pub(crate) fn new(id: &str, values: Vec<Instance>) -> Self {
        Self {
            id: id.to_string(),
            values,
        }
    }

    /// Identifier of the definition being constructed.
    pub fn identifier(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gets the argument at `index` as a `T`.
    ///
    /// Fails with [`IocError::ConstructionFailure`] when the index is out of
    /// range and [`IocError::TypeMismatch`] when the argument is not a `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> IocResult<Arc<T>> {
        let value = self.values.get(index).ok_or_else(|| {
            IocError::construction(&self.id, format!("missing constructor argument #{index}"))
        })?;
        value.clone().downcast::<T>().map_err(|_| IocError::TypeMismatch {
            id: format!("{}[{}]", self.id, index),
            expected: type_name::<T>(),
        })
    }
}

/// A named init or destroy hook.
#[derive(Clone)]
pub(crate) struct LifecycleHook {
    pub(crate) name: String,
    pub(crate) f: LifecycleFn,
}

impl LifecycleHook {
    fn typed<T, F>(name: String, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let hook_name = name.clone();
        let f: LifecycleFn = Arc::new(move |instance: &Instance| match instance.downcast_ref::<T>() {
            Some(typed) => f(typed),
            None => Err(format!(
                "hook `{}` expects {}, got a different type",
                hook_name,
                type_name::<T>()
            )
            .into()),
        });
        Self { name, f }
    }
}

/// Static description of how to build and manage one object.
///
/// A definition is immutable once registered. It pairs a construction rule
/// (a factory closure or recorded constructor arguments) with a
/// [`Lifetime`], optional named init/destroy hooks and optional declared
/// dependencies that are resolved before construction.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Definition};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db: Arc<Database> }
///
/// let container = Container::new();
/// container
///     .register("db", Definition::singleton(|_| Ok(Database { url: "postgres://localhost".into() })))
///     .unwrap();
/// container
///     .register(
///         "repo",
///         Definition::singleton(|ctx| Ok(Repository { db: ctx.resolve::<Database>("db")? }))
///             .depends_on("db")
///             .init_hook("check", |repo: &Repository| {
///                 assert!(!repo.db.url.is_empty());
///                 Ok(())
///             }),
///     )
///     .unwrap();
///
/// let repo = container.resolve::<Repository>("repo").unwrap();
/// assert_eq!(repo.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Definition {
    pub(crate) construction: Construction,
    pub(crate) lifetime: Lifetime,
    pub(crate) depends_on: Vec<String>,
    pub(crate) init: Option<LifecycleHook>,
    pub(crate) destroy: Option<LifecycleHook>,
    pub(crate) eager: bool,
    pub(crate) type_name: &'static str,
}

impl Definition {
    /// Definition built by `factory` with the given lifetime.
    pub fn factory<T, F>(lifetime: Lifetime, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> IocResult<T> + Send + Sync + 'static,
    {
        let f: FactoryFn = Arc::new(move |ctx: &ResolverContext<'_>| {
            factory(ctx).map(|value| Arc::new(value) as Instance)
        });
        Self::with_construction::<T>(Construction::Factory(f), lifetime)
    }

    /// Singleton built lazily by `factory`.
    pub fn singleton<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> IocResult<T> + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Singleton, factory)
    }

    /// Prototype: `factory` runs on every resolution.
    pub fn prototype<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> IocResult<T> + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Prototype, factory)
    }

    /// Instance cached by the custom scope registered under `scope`.
    pub fn scoped<T, F>(scope: &'static str, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> IocResult<T> + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Custom(scope), factory)
    }

    /// Singleton wrapping an already built value.
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        let shared: Instance = Arc::new(value);
        let f: FactoryFn = Arc::new(move |_: &ResolverContext<'_>| Ok(shared.clone()));
        Self::with_construction::<T>(Construction::Factory(f), Lifetime::Singleton)
    }

    /// Singleton built from recorded constructor arguments.
    ///
    /// ```rust
    /// use ferrous_ioc::{Container, ConstructorArg, Definition};
    ///
    /// struct Greeting(String);
    ///
    /// let container = Container::new();
    /// container.register("name", Definition::instance(String::from("world"))).unwrap();
    /// container
    ///     .register(
    ///         "greeting",
    ///         Definition::constructor(
    ///             [ConstructorArg::value("hello"), ConstructorArg::reference("name")],
    ///             |args| {
    ///                 let word = args.get::<&str>(0)?;
    ///                 let name = args.get::<String>(1)?;
    ///                 Ok(Greeting(format!("{} {}", word, name)))
    ///             },
    ///         ),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(container.resolve::<Greeting>("greeting").unwrap().0, "hello world");
    /// ```
    pub fn constructor<T, I, F>(args: I, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = ConstructorArg>,
        F: Fn(&ConstructorArgs) -> IocResult<T> + Send + Sync + 'static,
    {
        let ctor: ConstructorFn =
            Arc::new(move |args: &ConstructorArgs| ctor(args).map(|value| Arc::new(value) as Instance));
        Self::with_construction::<T>(
            Construction::Constructor {
                args: args.into_iter().collect(),
                ctor,
            },
            Lifetime::Singleton,
        )
    }

    fn with_construction<T: 'static>(construction: Construction, lifetime: Lifetime) -> Self {
        Self {
            construction,
            lifetime,
            depends_on: Vec::new(),
            init: None,
            destroy: None,
            eager: false,
            type_name: type_name::<T>(),
        }
    }

    /// Replaces the lifetime.
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Declares a dependency resolved before this definition is constructed.
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Sets the init hook, invoked once per construction between the two
    /// hook passes.
    pub fn init_hook<T, F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.init = Some(LifecycleHook::typed(name.into(), hook));
        self
    }

    /// Sets the destroy hook, invoked on cached singletons at shutdown.
    pub fn destroy_hook<T, F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.destroy = Some(LifecycleHook::typed(name.into(), hook));
        self
    }

    /// Instantiate at container start instead of on first request.
    /// Only meaningful for singletons.
    pub fn eager(mut self) -> Self {
        self.eager = true;
        self
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_eager(&self) -> bool {
        self.eager
    }

    pub fn declared_dependencies(&self) -> &[String] {
        &self.depends_on
    }

    pub fn init_hook_name(&self) -> Option<&str> {
        self.init.as_ref().map(|h| h.name.as_str())
    }

    pub fn destroy_hook_name(&self) -> Option<&str> {
        self.destroy.as_ref().map(|h| h.name.as_str())
    }

    /// Declared dependencies followed by constructor references.
    pub(crate) fn dependencies(&self) -> impl Iterator<Item = &str> {
        let refs: &[ConstructorArg] = match &self.construction {
            Construction::Constructor { args, .. } => args.as_slice(),
            Construction::Factory(_) => &[],
        };
        self.depends_on.iter().map(String::as_str).chain(refs.iter().filter_map(|arg| match arg {
            ConstructorArg::Ref(id) => Some(id.as_str()),
            ConstructorArg::Value(_) => None,
        }))
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("type_name", &self.type_name)
            .field("lifetime", &self.lifetime)
            .field("depends_on", &self.depends_on)
            .field("init", &self.init_hook_name())
            .field("destroy", &self.destroy_hook_name())
            .field("eager", &self.eager)
            .finish()
    }
}
