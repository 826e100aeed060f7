//! Error types for the IoC container.

use thiserror::Error;

/// Boxed error returned by user callbacks (hooks, processors, listeners).
///
/// The container folds these into the matching [`IocError`] variant, keeping
/// only the rendered message so that `IocError` stays `Clone`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Phase of the object lifecycle in which a hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Pre-init pass (instance processors, `before_init`).
    BeforeInit,
    /// The definition's own init hook.
    Init,
    /// Post-init pass (instance processors, `after_init`).
    AfterInit,
    /// The definition's destroy hook, run during shutdown.
    Destroy,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HookPhase::BeforeInit => "before-init",
            HookPhase::Init => "init",
            HookPhase::AfterInit => "after-init",
            HookPhase::Destroy => "destroy",
        };
        f.write_str(name)
    }
}

/// Container errors
///
/// Represents the various error conditions that can occur during definition
/// registration, resolution, or container shutdown.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, IocError};
///
/// let container = Container::new();
/// match container.resolve_any("missing") {
///     Err(IocError::UnknownIdentifier(id)) => assert_eq!(id, "missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_ioc::IocError;
///
/// let cycle = IocError::CyclicDependency(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(cycle.to_string(), "Cyclic dependency: a -> b -> a");
/// ```
#[derive(Debug, Clone, Error)]
pub enum IocError {
    /// Identifier already registered
    #[error("Definition already registered: {0}")]
    DuplicateDefinition(String),
    /// Identifier not registered
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),
    /// Dependency cycle detected (includes path, first element repeated at the end)
    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
    /// Container has been shut down
    #[error("Container is closed")]
    ContainerClosed,
    /// A hook failed while building or destroying an object
    #[error("Hook `{hook}` failed during {phase} of `{id}`: {message}")]
    HookFailure {
        id: String,
        phase: HookPhase,
        hook: String,
        message: String,
    },
    /// Resolved object is not of the requested type
    #[error("Type mismatch for `{id}`: expected {expected}")]
    TypeMismatch { id: String, expected: &'static str },
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// The construction rule itself failed
    #[error("Failed to construct `{id}`: {message}")]
    ConstructionFailure { id: String, message: String },
    /// Definition refers to a scope that was never registered
    #[error("Unknown scope `{scope}` for `{id}`")]
    UnknownScope { id: String, scope: &'static str },
    /// A definition processor failed during start
    #[error("Definition processor failed: {0}")]
    ProcessorFailure(String),
    /// A container listener failed while handling an event
    #[error("Listener failed on {event}: {message}")]
    ListenerFailure { event: &'static str, message: String },
    /// One or more teardown steps failed during shutdown
    #[error("Shutdown finished with {} failure(s)", .0.len())]
    DestroyFailures(Vec<IocError>),
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl IocError {
    /// Builds a [`IocError::ConstructionFailure`] for use inside factories.
    ///
    /// ```rust
    /// use ferrous_ioc::{Container, Definition, IocError};
    ///
    /// let container = Container::new();
    /// container
    ///     .register("port", Definition::singleton(|_| -> Result<u16, IocError> {
    ///         Err(IocError::construction("port", "PORT is not set"))
    ///     }))
    ///     .unwrap();
    /// assert!(matches!(
    ///     container.resolve::<u16>("port"),
    ///     Err(IocError::ConstructionFailure { .. })
    /// ));
    /// ```
    pub fn construction(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        IocError::ConstructionFailure {
            id: id.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn hook(id: &str, phase: HookPhase, hook: &str, err: BoxError) -> Self {
        IocError::HookFailure {
            id: id.to_string(),
            phase,
            hook: hook.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for container operations
///
/// A convenience alias for `Result<T, IocError>` used throughout ferrous-ioc.
pub type IocResult<T> = Result<T, IocError>;
