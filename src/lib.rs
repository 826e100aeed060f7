//! # ferrous-ioc
//!
//! A small inversion-of-control container: it constructs, wires, initializes
//! and tears down a graph of objects with singleton/prototype lifecycles and
//! a two-phase post-processing pipeline.
//!
//! ## Features
//!
//! - **Lifecycles**: Singleton (cached, destroyed on shutdown), Prototype
//!   (fresh per request, never tracked) and named custom scopes
//! - **Two hook passes**: pre-init and post-init processors around the
//!   definition's init hook; the post-init pass may substitute the object,
//!   which is how wrapping/proxying is expressed
//! - **Cycle detection**: dependency cycles fail with the full path instead
//!   of overflowing the stack
//! - **Explicit lifecycle**: `Unstarted → Active → Closed`, with listeners
//!   for start and shutdown and definition processors run at start
//! - **Thread-safe**: at most one instance per singleton even under
//!   concurrent first requests
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_ioc::{Container, Definition};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container
//!     .register("db", Definition::instance(Database {
//!         connection_string: "postgres://localhost".to_string(),
//!     }))
//!     .unwrap();
//! container
//!     .register("users", Definition::prototype(|ctx| {
//!         Ok(UserService { db: ctx.resolve::<Database>("db")? })
//!     }))
//!     .unwrap();
//!
//! let users = container.resolve::<UserService>("users").unwrap();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! container.shutdown().unwrap();
//! ```
//!
//! ## Hooks and proxies
//!
//! ```rust
//! use ferrous_ioc::{Container, Definition};
//! use std::sync::Arc;
//!
//! trait Quoter: Send + Sync {
//!     fn quote(&self) -> String;
//! }
//!
//! struct Terminator;
//! impl Quoter for Terminator {
//!     fn quote(&self) -> String { "I'll be back".to_string() }
//! }
//!
//! struct Shouting(Box<dyn Quoter>);
//! impl Quoter for Shouting {
//!     fn quote(&self) -> String { self.0.quote().to_uppercase() }
//! }
//!
//! let container = Container::new();
//! container
//!     .register("quoter", Definition::singleton(|_| Ok(Box::new(Terminator) as Box<dyn Quoter>)))
//!     .unwrap();
//!
//! // Post-init hooks see the initialized object and may replace it
//! container.add_post_init_hook_for::<Box<dyn Quoter>, _>(|_id, _original| {
//!     Ok(Arc::new(Box::new(Shouting(Box::new(Terminator))) as Box<dyn Quoter>))
//! });
//!
//! let quoter = container.resolve::<Box<dyn Quoter>>("quoter").unwrap();
//! assert_eq!(quoter.quote(), "I'LL BE BACK");
//! ```

// Module declarations
pub mod config;
pub mod container;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod events;
pub mod hooks;
pub mod lifetime;
pub mod observer;
pub mod scope;
pub mod validation;

// Internal modules
mod internal;

// Re-export core types
pub use config::ContainerConfig;
pub use container::{Container, ContainerState, ResolverContext};
pub use definition::{ConstructorArg, ConstructorArgs, Definition, Instance};
pub use descriptors::DefinitionDescriptor;
pub use error::{BoxError, HookPhase, IocError, IocResult};
pub use events::{ContainerEvent, ContainerListener};
pub use hooks::{DefinitionProcessor, DefinitionRegistry, InstanceProcessor};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, ResolutionObserver};
pub use scope::{PeriodicalScope, Scope};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
