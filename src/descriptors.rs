//! Definition descriptors for introspection and diagnostics.

use crate::definition::Definition;
use crate::lifetime::Lifetime;

/// Read-only snapshot of a registered definition.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Definition, Lifetime};
///
/// let container = Container::new();
/// container.register("port", Definition::instance(5432u16)).unwrap();
/// container
///     .register("url", Definition::prototype(|_| Ok(String::from("postgres://localhost"))).depends_on("port"))
///     .unwrap();
///
/// let descriptors = container.definitions();
/// assert_eq!(descriptors.len(), 2);
///
/// let url = descriptors.iter().find(|d| d.id == "url").unwrap();
/// assert_eq!(url.lifetime, Lifetime::Prototype);
/// assert_eq!(url.depends_on, vec!["port".to_string()]);
/// assert!(url.type_name.contains("String"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionDescriptor {
    pub id: String,
    pub lifetime: Lifetime,
    /// Type produced by the construction rule (before any hook substitution)
    pub type_name: &'static str,
    /// Declared dependencies and constructor references
    pub depends_on: Vec<String>,
    pub init_hook: Option<String>,
    pub destroy_hook: Option<String>,
    pub eager: bool,
}

impl DefinitionDescriptor {
    pub(crate) fn new(id: &str, definition: &Definition) -> Self {
        Self {
            id: id.to_string(),
            lifetime: definition.lifetime,
            type_name: definition.type_name,
            depends_on: definition.dependencies().map(str::to_string).collect(),
            init_hook: definition.init_hook_name().map(str::to_string),
            destroy_hook: definition.destroy_hook_name().map(str::to_string),
            eager: definition.eager,
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime == Lifetime::Singleton
    }
}
