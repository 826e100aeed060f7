//! Static validation of the definition graph.
//!
//! Only declared edges are visible here: `depends_on` entries and
//! constructor references. Dependencies a factory resolves through its
//! [`ResolverContext`](crate::ResolverContext) are opaque until runtime, where
//! cycles are still caught by resolution itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::Definition;
use crate::error::{IocError, IocResult};
use crate::lifetime::Lifetime;

/// Result of [`Container::validate`](crate::Container::validate).
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, Definition, ValidationError};
///
/// let container = Container::new();
/// container.register("a", Definition::singleton(|_| Ok(1u8)).depends_on("b")).unwrap();
/// container.register("b", Definition::singleton(|_| Ok(2u8)).depends_on("a")).unwrap();
/// container.register("c", Definition::singleton(|_| Ok(3u8)).depends_on("missing")).unwrap();
///
/// let report = container.validate();
/// assert!(!report.is_valid());
/// assert!(report.errors.iter().any(|e| matches!(e, ValidationError::Cycle(_))));
/// assert!(report.errors.iter().any(|e| matches!(e, ValidationError::MissingDependency { .. })));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make resolution fail
    pub errors: Vec<ValidationError>,
    /// Configurations that work but probably do not do what was meant
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the first error into the matching [`IocError`].
    pub fn into_result(self) -> IocResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(ValidationError::MissingDependency { dependency, .. }) => {
                Err(IocError::UnknownIdentifier(dependency))
            }
            Some(ValidationError::Cycle(path)) => Err(IocError::CyclicDependency(path)),
            Some(ValidationError::UnknownScope { id, scope }) => Err(IocError::UnknownScope { id, scope }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `id` declares a dependency that is not registered
    MissingDependency { id: String, dependency: String },
    /// Declared dependencies form a cycle (first element repeated at the end)
    Cycle(Vec<String>),
    /// `id` uses a custom scope that is not registered
    UnknownScope { id: String, scope: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingDependency { id, dependency } => {
                write!(f, "`{}` depends on unregistered `{}`", id, dependency)
            }
            ValidationError::Cycle(path) => write!(f, "cycle: {}", path.join(" -> ")),
            ValidationError::UnknownScope { id, scope } => write!(f, "`{}` uses unknown scope `{}`", id, scope),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Destroy hook on a prototype; the container never runs it
    PrototypeDestroyHook { id: String },
    /// A singleton captures a prototype once, so it never sees a fresh one
    SingletonHoldsPrototype { id: String, dependency: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::PrototypeDestroyHook { id } => {
                write!(f, "destroy hook on prototype `{}` will never run", id)
            }
            ValidationWarning::SingletonHoldsPrototype { id, dependency } => {
                write!(f, "singleton `{}` holds prototype `{}` for its whole life", id, dependency)
            }
        }
    }
}

pub(crate) fn validate(definitions: &HashMap<String, Arc<Definition>>, scopes: &[&'static str]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut ids: Vec<&str> = definitions.keys().map(String::as_str).collect();
    ids.sort_unstable();

    for &id in &ids {
        let def = &definitions[id];

        if let Lifetime::Custom(scope) = def.lifetime {
            if !scopes.contains(&scope) {
                report.errors.push(ValidationError::UnknownScope {
                    id: id.to_string(),
                    scope,
                });
            }
        }

        if def.lifetime == Lifetime::Prototype && def.destroy.is_some() {
            report.warnings.push(ValidationWarning::PrototypeDestroyHook { id: id.to_string() });
        }

        for dependency in def.dependencies() {
            match definitions.get(dependency) {
                None => report.errors.push(ValidationError::MissingDependency {
                    id: id.to_string(),
                    dependency: dependency.to_string(),
                }),
                Some(dep) if def.lifetime == Lifetime::Singleton && dep.lifetime == Lifetime::Prototype => {
                    report.warnings.push(ValidationWarning::SingletonHoldsPrototype {
                        id: id.to_string(),
                        dependency: dependency.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    let mut search = CycleSearch {
        definitions,
        marks: HashMap::new(),
        stack: Vec::new(),
        cycles: Vec::new(),
    };
    for &id in &ids {
        search.visit(id);
    }
    report.errors.extend(search.cycles.into_iter().map(ValidationError::Cycle));

    report
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search reporting one cycle per back edge.
struct CycleSearch<'a> {
    definitions: &'a HashMap<String, Arc<Definition>>,
    marks: HashMap<&'a str, Mark>,
    stack: Vec<&'a str>,
    cycles: Vec<Vec<String>>,
}

impl<'a> CycleSearch<'a> {
    fn visit(&mut self, id: &'a str) {
        match self.marks.get(id) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                if let Some(start) = self.stack.iter().position(|entry| *entry == id) {
                    let mut cycle: Vec<String> = self.stack[start..].iter().map(|s| s.to_string()).collect();
                    cycle.push(id.to_string());
                    self.cycles.push(cycle);
                }
                return;
            }
            None => {}
        }

        self.marks.insert(id, Mark::Visiting);
        self.stack.push(id);

        let definitions = self.definitions;
        if let Some(def) = definitions.get(id) {
            for dependency in def.dependencies() {
                if definitions.contains_key(dependency) {
                    self.visit(dependency);
                }
            }
        }

        self.stack.pop();
        self.marks.insert(id, Mark::Done);
    }
}
