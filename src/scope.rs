//! Custom scopes.
//!
//! A definition with [`Lifetime::Custom`](crate::Lifetime::Custom) hands the
//! caching decision to the [`Scope`] registered under that name. The
//! container still runs the full construction pipeline (dependencies, both
//! hook passes, init hook); the scope only decides when to reuse a previous
//! result.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::definition::Instance;
use crate::error::IocResult;

/// Caching policy for custom-scoped definitions.
///
/// `create` builds a fresh, fully initialized object. Implementations must
/// not hold their own locks while calling it: the factory may resolve other
/// objects living in the same scope.
pub trait Scope: Send + Sync {
    /// Returns the cached object for `id` or builds one with `create`.
    fn get(&self, id: &str, create: &mut dyn FnMut() -> IocResult<Instance>) -> IocResult<Instance>;

    /// Drops the cached object for `id`, returning it if present.
    fn remove(&self, id: &str) -> Option<Instance>;
}

/// Scope that keeps an object for a fixed period, then builds a new one.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, Definition, PeriodicalScope};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let container = Container::new();
/// container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(60))));
/// container
///     .register("color", Definition::scoped("periodical", |_| Ok((12u8, 200u8, 40u8))))
///     .unwrap();
///
/// let first = container.resolve::<(u8, u8, u8)>("color").unwrap();
/// let again = container.resolve::<(u8, u8, u8)>("color").unwrap();
/// assert!(Arc::ptr_eq(&first, &again)); // still within the period
/// ```
pub struct PeriodicalScope {
    period: Duration,
    entries: Mutex<HashMap<String, (Instant, Instance)>>,
}

impl PeriodicalScope {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn fresh(&self, id: &str) -> Option<Instance> {
        let entries = self.entries.lock();
        entries
            .get(id)
            .filter(|(created, _)| created.elapsed() < self.period)
            .map(|(_, instance)| instance.clone())
    }
}

impl Scope for PeriodicalScope {
    fn get(&self, id: &str, create: &mut dyn FnMut() -> IocResult<Instance>) -> IocResult<Instance> {
        if let Some(hit) = self.fresh(id) {
            return Ok(hit);
        }

        // Build without holding the lock
        let value = create()?;

        // Double-checked insert
        let mut entries = self.entries.lock();
        if let Some((created, existing)) = entries.get(id) {
            if created.elapsed() < self.period {
                return Ok(existing.clone()); // Another thread beat us
            }
        }
        tracing::trace!(id, period = ?self.period, "periodical scope refreshed");
        entries.insert(id.to_string(), (Instant::now(), value.clone()));
        Ok(value)
    }

    fn remove(&self, id: &str) -> Option<Instance> {
        self.entries.lock().remove(id).map(|(_, instance)| instance)
    }
}
