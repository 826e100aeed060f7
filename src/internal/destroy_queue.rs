//! Destroy hooks of cached singletons, run LIFO at shutdown.

use crate::definition::{Instance, LifecycleHook};
use crate::error::{HookPhase, IocError};

/// Singletons with a destroy hook, in creation order.
#[derive(Default)]
pub(crate) struct DestroyQueue {
    entries: Vec<(String, Instance, LifecycleHook)>,
}

impl DestroyQueue {
    /// Records a freshly cached singleton.
    pub(crate) fn push(&mut self, id: String, instance: Instance, hook: LifecycleHook) {
        self.entries.push((id, instance, hook));
    }

    /// Runs every hook in reverse creation order, collecting failures.
    /// A failing hook does not stop the remaining ones.
    pub(crate) fn run_all_reverse(&mut self) -> Vec<IocError> {
        let mut failures = Vec::new();
        while let Some((id, instance, hook)) = self.entries.pop() {
            tracing::debug!(id = %id, hook = %hook.name, "running destroy hook");
            if let Err(err) = (hook.f)(&instance) {
                tracing::error!(id = %id, hook = %hook.name, error = %err, "destroy hook failed");
                failures.push(IocError::hook(&id, HookPhase::Destroy, &hook.name, err));
            }
        }
        failures
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
