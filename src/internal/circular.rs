//! Cycle and depth guard for resolutions on the current thread.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{IocError, IocResult};

// Identifiers under construction, per container, outermost first
thread_local! {
    static RESOLUTION_TLS: RefCell<HashMap<usize, Vec<String>>> = RefCell::new(HashMap::new());
}

static NEXT_KEY: AtomicUsize = AtomicUsize::new(0);

/// Handle on one container's resolution stack for the current thread.
///
/// Every resolution on a thread goes through the same stack, whether it
/// came through a [`ResolverContext`](crate::ResolverContext) or a captured
/// [`Container`](crate::Container) clone, so any same-thread re-entry fails
/// before a creation lock is taken. Other threads never see this stack.
pub(crate) struct ResolutionPath {
    key: usize,
    max_depth: usize,
}

impl ResolutionPath {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            key: NEXT_KEY.fetch_add(1, Ordering::Relaxed),
            max_depth,
        }
    }

    /// Pushes `id`, failing if it is already being constructed further up.
    pub(crate) fn enter(&self, id: &str) -> IocResult<PathGuard> {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            let stack = tls.entry(self.key).or_default();

            // Circular detection BEFORE pushing the new id
            if stack.iter().any(|entry| entry == id) {
                let mut path = stack.clone();
                path.push(id.to_string());
                return Err(IocError::CyclicDependency(path));
            }

            if stack.len() >= self.max_depth {
                return Err(IocError::DepthExceeded(self.max_depth));
            }

            stack.push(id.to_string());
            Ok(())
        })?;

        Ok(PathGuard {
            key: self.key,
            _not_send: PhantomData,
        })
    }

    pub(crate) fn depth(&self) -> usize {
        RESOLUTION_TLS.with(|tls| tls.borrow().get(&self.key).map_or(0, Vec::len))
    }
}

/// Pops the entry pushed by [`ResolutionPath::enter`] when dropped.
///
/// Tied to the thread that created it.
pub(crate) struct PathGuard {
    key: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let _ = RESOLUTION_TLS.try_with(|tls| {
            let mut tls = tls.borrow_mut();
            let emptied = match tls.get_mut(&self.key) {
                Some(stack) => {
                    stack.pop();
                    stack.is_empty()
                }
                None => false,
            };
            if emptied {
                tls.remove(&self.key);
            }
        });
    }
}
