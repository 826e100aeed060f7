//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod destroy_queue;

pub(crate) use circular::ResolutionPath;
pub(crate) use destroy_queue::DestroyQueue;
