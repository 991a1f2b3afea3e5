//! Subscriber types for the reactive system.
//!
//! A Subscriber is any computation that depends on reactive values: effects,
//! memos (which are effects internally), and binding updaters. Each signal
//! and store key owns a [`SubscriberSet`]; a subscriber keeps a handle to
//! every set it currently belongs to so it can remove itself from all of
//! them before re-execution or disposal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;

/// Unique identifier for a subscriber.
///
/// Each subscriber gets a unique ID when created. The ID is how signals and
/// the scheduler refer to a subscriber without owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A shared, insertion-ordered set of subscriber IDs.
///
/// Cloning a `SubscriberSet` produces another handle to the same underlying
/// set. Signals hand clones of their set to the tracking context so that the
/// subscribing effect can later sever itself from the exact set it joined.
#[derive(Clone)]
pub struct SubscriberSet {
    inner: Arc<RwLock<IndexSet<SubscriberId>>>,
}

impl SubscriberSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(IndexSet::new())),
        }
    }

    /// Add a subscriber. Returns `true` if it was not already present.
    pub fn insert(&self, id: SubscriberId) -> bool {
        self.inner.write().insert(id)
    }

    /// Remove a subscriber. Preserves the insertion order of the rest.
    pub fn remove(&self, id: SubscriberId) {
        self.inner.write().shift_remove(&id);
    }

    /// Check whether a subscriber is present.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.read().contains(&id)
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Snapshot the current subscribers in insertion order.
    ///
    /// Writers hand this snapshot to the scheduler; mutations after the
    /// snapshot do not affect an already-queued batch.
    pub fn snapshot(&self) -> Vec<SubscriberId> {
        self.inner.read().iter().copied().collect()
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("len", &self.len())
            .finish()
    }
}
