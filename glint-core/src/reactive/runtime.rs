//! Reactive Runtime
//!
//! The runtime owns the registry that maps subscriber IDs to live effects.
//! Signals only ever hold IDs; when the scheduler flushes a batch it resolves
//! each ID through the registry to reach the effect to execute.
//!
//! The registry holds strong references: an effect stays alive until it is
//! explicitly disposed (directly, through its owning root, or through a
//! bound widget's teardown), never through garbage collection of its handle.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::effect::EffectInner;
use super::subscriber::SubscriberId;

static REGISTRY: OnceLock<DashMap<SubscriberId, Arc<EffectInner>>> = OnceLock::new();

fn registry() -> &'static DashMap<SubscriberId, Arc<EffectInner>> {
    REGISTRY.get_or_init(DashMap::new)
}

/// The global reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Register an effect so the scheduler can resolve its ID.
    pub(crate) fn register(effect: Arc<EffectInner>) {
        registry().insert(effect.id(), effect);
    }

    /// Remove a disposed effect from the registry.
    pub(crate) fn unregister(id: SubscriberId) {
        registry().remove(&id);
    }

    /// Resolve a subscriber ID to its effect, if still registered.
    pub(crate) fn get(id: SubscriberId) -> Option<Arc<EffectInner>> {
        registry().get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of live registered effects.
    pub fn registered_count() -> usize {
        registry().len()
    }
}
