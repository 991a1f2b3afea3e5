//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever any
//! signal or store key it last read changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately and
//!    synchronously to establish its initial dependencies.
//!
//! 2. Before every execution (including the first), the effect removes
//!    itself from every subscriber set it previously joined. Each run
//!    re-derives the dependency set from scratch, so conditional reads stop
//!    being tracked when their branch is no longer taken.
//!
//! 3. When a dependency changes, the effect is enqueued with the scheduler
//!    and re-runs on the next flush.
//!
//! # Disposal
//!
//! Effects die only via explicit disposal: a direct [`Effect::dispose`]
//! call, the owning root's disposer, or a bound widget's teardown. Disposal
//! severs all subscriptions and unregisters the effect; dropping the handle
//! alone changes nothing. If the effect was created inside an ownership
//! scope, its disposal is registered with that scope's cleanup list.

use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::owner;
use super::runtime::Runtime;
use super::subscriber::SubscriberId;
use super::tracking::{self, FrameGuard, SourceList};

/// Shared state behind an [`Effect`] handle.
pub(crate) struct EffectInner {
    /// The subscriber ID used for dependency tracking and scheduling.
    id: SubscriberId,

    /// The effect function.
    run: Box<dyn Fn() + Send + Sync>,

    /// Every subscriber set this effect currently belongs to.
    sources: Mutex<SourceList>,

    /// Whether the effect has been disposed.
    disposed: AtomicBool,

    /// Number of completed executions.
    runs: AtomicUsize,
}

impl EffectInner {
    pub(crate) fn id(&self) -> SubscriberId {
        self.id
    }

    /// Execute the effect function under a tracking frame.
    ///
    /// Previously recorded sources are severed first, so the run observes
    /// and records a fresh dependency set.
    ///
    /// The sources are harvested even if the function panics: the signal
    /// side has already inserted this subscriber by then, and losing the
    /// handles would leave the effect stuck in those sets past pruning and
    /// disposal. The panic continues unwinding afterwards.
    pub(crate) fn execute(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        self.clear_sources();

        let guard = FrameGuard::observe(self.id);
        let outcome = catch_unwind(AssertUnwindSafe(|| (self.run)()));
        let sources = tracking::take_sources();
        drop(guard);

        *self.sources.lock() = sources;

        if let Err(payload) = outcome {
            resume_unwind(payload);
        }
        self.runs.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove this effect from every subscriber set it belongs to.
    ///
    /// Afterwards the effect appears in zero subscriber sets and its source
    /// list is empty.
    fn clear_sources(&self) {
        for set in self.sources.lock().drain(..) {
            set.remove(self.id);
        }
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.clear_sources();
        Runtime::unregister(self.id);
    }
}

/// Handle to a running effect. Cloning shares the underlying state.
pub struct Effect {
    inner: Arc<EffectInner>,
}

impl Effect {
    /// The effect's subscriber ID.
    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Dispose of the effect.
    ///
    /// Severs all subscriptions so no future write can trigger it, and makes
    /// any execution already queued in a pending batch a no-op. Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.runs.load(Ordering::SeqCst)
    }

    /// Number of subscriber sets the effect currently belongs to.
    pub fn source_count(&self) -> usize {
        self.inner.sources.lock().len()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("source_count", &self.source_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Create an effect.
///
/// `f` runs once, immediately and synchronously, with the effect installed
/// as the current observer so every signal and store read inside attributes
/// to it. The returned handle doubles as the disposer.
pub fn create_effect<F>(f: F) -> Effect
where
    F: Fn() + Send + Sync + 'static,
{
    let inner = Arc::new(EffectInner {
        id: SubscriberId::new(),
        run: Box::new(f),
        sources: Mutex::new(SourceList::new()),
        disposed: AtomicBool::new(false),
        runs: AtomicUsize::new(0),
    });

    Runtime::register(Arc::clone(&inner));
    inner.execute();

    let effect = Effect { inner };

    // Tie the effect's lifetime to the scope that created it, if any.
    let handle = effect.clone();
    owner::try_register_cleanup(move || handle.dispose());

    effect
}
