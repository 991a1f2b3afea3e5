//! Effect Scheduler
//!
//! Writing a signal never runs subscribers inline. Instead the write hands a
//! snapshot of the signal's subscriber set to the scheduler, which merges it
//! into a deduplicating pending set. The host calls [`flush`] once per tick
//! (the stand-in for a microtask boundary); all writes within one turn
//! coalesce into a single pass, and each subscriber in that pass runs at most
//! once, in the order it was first enqueued.
//!
//! The pending set is thread-local: the reactive core runs on exactly one
//! logical execution context, so no locking discipline is needed here.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use indexmap::IndexSet;

use super::runtime::Runtime;
use super::subscriber::SubscriberId;

thread_local! {
    static SCHEDULER: RefCell<SchedulerState> = RefCell::new(SchedulerState::default());
}

#[derive(Default)]
struct SchedulerState {
    /// Subscribers awaiting the next flush, in first-enqueued order.
    pending: IndexSet<SubscriberId>,
    /// Set when work is queued, cleared by `flush`. A tick-driven host polls
    /// this through [`flush_pending`] instead of scheduling a microtask.
    flush_queued: bool,
}

/// Merge subscribers into the pending set.
///
/// Duplicates are ignored; a subscriber keeps its original position in the
/// batch no matter how many signals enqueue it in the same turn.
pub(crate) fn schedule(subscribers: Vec<SubscriberId>) {
    if subscribers.is_empty() {
        return;
    }
    SCHEDULER.with(|state| {
        let mut state = state.borrow_mut();
        for id in subscribers {
            state.pending.insert(id);
        }
        if !state.flush_queued {
            state.flush_queued = true;
            tracing::trace!("flush queued");
        }
    });
}

/// Whether scheduled work is waiting for a [`flush`].
pub fn flush_pending() -> bool {
    SCHEDULER.with(|state| state.borrow().flush_queued)
}

/// Run every pending subscriber.
///
/// The pending set is snapshotted in insertion order and cleared before any
/// subscriber runs, so writes performed by a running subscriber land in a
/// fresh batch rather than being lost or re-running the current one. The
/// loop drains those follow-up batches too, so one call plays the role of
/// the whole microtask chain draining before the next host tick.
///
/// A subscriber that panics is contained: the panic is caught, logged, and
/// the rest of the batch proceeds. Signal writes committed before the panic
/// stay committed.
///
/// There is no cycle detection. A subscriber that writes a signal it also
/// reads re-enqueues itself every batch and will spin this loop; not doing
/// that is the caller's responsibility.
pub fn flush() {
    loop {
        let batch: Vec<SubscriberId> = SCHEDULER.with(|state| {
            let mut state = state.borrow_mut();
            state.flush_queued = false;
            state.pending.drain(..).collect()
        });
        if batch.is_empty() {
            break;
        }

        tracing::trace!(subscribers = batch.len(), "flushing batch");

        for id in batch {
            // Disposed subscribers have left the registry; their queued IDs
            // are skipped.
            let Some(effect) = Runtime::get(id) else {
                continue;
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| effect.execute()));
            if outcome.is_err() {
                tracing::error!(subscriber = ?id, "subscriber panicked during flush; continuing batch");
            }
        }
    }
}
