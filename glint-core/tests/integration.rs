//! Integration Tests for the Reactive System
//!
//! These tests verify that signals, memos, effects, stores, roots, context,
//! and the list reconciler work together correctly across flush boundaries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use glint_core::{
    create_context, create_effect, create_memo, create_root, create_signal, create_store, flush,
    flush_pending, index, on_cleanup, untrack, use_context,
};

/// Reading a signal outside any effect never adds a subscriber.
#[test]
fn top_level_reads_do_not_subscribe() {
    let (count, set_count) = create_signal(0);
    let _ = count.get();
    let _ = count.get();

    // No subscriber exists, so a write schedules nothing.
    set_count.set(5);
    assert!(!flush_pending());
}

/// A write schedules but never synchronously invokes a subscribed effect;
/// after one flush the effect has observed the final value exactly once.
#[test]
fn writes_are_batched_and_coalesced() {
    let (count, set_count) = create_signal(0);
    let observed: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let log = observed.clone();

    let effect = create_effect(move || {
        log.lock().push(count.get());
    });
    assert_eq!(*observed.lock(), vec![0]);

    set_count.set(5);
    assert_eq!(*observed.lock(), vec![0]);

    flush();
    assert_eq!(*observed.lock(), vec![0, 5]);

    // Several writes in one turn: the effect sees only the last value, once.
    set_count.set(1);
    set_count.set(2);
    set_count.set(3);
    flush();
    assert_eq!(*observed.lock(), vec![0, 5, 3]);
    effect.dispose();
}

/// Writing a structurally equal value triggers zero subscriber executions.
#[test]
fn equal_writes_trigger_nothing() {
    let (count, set_count) = create_signal(0);
    let runs = Arc::new(AtomicI32::new(0));
    let runs_clone = runs.clone();

    let effect = create_effect(move || {
        count.get();
        runs_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    set_count.set(0);
    flush();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    effect.dispose();
}

/// Diamond case: an effect reading only the combined memo re-runs exactly
/// once when both inputs change within the same turn.
#[test]
fn diamond_through_a_memo_runs_once() {
    let (first, set_first) = create_signal(String::from("John"));
    let (last, set_last) = create_signal(String::from("Smith"));
    let full_name = create_memo(move || format!("{} {}", first.get(), last.get()));

    let observed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let log = observed.clone();
    let full_name_reader = full_name.clone();
    let effect = create_effect(move || {
        log.lock().push(full_name_reader.get());
    });
    assert_eq!(observed.lock().len(), 1);

    set_first.set(String::from("Jane"));
    set_last.set(String::from("Doe"));
    flush();

    assert_eq!(*observed.lock(), vec!["John Smith", "Jane Doe"]);

    effect.dispose();
    full_name.dispose();
}

/// Store granularity: writes to sibling keys never re-run a reader of a
/// different leaf.
#[test]
fn store_subscriptions_are_per_property() {
    let (store, setter) = create_store(json!({"a": {"b": 1, "c": 1}}));
    let runs = Arc::new(AtomicI32::new(0));
    let runs_clone = runs.clone();
    let leaf = store.at("a").at("b");

    let effect = create_effect(move || {
        leaf.get();
        runs_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    setter.update(|s| s.at("a").at("c").set(json!(2)));
    flush();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    setter.update(|s| s.at("a").at("b").set(json!(2)));
    flush();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    effect.dispose();
}

/// A producer that writes nothing notifies nothing.
#[test]
fn empty_store_producer_triggers_nothing() {
    let (store, setter) = create_store(json!({"a": 1}));
    let runs = Arc::new(AtomicI32::new(0));
    let runs_clone = runs.clone();
    let path = store.at("a");

    let effect = create_effect(move || {
        path.get();
        runs_clone.fetch_add(1, Ordering::SeqCst);
    });

    setter.update(|_| {});
    flush();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    effect.dispose();
}

/// After a root is disposed, writes to signals read only inside it trigger
/// zero subscriber executions.
#[test]
fn disposed_root_silences_its_effects() {
    let (count, set_count) = create_signal(0);
    let runs = Arc::new(AtomicI32::new(0));

    let disposer = create_root(|disposer| {
        let count = count.clone();
        let runs = runs.clone();
        create_effect(move || {
            count.get();
            runs.fetch_add(1, Ordering::SeqCst);
        });
        disposer
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    disposer.dispose();

    set_count.set(5);
    flush();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// Harness for the reconciler tests: records row creations, disposals, and
/// the live content rendered at each position.
struct IndexLog {
    created: Mutex<Vec<usize>>,
    disposed: Mutex<Vec<usize>>,
    contents: Mutex<HashMap<usize, i32>>,
}

impl IndexLog {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            created: Mutex::new(Vec::new()),
            disposed: Mutex::new(Vec::new()),
            contents: Mutex::new(HashMap::new()),
        })
    }
}

fn spawn_index(list: glint_core::ReadSignal<Vec<i32>>, log: Arc<IndexLog>) -> glint_core::Effect {
    index(
        move || list.get(),
        move |item, position| {
            log.created.lock().push(position);
            {
                let log = log.clone();
                on_cleanup(move || log.disposed.lock().push(position));
            }
            let log = log.clone();
            create_effect(move || {
                log.contents.lock().insert(position, item.get());
            });
        },
    )
}

/// Same-length permutation: zero rows created or disposed, every position's
/// content refreshed.
#[test]
fn index_permutation_reuses_all_rows() {
    let (list, set_list) = create_signal(vec![1, 2, 3]);
    let log = IndexLog::new();

    let reconciler = create_root(|disposer| {
        let reconciler = spawn_index(list, log.clone());
        drop(disposer);
        reconciler
    });

    flush();
    assert_eq!(*log.created.lock(), vec![0, 1, 2]);
    assert_eq!(
        *log.contents.lock(),
        HashMap::from([(0, 1), (1, 2), (2, 3)])
    );

    set_list.set(vec![3, 1, 2]);
    flush();

    assert_eq!(log.created.lock().len(), 3);
    assert!(log.disposed.lock().is_empty());
    assert_eq!(
        *log.contents.lock(),
        HashMap::from([(0, 3), (1, 1), (2, 2)])
    );
    reconciler.dispose();
}

/// Shrinking disposes exactly the tail rows; the head row keeps its
/// identity.
#[test]
fn index_shrink_disposes_the_tail() {
    let (list, set_list) = create_signal(vec![1, 2, 3]);
    let log = IndexLog::new();

    let reconciler = create_root(|disposer| {
        let reconciler = spawn_index(list, log.clone());
        drop(disposer);
        reconciler
    });
    flush();

    set_list.set(vec![1]);
    flush();

    // Tail rows go first; row 0 was never recreated.
    assert_eq!(*log.disposed.lock(), vec![2, 1]);
    assert_eq!(*log.created.lock(), vec![0, 1, 2]);
    assert_eq!(log.contents.lock()[&0], 1);
    reconciler.dispose();
}

/// Disposing the scope enclosing an `index` call tears down every row.
#[test]
fn index_rows_die_with_their_enclosing_root() {
    let (list, set_list) = create_signal(vec![1, 2]);
    let log = IndexLog::new();

    let disposer = create_root(|disposer| {
        spawn_index(list, log.clone());
        disposer
    });
    flush();

    disposer.dispose();
    assert_eq!(log.disposed.lock().len(), 2);

    // The reconciler itself is dead too.
    set_list.set(vec![1, 2, 3]);
    flush();
    assert_eq!(log.created.lock().len(), 2);
}

/// Nearest-enclosing context lookup with a default fallback.
#[test]
fn context_resolves_innermost_first() {
    let scale = create_context(1.0_f64);

    assert_eq!(use_context(&scale), 1.0);

    let value = scale.provide(2.0, || scale.provide(4.0, || use_context(&scale)));
    assert_eq!(value, 4.0);
    assert_eq!(use_context(&scale), 1.0);
}

/// Reads under `untrack` never establish dependencies.
#[test]
fn untracked_reads_do_not_retrigger() {
    let (count, set_count) = create_signal(0);
    let runs = Arc::new(AtomicI32::new(0));
    let runs_clone = runs.clone();

    let effect = create_effect(move || {
        untrack(|| count.get());
        runs_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    set_count.set(5);
    flush();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    effect.dispose();
}

/// A write from inside a flushing effect lands in a fresh batch and is
/// drained by the same flush call.
#[test]
fn reentrant_writes_cascade_within_one_flush() {
    let (source, set_source) = create_signal(0);
    let (derived, set_derived) = create_signal(0);

    let writer = create_effect(move || {
        let value = source.get();
        set_derived.set(value * 10);
    });

    let observed: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let log = observed.clone();
    let reader = create_effect(move || {
        log.lock().push(derived.get());
    });
    assert_eq!(*observed.lock(), vec![0]);

    set_source.set(1);
    flush();
    assert_eq!(*observed.lock(), vec![0, 10]);

    writer.dispose();
    reader.dispose();
}

/// A panicking subscriber is isolated: the rest of the batch still runs and
/// committed writes stay committed.
#[test]
fn panicking_subscriber_does_not_abort_the_batch() {
    let (count, set_count) = create_signal(0);
    let runs = Arc::new(AtomicI32::new(0));

    let faulty = {
        let count = count.clone();
        create_effect(move || {
            if count.get() > 0 {
                panic!("subscriber failure");
            }
        })
    };
    let healthy = {
        let count = count.clone();
        let runs = runs.clone();
        create_effect(move || {
            count.get();
            runs.fetch_add(1, Ordering::SeqCst);
        })
    };
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    set_count.set(7);
    flush();

    // The faulty effect panicked first in the batch; the healthy one still
    // observed the committed value.
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(count.get_untracked(), 7);

    faulty.dispose();
    healthy.dispose();
}
