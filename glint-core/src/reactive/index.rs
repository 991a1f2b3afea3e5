//! Positional List Reconciliation
//!
//! [`index`] maps an array-valued accessor to a sequence of independently
//! owned rows keyed by position, not by value identity. Widgets are
//! addressed and laid out by position; reusing a row's identity for a
//! position avoids destroy/recreate churn and keeps z-order stable when the
//! backing array is reordered; only the content shown at each position is
//! refreshed, through the row's own signal.
//!
//! Rows are trimmed from the tail only, never the middle. Each row lives in
//! its own detached root so it can be disposed independently of its
//! siblings; the whole registry is torn down when the scope enclosing the
//! `index` call is disposed.

use std::sync::Arc;

use parking_lot::Mutex;

use super::effect::{create_effect, Effect};
use super::owner::{create_root, on_cleanup, RootDisposer};
use super::signal::{create_signal, ReadSignal, WriteSignal};

struct Row<T>
where
    T: Clone + Send + Sync + 'static,
{
    item: WriteSignal<T>,
    disposer: RootDisposer,
}

/// Reconcile a list accessor into per-position rows.
///
/// `render` is called once per row, inside the row's own root, with an
/// accessor for that position's current item. When the list grows, new rows
/// are appended; when it shrinks, tail rows are disposed (their cleanups
/// fire); surviving rows receive the current value at their position
/// through the equality-gated row signal.
///
/// Returns the reconciliation effect; its dependencies are whatever `each`
/// reads.
pub fn index<T, E, R>(each: E, render: R) -> Effect
where
    T: Clone + PartialEq + Send + Sync + 'static,
    E: Fn() -> Vec<T> + Send + Sync + 'static,
    R: Fn(ReadSignal<T>, usize) + Send + Sync + 'static,
{
    let rows: Arc<Mutex<Vec<Row<T>>>> = Arc::new(Mutex::new(Vec::new()));

    // Tear down all rows together with the enclosing scope.
    {
        let rows = Arc::clone(&rows);
        on_cleanup(move || {
            for row in rows.lock().drain(..) {
                row.disposer.dispose();
            }
        });
    }

    create_effect(move || {
        let items = each();
        let mut rows = rows.lock();

        // Shrink: dispose from the tail down, keeping head identities.
        while rows.len() > items.len() {
            if let Some(row) = rows.pop() {
                row.disposer.dispose();
            }
        }

        // Refresh every surviving row with its positional value.
        for (row, item) in rows.iter().zip(items.iter()) {
            row.item.set(item.clone());
        }

        // Grow: one detached root per new position.
        for position in rows.len()..items.len() {
            let seed = items[position].clone();
            let row = create_root(|disposer| {
                let (item, set_item) = create_signal(seed);
                render(item, position);
                Row {
                    item: set_item,
                    disposer,
                }
            });
            rows.push(row);
        }
    })
}
