//! Memo Implementation
//!
//! A Memo is a cached derived value: an inner signal written by an effect
//! that re-runs the computation whenever its dependencies change.
//!
//! Because the inner signal applies the same equality gate as any other
//! signal, a memo that recomputes to an unchanged value does not cascade
//! further invalidation. The memo recomputes eagerly inside the batched
//! flush (its effect is a scheduled subscriber like any other), and anything
//! depending on the memo is flushed in the same coalesced pass.

use std::fmt::Debug;

use super::effect::{create_effect, Effect};
use super::signal::Signal;

/// A cached, reactive derived value.
///
/// Created with [`create_memo`]. Cloning shares the underlying state.
pub struct Memo<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    value: Signal<Option<T>>,
    effect: Effect,
}

impl<T> Memo<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Get the current value.
    ///
    /// Subscribes the current effect (if any) through the memo's inner
    /// signal, exactly like reading a plain signal.
    pub fn get(&self) -> T {
        self.value
            .get()
            .expect("memo value is seeded by its first effect run")
    }

    /// Get the current value without establishing a dependency.
    pub fn get_untracked(&self) -> T {
        self.value
            .get_untracked()
            .expect("memo value is seeded by its first effect run")
    }

    /// Number of subscribers on the memo's inner signal.
    pub fn subscriber_count(&self) -> usize {
        self.value.subscriber_count()
    }

    /// Dispose the memo's recomputation effect.
    ///
    /// The last computed value stays readable but no longer updates.
    pub fn dispose(&self) {
        self.effect.dispose();
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            effect: self.effect.clone(),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + PartialEq + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Create a memo from a pure computation.
///
/// `f` runs once immediately (seeding the value and the dependency set) and
/// again during every flush in which a dependency changed. Downstream
/// subscribers only re-run when the computed value actually differs.
pub fn create_memo<T, F>(f: F) -> Memo<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    let value: Signal<Option<T>> = Signal::new(None);
    let writer = value.clone();
    let effect = create_effect(move || {
        writer.set(Some(f()));
    });

    Memo { value, effect }
}
