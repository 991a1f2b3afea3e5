//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive: a value cell that tracks
//! which subscribers depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read during a subscriber's execution, the signal adds
//!    that subscriber to its set and hands the set back to the subscriber
//!    for symmetric cleanup.
//!
//! 2. When a signal's value changes, its subscriber snapshot is handed to
//!    the scheduler. Subscribers re-run on the next flush, never inline.
//!
//! 3. A write whose new value equals the old one (by `PartialEq`, which is
//!    structural for ordinary Rust data) is a no-op and schedules nothing.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::scheduler;
use super::subscriber::SubscriberSet;
use super::tracking;

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_signal_id() -> u64 {
    SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reactive signal holding a value of type `T`.
///
/// Cloning a `Signal` produces another handle to the same cell. Use
/// [`create_signal`] for the split accessor/setter shape.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// // Read the value (subscribes the current effect, if any)
/// let value = count.get();
///
/// // Update the value (schedules subscribers for the next flush)
/// count.set(5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    inner: Arc<SignalInner<T>>,
}

struct SignalInner<T> {
    /// Unique identifier, used for Debug output.
    id: u64,

    /// The current value.
    value: RwLock<T>,

    /// Subscribers that depend on this signal.
    subscribers: SubscriberSet,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: next_signal_id(),
                value: RwLock::new(value),
                subscribers: SubscriberSet::new(),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Get the current value.
    ///
    /// If called during a subscriber's execution, registers that subscriber
    /// as a dependent. Top-level reads subscribe nothing.
    pub fn get(&self) -> T {
        if let Some(subscriber) = tracking::current_subscriber() {
            if self.inner.subscribers.insert(subscriber) {
                tracking::record_source(self.inner.subscribers.clone());
            }
        }
        self.inner.value.read().clone()
    }

    /// Get the current value without establishing a dependency.
    pub fn get_untracked(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Split this signal into an accessor/setter pair sharing the cell.
    pub fn split(self) -> (ReadSignal<T>, WriteSignal<T>) {
        (ReadSignal(self.clone()), WriteSignal(self))
    }
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Set a new value and schedule subscribers.
    ///
    /// If the new value equals the current one, nothing happens. Otherwise
    /// the assignment is immediately visible to subsequent reads, and the
    /// subscriber snapshot is queued for the next flush. The caller never
    /// blocks on subscriber re-execution.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.write();
            if *guard == value {
                return;
            }
            *guard = value;
        }
        scheduler::schedule(self.inner.subscribers.snapshot());
    }

    /// Update the value using a function of the previous value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let guard = self.inner.value.read();
            f(&guard)
        };
        self.set(next);
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id())
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// The read half of a signal.
pub struct ReadSignal<T>(Signal<T>)
where
    T: Clone + Send + Sync + 'static;

impl<T> ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Get the current value, subscribing the current effect, if any.
    pub fn get(&self) -> T {
        self.0.get()
    }

    /// Get the current value without establishing a dependency.
    pub fn get_untracked(&self) -> T {
        self.0.get_untracked()
    }
}

impl<T> Clone for ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        ReadSignal(self.0.clone())
    }
}

/// The write half of a signal.
pub struct WriteSignal<T>(Signal<T>)
where
    T: Clone + Send + Sync + 'static;

impl<T> WriteSignal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Set a new value. Equal values are a no-op; changes schedule
    /// subscribers for the next flush.
    pub fn set(&self, value: T) {
        self.0.set(value);
    }

    /// The updater form of a write: the new value is derived from the
    /// previous one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        self.0.update(f);
    }
}

impl<T> Clone for WriteSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        WriteSignal(self.0.clone())
    }
}

/// Create a signal and return its accessor/setter pair.
pub fn create_signal<T>(value: T) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Signal::new(value).split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::scheduler::flush_pending;

    #[test]
    fn signal_get_and_set() {
        let signal = Signal::new(0);
        assert_eq!(signal.get(), 0);

        signal.set(42);
        assert_eq!(signal.get(), 42);
    }

    #[test]
    fn signal_update() {
        let signal = Signal::new(10);
        signal.update(|v| v + 5);
        assert_eq!(signal.get(), 15);
    }

    #[test]
    fn top_level_read_does_not_subscribe() {
        let signal = Signal::new(0);
        let _ = signal.get();
        let _ = signal.get();

        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn equal_write_schedules_nothing() {
        let signal = Signal::new(7);
        signal.set(7);

        assert!(!flush_pending());
    }

    #[test]
    fn structural_equality_gates_compound_values() {
        let signal = Signal::new(vec![1, 2, 3]);
        signal.set(vec![1, 2, 3]);
        assert!(!flush_pending());

        signal.set(vec![3, 2, 1]);
        assert_eq!(signal.get(), vec![3, 2, 1]);
    }

    #[test]
    fn signal_clone_shares_state() {
        let signal1 = Signal::new(0);
        let signal2 = signal1.clone();

        signal1.set(42);
        assert_eq!(signal2.get(), 42);

        signal2.set(100);
        assert_eq!(signal1.get(), 100);
    }

    #[test]
    fn split_halves_share_the_cell() {
        let (read, write) = create_signal(String::from("a"));
        write.set(String::from("b"));
        assert_eq!(read.get(), "b");

        write.update(|prev| format!("{prev}c"));
        assert_eq!(read.get(), "bc");
    }

    #[test]
    fn signal_ids_are_unique() {
        let s1 = Signal::new(0);
        let s2 = Signal::new(0);
        let s3 = Signal::new(0);

        assert_ne!(s1.id(), s2.id());
        assert_ne!(s2.id(), s3.id());
        assert_ne!(s1.id(), s3.id());
    }
}
