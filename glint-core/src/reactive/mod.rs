//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, effects, memos,
//! stores, ownership scopes, context, and positional list reconciliation.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! during an effect's execution, the signal registers that effect as a
//! dependent. When the value changes, dependents are queued with the
//! scheduler and re-run on the next flush.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that re-runs whenever any
//! dependency it last read changes. Effects re-derive their dependency set
//! on every run, so conditional reads are tracked correctly.
//!
//! ## Memos
//!
//! A Memo is a derived value backed by a signal and an effect. Its equality
//! gate stops invalidation cascades when a recomputation produces an
//! unchanged value.
//!
//! ## Stores
//!
//! A Store gives per-property subscription granularity over a deep object
//! graph, so sibling writes never disturb unrelated readers.
//!
//! ## Scheduling
//!
//! Writes never run subscribers inline. All writes in one synchronous turn
//! coalesce into a single batch that the host drains with [`flush`] at its
//! next tick boundary.
//!
//! # Implementation Notes
//!
//! The reactive system uses thread-local stacks for the current observer,
//! the current ownership scope, and context providers. Reads detect the
//! active observer automatically; this "transparent reactivity" approach is
//! the one used by SolidJS, Vue 3, and Leptos. The execution model is
//! single-threaded and cooperative: the only suspension point is the flush
//! boundary between a write and its subscribers re-running.

mod context;
mod effect;
mod index;
mod memo;
mod owner;
mod runtime;
mod scheduler;
mod signal;
mod store;
mod subscriber;
mod tracking;

pub use context::{create_context, use_context, Context};
pub use effect::{create_effect, Effect};
pub use index::index;
pub use memo::{create_memo, Memo};
pub use owner::{create_root, on_cleanup, RootDisposer};
pub use runtime::Runtime;
pub use scheduler::{flush, flush_pending};
pub use signal::{create_signal, ReadSignal, Signal, WriteSignal};
pub use store::{create_store, Store, StorePath, StoreSetter};
pub use subscriber::{SubscriberId, SubscriberSet};
pub use tracking::untrack;
