//! Glint Core
//!
//! This crate provides the core runtime for the Glint reactive UI framework.
//! It implements:
//!
//! - Reactive primitives (signals, memos, effects, stores)
//! - A batching effect scheduler driven by the host's tick loop
//! - Ownership scopes for deterministic disposal
//! - Scoped context provisioning
//! - Positional list reconciliation
//! - A widget binding layer
//!
//! The core renders nothing and knows no concrete widget API; consumers
//! bring their own widgets through the [`bind::Bindable`] trait.
//!
//! # Architecture
//!
//! - `reactive`: dependency tracking, scheduling, and the reactive
//!   primitives themselves
//! - `bind`: the factory wiring reactive values onto external widgets
//!
//! # Example
//!
//! ```rust,ignore
//! use glint_core::reactive::{create_signal, create_memo, create_effect, flush};
//!
//! let (count, set_count) = create_signal(0);
//! let doubled = create_memo(move || count.get() * 2);
//!
//! create_effect(move || {
//!     println!("doubled: {}", doubled.get());
//! });
//!
//! set_count.set(5);
//! flush(); // effect runs once, prints: "doubled: 10"
//! ```

pub mod bind;
pub mod reactive;

pub use bind::{bind, Bindable, Bound, Prop, PropertyError, Props};
pub use reactive::{
    create_context, create_effect, create_memo, create_root, create_signal, create_store, flush,
    flush_pending, index, on_cleanup, untrack, use_context, Context, Effect, Memo, ReadSignal,
    RootDisposer, Signal, Store, StorePath, StoreSetter, SubscriberId, WriteSignal,
};
