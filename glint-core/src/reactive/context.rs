//! Context
//!
//! Scoped key/value provisioning. A context carries a unique identity and a
//! default value; [`Context::provide`] pushes a binding onto a thread-local
//! provider stack for the duration of a closure, and [`use_context`] walks
//! the stack top-down for the nearest binding.
//!
//! `use_context` is a one-shot scoped lookup, not reactive by itself: no
//! subscription is created. A caller wanting reactivity stores a signal as
//! the provided value and reads through it.

use std::any::Any;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

thread_local! {
    static PROVIDERS: RefCell<Vec<(u64, Arc<dyn Any + Send + Sync>)>> =
        const { RefCell::new(Vec::new()) };
}

static CONTEXT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A context key with a default value.
#[derive(Clone, Debug)]
pub struct Context<T> {
    id: u64,
    default: T,
}

/// Guard popping the provider binding on exit, panic or not.
struct ProviderGuard;

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        PROVIDERS.with(|providers| {
            providers.borrow_mut().pop();
        });
    }
}

impl<T> Context<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Run `f` with `value` provided for this context.
    ///
    /// The binding is visible to [`use_context`] calls made during `f`
    /// (including nested provides, where the innermost wins) and is removed
    /// when `f` exits, even by panic.
    pub fn provide<R>(&self, value: T, f: impl FnOnce() -> R) -> R {
        PROVIDERS.with(|providers| {
            providers.borrow_mut().push((self.id, Arc::new(value)));
        });
        let _guard = ProviderGuard;
        f()
    }
}

/// Create a context with the given default value.
pub fn create_context<T>(default: T) -> Context<T>
where
    T: Clone + Send + Sync + 'static,
{
    Context {
        id: CONTEXT_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
        default,
    }
}

/// Look up the nearest provided value for `context`.
///
/// Walks the provider stack from the top down; outside any `provide` scope
/// the context's default is returned.
pub fn use_context<T>(context: &Context<T>) -> T
where
    T: Clone + Send + Sync + 'static,
{
    PROVIDERS
        .with(|providers| {
            providers
                .borrow()
                .iter()
                .rev()
                .find(|(id, _)| *id == context.id)
                .and_then(|(_, value)| value.downcast_ref::<T>().cloned())
        })
        .unwrap_or_else(|| context.default.clone())
}
