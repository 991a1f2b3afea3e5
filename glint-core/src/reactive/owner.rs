//! Ownership Scopes
//!
//! Cleanup lists tie the lifetime of effects (and anything else registered
//! with [`on_cleanup`]) to the scope that created them. Exactly one list is
//! "current" at a time; [`create_root`] pushes a fresh one for the duration
//! of its closure and restores the previous one on exit.
//!
//! A root's list is deliberately detached: it is never appended to the
//! parent scope, so a root can outlive its creator or be disposed
//! independently through its [`RootDisposer`].

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::Mutex;

type Cleanup = Box<dyn FnOnce() + Send>;
type CleanupList = Arc<Mutex<Vec<Cleanup>>>;

thread_local! {
    static OWNERS: RefCell<Vec<CleanupList>> = const { RefCell::new(Vec::new()) };
}

/// Append a cleanup to the current scope's list, if one is active.
///
/// Returns `false` when no scope is active. Used internally by effect
/// creation, which is legal outside any scope.
pub(crate) fn try_register_cleanup(f: impl FnOnce() + Send + 'static) -> bool {
    OWNERS.with(|owners| match owners.borrow().last() {
        Some(list) => {
            list.lock().push(Box::new(f));
            true
        }
        None => false,
    })
}

/// Register a cleanup with the current ownership scope.
///
/// The cleanup runs when the scope's disposer is invoked. Outside any scope
/// the registration is dropped with a warning.
pub fn on_cleanup(f: impl FnOnce() + Send + 'static) {
    if !try_register_cleanup(f) {
        tracing::warn!("on_cleanup called outside an ownership scope; cleanup will never run");
    }
}

/// Disposer for a root scope. Cloning shares the same cleanup list.
#[derive(Clone)]
pub struct RootDisposer {
    cleanups: CleanupList,
}

impl RootDisposer {
    /// Run and clear every cleanup registered in the scope. Idempotent.
    pub fn dispose(&self) {
        let drained: Vec<Cleanup> = std::mem::take(&mut *self.cleanups.lock());
        for cleanup in drained {
            cleanup();
        }
    }
}

impl std::fmt::Debug for RootDisposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootDisposer")
            .field("pending_cleanups", &self.cleanups.lock().len())
            .finish()
    }
}

/// Guard restoring the previous scope even if `f` panics.
struct OwnerGuard;

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        OWNERS.with(|owners| {
            owners.borrow_mut().pop();
        });
    }
}

/// Run `f` inside a new detached ownership scope.
///
/// Effects created and cleanups registered during `f` attach to the new
/// scope. `f` receives the scope's [`RootDisposer`]; calling
/// [`RootDisposer::dispose`] tears the scope down. The previous scope is
/// restored when `f` returns and never inherits this scope's cleanups.
pub fn create_root<T>(f: impl FnOnce(RootDisposer) -> T) -> T {
    let list: CleanupList = Arc::new(Mutex::new(Vec::new()));
    OWNERS.with(|owners| owners.borrow_mut().push(Arc::clone(&list)));
    let _guard = OwnerGuard;

    f(RootDisposer { cleanups: list })
}
