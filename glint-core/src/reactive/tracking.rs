//! Dependency Tracking
//!
//! The tracking context records which subscriber is currently executing.
//! This enables automatic dependency tracking: when a signal or store key is
//! read, it registers the current subscriber as a dependent and hands its
//! subscriber set back to the running effect for later symmetric removal.
//!
//! # Implementation
//!
//! We use a thread-local stack of frames. When an effect executes, it pushes
//! an observer frame; when the execution completes, the frame is popped. A
//! frame can also be a mask ([`untrack`]), under which reads subscribe
//! nothing. Only the top frame is consulted, so nested executions (an effect
//! created inside another effect) attribute reads correctly.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::subscriber::{SubscriberId, SubscriberSet};

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Sources collected during one execution. Most effects read a handful of
/// signals, so the list lives inline.
pub(crate) type SourceList = SmallVec<[SubscriberSet; 4]>;

enum Frame {
    /// An executing subscriber collecting the sets it joins.
    Observer {
        id: SubscriberId,
        sources: SourceList,
    },
    /// A mask pushed by [`untrack`]: reads underneath subscribe nothing.
    Untracked,
}

/// Guard that pops its frame when dropped.
///
/// This keeps the stack balanced even if the tracked computation panics.
pub(crate) struct FrameGuard {
    observer: Option<SubscriberId>,
}

impl FrameGuard {
    /// Push an observer frame for the given subscriber.
    pub(crate) fn observe(id: SubscriberId) -> Self {
        FRAMES.with(|frames| {
            frames.borrow_mut().push(Frame::Observer {
                id,
                sources: SourceList::new(),
            });
        });
        Self { observer: Some(id) }
    }

    /// Push a mask frame suppressing subscription.
    pub(crate) fn suppress() -> Self {
        FRAMES.with(|frames| frames.borrow_mut().push(Frame::Untracked));
        Self { observer: None }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            let popped = frames.borrow_mut().pop();

            // Catch mismatched push/pop pairs early in debug builds.
            if let Some(Frame::Observer { id, .. }) = popped {
                debug_assert_eq!(
                    Some(id),
                    self.observer,
                    "tracking frame mismatch: expected {:?}, got {:?}",
                    self.observer,
                    id
                );
            }
        });
    }
}

/// The subscriber currently executing, if any.
///
/// Returns `None` at top level and under an [`untrack`] mask. Reads at top
/// level therefore never subscribe anything.
pub(crate) fn current_subscriber() -> Option<SubscriberId> {
    FRAMES.with(|frames| match frames.borrow().last() {
        Some(Frame::Observer { id, .. }) => Some(*id),
        _ => None,
    })
}

/// Record a subscriber set the current observer has just joined.
///
/// Called by signals and stores after inserting the current subscriber into
/// their set, so the effect can sever itself before its next run.
pub(crate) fn record_source(set: SubscriberSet) {
    FRAMES.with(|frames| {
        if let Some(Frame::Observer { sources, .. }) = frames.borrow_mut().last_mut() {
            sources.push(set);
        }
    });
}

/// Drain the sources collected by the current observer frame.
pub(crate) fn take_sources() -> SourceList {
    FRAMES.with(|frames| {
        if let Some(Frame::Observer { sources, .. }) = frames.borrow_mut().last_mut() {
            std::mem::take(sources)
        } else {
            SourceList::new()
        }
    })
}

/// Execute `f` with dependency tracking suppressed.
///
/// Signal and store reads inside `f` return their values without subscribing
/// the surrounding effect, so changes to them will not re-run it.
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let _guard = FrameGuard::suppress();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_observer_at_top_level() {
        assert!(current_subscriber().is_none());
    }

    #[test]
    fn frame_tracks_observer() {
        let id = SubscriberId::new();

        {
            let _guard = FrameGuard::observe(id);
            assert_eq!(current_subscriber(), Some(id));
        }

        assert!(current_subscriber().is_none());
    }

    #[test]
    fn nested_frames() {
        let outer = SubscriberId::new();
        let inner = SubscriberId::new();

        let _outer_guard = FrameGuard::observe(outer);
        assert_eq!(current_subscriber(), Some(outer));

        {
            let _inner_guard = FrameGuard::observe(inner);
            assert_eq!(current_subscriber(), Some(inner));
        }

        assert_eq!(current_subscriber(), Some(outer));
    }

    #[test]
    fn frame_collects_sources() {
        let id = SubscriberId::new();
        let _guard = FrameGuard::observe(id);

        record_source(SubscriberSet::new());
        record_source(SubscriberSet::new());

        let sources = take_sources();
        assert_eq!(sources.len(), 2);

        // Draining leaves the frame empty.
        assert!(take_sources().is_empty());
    }

    #[test]
    fn untrack_masks_the_observer() {
        let id = SubscriberId::new();
        let _guard = FrameGuard::observe(id);

        untrack(|| {
            assert!(current_subscriber().is_none());
            record_source(SubscriberSet::new());
        });

        // The mask swallowed the recording.
        assert!(take_sources().is_empty());
        assert_eq!(current_subscriber(), Some(id));
    }
}
