#![forbid(unsafe_code)]

//! Thread-local tracking of the subscriber currently being enrolled.
//!
//! While a subscriber performs its enrollment read, it is pushed onto a
//! thread-local stack; every reactive field read during that window
//! registers the innermost stack entry into its own registry. Reads outside
//! any tracking window register nothing.
//!
//! # Overview
//!
//! - **Thread-local**: tracking on one thread never affects another.
//! - **Stackable**: constructing one subscriber while another is mid-read
//!   is well defined; the inner entry is the one enrolled until its guard
//!   drops.
//! - **RAII-based**: the marker is removed when the guard is dropped, even
//!   on panic, so a failed enrollment read can never leak an active marker.
//!
//! # Invariants
//!
//! 1. `active_subscriber` returns the innermost, most recently pushed entry.
//! 2. Dropping a guard pops exactly one entry.
//! 3. An empty stack means reads are untracked.
//!
//! # Failure Modes
//!
//! - **Guard leaked**: a guard that is moved into long-lived storage keeps
//!   its entry on the stack, and every reactive read on the thread keeps
//!   enrolling that subscriber.
//! - **Out-of-order drops**: guards are plain stack pops. Dropping guards
//!   in a different order than they were created pops the wrong entries.
//!   Scope-bound guards (the `with_tracking` form) cannot get this wrong.

use std::cell::RefCell;
use std::rc::Weak;

use crate::registry::Subscriber;

thread_local! {
    /// Stack of subscribers currently performing enrollment reads.
    static ACTIVE_SUBSCRIBERS: RefCell<Vec<Weak<dyn Subscriber>>> =
        const { RefCell::new(Vec::new()) };
}

/// RAII guard that ends a tracking window when dropped.
#[must_use]
pub struct TrackingGuard {
    /// Marker to prevent Send/Sync (thread-local data)
    _marker: std::marker::PhantomData<*const ()>,
}

impl Drop for TrackingGuard {
    fn drop(&mut self) {
        ACTIVE_SUBSCRIBERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Open a tracking window for `subscriber`.
///
/// Until the returned guard is dropped, every reactive field read on this
/// thread enrolls `subscriber` in that field's registry.
///
/// # Example
///
/// ```
/// use finegrain::{begin_tracking, Subscriber};
/// use std::rc::Rc;
///
/// struct Probe;
/// impl Subscriber for Probe {
///     fn update(&self) {}
/// }
///
/// let probe = Rc::new(Probe);
/// assert!(!finegrain::is_tracking());
/// {
///     let _guard = begin_tracking(Rc::downgrade(&probe) as _);
///     assert!(finegrain::is_tracking());
/// }
/// assert!(!finegrain::is_tracking());
/// ```
#[must_use = "tracking ends when the guard is dropped"]
pub fn begin_tracking(subscriber: Weak<dyn Subscriber>) -> TrackingGuard {
    ACTIVE_SUBSCRIBERS.with(|stack| {
        stack.borrow_mut().push(subscriber);
    });
    TrackingGuard {
        _marker: std::marker::PhantomData,
    }
}

/// Run a closure inside a tracking window for `subscriber`.
///
/// The window is closed when the closure returns, even if it panics.
pub fn with_tracking<F, R>(subscriber: Weak<dyn Subscriber>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = begin_tracking(subscriber);
    f()
}

/// The subscriber reactive reads currently enroll, if any.
#[must_use]
pub fn active_subscriber() -> Option<Weak<dyn Subscriber>> {
    ACTIVE_SUBSCRIBERS.with(|stack| stack.borrow().last().cloned())
}

/// Whether any tracking window is open on this thread.
#[must_use]
pub fn is_tracking() -> bool {
    ACTIVE_SUBSCRIBERS.with(|stack| !stack.borrow().is_empty())
}

/// Number of nested tracking windows on this thread.
#[must_use]
pub fn tracking_depth() -> usize {
    ACTIVE_SUBSCRIBERS.with(|stack| stack.borrow().len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
