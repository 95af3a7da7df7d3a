#![forbid(unsafe_code)]

//! Per-field subscriber registry with weak membership.
//!
//! # Design
//!
//! Every reactive field owns one [`SubscriberRegistry`] for its whole
//! lifetime. The registry holds `Weak` references to anything implementing
//! [`Subscriber`]: it records who depends on the field without owning them,
//! so dropping the last strong handle to a subscriber is all it takes to
//! unsubscribe. Dead entries are pruned lazily during notification.
//!
//! # Invariants
//!
//! 1. Registration order is preserved; `notify_all` invokes subscribers in
//!    that order.
//! 2. Duplicate registrations are kept and invoked once each.
//! 3. Entries whose referent is gone are never invoked and are removed by
//!    the next `notify_all`.
//! 4. Registration of an already-dead reference is silently ignored.
//!
//! # Failure Modes
//!
//! - **Panicking subscriber**: `notify_all` does not guard callbacks. A
//!   panic in one subscriber propagates and the rest of that batch is
//!   skipped.
//! - **Unbounded growth**: registrations are only removed when their
//!   referent dies. A long-lived subscriber that re-reads a field under
//!   tracking accumulates duplicate entries.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[cfg(feature = "tracing")]
use tracing::trace;

/// Capability required to enroll in a [`SubscriberRegistry`].
///
/// `update` is invoked, with no arguments, every time a field the
/// subscriber is enrolled in changes value. Implementations re-read
/// whatever state they depend on and decide for themselves whether to act.
pub trait Subscriber {
    fn update(&self);
}

/// An ordered set of weak subscriber references.
pub struct SubscriberRegistry {
    subscribers: RefCell<Vec<Weak<dyn Subscriber>>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Append a subscriber reference.
    ///
    /// A reference that can no longer be upgraded is dropped without being
    /// recorded. Duplicates are not detected here; an interested party that
    /// registers twice is updated twice per notification.
    pub fn register(&self, subscriber: Weak<dyn Subscriber>) {
        if subscriber.strong_count() == 0 {
            #[cfg(feature = "tracing")]
            trace!("subscriber registration ignored (dead reference)");
            return;
        }
        self.subscribers.borrow_mut().push(subscriber);
    }

    /// Invoke `update` on every live subscriber, in registration order.
    ///
    /// Dead entries are pruned first. The internal borrow is released
    /// before any callback runs, so subscribers may re-read fields or
    /// register further subscribers while the notification is in flight.
    pub fn notify_all(&self) {
        let live: Vec<Rc<dyn Subscriber>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|entry| entry.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        #[cfg(feature = "tracing")]
        trace!(subscribers = live.len(), "notifying subscribers");

        for subscriber in &live {
            subscriber.update();
        }
    }

    /// Number of recorded entries, including dead ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
