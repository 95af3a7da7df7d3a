#![forbid(unsafe_code)]

//! Watchers: per-path computation units with compare-and-fire callbacks.
//!
//! # Design
//!
//! A [`Watcher`] observes one field path of a host object. Construction
//! performs exactly one read of that path inside a tracking window, so
//! every reactive field the walk touches enrolls the watcher in its
//! registry. From then on a change to any enrolled field triggers an
//! update: the watcher re-reads the path *outside* any tracking window,
//! compares the result with the last observed value (identity semantics,
//! see [`Value`]), and invokes the callback with the new value only when
//! they differ. Updates never notify further; fan-out stops here.
//!
//! Because the update read is untracked, enrollment is fixed at
//! construction time. Replacing an intermediate object wholesale fires the
//! watcher once (an enrolled ancestor field changed), but the fields of
//! the replacement object never enroll it afterwards. That mirrors
//! define-time interception throughout the engine.
//!
//! # Ownership
//!
//! The handle holds the only strong reference to the watcher's internals;
//! field registries hold weak ones. Dropping the handle retires the
//! subscription, and each registry prunes the dead entry on its next
//! notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::object::ReactiveObject;
use crate::path::FieldPath;
use crate::registry::Subscriber;
use crate::track::begin_tracking;
use crate::value::Value;

#[cfg(feature = "tracing")]
use tracing::trace;

struct WatcherInner {
    host: ReactiveObject,
    path: FieldPath,
    callback: Box<dyn Fn(&Value)>,
    last_observed: RefCell<Value>,
}

impl Subscriber for WatcherInner {
    fn update(&self) {
        let current = self.path.resolve(&self.host);
        let changed = {
            let last = self.last_observed.borrow();
            *last != current
        };
        if !changed {
            return;
        }
        *self.last_observed.borrow_mut() = current.clone();
        #[cfg(feature = "tracing")]
        trace!(key = %self.path.as_str(), "watcher callback fired");
        (self.callback)(&current);
    }
}

/// Observes one field path and runs a callback when its value changes.
///
/// # Example
///
/// ```
/// use finegrain::{ReactiveObject, Value, Watcher};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let host: ReactiveObject = [("count", Value::from(1))].into_iter().collect();
/// host.make_reactive();
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let watcher = Watcher::new(&host, "count", move |value| {
///     sink.borrow_mut().push(value.clone());
/// });
/// assert_eq!(watcher.last_observed(), Value::from(1));
///
/// host.set("count", 2);
/// host.set("count", 2); // unchanged, no callback
/// assert_eq!(*seen.borrow(), vec![Value::from(2)]);
/// ```
#[must_use = "the watcher is retired when dropped"]
pub struct Watcher {
    inner: Rc<WatcherInner>,
}

impl Watcher {
    /// Create a watcher on `key`, a dot-separated field path of `host`
    /// (`count`, `info.text`, `items.0`).
    ///
    /// The construction read resolves the path once under tracking and
    /// caches the result. A path that resolves to nothing observes
    /// `Value::Undefined` and enrolls only on the fields of its existing
    /// prefix.
    pub fn new(host: &ReactiveObject, key: &str, callback: impl Fn(&Value) + 'static) -> Self {
        let inner = Rc::new(WatcherInner {
            host: host.clone(),
            path: FieldPath::parse(key),
            callback: Box::new(callback),
            last_observed: RefCell::new(Value::Undefined),
        });
        let initial = {
            let _guard = begin_tracking(Rc::downgrade(&inner) as Weak<dyn Subscriber>);
            inner.path.resolve(&inner.host)
        };
        *inner.last_observed.borrow_mut() = initial;
        Self { inner }
    }

    /// The watched path, as given at construction.
    #[must_use]
    pub fn key(&self) -> &str {
        self.inner.path.as_str()
    }

    /// The value from the most recent (construction or update) read.
    #[must_use]
    pub fn last_observed(&self) -> Value {
        self.inner.last_observed.borrow().clone()
    }

    /// Re-evaluate now: re-read the path, compare, and fire the callback
    /// if the value changed. This is the same entry point field
    /// notifications use.
    pub fn update(&self) {
        self.inner.update();
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("key", &self.inner.path.as_str())
            .field("last_observed", &self.inner.last_observed.borrow())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
