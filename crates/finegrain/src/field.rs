#![forbid(unsafe_code)]

//! A single intercepted field: value cell plus its subscriber registry.
//!
//! # Design
//!
//! [`ReactiveField`] is what a container slot becomes when interception is
//! installed on it. It pairs the field's current [`Value`] with the one
//! [`SubscriberRegistry`] that lives exactly as long as the field does.
//! Reads go through [`ReactiveField::get`], which enrolls the currently
//! tracked subscriber (if any) before handing the value out. Writes go
//! through [`ReactiveField::set`], which in order:
//!
//! 1. compares the incoming value against the current one (identity
//!    semantics, see [`Value`]) and silently returns when they match,
//! 2. stores the new value,
//! 3. recursively installs interception if the new value is a container,
//! 4. notifies the registry.
//!
//! A later read therefore always sees the stored value, and subscribers
//! never observe a container value that has not been wrapped yet.
//!
//! # Invariants
//!
//! 1. The registry is created with the field and never replaced.
//! 2. A container value held by a field is always reactive, whether it
//!    arrived at construction or through a write.
//! 3. Same-value writes produce no notification.
//!
//! # Failure Modes
//!
//! - **Write loops**: all borrows are released before subscribers run, so a
//!   subscriber may write back into this very field. The nested write runs
//!   to completion (including its own notification pass) before the outer
//!   pass resumes. A callback that unconditionally writes a fresh value
//!   recurses until the stack runs out; nothing detects the loop.
//! - **Cyclic containers**: wrapping recurses through nested containers. A
//!   value graph that reaches back into a container currently being
//!   wrapped panics on the re-entrant borrow.

use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::SubscriberRegistry;
use crate::track::active_subscriber;
use crate::value::Value;

#[cfg(feature = "tracing")]
use tracing::trace;

/// An intercepted field with change detection and per-field subscribers.
pub struct ReactiveField {
    key: Rc<str>,
    value: RefCell<Value>,
    registry: SubscriberRegistry,
}

impl ReactiveField {
    /// Create a field holding `initial`, wrapping it first if it is a
    /// container.
    #[must_use]
    pub fn new(key: impl Into<Rc<str>>, initial: Value) -> Self {
        make_reactive_value(&initial);
        Self {
            key: key.into(),
            value: RefCell::new(initial),
            registry: SubscriberRegistry::new(),
        }
    }

    /// The field's name. Index fields of a list use the decimal index.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the current value.
    ///
    /// If a tracking window is open on this thread, the tracked subscriber
    /// is enrolled in this field's registry before the value is returned.
    #[must_use]
    pub fn get(&self) -> Value {
        if let Some(subscriber) = active_subscriber() {
            #[cfg(feature = "tracing")]
            trace!(key = %self.key, "tracked read");
            self.registry.register(subscriber);
        }
        self.value.borrow().clone()
    }

    /// Write a new value.
    ///
    /// A value identical to the current one (by the identity semantics of
    /// [`Value`]) is dropped without side effects. Otherwise the value is
    /// stored, wrapped if it is a container, and the registry is notified.
    pub fn set(&self, next: Value) {
        {
            let mut current = self.value.borrow_mut();
            if *current == next {
                #[cfg(feature = "tracing")]
                trace!(key = %self.key, "write suppressed (unchanged)");
                return;
            }
            *current = next;
        }
        {
            let current = self.value.borrow();
            make_reactive_value(&current);
        }
        #[cfg(feature = "tracing")]
        trace!(key = %self.key, subscribers = self.registry.len(), "field changed");
        self.registry.notify_all();
    }

    /// Read the current value without enrolling anybody.
    ///
    /// Used by formatting and snapshotting, which must not create
    /// subscriptions as a side effect.
    pub(crate) fn peek(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Entry count of this field's registry, dead entries included.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

impl std::fmt::Debug for ReactiveField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveField")
            .field("key", &self.key)
            .field("value", &self.peek())
            .field("subscribers", &self.registry.len())
            .finish()
    }
}

/// Install interception on `value` if it is a container; do nothing for
/// leaves. Safe to call on an already-reactive container.
pub(crate) fn make_reactive_value(value: &Value) {
    match value {
        Value::Object(object) => object.make_reactive(),
        Value::List(list) => list.make_reactive(),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ReactiveObject;
    use crate::registry::Subscriber;
    use crate::track::with_tracking;
    use std::cell::Cell;
    use std::rc::Weak;

    struct Probe {
        hits: Cell<u32>,
    }

    impl Probe {
        fn new() -> Rc<Self> {
            Rc::new(Self { hits: Cell::new(0) })
        }
    }

    impl Subscriber for Probe {
        fn update(&self) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    /// Enroll `probe` by reading `field` inside a tracking window.
    fn enroll(field: &ReactiveField, probe: &Rc<Probe>) -> Value {
        with_tracking(Rc::downgrade(probe) as Weak<dyn Subscriber>, || field.get())
    }

    #[test]
    fn get_returns_stored_value() {
        let field = ReactiveField::new("count", Value::from(1));
        assert_eq!(field.get(), Value::from(1));
        assert_eq!(field.key(), "count");
    }

    #[test]
    fn set_stores_new_value() {
        let field = ReactiveField::new("count", Value::from(1));
        field.set(Value::from(2));
        assert_eq!(field.get(), Value::from(2));
    }

    #[test]
    fn tracked_read_enrolls_subscriber() {
        let field = ReactiveField::new("count", Value::from(1));
        let probe = Probe::new();
        assert_eq!(enroll(&field, &probe), Value::from(1));
        assert_eq!(field.subscriber_count(), 1);

        field.set(Value::from(2));
        assert_eq!(probe.hits.get(), 1);
    }

    #[test]
    fn untracked_read_enrolls_nobody() {
        let field = ReactiveField::new("count", Value::from(1));
        let _ = field.get();
        assert_eq!(field.subscriber_count(), 0);
    }

    #[test]
    fn change_notifies_exactly_once_per_write() {
        let field = ReactiveField::new("count", Value::from(1));
        let probe = Probe::new();
        enroll(&field, &probe);

        field.set(Value::from(2));
        field.set(Value::from(3));
        assert_eq!(probe.hits.get(), 2);
    }

    #[test]
    fn same_value_write_is_suppressed() {
        let field = ReactiveField::new("count", Value::from(1));
        let probe = Probe::new();
        enroll(&field, &probe);

        field.set(Value::from(1));
        assert_eq!(probe.hits.get(), 0);
        assert_eq!(field.get(), Value::from(1));
    }

    #[test]
    fn nan_overwrite_always_notifies() {
        let field = ReactiveField::new("count", Value::from(f64::NAN));
        let probe = Probe::new();
        enroll(&field, &probe);

        field.set(Value::from(f64::NAN));
        assert_eq!(probe.hits.get(), 1);
    }

    #[test]
    fn same_container_handle_is_suppressed() {
        let object = ReactiveObject::new();
        let field = ReactiveField::new("info", Value::from(object.clone()));
        let probe = Probe::new();
        enroll(&field, &probe);

        field.set(Value::from(object));
        assert_eq!(probe.hits.get(), 0);

        // A structurally identical but distinct object is a change.
        field.set(Value::from(ReactiveObject::new()));
        assert_eq!(probe.hits.get(), 1);
    }

    #[test]
    fn construction_wraps_nested_containers() {
        let inner: ReactiveObject = [("text", Value::from("hi"))].into_iter().collect();
        let field = ReactiveField::new("info", Value::from(inner.clone()));
        assert!(inner.is_reactive("text"));
        assert_eq!(field.get().as_object().map(ReactiveObject::len), Some(1));
    }

    #[test]
    fn written_container_is_wrapped_before_subscribers_run() {
        struct Inspector {
            field: Rc<ReactiveField>,
            saw_reactive: Cell<bool>,
        }
        impl Subscriber for Inspector {
            fn update(&self) {
                let value = self.field.peek();
                if let Some(object) = value.as_object() {
                    self.saw_reactive.set(object.is_reactive("text"));
                }
            }
        }

        let field = Rc::new(ReactiveField::new("info", Value::Null));
        let inspector = Rc::new(Inspector {
            field: Rc::clone(&field),
            saw_reactive: Cell::new(false),
        });
        with_tracking(Rc::downgrade(&inspector) as Weak<dyn Subscriber>, || {
            field.get()
        });

        let fresh: ReactiveObject = [("text", Value::from("later"))].into_iter().collect();
        assert!(!fresh.is_reactive("text"));
        field.set(Value::from(fresh));
        assert!(inspector.saw_reactive.get());
    }

    #[test]
    fn subscriber_write_back_runs_to_completion() {
        struct Clamp {
            field: Rc<ReactiveField>,
        }
        impl Subscriber for Clamp {
            fn update(&self) {
                if let Some(n) = self.field.peek().as_f64()
                    && n > 10.0
                {
                    self.field.set(Value::from(10.0));
                }
            }
        }

        let field = Rc::new(ReactiveField::new("count", Value::from(1)));
        let clamp = Rc::new(Clamp {
            field: Rc::clone(&field),
        });
        with_tracking(Rc::downgrade(&clamp) as Weak<dyn Subscriber>, || {
            field.get()
        });

        field.set(Value::from(25));
        assert_eq!(field.get(), Value::from(10));
    }

    #[test]
    fn debug_format() {
        let field = ReactiveField::new("count", Value::from(42));
        let dbg = format!("{field:?}");
        assert!(dbg.contains("ReactiveField"));
        assert!(dbg.contains("count"));
        assert!(dbg.contains("42"));
    }
}
