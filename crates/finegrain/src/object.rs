#![forbid(unsafe_code)]

//! Keyed reactive container: a field map with per-field interception.
//!
//! # Design
//!
//! [`ReactiveObject`] is a shared, insertion-ordered map from field name to
//! slot. Fields start out plain; [`ReactiveObject::make_reactive`] converts
//! every plain slot into a [`ReactiveField`] (recursing into nested
//! containers), after which reads and writes of that field go through the
//! interception path. Fields added after conversion stay plain, mirroring
//! the behavior of define-time interception: only the fields present at
//! wrap time are observable.
//!
//! Access never holds the map borrow across field logic: the slot's field
//! handle is cloned out first, so a subscriber running inside a
//! notification may read from, write to, or add fields on the same object.
//!
//! # Invariants
//!
//! 1. Enumeration order is insertion order and survives `make_reactive`.
//! 2. `make_reactive` is idempotent: reactive slots are skipped and keep
//!    their registries, so existing subscriptions survive re-application.
//! 3. Reading an absent field yields `Value::Undefined` and enrolls
//!    nobody.
//! 4. Cloning the handle shares storage; there is no deep copy.
//!
//! # Failure Modes
//!
//! - **Cyclic graphs**: `make_reactive` recurses through containers. A
//!   graph that reaches back into an object currently being wrapped panics
//!   on the re-entrant borrow, and formatting a cyclic graph recurses
//!   until the stack runs out.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::field::ReactiveField;
use crate::value::{Value, fmt_nested};

// ============================================================================
// Slots
// ============================================================================

/// A container entry: either untouched data or an intercepted field.
#[derive(Clone)]
pub(crate) enum Slot {
    /// Not intercepted. Reads are untracked and writes notify nobody.
    Plain(Value),
    /// Intercepted. Shared so the handle can be cloned out of the map
    /// borrow before field logic runs.
    Reactive(Rc<ReactiveField>),
}

impl Slot {
    /// Current value without tracking side effects.
    pub(crate) fn peek(&self) -> Value {
        match self {
            Slot::Plain(value) => value.clone(),
            Slot::Reactive(field) => field.peek(),
        }
    }
}

// ============================================================================
// ReactiveObject
// ============================================================================

/// Shared interior for [`ReactiveObject`].
struct ObjectInner {
    slots: IndexMap<Rc<str>, Slot>,
}

/// A shared, insertion-ordered field map.
///
/// Cloning a `ReactiveObject` creates a new handle to the **same** inner
/// state; equality of handles is [`ReactiveObject::ptr_eq`].
pub struct ReactiveObject {
    inner: Rc<RefCell<ObjectInner>>,
}

// Manual Clone: shares the same Rc.
impl Clone for ReactiveObject {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl ReactiveObject {
    /// Create an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                slots: IndexMap::new(),
            })),
        }
    }

    /// Read a field.
    ///
    /// Absent fields yield `Value::Undefined`. Reading a reactive field
    /// inside a tracking window enrolls the tracked subscriber; reading a
    /// plain field never does.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        let field = {
            let inner = self.inner.borrow();
            match inner.slots.get(key) {
                Some(Slot::Reactive(field)) => Rc::clone(field),
                Some(Slot::Plain(value)) => return value.clone(),
                None => return Value::Undefined,
            }
        };
        field.get()
    }

    /// Write a field.
    ///
    /// A reactive field goes through the full interception path (change
    /// suppression, wrapping, notification). A plain field is overwritten
    /// silently, and an absent key is created as a new plain field.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let field = {
            let mut inner = self.inner.borrow_mut();
            match inner.slots.get_mut(key) {
                Some(Slot::Reactive(field)) => Rc::clone(field),
                Some(Slot::Plain(current)) => {
                    *current = value;
                    return;
                }
                None => {
                    inner.slots.insert(Rc::from(key), Slot::Plain(value));
                    return;
                }
            }
        };
        field.set(value);
    }

    /// Convert every currently plain field into a reactive one, recursing
    /// into nested containers. Already reactive fields are left untouched,
    /// so repeated application is safe.
    pub fn make_reactive(&self) {
        let mut inner = self.inner.borrow_mut();
        for (key, slot) in inner.slots.iter_mut() {
            if let Slot::Plain(value) = slot {
                let taken = std::mem::take(value);
                *slot = Slot::Reactive(Rc::new(ReactiveField::new(Rc::clone(key), taken)));
            }
        }
    }

    /// Field names in enumeration (insertion) order.
    #[must_use]
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.inner.borrow().slots.keys().cloned().collect()
    }

    /// Number of fields, plain and reactive alike.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().slots.contains_key(key)
    }

    /// Whether `key` exists and has been converted to a reactive field.
    #[must_use]
    pub fn is_reactive(&self, key: &str) -> bool {
        matches!(self.inner.borrow().slots.get(key), Some(Slot::Reactive(_)))
    }

    /// Registry entry count for `key`; 0 for plain or absent fields.
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        match self.inner.borrow().slots.get(key) {
            Some(Slot::Reactive(field)) => field.subscriber_count(),
            _ => 0,
        }
    }

    /// Whether two handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Snapshot as JSON, dropping `Undefined` members.
    #[cfg(feature = "json")]
    pub(crate) fn to_json(&self) -> serde_json::Value {
        let inner = self.inner.borrow();
        let mut members = serde_json::Map::new();
        for (key, slot) in &inner.slots {
            let value = slot.peek();
            if value.is_undefined() {
                continue;
            }
            members.insert(key.to_string(), value.to_json());
        }
        serde_json::Value::Object(members)
    }
}

impl Default for ReactiveObject {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<Rc<str>>> FromIterator<(K, Value)> for ReactiveObject {
    /// Build an object of plain fields, preserving iteration order.
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let slots = iter
            .into_iter()
            .map(|(key, value)| (key.into(), Slot::Plain(value)))
            .collect();
        Self {
            inner: Rc::new(RefCell::new(ObjectInner { slots })),
        }
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.write_str("ReactiveObject ")?;
        let mut map = f.debug_map();
        for (key, slot) in &inner.slots {
            map.entry(key, &slot.peek());
        }
        map.finish()
    }
}

impl fmt::Display for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.write_str("{")?;
        for (i, (key, slot)) in inner.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: ")?;
            fmt_nested(&slot.peek(), f)?;
        }
        f.write_str("}")
    }
}

/// Install field interception on every current field of `object`. See
/// [`ReactiveObject::make_reactive`].
pub fn make_reactive(object: &ReactiveObject) {
    object.make_reactive();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
