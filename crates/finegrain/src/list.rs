#![forbid(unsafe_code)]

//! Indexed reactive container.
//!
//! Lists are treated as field maps keyed by decimal index: wrapping makes
//! the *current* index slots reactive and nothing else. Length is not a
//! field, `push` appends a plain slot without notifying anybody, and slots
//! appended after wrapping stay plain. Only writes to indices that were
//! present at wrap time notify.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::field::ReactiveField;
use crate::object::Slot;
use crate::value::{Value, fmt_nested};

/// Shared interior for [`ReactiveList`].
struct ListInner {
    slots: Vec<Slot>,
}

/// A shared element vector with per-index interception.
pub struct ReactiveList {
    inner: Rc<RefCell<ListInner>>,
}

// Manual Clone: shares the same Rc.
impl Clone for ReactiveList {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl ReactiveList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner { slots: Vec::new() })),
        }
    }

    /// Read an element. Out-of-range indices yield `Value::Undefined`.
    #[must_use]
    pub fn get(&self, index: usize) -> Value {
        let field = {
            let inner = self.inner.borrow();
            match inner.slots.get(index) {
                Some(Slot::Reactive(field)) => Rc::clone(field),
                Some(Slot::Plain(value)) => return value.clone(),
                None => return Value::Undefined,
            }
        };
        field.get()
    }

    /// Write an element.
    ///
    /// In-range writes follow the slot's nature (reactive or plain).
    /// Writing past the end fills the gap with plain `Undefined` slots and
    /// appends the value as a plain slot.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        let field = {
            let mut inner = self.inner.borrow_mut();
            if index >= inner.slots.len() {
                inner
                    .slots
                    .resize_with(index, || Slot::Plain(Value::Undefined));
                inner.slots.push(Slot::Plain(value));
                return;
            }
            match &mut inner.slots[index] {
                Slot::Reactive(field) => Rc::clone(field),
                Slot::Plain(current) => {
                    *current = value;
                    return;
                }
            }
        };
        field.set(value);
    }

    /// Append a plain element. Never notifies.
    pub fn push(&self, value: impl Into<Value>) {
        self.inner
            .borrow_mut()
            .slots
            .push(Slot::Plain(value.into()));
    }

    /// Current element count. Untracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    /// Convert every currently plain index slot into a reactive field
    /// (keyed by its decimal index), recursing into nested containers.
    /// Idempotent.
    pub fn make_reactive(&self) {
        let mut inner = self.inner.borrow_mut();
        for (index, slot) in inner.slots.iter_mut().enumerate() {
            if let Slot::Plain(value) = slot {
                let taken = std::mem::take(value);
                *slot = Slot::Reactive(Rc::new(ReactiveField::new(index.to_string(), taken)));
            }
        }
    }

    /// Whether `index` exists and has been converted to a reactive field.
    #[must_use]
    pub fn is_reactive(&self, index: usize) -> bool {
        matches!(
            self.inner.borrow().slots.get(index),
            Some(Slot::Reactive(_))
        )
    }

    /// Registry entry count for `index`; 0 for plain or absent slots.
    #[must_use]
    pub fn subscriber_count(&self, index: usize) -> usize {
        match self.inner.borrow().slots.get(index) {
            Some(Slot::Reactive(field)) => field.subscriber_count(),
            _ => 0,
        }
    }

    /// Whether two handles share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Snapshot as JSON; `Undefined` elements become `null`.
    #[cfg(feature = "json")]
    pub(crate) fn to_json(&self) -> serde_json::Value {
        let inner = self.inner.borrow();
        serde_json::Value::Array(inner.slots.iter().map(|slot| slot.peek().to_json()).collect())
    }
}

impl Default for ReactiveList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for ReactiveList {
    /// Build a list of plain elements.
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let slots = iter.into_iter().map(Slot::Plain).collect();
        Self {
            inner: Rc::new(RefCell::new(ListInner { slots })),
        }
    }
}

impl fmt::Debug for ReactiveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.write_str("ReactiveList ")?;
        let mut list = f.debug_list();
        for slot in &inner.slots {
            list.entry(&slot.peek());
        }
        list.finish()
    }
}

impl fmt::Display for ReactiveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.write_str("[")?;
        for (i, slot) in inner.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt_nested(&slot.peek(), f)?;
        }
        f.write_str("]")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
