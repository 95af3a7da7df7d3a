#![forbid(unsafe_code)]

//! Dynamic value model for reactive state trees.
//!
//! # Design
//!
//! [`Value`] is the field type of every reactive container: a small dynamic
//! enum covering the leaf kinds (`Undefined`, `Null`, `Bool`, `Number`,
//! `String`) plus the two container kinds (`Object`, `List`). Containers are
//! cheap handles (`Rc` inside), so cloning a `Value` never deep-copies a
//! subtree and two clones of a container value refer to the same storage.
//!
//! # Equality
//!
//! `PartialEq` deliberately implements *identity* semantics, because change
//! suppression on the write path compares with it:
//!
//! - leaves compare by content (`f64` equality for numbers, so
//!   `Number(NAN) != Number(NAN)` and a NaN overwrite always notifies),
//! - containers compare by handle ([`ReactiveObject::ptr_eq`]), so two
//!   structurally equal objects are *not* equal unless they share storage.
//!
//! `Value` is therefore `PartialEq` but not `Eq`.

use std::fmt;
use std::rc::Rc;

use crate::list::ReactiveList;
use crate::object::ReactiveObject;

/// A dynamically typed field value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absent field. Reads of keys that were never populated produce this.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    /// IEEE 754 double. Integers are stored as their exact double value.
    Number(f64),
    /// Immutable shared string.
    String(Rc<str>),
    /// Handle to a shared field map.
    Object(ReactiveObject),
    /// Handle to a shared element vector.
    List(ReactiveList),
}

impl Value {
    /// Short lowercase name of the value's kind, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::List(_) => "list",
        }
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Object` and `List` values, the kinds that participate in
    /// recursive interception.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::List(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&ReactiveList> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Identity comparison. See the module docs for why containers compare by
/// handle rather than by content.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    /// Lossy beyond 2^53; numbers are IEEE doubles.
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<ReactiveObject> for Value {
    fn from(value: ReactiveObject) -> Self {
        Value::Object(value)
    }
}

impl From<ReactiveList> for Value {
    fn from(value: ReactiveList) -> Self {
        Value::List(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => {
                if n.is_nan() {
                    f.write_str("NaN")
                } else if n.is_infinite() {
                    f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else {
                    write!(f, "{n}")
                }
            }
            Value::String(s) => f.write_str(s),
            Value::Object(object) => write!(f, "{object}"),
            Value::List(list) => write!(f, "{list}"),
        }
    }
}

/// Display helper for values nested inside a container: identical to
/// `Display` except that strings are quoted.
pub(crate) fn fmt_nested(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "\"{s}\""),
        other => write!(f, "{other}"),
    }
}

#[cfg(feature = "json")]
impl Value {
    /// Convert a parsed JSON tree into a plain (not yet reactive) value tree.
    ///
    /// Numbers become `f64`; objects keep the document's key order.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(Rc::from(s)),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(members) => Value::Object(
                members
                    .into_iter()
                    .map(|(key, member)| (key, Value::from_json(member)))
                    .collect(),
            ),
        }
    }

    /// Snapshot this value as a JSON tree.
    ///
    /// Follows the usual stringify rules for the awkward cases: `Undefined`
    /// object members are dropped, `Undefined` list elements and non-finite
    /// numbers become `null`. A bare top-level `Undefined` also becomes
    /// `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Object(object) => object.to_json(),
            Value::List(list) => list.to_json(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
