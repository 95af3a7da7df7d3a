#![forbid(unsafe_code)]

//! Top-level owner of a reactive tree, with path-based access.
//!
//! A [`Store`] wraps its root object at construction and proxies reads,
//! writes, and watch registration through dot-separated field paths, so
//! callers never hand-walk the tree. Writes route through the ordinary
//! reactive write path: a `Store::set` is observationally identical to a
//! direct write on the field it resolves to. Writes whose parent path
//! cannot be resolved are dropped silently, in line with the engine's
//! tolerance for degenerate access.

use crate::object::ReactiveObject;
use crate::path::FieldPath;
use crate::value::Value;
use crate::watch::Watcher;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Owns a wrapped root object and addresses it by field path.
///
/// # Example
///
/// ```
/// use finegrain::{Store, Value};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let store = Store::new([("count", Value::from(1))].into_iter().collect());
///
/// let seen = Rc::new(Cell::new(0.0));
/// let sink = Rc::clone(&seen);
/// let _watcher = store.watch("count", move |value| {
///     if let Some(n) = value.as_f64() {
///         sink.set(n);
///     }
/// });
///
/// store.set("count", 2);
/// assert_eq!(seen.get(), 2.0);
/// assert_eq!(store.get("count"), Value::from(2));
/// ```
pub struct Store {
    data: ReactiveObject,
}

// Manual Clone: shares the same root.
impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl Store {
    /// Take ownership of `data` and install interception on it. Wrapping
    /// is idempotent, so an already (or partially) reactive object is
    /// fine.
    #[must_use]
    pub fn new(data: ReactiveObject) -> Self {
        data.make_reactive();
        Self { data }
    }

    /// The root object.
    #[must_use]
    pub fn data(&self) -> &ReactiveObject {
        &self.data
    }

    /// Read the field at `path`. Unresolvable paths yield
    /// `Value::Undefined`.
    #[must_use]
    pub fn get(&self, path: &str) -> Value {
        FieldPath::parse(path).resolve(&self.data)
    }

    /// Write the field at `path` through the reactive write path.
    ///
    /// The parent of the leaf segment must resolve to a container;
    /// otherwise the write is dropped. Writing a fresh leaf key on an
    /// existing object parent creates a plain (non-reactive) field, the
    /// same as a direct write would.
    pub fn set(&self, path: &str, value: impl Into<Value>) {
        let parsed = FieldPath::parse(path);
        match parsed.resolve_parent(&self.data) {
            Some((Value::Object(object), leaf)) => object.set(leaf, value),
            Some((Value::List(list), leaf)) => match leaf.parse::<usize>() {
                Ok(index) => list.set(index, value),
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    trace!(path = %path, "write dropped (non-numeric list index)");
                }
            },
            _ => {
                #[cfg(feature = "tracing")]
                trace!(path = %path, "write dropped (unresolvable path)");
            }
        }
    }

    /// Create a [`Watcher`] on `path`. Convenience for
    /// [`Watcher::new`] against the root object.
    pub fn watch(&self, path: &str, callback: impl Fn(&Value) + 'static) -> Watcher {
        Watcher::new(&self.data, path, callback)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ReactiveObject::new())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("data", &self.data).finish()
    }
}

// ---------------------------------------------------------------------------
// JSON import/export
// ---------------------------------------------------------------------------

/// Why [`Store::from_json`] rejected its input.
#[cfg(feature = "json")]
#[derive(Debug)]
pub enum FromJsonError {
    /// The input is not valid JSON.
    Parse(serde_json::Error),
    /// The input parsed, but its root is not an object.
    RootNotObject { found: &'static str },
}

#[cfg(feature = "json")]
impl std::fmt::Display for FromJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FromJsonError::Parse(err) => write!(f, "invalid JSON: {err}"),
            FromJsonError::RootNotObject { found } => {
                write!(f, "root must be an object, found {found}")
            }
        }
    }
}

#[cfg(feature = "json")]
impl std::error::Error for FromJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FromJsonError::Parse(err) => Some(err),
            FromJsonError::RootNotObject { .. } => None,
        }
    }
}

#[cfg(feature = "json")]
impl Store {
    /// Parse a JSON object and build a fully wrapped store from it.
    pub fn from_json(json: &str) -> Result<Self, FromJsonError> {
        let parsed: serde_json::Value =
            serde_json::from_str(json).map_err(FromJsonError::Parse)?;
        match Value::from_json(parsed) {
            Value::Object(root) => Ok(Self::new(root)),
            other => Err(FromJsonError::RootNotObject {
                found: other.type_name(),
            }),
        }
    }

    /// Snapshot the current tree as JSON. `Undefined` members are dropped
    /// and non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.data.to_json()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
