#![forbid(unsafe_code)]

//! Dotted field paths and their resolution against a reactive tree.
//!
//! A path like `info.text` names one field per segment; a segment applied
//! to a list is parsed as a decimal index (`items.0`). Resolution is
//! tolerant: a missing field, a leaf where a container was needed, or an
//! unparsable index all resolve to `Value::Undefined`.

use smallvec::SmallVec;
use std::rc::Rc;

use crate::object::ReactiveObject;
use crate::value::Value;

/// A parsed dot-separated field path.
pub(crate) struct FieldPath {
    raw: Rc<str>,
    segments: SmallVec<[Rc<str>; 4]>,
}

impl FieldPath {
    pub(crate) fn parse(path: &str) -> Self {
        let raw: Rc<str> = Rc::from(path);
        let segments: SmallVec<[Rc<str>; 4]> = raw.split('.').map(Rc::from).collect();
        Self { raw, segments }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walk the path from `root`. Every step is an ordinary field read, so
    /// fields along an existing prefix enroll the tracked subscriber the
    /// same way a direct read would.
    pub(crate) fn resolve(&self, root: &ReactiveObject) -> Value {
        let mut current = Value::Object(root.clone());
        for segment in &self.segments {
            current = step(&current, segment);
        }
        current
    }

    /// Walk all but the last segment, returning the parent container and
    /// the leaf segment. `None` when the walk does not end at a container.
    pub(crate) fn resolve_parent(&self, root: &ReactiveObject) -> Option<(Value, &str)> {
        let (leaf, front) = self.segments.split_last()?;
        let mut current = Value::Object(root.clone());
        for segment in front {
            current = step(&current, segment);
        }
        if current.is_container() {
            Some((current, &**leaf))
        } else {
            None
        }
    }
}

fn step(current: &Value, segment: &str) -> Value {
    match current {
        Value::Object(object) => object.get(segment),
        Value::List(list) => match segment.parse::<usize>() {
            Ok(index) => list.get(index),
            Err(_) => Value::Undefined,
        },
        _ => Value::Undefined,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
