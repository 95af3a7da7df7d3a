#![forbid(unsafe_code)]

//! Fine-grained reactive state: dependency-tracked fields, watchers, and
//! change notification.
//!
//! # Role
//! `finegrain` keeps a tree of dynamically typed state and tells interested
//! parties when the parts they actually read have changed. Dependencies are
//! discovered, not declared: a [`Watcher`] evaluates its read under an
//! active-tracking marker, and every reactive field touched during that read
//! enrolls it. Later writes to those fields re-run the watcher; writes to
//! everything else stay silent.
//!
//! # Primary responsibilities
//! - **[`Value`]**: the dynamic field value type (undefined, null, booleans,
//!   numbers, strings, container handles).
//! - **[`ReactiveObject`] / [`ReactiveList`]**: containers whose fields are
//!   converted, key by key, into interception points ([`ReactiveField`]).
//! - **[`Watcher`]**: a tracked computation unit with change-suppressed
//!   re-firing.
//! - **[`Store`]**: top-level owner of a wrapped tree with dot-path access.
//!
//! # Threading
//! The engine is single-threaded by construction. State is shared through
//! `Rc`/`RefCell`, subscriptions are held as `Weak` references (dropping a
//! watcher unsubscribes it), and the tracking marker is thread-local.
//!
//! # Example
//!
//! ```
//! use finegrain::{ReactiveObject, Value, Watcher, make_reactive};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let info: ReactiveObject = [("text", Value::from("hi"))].into_iter().collect();
//! let state: ReactiveObject = [
//!     ("count", Value::from(1)),
//!     ("info", Value::from(info)),
//! ]
//! .into_iter()
//! .collect();
//! make_reactive(&state);
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&log);
//! let _watcher = Watcher::new(&state, "info.text", move |value| {
//!     sink.borrow_mut().push(value.to_string());
//! });
//!
//! state.set("count", 2); // not enrolled on this watcher's path
//! let info = state.get("info").as_object().cloned().unwrap();
//! info.set("text", "there"); // fires
//! info.set("text", "there"); // unchanged, suppressed
//!
//! assert_eq!(*log.borrow(), vec!["there".to_string()]);
//! ```
//!
//! # Feature flags
//! - `tracing`: structured trace events on registration, notification, and
//!   suppressed or dropped writes.
//! - `json`: build a [`Store`] from a JSON document and snapshot it back
//!   (via `serde_json`).

pub mod field;
pub mod list;
pub mod object;
mod path;
pub mod registry;
pub mod store;
pub mod track;
pub mod value;
pub mod watch;

pub use field::ReactiveField;
pub use list::ReactiveList;
pub use object::{ReactiveObject, make_reactive};
pub use registry::{Subscriber, SubscriberRegistry};
#[cfg(feature = "json")]
pub use store::FromJsonError;
pub use store::Store;
pub use track::{
    TrackingGuard, active_subscriber, begin_tracking, is_tracking, tracking_depth, with_tracking,
};
pub use value::Value;
pub use watch::Watcher;
