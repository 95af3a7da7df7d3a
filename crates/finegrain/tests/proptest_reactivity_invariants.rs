//! Property-based invariant tests for the reactive notification engine.
//!
//! These tests verify behavioral invariants that must hold for **any**
//! sequence of leaf-value writes against a wrapped object:
//!
//! 1. Read-after-write returns the written value for every key.
//! 2. A watcher fires exactly once per changing write to its own field,
//!    and never for writes to other fields.
//! 3. After any write sequence, each watcher's last observed value equals
//!    the field's final value.
//! 4. Rewriting an identical value any number of times never notifies.
//! 5. Wrapping is idempotent: extra passes neither duplicate notifications
//!    nor break existing subscriptions.
//! 6. Key enumeration order is unaffected by wrapping and writes.

use finegrain::{ReactiveObject, Value, Watcher, make_reactive};
use proptest::prelude::*;

use std::cell::Cell;
use std::rc::Rc;

const KEYS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

// ── Helpers ─────────────────────────────────────────────────────────────

fn fresh_state() -> ReactiveObject {
    let state: ReactiveObject = KEYS
        .iter()
        .map(|key| (*key, Value::from(0)))
        .collect();
    make_reactive(&state);
    state
}

fn counting_watchers(state: &ReactiveObject) -> (Vec<Watcher>, Vec<Rc<Cell<u32>>>) {
    let counts: Vec<Rc<Cell<u32>>> = KEYS.iter().map(|_| Rc::new(Cell::new(0))).collect();
    let watchers = KEYS
        .iter()
        .zip(&counts)
        .map(|(key, count)| {
            let count = Rc::clone(count);
            Watcher::new(state, key, move |_| count.set(count.get() + 1))
        })
        .collect();
    (watchers, counts)
}

// ── Strategies ──────────────────────────────────────────────────────────

/// Leaf values only. NaN is deliberately excluded: it never compares equal
/// to itself, so it has its own directed tests instead of property runs.
fn leaf_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i32..=1000).prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn writes_strategy() -> impl Strategy<Value = Vec<(usize, Value)>> {
    proptest::collection::vec((0..KEYS.len(), leaf_value_strategy()), 0..=24)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Read-after-write returns the written value
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn read_after_write_returns_written_value(writes in writes_strategy()) {
        let state = fresh_state();
        let mut shadow: Vec<Value> = KEYS.iter().map(|_| Value::from(0)).collect();

        for (index, value) in writes {
            state.set(KEYS[index], value.clone());
            shadow[index] = value;
        }

        for (index, key) in KEYS.iter().enumerate() {
            prop_assert_eq!(state.get(key), shadow[index].clone());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Exactly one notification per changing write, none across fields
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn watcher_fires_once_per_changing_write(writes in writes_strategy()) {
        let state = fresh_state();
        let (_watchers, counts) = counting_watchers(&state);

        let mut shadow: Vec<Value> = KEYS.iter().map(|_| Value::from(0)).collect();
        let mut expected = [0u32; 4];

        for (index, value) in writes {
            expected[index] += u32::from(shadow[index] != value);
            state.set(KEYS[index], value.clone());
            shadow[index] = value;
        }

        for (index, count) in counts.iter().enumerate() {
            prop_assert_eq!(count.get(), expected[index], "key {}", KEYS[index]);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Last observed value converges on the final field value
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn last_observed_tracks_final_value(writes in writes_strategy()) {
        let state = fresh_state();
        let watchers: Vec<Watcher> = KEYS
            .iter()
            .map(|key| Watcher::new(&state, key, |_| {}))
            .collect();

        for (index, value) in writes {
            state.set(KEYS[index], value);
        }

        for (index, watcher) in watchers.iter().enumerate() {
            prop_assert_eq!(watcher.last_observed(), state.get(KEYS[index]));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Identical rewrites are always suppressed
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn unchanged_writes_never_fire(value in leaf_value_strategy(), repeats in 1usize..5) {
        let state: ReactiveObject = [("field", value.clone())].into_iter().collect();
        make_reactive(&state);

        let fired = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&fired);
        let _watcher = Watcher::new(&state, "field", move |_| count.set(count.get() + 1));

        for _ in 0..repeats {
            state.set("field", value.clone());
        }
        prop_assert_eq!(fired.get(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Wrapping is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rewrapping_preserves_single_notification(
        value in leaf_value_strategy(),
        extra_wraps in 0usize..3,
    ) {
        let state = fresh_state();
        let (_watchers, counts) = counting_watchers(&state);

        for _ in 0..extra_wraps {
            make_reactive(&state);
        }

        let changes = u32::from(state.get("alpha") != value);
        state.set("alpha", value.clone());

        prop_assert_eq!(counts[0].get(), changes);
        prop_assert_eq!(state.get("alpha"), value);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Enumeration order survives wrapping and writes
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn enumeration_order_is_stable(writes in writes_strategy()) {
        let state = fresh_state();
        for (index, value) in writes {
            state.set(KEYS[index], value);
        }

        let keys: Vec<String> = state.keys().iter().map(|k| k.to_string()).collect();
        prop_assert_eq!(keys, KEYS.iter().map(|k| (*k).to_string()).collect::<Vec<_>>());
    }
}
