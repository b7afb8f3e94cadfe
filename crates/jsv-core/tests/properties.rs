//! # Property Tests: Equivalence and Report Invariants
//!
//! Randomized checks of the laws the validator cache and report depend on:
//!
//! - equivalence is reflexive, symmetric, transitive, and consistent with
//!   hashing;
//! - the log-level filter stores exactly the messages at or above it;
//! - `is_success()` is false iff some stored message is ERROR or above.

use jsv_core::{
    tree_equivalent, tree_hash, InstanceType, LogLevel, ProcessingMessage, ProcessingReport,
    SchemaContext, SchemaTree,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(|n| json!(n)),
        "[a-c]{0,3}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-d]", inner), 0..4).prop_map(|members| {
                Value::Object(members.into_iter().collect::<Map<String, Value>>())
            }),
        ]
    })
}

fn arb_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::all().to_vec())
}

fn arb_type() -> impl Strategy<Value = InstanceType> {
    prop::sample::select(InstanceType::all().to_vec())
}

/// Three sibling subschemas in one document, so equal content lives at
/// different locations.
fn siblings(a: &Value, b: &Value, c: &Value) -> (SchemaTree, SchemaTree, SchemaTree) {
    let root = SchemaTree::anonymous(json!({"a": a, "b": b, "c": c}));
    (root.navigate("a"), root.navigate("b"), root.navigate("c"))
}

proptest! {
    #[test]
    fn prop_equivalence_is_reflexive(v in arb_json()) {
        let (a, b, _) = siblings(&v, &v, &Value::Null);
        prop_assert!(tree_equivalent(&a, &a));
        prop_assert!(tree_equivalent(&a, &b));
        prop_assert_eq!(tree_hash(&a), tree_hash(&b));
    }

    #[test]
    fn prop_equivalence_is_symmetric(x in arb_json(), y in arb_json()) {
        let (a, b, _) = siblings(&x, &y, &Value::Null);
        prop_assert_eq!(tree_equivalent(&a, &b), tree_equivalent(&b, &a));
    }

    #[test]
    fn prop_equivalence_is_transitive(x in arb_json(), y in arb_json(), z in arb_json()) {
        let (a, b, c) = siblings(&x, &y, &z);
        if tree_equivalent(&a, &b) && tree_equivalent(&b, &c) {
            prop_assert!(tree_equivalent(&a, &c));
        }
    }

    #[test]
    fn prop_equivalent_implies_equal_hash(x in arb_json(), y in arb_json()) {
        let (a, b, _) = siblings(&x, &y, &Value::Null);
        if tree_equivalent(&a, &b) {
            prop_assert_eq!(tree_hash(&a), tree_hash(&b));
        }
    }

    #[test]
    fn prop_context_equality_consistent_with_hash(
        x in arb_json(),
        y in arb_json(),
        t1 in arb_type(),
        t2 in arb_type(),
    ) {
        let (a, b, _) = siblings(&x, &y, &Value::Null);
        let ca = SchemaContext::new(&a, t1);
        let cb = SchemaContext::new(&b, t2);
        prop_assert_eq!(ca == cb, tree_equivalent(&a, &b) && t1 == t2);
        if ca == cb {
            prop_assert_eq!(ca.structural_hash(), cb.structural_hash());
        }
    }

    #[test]
    fn prop_log_level_filter(filter in arb_level(), levels in prop::collection::vec(arb_level(), 0..20)) {
        let mut report = ProcessingReport::with_levels(filter, LogLevel::Fatal);
        for level in &levels {
            let _ = report.log(*level, ProcessingMessage::default());
        }
        let expected: Vec<LogLevel> = levels.iter().copied().filter(|l| *l >= filter).collect();
        let stored: Vec<LogLevel> = report.iter().map(ProcessingMessage::level).collect();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_success_iff_nothing_at_error(levels in prop::collection::vec(arb_level(), 0..20)) {
        let mut report = ProcessingReport::new();
        for level in &levels {
            let _ = report.log(*level, ProcessingMessage::default());
        }
        let expected = levels.iter().all(|l| *l < LogLevel::Error);
        prop_assert_eq!(report.is_success(), expected);
    }
}
