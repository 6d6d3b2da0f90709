//! Property tests for the schema registry.
//!
//! For any sequence of register/unregister calls, the composite decoder
//! must accept exactly the currently registered key set plus the reserved
//! `Action` key, regardless of when snapshots are taken along the way.

#![forbid(unsafe_code)]

use std::collections::HashMap;

use proptest::prelude::*;

use remui_events::{KeyedSchema, ParamKind, SchemaRegistry};

const KEYS: [&str; 5] = ["a", "b", "c", "d", "e"];

#[derive(Debug, Clone)]
enum Op {
    Register(String, ParamKind),
    Unregister(String),
    /// Take a composite snapshot mid-sequence (exercises lazy rebuild).
    Snapshot,
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(KEYS.to_vec()).prop_map(String::from)
}

fn kind_strategy() -> impl Strategy<Value = ParamKind> {
    prop_oneof![
        Just(ParamKind::Str),
        Just(ParamKind::Int),
        Just(ParamKind::Float),
        Just(ParamKind::Bool),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key_strategy(), kind_strategy()).prop_map(|(k, kind)| Op::Register(k, kind)),
        3 => key_strategy().prop_map(Op::Unregister),
        1 => Just(Op::Snapshot),
    ]
}

fn assert_matches_model(
    registry: &SchemaRegistry,
    model: &HashMap<String, ParamKind>,
) -> Result<(), proptest::test_runner::TestCaseError> {
    let composite = registry.composite();
    prop_assert!(composite.accepts("Action"), "Action must always decode");
    for key in KEYS {
        prop_assert_eq!(
            composite.accepts(key),
            model.contains_key(key),
            "key {} live-set mismatch",
            key
        );
    }
    prop_assert_eq!(composite.key_count(), model.len() + 1);
    Ok(())
}

proptest! {
    #[test]
    fn composite_tracks_live_key_set(ops in prop::collection::vec(op_strategy(), 0..48)) {
        let registry = SchemaRegistry::new();
        let mut model: HashMap<String, ParamKind> = HashMap::new();

        for op in &ops {
            match op {
                Op::Register(key, kind) => {
                    registry.register(KeyedSchema::new(key.clone(), *kind));
                    model.insert(key.clone(), *kind);
                }
                Op::Unregister(key) => {
                    registry.unregister(key);
                    model.remove(key);
                }
                Op::Snapshot => assert_matches_model(&registry, &model)?,
            }
        }
        assert_matches_model(&registry, &model)?;
    }

    #[test]
    fn decode_never_yields_unregistered_keys(ops in prop::collection::vec(op_strategy(), 0..32)) {
        let registry = SchemaRegistry::new();
        let mut model: HashMap<String, ParamKind> = HashMap::new();
        for op in &ops {
            match op {
                Op::Register(key, kind) => {
                    registry.register(KeyedSchema::new(key.clone(), *kind));
                    model.insert(key.clone(), *kind);
                }
                Op::Unregister(key) => {
                    registry.unregister(key);
                    model.remove(key);
                }
                Op::Snapshot => {}
            }
        }

        // A payload carrying every key as a string decodes only the live
        // string-typed keys; any non-string registered kind must fail.
        let payload = r#"{"Action":"x","a":"v","b":"v","c":"v","d":"v","e":"v"}"#;
        let all_strings = model.values().all(|kind| *kind == ParamKind::Str);
        match registry.composite().decode(payload) {
            Ok(bag) => {
                prop_assert!(all_strings);
                for key in KEYS {
                    prop_assert_eq!(bag.has(key), model.contains_key(key));
                }
            }
            Err(_) => prop_assert!(!all_strings),
        }
    }
}
