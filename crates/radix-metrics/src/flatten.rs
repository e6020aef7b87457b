//! JSON flattening and the denylist filter.
//!
//! A nested document becomes a single-level map keyed by the path from the
//! root to each scalar leaf. Object keys are used verbatim, array elements by
//! their index, and segments are joined with [`SEPARATOR`]. The root prefix is
//! glued directly onto the first segment, so
//! `flatten(&json!({"info": {"epoch": 3}}), "radix_")` yields
//! `radix_info_epoch`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{HarvestError, Result};

/// Separator placed between path segments.
pub const SEPARATOR: char = '_';

/// Flattened document: metric-style name to scalar leaf value.
pub type FlatMap = BTreeMap<String, Value>;

/// Flattens an object or array into a map of scalar leaves.
///
/// Empty objects and arrays contribute no entries.
///
/// # Errors
///
/// Returns `HarvestError::Flatten` if `document` is a scalar, and
/// `HarvestError::NameCollision` if two leaves map to the same name (keys that
/// themselves contain the separator can alias a nested path).
pub fn flatten(document: &Value, prefix: &str) -> Result<FlatMap> {
    let mut out = FlatMap::new();
    match document {
        Value::Object(_) | Value::Array(_) => {
            flatten_into(&mut out, document, prefix, true)?;
            Ok(out)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Err(HarvestError::Flatten {
                reason: format!("root must be an object or array, found {}", kind(document)),
            })
        }
    }
}

fn flatten_into(out: &mut FlatMap, value: &Value, path: &str, top: bool) -> Result<()> {
    let key = |segment: &str| {
        if top {
            format!("{path}{segment}")
        } else {
            format!("{path}{SEPARATOR}{segment}")
        }
    };

    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(out, v, &key(k), false)?;
            }
        }
        Value::Array(items) => {
            for (idx, v) in items.iter().enumerate() {
                flatten_into(out, v, &key(&idx.to_string()), false)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            if out.insert(path.to_string(), value.clone()).is_some() {
                return Err(HarvestError::NameCollision {
                    name: path.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Human-readable name of a JSON value's variant.
pub(crate) const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A fixed set of flattened names that must never become metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denylist(&'static [&'static str]);

impl Denylist {
    /// Names dropped from the `/system/info` document.
    ///
    /// Version and agent strings are free text; the pacemaker knobs are static
    /// configuration rather than live measurements.
    pub const SYSTEM_INFO: Self = Self(&[
        "radix_info_system_version_system_version_agent_version",
        "radix_info_system_version_system_version_protocol_version",
        "radix_agent_protocol",
        "radix_agent_version",
        "radix_info_configuration_pacemakerRate",
        "radix_info_configuration_pacemakerTimeout",
        "radix_info_configuration_pacemakerMaxExponent",
    ]);

    /// Removes every denied name from `flat`. Absent names are ignored.
    pub fn apply(&self, flat: &mut FlatMap) {
        for name in self.0 {
            if flat.remove(*name).is_some() {
                tracing::trace!(name = *name, "dropped denylisted field");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    mod flatten_tests {
        use super::*;

        #[test]
        fn prefix_joins_top_level_key_directly() {
            let flat = flatten(&json!({"info": {"epoch": 3}}), "radix_").unwrap();
            assert_eq!(flat.len(), 1);
            assert_eq!(flat["radix_info_epoch"], json!(3));
        }

        #[test]
        fn array_elements_use_index() {
            let doc = json!({"peers": [{"port": 30000}, {"port": 30001}]});
            let flat = flatten(&doc, "radix_").unwrap();
            assert_eq!(flat["radix_peers_0_port"], json!(30000));
            assert_eq!(flat["radix_peers_1_port"], json!(30001));
        }

        #[test]
        fn top_level_array_is_flattened() {
            let flat = flatten(&json!([1, "two", null]), "radix_").unwrap();
            assert_eq!(flat["radix_0"], json!(1));
            assert_eq!(flat["radix_1"], json!("two"));
            assert_eq!(flat["radix_2"], Value::Null);
        }

        #[test]
        fn key_case_is_preserved() {
            let doc = json!({"info": {"configuration": {"pacemakerRate": 2.0}}});
            let flat = flatten(&doc, "radix_").unwrap();
            assert!(flat.contains_key("radix_info_configuration_pacemakerRate"));
        }

        #[test]
        fn empty_containers_produce_nothing() {
            let doc = json!({"a": {}, "b": [], "c": {"d": []}});
            let flat = flatten(&doc, "radix_").unwrap();
            assert!(flat.is_empty());
        }

        #[test]
        fn scalar_leaves_keep_their_type() {
            let doc = json!({"s": "x", "b": true, "n": null, "f": 1.5});
            let flat = flatten(&doc, "").unwrap();
            assert_eq!(flat["s"], json!("x"));
            assert_eq!(flat["b"], json!(true));
            assert_eq!(flat["n"], Value::Null);
            assert_eq!(flat["f"], json!(1.5));
        }

        #[test]
        fn scalar_root_is_rejected() {
            for doc in [json!(1), json!("x"), json!(true), Value::Null] {
                let err = flatten(&doc, "radix_").unwrap_err();
                assert!(matches!(err, HarvestError::Flatten { .. }));
            }
        }

        #[test]
        fn aliased_paths_collide() {
            let doc = json!({"a_b": 1, "a": {"b": 2}});
            let err = flatten(&doc, "radix_").unwrap_err();
            assert!(matches!(err, HarvestError::NameCollision { ref name } if name == "radix_a_b"));
        }

        #[test]
        fn flattening_is_deterministic() {
            let doc = json!({"z": 1, "a": {"y": [1, 2], "b": 3}});
            let first: Vec<_> = flatten(&doc, "radix_").unwrap().into_keys().collect();
            let second: Vec<_> = flatten(&doc, "radix_").unwrap().into_keys().collect();
            assert_eq!(first, second);
        }
    }

    mod denylist_tests {
        use super::*;

        #[test]
        fn removes_present_names() {
            let doc = json!({
                "agent": {"version": 1, "protocol": 2},
                "info": {"configuration": {"pacemakerRate": 2.0, "pacemakerTimeout": 3000}},
                "epoch": 5
            });
            let mut flat = flatten(&doc, "radix_").unwrap();
            Denylist::SYSTEM_INFO.apply(&mut flat);

            assert_eq!(flat.len(), 1);
            assert!(flat.contains_key("radix_epoch"));
        }

        #[test]
        fn absent_names_are_ignored() {
            let mut flat = flatten(&json!({"epoch": 5}), "radix_").unwrap();
            Denylist::SYSTEM_INFO.apply(&mut flat);
            assert_eq!(flat.len(), 1);
        }
    }

    fn arb_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::String),
        ]
    }

    fn arb_document() -> impl Strategy<Value = Value> {
        arb_leaf().prop_recursive(4, 64, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn count_leaves(value: &Value) -> usize {
        match value {
            Value::Object(map) => map.values().map(count_leaves).sum(),
            Value::Array(items) => items.iter().map(count_leaves).sum(),
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => 1,
        }
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_leaf(
            entries in proptest::collection::btree_map("[a-z]{1,4}", arb_document(), 0..6),
        ) {
            // Generated keys never contain the separator, so paths cannot alias.
            let doc = Value::Object(entries.into_iter().collect());
            let flat = flatten(&doc, "radix_").unwrap();
            prop_assert_eq!(flat.len(), count_leaves(&doc));
        }

        #[test]
        fn prop_denylisted_names_absent(
            present in proptest::collection::vec(any::<bool>(), 7),
            value in any::<i64>(),
        ) {
            let mut flat = FlatMap::new();
            for (name, keep) in Denylist::SYSTEM_INFO.0.iter().zip(&present) {
                if *keep {
                    flat.insert((*name).to_string(), Value::from(value));
                }
            }
            flat.insert("radix_epoch".to_string(), Value::from(value));

            Denylist::SYSTEM_INFO.apply(&mut flat);

            for name in Denylist::SYSTEM_INFO.0 {
                prop_assert!(!flat.contains_key(*name));
            }
            prop_assert!(flat.contains_key("radix_epoch"));
        }
    }
}
