//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Label codec round-trips
//! - Inheritance never overwriting child values
//! - Inheritance filling every gap from the parent
//! - Inheritance idempotence

use crate::inheritance;
use crate::labels::{FlatLabels, decode, encode};
use crate::plugins::PluginSet;
use crate::test_support::{catalog, config, env, seg, taxonomy};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// Label keys: plain, or namespaced with exactly one slash.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z][a-z0-9_-]{0,11}").expect("regex"),
        prop::string::string_regex("[a-z]{1,8}/[a-z][a-z0-9_-]{0,11}").expect("regex"),
    ]
}

/// Label values may contain colons and slashes.
fn arb_value() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 :/._-]{0,24}").expect("regex")
}

/// Inner keys of the classification namespace.
fn arb_classification_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(
        prop::string::string_regex("[a-z]{1,10}").expect("regex"),
        prop::string::string_regex("[a-z]{1,10}").expect("regex"),
        0..6,
    )
}

fn as_labels(map: &BTreeMap<String, String>) -> Vec<String> {
    map.iter()
        .map(|(k, v)| format!("classification/{k}:{v}"))
        .collect()
}

// ============================================================================
// Codec
// ============================================================================

proptest! {
    #[test]
    fn decode_encode_preserves_flat_map(
        pairs in prop::collection::vec((arb_key(), arb_value()), 0..12)
    ) {
        let raw: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}:{v}")).collect();
        let (flat, namespaced) = decode(&raw).expect("well-formed labels decode");

        let expected: FlatLabels = pairs.iter().cloned().collect();
        prop_assert_eq!(&flat, &expected);

        let (again, again_ns) = decode(&encode(&flat)).expect("re-decode");
        prop_assert_eq!(again, flat);
        prop_assert_eq!(again_ns, namespaced);
    }
}

// ============================================================================
// Inheritance
// ============================================================================

proptest! {
    #[test]
    fn inheritance_never_overwrites_and_fills_every_gap(
        parent in arb_classification_map(),
        child in arb_classification_map(),
    ) {
        let mut t = taxonomy(
            vec![env("prod", &as_labels(&parent))],
            vec![seg("app", &["prod"], &as_labels(&child))],
            catalog(&[]),
        );
        let set = PluginSet::from_config(&config(), &t.compliance_catalog);
        inheritance::resolve(&mut t, &set);

        let app = &t.segments["app"];
        for (key, value) in &child {
            prop_assert_eq!(app.labels.get_in("classification", key), Some(value.as_str()));
        }
        for (key, value) in parent.iter().filter(|(k, _)| !child.contains_key(*k)) {
            prop_assert_eq!(app.labels.get_in("classification", key), Some(value.as_str()));
            prop_assert_eq!(
                app.inherited.get(&format!("classification/{key}")).map(String::as_str),
                Some("prod")
            );
        }
    }

    #[test]
    fn inheritance_is_idempotent(
        first in arb_classification_map(),
        second in arb_classification_map(),
        child in arb_classification_map(),
    ) {
        let mut t = taxonomy(
            vec![env("prod", &as_labels(&first)), env("dev", &as_labels(&second))],
            vec![seg("app", &["prod", "dev"], &as_labels(&child))],
            catalog(&[]),
        );
        let set = PluginSet::from_config(&config(), &t.compliance_catalog);
        inheritance::resolve(&mut t, &set);
        let once = t.clone();

        let again = inheritance::resolve(&mut t, &set);
        prop_assert_eq!(&t, &once);
        prop_assert_eq!(again.labels_inherited, 0);
    }
}
