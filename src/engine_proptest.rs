//! Property-based tests for the merge engine.
//!
//! These tests use proptest to generate random resource layouts and verify
//! that membership, ordering and collision rules hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use proptest::prelude::*;
    use tempfile::TempDir;

    use crate::engine::{merge, MergeOptions, Merger};
    use crate::resolve::Resolution;

    fn state_json(resources: &[(String, String)], tag: &str) -> String {
        let blocks: Vec<String> = resources
            .iter()
            .map(|(module, name)| {
                format!(
                    r#"{{"module":"{}","mode":"managed","type":"null_resource","name":"{}","provider":"provider[\"registry.terraform.io/hashicorp/null\"]","instances":[{{"attributes":{{"tag":"{}"}}}}]}}"#,
                    module, name, tag
                )
            })
            .collect();
        format!(r#"{{"version":4,"serial":1,"resources":[{}]}}"#, blocks.join(","))
    }

    fn write(dir: &TempDir, file: &str, resources: &[(String, String)], tag: &str) -> PathBuf {
        let path = dir.path().join(file);
        std::fs::write(&path, state_json(resources, tag)).unwrap();
        path
    }

    fn addresses(resources: &[crate::state::StateResource]) -> Vec<String> {
        resources.iter().map(|r| r.address()).collect()
    }

    fn module_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("module.a".to_string()),
            Just("module.a.module.b".to_string()),
            Just("module.c".to_string()),
        ]
    }

    fn layout(prefix: &'static str) -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::btree_set((module_strategy(), "[a-z]{1,6}"), 0..12).prop_map(
            move |set| {
                set.into_iter()
                    .map(|(module, name)| (module, format!("{}_{}", prefix, name)))
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: merging disjoint documents yields the union regardless of order
        #[test]
        fn disjoint_merge_is_order_independent(left in layout("l"), right in layout("r")) {
            let dir = TempDir::new().unwrap();
            let a = write(&dir, "a.tfstate", &left, "a");
            let b = write(&dir, "b.tfstate", &right, "b");

            let ab = merge(b"", Resolution::Unset, &[&a, &b]).unwrap();
            let ba = merge(b"", Resolution::Unset, &[&b, &a]).unwrap();

            let ab_set: BTreeSet<String> = addresses(&ab.document.resources).into_iter().collect();
            let ba_set: BTreeSet<String> = addresses(&ba.document.resources).into_iter().collect();
            prop_assert_eq!(&ab_set, &ba_set);
            prop_assert_eq!(ab_set.len(), left.len() + right.len());
            prop_assert!(ab.errors.is_empty());
        }

        /// Property: a single document merges to exactly its own resource set
        #[test]
        fn single_document_is_reproduced(resources in layout("x")) {
            let dir = TempDir::new().unwrap();
            let a = write(&dir, "a.tfstate", &resources, "only");

            let output = merge(b"", Resolution::Unset, &[&a]).unwrap();
            let merged: BTreeSet<String> = addresses(&output.document.resources).into_iter().collect();
            let expected: BTreeSet<String> = resources
                .iter()
                .map(|(module, name)| crate::state::resource_address(module, "managed", "null_resource", name))
                .collect();
            prop_assert_eq!(merged, expected);
            prop_assert_eq!(output.document.serial, 1);
        }

        /// Property: no policy ever emits the same address twice
        #[test]
        fn addresses_stay_unique(
            left in layout("s"),
            right in layout("s"),
            policy in prop_oneof![
                Just(Resolution::Unset),
                Just(Resolution::Overwrite),
                Just(Resolution::Skip),
                Just(Resolution::Merge),
            ],
            strict in any::<bool>(),
        ) {
            let dir = TempDir::new().unwrap();
            let a = write(&dir, "a.tfstate", &left, "a");
            let b = write(&dir, "b.tfstate", &right, "b");

            let output = Merger::default()
                .with_options(MergeOptions { resolution: policy, strict, lineage: None })
                .merge(b"", &[&a, &b])
                .unwrap();

            let all = addresses(&output.document.resources);
            let unique: BTreeSet<&String> = all.iter().collect();
            prop_assert_eq!(all.len(), unique.len());
        }

        /// Property: skip keeps the first contributor, overwrite keeps the last
        #[test]
        fn skip_keeps_first_and_overwrite_keeps_last(shared in layout("c")) {
            prop_assume!(!shared.is_empty());
            let dir = TempDir::new().unwrap();
            let a = write(&dir, "a.tfstate", &shared, "first");
            let b = write(&dir, "b.tfstate", &shared, "last");

            let skipped = merge(b"", Resolution::Skip, &[&a, &b]).unwrap();
            let overwritten = merge(b"", Resolution::Overwrite, &[&a, &b]).unwrap();

            prop_assert_eq!(skipped.document.resources.len(), shared.len());
            prop_assert_eq!(overwritten.document.resources.len(), shared.len());
            for resource in &skipped.document.resources {
                prop_assert!(resource.instances[0].get().contains("first"));
            }
            for resource in &overwritten.document.resources {
                prop_assert!(resource.instances[0].get().contains("last"));
            }
        }
    }
}
