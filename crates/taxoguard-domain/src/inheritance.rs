//! Parent-to-child attribute resolution for level-"2" segments.
//!
//! For each segment and each declared parent (in declaration order) the engine makes sure an
//! override exists, fills in the override's compliance list from the parent, resolves it
//! against the catalog, gap-fills labels of inheriting plugins and collects relationship
//! problems. Nothing here rejects a record: unknown parents and unknown compliance IDs are
//! left for [`crate::xref`].

use crate::model::{Override, Segment, Taxonomy};
use crate::plugins::PluginSet;
use crate::problem::Problem;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InheritanceOutcome {
    pub problems: Vec<Problem>,
    /// Labels appended to children across all segments.
    pub labels_inherited: usize,
    /// Empty overrides created for parents that had none.
    pub overrides_synthesized: usize,
}

/// Resolve every segment against every parent. Running it again on the result changes
/// nothing further (relationship problems are reported again).
pub fn resolve(taxonomy: &mut Taxonomy, plugins: &PluginSet) -> InheritanceOutcome {
    let Taxonomy {
        environments,
        segments,
        compliance_catalog,
        ..
    } = taxonomy;

    let mut outcome = InheritanceOutcome::default();

    for child in segments.values_mut() {
        for parent_id in child.parents.clone() {
            if !child.overrides.contains_key(&parent_id) {
                child
                    .overrides
                    .insert(parent_id.clone(), Override::default());
                outcome.overrides_synthesized += 1;
            }

            let Some(parent) = environments.get(&parent_id) else {
                debug!(segment = %child.id, parent = %parent_id, "parent is not an environment; skipping");
                continue;
            };

            if let Some(ov) = child.overrides.get_mut(&parent_id) {
                if ov.compliance.is_none() {
                    ov.compliance = Some(parent.compliance.clone());
                    ov.compliance_inherited = true;
                }
                ov.resolved_compliance = ov
                    .compliance
                    .iter()
                    .flatten()
                    .filter_map(|id| {
                        compliance_catalog
                            .get(id)
                            .map(|req| (id.clone(), req.clone()))
                    })
                    .collect();
            }

            for plugin in plugins.enabled().filter(|p| p.inherits_labels()) {
                outcome.labels_inherited += inherit_namespace(parent, child, plugin.namespace());
            }

            for plugin in plugins.enabled().filter(|p| p.validates_relationships()) {
                outcome
                    .problems
                    .extend(plugin.validate_relationship(parent, child));
            }
        }
    }

    debug!(
        labels_inherited = outcome.labels_inherited,
        overrides_synthesized = outcome.overrides_synthesized,
        problems = outcome.problems.len(),
        "inheritance resolved"
    );
    outcome
}

/// Copy every parent label in `namespace` the child does not carry. Returns how many were added.
fn inherit_namespace(parent: &Segment, child: &mut Segment, namespace: &str) -> usize {
    let Some(parent_labels) = parent.labels.namespace(namespace) else {
        return 0;
    };

    let mut added = 0;
    for (key, value) in parent_labels {
        if child.labels.get_in(namespace, key).is_some() {
            continue;
        }
        child.labels.append(namespace, key, value);
        child
            .inherited
            .insert(format!("{namespace}/{key}"), parent.id.clone());
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, config, env, seg, taxonomy};

    fn plugins(t: &Taxonomy) -> PluginSet {
        PluginSet::from_config(&config(), &t.compliance_catalog)
    }

    #[test]
    fn child_inherits_missing_sensitivity() {
        let mut t = taxonomy(
            vec![env("prod", &["classification/sensitivity:high"])],
            vec![seg("app", &["prod"], &[] as &[&str])],
            catalog(&[]),
        );
        let set = plugins(&t);
        let outcome = resolve(&mut t, &set);

        let app = &t.segments["app"];
        assert_eq!(app.labels.get_in("classification", "sensitivity"), Some("high"));
        assert_eq!(app.labels.get("classification/sensitivity"), Some("high"));
        assert_eq!(app.inherited["classification/sensitivity"], "prod");
        assert_eq!(outcome.labels_inherited, 1);
    }

    #[test]
    fn child_value_is_never_overwritten() {
        let mut t = taxonomy(
            vec![env("prod", &["classification/sensitivity:high"])],
            vec![seg("app", &["prod"], &["classification/sensitivity:low"])],
            catalog(&[]),
        );
        let set = plugins(&t);
        resolve(&mut t, &set);

        let app = &t.segments["app"];
        assert_eq!(app.labels.get_in("classification", "sensitivity"), Some("low"));
        assert!(app.inherited.is_empty());
    }

    #[test]
    fn first_parent_fills_the_gap() {
        let mut t = taxonomy(
            vec![
                env("prod", &["classification/criticality:high"]),
                env("staging", &["classification/criticality:low"]),
            ],
            vec![seg("app", &["staging", "prod"], &[] as &[&str])],
            catalog(&[]),
        );
        let set = plugins(&t);
        resolve(&mut t, &set);
        assert_eq!(
            t.segments["app"].labels.get_in("classification", "criticality"),
            Some("low")
        );
    }

    #[test]
    fn compliance_namespace_is_not_inherited() {
        let mut t = taxonomy(
            vec![env(
                "prod",
                &["compliance/sox:in-scope", "compliance/sox_rationale:Financial ledger"],
            )],
            vec![seg("app", &["prod"], &[] as &[&str])],
            catalog(&["sox"]),
        );
        let set = plugins(&t);
        resolve(&mut t, &set);
        assert_eq!(t.segments["app"].labels.namespace("compliance"), None);
    }

    #[test]
    fn override_compliance_is_copied_and_resolved() {
        let mut prod = env("prod", &[] as &[&str]);
        prod.compliance = vec!["pci-dss".to_string(), "gdpr".to_string()];
        let mut t = taxonomy(
            vec![prod],
            vec![seg("app", &["prod"], &[] as &[&str])],
            catalog(&["pci-dss", "sox"]),
        );
        let set = plugins(&t);
        let outcome = resolve(&mut t, &set);

        let ov = &t.segments["app"].overrides["prod"];
        assert_eq!(
            ov.compliance.as_deref(),
            Some(&["pci-dss".to_string(), "gdpr".to_string()][..])
        );
        assert!(ov.compliance_inherited);
        assert_eq!(ov.resolved_compliance.keys().collect::<Vec<_>>(), vec!["pci-dss"]);
        assert_eq!(outcome.overrides_synthesized, 1);
    }

    #[test]
    fn declared_override_compliance_is_kept() {
        let mut prod = env("prod", &[] as &[&str]);
        prod.compliance = vec!["pci-dss".to_string()];
        let mut app = seg("app", &["prod"], &[] as &[&str]);
        app.overrides.insert(
            "prod".to_string(),
            Override {
                compliance: Some(vec!["sox".to_string()]),
                ..Override::default()
            },
        );
        let mut t = taxonomy(vec![prod], vec![app], catalog(&["pci-dss", "sox"]));
        let set = plugins(&t);
        let outcome = resolve(&mut t, &set);

        let ov = &t.segments["app"].overrides["prod"];
        assert!(!ov.compliance_inherited);
        assert_eq!(ov.resolved_compliance.keys().collect::<Vec<_>>(), vec!["sox"]);
        assert_eq!(outcome.overrides_synthesized, 0);
    }

    #[test]
    fn unknown_parent_gets_an_empty_override_and_nothing_else() {
        let mut t = taxonomy(
            vec![env("prod", &["classification/sensitivity:high"])],
            vec![seg("app", &["ghost"], &[] as &[&str])],
            catalog(&[]),
        );
        let set = plugins(&t);
        let outcome = resolve(&mut t, &set);

        let app = &t.segments["app"];
        assert_eq!(app.overrides["ghost"], Override::default());
        assert!(app.labels.is_empty());
        assert!(outcome.problems.is_empty());
    }

    #[test]
    fn relationship_problems_are_collected() {
        let mut t = taxonomy(
            vec![env("prod", &[] as &[&str]), env("dev", &[] as &[&str])],
            vec![seg(
                "app",
                &["prod", "dev"],
                &["compliance/pci-dss:in-scope", "compliance/pci-dss_rationale:Card data flows"],
            )],
            catalog(&["pci-dss"]),
        );
        let set = plugins(&t);
        let outcome = resolve(&mut t, &set);
        let parents: Vec<_> = outcome
            .problems
            .iter()
            .filter_map(|p| p.subject.as_ref().and_then(|s| s.parent.clone()))
            .collect();
        assert_eq!(parents, vec!["prod".to_string(), "dev".to_string()]);
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut prod = env("prod", &crate::test_support::classified("high", "high"));
        prod.compliance = vec!["sox".to_string()];
        let mut t = taxonomy(
            vec![prod],
            vec![seg("app", &["prod"], &["classification/criticality:low"])],
            catalog(&["sox"]),
        );
        let set = plugins(&t);
        resolve(&mut t, &set);
        let once = t.clone();
        let again = resolve(&mut t, &set);

        assert_eq!(t, once);
        assert_eq!(again.labels_inherited, 0);
        assert_eq!(again.overrides_synthesized, 0);
    }
}
