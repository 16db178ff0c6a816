use super::LogicRule;
use crate::model::{Segment, Taxonomy};
use crate::problem::Problem;
use serde_json::json;
use std::collections::BTreeSet;
use taxoguard_types::{SubjectKind, ids};

/// Identifier of the environment hosting services shared by every other environment.
pub const SHARED_SERVICE_ID: &str = "shared-service";

/// The shared-service environment must exist, carry the most severe sensitivity and
/// criticality, and be in scope for every catalogued compliance requirement.
#[derive(Clone, Debug)]
pub struct SharedServiceRule {
    namespace: String,
}

impl SharedServiceRule {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn check_maximal(
        &self,
        env: &Segment,
        dimension: &str,
        order: &[String],
        code: &'static str,
        out: &mut Vec<Problem>,
    ) {
        // No declared ordering, nothing to compare against.
        let Some(top) = order.first() else {
            return;
        };
        let actual = env.classification(&self.namespace, dimension);
        if actual == Some(top.as_str()) {
            return;
        }
        out.push(
            Problem::new(
                self.check_id(),
                code,
                format!(
                    "'{SHARED_SERVICE_ID}' has {dimension} '{}', expected '{top}'",
                    actual.unwrap_or("<unset>")
                ),
            )
            .about(SubjectKind::Environment, &env.id)
            .help("Shared services must be classified at the highest level.")
            .data(json!({ "dimension": dimension, "actual": actual, "expected": top })),
        );
    }
}

impl LogicRule for SharedServiceRule {
    fn name(&self) -> &'static str {
        ids::RULE_SHARED_SERVICE
    }

    fn evaluate(&self, taxonomy: &Taxonomy) -> Vec<Problem> {
        let Some(env) = taxonomy.environment(SHARED_SERVICE_ID) else {
            return vec![
                Problem::new(
                    self.check_id(),
                    ids::CODE_SHARED_SERVICE_NOT_FOUND,
                    format!("environment '{SHARED_SERVICE_ID}' is not defined"),
                )
                .help("Declare the shared-service environment or disable the rule."),
            ];
        };

        let mut out = Vec::new();
        self.check_maximal(
            env,
            "sensitivity",
            &taxonomy.sensitivity_order,
            ids::CODE_SENSITIVITY_NOT_MAXIMAL,
            &mut out,
        );
        self.check_maximal(
            env,
            "criticality",
            &taxonomy.criticality_order,
            ids::CODE_CRITICALITY_NOT_MAXIMAL,
            &mut out,
        );

        let declared: BTreeSet<&str> = env.compliance.iter().map(String::as_str).collect();
        let expected = taxonomy.compliance_catalog.len();
        if declared.len() != expected {
            let missing: Vec<&str> = taxonomy
                .compliance_catalog
                .keys()
                .map(String::as_str)
                .filter(|id| !declared.contains(id))
                .collect();
            out.push(
                Problem::new(
                    self.check_id(),
                    ids::CODE_INCOMPLETE_COMPLIANCE,
                    format!(
                        "'{SHARED_SERVICE_ID}' declares {} compliance requirements, catalog has {expected}",
                        declared.len()
                    ),
                )
                .about(SubjectKind::Environment, &env.id)
                .help("List every catalogued requirement on the shared-service environment.")
                .data(json!({
                    "declared": declared.len(),
                    "expected": expected,
                    "missing": missing,
                })),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, classified, env, taxonomy};

    fn shared(labels: &[String], compliance: &[&str]) -> Segment {
        let mut e = env(SHARED_SERVICE_ID, labels);
        e.compliance = compliance.iter().map(|c| c.to_string()).collect();
        e
    }

    fn codes(problems: &[Problem]) -> Vec<&'static str> {
        problems.iter().map(|p| p.code).collect()
    }

    #[test]
    fn missing_environment_short_circuits() {
        let t = taxonomy(vec![], vec![], catalog(&["sox"]));
        let problems = SharedServiceRule::new("classification").evaluate(&t);
        assert_eq!(codes(&problems), vec![ids::CODE_SHARED_SERVICE_NOT_FOUND]);
    }

    #[test]
    fn partial_compliance_is_the_only_error() {
        let t = taxonomy(
            vec![shared(&classified("high", "high"), &["pci-dss"])],
            vec![],
            catalog(&["pci-dss", "sox"]),
        );
        let problems = SharedServiceRule::new("classification").evaluate(&t);
        assert_eq!(codes(&problems), vec![ids::CODE_INCOMPLETE_COMPLIANCE]);
        assert_eq!(problems[0].data["missing"], json!(["sox"]));
    }

    #[test]
    fn each_condition_reports_independently() {
        let t = taxonomy(
            vec![shared(&classified("medium", "low"), &[])],
            vec![],
            catalog(&["pci-dss"]),
        );
        let problems = SharedServiceRule::new("classification").evaluate(&t);
        assert_eq!(
            codes(&problems),
            vec![
                ids::CODE_SENSITIVITY_NOT_MAXIMAL,
                ids::CODE_CRITICALITY_NOT_MAXIMAL,
                ids::CODE_INCOMPLETE_COMPLIANCE,
            ]
        );
    }

    #[test]
    fn legacy_fields_are_consulted() {
        let mut e = shared(&[], &["sox"]);
        e.sensitivity = Some("high".to_string());
        e.criticality = Some("high".to_string());
        let t = taxonomy(vec![e], vec![], catalog(&["sox"]));
        assert!(SharedServiceRule::new("classification").evaluate(&t).is_empty());
    }

    #[test]
    fn duplicate_references_count_once() {
        let t = taxonomy(
            vec![shared(&classified("high", "high"), &["sox", "sox"])],
            vec![],
            catalog(&["pci-dss", "sox"]),
        );
        let problems = SharedServiceRule::new("classification").evaluate(&t);
        assert_eq!(codes(&problems), vec![ids::CODE_INCOMPLETE_COMPLIANCE]);
    }
}
