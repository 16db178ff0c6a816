use super::{LabelValidation, Plugin, text_len};
use crate::model::Segment;
use crate::policy::CompliancePolicy;
use crate::problem::Problem;
use serde_json::json;
use std::collections::BTreeMap;
use taxoguard_types::ids;

pub const IN_SCOPE: &str = "in-scope";
pub const OUT_OF_SCOPE: &str = "out-of-scope";

/// Opt-in compliance scope labels, plus the parent/child scope hierarchy.
#[derive(Clone, Debug)]
pub struct CompliancePlugin {
    policy: CompliancePolicy,
}

impl CompliancePlugin {
    pub fn new(policy: CompliancePolicy) -> Self {
        Self { policy }
    }

    /// Check one namespace map: the segment's own labels (`parent == None`) or one override's.
    fn validate_scope_labels(
        &self,
        segment: &Segment,
        parent: Option<&str>,
        labels: Option<&BTreeMap<String, String>>,
        out: &mut Vec<Problem>,
    ) {
        let lookup = |key: &str| labels.and_then(|m| m.get(key)).map(String::as_str);
        let whose = match parent {
            Some(p) => format!("'{}' (override for '{p}')", segment.id),
            None => format!("'{}'", segment.id),
        };

        for requirement in &self.policy.requirements {
            let rationale_key = format!("{requirement}_rationale");
            let problem = |code: &'static str, message: String| {
                Problem::new(self.check_id(), code, message)
                    .about(segment.subject_kind(), &segment.id)
                    .under(parent)
            };

            match (lookup(requirement), lookup(&rationale_key)) {
                (None, None) => {}
                (Some(scope), None) => out.push(
                    problem(
                        ids::CODE_SCOPE_WITHOUT_RATIONALE,
                        format!("{whose} declares {requirement} '{scope}' without a rationale"),
                    )
                    .help("Add the paired `<requirement>_rationale` label.")
                    .data(json!({ "requirement": requirement, "scope": scope })),
                ),
                (None, Some(_)) => out.push(
                    problem(
                        ids::CODE_RATIONALE_WITHOUT_SCOPE,
                        format!("{whose} has a {requirement} rationale but no scope"),
                    )
                    .help("Add the scope label or drop the rationale.")
                    .data(json!({ "requirement": requirement })),
                ),
                (Some(scope), Some(rationale)) => {
                    if scope != IN_SCOPE && scope != OUT_OF_SCOPE {
                        out.push(
                            problem(
                                ids::CODE_INVALID_SCOPE,
                                format!(
                                    "{whose} has {requirement} scope '{scope}', expected '{IN_SCOPE}' or '{OUT_OF_SCOPE}'"
                                ),
                            )
                            .data(json!({ "requirement": requirement, "scope": scope })),
                        );
                    }
                    let len = text_len(rationale);
                    if len < self.policy.min_rationale_length {
                        out.push(
                            problem(
                                ids::CODE_RATIONALE_TOO_SHORT,
                                format!(
                                    "{whose} {requirement} rationale is {len} characters, minimum is {}",
                                    self.policy.min_rationale_length
                                ),
                            )
                            .data(json!({
                                "requirement": requirement,
                                "length": len,
                                "minimum": self.policy.min_rationale_length,
                            })),
                        );
                    }
                }
            }
        }
    }
}

impl Plugin for CompliancePlugin {
    fn name(&self) -> &'static str {
        ids::PLUGIN_COMPLIANCE
    }

    fn namespace(&self) -> &str {
        &self.policy.namespace
    }

    fn is_enabled(&self) -> bool {
        self.policy.enabled
    }

    fn validate_labels(&self, segment: &Segment) -> LabelValidation {
        let ns = &self.policy.namespace;
        let mut problems = Vec::new();
        self.validate_scope_labels(segment, None, segment.labels.namespace(ns), &mut problems);
        for (parent, ov) in &segment.overrides {
            self.validate_scope_labels(
                segment,
                Some(parent.as_str()),
                ov.labels.namespace(ns),
                &mut problems,
            );
        }
        LabelValidation { problems }
    }

    fn validates_relationships(&self) -> bool {
        self.policy.enforce_hierarchy
    }

    fn validate_relationship(&self, parent: &Segment, child: &Segment) -> Vec<Problem> {
        if !self.policy.enforce_hierarchy {
            return Vec::new();
        }
        let ns = &self.policy.namespace;
        let override_labels = child.overrides.get(&parent.id).map(|ov| &ov.labels);

        let mut out = Vec::new();
        for requirement in &self.policy.requirements {
            let effective = override_labels
                .and_then(|labels| labels.get_in(ns, requirement))
                .or_else(|| child.labels.get_in(ns, requirement));
            if effective != Some(IN_SCOPE) {
                continue;
            }
            if parent.labels.get_in(ns, requirement).is_some() {
                continue;
            }
            out.push(
                Problem::new(
                    self.check_id(),
                    ids::CODE_SCOPE_NOT_DEFINED_BY_PARENT,
                    format!(
                        "'{}' is {IN_SCOPE} for {requirement} but parent '{}' does not define it",
                        child.id, parent.id
                    ),
                )
                .about(child.subject_kind(), &child.id)
                .under(Some(parent.id.as_str()))
                .help("Label the requirement on the parent environment or drop the claim.")
                .data(json!({ "requirement": requirement, "parent": parent.id })),
            );
        }
        out
    }
}
