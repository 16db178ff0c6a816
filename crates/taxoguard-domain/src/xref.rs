//! Cross-reference validation: compliance IDs must exist in the catalog and override keys
//! must name real environments.

use crate::model::Taxonomy;
use crate::problem::Problem;
use serde_json::json;
use taxoguard_types::{SubjectKind, ids};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrossReferenceReport {
    pub valid: bool,
    pub failures: usize,
    pub problems: Vec<Problem>,
}

pub fn validate(taxonomy: &Taxonomy) -> CrossReferenceReport {
    let catalog = &taxonomy.compliance_catalog;
    let mut problems = Vec::new();

    for env in taxonomy.environments.values() {
        for id in env.compliance.iter().filter(|id| !catalog.contains_key(*id)) {
            problems.push(
                Problem::new(
                    ids::CHECK_XREF_COMPLIANCE,
                    ids::CODE_UNKNOWN_COMPLIANCE_REFERENCE,
                    format!("environment '{}' references unknown compliance requirement '{id}'", env.id),
                )
                .about(SubjectKind::Environment, &env.id)
                .help("Add the requirement to compliance.yaml or fix the identifier.")
                .data(json!({ "requirement": id })),
            );
        }
    }

    for seg in taxonomy.segments.values() {
        for (parent, ov) in &seg.overrides {
            for id in ov
                .compliance
                .iter()
                .flatten()
                .filter(|id| !catalog.contains_key(*id))
            {
                problems.push(
                    Problem::new(
                        ids::CHECK_XREF_COMPLIANCE,
                        ids::CODE_UNKNOWN_COMPLIANCE_REFERENCE,
                        format!(
                            "segment '{}' (override for '{parent}') references unknown compliance requirement '{id}'",
                            seg.id
                        ),
                    )
                    .about(SubjectKind::Segment, &seg.id)
                    .under(Some(parent.as_str()))
                    .help("Add the requirement to compliance.yaml or fix the identifier.")
                    .data(json!({ "requirement": id, "inherited": ov.compliance_inherited })),
                );
            }

            if !taxonomy.environments.contains_key(parent) {
                problems.push(
                    Problem::new(
                        ids::CHECK_XREF_PARENT,
                        ids::CODE_UNKNOWN_PARENT_ENVIRONMENT,
                        format!("segment '{}' refers to unknown environment '{parent}'", seg.id),
                    )
                    .about(SubjectKind::Segment, &seg.id)
                    .under(Some(parent.as_str()))
                    .help("Declare the environment or remove it from `parents`.")
                    .data(json!({ "parent": parent })),
                );
            }
        }
    }

    let failures = problems.len();
    CrossReferenceReport {
        valid: failures == 0,
        failures,
        problems,
    }
}
