//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after YAML examples.
    pub examples: ExamplePair,
}

/// Before and after document examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Document that would trigger a finding.
    pub before: &'static str,
    /// Document that passes the check.
    pub after: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    let exp = match identifier {
        // Check IDs
        ids::CHECK_LOAD_STRUCTURE => explain_load_structure(),
        ids::CHECK_PLUGIN_CLASSIFICATION => explain_classification(),
        ids::CHECK_PLUGIN_COMPLIANCE => explain_compliance(),
        ids::CHECK_XREF_COMPLIANCE => explain_xref_compliance(),
        ids::CHECK_XREF_PARENT => explain_xref_parent(),
        ids::CHECK_RULE_SHARED_SERVICE => explain_shared_service(),
        ids::CHECK_RULE_UNIQUENESS => explain_uniqueness(),

        // Codes: load.structure
        ids::CODE_MALFORMED_LABEL => titled(explain_load_structure(), "Malformed Label"),
        ids::CODE_LEVEL_MISMATCH => titled(explain_load_structure(), "Level Mismatch"),
        ids::CODE_MISSING_PARENTS => titled(explain_load_structure(), "Segment Without Parents"),
        ids::CODE_UNEXPECTED_PARENTS => {
            titled(explain_load_structure(), "Environment With Parents")
        }
        ids::CODE_OVERRIDE_PARENT_MISMATCH => {
            titled(explain_load_structure(), "Override For Undeclared Parent")
        }
        ids::CODE_SEGMENT_COMPLIANCE => {
            titled(explain_load_structure(), "Compliance Outside An Override")
        }
        ids::CODE_DUPLICATE_ID => titled(explain_load_structure(), "Duplicate Identifier"),

        // Codes: plugin.classification
        ids::CODE_MISSING_DIMENSION => {
            titled(explain_classification(), "Missing Classification Dimension")
        }
        ids::CODE_INVALID_VALUE => titled(explain_classification(), "Invalid Classification Value"),
        ids::CODE_MISSING_RATIONALE => {
            titled(explain_classification(), "Missing Classification Rationale")
        }
        ids::CODE_LABEL_COUNT_MISMATCH => {
            titled(explain_classification(), "Unexpected Classification Labels")
        }
        ids::CODE_RATIONALE_TOO_SHORT => titled(explain_classification(), "Rationale Too Short"),

        // Codes: plugin.compliance
        ids::CODE_SCOPE_WITHOUT_RATIONALE => {
            titled(explain_compliance(), "Compliance Scope Without Rationale")
        }
        ids::CODE_RATIONALE_WITHOUT_SCOPE => {
            titled(explain_compliance(), "Compliance Rationale Without Scope")
        }
        ids::CODE_INVALID_SCOPE => titled(explain_compliance(), "Invalid Compliance Scope"),
        ids::CODE_SCOPE_NOT_DEFINED_BY_PARENT => explain_scope_not_defined_by_parent(),

        // Codes: xref.*
        ids::CODE_UNKNOWN_COMPLIANCE_REFERENCE => {
            titled(explain_xref_compliance(), "Unknown Compliance Reference")
        }
        ids::CODE_UNKNOWN_PARENT_ENVIRONMENT => {
            titled(explain_xref_parent(), "Unknown Parent Environment")
        }

        // Codes: rule.shared_service
        ids::CODE_SHARED_SERVICE_NOT_FOUND => {
            titled(explain_shared_service(), "Shared-Service Environment Missing")
        }
        ids::CODE_SENSITIVITY_NOT_MAXIMAL => {
            titled(explain_shared_service(), "Shared-Service Sensitivity Not Maximal")
        }
        ids::CODE_CRITICALITY_NOT_MAXIMAL => {
            titled(explain_shared_service(), "Shared-Service Criticality Not Maximal")
        }
        ids::CODE_INCOMPLETE_COMPLIANCE => {
            titled(explain_shared_service(), "Shared-Service Compliance Incomplete")
        }

        // Codes: rule.uniqueness
        ids::CODE_DUPLICATE_VALUE => titled(explain_uniqueness(), "Duplicate Value"),

        _ => return None,
    };
    Some(exp)
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_LOAD_STRUCTURE,
        ids::CHECK_PLUGIN_CLASSIFICATION,
        ids::CHECK_PLUGIN_COMPLIANCE,
        ids::CHECK_XREF_COMPLIANCE,
        ids::CHECK_XREF_PARENT,
        ids::CHECK_RULE_SHARED_SERVICE,
        ids::CHECK_RULE_UNIQUENESS,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_MALFORMED_LABEL,
        ids::CODE_LEVEL_MISMATCH,
        ids::CODE_MISSING_PARENTS,
        ids::CODE_UNEXPECTED_PARENTS,
        ids::CODE_OVERRIDE_PARENT_MISMATCH,
        ids::CODE_SEGMENT_COMPLIANCE,
        ids::CODE_DUPLICATE_ID,
        ids::CODE_MISSING_DIMENSION,
        ids::CODE_INVALID_VALUE,
        ids::CODE_MISSING_RATIONALE,
        ids::CODE_LABEL_COUNT_MISMATCH,
        ids::CODE_RATIONALE_TOO_SHORT,
        ids::CODE_SCOPE_WITHOUT_RATIONALE,
        ids::CODE_RATIONALE_WITHOUT_SCOPE,
        ids::CODE_INVALID_SCOPE,
        ids::CODE_SCOPE_NOT_DEFINED_BY_PARENT,
        ids::CODE_UNKNOWN_COMPLIANCE_REFERENCE,
        ids::CODE_UNKNOWN_PARENT_ENVIRONMENT,
        ids::CODE_SHARED_SERVICE_NOT_FOUND,
        ids::CODE_SENSITIVITY_NOT_MAXIMAL,
        ids::CODE_CRITICALITY_NOT_MAXIMAL,
        ids::CODE_INCOMPLETE_COMPLIANCE,
        ids::CODE_DUPLICATE_VALUE,
    ]
}

fn titled(mut exp: Explanation, title: &'static str) -> Explanation {
    exp.title = title;
    exp
}

// --- Check-level explanations ---

fn explain_load_structure() -> Explanation {
    Explanation {
        title: "Document Structure",
        description: "\
Rejects environment and segment documents that cannot be loaded into the taxonomy.

A document is rejected when:
- a label has no `:` separating key and value
- its `level` disagrees with the directory it was loaded from
- a segment declares no parents, or an environment declares parents/overrides
- an override targets an environment that is not listed in `parents`
- a segment declares `compliance` outside its overrides
- another document already uses the same `id` at the same level

Rejected documents are excluded from resolution, so the run cannot pass.",
        remediation: "\
Fix the offending document:
- write labels as `key:value` or `namespace/key:value`
- drop the `level` field or make it match `environments/` (1) or `segments/` (2)
- list every override target under `parents`
- move a segment's compliance list to `overrides.<parent>.compliance`
- give every environment and segment a unique `id`",
        examples: ExamplePair {
            before: r#"id: payments
parents: [prod]
overrides:
  staging:
    labels: ["compliance/pci-dss:in-scope"]"#,
            after: r#"id: payments
parents: [prod, staging]
overrides:
  staging:
    labels: ["compliance/pci-dss:in-scope"]"#,
        },
    }
}

fn explain_classification() -> Explanation {
    Explanation {
        title: "Classification Labels",
        description: "\
Every environment and segment must carry one value per configured classification
dimension (for example `sensitivity` and `criticality`) under the classification
namespace, each paired with a `<dimension>_rationale` label.

The check reports:
- a missing dimension value or rationale
- a value outside the dimension's allowed set
- a rationale shorter than the configured minimum length
- any extra or missing label in the namespace (exactly two labels per dimension)

Segments inherit dimension values they do not set from their parent environments.",
        remediation: "\
Add the missing labels, or pick a value from the allowed set:

    classification/sensitivity:high
    classification/sensitivity_rationale:Holds customer payment data",
        examples: ExamplePair {
            before: r#"labels:
  - classification/sensitivity:secret"#,
            after: r#"labels:
  - classification/sensitivity:high
  - classification/sensitivity_rationale:Holds customer payment data
  - classification/criticality:high
  - classification/criticality_rationale:Outage stops all card payments"#,
        },
    }
}

fn explain_compliance() -> Explanation {
    Explanation {
        title: "Compliance Scope Labels",
        description: "\
Compliance scope is opt-in per requirement. When a requirement is labelled, the
scope (`in-scope` or `out-of-scope`) and its `<requirement>_rationale` must be
given together, and the rationale must meet the configured minimum length.

The same rules apply to the labels of every per-parent override.",
        remediation: "\
Provide both labels, or neither:

    compliance/pci-dss:in-scope
    compliance/pci-dss_rationale:Processes cardholder data",
        examples: ExamplePair {
            before: r#"labels:
  - compliance/pci-dss:maybe"#,
            after: r#"labels:
  - compliance/pci-dss:in-scope
  - compliance/pci-dss_rationale:Processes cardholder data"#,
        },
    }
}

fn explain_scope_not_defined_by_parent() -> Explanation {
    Explanation {
        title: "Compliance Scope Not Defined By Parent",
        description: "\
With hierarchy enforcement enabled, a segment cannot claim `in-scope` status for a
requirement that its parent environment does not label at all.

The segment's effective scope is the value in its override for that parent when
present, otherwise its own label.",
        remediation: "\
Label the requirement on the parent environment, or drop the in-scope claim from
the segment (or from its override for that parent).",
        examples: ExamplePair {
            before: r#"# environments/prod.yaml
labels: []
# segments/payments.yaml
parents: [prod]
labels: ["compliance/pci-dss:in-scope", "compliance/pci-dss_rationale:Cardholder data"]"#,
            after: r#"# environments/prod.yaml
labels: ["compliance/pci-dss:in-scope", "compliance/pci-dss_rationale:Hosts card flows"]
# segments/payments.yaml
parents: [prod]
labels: ["compliance/pci-dss:in-scope", "compliance/pci-dss_rationale:Cardholder data"]"#,
        },
    }
}

fn explain_xref_compliance() -> Explanation {
    Explanation {
        title: "Compliance References",
        description: "\
Every compliance requirement ID listed by an environment, or by a segment override
(directly or inherited from the parent), must exist in the compliance catalog.",
        remediation: "\
Add the requirement to `compliance.yaml`, or fix the ID where it is referenced.",
        examples: ExamplePair {
            before: r#"# compliance.yaml has: pci-dss
compliance: [pci-dss, hipaa]"#,
            after: r#"# compliance.yaml has: pci-dss, hipaa
compliance: [pci-dss, hipaa]"#,
        },
    }
}

fn explain_xref_parent() -> Explanation {
    Explanation {
        title: "Parent References",
        description: "\
Every parent a segment declares (and therefore every override it carries) must be
an existing environment.",
        remediation: "\
Create the environment document, or remove the parent from the segment.",
        examples: ExamplePair {
            before: r#"id: payments
parents: [prod, prd]"#,
            after: r#"id: payments
parents: [prod]"#,
        },
    }
}

fn explain_shared_service() -> Explanation {
    Explanation {
        title: "Shared-Service Environment",
        description: "\
The `shared-service` environment hosts services every other environment depends on,
so it must:
- exist
- carry the most severe sensitivity and criticality values of the declared orderings
- reference every requirement in the compliance catalog",
        remediation: "\
Create `environments/shared-service.yaml`, raise its classification to the top of
each ordering, and list every catalog requirement under `compliance`.",
        examples: ExamplePair {
            before: r#"id: shared-service
compliance: [pci-dss]
labels:
  - classification/sensitivity:medium"#,
            after: r#"id: shared-service
compliance: [pci-dss, sox]
labels:
  - classification/sensitivity:high"#,
        },
    }
}

fn explain_uniqueness() -> Explanation {
    Explanation {
        title: "Unique Values",
        description: "\
Configured fields (for example `name`) must be unique among environments, and
separately unique among segments. An environment and a segment may share a value.",
        remediation: "\
Rename one of the entities listed in the finding.",
        examples: ExamplePair {
            before: r#"# environments/prod.yaml
name: Production
# environments/prod-eu.yaml
name: Production"#,
            after: r#"# environments/prod.yaml
name: Production
# environments/prod-eu.yaml
name: Production EU"#,
        },
    }
}
