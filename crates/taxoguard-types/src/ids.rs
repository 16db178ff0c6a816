//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks
pub const CHECK_LOAD_STRUCTURE: &str = "load.structure";
pub const CHECK_PLUGIN_CLASSIFICATION: &str = "plugin.classification";
pub const CHECK_PLUGIN_COMPLIANCE: &str = "plugin.compliance";
pub const CHECK_XREF_COMPLIANCE: &str = "xref.compliance";
pub const CHECK_XREF_PARENT: &str = "xref.parent";
pub const CHECK_RULE_SHARED_SERVICE: &str = "rule.shared_service";
pub const CHECK_RULE_UNIQUENESS: &str = "rule.uniqueness";

// Logic rule names (the `rule.` suffix of their check IDs).
pub const RULE_SHARED_SERVICE: &str = "shared_service";
pub const RULE_UNIQUENESS: &str = "uniqueness";

// Plugin names (the `plugin.` suffix of their check IDs).
pub const PLUGIN_CLASSIFICATION: &str = "classification";
pub const PLUGIN_COMPLIANCE: &str = "compliance";

// Codes: load.structure
pub const CODE_MALFORMED_LABEL: &str = "malformed_label";
pub const CODE_LEVEL_MISMATCH: &str = "level_mismatch";
pub const CODE_MISSING_PARENTS: &str = "missing_parents";
pub const CODE_UNEXPECTED_PARENTS: &str = "unexpected_parents";
pub const CODE_OVERRIDE_PARENT_MISMATCH: &str = "override_parent_mismatch";
pub const CODE_SEGMENT_COMPLIANCE: &str = "segment_compliance";
pub const CODE_DUPLICATE_ID: &str = "duplicate_id";

// Codes: plugin.classification
pub const CODE_MISSING_DIMENSION: &str = "missing_dimension";
pub const CODE_INVALID_VALUE: &str = "invalid_value";
pub const CODE_MISSING_RATIONALE: &str = "missing_rationale";
pub const CODE_LABEL_COUNT_MISMATCH: &str = "label_count_mismatch";

// Codes: plugin.classification + plugin.compliance
pub const CODE_RATIONALE_TOO_SHORT: &str = "rationale_too_short";

// Codes: plugin.compliance
pub const CODE_SCOPE_WITHOUT_RATIONALE: &str = "scope_without_rationale";
pub const CODE_RATIONALE_WITHOUT_SCOPE: &str = "rationale_without_scope";
pub const CODE_INVALID_SCOPE: &str = "invalid_scope";
pub const CODE_SCOPE_NOT_DEFINED_BY_PARENT: &str = "scope_not_defined_by_parent";

// Codes: xref.compliance
pub const CODE_UNKNOWN_COMPLIANCE_REFERENCE: &str = "unknown_compliance_reference";

// Codes: xref.parent
pub const CODE_UNKNOWN_PARENT_ENVIRONMENT: &str = "unknown_parent_environment";

// Codes: rule.shared_service
pub const CODE_SHARED_SERVICE_NOT_FOUND: &str = "shared_service_not_found";
pub const CODE_SENSITIVITY_NOT_MAXIMAL: &str = "sensitivity_not_maximal";
pub const CODE_CRITICALITY_NOT_MAXIMAL: &str = "criticality_not_maximal";
pub const CODE_INCOMPLETE_COMPLIANCE: &str = "incomplete_compliance";

// Codes: rule.uniqueness
pub const CODE_DUPLICATE_VALUE: &str = "duplicate_value";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

/// Check ID for a logic rule name (`uniqueness` -> `rule.uniqueness`).
pub fn rule_check_id(rule: &str) -> String {
    format!("rule.{rule}")
}

/// Check ID for a plugin name (`compliance` -> `plugin.compliance`).
pub fn plugin_check_id(plugin: &str) -> String {
    format!("plugin.{plugin}")
}
