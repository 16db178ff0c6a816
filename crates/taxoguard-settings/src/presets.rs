use std::collections::BTreeMap;
use taxoguard_domain::policy::{
    CheckPolicy, ClassificationPolicy, CompliancePolicy, DEFAULT_CLASSIFICATION_NAMESPACE,
    DEFAULT_COMPLIANCE_NAMESPACE, Dimension, EffectiveConfig, FailOn, RulePolicy,
};
use taxoguard_types::Severity;

pub const DEFAULT_MIN_RATIONALE_LENGTH: usize = 10;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> EffectiveConfig {
    match profile {
        "warn" => warn_profile(),
        // default
        _ => strict_profile(),
    }
}

pub fn is_known_profile(profile: &str) -> bool {
    matches!(profile, "strict" | "warn")
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        classification: classification(),
        compliance: compliance(),
        rules: default_rules(),
        checks: default_checks(Severity::Error),
    }
}

fn warn_profile() -> EffectiveConfig {
    // Everything still runs; findings only warn, so the run passes with a `warn` verdict.
    EffectiveConfig {
        profile: "warn".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        classification: classification(),
        compliance: compliance(),
        rules: default_rules(),
        checks: default_checks(Severity::Warning),
    }
}

fn levels() -> Dimension {
    Dimension {
        values: vec!["high".to_string(), "medium".to_string(), "low".to_string()],
        order: Vec::new(),
    }
}

fn classification() -> ClassificationPolicy {
    let mut dimensions = BTreeMap::new();
    dimensions.insert("sensitivity".to_string(), levels());
    dimensions.insert("criticality".to_string(), levels());
    ClassificationPolicy {
        enabled: true,
        namespace: DEFAULT_CLASSIFICATION_NAMESPACE.to_string(),
        dimensions,
        min_rationale_length: DEFAULT_MIN_RATIONALE_LENGTH,
    }
}

fn compliance() -> CompliancePolicy {
    CompliancePolicy {
        enabled: true,
        namespace: DEFAULT_COMPLIANCE_NAMESPACE.to_string(),
        requirements: Vec::new(),
        min_rationale_length: DEFAULT_MIN_RATIONALE_LENGTH,
        enforce_hierarchy: true,
    }
}

fn default_rules() -> BTreeMap<String, RulePolicy> {
    use taxoguard_types::ids::*;
    let mut m = BTreeMap::new();

    m.insert(RULE_SHARED_SERVICE.to_string(), RulePolicy::enabled());
    m.insert(
        RULE_UNIQUENESS.to_string(),
        RulePolicy {
            enabled: true,
            keys: vec!["name".to_string()],
        },
    );

    m
}

fn default_checks(default_severity: Severity) -> BTreeMap<String, CheckPolicy> {
    use taxoguard_types::ids::*;
    let mut m = BTreeMap::new();

    for check_id in [
        CHECK_PLUGIN_CLASSIFICATION,
        CHECK_PLUGIN_COMPLIANCE,
        CHECK_XREF_COMPLIANCE,
        CHECK_XREF_PARENT,
        CHECK_RULE_SHARED_SERVICE,
        CHECK_RULE_UNIQUENESS,
    ] {
        m.insert(check_id.to_string(), CheckPolicy::enabled(default_severity));
    }

    m
}
