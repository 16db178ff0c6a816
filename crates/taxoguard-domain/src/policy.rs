use std::collections::BTreeMap;
use taxoguard_types::Severity;

pub const DEFAULT_CLASSIFICATION_NAMESPACE: &str = "classification";
pub const DEFAULT_COMPLIANCE_NAMESPACE: &str = "compliance";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Error,
    Warning,
}

#[derive(Clone, Debug)]
pub struct CheckPolicy {
    pub enabled: bool,
    pub severity: Severity,
    /// Glob patterns over subject IDs exempt from this check.
    pub allow: Vec<String>,
}

impl CheckPolicy {
    pub fn enabled(severity: Severity) -> Self {
        Self {
            enabled: true,
            severity,
            allow: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: Severity::Info,
            allow: Vec::new(),
        }
    }
}

/// One classification dimension, e.g. `sensitivity`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimension {
    /// Allowed values; empty means unrestricted.
    pub values: Vec<String>,
    /// Severity ranking, most severe first. Empty means `values` order.
    pub order: Vec<String>,
}

impl Dimension {
    pub fn ranking(&self) -> &[String] {
        if self.order.is_empty() {
            &self.values
        } else {
            &self.order
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|v| v == value)
    }
}

#[derive(Clone, Debug)]
pub struct ClassificationPolicy {
    pub enabled: bool,
    pub namespace: String,
    pub dimensions: BTreeMap<String, Dimension>,
    pub min_rationale_length: usize,
}

#[derive(Clone, Debug)]
pub struct CompliancePolicy {
    pub enabled: bool,
    pub namespace: String,
    /// Requirement IDs to validate; empty means "every catalog entry".
    pub requirements: Vec<String>,
    pub min_rationale_length: usize,
    pub enforce_hierarchy: bool,
}

#[derive(Clone, Debug)]
pub struct RulePolicy {
    pub enabled: bool,
    /// Field names checked by the uniqueness rule.
    pub keys: Vec<String>,
}

impl RulePolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            keys: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub fail_on: FailOn,
    pub max_findings: usize,
    pub classification: ClassificationPolicy,
    pub compliance: CompliancePolicy,
    /// Rule name -> parameters.
    pub rules: BTreeMap<String, RulePolicy>,
    /// Check ID -> severity/enablement. Checks without an entry report as errors.
    pub checks: BTreeMap<String, CheckPolicy>,
}

impl EffectiveConfig {
    /// Severity for findings of `check_id`, or `None` when the check is switched off.
    pub fn severity_for(&self, check_id: &str) -> Option<Severity> {
        match self.checks.get(check_id) {
            Some(p) if p.enabled => Some(p.severity),
            Some(_) => None,
            None => Some(Severity::Error),
        }
    }

    pub fn rule_policy(&self, rule: &str) -> Option<&RulePolicy> {
        self.rules.get(rule).filter(|p| p.enabled)
    }
}
