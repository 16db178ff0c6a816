use crate::labels::Labels;
use crate::model::{ComplianceRequirement, Level, Segment, Taxonomy, TaxonomyInput};
use crate::policy::{
    ClassificationPolicy, CompliancePolicy, DEFAULT_CLASSIFICATION_NAMESPACE,
    DEFAULT_COMPLIANCE_NAMESPACE, Dimension, EffectiveConfig, FailOn, RulePolicy,
};
use std::collections::BTreeMap;
use taxoguard_types::ids;

fn strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_string()).collect()
}

fn levels() -> Dimension {
    Dimension {
        values: strings(&["high", "medium", "low"]),
        order: Vec::new(),
    }
}

/// Strict config: sensitivity/criticality dimensions, pci-dss/sox compliance, both rules.
pub fn config() -> EffectiveConfig {
    let mut dimensions = BTreeMap::new();
    dimensions.insert("sensitivity".to_string(), levels());
    dimensions.insert("criticality".to_string(), levels());

    let mut rules = BTreeMap::new();
    rules.insert(ids::RULE_SHARED_SERVICE.to_string(), RulePolicy::enabled());
    rules.insert(
        ids::RULE_UNIQUENESS.to_string(),
        RulePolicy {
            enabled: true,
            keys: strings(&["name"]),
        },
    );

    EffectiveConfig {
        profile: "test".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        classification: ClassificationPolicy {
            enabled: true,
            namespace: DEFAULT_CLASSIFICATION_NAMESPACE.to_string(),
            dimensions,
            min_rationale_length: 10,
        },
        compliance: CompliancePolicy {
            enabled: true,
            namespace: DEFAULT_COMPLIANCE_NAMESPACE.to_string(),
            requirements: strings(&["pci-dss", "sox"]),
            min_rationale_length: 10,
            enforce_hierarchy: true,
        },
        rules,
        checks: BTreeMap::new(),
    }
}

/// Config with every plugin and rule switched off.
pub fn bare_config() -> EffectiveConfig {
    let mut cfg = config();
    cfg.classification.enabled = false;
    cfg.compliance.enabled = false;
    cfg.rules.clear();
    cfg
}

pub fn catalog(ids: &[&str]) -> BTreeMap<String, ComplianceRequirement> {
    ids.iter()
        .map(|id| {
            (
                id.to_string(),
                ComplianceRequirement {
                    name: id.to_uppercase(),
                    description: format!("{id} requirement"),
                    reference: None,
                },
            )
        })
        .collect()
}

/// Complete, valid classification labels.
pub fn classified(sensitivity: &str, criticality: &str) -> Vec<String> {
    vec![
        format!("classification/sensitivity:{sensitivity}"),
        "classification/sensitivity_rationale:Reviewed by the data owner".to_string(),
        format!("classification/criticality:{criticality}"),
        "classification/criticality_rationale:Reviewed by the service owner".to_string(),
    ]
}

/// Unfinalized record, as the repository layer hands it over.
pub fn record<S: AsRef<str>>(id: &str, parents: &[&str], labels: &[S]) -> Segment {
    Segment {
        id: id.to_string(),
        name: id.to_string(),
        parents: strings(parents),
        labels: Labels::from(strings(labels)),
        ..Segment::default()
    }
}

/// Finalized environment.
pub fn env<S: AsRef<str>>(id: &str, labels: &[S]) -> Segment {
    let mut s = record(id, &[], labels);
    s.finalize(Level::Environment).expect("finalize environment");
    s
}

/// Finalized segment.
pub fn seg<S: AsRef<str>>(id: &str, parents: &[&str], labels: &[S]) -> Segment {
    let mut s = record(id, parents, labels);
    s.finalize(Level::Segment).expect("finalize segment");
    s
}

pub fn taxonomy(
    environments: Vec<Segment>,
    segments: Vec<Segment>,
    catalog: BTreeMap<String, ComplianceRequirement>,
) -> Taxonomy {
    let mut t = Taxonomy {
        compliance_catalog: catalog,
        sensitivity_order: strings(&["high", "medium", "low"]),
        criticality_order: strings(&["high", "medium", "low"]),
        ..Taxonomy::default()
    };
    for s in environments.into_iter().chain(segments) {
        t.insert(s).expect("unique id");
    }
    t
}

pub fn input(
    environments: Vec<Segment>,
    segments: Vec<Segment>,
    catalog: BTreeMap<String, ComplianceRequirement>,
) -> TaxonomyInput {
    TaxonomyInput {
        environments,
        segments,
        compliance_catalog: catalog,
    }
}
