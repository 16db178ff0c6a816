//! Taxonomy-wide logic rules.
//!
//! Each rule is toggled on its own and reports into its own [`RuleResult`], so a report can
//! tell which policy failed and how often.

use crate::model::Taxonomy;
use crate::policy::EffectiveConfig;
use crate::problem::Problem;
use std::collections::BTreeMap;
use taxoguard_types::ids;
use tracing::warn;

mod shared_service;
mod uniqueness;

pub use shared_service::{SHARED_SERVICE_ID, SharedServiceRule};
pub use uniqueness::UniquenessRule;

pub trait LogicRule {
    fn name(&self) -> &'static str;

    fn evaluate(&self, taxonomy: &Taxonomy) -> Vec<Problem>;

    fn check_id(&self) -> String {
        ids::rule_check_id(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuleResult {
    pub rule: &'static str,
    pub problems: Vec<Problem>,
}

impl RuleResult {
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Enabled rules keyed by name.
#[derive(Default)]
pub struct RuleSet {
    rules: BTreeMap<&'static str, Box<dyn LogicRule>>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rules.keys()).finish()
    }
}

impl RuleSet {
    pub fn insert(&mut self, rule: Box<dyn LogicRule>) {
        self.rules.insert(rule.name(), rule);
    }

    pub fn from_config(cfg: &EffectiveConfig) -> Self {
        let mut set = RuleSet::default();
        for (name, policy) in cfg.rules.iter().filter(|(_, p)| p.enabled) {
            match name.as_str() {
                ids::RULE_SHARED_SERVICE => set.insert(Box::new(SharedServiceRule::new(
                    cfg.classification.namespace.clone(),
                ))),
                ids::RULE_UNIQUENESS => {
                    set.insert(Box::new(UniquenessRule::new(policy.keys.clone())))
                }
                other => warn!(rule = other, "unknown logic rule ignored"),
            }
        }
        set
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule; results come back in rule-name order.
    pub fn evaluate(&self, taxonomy: &Taxonomy) -> Vec<RuleResult> {
        self.rules
            .values()
            .map(|rule| RuleResult {
                rule: rule.name(),
                problems: rule.evaluate(taxonomy),
            })
            .collect()
    }
}
