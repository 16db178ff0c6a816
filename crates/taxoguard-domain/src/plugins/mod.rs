//! Namespace-scoped label plugins.
//!
//! Each plugin owns one label namespace. The engine only sees the [`Plugin`] trait: it asks
//! every enabled plugin to validate labels, to contribute parent labels during inheritance,
//! and to check parent/child consistency.

use crate::model::{ComplianceRequirement, Segment, Taxonomy};
use crate::policy::EffectiveConfig;
use crate::problem::Problem;
use std::collections::BTreeMap;
use taxoguard_types::ids;

mod classification;
mod compliance;

pub use classification::ClassificationPlugin;
pub use compliance::{CompliancePlugin, IN_SCOPE, OUT_OF_SCOPE};

/// Result of validating one entity's labels. Valid exactly when no problem was collected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelValidation {
    pub problems: Vec<Problem>,
}

impl LabelValidation {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

pub trait Plugin {
    /// Short name; the check ID is `plugin.<name>`.
    fn name(&self) -> &'static str;

    fn namespace(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn validate_labels(&self, segment: &Segment) -> LabelValidation;

    /// Whether parent labels in this namespace fill gaps in child labels.
    fn inherits_labels(&self) -> bool {
        false
    }

    fn validates_relationships(&self) -> bool {
        false
    }

    fn validate_relationship(&self, _parent: &Segment, _child: &Segment) -> Vec<Problem> {
        Vec::new()
    }

    fn check_id(&self) -> String {
        ids::plugin_check_id(self.name())
    }
}

/// Ordered collection of plugins.
#[derive(Default)]
pub struct PluginSet {
    plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| (p.name(), p.is_enabled())))
            .finish()
    }
}

impl PluginSet {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Build the classification and compliance plugins from config. Compliance requirements
    /// default to the catalog IDs when the config names none.
    pub fn from_config(
        cfg: &EffectiveConfig,
        catalog: &BTreeMap<String, ComplianceRequirement>,
    ) -> Self {
        let mut compliance = cfg.compliance.clone();
        if compliance.requirements.is_empty() {
            compliance.requirements = catalog.keys().cloned().collect();
        }
        Self::new(vec![
            Box::new(ClassificationPlugin::new(cfg.classification.clone())),
            Box::new(CompliancePlugin::new(compliance)),
        ])
    }

    pub fn enabled(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins
            .iter()
            .map(|p| &**p as &dyn Plugin)
            .filter(|p| p.is_enabled())
    }

    /// Validate the labels of every environment and segment with every enabled plugin.
    pub fn validate_all(&self, taxonomy: &Taxonomy) -> Vec<Problem> {
        let mut out = Vec::new();
        for plugin in self.enabled() {
            for entity in taxonomy.entities() {
                out.extend(plugin.validate_labels(entity).problems);
            }
        }
        out
    }
}

/// Character length, so multi-byte rationales are not penalized.
pub(crate) fn text_len(s: &str) -> usize {
    s.chars().count()
}
