use super::{LabelValidation, Plugin, text_len};
use crate::model::Segment;
use crate::policy::ClassificationPolicy;
use crate::problem::Problem;
use serde_json::json;
use taxoguard_types::ids;

/// Requires one allowed value and one rationale per configured dimension.
#[derive(Clone, Debug)]
pub struct ClassificationPlugin {
    policy: ClassificationPolicy,
}

impl ClassificationPlugin {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self { policy }
    }

    fn problem(&self, code: &'static str, segment: &Segment, message: String) -> Problem {
        Problem::new(self.check_id(), code, message).about(segment.subject_kind(), &segment.id)
    }
}

impl Plugin for ClassificationPlugin {
    fn name(&self) -> &'static str {
        ids::PLUGIN_CLASSIFICATION
    }

    fn namespace(&self) -> &str {
        &self.policy.namespace
    }

    fn is_enabled(&self) -> bool {
        self.policy.enabled
    }

    fn inherits_labels(&self) -> bool {
        true
    }

    fn validate_labels(&self, segment: &Segment) -> LabelValidation {
        let ns = &self.policy.namespace;
        let labels = segment.labels.namespace(ns);
        let lookup = |key: &str| labels.and_then(|m| m.get(key)).map(String::as_str);
        let mut problems = Vec::new();

        for (dimension, spec) in &self.policy.dimensions {
            match lookup(dimension) {
                None => problems.push(
                    self.problem(
                        ids::CODE_MISSING_DIMENSION,
                        segment,
                        format!("'{}' has no {ns}/{dimension} label", segment.id),
                    )
                    .help("Add a value label for every classification dimension.")
                    .data(json!({ "dimension": dimension })),
                ),
                Some(value) if !spec.allows(value) => problems.push(
                    self.problem(
                        ids::CODE_INVALID_VALUE,
                        segment,
                        format!(
                            "'{}' has {dimension} '{value}', expected one of: {}",
                            segment.id,
                            spec.values.join(", ")
                        ),
                    )
                    .help("Use one of the dimension's allowed values.")
                    .data(json!({
                        "dimension": dimension,
                        "value": value,
                        "allowed": spec.values,
                    })),
                ),
                Some(_) => {}
            }

            let rationale_key = format!("{dimension}_rationale");
            match lookup(&rationale_key) {
                None => problems.push(
                    self.problem(
                        ids::CODE_MISSING_RATIONALE,
                        segment,
                        format!("'{}' has no {ns}/{rationale_key} label", segment.id),
                    )
                    .help("Explain every classification value in a paired rationale label.")
                    .data(json!({ "dimension": dimension })),
                ),
                Some(rationale) if text_len(rationale) < self.policy.min_rationale_length => {
                    problems.push(
                        self.problem(
                            ids::CODE_RATIONALE_TOO_SHORT,
                            segment,
                            format!(
                                "'{}' {dimension} rationale is {} characters, minimum is {}",
                                segment.id,
                                text_len(rationale),
                                self.policy.min_rationale_length
                            ),
                        )
                        .data(json!({
                            "dimension": dimension,
                            "length": text_len(rationale),
                            "minimum": self.policy.min_rationale_length,
                        })),
                    )
                }
                Some(_) => {}
            }
        }

        let present = labels.map_or(0, |m| m.len());
        let expected = self.policy.dimensions.len() * 2;
        if present != expected {
            problems.push(
                self.problem(
                    ids::CODE_LABEL_COUNT_MISMATCH,
                    segment,
                    format!(
                        "'{}' has {present} {ns} labels, expected {expected} (value + rationale per dimension)",
                        segment.id
                    ),
                )
                .help("Remove stray labels from the classification namespace.")
                .data(json!({ "present": present, "expected": expected })),
            );
        }

        LabelValidation { problems }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{classified, config, env};

    fn plugin() -> ClassificationPlugin {
        ClassificationPlugin::new(config().classification)
    }

    fn codes(v: &LabelValidation) -> Vec<&'static str> {
        v.problems.iter().map(|p| p.code).collect()
    }

    #[test]
    fn fully_classified_entity_is_valid() {
        let e = env("prod", &classified("high", "high"));
        let v = plugin().validate_labels(&e);
        assert!(v.is_valid(), "{:?}", v.problems);
    }

    #[test]
    fn missing_dimension_also_breaks_the_count() {
        let e = env(
            "prod",
            &[
                "classification/sensitivity:high",
                "classification/sensitivity_rationale:Customer payment data",
            ],
        );
        let v = plugin().validate_labels(&e);
        assert_eq!(
            codes(&v),
            vec![
                ids::CODE_MISSING_DIMENSION,
                ids::CODE_MISSING_RATIONALE,
                ids::CODE_LABEL_COUNT_MISMATCH,
            ]
        );
        assert!(!v.is_valid());
    }

    #[test]
    fn invalid_value_and_short_rationale_are_independent() {
        let e = env(
            "prod",
            &[
                "classification/sensitivity:secret",
                "classification/sensitivity_rationale:short",
                "classification/criticality:low",
                "classification/criticality_rationale:Nothing depends on it",
            ],
        );
        let v = plugin().validate_labels(&e);
        assert_eq!(
            codes(&v),
            vec![ids::CODE_INVALID_VALUE, ids::CODE_RATIONALE_TOO_SHORT]
        );
        assert_eq!(v.problems[0].data["value"], "secret");
    }

    #[test]
    fn stray_label_in_namespace_is_reported() {
        let mut labels = classified("low", "low");
        labels.push("classification/owner:team-a".to_string());
        let e = env("dev", &labels);
        let v = plugin().validate_labels(&e);
        assert_eq!(codes(&v), vec![ids::CODE_LABEL_COUNT_MISMATCH]);
    }
}
