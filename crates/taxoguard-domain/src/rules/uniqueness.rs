use super::LogicRule;
use crate::model::{Segment, Taxonomy};
use crate::problem::Problem;
use serde_json::json;
use std::collections::BTreeMap;
use taxoguard_types::{SubjectKind, ids};

/// Configured fields must be unique among environments, and separately among segments.
///
/// A key is `id`, `name`, `description` or any flat label key. Records without a value for
/// the key are not compared.
#[derive(Clone, Debug)]
pub struct UniquenessRule {
    keys: Vec<String>,
}

impl UniquenessRule {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    fn check_population<'a>(
        &self,
        kind: SubjectKind,
        population: impl Iterator<Item = &'a Segment> + Clone,
        out: &mut Vec<Problem>,
    ) {
        for key in &self.keys {
            let mut by_value: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for s in population.clone() {
                if let Some(value) = field(s, key).filter(|v| !v.is_empty()) {
                    by_value.entry(value).or_default().push(&s.id);
                }
            }

            for (value, mut holders) in by_value.into_iter().filter(|(_, h)| h.len() > 1) {
                holders.sort_unstable();
                let level = match kind {
                    SubjectKind::Environment => "environments",
                    SubjectKind::Segment => "segments",
                };
                out.push(
                    Problem::new(
                        self.check_id(),
                        ids::CODE_DUPLICATE_VALUE,
                        format!(
                            "{key} '{value}' is shared by {level}: {}",
                            holders.join(", ")
                        ),
                    )
                    .about(kind, holders[0])
                    .help("Give each record a distinct value for this field.")
                    .data(json!({ "key": key, "value": value, "ids": holders })),
                );
            }
        }
    }
}

fn field<'a>(segment: &'a Segment, key: &str) -> Option<&'a str> {
    match key {
        "id" => Some(&segment.id),
        "name" => Some(&segment.name),
        "description" => Some(&segment.description),
        label => segment.labels.get(label),
    }
}

impl LogicRule for UniquenessRule {
    fn name(&self) -> &'static str {
        ids::RULE_UNIQUENESS
    }

    fn evaluate(&self, taxonomy: &Taxonomy) -> Vec<Problem> {
        let mut out = Vec::new();
        self.check_population(
            SubjectKind::Environment,
            taxonomy.environments.values(),
            &mut out,
        );
        self.check_population(SubjectKind::Segment, taxonomy.segments.values(), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, env, seg, taxonomy};

    fn named(mut s: Segment, name: &str) -> Segment {
        s.name = name.to_string();
        s
    }

    fn rule(keys: &[&str]) -> UniquenessRule {
        UniquenessRule::new(keys.iter().map(|k| k.to_string()).collect())
    }

    #[test]
    fn two_environments_with_the_same_name() {
        let t = taxonomy(
            vec![
                named(env("prod-eu", &[] as &[&str]), "Production"),
                named(env("prod-us", &[] as &[&str]), "Production"),
            ],
            vec![],
            catalog(&[]),
        );
        let problems = rule(&["name"]).evaluate(&t);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].code, ids::CODE_DUPLICATE_VALUE);
        assert_eq!(problems[0].data["ids"], json!(["prod-eu", "prod-us"]));
        assert_eq!(problems[0].subject_id(), Some("prod-eu"));
    }

    #[test]
    fn environments_and_segments_are_separate_populations() {
        let t = taxonomy(
            vec![named(env("prod", &[] as &[&str]), "Payments")],
            vec![named(seg("payments", &["prod"], &[] as &[&str]), "Payments")],
            catalog(&[]),
        );
        assert!(rule(&["name"]).evaluate(&t).is_empty());
    }

    #[test]
    fn one_problem_per_duplicated_value() {
        let t = taxonomy(
            vec![env("prod", &[] as &[&str])],
            vec![
                named(seg("a", &["prod"], &[] as &[&str]), "Alpha"),
                named(seg("b", &["prod"], &[] as &[&str]), "Alpha"),
                named(seg("c", &["prod"], &[] as &[&str]), "Alpha"),
                named(seg("d", &["prod"], &[] as &[&str]), "Delta"),
                named(seg("e", &["prod"], &[] as &[&str]), "Delta"),
            ],
            catalog(&[]),
        );
        let problems = rule(&["name"]).evaluate(&t);
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].data["ids"], json!(["a", "b", "c"]));
        assert_eq!(problems[1].data["ids"], json!(["d", "e"]));
    }

    #[test]
    fn label_keys_and_missing_values() {
        let t = taxonomy(
            vec![
                env("a", &["owner:team-x"]),
                env("b", &["owner:team-x"]),
                env("c", &[] as &[&str]),
                env("d", &[] as &[&str]),
            ],
            vec![],
            catalog(&[]),
        );
        let problems = rule(&["owner", "description"]).evaluate(&t);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].data["key"], "owner");
    }
}
