use crate::labels::{LabelError, Labels};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use taxoguard_types::{DocumentPath, SubjectKind, ids};
use thiserror::Error;

/// Hierarchy level: environments are `"1"`, segments are `"2"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "RawLevel")]
pub enum Level {
    Environment,
    Segment,
}

/// Documents may spell the level as `"1"` or `1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Text(String),
    Number(u64),
}

impl TryFrom<RawLevel> for Level {
    type Error = String;

    fn try_from(raw: RawLevel) -> Result<Self, Self::Error> {
        let text = match raw {
            RawLevel::Text(s) => s,
            RawLevel::Number(n) => n.to_string(),
        };
        match text.as_str() {
            "1" => Ok(Level::Environment),
            "2" => Ok(Level::Segment),
            other => Err(format!("unknown level {other:?} (expected \"1\" or \"2\")")),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Environment => "1",
            Level::Segment => "2",
        }
    }

    pub fn subject_kind(self) -> SubjectKind {
        match self {
            Level::Environment => SubjectKind::Environment,
            Level::Segment => SubjectKind::Segment,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A segment's refinement of its attributes, scoped to one parent environment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    /// `None` until declared or inherited from the parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not", skip_deserializing)]
    pub compliance_inherited: bool,

    /// Catalog entries for the known IDs in `compliance`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", skip_deserializing)]
    pub resolved_compliance: BTreeMap<String, ComplianceRequirement>,

    #[serde(default)]
    pub labels: Labels,
}

/// Environment or segment record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Fixed by [`Segment::finalize`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, Override>,

    #[serde(default)]
    pub labels: Labels,

    /// Environments only; a segment lists compliance per override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance: Vec<String>,

    #[serde(default)]
    pub prominence: u32,

    // Legacy scalar classification, consulted when the classification labels are absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<String>,

    /// Flat label key -> parent environment it was inherited from.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", skip_deserializing)]
    pub inherited: BTreeMap<String, String>,

    /// Document the record was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub source: Option<DocumentPath>,
}

/// Structural errors that keep a record out of the taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("{id}: declared level {found} does not match expected level {expected}")]
    LevelMismatch {
        id: String,
        expected: Level,
        found: Level,
    },
    #[error("{id}: segment declares no parent environments")]
    MissingParents { id: String },
    #[error("{id}: environment must not declare parents or overrides")]
    UnexpectedParents { id: String },
    #[error("{id}: segment compliance belongs under overrides.<parent>.compliance")]
    SegmentCompliance { id: String },
    #[error("{id}: override for {parent:?} does not match any declared parent")]
    OverrideParentMismatch { id: String, parent: String },
    #[error("{id}: {source}")]
    MalformedLabel {
        id: String,
        parent: Option<String>,
        #[source]
        source: LabelError,
    },
    #[error("{id}: identifier already used by another level {level} record")]
    DuplicateId { id: String, level: Level },
}

impl LoadError {
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::LevelMismatch { .. } => ids::CODE_LEVEL_MISMATCH,
            LoadError::MissingParents { .. } => ids::CODE_MISSING_PARENTS,
            LoadError::UnexpectedParents { .. } => ids::CODE_UNEXPECTED_PARENTS,
            LoadError::OverrideParentMismatch { .. } => ids::CODE_OVERRIDE_PARENT_MISMATCH,
            LoadError::SegmentCompliance { .. } => ids::CODE_SEGMENT_COMPLIANCE,
            LoadError::MalformedLabel { .. } => ids::CODE_MALFORMED_LABEL,
            LoadError::DuplicateId { .. } => ids::CODE_DUPLICATE_ID,
        }
    }

    pub fn segment_id(&self) -> &str {
        match self {
            LoadError::LevelMismatch { id, .. }
            | LoadError::MissingParents { id }
            | LoadError::UnexpectedParents { id }
            | LoadError::SegmentCompliance { id }
            | LoadError::OverrideParentMismatch { id, .. }
            | LoadError::MalformedLabel { id, .. }
            | LoadError::DuplicateId { id, .. } => id,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match self {
            LoadError::OverrideParentMismatch { parent, .. } => Some(parent),
            LoadError::MalformedLabel { parent, .. } => parent.as_deref(),
            _ => None,
        }
    }
}

impl Segment {
    /// Accept the record at `level`: fix the level, check parent consistency, apply defaults
    /// and derive the label views. Errors are fatal for this record only.
    pub fn finalize(&mut self, level: Level) -> Result<(), LoadError> {
        match self.level {
            None => self.level = Some(level),
            Some(found) if found != level => {
                return Err(LoadError::LevelMismatch {
                    id: self.id.clone(),
                    expected: level,
                    found,
                });
            }
            Some(_) => {}
        }

        match level {
            Level::Segment => {
                if self.parents.is_empty() {
                    return Err(LoadError::MissingParents {
                        id: self.id.clone(),
                    });
                }
                if let Some(parent) = self
                    .overrides
                    .keys()
                    .find(|key| !self.parents.contains(key))
                {
                    return Err(LoadError::OverrideParentMismatch {
                        id: self.id.clone(),
                        parent: parent.clone(),
                    });
                }
                if !self.compliance.is_empty() {
                    return Err(LoadError::SegmentCompliance {
                        id: self.id.clone(),
                    });
                }
            }
            Level::Environment => {
                if !self.parents.is_empty() || !self.overrides.is_empty() {
                    return Err(LoadError::UnexpectedParents {
                        id: self.id.clone(),
                    });
                }
            }
        }

        if self.prominence == 0 {
            self.prominence = 1;
        }

        self.labels
            .refresh()
            .map_err(|source| LoadError::MalformedLabel {
                id: self.id.clone(),
                parent: None,
                source,
            })?;
        for (parent, ov) in self.overrides.iter_mut() {
            ov.labels
                .refresh()
                .map_err(|source| LoadError::MalformedLabel {
                    id: self.id.clone(),
                    parent: Some(parent.clone()),
                    source,
                })?;
        }

        Ok(())
    }

    pub fn level(&self) -> Level {
        self.level.unwrap_or(if self.parents.is_empty() {
            Level::Environment
        } else {
            Level::Segment
        })
    }

    pub fn subject_kind(&self) -> SubjectKind {
        self.level().subject_kind()
    }

    /// Classification value for `dimension`, falling back to the legacy scalar field for
    /// `sensitivity` and `criticality`.
    pub fn classification(&self, namespace: &str, dimension: &str) -> Option<&str> {
        self.labels
            .get_in(namespace, dimension)
            .or_else(|| match dimension {
                "sensitivity" => self.sensitivity.as_deref(),
                "criticality" => self.criticality.as_deref(),
                _ => None,
            })
    }
}

/// Records handed to the engine by the repository layer.
#[derive(Clone, Debug, Default)]
pub struct TaxonomyInput {
    pub environments: Vec<Segment>,
    pub segments: Vec<Segment>,
    pub compliance_catalog: BTreeMap<String, ComplianceRequirement>,
}

/// The taxonomy aggregate. Keys always equal the `id` of their value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub environments: BTreeMap<String, Segment>,
    pub segments: BTreeMap<String, Segment>,
    pub compliance_catalog: BTreeMap<String, ComplianceRequirement>,
    /// Most severe first.
    pub sensitivity_order: Vec<String>,
    /// Most severe first.
    pub criticality_order: Vec<String>,
}

impl Taxonomy {
    /// Insert a finalized record under its level, keyed by its own ID.
    pub fn insert(&mut self, segment: Segment) -> Result<(), LoadError> {
        let level = segment.level();
        let map = match level {
            Level::Environment => &mut self.environments,
            Level::Segment => &mut self.segments,
        };
        if map.contains_key(&segment.id) {
            return Err(LoadError::DuplicateId {
                id: segment.id,
                level,
            });
        }
        map.insert(segment.id.clone(), segment);
        Ok(())
    }

    pub fn environment(&self, id: &str) -> Option<&Segment> {
        self.environments.get(id)
    }

    /// Look an entity up by kind and ID.
    pub fn entity(&self, kind: SubjectKind, id: &str) -> Option<&Segment> {
        match kind {
            SubjectKind::Environment => self.environments.get(id),
            SubjectKind::Segment => self.segments.get(id),
        }
    }

    /// Environments first, then segments, each in ID order.
    pub fn entities(&self) -> impl Iterator<Item = &Segment> {
        self.environments.values().chain(self.segments.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, parents: &[&str], labels: &[&str]) -> Segment {
        Segment {
            id: id.to_string(),
            name: id.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            labels: Labels::from(labels.iter().map(|l| l.to_string()).collect::<Vec<_>>()),
            ..Segment::default()
        }
    }

    #[test]
    fn finalize_assigns_level_and_defaults() {
        let mut env = record("prod", &[], &["classification/sensitivity:high"]);
        env.finalize(Level::Environment).expect("finalize");
        assert_eq!(env.level, Some(Level::Environment));
        assert_eq!(env.prominence, 1);
        assert_eq!(env.labels.get_in("classification", "sensitivity"), Some("high"));
    }

    #[test]
    fn finalize_keeps_explicit_prominence() {
        let mut env = record("prod", &[], &[]);
        env.prominence = 7;
        env.finalize(Level::Environment).expect("finalize");
        assert_eq!(env.prominence, 7);
    }

    #[test]
    fn finalize_rejects_level_mismatch() {
        let mut seg = record("app", &["prod"], &[]);
        seg.level = Some(Level::Environment);
        let err = seg.finalize(Level::Segment).expect_err("mismatch");
        assert_eq!(err.code(), ids::CODE_LEVEL_MISMATCH);
    }

    #[test]
    fn finalize_rejects_override_for_undeclared_parent() {
        let mut seg = record("app", &["prod"], &[]);
        seg.overrides.insert("staging".to_string(), Override::default());
        let err = seg.finalize(Level::Segment).expect_err("bad override");
        assert_eq!(
            err,
            LoadError::OverrideParentMismatch {
                id: "app".to_string(),
                parent: "staging".to_string(),
            }
        );
    }

    #[test]
    fn finalize_requires_parents_for_segments() {
        let mut seg = record("orphan", &[], &[]);
        let err = seg.finalize(Level::Segment).expect_err("no parents");
        assert_eq!(err.code(), ids::CODE_MISSING_PARENTS);
    }

    #[test]
    fn finalize_rejects_compliance_outside_overrides() {
        let mut seg = record("app", &["prod"], &[]);
        seg.compliance = vec!["pci-dsss".to_string()];
        let err = seg.finalize(Level::Segment).expect_err("segment compliance");
        assert_eq!(
            err,
            LoadError::SegmentCompliance {
                id: "app".to_string(),
            }
        );
        assert_eq!(err.code(), ids::CODE_SEGMENT_COMPLIANCE);

        let mut env = record("prod", &[], &[]);
        env.compliance = vec!["pci-dss".to_string()];
        env.finalize(Level::Environment).expect("environment compliance");
    }

    #[test]
    fn finalize_reports_malformed_override_label_with_parent() {
        let mut seg = record("app", &["prod"], &[]);
        seg.overrides.insert(
            "prod".to_string(),
            Override {
                labels: Labels::from(vec!["nocolon".to_string()]),
                ..Override::default()
            },
        );
        let err = seg.finalize(Level::Segment).expect_err("malformed");
        assert_eq!(err.code(), ids::CODE_MALFORMED_LABEL);
        assert_eq!(err.parent(), Some("prod"));
    }

    #[test]
    fn level_accepts_string_and_number() {
        let a: Level = serde_json::from_value(serde_json::json!("2")).expect("string");
        let b: Level = serde_json::from_value(serde_json::json!(1)).expect("number");
        assert_eq!(a, Level::Segment);
        assert_eq!(b, Level::Environment);
        assert!(serde_json::from_value::<Level>(serde_json::json!("3")).is_err());
        assert_eq!(serde_json::to_value(Level::Segment).expect("ser"), "2");
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut taxonomy = Taxonomy::default();
        let mut a = record("prod", &[], &[]);
        a.finalize(Level::Environment).expect("finalize");
        taxonomy.insert(a.clone()).expect("first insert");
        let err = taxonomy.insert(a).expect_err("duplicate");
        assert_eq!(err.code(), ids::CODE_DUPLICATE_ID);
    }

    #[test]
    fn classification_falls_back_to_legacy_fields() {
        let mut env = record("legacy", &[], &[]);
        env.sensitivity = Some("high".to_string());
        env.finalize(Level::Environment).expect("finalize");
        assert_eq!(env.classification("classification", "sensitivity"), Some("high"));
        assert_eq!(env.classification("classification", "criticality"), None);
    }
}
