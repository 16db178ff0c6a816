//! Stable DTOs and IDs used across the taxoguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable string IDs and codes
//! - canonical document path handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;

pub use explain::{ExamplePair, Explanation, lookup_explanation};
pub use path::DocumentPath;
pub use receipt::{
    Finding, Location, ReportEnvelope, RuleOutcome, RuleStatus, SCHEMA_REPORT_V1, Severity,
    SubjectKind, TaxoguardReport, TaxonomyData, ToolMeta, Verdict,
};
