//! The `export` use case: hand the resolved taxonomy to downstream consumers as JSON.

use crate::CheckOutput;
use anyhow::Context;
use taxoguard_domain::model::Taxonomy;

/// Result of exporting a checked taxonomy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Pretty-printed JSON of the resolved taxonomy.
    Resolved(Vec<u8>),
    /// Problems survived the filters; nothing to export.
    Unresolved { problems: usize },
}

pub fn export_taxonomy(output: &CheckOutput) -> anyhow::Result<ExportOutcome> {
    match &output.taxonomy {
        Some(taxonomy) => Ok(ExportOutcome::Resolved(serialize_taxonomy(taxonomy)?)),
        None => Ok(ExportOutcome::Unresolved {
            problems: output.report.data.findings_total as usize,
        }),
    }
}

pub fn serialize_taxonomy(taxonomy: &Taxonomy) -> anyhow::Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(taxonomy).context("serialize taxonomy")?;
    out.push(b'\n');
    Ok(out)
}
