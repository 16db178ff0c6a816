//! The `check` use case: load a taxonomy, resolve it, and produce a report.

use anyhow::Context;
use camino::Utf8Path;
use taxoguard_domain::Resolution;
use taxoguard_domain::model::Taxonomy;
use taxoguard_domain::report::DomainReport;
use taxoguard_settings::{Overrides, ResolvedConfig};
use taxoguard_types::{ReportEnvelope, SCHEMA_REPORT_V1, TaxoguardReport, ToolMeta, Verdict};
use time::OffsetDateTime;
use tracing::info;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Directory holding `environments/`, `segments/` and `compliance.yaml`.
    pub taxonomy_root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: TaxoguardReport,
    /// Present only when no finding survived the filters.
    pub taxonomy: Option<Taxonomy>,
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: parse config, load documents, resolve the taxonomy, produce report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        taxoguard_settings::TaxoguardConfigV1::default()
    } else {
        taxoguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved = taxoguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let documents =
        taxoguard_repo::load_taxonomy(input.taxonomy_root).context("load taxonomy")?;

    let Resolution { report, taxonomy } =
        taxoguard_domain::resolve(documents, &resolved.effective);
    let DomainReport {
        verdict,
        findings,
        rules,
        data,
        counts,
    } = report;

    info!(
        verdict = ?verdict,
        errors = counts.error,
        warnings = counts.warning,
        emitted = data.findings_emitted,
        total = data.findings_total,
        resolved = taxonomy.is_some(),
        "check finished"
    );

    let finished_at = OffsetDateTime::now_utc();

    Ok(CheckOutput {
        report: ReportEnvelope {
            schema: SCHEMA_REPORT_V1.to_string(),
            tool: tool_meta(),
            started_at,
            finished_at,
            verdict,
            findings,
            rules,
            data,
        },
        taxonomy,
        resolved_config: resolved,
    })
}

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "taxoguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
