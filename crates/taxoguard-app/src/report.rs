use crate::check::tool_meta;
use anyhow::Context;
use taxoguard_render::{
    RenderableData, RenderableFinding, RenderableLocation, RenderableReport, RenderableRule,
    RenderableSeverity, RenderableVerdictStatus,
};
use taxoguard_types::{
    Finding, Location, RuleStatus, SCHEMA_REPORT_V1, Severity, SubjectKind, TaxoguardReport,
    TaxonomyData, Verdict, ids,
};
use time::OffsetDateTime;

pub fn parse_report_json(text: &str) -> anyhow::Result<TaxoguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema:?} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse taxoguard report")
}

pub fn serialize_report(report: &TaxoguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn to_renderable(report: &TaxoguardReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict {
            Verdict::Pass => RenderableVerdictStatus::Pass,
            Verdict::Warn => RenderableVerdictStatus::Warn,
            Verdict::Fail => RenderableVerdictStatus::Fail,
        },
        findings: report.findings.iter().map(renderable_finding).collect(),
        rules: report
            .rules
            .iter()
            .map(|r| RenderableRule {
                rule: r.rule.clone(),
                passed: r.status == RuleStatus::Pass,
                problems: r.problems,
            })
            .collect(),
        data: RenderableData {
            profile: report.data.profile.clone(),
            environments_scanned: report.data.environments_scanned,
            segments_scanned: report.data.segments_scanned,
            findings_emitted: report.data.findings_emitted,
            findings_total: report.data.findings_total,
            truncated_reason: report.data.truncated_reason.clone(),
        },
    }
}

fn renderable_finding(f: &Finding) -> RenderableFinding {
    RenderableFinding {
        severity: match f.severity {
            Severity::Info => RenderableSeverity::Info,
            Severity::Warning => RenderableSeverity::Warning,
            Severity::Error => RenderableSeverity::Error,
        },
        check_id: Some(f.check_id.clone()),
        code: f.code.clone(),
        message: f.message.clone(),
        location: f.location.as_ref().map(renderable_location),
        help: f.help.clone(),
        url: f.url.clone(),
    }
}

fn renderable_location(loc: &Location) -> RenderableLocation {
    let kind = match loc.kind {
        SubjectKind::Environment => "environment",
        SubjectKind::Segment => "segment",
    };
    RenderableLocation {
        subject: format!("{kind} {}", loc.id),
        parent: loc.parent.clone(),
        path: loc.path.as_ref().map(|p| p.as_str().to_string()),
    }
}

/// A failing report carrying a single `tool.runtime` finding, written when the run itself errors.
pub fn runtime_error_report(message: &str) -> TaxoguardReport {
    let now = OffsetDateTime::now_utc();
    TaxoguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at: now,
        finished_at: now,
        verdict: Verdict::Fail,
        findings: vec![Finding {
            severity: Severity::Error,
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            location: None,
            help: Some("Fix the tool error and re-run taxoguard.".to_string()),
            url: None,
            fingerprint: None,
            data: serde_json::Value::Null,
        }],
        rules: Vec::new(),
        data: TaxonomyData {
            profile: "unknown".to_string(),
            findings_total: 1,
            findings_emitted: 1,
            ..TaxonomyData::default()
        },
    }
}
