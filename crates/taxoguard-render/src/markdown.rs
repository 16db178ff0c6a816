use crate::{RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Taxoguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Profile: `{}`\n- Scanned: {} environment(s), {} segment(s)\n- Findings: {} (emitted) / {} (total)\n\n",
        verdict,
        report.data.profile,
        report.data.environments_scanned,
        report.data.segments_scanned,
        report.data.findings_emitted,
        report.data.findings_total
    ));

    if let Some(r) = &report.data.truncated_reason {
        out.push_str(&format!("> Note: {}\n\n", r));
    }

    if !report.rules.is_empty() {
        out.push_str("## Rules\n\n");
        out.push_str("| Rule | Status | Problems |\n");
        out.push_str("| --- | --- | --- |\n");
        for rule in &report.rules {
            out.push_str(&format!(
                "| `{}` | {} | {} |\n",
                rule.rule,
                if rule.passed { "pass" } else { "fail" },
                rule.problems
            ));
        }
        out.push('\n');
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let sev = match f.severity {
            RenderableSeverity::Info => "INFO",
            RenderableSeverity::Warning => "WARN",
            RenderableSeverity::Error => "ERROR",
        };

        out.push_str(&format!(
            "- [{}] `{}` / `{}`: {}",
            sev,
            f.check_id.as_deref().unwrap_or(""),
            f.code,
            f.message
        ));
        if let Some(loc) = &f.location {
            out.push_str(&format!(" ({}", loc.subject));
            if let Some(parent) = &loc.parent {
                out.push_str(&format!(" under `{}`", parent));
            }
            if let Some(path) = &loc.path {
                out.push_str(&format!(", `{}`", path));
            }
            out.push(')');
        }
        out.push('\n');

        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {}\n", help));
        }
        if let Some(url) = &f.url {
            out.push_str(&format!("  - url: {}\n", url));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableData, RenderableFinding, RenderableLocation, RenderableRule};

    fn data(emitted: u32, total: u32, truncated: Option<&str>) -> RenderableData {
        RenderableData {
            profile: "strict".to_string(),
            environments_scanned: 2,
            segments_scanned: 3,
            findings_emitted: emitted,
            findings_total: total,
            truncated_reason: truncated.map(str::to_string),
        }
    }

    #[test]
    fn renders_empty_report() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Pass,
            findings: Vec::new(),
            rules: Vec::new(),
            data: data(0, 0, None),
        };
        let md = render_markdown(&report);
        assert!(md.starts_with("# Taxoguard report"));
        assert!(md.contains("Scanned: 2 environment(s), 3 segment(s)"));
        assert!(md.contains("No findings"));
        assert!(!md.contains("## Rules"));
    }

    #[test]
    fn renders_rules_findings_help_url_and_truncation() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            findings: vec![RenderableFinding {
                severity: RenderableSeverity::Error,
                check_id: Some("rule.shared_service".to_string()),
                code: "sensitivity_not_maximal".to_string(),
                message: "sensitivity is 'medium', expected 'high'".to_string(),
                location: Some(RenderableLocation {
                    subject: "segment shared-service".to_string(),
                    parent: None,
                    path: Some("segments/shared-service.yaml".to_string()),
                }),
                help: Some("raise the label".to_string()),
                url: Some("https://example.com/docs".to_string()),
            }],
            rules: vec![
                RenderableRule {
                    rule: "shared_service".to_string(),
                    passed: false,
                    problems: 1,
                },
                RenderableRule {
                    rule: "uniqueness".to_string(),
                    passed: true,
                    problems: 0,
                },
            ],
            data: data(1, 2, Some("truncated")),
        };

        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **FAIL**"));
        assert!(md.contains("> Note: truncated"));
        assert!(md.contains("| `shared_service` | fail | 1 |"));
        assert!(md.contains("| `uniqueness` | pass | 0 |"));
        assert!(md.contains("## Findings"));
        assert!(md.contains("[ERROR]"));
        assert!(md.contains("(segment shared-service, `segments/shared-service.yaml`)"));
        assert!(md.contains("help: raise the label"));
        assert!(md.contains("url: https://example.com/docs"));
    }

    #[test]
    fn renders_parent_scope_and_no_location() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Warn,
            findings: vec![
                RenderableFinding {
                    severity: RenderableSeverity::Warning,
                    check_id: Some("plugin.compliance".to_string()),
                    code: "rationale_too_short".to_string(),
                    message: "too short".to_string(),
                    location: Some(RenderableLocation {
                        subject: "segment payments".to_string(),
                        parent: Some("prod".to_string()),
                        path: None,
                    }),
                    help: None,
                    url: None,
                },
                RenderableFinding {
                    severity: RenderableSeverity::Info,
                    check_id: None,
                    code: "info".to_string(),
                    message: "note".to_string(),
                    location: None,
                    help: None,
                    url: None,
                },
            ],
            rules: Vec::new(),
            data: data(2, 2, None),
        };

        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **WARN**"));
        assert!(md.contains("(segment payments under `prod`)"));
        assert!(md.contains("- [INFO] `` / `info`: note\n"));
    }
}
