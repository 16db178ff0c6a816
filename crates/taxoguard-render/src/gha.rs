use crate::{RenderableFinding, RenderableReport, RenderableSeverity};

/// Render findings as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} file={path}::[{check_id}:{code}] {subject}: {message}`
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    let mut out = Vec::new();

    for f in &report.findings {
        let level = match f.severity {
            RenderableSeverity::Error => "error",
            RenderableSeverity::Warning => "warning",
            RenderableSeverity::Info => "notice",
        };

        let meta = f
            .location
            .as_ref()
            .and_then(|loc| loc.path.as_deref())
            .map(|path| format!("file={}", escape_property(path)))
            .unwrap_or_default();

        let check_id = f.check_id.as_deref().unwrap_or("taxoguard");
        let message = escape_data(&format!(
            "[{}:{}] {}{}",
            check_id,
            f.code,
            subject_prefix(f),
            f.message
        ));

        if meta.is_empty() {
            out.push(format!("::{}::{}", level, message));
        } else {
            out.push(format!("::{} {}::{}", level, meta, message));
        }
    }

    out
}

fn subject_prefix(f: &RenderableFinding) -> String {
    match &f.location {
        Some(loc) => match &loc.parent {
            Some(parent) => format!("{} (under {}): ", loc.subject, parent),
            None => format!("{}: ", loc.subject),
        },
        None => String::new(),
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableData, RenderableLocation, RenderableVerdictStatus};

    fn report(findings: Vec<RenderableFinding>) -> RenderableReport {
        RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            findings,
            rules: Vec::new(),
            data: RenderableData {
                profile: "strict".to_string(),
                environments_scanned: 1,
                segments_scanned: 1,
                findings_emitted: 1,
                findings_total: 1,
                truncated_reason: None,
            },
        }
    }

    fn finding(location: Option<RenderableLocation>) -> RenderableFinding {
        RenderableFinding {
            severity: RenderableSeverity::Error,
            check_id: Some("xref.compliance".to_string()),
            code: "unknown_compliance_reference".to_string(),
            message: "unknown requirement 'hipaa'".to_string(),
            location,
            help: None,
            url: None,
        }
    }

    #[test]
    fn annotation_points_at_document_and_names_subject() {
        let out = render_github_annotations(&report(vec![finding(Some(RenderableLocation {
            subject: "segment payments".to_string(),
            parent: Some("prod".to_string()),
            path: Some("segments/payments.yaml".to_string()),
        }))]));
        assert_eq!(
            out,
            vec![
                "::error file=segments/payments.yaml::[xref.compliance:unknown_compliance_reference] segment payments (under prod): unknown requirement 'hipaa'"
                    .to_string()
            ]
        );
    }

    #[test]
    fn annotation_without_location_has_no_properties() {
        let mut f = finding(None);
        f.severity = RenderableSeverity::Info;
        f.check_id = None;
        f.message = "50% done\nnext line".to_string();
        let out = render_github_annotations(&report(vec![f]));
        assert_eq!(
            out,
            vec!["::notice::[taxoguard:unknown_compliance_reference] 50%25 done%0Anext line".to_string()]
        );
    }

    #[test]
    fn location_without_path_keeps_subject() {
        let mut f = finding(Some(RenderableLocation {
            subject: "environment prod".to_string(),
            parent: None,
            path: None,
        }));
        f.severity = RenderableSeverity::Warning;
        let out = render_github_annotations(&report(vec![f]));
        assert!(out[0].starts_with("::warning::"));
        assert!(out[0].contains("environment prod: unknown"));
    }
}
