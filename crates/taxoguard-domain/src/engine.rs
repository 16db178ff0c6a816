use crate::fingerprint::fingerprint_for_finding;
use crate::inheritance;
use crate::model::{Level, Taxonomy, TaxonomyInput};
use crate::plugins::PluginSet;
use crate::policy::{EffectiveConfig, FailOn};
use crate::problem::Problem;
use crate::report::{DomainReport, SeverityCounts};
use crate::rules::RuleSet;
use crate::xref;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::json;
use std::collections::BTreeMap;
use taxoguard_types::{
    Finding, RuleOutcome, RuleStatus, Severity, SubjectKind, TaxonomyData, Verdict, ids,
};
use tracing::{debug, warn};

/// Outcome of one run: the report, plus the resolved taxonomy when no problem survived.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub report: DomainReport,
    pub taxonomy: Option<Taxonomy>,
}

pub fn evaluate(input: TaxonomyInput, cfg: &EffectiveConfig) -> DomainReport {
    resolve(input, cfg).report
}

/// Load, validate and resolve a taxonomy.
///
/// Pipeline: finalize records -> inheritance -> label validation -> cross-references ->
/// logic rules. Every pass runs to completion and all problems are reported together.
pub fn resolve(input: TaxonomyInput, cfg: &EffectiveConfig) -> Resolution {
    let environments_scanned = input.environments.len() as u32;
    let segments_scanned = input.segments.len() as u32;

    let (mut taxonomy, load_problems) = load(input, cfg);
    debug!(
        environments = taxonomy.environments.len(),
        segments = taxonomy.segments.len(),
        rejected = load_problems.len(),
        "records loaded"
    );

    let plugins = PluginSet::from_config(cfg, &taxonomy.compliance_catalog);
    let inherited = inheritance::resolve(&mut taxonomy, &plugins);

    let label_problems = plugins.validate_all(&taxonomy);
    debug!(problems = label_problems.len(), "labels validated");

    let xref = xref::validate(&taxonomy);
    debug!(failures = xref.failures, "cross-references validated");

    let rule_results = RuleSet::from_config(cfg).evaluate(&taxonomy);

    let allowlists = build_allowlists(cfg);
    let convert = |p: Problem| to_finding(p, cfg, &allowlists, &taxonomy);

    let mut findings: Vec<Finding> = load_problems
        .into_iter()
        .chain(inherited.problems)
        .chain(label_problems)
        .chain(xref.problems)
        .filter_map(convert)
        .collect();

    let mut outcomes = Vec::with_capacity(rule_results.len());
    for result in rule_results {
        let before = findings.len();
        findings.extend(result.problems.into_iter().filter_map(convert));
        let problems = (findings.len() - before) as u32;
        debug!(rule = result.rule, problems, "rule evaluated");
        outcomes.push(RuleOutcome {
            rule: result.rule.to_string(),
            check_id: ids::rule_check_id(result.rule),
            status: if problems == 0 {
                RuleStatus::Pass
            } else {
                RuleStatus::Fail
            },
            problems,
        });
    }

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    // Truncation must not hide a failure.
    let verdict = compute_verdict(&findings, cfg.fail_on);
    // Any surviving problem invalidates the taxonomy, whatever its severity.
    let resolved = findings.is_empty();
    let total = findings.len() as u32;

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let counts = SeverityCounts::from_findings(&emitted);

    let data = TaxonomyData {
        profile: cfg.profile.clone(),
        environments_scanned,
        segments_scanned,
        compliance_requirements: taxonomy.compliance_catalog.len() as u32,
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        truncated_reason,
    };

    let report = DomainReport {
        verdict,
        findings: emitted,
        rules: outcomes,
        data,
        counts,
    };
    let taxonomy = resolved.then_some(taxonomy);
    Resolution { report, taxonomy }
}

/// Finalize and insert every record. Rejected records become `load.structure` problems.
fn load(input: TaxonomyInput, cfg: &EffectiveConfig) -> (Taxonomy, Vec<Problem>) {
    let ranking = |dimension: &str| {
        cfg.classification
            .dimensions
            .get(dimension)
            .map(|d| d.ranking().to_vec())
            .unwrap_or_default()
    };

    let mut taxonomy = Taxonomy {
        compliance_catalog: input.compliance_catalog,
        sensitivity_order: ranking("sensitivity"),
        criticality_order: ranking("criticality"),
        ..Taxonomy::default()
    };

    let records = input
        .environments
        .into_iter()
        .map(|s| (Level::Environment, s))
        .chain(input.segments.into_iter().map(|s| (Level::Segment, s)));

    let mut problems = Vec::new();
    for (level, mut record) in records {
        let source = record.source.clone();
        let accepted = record
            .finalize(level)
            .and_then(|()| taxonomy.insert(record));
        if let Err(err) = accepted {
            warn!(id = err.segment_id(), code = err.code(), "record rejected: {err}");
            problems.push(
                Problem::new(ids::CHECK_LOAD_STRUCTURE, err.code(), err.to_string())
                    .about(level.subject_kind(), err.segment_id())
                    .under(err.parent())
                    .at(source)
                    .help("Fix the record; it was left out of the taxonomy.")
                    .data(json!({ "level": level.as_str() })),
            );
        }
    }
    (taxonomy, problems)
}

fn build_allowlists(cfg: &EffectiveConfig) -> BTreeMap<String, GlobSet> {
    let mut out = BTreeMap::new();
    for (check_id, policy) in &cfg.checks {
        if policy.allow.is_empty() {
            continue;
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &policy.allow {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => warn!(check_id = %check_id, pattern = %pattern, "invalid allow glob: {err}"),
            }
        }
        match builder.build() {
            Ok(set) => {
                out.insert(check_id.clone(), set);
            }
            Err(err) => warn!(check_id = %check_id, "allowlist ignored: {err}"),
        }
    }
    out
}

fn to_finding(
    problem: Problem,
    cfg: &EffectiveConfig,
    allowlists: &BTreeMap<String, GlobSet>,
    taxonomy: &Taxonomy,
) -> Option<Finding> {
    // Structural rejections cannot be disabled or allowlisted.
    let severity = if problem.check_id == ids::CHECK_LOAD_STRUCTURE {
        Severity::Error
    } else {
        let severity = cfg.severity_for(&problem.check_id)?;
        if let (Some(allow), Some(id)) = (allowlists.get(&problem.check_id), problem.subject_id())
            && allow.is_match(id)
        {
            return None;
        }
        severity
    };

    let mut location = problem.subject;
    if let Some(loc) = location.as_mut()
        && loc.path.is_none()
    {
        loc.path = taxonomy
            .entity(loc.kind, &loc.id)
            .and_then(|s| s.source.clone());
    }

    let fingerprint =
        fingerprint_for_finding(&problem.check_id, problem.code, location.as_ref(), &problem.data);

    Some(Finding {
        severity,
        check_id: problem.check_id,
        code: problem.code.to_string(),
        message: problem.message,
        location,
        help: problem.help.map(str::to_string),
        url: None,
        fingerprint: Some(fingerprint),
        data: problem.data,
    })
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> Verdict {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return Verdict::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Error => Verdict::Warn,
        };
    }

    Verdict::Pass
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (error -> warning -> info)
    // 2) location.path (missing last)
    // 3) subject kind, id, parent (missing last)
    // 4) check_id
    // 5) code
    // 6) message
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let subject = |f: &Finding| match &f.location {
        Some(l) => (
            l.path.as_ref().map_or("~", |p| p.as_str()).to_string(),
            Some(l.kind),
            l.id.clone(),
            l.parent.clone().unwrap_or_else(|| "~".to_string()),
        ),
        None => ("~".to_string(), None, "~".to_string(), "~".to_string()),
    };
    let (ap, ak, ai, apar) = subject(a);
    let (bp, bk, bi, bpar) = subject(b);
    let kind_rank = |k: Option<SubjectKind>| k.map_or(2, |k| k as u8);

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(ap.cmp(&bp))
        .then(kind_rank(ak).cmp(&kind_rank(bk)))
        .then(ai.cmp(&bi))
        .then(apar.cmp(&bpar))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}
