use crate::model::{
    ClassificationConfig, ComplianceConfig, DimensionConfig, RuleConfig, TaxoguardConfigV1,
};
use crate::presets;
use anyhow::Context;
use globset::Glob;
use std::collections::BTreeMap;
use taxoguard_domain::policy::{CheckPolicy, Dimension, EffectiveConfig, FailOn};
use taxoguard_types::{Severity, ids};

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub max_findings: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: TaxoguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());
    if !presets::is_known_profile(&profile) {
        anyhow::bail!("unknown profile: {profile} (expected 'strict' or 'warn')");
    }

    let mut effective = presets::preset(&profile);

    // max findings
    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    if let Some(cc) = &cfg.plugins.classification {
        apply_classification(&mut effective, cc).context("invalid [plugins.classification]")?;
    }
    if let Some(cc) = &cfg.plugins.compliance {
        apply_compliance(&mut effective, cc).context("invalid [plugins.compliance]")?;
    }

    for (rule, rc) in cfg.rules.iter() {
        apply_rule(&mut effective, rule, rc).with_context(|| format!("invalid [rules.{rule}]"))?;
    }

    // per-check overrides
    for (check_id, cc) in cfg.checks.iter() {
        if check_id == ids::CHECK_LOAD_STRUCTURE {
            anyhow::bail!("{check_id} cannot be configured");
        }
        let entry = effective
            .checks
            .entry(check_id.clone())
            .or_insert_with(CheckPolicy::disabled);

        if let Some(enabled) = cc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = cc.severity.as_deref() {
            entry.severity =
                parse_severity(sev).with_context(|| format!("invalid severity for {check_id}"))?;
        }
        if !cc.allow.is_empty() {
            validate_allowlist(check_id, &cc.allow)?;
            entry.allow = cc.allow.clone();
        }
    }

    // fail_on override from config
    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        effective.fail_on = parse_fail_on(fail_on_s)?;
    }

    Ok(ResolvedConfig { effective })
}

fn apply_classification(
    effective: &mut EffectiveConfig,
    cc: &ClassificationConfig,
) -> anyhow::Result<()> {
    let policy = &mut effective.classification;
    if let Some(enabled) = cc.enabled {
        policy.enabled = enabled;
    }
    if let Some(ns) = &cc.namespace {
        policy.namespace = parse_namespace(ns)?;
    }
    if let Some(min) = cc.min_rationale_length {
        policy.min_rationale_length = min as usize;
    }
    if !cc.dimensions.is_empty() {
        policy.dimensions = cc
            .dimensions
            .iter()
            .map(|(name, dc)| {
                parse_dimension(dc)
                    .with_context(|| format!("dimension {name}"))
                    .map(|d| (name.clone(), d))
            })
            .collect::<anyhow::Result<BTreeMap<_, _>>>()?;
    }
    Ok(())
}

fn parse_dimension(dc: &DimensionConfig) -> anyhow::Result<Dimension> {
    if !dc.values.is_empty()
        && let Some(stray) = dc.order.iter().find(|v| !dc.values.contains(*v))
    {
        anyhow::bail!("order lists {stray:?}, which is not an allowed value");
    }
    Ok(Dimension {
        values: dc.values.clone(),
        order: dc.order.clone(),
    })
}

fn apply_compliance(effective: &mut EffectiveConfig, cc: &ComplianceConfig) -> anyhow::Result<()> {
    let policy = &mut effective.compliance;
    if let Some(enabled) = cc.enabled {
        policy.enabled = enabled;
    }
    if let Some(ns) = &cc.namespace {
        policy.namespace = parse_namespace(ns)?;
    }
    if let Some(reqs) = &cc.requirements {
        policy.requirements = reqs.clone();
    }
    if let Some(min) = cc.min_rationale_length {
        policy.min_rationale_length = min as usize;
    }
    if let Some(enforce) = cc.enforce_hierarchy {
        policy.enforce_hierarchy = enforce;
    }
    Ok(())
}

fn apply_rule(effective: &mut EffectiveConfig, rule: &str, rc: &RuleConfig) -> anyhow::Result<()> {
    let Some(policy) = effective.rules.get_mut(rule) else {
        anyhow::bail!(
            "unknown rule: {rule} (expected {} or {})",
            ids::RULE_SHARED_SERVICE,
            ids::RULE_UNIQUENESS
        );
    };
    if let Some(enabled) = rc.enabled {
        policy.enabled = enabled;
    }
    if !rc.keys.is_empty() {
        if rule != ids::RULE_UNIQUENESS {
            anyhow::bail!("`keys` only applies to the {} rule", ids::RULE_UNIQUENESS);
        }
        policy.keys = rc.keys.clone();
    }
    if let Some(sev) = rc.severity.as_deref() {
        let check = effective
            .checks
            .entry(ids::rule_check_id(rule))
            .or_insert_with(CheckPolicy::disabled);
        check.severity = parse_severity(sev)?;
        check.enabled = true;
    }
    Ok(())
}

fn parse_namespace(ns: &str) -> anyhow::Result<String> {
    if ns.is_empty() || ns.contains('/') || ns.contains(':') {
        anyhow::bail!("namespace {ns:?} must be non-empty and contain no '/' or ':'");
    }
    Ok(ns.to_string())
}

fn validate_allowlist(check_id: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern)
            .with_context(|| format!("invalid allow glob for {check_id}: {pattern}"))?;
    }
    Ok(())
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => anyhow::bail!("unknown severity: {other} (expected info|warning|error)"),
    }
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}
