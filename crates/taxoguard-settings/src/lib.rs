//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{
    CheckConfig, ClassificationConfig, ComplianceConfig, DimensionConfig, PluginsConfig,
    RuleConfig, TaxoguardConfigV1,
};
pub use resolve::{Overrides, ResolvedConfig};

/// Default config file name, looked up at the taxonomy root.
pub const CONFIG_FILE_NAME: &str = "taxoguard.toml";

/// Parse `taxoguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<TaxoguardConfigV1> {
    let cfg: TaxoguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (profiles + overrides + per-check config).
pub fn resolve_config(
    cfg: TaxoguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
