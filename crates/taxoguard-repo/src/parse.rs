use crate::schema::{catalog_schema, segment_document_schema};
use anyhow::Context;
use jsonschema::Validator;
use serde_json::Value;
use std::collections::BTreeMap;
use taxoguard_domain::model::{ComplianceRequirement, Segment};
use taxoguard_types::DocumentPath;

/// Compiled document schemas. Compile once per load and share across threads.
pub struct DocumentValidator {
    segment: Validator,
    catalog: Validator,
}

impl DocumentValidator {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            segment: compile(&segment_document_schema()).context("compile segment schema")?,
            catalog: compile(&catalog_schema()).context("compile catalog schema")?,
        })
    }
}

fn compile(schema: &Value) -> anyhow::Result<Validator> {
    jsonschema::draft7::new(schema).map_err(|e| anyhow::anyhow!("Failed to compile schema: {}", e))
}

fn check(validator: &Validator, path: &DocumentPath, value: &Value) -> anyhow::Result<()> {
    let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        return Ok(());
    }
    anyhow::bail!("{path}: schema validation failed: {}", errors.join("; "))
}

fn parse_yaml(path: &DocumentPath, text: &str) -> anyhow::Result<Value> {
    serde_yaml::from_str(text).with_context(|| format!("parse {path}"))
}

/// Parse one environment/segment document. A missing `id` defaults to the file stem.
pub fn parse_segment(
    validator: &DocumentValidator,
    path: &DocumentPath,
    text: &str,
) -> anyhow::Result<Segment> {
    let mut value = parse_yaml(path, text)?;
    check(&validator.segment, path, &value)?;

    if let Some(obj) = value.as_object_mut()
        && !obj.contains_key("id")
        && let Some(stem) = path.stem()
    {
        obj.insert("id".to_string(), Value::String(stem.to_string()));
    }

    let mut segment: Segment =
        serde_json::from_value(value).with_context(|| format!("decode {path}"))?;
    segment.source = Some(path.clone());
    Ok(segment)
}

/// Parse the compliance catalog. An empty document is an empty catalog.
pub fn parse_catalog(
    validator: &DocumentValidator,
    path: &DocumentPath,
    text: &str,
) -> anyhow::Result<BTreeMap<String, ComplianceRequirement>> {
    if text.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value = match parse_yaml(path, text)? {
        Value::Null => Value::Object(serde_json::Map::new()),
        v => v,
    };
    check(&validator.catalog, path, &value)?;
    serde_json::from_value(value).with_context(|| format!("decode {path}"))
}
