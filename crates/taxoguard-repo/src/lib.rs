//! Repository adapters: discover taxonomy documents, parse YAML, validate against schemas.
//!
//! This crate is allowed to do filesystem IO. Everything it hands to the engine has already
//! passed schema validation.

#![forbid(unsafe_code)]

mod discover;
mod parse;
mod schema;

use anyhow::Context;
use camino::Utf8Path;
use rayon::prelude::*;
use std::collections::BTreeMap;
use taxoguard_domain::model::{Segment, TaxonomyInput};
use taxoguard_types::DocumentPath;
use tracing::{debug, info};

pub use discover::{ENVIRONMENTS_DIR, SEGMENTS_DIR, TaxonomyDocuments, discover_documents};
pub use parse::{DocumentValidator, parse_catalog, parse_segment};
pub use schema::{CATALOG_SCHEMA_ID, SEGMENT_SCHEMA_ID, catalog_schema, segment_document_schema};

/// Load every document under `root` into engine input.
///
/// Documents are parsed in parallel; records come back in path order. Every unreadable or
/// schema-invalid document is reported in one error.
pub fn load_taxonomy(root: &Utf8Path) -> anyhow::Result<TaxonomyInput> {
    let docs = discover_documents(root).context("discover taxonomy documents")?;
    debug!(
        environments = docs.environments.len(),
        segments = docs.segments.len(),
        catalog = docs.catalog.is_some(),
        "documents discovered"
    );

    let validator = DocumentValidator::new()?;

    let environments = parse_all(root, &docs.environments, &validator);
    let segments = parse_all(root, &docs.segments, &validator);
    let compliance_catalog = match &docs.catalog {
        Some(path) => read(root, path)
            .and_then(|text| parse_catalog(&validator, path, &text))
            .map_err(|e| vec![e]),
        None => Ok(BTreeMap::new()),
    };

    let (environments, segments, compliance_catalog) =
        match (environments, segments, compliance_catalog) {
            (Ok(e), Ok(s), Ok(c)) => (e, s, c),
            (e, s, c) => {
                let errors: Vec<String> = [e.err(), s.err(), c.err()]
                    .into_iter()
                    .flatten()
                    .flatten()
                    .map(|err| format!("{err:#}"))
                    .collect();
                anyhow::bail!(
                    "{} invalid taxonomy document(s):\n{}",
                    errors.len(),
                    errors.join("\n")
                );
            }
        };

    info!(
        environments = environments.len(),
        segments = segments.len(),
        requirements = compliance_catalog.len(),
        "taxonomy loaded"
    );

    Ok(TaxonomyInput {
        environments,
        segments,
        compliance_catalog,
    })
}

fn read(root: &Utf8Path, path: &DocumentPath) -> anyhow::Result<String> {
    let abs = root.join(path.to_utf8_pathbuf());
    std::fs::read_to_string(&abs).with_context(|| format!("read {abs}"))
}

fn parse_all(
    root: &Utf8Path,
    paths: &[DocumentPath],
    validator: &DocumentValidator,
) -> Result<Vec<Segment>, Vec<anyhow::Error>> {
    // Indexed parallel collect keeps path order.
    let results: Vec<anyhow::Result<Segment>> = paths
        .par_iter()
        .map(|path| read(root, path).and_then(|text| parse_segment(validator, path, &text)))
        .collect();

    let mut records = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(segment) => records.push(segment),
            Err(err) => errors.push(err),
        }
    }
    if errors.is_empty() {
        Ok(records)
    } else {
        Err(errors)
    }
}
