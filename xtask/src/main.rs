//! Developer tasks (schema generation, fixture conformance, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use camino::Utf8Path;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixtures whose name starts with this prefix must fail to load.
const INVALID_FIXTURE_PREFIX: &str = "invalid_";

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> serde_json::Value,
}

fn generate_report_schema() -> serde_json::Value {
    schema_for!(taxoguard_types::TaxoguardReport).to_value()
}

fn generate_config_schema() -> serde_json::Value {
    schema_for!(taxoguard_settings::TaxoguardConfigV1).to_value()
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "taxoguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "taxoguard.config.v1.json",
            generate: generate_config_schema,
        },
        SchemaSpec {
            filename: "taxoguard.segment.v1.json",
            generate: taxoguard_repo::segment_document_schema,
        },
        SchemaSpec {
            filename: "taxoguard.compliance.v1.json",
            generate: taxoguard_repo::catalog_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &serde_json::Value) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

/// Emit schemas to the schemas/ directory.
fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);

        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;

        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);

        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {}", name);
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

/// Check every taxonomy fixture:
/// 1. Documents load (or fail to load, for `invalid_*` fixtures).
/// 2. `taxoguard.toml`, when present, validates against the generated config schema.
fn conform() -> anyhow::Result<()> {
    let config_schema = generate_config_schema();
    let config_validator = jsonschema::draft7::new(&config_schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile config schema: {}", e))?;

    let dir = fixtures_dir();
    let mut entries: Vec<PathBuf> = fs::read_dir(&dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();

    let mut errors = Vec::new();
    for path in &entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(root) = Utf8Path::from_path(path) else {
            errors.push(format!("{name}: fixture path is not UTF-8"));
            continue;
        };

        let loaded = taxoguard_repo::load_taxonomy(root);
        match (name.starts_with(INVALID_FIXTURE_PREFIX), loaded) {
            (false, Err(err)) => errors.push(format!("{name}: {err:#}")),
            (true, Ok(_)) => errors.push(format!("{name}: expected documents to be rejected")),
            _ => {}
        }

        let cfg_path = root.join(taxoguard_settings::CONFIG_FILE_NAME);
        if cfg_path.exists() {
            let text = fs::read_to_string(&cfg_path)
                .with_context(|| format!("Failed to read {}", cfg_path))?;
            let value: serde_json::Value = toml::from_str(&text)
                .with_context(|| format!("Failed to parse {}", cfg_path))?;
            for err in config_validator.iter_errors(&value) {
                errors.push(format!("{name}: taxoguard.toml: {err}"));
            }
        }

        println!("  fixture '{}' checked", name);
    }

    if errors.is_empty() {
        println!("\n{} fixtures conform.", entries.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!("Fixture conformance failed with {} errors", errors.len())
    }
}

/// Validate that all check IDs and codes have explanations.
fn explain_coverage() -> anyhow::Result<()> {
    let check_ids = taxoguard_types::explain::all_check_ids();
    let codes = taxoguard_types::explain::all_codes();

    let mut errors = Vec::new();
    for (kind, identifier) in check_ids
        .iter()
        .map(|id| ("Check ID", id))
        .chain(codes.iter().map(|code| ("Code", code)))
    {
        match taxoguard_types::explain::lookup_explanation(identifier) {
            Some(exp) => {
                if exp.title.is_empty() {
                    errors.push(format!("{kind} '{identifier}' has empty title"));
                }
                if exp.description.is_empty() {
                    errors.push(format!("{kind} '{identifier}' has empty description"));
                }
                if exp.remediation.is_empty() {
                    errors.push(format!("{kind} '{identifier}' has empty remediation"));
                }
            }
            None => errors.push(format!("{kind} '{identifier}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} check IDs have explanations", check_ids.len());
        println!("✓ {} codes have explanations", codes.len());
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!(
            "Explain coverage validation failed with {} errors",
            errors.len()
        )
    }
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Check tests/fixtures taxonomies and their configs");
    eprintln!("  explain-coverage  Validate all check IDs and codes have explanations");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
