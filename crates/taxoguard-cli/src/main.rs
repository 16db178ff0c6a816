//! CLI entry point for taxoguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `taxoguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use taxoguard_app::{
    CheckInput, CheckOutput, ExplainOutput, ExportOutcome, export_taxonomy, parse_report_json,
    render_annotations, render_markdown, run_check, run_explain, runtime_error_report,
    serialize_report, to_renderable, verdict_exit_code,
};
use taxoguard_settings::{CONFIG_FILE_NAME, Overrides};
use taxoguard_types::TaxoguardReport;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "taxoguard",
    version,
    about = "Taxonomy inheritance and policy guard for environment/segment catalogs"
)]
struct Cli {
    /// Taxonomy root (directory containing `environments/` and `segments/`).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Path to taxoguard config TOML, relative to the taxonomy root.
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: Utf8PathBuf,

    /// Override profile (strict|warn).
    #[arg(long)]
    profile: Option<String>,

    /// Override maximum findings to emit.
    #[arg(long)]
    max_findings: Option<u32>,

    /// Log pipeline progress to stderr (same as RUST_LOG=debug).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the taxonomy, evaluate policy, and write artifacts.
    Check {
        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/taxoguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/taxoguard/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Write the resolved taxonomy as JSON (fails when the taxonomy does not resolve).
    Export {
        /// Where to write the JSON (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/taxoguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/taxoguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "rule.shared_service") or code (e.g., "duplicate_value").
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Check {
            ref report_out,
            write_markdown,
            ref markdown_out,
        } => cmd_check(&cli, report_out, write_markdown.then_some(markdown_out.as_path())),
        Commands::Export { ref output } => cmd_export(&cli, output.as_deref()),
        Commands::Md { report, output } => cmd_md(report, output),
        Commands::Annotations { report, max } => cmd_annotations(report, max),
        Commands::Explain { identifier } => cmd_explain(&identifier),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load config, resolve the taxonomy and evaluate policy.
fn check(cli: &Cli) -> anyhow::Result<CheckOutput> {
    let root = cli
        .root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.root.clone());
    if !root.is_dir() {
        anyhow::bail!("taxonomy root does not exist: {}", root);
    }

    // Missing config file is allowed (defaults apply).
    let cfg_path = root.join(&cli.config);
    let cfg_text = match std::fs::read_to_string(&cfg_path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %cfg_path, "no config file, using defaults");
            String::new()
        }
        Err(err) => return Err(err).with_context(|| format!("read config: {}", cfg_path)),
    };

    run_check(CheckInput {
        taxonomy_root: &root,
        config_text: &cfg_text,
        overrides: Overrides {
            profile: cli.profile.clone(),
            max_findings: cli.max_findings,
        },
    })
}

fn cmd_check(
    cli: &Cli,
    report_out: &Utf8Path,
    markdown_out: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let output = check(cli)?;

        write_report_file(report_out, &output.report).context("write report json")?;

        if let Some(md_path) = markdown_out {
            let md = render_markdown(&to_renderable(&output.report));
            write_text_file(md_path, &md).context("write markdown")?;
        }

        Ok(verdict_exit_code(output.report.verdict))
    })();

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            let _ = write_report_file(report_out, &report);
            eprintln!("taxoguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_export(cli: &Cli, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let result = (|| -> anyhow::Result<i32> {
        let checked = check(cli)?;
        match export_taxonomy(&checked)? {
            ExportOutcome::Resolved(json) => {
                match output {
                    Some(path) => write_bytes_file(path, &json).context("write taxonomy json")?,
                    None => print!("{}", String::from_utf8_lossy(&json)),
                }
                Ok(0)
            }
            ExportOutcome::Unresolved { problems } => {
                eprintln!(
                    "taxoguard: taxonomy did not resolve ({problems} finding(s)); run `taxoguard check` for the report"
                );
                for f in &checked.report.findings {
                    eprintln!("  [{}:{}] {}", f.check_id, f.code, f.message);
                }
                Ok(2)
            }
        }
    })();

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("taxoguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn write_report_file(path: &Utf8Path, report: &TaxoguardReport) -> anyhow::Result<()> {
    let data = serialize_report(report).context("serialize report")?;
    write_bytes_file(path, &data)
}

fn write_bytes_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, data).with_context(|| format!("write file: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    write_bytes_file(path, text.as_bytes())
}

fn cmd_md(report_path: Utf8PathBuf, output: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&to_renderable(&report));

    if let Some(out_path) = output {
        write_text_file(&out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn cmd_annotations(report_path: Utf8PathBuf, max: usize) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;

    for annotation in render_annotations(&to_renderable(&report), max) {
        println!("{}", annotation);
    }

    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", taxoguard_app::format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                taxoguard_app::format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}
