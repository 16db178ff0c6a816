use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;
use taxoguard_types::DocumentPath;
use walkdir::WalkDir;

pub const ENVIRONMENTS_DIR: &str = "environments";
pub const SEGMENTS_DIR: &str = "segments";
const CATALOG_NAMES: [&str; 2] = ["compliance.yaml", "compliance.yml"];

/// Repo-relative paths of every document that makes up a taxonomy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaxonomyDocuments {
    pub environments: Vec<DocumentPath>,
    pub segments: Vec<DocumentPath>,
    pub catalog: Option<DocumentPath>,
}

impl TaxonomyDocuments {
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty() && self.segments.is_empty() && self.catalog.is_none()
    }
}

/// Discover taxonomy documents under `root`.
///
/// Behavior:
/// - `environments/**/*.yaml|yml` are level "1" records, `segments/**/*.yaml|yml` level "2".
/// - The compliance catalog is `compliance.yaml` (or `.yml`) at the root; having both is an error.
/// - Hidden files and directories are skipped. Paths come back sorted.
pub fn discover_documents(root: &Utf8Path) -> anyhow::Result<TaxonomyDocuments> {
    if !root.is_dir() {
        anyhow::bail!("taxonomy root {root} is not a directory");
    }

    let catalogs: Vec<DocumentPath> = CATALOG_NAMES
        .iter()
        .filter(|name| root.join(name).is_file())
        .map(DocumentPath::new)
        .collect();
    if catalogs.len() > 1 {
        anyhow::bail!("both compliance.yaml and compliance.yml exist in {root}");
    }

    Ok(TaxonomyDocuments {
        environments: yaml_files(root, ENVIRONMENTS_DIR).context("discover environments")?,
        segments: yaml_files(root, SEGMENTS_DIR).context("discover segments")?,
        catalog: catalogs.into_iter().next(),
    })
}

fn yaml_files(root: &Utf8Path, dir: &str) -> anyhow::Result<Vec<DocumentPath>> {
    let base = root.join(dir);
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let walker = WalkDir::new(&base)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {base}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(abs) = pathbuf_to_utf8(entry.path().to_path_buf()) else {
            anyhow::bail!("non UTF-8 path under {base}: {}", entry.path().display());
        };
        if matches!(abs.extension(), Some("yaml" | "yml")) {
            out.push(DocumentPath::relative_to(root, &abs));
        }
    }

    // Stable order.
    out.sort();
    out.dedup();

    Ok(out)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
