use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of a taxonomy document, relative to the taxonomy root.
///
/// Normalization rules:
/// - always forward slashes (`/`)
/// - no leading `./`
/// - an empty input becomes `.`
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl Default for DocumentPath {
    fn default() -> Self {
        DocumentPath::new(".")
    }
}

impl DocumentPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while let Some(rest) = v.strip_prefix("./") {
            v = rest.to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    /// Relativize `abs` against `root`; falls back to `abs` itself when it lies outside `root`.
    pub fn relative_to(root: &Utf8Path, abs: &Utf8Path) -> Self {
        match abs.strip_prefix(root) {
            Ok(rel) => DocumentPath::new(rel.as_str()),
            Err(_) => DocumentPath::new(abs.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without extension (`segments/web.yaml` -> `web`).
    pub fn stem(&self) -> Option<&str> {
        Utf8Path::new(&self.0).file_stem()
    }

    pub fn to_utf8_pathbuf(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.0.clone())
    }
}

impl From<&Utf8Path> for DocumentPath {
    fn from(value: &Utf8Path) -> Self {
        DocumentPath::new(value.as_str())
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
