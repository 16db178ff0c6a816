//! Label codec: `key:value` / `namespace/key:value` strings to flat and namespaced maps.
//!
//! The raw list is the source of truth. Both maps are derived views and are only ever
//! rebuilt from it (or extended by appending to it).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// `"[namespace/]key"` -> value.
pub type FlatLabels = BTreeMap<String, String>;

/// namespace -> (key -> value).
pub type NamespacedLabels = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("label {label:?} has no ':' separating key and value")]
pub struct LabelError {
    pub label: String,
}

/// Split a label on its first colon; values may contain further colons.
pub fn split_label(label: &str) -> Result<(&str, &str), LabelError> {
    label.split_once(':').ok_or_else(|| LabelError {
        label: label.to_string(),
    })
}

/// `ns/key` -> `Some(("ns", "key"))`. Keys with zero or several slashes have no namespace.
pub fn split_namespace(key: &str) -> Option<(&str, &str)> {
    let (namespace, rest) = key.split_once('/')?;
    if rest.contains('/') {
        return None;
    }
    Some((namespace, rest))
}

/// Decode an ordered label list. Later duplicates of a key win.
pub fn decode(raw: &[String]) -> Result<(FlatLabels, NamespacedLabels), LabelError> {
    let mut flat = FlatLabels::new();
    let mut namespaced = NamespacedLabels::new();
    for label in raw {
        let (key, value) = split_label(label)?;
        if let Some((namespace, inner)) = split_namespace(key) {
            namespaced
                .entry(namespace.to_string())
                .or_default()
                .insert(inner.to_string(), value.to_string());
        }
        flat.insert(key.to_string(), value.to_string());
    }
    Ok((flat, namespaced))
}

/// Encode a flat map back into label strings, in key order.
pub fn encode(flat: &FlatLabels) -> Vec<String> {
    flat.iter().map(|(k, v)| format!("{k}:{v}")).collect()
}

/// An ordered label list together with its derived views.
///
/// Deserializes from (and serializes to) the plain list of strings. A freshly deserialized
/// value has empty views until [`Labels::refresh`] runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Labels {
    raw: Vec<String>,
    parsed: FlatLabels,
    namespaced: NamespacedLabels,
}

impl From<Vec<String>> for Labels {
    fn from(raw: Vec<String>) -> Self {
        Labels {
            raw,
            parsed: FlatLabels::new(),
            namespaced: NamespacedLabels::new(),
        }
    }
}

impl From<Labels> for Vec<String> {
    fn from(labels: Labels) -> Self {
        labels.raw
    }
}

impl Labels {
    pub fn parse<I, S>(raw: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels = Labels::from(raw.into_iter().map(Into::into).collect::<Vec<_>>());
        labels.refresh()?;
        Ok(labels)
    }

    /// Rebuild both views from the raw list.
    pub fn refresh(&mut self) -> Result<(), LabelError> {
        let (parsed, namespaced) = decode(&self.raw)?;
        self.parsed = parsed;
        self.namespaced = namespaced;
        Ok(())
    }

    /// Append `namespace/key:value` to the raw list and extend the views accordingly.
    pub fn append(&mut self, namespace: &str, key: &str, value: &str) {
        let flat_key = format!("{namespace}/{key}");
        self.raw.push(format!("{flat_key}:{value}"));
        if split_namespace(&flat_key).is_some() {
            self.namespaced
                .entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
        }
        self.parsed.insert(flat_key, value.to_string());
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn parsed(&self) -> &FlatLabels {
        &self.parsed
    }

    pub fn namespaced(&self) -> &NamespacedLabels {
        &self.namespaced
    }

    pub fn namespace(&self, namespace: &str) -> Option<&BTreeMap<String, String>> {
        self.namespaced.get(namespace)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.parsed.get(key).map(String::as_str)
    }

    pub fn get_in(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespaced
            .get(namespace)
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
