use sha2::{Digest, Sha256};
use taxoguard_types::Location;

/// Compute a stable SHA-256 fingerprint for a finding.
///
/// Identity fields:
/// - check_id
/// - code
/// - subject kind and ID (if present)
/// - parent environment (if present)
/// - the structured payload, serialized with sorted keys
pub fn fingerprint_for_finding(
    check_id: &str,
    code: &str,
    subject: Option<&Location>,
    data: &serde_json::Value,
) -> String {
    let payload = data.to_string();
    let mut parts = vec![check_id, code];
    if let Some(loc) = subject {
        parts.push(match loc.kind {
            taxoguard_types::SubjectKind::Environment => "environment",
            taxoguard_types::SubjectKind::Segment => "segment",
        });
        parts.push(&loc.id);
        if let Some(parent) = &loc.parent {
            parts.push(parent);
        }
    }
    parts.push(&payload);
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taxoguard_types::SubjectKind;

    fn loc(id: &str, parent: Option<&str>) -> Location {
        Location {
            kind: SubjectKind::Segment,
            id: id.to_string(),
            parent: parent.map(str::to_string),
            path: None,
        }
    }

    #[test]
    fn stable_and_hex_encoded() {
        let a = fingerprint_for_finding("xref.parent", "x", Some(&loc("app", None)), &json!({}));
        let b = fingerprint_for_finding("xref.parent", "x", Some(&loc("app", None)), &json!({}));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn parent_changes_identity() {
        let a = fingerprint_for_finding("c", "x", Some(&loc("app", Some("prod"))), &json!(null));
        let b = fingerprint_for_finding("c", "x", Some(&loc("app", Some("dev"))), &json!(null));
        assert_ne!(a, b);
    }
}
