use camino::Utf8Path;

pub fn write_file(root: &Utf8Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(&path, contents).expect("write file");
}

/// A taxonomy that passes the strict profile: shared-service, prod, and one segment.
pub fn clean_taxonomy(root: &Utf8Path) {
    write_file(
        root,
        "compliance.yaml",
        "pci-dss:\n  name: PCI DSS\nsox:\n  name: SOX\n",
    );
    write_file(
        root,
        "environments/shared-service.yaml",
        r#"name: Shared Services
compliance: [pci-dss, sox]
labels:
  - "classification/sensitivity:high"
  - "classification/sensitivity_rationale:Hosts identity and secrets for every tenant"
  - "classification/criticality:high"
  - "classification/criticality_rationale:Every environment depends on it"
"#,
    );
    write_file(
        root,
        "environments/prod.yaml",
        r#"name: Production
compliance: [pci-dss]
labels:
  - "classification/sensitivity:medium"
  - "classification/sensitivity_rationale:Customer profiles without card data"
  - "classification/criticality:high"
  - "classification/criticality_rationale:Revenue stops when it is down"
"#,
    );
    write_file(
        root,
        "segments/payments.yaml",
        "name: Payments\nparents: [prod]\n",
    );
}
