use camino::{Utf8Path, Utf8PathBuf};
use taxoguard_repo::load_taxonomy;
use tempfile::TempDir;

fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
}

fn write_file(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}

#[test]
fn loads_records_in_path_order_with_sources() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);

    write_file(
        &root.join("compliance.yaml"),
        "pci-dss:\n  name: PCI DSS\nsox:\n  name: SOX\n",
    );
    write_file(
        &root.join("environments/prod.yaml"),
        "name: Production\ncompliance: [pci-dss]\nlabels:\n  - classification/sensitivity:high\n",
    );
    write_file(&root.join("environments/dev.yaml"), "name: Development\n");
    for name in ["zeta", "alpha", "mid"] {
        write_file(
            &root.join(format!("segments/{name}.yaml")),
            "parents: [prod]\n",
        );
    }

    let input = load_taxonomy(&root).expect("load");

    let envs: Vec<&str> = input.environments.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(envs, vec!["dev", "prod"]);
    let segs: Vec<&str> = input.segments.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(segs, vec!["alpha", "mid", "zeta"]);
    assert_eq!(input.compliance_catalog.len(), 2);

    let prod = &input.environments[1];
    assert_eq!(
        prod.source.as_ref().map(|p| p.as_str()),
        Some("environments/prod.yaml")
    );
    assert_eq!(prod.compliance, vec!["pci-dss".to_string()]);
}

#[test]
fn every_invalid_document_is_reported() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);

    write_file(&root.join("environments/prod.yaml"), "name: Production\n");
    write_file(&root.join("segments/one.yaml"), "parents: prod\n");
    write_file(&root.join("segments/two.yaml"), "colour: blue\n");
    write_file(&root.join("segments/three.yaml"), "parents: [\n");

    let err = load_taxonomy(&root).expect_err("invalid documents");
    let msg = format!("{err:#}");
    assert!(msg.starts_with("3 invalid taxonomy document(s)"), "{msg}");
    assert!(msg.contains("segments/one.yaml"));
    assert!(msg.contains("segments/two.yaml"));
    assert!(msg.contains("segments/three.yaml"));
}

#[test]
fn taxonomy_without_catalog_has_empty_catalog() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    write_file(&root.join("environments/prod.yml"), "name: Production\n");

    let input = load_taxonomy(&root).expect("load");
    assert!(input.compliance_catalog.is_empty());
    assert_eq!(input.environments.len(), 1);
    assert!(input.segments.is_empty());
}
