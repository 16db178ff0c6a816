use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a Command for the taxoguard binary.
#[allow(deprecated)]
fn taxoguard_cmd() -> Command {
    Command::cargo_bin("taxoguard").unwrap()
}

#[test]
fn help_works() {
    taxoguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"));
}

#[test]
fn version_flag_works() {
    taxoguard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}
