//! Argument and input error specs

use crate::prelude::*;

#[test]
fn unknown_subcommand_fails() {
    herald().args(&["frobnicate"]).fails();
}

#[test]
fn invalid_payload_json_fails_without_publishing() {
    let project = Project::with_catalog();

    let run = project
        .herald()
        .args(&[
            "emit",
            "user.created",
            "--catalog",
            "catalog.toml",
            "--payload",
            "{not json",
        ])
        .fails()
        .stderr_has("invalid --payload JSON");
    assert!(run.events().is_empty());
}

#[test]
fn unknown_severity_is_rejected() {
    herald()
        .args(&["emit", "user.created", "--severity", "loud"])
        .fails()
        .stderr_has("unknown severity 'loud'");
}

#[test]
fn missing_catalog_file_fails() {
    let project = Project::empty();

    project
        .herald()
        .args(&["emit", "user.created", "--catalog", "missing.toml"])
        .fails()
        .stderr_has("missing.toml");
}
