//! Config file and environment specs

use crate::prelude::*;

#[test]
fn config_file_sets_source_and_catalog() {
    let project = Project::with_catalog();
    project.file(
        "herald.toml",
        r#"
source = "billing-api"
environment = "staging"
catalog = "catalog.toml"
"#,
    );

    let run = project
        .herald()
        .args(&[
            "emit",
            "payment.made",
            "--config",
            "herald.toml",
            "--payload",
            r#"{"amount":3}"#,
        ])
        .passes();

    let events = run.events();
    assert_eq!(events[0]["source"], "billing-api");
    assert_eq!(events[0]["environment"], "staging");
}

#[test]
fn environment_overrides_config() {
    let project = Project::with_catalog();
    project.file("herald.toml", "source = \"from-file\"\ncatalog = \"catalog.toml\"\n");

    let run = project
        .herald()
        .env("HERALD_SOURCE", "from-env")
        .args(&[
            "emit",
            "payment.made",
            "--config",
            "herald.toml",
            "--payload",
            r#"{"amount":3}"#,
        ])
        .passes();

    assert_eq!(run.events()[0]["source"], "from-env");
}

#[test]
fn catalog_from_environment() {
    let project = Project::with_catalog();

    let run = project
        .herald()
        .env("HERALD_CATALOG", "catalog.toml")
        .args(&["emit", "payment.made", "--payload", r#"{"amount":3}"#])
        .passes();

    assert_eq!(run.events()[0]["schemaVersion"], "2.1.0");
}

#[test]
fn config_with_unknown_key_fails() {
    let project = Project::empty();
    project.file("herald.toml", "colour = \"blue\"\n");

    project
        .herald()
        .args(&["emit", "user.created", "--config", "herald.toml"])
        .fails()
        .stderr_has("invalid config");
}

#[test]
fn config_without_validation_skips_factory_checks() {
    let project = Project::with_catalog();
    project.file(
        "herald.toml",
        "validation = false\ncatalog = \"catalog.toml\"\n",
    );

    // Publishing still validates; the factory alone does not.
    let run = project
        .herald()
        .args(&[
            "emit",
            "payment.made",
            "--config",
            "herald.toml",
            "--payload",
            r#"{"amount":-1}"#,
        ])
        .fails();

    let events = run.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "system.event.validation_failed");
}
