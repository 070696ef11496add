//! Catalog check and list specs

use crate::prelude::*;

#[test]
fn check_counts_templates_with_builtins() {
    let project = Project::with_catalog();

    project
        .herald()
        .args(&["catalog", "check", "catalog.toml"])
        .passes()
        .stdout_eq("ok: 6 templates\n");
}

#[test]
fn check_rejects_bad_version() {
    let project = Project::empty();
    project.file(
        "bad.toml",
        r#"
[[template]]
name = "user.created"
version = "one"
"#,
    );

    project
        .herald()
        .args(&["catalog", "check", "bad.toml"])
        .fails()
        .stderr_has("invalid catalog");
}

#[test]
fn check_rejects_duplicate_names() {
    let project = Project::empty();
    project.file(
        "dup.toml",
        r#"
[[template]]
name = "user.created"
version = "1.0.0"

[[template]]
name = "user.created"
version = "1.1.0"
"#,
    );

    project
        .herald()
        .args(&["catalog", "check", "dup.toml"])
        .fails();
}

#[test]
fn list_shows_inferred_category() {
    let project = Project::with_catalog();

    project
        .herald()
        .args(&["catalog", "list", "catalog.toml"])
        .passes()
        .stdout_has("security.login.failed")
        .stdout_has("security")
        .stdout_has("system.event.template_not_found");
}

#[test]
fn list_json_is_sorted_by_name() {
    let project = Project::with_catalog();

    let run = project
        .herald()
        .args(&["catalog", "list", "catalog.toml", "--format", "json"])
        .passes();
    let list: serde_json::Value = serde_json::from_str(&run.stdout()).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 6);
    assert_eq!(list[0]["name"], "payment.made");
    assert_eq!(list[0]["schema"], true);
}
