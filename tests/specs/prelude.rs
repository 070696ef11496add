//! Shared helpers for black-box specs.
//!
//! Each test gets a throwaway project directory and runs the `herald`
//! binary inside it with the `HERALD_*` environment cleared.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

pub use serde_json::json;

const HERALD_VARS: [&str; 3] = ["HERALD_SOURCE", "HERALD_ENVIRONMENT", "HERALD_CATALOG"];

/// Catalog shared by most specs
pub const CATALOG: &str = r#"
[[template]]
name = "user.created"
version = "1.0.0"
category = "application"
message = "User {{ username }} created"
searchable = ["username"]

[template.schema]
type = "object"
required = ["userId", "username"]
properties.userId = { type = "string" }
properties.username = { type = "string" }

[[template]]
name = "payment.made"
version = "2.1.0"
tags = ["billing"]

[template.schema]
type = "object"
required = ["amount"]
properties.amount = { type = "number", exclusiveMinimum = 0 }

[[template]]
name = "security.login.failed"
version = "1.0.0"
severity = "warning"
"#;

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// A project with `catalog.toml` holding [`CATALOG`]
    pub fn with_catalog() -> Self {
        let project = Self::empty();
        project.file("catalog.toml", CATALOG);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn herald(&self) -> Cli {
        let mut cli = herald();
        cli.cmd.current_dir(self.path());
        cli
    }
}

/// Run `herald` from the current directory
#[allow(deprecated)]
pub fn herald() -> Cli {
    let mut cmd = Command::cargo_bin("herald").unwrap();
    for var in HERALD_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    Cli { cmd }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        let run = Run { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status,
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> Run {
        let output = self.cmd.output().unwrap();
        let run = Run { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

pub struct Run {
    output: Output,
}

impl Run {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(needle),
            "stdout does not contain {:?}:\n{}",
            needle,
            stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(needle),
            "stderr does not contain {:?}:\n{}",
            needle,
            stderr
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    /// Stdout parsed as one JSON event per line
    pub fn events(&self) -> Vec<Value> {
        self.stdout()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}
