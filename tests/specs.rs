//! Behavioral specifications for the herald CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// catalog/
#[path = "specs/catalog/check.rs"]
mod catalog_check;

// emit/
#[path = "specs/emit/config.rs"]
mod emit_config;
#[path = "specs/emit/failures.rs"]
mod emit_failures;
#[path = "specs/emit/publish.rs"]
mod emit_publish;
