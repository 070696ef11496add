//! Help and completion specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    herald()
        .args(&["--help"])
        .passes()
        .stdout_has("catalog")
        .stdout_has("emit")
        .stdout_has("completions");
}

#[test]
fn emit_help_describes_payload() {
    herald()
        .args(&["emit", "--help"])
        .passes()
        .stdout_has("--payload")
        .stdout_has("--no-validate");
}

#[test]
fn bash_completions_name_the_binary() {
    herald()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("herald");
}
