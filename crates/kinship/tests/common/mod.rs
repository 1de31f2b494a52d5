//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use kinship::domain::{NewPerson, PersonId, ScopeId};
use kinship::graph::RelationshipGraph;
use kinship::store::PersonStore;
use std::path::Path;
use std::process::{Command, Output};

/// Scope used by most graph tests
pub fn smith() -> ScopeId {
    ScopeId::new("smith")
}

/// Add a person with no attributes beyond a name
pub fn add<S: PersonStore>(
    graph: &mut RelationshipGraph<S>,
    name: &str,
    parents: &[PersonId],
) -> PersonId {
    graph
        .add_person(NewPerson::new(name, smith()), parents)
        .expect("Failed to add person")
}

/// Run the kinship binary in the specified directory
pub fn run_kinship_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kinship"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kinship binary")
}

/// Run the kinship binary and return stdout, asserting success
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_kinship_in_dir(dir, args);
    assert!(
        output.status.success(),
        "kinship {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
