//! Tests for command dispatch against a snapshot file.
//!
//! Kept in its own test binary: it sets process-wide GROUPTREE_* variables.

use std::env;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use grouptree::cli::commands::execute_command;
use grouptree::cli::Cli;
use grouptree::exitcode;
use grouptree::infrastructure::snapshot::{load_snapshot, save_snapshot};
use grouptree::util::testing::{init_test_setup, sample_forest};

fn run(forest_file: &Path, args: &[&str]) -> Result<(), grouptree::cli::CliError> {
    let forest = forest_file.to_string_lossy().to_string();
    let mut argv = vec!["grouptree", "-f", forest.as_str()];
    argv.extend_from_slice(args);
    execute_command(&Cli::parse_from(argv))
}

/// Every edit is followed by a host action that always fails.
fn with_failing_action() {
    env::set_var("GROUPTREE_ON_CHANGE_ACTION", "false");
}

#[test]
fn given_failing_action_when_moving_then_move_is_still_saved() {
    // Arrange
    init_test_setup();
    with_failing_action();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");
    save_snapshot(&path, &sample_forest()).unwrap();

    // Act
    let result = run(&path, &["move", "1-1-2", "inside", "1-2"]);

    // Assert
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    let saved = load_snapshot(&path).unwrap();
    let children: Vec<String> = saved
        .child_ids("1-2")
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(children, vec!["1-1-2"]);
    assert_eq!(saved.find_by_id("1-1-2").unwrap().level, 2);
}

#[test]
fn given_failing_action_when_deleting_then_delete_is_still_saved() {
    with_failing_action();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");
    save_snapshot(&path, &sample_forest()).unwrap();

    let result = run(&path, &["delete", "1-1-1"]);

    assert!(result.is_err());
    let saved = load_snapshot(&path).unwrap();
    assert!(!saved.contains("1-1-1"));
    assert_eq!(saved.find_by_id("1-1-1-1").unwrap().level, 2);
}

#[test]
fn given_illegal_move_when_moving_then_snapshot_unchanged() {
    with_failing_action();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forest.json");
    let forest = sample_forest();
    save_snapshot(&path, &forest).unwrap();

    let result = run(&path, &["move", "1-1", "inside", "1-1-1"]);

    assert_eq!(result.unwrap_err().exit_code(), exitcode::DATAERR);
    assert_eq!(load_snapshot(&path).unwrap(), forest);
}
