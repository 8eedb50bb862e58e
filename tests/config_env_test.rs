//! Environment overrides for Settings.
//!
//! Kept in its own test binary: it sets process-wide GROUPTREE_* variables.

use std::env;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use grouptree::config::{local_config_path, Settings};

#[test]
fn given_env_vars_when_load_then_override_local_config() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "forest_file = \"local.json\"\nallow_root_drag = false\n",
    )
    .unwrap();
    env::set_var("GROUPTREE_FOREST_FILE", "from-env.json");
    env::set_var("GROUPTREE_ALLOW_ROOT_DRAG", "true");

    // Act
    let settings = Settings::load(Some(dir.path()));
    env::remove_var("GROUPTREE_FOREST_FILE");
    env::remove_var("GROUPTREE_ALLOW_ROOT_DRAG");
    let settings = settings.unwrap();

    // Assert
    assert_eq!(settings.forest_file, PathBuf::from("from-env.json"));
    assert!(settings.allow_root_drag);
    // Untouched keys keep their defaults
    assert!(settings.validate_after_edit);
}
