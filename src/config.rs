//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/grouptree/grouptree.toml`
//! 3. Local config: `<work_dir>/.grouptree.toml`
//! 4. Environment variables: `GROUPTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub records_file: Option<PathBuf>,
    pub forest_file: Option<PathBuf>,
    pub allow_root_drag: Option<bool>,
    pub validate_after_edit: Option<bool>,
    pub on_change_action: Option<String>,
}

/// Unified configuration for grouptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Flat group records file (TOML, `[[group]]` tables)
    pub records_file: PathBuf,
    /// Forest snapshot file (JSON)
    pub forest_file: PathBuf,
    /// Allow dragging level-0 groups
    pub allow_root_drag: bool,
    /// Validate the forest before committing an edit
    pub validate_after_edit: bool,
    /// Program run after every committed edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_change_action: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            records_file: PathBuf::from("groups.toml"),
            forest_file: PathBuf::from("forest.json"),
            allow_root_drag: false,
            validate_after_edit: true,
            on_change_action: None,
        }
    }
}

/// Get the XDG config directory for grouptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "grouptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("grouptree.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(".grouptree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.records_file = PathBuf::from(expand_env_vars(&self.records_file.to_string_lossy()));
        self.forest_file = PathBuf::from(expand_env_vars(&self.forest_file.to_string_lossy()));
        if let Some(action) = &self.on_change_action {
            self.on_change_action = Some(expand_env_vars(action));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            records_file: overlay
                .records_file
                .clone()
                .unwrap_or_else(|| self.records_file.clone()),
            forest_file: overlay
                .forest_file
                .clone()
                .unwrap_or_else(|| self.forest_file.clone()),
            allow_root_drag: overlay.allow_root_drag.unwrap_or(self.allow_root_drag),
            validate_after_edit: overlay
                .validate_after_edit
                .unwrap_or(self.validate_after_edit),
            on_change_action: overlay
                .on_change_action
                .clone()
                .or_else(|| self.on_change_action.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Optional directory holding a local `.grouptree.toml`
    pub fn load(work_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = work_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply GROUPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("GROUPTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("records_file") {
            settings.records_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("forest_file") {
            settings.forest_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("allow_root_drag") {
            settings.allow_root_drag = val;
        }
        if let Ok(val) = config.get_bool("validate_after_edit") {
            settings.validate_after_edit = val;
        }
        if let Ok(val) = config.get_string("on_change_action") {
            settings.on_change_action = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# grouptree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/grouptree/grouptree.toml
#   Local:  ./.grouptree.toml
#   Env:    GROUPTREE_* environment variables

# Flat group records ([[group]] tables with name/parent)
# records_file = "groups.toml"

# Forest snapshot written by import/move/delete
# forest_file = "forest.json"

# Allow dragging root (level 0) groups
# allow_root_drag = false

# Validate levels and parent ids before committing an edit
# validate_after_edit = true

# Program run after every committed edit; parameters arrive as
# GROUPTREE_OPERATION, GROUPTREE_VERSION, ... environment variables
# on_change_action = "~/bin/sync-groups"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_root_drag_is_off() {
        let settings = Settings::default();
        assert!(!settings.allow_root_drag);
        assert!(settings.validate_after_edit);
        assert_eq!(settings.forest_file, PathBuf::from("forest.json"));
    }

    #[test]
    fn given_tilde_in_forest_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            forest_file: PathBuf::from("~/groups/forest.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.forest_file.to_string_lossy();
        assert!(path.starts_with(&home), "should start with home: {}", path);
        assert!(!path.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unset_fields_are_inherited() {
        let base = Settings::default();
        let overlay = RawSettings {
            allow_root_drag: Some(true),
            on_change_action: Some("notify".into()),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert!(merged.allow_root_drag);
        assert_eq!(merged.on_change_action.as_deref(), Some("notify"));
        assert_eq!(merged.records_file, base.records_file);
        assert!(merged.validate_after_edit);
    }

    #[test]
    fn given_settings_when_serializing_then_template_and_toml_parse() {
        let toml_text = Settings::default().to_toml().unwrap();
        let parsed: Settings = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed, Settings::default());
        let _: RawSettings = toml::from_str(&Settings::template()).unwrap();
    }
}
