//! Forest snapshots on disk
//!
//! A snapshot is the nested JSON view of the forest, the same shape the table
//! layer renders. The caller owns the file; the engine never touches it.

use std::path::Path;

use tracing::debug;

use crate::domain::{Forest, GroupNode};
use crate::infrastructure::{InfraError, InfraResult};

/// Read a snapshot file into a forest.
pub fn load_snapshot(path: &Path) -> InfraResult<Forest> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read snapshot {}", path.display()), e))?;
    let nodes: Vec<GroupNode> =
        serde_json::from_str(&content).map_err(|e| InfraError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let forest = Forest::from_nested(nodes).map_err(|e| InfraError::Snapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!("loaded snapshot {} ({} nodes)", path.display(), forest.len());
    Ok(forest)
}

/// Write the forest as a pretty-printed snapshot, creating parent directories.
pub fn save_snapshot(path: &Path, forest: &Forest) -> InfraResult<()> {
    let json = serde_json::to_string_pretty(&forest.to_nested()).map_err(|e| {
        InfraError::Snapshot {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, json + "\n")
        .map_err(|e| InfraError::io(format!("write snapshot {}", path.display()), e))?;
    debug!("saved snapshot {} ({} nodes)", path.display(), forest.len());
    Ok(())
}
