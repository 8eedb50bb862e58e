//! Collaborator boundary traits for testability
//!
//! These traits abstract the external data source and the host actions,
//! allowing services to be tested with in-memory implementations.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::domain::GroupRecord;

/// Source of flat group records.
pub trait GroupRepository: Send + Sync {
    /// Fetch every group record, in source order.
    fn fetch_all(&self) -> io::Result<Vec<GroupRecord>>;

    /// Fetch the record joined to a node by its name.
    fn fetch_by_name(&self, name: &str) -> io::Result<Option<GroupRecord>>;
}

/// Host-side action hook, run after an edit is committed.
pub trait ActionInvoker: Send + Sync {
    /// Run the named action with string parameters.
    fn run_action(&self, name: &str, params: &BTreeMap<String, String>) -> io::Result<()>;
}

/// On-disk layout of the records file: a list of `[[group]]` tables.
#[derive(Debug, Deserialize)]
struct GroupFile {
    #[serde(default, rename = "group")]
    groups: Vec<GroupRecord>,
}

/// Group records read from a TOML file.
///
/// ```toml
/// [[group]]
/// name = "Organization"
///
/// [[group]]
/// name = "Platform Group"
/// parent = "Organization"
/// app_count = 12
/// ```
#[derive(Debug, Clone)]
pub struct TomlGroupRepository {
    path: PathBuf,
}

impl TomlGroupRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GroupRepository for TomlGroupRepository {
    fn fetch_all(&self) -> io::Result<Vec<GroupRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let file: GroupFile = toml::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        debug!(
            "loaded {} group records from {}",
            file.groups.len(),
            self.path.display()
        );
        Ok(file.groups)
    }

    fn fetch_by_name(&self, name: &str) -> io::Result<Option<GroupRecord>> {
        Ok(self.fetch_all()?.into_iter().find(|r| r.name == name))
    }
}

/// Group records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupRepository {
    records: Vec<GroupRecord>,
}

impl InMemoryGroupRepository {
    pub fn new(records: Vec<GroupRecord>) -> Self {
        Self { records }
    }
}

impl GroupRepository for InMemoryGroupRepository {
    fn fetch_all(&self) -> io::Result<Vec<GroupRecord>> {
        Ok(self.records.clone())
    }

    fn fetch_by_name(&self, name: &str) -> io::Result<Option<GroupRecord>> {
        Ok(self.records.iter().find(|r| r.name == name).cloned())
    }
}

/// Runs the action as an external program.
///
/// Parameters are passed as `GROUPTREE_<KEY>` environment variables.
#[derive(Debug, Clone, Default)]
pub struct CommandActionInvoker;

impl ActionInvoker for CommandActionInvoker {
    fn run_action(&self, name: &str, params: &BTreeMap<String, String>) -> io::Result<()> {
        debug!("run_action: {} {:?}", name, params);
        let status = Command::new(name)
            .envs(
                params
                    .iter()
                    .map(|(k, v)| (format!("GROUPTREE_{}", k.to_uppercase()), v)),
            )
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "action {} exited with {}",
                name, status
            )))
        }
    }
}

/// Accepts every action and does nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopActionInvoker;

impl ActionInvoker for NoopActionInvoker {
    fn run_action(&self, name: &str, _params: &BTreeMap<String, String>) -> io::Result<()> {
        debug!("run_action skipped: {}", name);
        Ok(())
    }
}
