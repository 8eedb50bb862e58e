//! Command dispatch: load settings and snapshot, run the service, write back

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{check, DropPosition, Forest, TreeDisplay};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::snapshot::{load_snapshot, save_snapshot};
use crate::infrastructure::traits::{NoopActionInvoker, TomlGroupRepository};
use crate::infrastructure::InfraError;

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `grouptree --help`".to_string(),
        ));
    };

    // Completion and config need no snapshot
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::Config { command } => return cmd_config(command),
        _ => {}
    }

    let work_dir = std::env::current_dir()
        .map_err(|e| InfraError::io("determine working directory", e))?;
    let settings = Settings::load(Some(&work_dir))?;
    let forest_file = cli
        .forest
        .clone()
        .unwrap_or_else(|| settings.forest_file.clone());
    debug!("forest file: {}", forest_file.display());

    match command {
        Commands::Import { records } => cmd_import(settings, records.clone(), &forest_file),
        Commands::Show => cmd_show(&forest_file),
        Commands::Move {
            dragged,
            position,
            target,
        } => cmd_move(settings, &forest_file, dragged, *position, target),
        Commands::Delete { ids } => cmd_delete(settings, &forest_file, ids),
        Commands::Validate => cmd_validate(&forest_file),
        Commands::Flatten { json } => cmd_flatten(&forest_file, *json),
        Commands::Lookup { id } => cmd_lookup(settings, &forest_file, id),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(level = "debug", skip(settings))]
fn cmd_import(
    settings: Settings,
    records: Option<PathBuf>,
    forest_file: &Path,
) -> CliResult<()> {
    let records_file = records.unwrap_or_else(|| settings.records_file.clone());
    let container = ServiceContainer::with_deps(
        settings,
        Arc::new(TomlGroupRepository::new(records_file.clone())),
        Arc::new(NoopActionInvoker),
    );
    let mut service = container.group_tree_service(Forest::new());
    let forest = service.load()?;
    save_snapshot(forest_file, forest)?;
    output::success(&format!(
        "imported {} groups from {} into {}",
        forest.len(),
        records_file.display(),
        forest_file.display()
    ));
    Ok(())
}

fn cmd_show(forest_file: &Path) -> CliResult<()> {
    let forest = load_snapshot(forest_file)?;
    output::header(&format!(
        "{} ({} groups, depth {})",
        forest_file.display(),
        forest.len(),
        forest.depth()
    ));
    for tree in forest.to_tree_strings() {
        output::info(&tree);
    }
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_move(
    settings: Settings,
    forest_file: &Path,
    dragged: &str,
    position: DropPosition,
    target: &str,
) -> CliResult<()> {
    let forest = load_snapshot(forest_file)?;
    let container = ServiceContainer::new(settings);
    let mut service = container.group_tree_service(forest);
    service.move_group(dragged, target, position)?;
    save_snapshot(forest_file, service.forest())?;
    output::action("Moved", &format!("{} {} {}", dragged, position, target));
    // Snapshot is written first; a failing action does not lose the edit
    service.notify()?;
    Ok(())
}

#[instrument(level = "debug", skip(settings))]
fn cmd_delete(settings: Settings, forest_file: &Path, ids: &[String]) -> CliResult<()> {
    let forest = load_snapshot(forest_file)?;
    let container = ServiceContainer::new(settings);
    let mut service = container.group_tree_service(forest);
    let removed = service.delete_groups(ids)?;
    if removed == 0 {
        output::warning("no matching groups, snapshot unchanged");
        return Ok(());
    }
    save_snapshot(forest_file, service.forest())?;
    output::action("Deleted", &format!("{} group(s)", removed));
    service.notify()?;
    Ok(())
}

fn cmd_validate(forest_file: &Path) -> CliResult<()> {
    let forest = load_snapshot(forest_file)?;
    check(&forest).map_err(ApplicationError::Inconsistent)?;
    output::success(&format!("{} groups consistent", forest.len()));
    Ok(())
}

fn cmd_flatten(forest_file: &Path, json: bool) -> CliResult<()> {
    let forest = load_snapshot(forest_file)?;
    let rows = forest.flatten();
    if json {
        let text = serde_json::to_string_pretty(&rows).map_err(|e| InfraError::Snapshot {
            path: forest_file.to_path_buf(),
            message: e.to_string(),
        })?;
        output::info(&text);
    } else {
        for row in rows {
            output::info(&format!(
                "{}\t{}\t{}",
                row.level,
                row.name,
                row.parent_name.as_deref().unwrap_or("-")
            ));
        }
    }
    Ok(())
}

fn cmd_lookup(settings: Settings, forest_file: &Path, id: &str) -> CliResult<()> {
    let forest = load_snapshot(forest_file)?;
    let container = ServiceContainer::new(settings);
    let service = container.group_tree_service(forest);
    match service.lookup(id)? {
        Some(record) => {
            output::header(&record.name);
            output::detail(&format!("parent: {}", record.parent.as_deref().unwrap_or("-")));
            if let Some(description) = &record.description {
                output::detail(&format!("description: {}", description));
            }
            if let Some(uuid) = &record.uuid {
                output::detail(&format!("uuid: {}", uuid));
            }
            output::detail(&format!("apps: {}", record.app_count.unwrap_or(0)));
            output::detail(&format!("resources: {}", record.resource_count.unwrap_or(0)));
        }
        None => output::warning(&format!("no group record for node {}", id)),
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let work_dir = std::env::current_dir()
                .map_err(|e| InfraError::io("determine working directory", e))?;
            let settings = Settings::load(Some(&work_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
