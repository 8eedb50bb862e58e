//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::DropPosition;

/// Group hierarchy restructuring: move subtrees, delete with reparenting
#[derive(Parser, Debug)]
#[command(name = "grouptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Forest snapshot file (default from config: forest.json)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub forest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the forest snapshot from the group records file
    Import {
        /// Records file (default from config: groups.toml)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        records: Option<PathBuf>,
    },

    /// Show the hierarchy as tree
    Show,

    /// Move a group before/after/inside another group
    Move {
        /// Id of the group to move
        dragged: String,
        /// Drop position: before, after or inside
        position: DropPosition,
        /// Id of the target group
        target: String,
    },

    /// Delete groups; their children move up to the nearest surviving parent
    Delete {
        /// Ids of the groups to delete
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Check levels and parent ids of the snapshot
    Validate,

    /// Print (name, parent, level) rows for storage
    Flatten {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the group record joined to a node
    Lookup {
        /// Node id
        id: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a config template
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_move_args_when_parsing_then_reads_position() {
        let cli = Cli::try_parse_from(["grouptree", "-vv", "move", "1-2", "before", "1-1"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Move {
                dragged,
                position,
                target,
            }) => {
                assert_eq!(dragged, "1-2");
                assert_eq!(position, DropPosition::Before);
                assert_eq!(target, "1-1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn given_bad_position_when_parsing_then_fails() {
        assert!(Cli::try_parse_from(["grouptree", "move", "a", "below", "b"]).is_err());
    }
}
