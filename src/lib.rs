//! grouptree: restructuring engine for group hierarchies.
//!
//! Layers, innermost first:
//! - [`domain`]: the forest, its queries, drop policy, move/delete engines, validator
//! - [`application`]: the group tree service orchestrating policy, engine and collaborators
//! - [`infrastructure`]: record source, host actions, snapshots, DI container
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
