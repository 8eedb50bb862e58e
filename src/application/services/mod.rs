//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on collaborator traits (GroupRepository, ActionInvoker)
//! but are themselves concrete structs, not traits.

mod group_tree;

pub use group_tree::{EditPolicy, GroupTreeService};
