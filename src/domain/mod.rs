//! Domain layer: the group forest and its restructuring engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod policy;
pub mod render;
pub mod restructure;
pub mod validate;

pub use arena::{Forest, PostOrderIterator, TreeIterator, TreeNode};
pub use builder::{ForestBuilder, TreeResult};
pub use entities::*;
pub use error::DomainError;
pub use policy::{can_drag, can_drop};
pub use render::TreeDisplay;
pub use restructure::{delete_and_reparent, move_node};
pub use validate::{check, validate};
