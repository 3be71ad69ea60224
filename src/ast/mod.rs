//! Arena-backed mutable AST
//!
//! The down-leveling pass manipulates a single generic node type: a kind
//! tag, an ordered child list, a string payload, boolean flags, a source
//! location and an optional attached JSDoc record. Nodes live in an
//! [`AstArena`] and are addressed by [`NodeId`]; the arena maintains the
//! parent back-pointers and enforces the detach-then-attach re-parenting
//! protocol.

mod arena;
pub mod jsdoc;
mod kind;
mod node;

pub use arena::AstArena;
pub use kind::NodeKind;
pub use node::{Node, NodeId, SourceInfo};
