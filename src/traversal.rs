//! Two-phase document-order traversal.
//!
//! Every node gets a pre-order gate (`should_traverse`) and, if the gate
//! allows descent, a post-order visit after its children. The split is
//! load-bearing for the pass: rest-parameter rewriting must run before
//! the function body is descended into.
//!
//! The sibling cursor is captured before each child is descended. A
//! callback may therefore replace the node it is visiting or insert
//! statements around the enclosing statement: inserted nodes are not
//! re-traversed, and pre-existing siblings are never skipped.

use crate::ast::{AstArena, NodeId};
use crate::context::CompilerContext;

pub trait Callback {
    /// Pre-order gate. Returning `false` prunes the subtree: children are
    /// not descended and `visit` is not called for this node.
    fn should_traverse(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        n: NodeId,
        parent: Option<NodeId>,
    ) -> bool;

    /// Post-order visit, after all children have been traversed.
    fn visit(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        n: NodeId,
        parent: Option<NodeId>,
    );
}

pub fn traverse(
    arena: &mut AstArena,
    ctx: &mut CompilerContext,
    root: NodeId,
    cb: &mut dyn Callback,
) {
    traverse_branch(arena, ctx, cb, root, None);
}

fn traverse_branch(
    arena: &mut AstArena,
    ctx: &mut CompilerContext,
    cb: &mut dyn Callback,
    n: NodeId,
    parent: Option<NodeId>,
) {
    if !cb.should_traverse(arena, ctx, n, parent) {
        return;
    }
    let mut child = arena.first_child(n);
    while let Some(c) = child {
        let next = arena.next_sibling(c);
        traverse_branch(arena, ctx, cb, c, Some(n));
        child = next;
    }
    cb.visit(arena, ctx, n, parent);
}
