//! `for ... of` lowering.
//!
//! ```text
//! for (v of iterable) body
//! ```
//! becomes
//! ```text
//! for (var $jscomp$iter$0 = $jscomp.makeIterator(iterable),
//!          $jscomp$key$v = $jscomp$iter$0.next();
//!      !$jscomp$key$v.done;
//!      $jscomp$key$v = $jscomp$iter$0.next()) {
//!   v = $jscomp$key$v.value;
//!   body
//! }
//! ```
//! A declared loop target (`var`/`let`/`const`) keeps its declaration kind
//! at the top of the body instead of the assignment.

use crate::ast::{AstArena, NodeId, NodeKind};
use crate::context::CompilerContext;
use crate::runtime;

/// Name stem for the iterator temporary.
const ITER_BASE: &str = "$jscomp$iter$";

/// Name stem for the iteration-result temporary.
const ITER_RESULT: &str = "$jscomp$key$";

pub fn visit_for_of(arena: &mut AstArena, ctx: &mut CompilerContext, node: NodeId, parent: NodeId) {
    let variable = arena.remove_first_child(node).expect("for-of without target");
    let iterable = arena.remove_first_child(node).expect("for-of without iterable");
    let body = arena.remove_first_child(node).expect("for-of without body");

    let iter_name = format!("{}{}", ITER_BASE, ctx.next_unique_id());
    let (decl_kind, variable_name) = if arena.kind(variable) == NodeKind::Name {
        let name = arena
            .qualified_name(variable)
            .expect("for-of target name is empty");
        (None, name)
    } else {
        assert!(
            arena.kind(variable).is_name_declaration(),
            "expected var, let, or const, got {:?}",
            arena.kind(variable)
        );
        let declared = arena.child(variable, 0);
        let name = arena
            .qualified_name(declared)
            .expect("for-of declarator name is empty");
        (Some(arena.kind(variable)), name)
    };
    let key_name = format!("{ITER_RESULT}{variable_name}");

    // var $iter = $jscomp.makeIterator(iterable), $key = $iter.next();
    let make_iter_callee = arena.new_qname(runtime::MAKE_ITERATOR);
    let make_iter = arena.call(make_iter_callee, vec![iterable]);
    ctx.needs_runtime = true;

    let iter_decl_name = arena.name(&iter_name);
    let init = arena.var_decl(iter_decl_name, Some(make_iter));
    let get_next = next_call(arena, &iter_name);
    let key_decl_name = arena.name(&key_name);
    arena.add_child_to_back(key_decl_name, get_next);
    arena.add_child_to_back(init, key_decl_name);

    // !$key.done
    let key_ref = arena.name(&key_name);
    let done = arena.getprop(key_ref, "done");
    let cond = arena.not(done);

    // $key = $iter.next()
    let key_ref = arena.name(&key_name);
    let get_next = next_call(arena, &iter_name);
    let incr = arena.assign(key_ref, get_next);

    // v = $key.value; — or the matching declaration kind.
    let key_ref = arena.name(&key_name);
    let value = arena.getprop(key_ref, "value");
    let declaration_or_assign = match decl_kind {
        None => {
            let target = arena.name(&variable_name);
            let assign = arena.assign(target, value);
            arena.expr_result(assign)
        }
        Some(kind) => {
            let target = arena.name(&variable_name);
            arena.declaration(kind, target, Some(value))
        }
    };
    arena.add_child_to_front(body, declaration_or_assign);

    let new_for = arena.for_loop(init, cond, incr, body);
    arena.use_source_info_if_missing_from_tree(new_for, node);
    arena.replace_child(parent, node, new_for);
    ctx.report_code_change();
}

/// `$iter.next()`.
fn next_call(arena: &mut AstArena, iter_name: &str) -> NodeId {
    let iter_ref = arena.name(iter_name);
    let next = arena.getprop(iter_ref, "next");
    arena.call(next, vec![])
}

#[cfg(test)]
#[path = "for_of_es5_tests.rs"]
mod for_of_es5_tests;
