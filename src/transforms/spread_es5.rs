//! Spread-element lowering in array literals, calls and `new`.
//!
//! The argument sequence is partitioned into groups: runs of non-spread
//! elements coalesce into fresh array literals, each spread contributes
//! its operand directly. The groups are then joined with
//! `[].concat(g1, g2, ...)`:
//!
//! ```text
//! [1, 2, ...x, 4, 5]   =>  [].concat([1, 2], x, [4, 5])
//! f(...arr)            =>  f.apply(null, [].concat(arr))
//! o.m(...arr)          =>  o.m.apply(o, [].concat(arr))
//! new F(...args)       =>  new (Function.prototype.bind.apply)(F, [].concat([].concat(args)))
//! ```
//!
//! A method call whose receiver has side effects evaluates the receiver
//! once into a fresh temporary: `(tmp = f()).m.apply(tmp, ...)`.

use crate::ast::{AstArena, NodeId, NodeKind};
use crate::context::CompilerContext;

const FRESH_SPREAD_VAR: &str = "$jscomp$spread$args";

pub fn visit_spread(arena: &mut AstArena, ctx: &mut CompilerContext, node: NodeId, parent: NodeId) {
    let kind = arena.kind(node);
    assert!(
        matches!(kind, NodeKind::Call | NodeKind::ArrayLit | NodeKind::New),
        "spread in unexpected context: {kind:?}"
    );

    let callee = if kind == NodeKind::ArrayLit {
        None
    } else {
        Some(arena.remove_first_child(node).expect("call without callee"))
    };

    let mut groups: Vec<NodeId> = Vec::new();
    let mut curr_group: Option<NodeId> = None;
    while let Some(element) = arena.remove_first_child(node) {
        if arena.kind(element) == NodeKind::Spread {
            if let Some(group) = curr_group.take() {
                groups.push(group);
            }
            groups.push(arena.remove_first_child(element).expect("empty spread"));
        } else {
            let group = match curr_group {
                Some(group) => group,
                None => {
                    let group = arena.arraylit(vec![]);
                    curr_group = Some(group);
                    group
                }
            };
            arena.add_child_to_back(group, element);
        }
    }
    if let Some(group) = curr_group {
        groups.push(group);
    }

    let joined_groups = concat_call(arena, groups);

    let result = match kind {
        NodeKind::ArrayLit => joined_groups,
        NodeKind::Call => {
            let callee = callee.unwrap();
            if arena.may_have_side_effects(callee) && arena.kind(callee) == NodeKind::GetProp {
                // Hoist the receiver: var tmp; ... (tmp = receiver).m.apply(tmp, joined)
                let statement = arena.enclosing_statement(node);
                let fresh_name = format!("{}{}", FRESH_SPREAD_VAR, ctx.next_unique_id());
                let decl_name = arena.name(&fresh_name);
                let decl = arena.var_decl(decl_name, None);
                arena.use_source_info_if_missing_from_tree(decl, statement);
                arena.add_child_before(decl, statement);

                let receiver = arena.remove_first_child(callee).unwrap();
                let fresh_ref = arena.name(&fresh_name);
                let capture = arena.assign(fresh_ref, receiver);
                arena.add_child_to_front(callee, capture);
                let apply = arena.getprop(callee, "apply");
                let fresh_ref = arena.name(&fresh_name);
                arena.call(apply, vec![fresh_ref, joined_groups])
            } else {
                let context = if arena.kind(callee) == NodeKind::GetProp {
                    let receiver = arena.child(callee, 0);
                    arena.clone_tree(receiver)
                } else {
                    arena.null_node()
                };
                let apply = arena.getprop(callee, "apply");
                arena.call(apply, vec![context, joined_groups])
            }
        }
        NodeKind::New => {
            // Construct through bind-apply so the argument count is dynamic.
            let callee = callee.unwrap();
            let bind_apply = arena.new_qname("Function.prototype.bind.apply");
            let bound_args = concat_call(arena, vec![joined_groups]);
            arena.new_expr(bind_apply, vec![callee, bound_args])
        }
        _ => unreachable!(),
    };
    arena.use_source_info_if_missing_from_tree(result, node);
    arena.replace_child(parent, node, result);
    ctx.report_code_change();
}

/// `[].concat(args...)`.
fn concat_call(arena: &mut AstArena, args: Vec<NodeId>) -> NodeId {
    let empty_array = arena.arraylit(vec![]);
    let concat = arena.getprop(empty_array, "concat");
    arena.call(concat, args)
}

#[cfg(test)]
#[path = "spread_es5_tests.rs"]
mod spread_es5_tests;
