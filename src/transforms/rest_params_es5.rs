//! Rest-parameter lowering.
//!
//! The rest node is rewritten into a plain var-args name and stays in the
//! parameter list, so parameter arity and the function's JSDoc stay
//! aligned for later passes. The body is rebuilt to collect the trailing
//! arguments into an array and to shadow the parameter with a `let` bound
//! to that array.
//!
//! This runs pre-order: references to the rest name inside the body must
//! resolve against the rewritten form.

use crate::ast::jsdoc::{JsDocBuilder, TypeExpr};
use crate::ast::{AstArena, NodeId, NodeKind};
use crate::context::CompilerContext;
use crate::transforms::es6_to_es5::BAD_REST_PARAMETER_ANNOTATION;

/// Array collecting the variadic arguments.
const REST_PARAMS: &str = "$jscomp$restParams";

/// Index variable populating the array.
const REST_INDEX: &str = "$jscomp$restIndex";

pub fn visit_rest_param(
    arena: &mut AstArena,
    ctx: &mut CompilerContext,
    rest_param: NodeId,
    param_list: NodeId,
) {
    let function = arena
        .parent(param_list)
        .expect("parameter list outside a function");
    let function_body = arena
        .last_child(function)
        .expect("function without a body");

    let param_name = arena.node(rest_param).string.clone();
    arena.node_mut(rest_param).kind = NodeKind::Name;
    arena.node_mut(rest_param).var_args = true;

    // Make sure rest parameters stay typechecked: the annotation comes
    // from the parameter itself, or from the function's @param entry.
    let ty = match &arena.node(rest_param).jsdoc {
        Some(info) => info.ty.clone(),
        None => arena
            .node(function)
            .jsdoc
            .as_ref()
            .and_then(|info| info.parameter_type(&param_name).cloned()),
    };
    if let Some(ty) = &ty {
        if !ty.is_ellipsis() {
            ctx.report(&BAD_REST_PARAMETER_ANNOTATION, arena, rest_param, &[]);
        }
    }

    if !arena.node(function_body).has_children() {
        ctx.report_code_change();
        return;
    }

    // { let <param> = $jscomp$restParams; <original body> }
    let new_block = arena.alloc(NodeKind::Block);
    arena.copy_information_from(new_block, function_body);
    let shadow_name = arena.name(&param_name);
    if let Some(ty) = &ty {
        let mut doc = JsDocBuilder::new();
        doc.record_type(TypeExpr::non_null_array_of(ty.ellipsis_element()));
        arena.node_mut(shadow_name).jsdoc = Some(doc.build());
    }
    let rest_params_ref = arena.name(REST_PARAMS);
    let shadow_let = arena.let_decl(shadow_name, Some(rest_params_ref));
    arena.use_source_info_if_missing_from_tree(shadow_let, function_body);
    arena.add_child_to_front(new_block, shadow_let);
    for stmt in arena.child_ids(function_body) {
        arena.detach(stmt);
        arena.add_child_to_back(new_block, stmt);
    }

    let rest_index = arena
        .children(param_list)
        .iter()
        .position(|&p| p == rest_param)
        .expect("rest parameter not in its parameter list");

    // var $jscomp$restParams = [];
    let empty_array = arena.arraylit(vec![]);
    let params_name = arena.name(REST_PARAMS);
    let new_arr = arena.var_decl(params_name, Some(empty_array));
    arena.use_source_info_if_missing_from_tree(new_arr, rest_param);
    arena.add_child_to_front(function_body, new_arr);

    // for (var $jscomp$restIndex = N; $jscomp$restIndex < arguments.length;
    //      ++$jscomp$restIndex)
    //   $jscomp$restParams[$jscomp$restIndex - N] = arguments[$jscomp$restIndex];
    let index_name = arena.name(REST_INDEX);
    let start = arena.number(rest_index as f64);
    let init = arena.var_decl(index_name, Some(start));
    let index_ref = arena.name(REST_INDEX);
    let arguments_ref = arena.name("arguments");
    let length = arena.getprop(arguments_ref, "length");
    let cond = arena.lt(index_ref, length);
    let index_ref = arena.name(REST_INDEX);
    let incr = arena.inc(index_ref);

    let params_ref = arena.name(REST_PARAMS);
    let index_ref = arena.name(REST_INDEX);
    let offset = arena.number(rest_index as f64);
    let slot_index = arena.sub(index_ref, offset);
    let slot = arena.getelem(params_ref, slot_index);
    let arguments_ref = arena.name("arguments");
    let index_ref = arena.name(REST_INDEX);
    let argument = arena.getelem(arguments_ref, index_ref);
    let copy = arena.assign(slot, argument);
    let copy_stmt = arena.expr_result(copy);
    let loop_body = arena.block(vec![copy_stmt]);

    let collect_loop = arena.for_loop(init, cond, incr, loop_body);
    arena.use_source_info_if_missing_from_tree(collect_loop, rest_param);
    arena.add_child_after(collect_loop, new_arr);

    arena.add_child_to_back(function_body, new_block);
    ctx.report_code_change();
}

#[cfg(test)]
#[path = "rest_params_es5_tests.rs"]
mod rest_params_es5_tests;
