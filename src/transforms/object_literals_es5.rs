//! Object-literal lowerings: shorthand members and computed keys.

use crate::ast::{AstArena, NodeId, NodeKind};
use crate::context::CompilerContext;
use crate::transforms::es6_to_es5::cannot_convert_yet;

const FRESH_COMP_PROP_VAR: &str = "$jscomp$compprop";

/// `{ m() {} }` → `{ m: function() {} }`. Member definitions in classes
/// are handled by the class rewriter instead.
pub fn visit_member_def_in_object_lit(
    arena: &mut AstArena,
    ctx: &mut CompilerContext,
    n: NodeId,
    parent: NodeId,
) {
    let name = arena.node(n).string.clone();
    let function = arena.remove_first_child(n).expect("member without function");
    let string_key = arena.string_key(&name, function);
    arena.use_source_info_if_missing_from_tree(string_key, n);
    arena.replace_child(parent, n, string_key);
    ctx.report_code_change();
}

/// `{ a }` → `{ a: a }`.
pub fn visit_string_key(arena: &mut AstArena, ctx: &mut CompilerContext, n: NodeId) {
    if !arena.node(n).has_children() {
        let text = arena.node(n).string.clone();
        let name = arena.name(&text);
        arena.copy_information_from(name, n);
        arena.add_child_to_back(n, name);
        ctx.report_code_change();
    }
}

/// Hoists a literal containing computed keys into a fresh variable and
/// rewrites the original position as a comma chain of assignments that
/// evaluates to the variable, preserving source evaluation order:
///
/// ```text
/// var o = { [k]: v, a: 1 };
/// ```
/// becomes
/// ```text
/// var $jscomp$compprop0 = {};
/// var o = ($jscomp$compprop0[k] = v, $jscomp$compprop0.a = 1, $jscomp$compprop0);
/// ```
///
/// Getter and setter members stay on the hoisted literal.
pub fn visit_object_with_computed_property(
    arena: &mut AstArena,
    ctx: &mut CompilerContext,
    obj: NodeId,
    parent: NodeId,
) {
    let mut props: Vec<NodeId> = Vec::new();
    for element in arena.child_ids(obj) {
        let node = arena.node(element);
        if node.computed_prop_getter || node.computed_prop_setter {
            cannot_convert_yet(ctx, arena, element, "computed getter/setter");
            return;
        } else if matches!(node.kind, NodeKind::GetterDef | NodeKind::SetterDef) {
            continue;
        }
        arena.detach(element);
        props.push(element);
    }

    let obj_name = format!("{}{}", FRESH_COMP_PROP_VAR, ctx.next_unique_id());
    let statement = arena.enclosing_statement(obj);

    let mut result = arena.name(&obj_name);
    for propdef in props.into_iter().rev() {
        let assignment = if arena.kind(propdef) == NodeKind::ComputedProp {
            let property_expression = arena.remove_first_child(propdef).unwrap();
            let value = arena.remove_first_child(propdef).unwrap();
            let target = arena.name(&obj_name);
            let access = arena.getelem(target, property_expression);
            arena.assign(access, value)
        } else {
            visit_string_key(arena, ctx, propdef);
            let value = arena.remove_first_child(propdef).unwrap();
            // The key node itself becomes the property-name string.
            arena.node_mut(propdef).kind = NodeKind::String;
            let target = arena.name(&obj_name);
            let access_kind = if arena.node(propdef).quoted_string {
                NodeKind::GetElem
            } else {
                NodeKind::GetProp
            };
            let access = arena.alloc(access_kind);
            arena.add_child_to_back(access, target);
            arena.add_child_to_back(access, propdef);
            arena.assign(access, value)
        };
        result = arena.comma(assignment, result);
    }

    arena.use_source_info_if_missing_from_tree(result, obj);
    arena.replace_child(parent, obj, result);

    let hoisted_name = arena.name(&obj_name);
    let hoisted = arena.var_decl(hoisted_name, Some(obj));
    arena.use_source_info_if_missing_from_tree(hoisted, statement);
    arena.add_child_before(hoisted, statement);
    ctx.report_code_change();
}

#[cfg(test)]
#[path = "object_literals_es5_tests.rs"]
mod object_literals_es5_tests;
