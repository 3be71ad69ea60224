//! Class lowering.
//!
//! Classes are processed in three phases:
//!
//! 1. The class's syntactic context is classified into
//!    [`ClassDeclarationMetadata`]: the qualified name it declares, whether
//!    the constructor should stay anonymous, and the statement after which
//!    lowered members are inserted.
//! 2. Members are rewritten: methods become prototype/static assignments,
//!    getters and setters accumulate into `Object.defineProperties`
//!    literals, the constructor function is extracted.
//! 3. The class node is replaced by the constructor (as a `let` for a
//!    class statement, in place for expressions) carrying the synthesized
//!    `@constructor` JSDoc.
//!
//! ```text
//! class A extends B { constructor() {} m() { return 1; } }
//! ```
//! becomes
//! ```text
//! let A = function A() {};
//! $jscomp.inherits(A, B);
//! A.prototype.m = function() { return 1; };
//! ```

use indexmap::IndexMap;

use crate::ast::jsdoc::{JsDoc, JsDocBuilder, TypeExpr};
use crate::ast::{AstArena, NodeId, NodeKind};
use crate::context::CompilerContext;
use crate::runtime;
use crate::transforms::es6_to_es5::{
    cannot_convert, CLASS_REASSIGNMENT, CONFLICTING_GETTER_SETTER_TYPE, DYNAMIC_EXTENDS_TYPE,
};
use crate::traversal::{traverse, Callback};

pub fn visit_class(arena: &mut AstArena, ctx: &mut CompilerContext, class_node: NodeId, parent: NodeId) {
    let class_members = arena.child(class_node, 2);
    for member in arena.child_ids(class_members) {
        let node = arena.node(member);
        if node.computed_prop_getter || node.computed_prop_setter {
            cannot_convert(ctx, arena, member, "computed getter or setter in class definition");
            return;
        }
    }

    check_class_reassignment(arena, ctx, class_node);

    let Some(mut metadata) = ClassDeclarationMetadata::create(arena, class_node, parent) else {
        cannot_convert(
            ctx,
            arena,
            parent,
            "Can only convert classes that are declarations or the right hand side of a simple assignment.",
        );
        return;
    };
    if metadata.has_super_class(arena) && !arena.is_qualified_name(metadata.super_class_name_node) {
        ctx.report(&DYNAMIC_EXTENDS_TYPE, arena, metadata.super_class_name_node, &[]);
        return;
    }

    let use_unique = arena.is_statement(class_node) && !arena.is_in_function(class_node);
    let unique_full_class_name = if use_unique {
        get_unique_class_name(&metadata.full_class_name)
    } else {
        metadata.full_class_name.clone()
    };
    let class_name_access = arena.new_qname(&unique_full_class_name);
    let prototype_access = {
        let base = arena.clone_tree(class_name_access);
        arena.getprop(base, "prototype")
    };

    assert!(
        arena.is_statement(metadata.insertion_point),
        "insertion point must be a statement"
    );

    let mut constructor: Option<NodeId> = None;
    let mut ctor_jsdoc: Option<JsDoc> = None;
    let mut prototype_members_to_declare: IndexMap<String, JsDoc> = IndexMap::new();
    let mut class_members_to_declare: IndexMap<String, JsDoc> = IndexMap::new();

    for member in arena.child_ids(class_members) {
        let member_node = arena.node(member);
        if member_node.is_empty_kind() {
            continue;
        }
        assert!(
            matches!(
                member_node.kind,
                NodeKind::MemberFunctionDef | NodeKind::GetterDef | NodeKind::SetterDef
            ) || (member_node.kind == NodeKind::ComputedProp
                && !member_node.computed_prop_variable),
            "Member variables should have been transpiled earlier: {:?}",
            member_node.kind
        );

        if matches!(member_node.kind, NodeKind::GetterDef | NodeKind::SetterDef) {
            let type_expr = get_type_from_getter_or_setter(arena, member);
            add_to_define_properties_object(arena, &metadata, member);

            let members_to_declare = if arena.node(member).is_static_member {
                &mut class_members_to_declare
            } else {
                &mut prototype_members_to_declare
            };
            let member_name = arena.node(member).string.clone();
            let existing_type = members_to_declare
                .get(&member_name)
                .and_then(|doc| doc.ty.clone());
            if existing_type.is_some() && existing_type.as_ref() != Some(&type_expr) {
                ctx.report(&CONFLICTING_GETTER_SETTER_TYPE, arena, member, &[&member_name]);
            } else {
                let mut doc = JsDocBuilder::new();
                doc.record_type(type_expr);
                if arena
                    .node(member)
                    .jsdoc
                    .as_ref()
                    .is_some_and(|info| info.is_export)
                {
                    doc.record_export();
                }
                members_to_declare.insert(member_name, doc.build());
            }
        } else if arena.kind(member) == NodeKind::MemberFunctionDef
            && arena.node(member).string == "constructor"
        {
            ctor_jsdoc = arena.node(member).jsdoc.clone();
            let ctor_fn = arena.remove_first_child(member).unwrap();
            if !metadata.anonymous {
                // class Foo { constructor() {} } declares function Foo() {},
                // so the name lands on the constructor function.
                let named = arena.clone_node(metadata.class_name_node);
                let old_name = arena.child(ctor_fn, 0);
                arena.replace_child(ctor_fn, old_name, named);
            }
            constructor = Some(ctor_fn);
        } else {
            let qualified_member_access =
                get_qualified_member_access(arena, member, class_name_access, prototype_access);
            let method = arena.last_child(member).unwrap();
            arena.detach(method);

            let assign = arena.assign(qualified_member_access, method);
            arena.use_source_info_if_missing_from_tree(assign, member);

            let mut info = arena.node(member).jsdoc.clone();
            if arena.node(member).is_static_member && arena.references_this(method) {
                let mut doc = JsDocBuilder::maybe_copy_from(info.as_ref());
                doc.record_this_type(TypeExpr::Bang(Box::new(TypeExpr::Qmark(None))));
                info = Some(doc.build());
            }
            if let Some(info) = info {
                arena.node_mut(assign).jsdoc = Some(info);
            }

            let new_node = arena.expr_result(assign);
            arena.use_source_info_if_missing_from_tree(new_node, member);
            metadata.insert_node_and_advance(arena, new_node);
        }
    }

    if arena.node(metadata.define_properties_obj_for_prototype).has_children() {
        let obj = metadata.define_properties_obj_for_prototype;
        let target = arena.clone_tree(prototype_access);
        install_define_properties(arena, &mut metadata, class_node, target, obj);
    }
    if arena.node(metadata.define_properties_obj_for_class).has_children() {
        let obj = metadata.define_properties_obj_for_class;
        let target = arena.clone_tree(class_name_access);
        install_define_properties(arena, &mut metadata, class_node, target, obj);
    }

    // Declare the getter/setter-derived properties so the typechecker
    // knows they exist on the class.
    for (declared_member, doc) in prototype_members_to_declare {
        let target = arena.clone_tree(prototype_access);
        let declaration = arena.getprop(target, &declared_member);
        arena.node_mut(declaration).jsdoc = Some(doc);
        let stmt = arena.expr_result(declaration);
        arena.use_source_info_if_missing_from_tree(stmt, class_node);
        metadata.insert_node_and_advance(arena, stmt);
    }
    for (declared_member, doc) in class_members_to_declare {
        let target = arena.clone_tree(class_name_access);
        let declaration = arena.getprop(target, &declared_member);
        arena.node_mut(declaration).jsdoc = Some(doc);
        let stmt = arena.expr_result(declaration);
        arena.use_source_info_if_missing_from_tree(stmt, class_node);
        metadata.insert_node_and_advance(arena, stmt);
    }

    let constructor = constructor.expect("class must have a constructor member");

    let class_jsdoc = arena.best_jsdoc(class_node).cloned();
    let mut new_info = JsDocBuilder::maybe_copy_from(class_jsdoc.as_ref());
    new_info.record_constructor();

    if metadata.has_super_class(arena) {
        let super_class_string = arena
            .qualified_name(metadata.super_class_name_node)
            .expect("superclass was checked to be a qualified name");
        if new_info.is_interface_recorded() {
            new_info.record_extended_interface(TypeExpr::non_null_name(&super_class_string));
        } else {
            let inherits_callee = arena.new_qname(runtime::INHERITS);
            let subclass = arena.new_qname(&metadata.full_class_name);
            let superclass = arena.new_qname(&super_class_string);
            let inherits = arena.call(inherits_callee, vec![subclass, superclass]);
            let inherits_call = arena.expr_result(inherits);
            ctx.needs_runtime = true;

            arena.use_source_info_if_missing_from_tree(inherits_call, class_node);
            let enclosing_statement = arena.enclosing_statement(class_node);
            arena.add_child_after(inherits_call, enclosing_statement);
            new_info.record_base_type(TypeExpr::non_null_name(&super_class_string));
        }
    }

    // Classes are @struct by default.
    if !new_info.is_unrestricted_recorded()
        && !new_info.is_dict_recorded()
        && !new_info.is_struct_recorded()
    {
        new_info.record_struct();
    }

    if let Some(ctor_doc) = &ctor_jsdoc {
        new_info.record_suppressions(&ctor_doc.suppressions);
        for (param, ty) in &ctor_doc.params {
            new_info.record_parameter(param, ty.clone());
        }
        new_info.merge_property_bitfield_from(ctor_doc);
    }

    if arena.is_statement(class_node) {
        let ctor_name = arena.child(constructor, 0);
        arena.node_mut(ctor_name).string = String::new();
        let declared_name = arena.clone_node(metadata.class_name_node);
        let ctor_var = arena.let_decl(declared_name, Some(constructor));
        arena.use_source_info_if_missing_from_tree(ctor_var, class_node);
        arena.replace_child(parent, class_node, ctor_var);
    } else {
        arena.replace_child(parent, class_node, constructor);
    }

    // Attach the synthesized JSDoc to whichever statement-level node now
    // carries the constructor.
    let built = new_info.build();
    if arena.is_statement(constructor) {
        arena.node_mut(constructor).jsdoc = Some(built);
    } else if arena.kind(parent) == NodeKind::Name {
        // The constructor function is the RHS of a pre-existing declarator.
        let declaration = arena.parent(parent).unwrap();
        arena.node_mut(declaration).jsdoc = Some(built);
    } else if arena
        .parent(constructor)
        .is_some_and(|p| arena.kind(p) == NodeKind::Name)
    {
        // The newly created `let`.
        let declarator = arena.parent(constructor).unwrap();
        let declaration = arena.parent(declarator).unwrap();
        arena.node_mut(declaration).jsdoc = Some(built);
    } else if arena.kind(parent) == NodeKind::Assign {
        arena.node_mut(parent).jsdoc = Some(built);
    } else {
        panic!("unexpected class parent: {:?}", arena.kind(parent));
    }

    ctx.report_code_change();
}

/// `Object.defineProperties(<target>, <accumulated literal>);`
fn install_define_properties(
    arena: &mut AstArena,
    metadata: &mut ClassDeclarationMetadata,
    class_node: NodeId,
    target: NodeId,
    obj: NodeId,
) {
    let callee = arena.new_qname("Object.defineProperties");
    let call = arena.call(callee, vec![target, obj]);
    let stmt = arena.expr_result(call);
    arena.use_source_info_if_missing_from_tree(stmt, class_node);
    metadata.insert_node_and_advance(arena, stmt);
}

/// The declared type of an accessor: a getter's return type, a setter's
/// sole parameter type, or the wildcard.
fn get_type_from_getter_or_setter(arena: &AstArena, member: NodeId) -> TypeExpr {
    if let Some(info) = &arena.node(member).jsdoc {
        if arena.kind(member) == NodeKind::GetterDef {
            if let Some(return_type) = &info.return_type {
                return return_type.clone();
            }
        } else if info.params.len() == 1 {
            return info.params.values().next().unwrap().clone();
        }
    }
    TypeExpr::unknown()
}

/// Append a `{ configurable: true, enumerable: true, get|set: <fn> }`
/// entry for the member under its key in the right define-properties
/// literal, creating the per-key descriptor on first use.
fn add_to_define_properties_object(
    arena: &mut AstArena,
    metadata: &ClassDeclarationMetadata,
    member: NodeId,
) {
    let obj = if arena.node(member).is_static_member {
        metadata.define_properties_obj_for_class
    } else {
        metadata.define_properties_obj_for_prototype
    };
    let member_name = arena.node(member).string.clone();
    let prop = match arena.first_prop_matching_key(obj, &member_name) {
        Some(prop) => prop,
        None => {
            let configurable_value = arena.true_node();
            let configurable = arena.string_key("configurable", configurable_value);
            let enumerable_value = arena.true_node();
            let enumerable = arena.string_key("enumerable", enumerable_value);
            let prop = arena.objectlit(vec![configurable, enumerable]);
            let entry = arena.string_key(&member_name, prop);
            arena.add_child_to_back(obj, entry);
            prop
        }
    };

    let function = arena.last_child(member).unwrap();
    let mut doc = JsDocBuilder::maybe_copy_from(arena.best_jsdoc(function));
    doc.record_this_type(TypeExpr::non_null_name(&metadata.full_class_name));

    arena.detach(function);
    let accessor_key = if arena.kind(member) == NodeKind::GetterDef {
        "get"
    } else {
        "set"
    };
    let string_key = arena.string_key(accessor_key, function);
    arena.node_mut(string_key).jsdoc = Some(doc.build());
    arena.add_child_to_back(prop, string_key);
    arena.use_source_info_if_missing_from_tree(prop, member);
}

/// An access to the member, qualified by the static or instance context.
/// Consumes a computed member's key expression.
fn get_qualified_member_access(
    arena: &mut AstArena,
    member: NodeId,
    static_access: NodeId,
    instance_access: NodeId,
) -> NodeId {
    let template = if arena.node(member).is_static_member {
        static_access
    } else {
        instance_access
    };
    let context = arena.clone_tree(template);
    if arena.kind(member) == NodeKind::ComputedProp {
        let key = arena.remove_first_child(member).unwrap();
        arena.getelem(context, key)
    } else {
        let member_name = arena.node(member).string.clone();
        arena.getprop(context, &member_name)
    }
}

/// Reserved extension point: declared class names are currently emitted
/// unchanged.
fn get_unique_class_name(qualified_name: &str) -> String {
    qualified_name.to_string()
}

/// A class declared inside a function body must not have its name
/// reassigned: the lowered form would not see the reassignment.
fn check_class_reassignment(arena: &mut AstArena, ctx: &mut CompilerContext, class_node: NodeId) {
    let Some(class_name) = class_name_node(arena, class_node) else {
        return;
    };
    let Some(enclosing_function) = arena.enclosing_function(class_node) else {
        return;
    };
    let mut check = CheckClassAssignments { class_name };
    traverse(arena, ctx, enclosing_function, &mut check);
}

/// The node naming a class: its own name, or the name it is being
/// assigned/declared into.
fn class_name_node(arena: &AstArena, class_node: NodeId) -> Option<NodeId> {
    let own_name = arena.child(class_node, 0);
    if !arena.node(own_name).is_empty_kind() && !arena.node(own_name).string.is_empty() {
        return Some(own_name);
    }
    let parent = arena.parent(class_node)?;
    match arena.kind(parent) {
        NodeKind::Assign => Some(arena.child(parent, 0)),
        NodeKind::Name => Some(parent),
        _ => None,
    }
}

struct CheckClassAssignments {
    class_name: NodeId,
}

impl Callback for CheckClassAssignments {
    fn should_traverse(
        &mut self,
        _arena: &mut AstArena,
        _ctx: &mut CompilerContext,
        _n: NodeId,
        _parent: Option<NodeId>,
    ) -> bool {
        true
    }

    fn visit(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        n: NodeId,
        _parent: Option<NodeId>,
    ) {
        if arena.kind(n) != NodeKind::Assign || arena.child(n, 0) == self.class_name {
            return;
        }
        if arena.matches_qualified_name(self.class_name, arena.child(n, 0)) {
            ctx.report(&CLASS_REASSIGNMENT, arena, n, &[]);
        }
    }
}

/// Static metadata on a class declaration or expression: the qualified
/// name it declares (directly or by assignment), whether the constructor
/// stays anonymous, and the statement after which lowered members are
/// inserted.
struct ClassDeclarationMetadata {
    /// A statement node; lowered members are inserted after it, and the
    /// point advances with each insertion.
    insertion_point: NodeId,
    /// Accumulates prototype getters/setters for `Object.defineProperties`.
    define_properties_obj_for_prototype: NodeId,
    /// Accumulates static getters/setters for `Object.defineProperties`.
    define_properties_obj_for_class: NodeId,
    full_class_name: String,
    /// Whether the constructor function in the output stays anonymous.
    anonymous: bool,
    class_name_node: NodeId,
    super_class_name_node: NodeId,
}

impl ClassDeclarationMetadata {
    fn create(arena: &mut AstArena, class_node: NodeId, parent: NodeId) -> Option<Self> {
        let class_name_node = arena.child(class_node, 0);
        let super_class_name_node = arena.child(class_node, 1);

        // A class statement, or a class expression in a simple assignment
        // or declarator, can be converted. Anything else is too dynamic.
        if arena.is_statement(class_node) {
            let full_class_name = arena.node(class_name_node).string.clone();
            Some(ClassDeclarationMetadata::with(
                arena,
                class_node,
                full_class_name,
                false,
                class_name_node,
                super_class_name_node,
            ))
        } else if arena.kind(parent) == NodeKind::Assign
            && arena
                .parent(parent)
                .is_some_and(|gp| arena.kind(gp) == NodeKind::ExprResult)
        {
            // example.C = class {}; members land after the statement:
            // example.C.prototype.foo = function() {};
            let full_class_name = arena.qualified_name(arena.child(parent, 0))?;
            let insertion_point = arena.parent(parent).unwrap();
            Some(ClassDeclarationMetadata::with(
                arena,
                insertion_point,
                full_class_name,
                true,
                class_name_node,
                super_class_name_node,
            ))
        } else if arena.kind(parent) == NodeKind::Name {
            // var C = class {}; members land after the declaration.
            let insertion_point = arena.parent(parent)?;
            let full_class_name = arena.node(parent).string.clone();
            Some(ClassDeclarationMetadata::with(
                arena,
                insertion_point,
                full_class_name,
                true,
                class_name_node,
                super_class_name_node,
            ))
        } else {
            None
        }
    }

    fn with(
        arena: &mut AstArena,
        insertion_point: NodeId,
        full_class_name: String,
        anonymous: bool,
        class_name_node: NodeId,
        super_class_name_node: NodeId,
    ) -> Self {
        ClassDeclarationMetadata {
            insertion_point,
            define_properties_obj_for_prototype: arena.objectlit(vec![]),
            define_properties_obj_for_class: arena.objectlit(vec![]),
            full_class_name,
            anonymous,
            class_name_node,
            super_class_name_node,
        }
    }

    fn insert_node_and_advance(&mut self, arena: &mut AstArena, new_node: NodeId) {
        arena.add_child_after(new_node, self.insertion_point);
        self.insertion_point = new_node;
    }

    fn has_super_class(&self, arena: &AstArena) -> bool {
        !arena.node(self.super_class_name_node).is_empty_kind()
    }
}

#[cfg(test)]
#[path = "class_es5_tests.rs"]
mod class_es5_tests;
