//! Pass driver: pre/post dispatch and orchestration.
//!
//! The pass is driven by the host traversal, which issues two callbacks
//! per node. The pre-order gate fires the rest-parameter rewrite (the
//! original rest name must be gone before the function body is descended
//! into) and rejects accessor definitions when the output dialect is ES3.
//! Everything else runs post-order, after children have been lowered.

use tracing::debug;

use crate::ast::{AstArena, NodeId, NodeKind};
use crate::common::LanguageOut;
use crate::context::CompilerContext;
use crate::diagnostics::DiagnosticType;
use crate::transforms::{class_es5, for_of_es5, object_literals_es5, rest_params_es5, spread_es5};
use crate::traversal::{traverse, Callback};

pub static CANNOT_CONVERT: DiagnosticType = DiagnosticType::error(
    "JSC_CANNOT_CONVERT",
    "This code cannot be converted from ES6. {0}",
);

// TODO(transpile): remove once every feature we intend to support is
// implemented.
pub static CANNOT_CONVERT_YET: DiagnosticType = DiagnosticType::error(
    "JSC_CANNOT_CONVERT_YET",
    "ES6 transpilation of '{0}' is not yet implemented.",
);

pub static DYNAMIC_EXTENDS_TYPE: DiagnosticType = DiagnosticType::error(
    "JSC_DYNAMIC_EXTENDS_TYPE",
    "The class in an extends clause must be a qualified name.",
);

pub static CLASS_REASSIGNMENT: DiagnosticType = DiagnosticType::error(
    "CLASS_REASSIGNMENT",
    "Class names defined inside a function cannot be reassigned.",
);

pub static CONFLICTING_GETTER_SETTER_TYPE: DiagnosticType = DiagnosticType::error(
    "CONFLICTING_GETTER_SETTER_TYPE",
    "The types of the getter and setter for property '{0}' do not match.",
);

pub static BAD_REST_PARAMETER_ANNOTATION: DiagnosticType = DiagnosticType::warning(
    "BAD_REST_PARAMETER_ANNOTATION",
    "Missing \"...\" in type annotation for rest parameter.",
);

/// The down-leveling pass. Stateless between runs; all per-compilation
/// state lives on the [`CompilerContext`].
#[derive(Default)]
pub struct Es6ToEs5;

impl Es6ToEs5 {
    pub fn new() -> Es6ToEs5 {
        Es6ToEs5
    }

    /// Run the pass over the externs and the program root.
    pub fn process(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        externs: Option<NodeId>,
        root: NodeId,
    ) {
        if let Some(externs) = externs {
            traverse(arena, ctx, externs, self);
        }
        traverse(arena, ctx, root, self);
    }

    /// Re-run the pass over a single replaced script.
    pub fn hot_swap_script(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        script_root: NodeId,
    ) {
        traverse(arena, ctx, script_root, self);
    }
}

pub(crate) fn cannot_convert(
    ctx: &mut CompilerContext,
    arena: &AstArena,
    n: NodeId,
    message: &str,
) {
    ctx.report(&CANNOT_CONVERT, arena, n, &[message]);
}

/// A call to this is essentially a TODO for the named feature.
pub(crate) fn cannot_convert_yet(
    ctx: &mut CompilerContext,
    arena: &AstArena,
    n: NodeId,
    feature: &str,
) {
    ctx.report(&CANNOT_CONVERT_YET, arena, n, &[feature]);
}

impl Callback for Es6ToEs5 {
    fn should_traverse(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        n: NodeId,
        parent: Option<NodeId>,
    ) -> bool {
        match arena.kind(n) {
            NodeKind::Rest => {
                let param_list = parent.expect("rest parameter outside a parameter list");
                rest_params_es5::visit_rest_param(arena, ctx, n, param_list);
            }
            NodeKind::GetterDef | NodeKind::SetterDef => {
                if ctx.options.language_out == LanguageOut::ES3 {
                    cannot_convert(
                        ctx,
                        arena,
                        n,
                        "ES5 getters/setters (consider using --language_out=ES5)",
                    );
                    return false;
                }
            }
            _ => {}
        }
        true
    }

    fn visit(
        &mut self,
        arena: &mut AstArena,
        ctx: &mut CompilerContext,
        n: NodeId,
        parent: Option<NodeId>,
    ) {
        match arena.kind(n) {
            NodeKind::ObjectLit => {
                let has_computed = arena
                    .children(n)
                    .iter()
                    .any(|&c| arena.kind(c) == NodeKind::ComputedProp);
                if has_computed {
                    debug!("lowering object literal with computed property");
                    object_literals_es5::visit_object_with_computed_property(
                        arena,
                        ctx,
                        n,
                        parent.expect("object literal has no parent"),
                    );
                }
            }
            NodeKind::MemberFunctionDef => {
                if let Some(parent) = parent {
                    if arena.kind(parent) == NodeKind::ObjectLit {
                        object_literals_es5::visit_member_def_in_object_lit(arena, ctx, n, parent);
                    }
                }
            }
            NodeKind::ForOf => {
                debug!("lowering for-of loop");
                for_of_es5::visit_for_of(arena, ctx, n, parent.expect("for-of has no parent"));
            }
            NodeKind::StringKey => {
                object_literals_es5::visit_string_key(arena, ctx, n);
            }
            NodeKind::Class => {
                debug!("lowering class");
                class_es5::visit_class(arena, ctx, n, parent.expect("class has no parent"));
            }
            NodeKind::ArrayLit | NodeKind::New | NodeKind::Call => {
                let has_spread = arena
                    .children(n)
                    .iter()
                    .any(|&c| arena.kind(c) == NodeKind::Spread);
                if has_spread {
                    debug!("lowering spread");
                    spread_es5::visit_spread(arena, ctx, n, parent.expect("spread has no parent"));
                }
            }
            // Lowered by the template-literal pass, not here.
            NodeKind::TemplateLit | NodeKind::TaggedTemplateLit => {}
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "es6_to_es5_tests.rs"]
mod es6_to_es5_tests;
