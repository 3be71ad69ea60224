//! End-to-end scenarios through the public entry point: each input shape
//! from the pass contract, lowered and rendered, plus the universal
//! invariants (synthesized source info, nothing newer-dialect left behind,
//! idempotency).

use jslower::ast::jsdoc::{JsDocBuilder, TypeExpr};
use jslower::ast::{AstArena, NodeId, NodeKind, SourceInfo};
use jslower::context::CompilerContext;
use jslower::printer::print;
use jslower::transforms::es6_to_es5::Es6ToEs5;

fn run(arena: &mut AstArena, root: NodeId) -> CompilerContext {
    let mut ctx = CompilerContext::default();
    Es6ToEs5::new().process(arena, &mut ctx, None, root);
    ctx
}

fn assert_idempotent(arena: &mut AstArena, ctx: &mut CompilerContext, root: NodeId) {
    ctx.take_code_changed();
    Es6ToEs5::new().process(arena, ctx, None, root);
    assert!(
        !ctx.code_changed(),
        "second run must be a no-op, got: {}",
        print(arena, root)
    );
}

fn assert_all_sourced(arena: &AstArena, id: NodeId) {
    assert!(
        arena.node(id).source.is_some(),
        "node {:?} is missing source info",
        arena.kind(id)
    );
    for &child in arena.children(id) {
        assert_all_sourced(arena, child);
    }
}

fn assert_fully_lowered(arena: &AstArena, id: NodeId) {
    assert!(
        !matches!(
            arena.kind(id),
            NodeKind::Class
                | NodeKind::Rest
                | NodeKind::Spread
                | NodeKind::ForOf
                | NodeKind::ComputedProp
                | NodeKind::MemberFunctionDef
        ),
        "{:?} survived lowering",
        arena.kind(id)
    );
    for &child in arena.children(id) {
        assert_fully_lowered(arena, child);
    }
}

#[test]
fn scenario_for_of() {
    let mut arena = AstArena::new();
    // for (x of arr) { f(x); }
    let x = arena.name("x");
    let arr = arena.name("arr");
    let f = arena.name("f");
    let arg = arena.name("x");
    let call = arena.call(f, vec![arg]);
    let stmt = arena.expr_result(call);
    let body = arena.block(vec![stmt]);
    let loop_node = arena.for_of(x, arr, body);
    let root = arena.script(vec![loop_node]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "for(var $jscomp$iter$0=$jscomp.makeIterator(arr),$jscomp$key$x=$jscomp$iter$0.next();\
         !$jscomp$key$x.done;$jscomp$key$x=$jscomp$iter$0.next()){x=$jscomp$key$x.value;f(x);}"
    );
    assert!(ctx.needs_runtime);
    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn scenario_rest_parameter() {
    let mut arena = AstArena::new();
    // function f(a, ...b) { return b[0]; }
    let name = arena.name("f");
    let a = arena.name("a");
    let rest = arena.rest("b");
    let params = arena.param_list(vec![a, rest]);
    let b = arena.name("b");
    let zero = arena.number(0.0);
    let elem = arena.getelem(b, zero);
    let ret = arena.return_node(Some(elem));
    let body = arena.block(vec![ret]);
    let function = arena.function(name, params, body);
    let root = arena.script(vec![function]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "function f(a,b){\
         var $jscomp$restParams=[];\
         for(var $jscomp$restIndex=1;$jscomp$restIndex<arguments.length;++$jscomp$restIndex)\
         {$jscomp$restParams[$jscomp$restIndex-1]=arguments[$jscomp$restIndex];}\
         {let b=$jscomp$restParams;return b[0];}}"
    );
    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn scenario_call_spread() {
    let mut arena = AstArena::new();
    // g(...xs, 1, 2)
    let g = arena.name("g");
    let xs = arena.name("xs");
    let spread = arena.spread(xs);
    let one = arena.number(1.0);
    let two = arena.number(2.0);
    let call = arena.call(g, vec![spread, one, two]);
    let stmt = arena.expr_result(call);
    let root = arena.script(vec![stmt]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(print(&arena, root), "g.apply(null,[].concat(xs,[1,2]));");
    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn scenario_new_spread() {
    let mut arena = AstArena::new();
    // new F(...xs)
    let f = arena.name("F");
    let xs = arena.name("xs");
    let spread = arena.spread(xs);
    let new_node = arena.new_expr(f, vec![spread]);
    let stmt = arena.expr_result(new_node);
    let root = arena.script(vec![stmt]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "new (Function.prototype.bind.apply)(F,[].concat([].concat(xs)));"
    );
    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn scenario_class_with_inheritance() {
    let mut arena = AstArena::new();
    // class A extends B { constructor() {} m() { return 1; } }
    let ctor_name = arena.name("");
    let ctor_params = arena.param_list(vec![]);
    let ctor_body = arena.block(vec![]);
    let ctor_fn = arena.function(ctor_name, ctor_params, ctor_body);
    let ctor = arena.member_function_def("constructor", ctor_fn);

    let m_name = arena.name("");
    let m_params = arena.param_list(vec![]);
    let one = arena.number(1.0);
    let ret = arena.return_node(Some(one));
    let m_body = arena.block(vec![ret]);
    let m_fn = arena.function(m_name, m_params, m_body);
    let m = arena.member_function_def("m", m_fn);
    arena.node_mut(m).source = Some(SourceInfo::new("test.js", 2, 2));

    let members = arena.class_members(vec![ctor, m]);
    let a = arena.name("A");
    let b = arena.name("B");
    let class = arena.class_node(a, b, members);
    arena.node_mut(class).source = Some(SourceInfo::new("test.js", 1, 0));
    let root = arena.script(vec![class]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "let A=function(){};\
         $jscomp.inherits(A,B);\
         A.prototype.m=function(){return 1;};"
    );
    assert!(ctx.needs_runtime);
    let decl = arena.child(root, 0);
    let doc = arena.node(decl).jsdoc.as_ref().expect("constructor JSDoc");
    assert!(doc.is_constructor);
    assert!(doc.is_struct);
    assert_eq!(doc.base_type, Some(TypeExpr::non_null_name("B")));

    // Everything inserted by the rewrite carries the class's location.
    let inherits_stmt = arena.child(root, 1);
    assert_all_sourced(&arena, inherits_stmt);
    let method_stmt = arena.child(root, 2);
    assert_all_sourced(&arena, method_stmt);

    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn scenario_class_with_getter() {
    let mut arena = AstArena::new();
    // class C { constructor() {} /** @return {number} */ get p() { return 1; } }
    let ctor_name = arena.name("");
    let ctor_params = arena.param_list(vec![]);
    let ctor_body = arena.block(vec![]);
    let ctor_fn = arena.function(ctor_name, ctor_params, ctor_body);
    let ctor = arena.member_function_def("constructor", ctor_fn);

    let g_name = arena.name("");
    let g_params = arena.param_list(vec![]);
    let one = arena.number(1.0);
    let ret = arena.return_node(Some(one));
    let g_body = arena.block(vec![ret]);
    let g_fn = arena.function(g_name, g_params, g_body);
    let getter = arena.getter_def("p", g_fn);
    let mut doc = JsDocBuilder::new();
    doc.record_return_type(TypeExpr::Name("number".into()));
    arena.node_mut(getter).jsdoc = Some(doc.build());

    let members = arena.class_members(vec![ctor, getter]);
    let c = arena.name("C");
    let no_super = arena.empty();
    let class = arena.class_node(c, no_super, members);
    let root = arena.script(vec![class]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "let C=function(){};\
         Object.defineProperties(C.prototype,\
         {p:{configurable:true,enumerable:true,get:function(){return 1;}}});\
         C.prototype.p;"
    );
    let declaration = arena.child(arena.child(root, 2), 0);
    assert_eq!(
        arena.node(declaration).jsdoc.as_ref().and_then(|d| d.ty.clone()),
        Some(TypeExpr::Name("number".into()))
    );
    assert!(!ctx.needs_runtime);
    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn scenario_computed_property() {
    let mut arena = AstArena::new();
    // var o = { [k]: v, a: 1 };
    let k = arena.name("k");
    let v = arena.name("v");
    let computed = arena.computed_prop(k, v);
    let one = arena.number(1.0);
    let a = arena.string_key("a", one);
    let obj = arena.objectlit(vec![computed, a]);
    let o = arena.name("o");
    let decl = arena.var_decl(o, Some(obj));
    let root = arena.script(vec![decl]);
    let mut ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "var $jscomp$compprop0={};\
         var o=($jscomp$compprop0[k]=v,$jscomp$compprop0.a=1,$jscomp$compprop0);"
    );
    assert_fully_lowered(&arena, root);
    assert_idempotent(&mut arena, &mut ctx, root);
}

#[test]
fn temporaries_from_distinct_rewrites_never_collide() {
    let mut arena = AstArena::new();
    // Two loops and a spread call in one script.
    let a = arena.name("a");
    let xs = arena.name("xs");
    let body_a = arena.block(vec![]);
    let first = arena.for_of(a, xs, body_a);
    let b = arena.name("b");
    let ys = arena.name("ys");
    let body_b = arena.block(vec![]);
    let second = arena.for_of(b, ys, body_b);
    let foo = arena.name("foo");
    let receiver = arena.call(foo, vec![]);
    let method = arena.getprop(receiver, "m");
    let zs = arena.name("zs");
    let spread = arena.spread(zs);
    let call = arena.call(method, vec![spread]);
    let stmt = arena.expr_result(call);
    let root = arena.script(vec![first, second, stmt]);
    run(&mut arena, root);

    let output = print(&arena, root);
    assert!(output.contains("$jscomp$iter$0"));
    assert!(output.contains("$jscomp$iter$1"));
    assert!(output.contains("$jscomp$spread$args2"));
}
