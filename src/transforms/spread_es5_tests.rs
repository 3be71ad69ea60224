use crate::ast::{AstArena, NodeId, NodeKind};
use crate::context::CompilerContext;
use crate::printer::print;
use crate::transforms::es6_to_es5::Es6ToEs5;

fn run(arena: &mut AstArena, root: NodeId) -> CompilerContext {
    let mut ctx = CompilerContext::default();
    Es6ToEs5::new().process(arena, &mut ctx, None, root);
    ctx
}

#[test]
fn test_array_literal_groups() {
    let mut arena = AstArena::new();
    // [1, 2, ...x, 4, 5]
    let one = arena.number(1.0);
    let two = arena.number(2.0);
    let x = arena.name("x");
    let spread = arena.spread(x);
    let four = arena.number(4.0);
    let five = arena.number(5.0);
    let array = arena.arraylit(vec![one, two, spread, four, five]);
    let stmt = arena.expr_result(array);
    let root = arena.script(vec![stmt]);
    let ctx = run(&mut arena, root);

    assert_eq!(print(&arena, root), "[].concat([1,2],x,[4,5]);");
    assert!(ctx.code_changed());
}

#[test]
fn test_call_with_leading_spread() {
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
    run(&mut arena, root);

    assert_eq!(print(&arena, root), "g.apply(null,[].concat(xs,[1,2]));");
}

#[test]
fn test_method_call_reuses_receiver() {
    let mut arena = AstArena::new();
    // obj.m(...xs)
    let obj = arena.name("obj");
    let method = arena.getprop(obj, "m");
    let xs = arena.name("xs");
    let spread = arena.spread(xs);
    let call = arena.call(method, vec![spread]);
    let stmt = arena.expr_result(call);
    let root = arena.script(vec![stmt]);
    run(&mut arena, root);

    assert_eq!(print(&arena, root), "obj.m.apply(obj,[].concat(xs));");
}

#[test]
fn test_side_effecting_receiver_is_hoisted() {
    let mut arena = AstArena::new();
    // foo().m(...xs)
    let foo = arena.name("foo");
    let receiver = arena.call(foo, vec![]);
    let method = arena.getprop(receiver, "m");
    let xs = arena.name("xs");
    let spread = arena.spread(xs);
    let call = arena.call(method, vec![spread]);
    let stmt = arena.expr_result(call);
    let root = arena.script(vec![stmt]);
    run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "var $jscomp$spread$args0;\
         ($jscomp$spread$args0=foo()).m.apply($jscomp$spread$args0,[].concat(xs));"
    );
}

#[test]
fn test_new_goes_through_bind_apply() {
    let mut arena = AstArena::new();
    // new F(...xs)
    let f = arena.name("F");
    let xs = arena.name("xs");
    let spread = arena.spread(xs);
    let new_node = arena.new_expr(f, vec![spread]);
    let stmt = arena.expr_result(new_node);
    let root = arena.script(vec![stmt]);
    run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "new (Function.prototype.bind.apply)(F,[].concat([].concat(xs)));"
    );
}

#[test]
fn test_no_spread_remains_and_rewrite_is_single_shot() {
    let mut arena = AstArena::new();
    let g = arena.name("g");
    let xs = arena.name("xs");
    let spread = arena.spread(xs);
    let call = arena.call(g, vec![spread]);
    let stmt = arena.expr_result(call);
    let root = arena.script(vec![stmt]);
    let mut ctx = run(&mut arena, root);

    assert!(!tree_contains_kind(&arena, root, NodeKind::Spread));

    // Re-running the pass on its own output is a no-op.
    ctx.take_code_changed();
    Es6ToEs5::new().process(&mut arena, &mut ctx, None, root);
    assert!(!ctx.code_changed());
}

fn tree_contains_kind(arena: &AstArena, id: NodeId, kind: NodeKind) -> bool {
    arena.kind(id) == kind
        || arena
            .children(id)
            .iter()
            .any(|&c| tree_contains_kind(arena, c, kind))
}
