use crate::ast::{AstArena, NodeId, NodeKind, SourceInfo};
use crate::context::CompilerContext;
use crate::printer::print;
use crate::transforms::es6_to_es5::Es6ToEs5;

fn run(arena: &mut AstArena, root: NodeId) -> CompilerContext {
    let mut ctx = CompilerContext::default();
    Es6ToEs5::new().process(arena, &mut ctx, None, root);
    ctx
}

/// for (x of arr) { f(x); }
fn bare_name_loop(arena: &mut AstArena) -> NodeId {
    let x = arena.name("x");
    let arr = arena.name("arr");
    let f = arena.name("f");
    let arg = arena.name("x");
    let call = arena.call(f, vec![arg]);
    let stmt = arena.expr_result(call);
    let body = arena.block(vec![stmt]);
    let loop_node = arena.for_of(x, arr, body);
    arena.node_mut(loop_node).source = Some(SourceInfo::new("test.js", 1, 0));
    arena.script(vec![loop_node])
}

#[test]
fn test_bare_name_target_becomes_assignment() {
    let mut arena = AstArena::new();
    let root = bare_name_loop(&mut arena);
    let ctx = run(&mut arena, root);

    assert_eq!(
        print(&arena, root),
        "for(var $jscomp$iter$0=$jscomp.makeIterator(arr),$jscomp$key$x=$jscomp$iter$0.next();\
         !$jscomp$key$x.done;$jscomp$key$x=$jscomp$iter$0.next()){x=$jscomp$key$x.value;f(x);}"
    );
    assert!(ctx.needs_runtime);
    assert!(ctx.code_changed());
    assert!(ctx.diagnostics.is_empty());
}

#[test]
fn test_declared_target_keeps_declaration_kind() {
    for (kind, keyword) in [
        (NodeKind::Var, "var"),
        (NodeKind::Let, "let"),
        (NodeKind::Const, "const"),
    ] {
        let mut arena = AstArena::new();
        let v = arena.name("v");
        let decl = arena.declaration(kind, v, None);
        let items = arena.name("items");
        let body = arena.block(vec![]);
        let loop_node = arena.for_of(decl, items, body);
        let root = arena.script(vec![loop_node]);
        run(&mut arena, root);

        let output = print(&arena, root);
        assert!(
            output.contains(&format!("{{{keyword} v=$jscomp$key$v.value;}}")),
            "expected {keyword} declaration in {output}"
        );
    }
}

#[test]
fn test_iterator_temporaries_do_not_collide() {
    let mut arena = AstArena::new();
    let a = arena.name("a");
    let xs = arena.name("xs");
    let body_a = arena.block(vec![]);
    let first = arena.for_of(a, xs, body_a);
    let b = arena.name("b");
    let ys = arena.name("ys");
    let body_b = arena.block(vec![]);
    let second = arena.for_of(b, ys, body_b);
    let root = arena.script(vec![first, second]);
    run(&mut arena, root);

    let output = print(&arena, root);
    assert!(output.contains("$jscomp$iter$0"));
    assert!(output.contains("$jscomp$iter$1"));
    assert!(output.contains("$jscomp$key$a"));
    assert!(output.contains("$jscomp$key$b"));
}

#[test]
fn test_synthesized_loop_carries_source_info() {
    let mut arena = AstArena::new();
    let root = bare_name_loop(&mut arena);
    run(&mut arena, root);

    let new_for = arena.child(root, 0);
    assert_eq!(arena.kind(new_for), NodeKind::For);
    assert_source_filled(&arena, new_for);
}

fn assert_source_filled(arena: &AstArena, id: NodeId) {
    assert!(
        arena.node(id).source.is_some(),
        "{:?} is missing source info",
        arena.kind(id)
    );
    for &child in arena.children(id) {
        assert_source_filled(arena, child);
    }
}

#[test]
fn test_no_for_of_remains() {
    let mut arena = AstArena::new();
    let root = bare_name_loop(&mut arena);
    run(&mut arena, root);
    assert!(!tree_contains_kind(&arena, root, NodeKind::ForOf));
}

fn tree_contains_kind(arena: &AstArena, id: NodeId, kind: NodeKind) -> bool {
    arena.kind(id) == kind
        || arena
            .children(id)
            .iter()
            .any(|&c| tree_contains_kind(arena, c, kind))
}
