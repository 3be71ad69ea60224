//! Benchmarks for the down-leveling pass.
//!
//! Run with: cargo bench --bench downlevel_bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use jslower::ast::{AstArena, NodeId};
use jslower::context::CompilerContext;
use jslower::transforms::es6_to_es5::Es6ToEs5;

/// A module with a class hierarchy, a variadic function and iteration:
/// roughly the shape of hand-written ES6 application code.
fn build_module(class_count: usize) -> (AstArena, NodeId) {
    let mut arena = AstArena::with_capacity(class_count * 64);
    let mut statements = Vec::new();

    for i in 0..class_count {
        let ctor_name = arena.name("");
        let ctor_params = arena.param_list(vec![]);
        let ctor_body = arena.block(vec![]);
        let ctor_fn = arena.function(ctor_name, ctor_params, ctor_body);
        let ctor = arena.member_function_def("constructor", ctor_fn);

        let m_name = arena.name("");
        let x = arena.name("x");
        let rest = arena.rest("xs");
        let m_params = arena.param_list(vec![x, rest]);
        let xs = arena.name("xs");
        let zero = arena.number(0.0);
        let elem = arena.getelem(xs, zero);
        let ret = arena.return_node(Some(elem));
        let m_body = arena.block(vec![ret]);
        let m_fn = arena.function(m_name, m_params, m_body);
        let m = arena.member_function_def("m", m_fn);

        let members = arena.class_members(vec![ctor, m]);
        let name = arena.name(&format!("C{i}"));
        let superclass = if i == 0 {
            arena.empty()
        } else {
            arena.name(&format!("C{}", i - 1))
        };
        let class = arena.class_node(name, superclass, members);
        statements.push(class);

        let v = arena.name("v");
        let items = arena.name("items");
        let callee = arena.name(&format!("C{i}"));
        let arg = arena.name("v");
        let spread = arena.spread(arg);
        let call = arena.call(callee, vec![spread]);
        let call_stmt = arena.expr_result(call);
        let body = arena.block(vec![call_stmt]);
        let loop_node = arena.for_of(v, items, body);
        statements.push(loop_node);
    }

    let root = arena.script(statements);
    (arena, root)
}

fn bench_downlevel(c: &mut Criterion) {
    let mut group = c.benchmark_group("downlevel");
    for class_count in [1usize, 10, 100] {
        group.bench_function(format!("classes_{class_count}"), |b| {
            b.iter_batched(
                || build_module(class_count),
                |(mut arena, root)| {
                    let mut ctx = CompilerContext::default();
                    Es6ToEs5::new().process(&mut arena, &mut ctx, None, root);
                    black_box(ctx.code_changed())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_downlevel);
criterion_main!(benches);
