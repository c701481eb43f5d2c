use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruletree::{
    all_of, conditional, leaf, root, typed_condition, typed_rule, validate, Context, Evaluable,
    Failure, Hooks, Node,
};

struct Input {
    values: Vec<i64>,
}

/// Build a root with `n` conditional branches, each guarding one typed rule
/// over its own slot of the input.
fn build_tree(n: usize) -> (Node, Context) {
    let branches = (0..n).map(|i| {
        conditional(
            typed_condition::<Input, _>(format!("c{i}"), move |_, input| input.values[i] >= 1),
            [leaf([typed_rule::<Input, _>(format!("r{i}"), move |_, input| {
                if input.values[i] > 100 {
                    return Err(Failure::new(format!("v{i}"), "too large", "RANGE"));
                }
                Ok(())
            })])],
        )
    });
    let tree = root(branches);
    let ctx = Context::new().with_data(Input { values: vec![10; n] });
    (tree, ctx)
}

/// A chain of `depth` nested conjunctions ending in a single leaf.
fn build_deep(depth: usize) -> Node {
    let mut node = leaf([ruletree::nop_rule("bottom")]);
    for _ in 0..depth {
        node = all_of([node]);
    }
    node
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for &n in &[5, 20, 50] {
        let (tree, ctx) = build_tree(n);
        group.bench_function(format!("{n}_branches"), |b| {
            b.iter(|| tree.evaluate(black_box(&ctx), "bench"));
        });
    }

    for &depth in &[8, 32] {
        let tree = build_deep(depth);
        let ctx = Context::new();
        group.bench_function(format!("depth_{depth}"), |b| {
            b.iter(|| tree.evaluate(black_box(&ctx), "bench"));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let hooks = Hooks::new();

    for &n in &[5, 20, 50] {
        let (tree, ctx) = build_tree(n);
        group.bench_function(format!("{n}_rules"), |b| {
            b.iter(|| validate(black_box(&ctx), &tree, &hooks, "bench"));
        });
    }

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    for &n in &[5, 20, 50] {
        group.bench_function(format!("{n}_branches"), |b| {
            b.iter(|| black_box(build_tree(n)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_validate, bench_construction);
criterion_main!(benches);
