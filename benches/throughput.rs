use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use ruletree::{
    conditional, is_a, leaf, root, typed_rule, typed_rule_with_prepare, validate_with_data,
    Context, Failure, Hooks, Node,
};

struct Account {
    id: u64,
    balance: i64,
}

fn build_shared_tree() -> Arc<Node> {
    let n = 20;
    let mut rules = Vec::with_capacity(n + 1);
    for i in 0..n {
        rules.push(typed_rule::<Account, _>(format!("r{i}"), move |_, a| {
            if a.balance < -(i as i64) {
                return Err(Failure::new("balance", "overdrawn", "OVERDRAWN"));
            }
            Ok(())
        }));
    }
    rules.push(typed_rule_with_prepare::<Account, u64, _, _>(
        "limit",
        |_, a| Ok(a.id % 1000),
        |_, _, limit| {
            if *limit > 1000 {
                return Err(Failure::new("limit", "out of range", "LIMIT"));
            }
            Ok(())
        },
    ));

    Arc::new(root([conditional(is_a::<Account>("isAccount"), [leaf(rules)])]))
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let tree = build_shared_tree();

        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let tree = Arc::clone(&tree);
                        thread::spawn(move || {
                            let hooks = Hooks::new();
                            let ctx = Context::new();
                            let start = Instant::now();
                            for i in 0..per_thread {
                                let account = Account {
                                    id: t as u64 * per_thread + i,
                                    balance: 100,
                                };
                                let _ = validate_with_data(&ctx, &*tree, &hooks, "bench", account);
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
