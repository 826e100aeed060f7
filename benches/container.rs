use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_ioc::*;
use std::sync::Arc;
use std::time::Duration;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let container = Container::new();
    container.register("answer", Definition::instance(42u64)).unwrap();

    // Prime the singleton
    let _ = container.resolve::<u64>("answer").unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = container.resolve::<u64>("answer").unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let container = Container::new();
                container
                    .register(
                        "expensive",
                        Definition::singleton(|_| Ok(ExpensiveToCreate { data: (0..1000).collect() })),
                    )
                    .unwrap();
                container.start().unwrap();
                container
            },
            |container| {
                let v = container.resolve::<ExpensiveToCreate>("expensive").unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_prototype_vs_periodical(c: &mut Criterion) {
    #[derive(Clone)]
    struct Color {
        rgb: [u8; 3],
    }

    let mut group = c.benchmark_group("prototype_vs_periodical");

    let prototype = Container::new();
    prototype
        .register("color", Definition::prototype(|_| Ok(Color { rgb: [1, 2, 3] })))
        .unwrap();
    group.bench_function("prototype", |b| {
        b.iter(|| {
            let color = prototype.resolve::<Color>("color").unwrap();
            black_box(color.rgb);
        })
    });

    let periodical = Container::new();
    periodical.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(3600))));
    periodical
        .register("color", Definition::scoped("periodical", |_| Ok(Color { rgb: [1, 2, 3] })))
        .unwrap();
    group.bench_function("periodical_hit", |b| {
        b.iter(|| {
            let color = periodical.resolve::<Color>("color").unwrap();
            black_box(color.rgb);
        })
    });

    group.finish();
}

fn bench_hook_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("hook_chain");

    for &hook_count in &[0usize, 1, 4, 16] {
        let container = Container::new();
        container.register("n", Definition::prototype(|_| Ok(0u64))).unwrap();
        for _ in 0..hook_count {
            container.add_post_init_hook_for::<u64, _>(|_, v| Ok(Arc::new(*v + 1)));
        }

        group.bench_with_input(BenchmarkId::new("post_init_hooks", hook_count), &hook_count, |b, _| {
            b.iter(|| {
                let v = container.resolve::<u64>("n").unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

fn bench_cycle_detection_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_detection");

    // Non-circular prototype chain of depth 8, so every request walks the whole path
    let container = Container::new();
    container.register("s1", Definition::prototype(|_| Ok(1u64))).unwrap();
    for n in 2..=8 {
        let prev = format!("s{}", n - 1);
        container
            .register(
                format!("s{}", n),
                Definition::prototype(move |ctx| Ok(*ctx.resolve::<u64>(&prev)? + 1)),
            )
            .unwrap();
    }

    group.bench_function("chain_depth_8", |b| {
        b.iter(|| {
            let v = container.resolve::<u64>("s8").unwrap();
            black_box(v);
        })
    });

    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let container = Container::new();
    container.register("answer", Definition::instance(42u64)).unwrap();

    // Prime the singleton
    let _ = container.resolve::<u64>("answer").unwrap();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let container = &container;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let v = container.resolve::<u64>("answer").unwrap();
                                    black_box(v);
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_large_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_registry");

    for &definition_count in &[10, 100, 1000] {
        let container = Container::new();
        for n in 0..definition_count {
            container.register(format!("svc{}", n), Definition::instance(n as u64)).unwrap();
        }
        let _ = container.resolve::<u64>("svc0").unwrap();

        group.bench_with_input(
            BenchmarkId::new("resolve_singleton", definition_count),
            &definition_count,
            |b, _| {
                b.iter(|| {
                    let v = container.resolve::<u64>("svc0").unwrap();
                    black_box(v);
                })
            },
        );
    }

    group.finish();
}

fn bench_start_shutdown(c: &mut Criterion) {
    c.bench_function("start_shutdown_100_eager", |b| {
        b.iter_batched(
            || {
                let container = Container::new();
                for n in 0..100u64 {
                    container
                        .register(
                            format!("svc{}", n),
                            Definition::singleton(move |_| Ok(n)).eager().destroy_hook("close", |v: &u64| {
                                black_box(v);
                                Ok(())
                            }),
                        )
                        .unwrap();
                }
                container
            },
            |container| {
                container.start().unwrap();
                container.shutdown().unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_prototype_vs_periodical,
    bench_hook_chain,
    bench_cycle_detection_depth,
    bench_contention
);

criterion_group!(macro_benches, bench_large_registry, bench_start_shutdown);

criterion_main!(micro_benches, macro_benches);
