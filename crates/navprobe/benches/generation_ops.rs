//! Generation Benchmarks
//!
//! Benchmarks for graph construction, validation, rendering and greedy runs
//! against the simulated news site.
//!
//! Run with: `cargo bench --bench generation_ops`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use navprobe::mock::SimulatedLauncher;
use navprobe::news::{NewsSiteModel, SiteConfig};
use navprobe::{GreedyTester, Seed, SeededRandom, Strategy, TransitionGraph};

type Model = NewsSiteModel<SimulatedLauncher>;

const BASE: &str = "https://news.test/";

fn model() -> Model {
    NewsSiteModel::new(
        SimulatedLauncher::new(BASE),
        SiteConfig::new().with_base_url(BASE),
    )
}

fn bench_graph_build(c: &mut Criterion) {
    c.bench_function("graph_build", |bench| {
        bench.iter(|| {
            let graph = TransitionGraph::build::<Model>();
            black_box(graph);
        });
    });
}

fn bench_graph_validation(c: &mut Criterion) {
    let graph = TransitionGraph::build::<Model>();
    let mut group = c.benchmark_group("graph_analysis");

    group.bench_function("validate", |bench| {
        bench.iter(|| black_box(black_box(&graph).validate()));
    });
    group.bench_function("to_dot", |bench| {
        bench.iter(|| black_box(black_box(&graph).to_dot()));
    });

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");

    for (name, strategy) in [("greedy", Strategy::Greedy), ("random", Strategy::Random)] {
        for steps in [10usize, 30, 100] {
            group.bench_with_input(
                BenchmarkId::new(name, steps),
                &steps,
                |bench, &steps| {
                    let mut model = model();
                    bench.iter(|| {
                        let mut tester =
                            GreedyTester::new(SeededRandom::new(Seed::from_u64(42)))
                                .with_strategy(strategy);
                        let report = tester.generate(&mut model, black_box(steps)).unwrap();
                        black_box(report);
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_graph_validation,
    bench_generation
);
criterion_main!(benches);
