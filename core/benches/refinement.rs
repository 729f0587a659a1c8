//! Benchmarks for color refinement and the isomorphism search.
//!
//! Compares the full-pass and worklist refinement schedules on graphs where
//! refinement does a lot of splitting (long paths) and none at all (regular
//! hypercubes), then times a complete automorphism count.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use chromatic_core::algorithm::graph::refinement::{refine, refine_incremental};
use chromatic_core::data_structures::generators;
use chromatic_core::{GraphIsomorphism, SearchConfig};

fn bench_refinement_schedules(c: &mut Criterion) {
    let inputs = [
        ("path_2000", generators::path(2000).unwrap()),
        ("hypercube_10", generators::hypercube(10).unwrap()),
    ];

    for (name, graph) in &inputs {
        c.bench_function(&format!("from_scratch_{}", name), |b| {
            b.iter_batched(|| graph.clone(), |mut g| refine(black_box(&mut g)), BatchSize::SmallInput);
        });
        c.bench_function(&format!("incremental_{}", name), |b| {
            b.iter_batched(
                || graph.clone(),
                |mut g| refine_incremental(black_box(&mut g)),
                BatchSize::SmallInput,
            );
        });
    }
}

fn bench_automorphism_search(c: &mut Criterion) {
    let cube = generators::hypercube(4).unwrap();
    let sequential = GraphIsomorphism::with_config(SearchConfig::sequential());
    let parallel = GraphIsomorphism::new();

    c.bench_function("automorphisms_q4_sequential", |b| {
        b.iter(|| {
            let count = sequential.count_automorphisms(black_box(&cube)).unwrap();
            assert_eq!(count, 384);
        });
    });
    c.bench_function("automorphisms_q4_parallel", |b| {
        b.iter(|| parallel.count_automorphisms(black_box(&cube)).unwrap());
    });
}

criterion_group!(benches, bench_refinement_schedules, bench_automorphism_search);
criterion_main!(benches);
