//! Benchmarks for Triad Consensus Graph
//!
//! Measures performance of:
//! - Laplacian eigen-decomposition at growing node counts
//! - Laplacian application to a state matrix

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use triad_graph::{symmetric_eigen, ConsensusGraph, Matrix};

/// Benchmark Jacobi decomposition of complete-graph Laplacians
fn bench_eigen_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("eigen_decomposition");

    for &nodes in &[3usize, 5, 8, 16, 32] {
        let laplacian = ConsensusGraph::complete(nodes)
            .map(|g| g.laplacian().clone())
            .unwrap_or_else(|_| Matrix::identity(nodes));
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &laplacian, |b, l| {
            b.iter(|| symmetric_eigen(black_box(l)))
        });
    }
    group.finish();
}

/// Benchmark graph construction including the spectrum
fn bench_graph_construction(c: &mut Criterion) {
    c.bench_function("triad_construction", |b| b.iter(ConsensusGraph::triad));
}

/// Benchmark one diffusion product L·X
fn bench_apply_laplacian(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_laplacian");
    let graph = ConsensusGraph::triad();

    for &dims in &[1usize, 4, 16, 64] {
        let states = Matrix::from_vec(3, dims, (0..3 * dims).map(|i| i as f64).collect())
            .unwrap_or_else(|_| Matrix::zeros(3, dims));
        group.throughput(Throughput::Elements(dims as u64));
        group.bench_with_input(BenchmarkId::new("dims", dims), &states, |b, x| {
            b.iter(|| graph.apply_laplacian(black_box(x)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_eigen_decomposition,
    bench_graph_construction,
    bench_apply_laplacian,
);
criterion_main!(benches);
