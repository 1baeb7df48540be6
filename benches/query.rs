use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdthree::points;
use kdthree::{KdTree, KdTreeFlat};

const SIZES: [usize; 4] = [100, 1000, 10_000, 100_000];
const N_QUERIES: usize = 1000;

fn brute_force_nearest(cloud: &[f64], pt: [f64; 3]) -> Option<usize> {
    let mut best_sq = f64::INFINITY;
    let mut best = None;
    for i in 0..points::count(cloud) {
        let sq = points::squared_distance(points::point(cloud, i), pt);
        if sq < best_sq {
            best_sq = sq;
            best = Some(i);
        }
    }
    best
}

fn benchmark_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    group.sample_size(10);

    for &size in &SIZES {
        let cloud = points::random_points(size, [0.0; 3], [100.0; 3]);
        // Offset the same distribution so queries don't coincide with points.
        let queries: Vec<f64> = points::random_points(N_QUERIES, [0.0; 3], [100.0; 3])
            .iter()
            .map(|c| c * 0.97 + 1.3)
            .collect();

        let tree = KdTree::from_points(&cloud);
        let flat = KdTreeFlat::from_points(&cloud);

        group.bench_with_input(BenchmarkId::new("tree", size), &size, |b, _| {
            b.iter(|| {
                for q in queries.chunks_exact(3) {
                    black_box(tree.find_nearest([q[0], q[1], q[2]]));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("flat", size), &size, |b, _| {
            b.iter(|| {
                for q in queries.chunks_exact(3) {
                    black_box(flat.find_nearest(&cloud, [q[0], q[1], q[2]]));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("tree_k8", size), &size, |b, _| {
            b.iter(|| {
                for q in queries.chunks_exact(3) {
                    black_box(tree.find_k_nearest([q[0], q[1], q[2]], 8));
                }
            })
        });

        // Linear scan baseline; the gap to "tree" is the pruning payoff.
        group.bench_with_input(BenchmarkId::new("brute", size), &size, |b, _| {
            b.iter(|| {
                for q in queries.chunks_exact(3) {
                    black_box(brute_force_nearest(&cloud, [q[0], q[1], q[2]]));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_query);
criterion_main!(benches);
