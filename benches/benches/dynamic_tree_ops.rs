// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_dynamic_tree::{Aabb2D, DynamicTree, ProxyId, RayCastInput, TreeConfig, Vec2D};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell * 0.8, cell * 0.8));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, extent: f64, size: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * extent;
        let y0 = rng.next_f64() * extent;
        out.push(Aabb2D::<f64>::from_xywh(x0, y0, size, size));
    }
    out
}

fn build(rects: &[Aabb2D<f64>]) -> (DynamicTree<f64, u32>, Vec<ProxyId>) {
    let mut tree = DynamicTree::new();
    let ids = rects
        .iter()
        .copied()
        .enumerate()
        .map(|(i, r)| tree.create_proxy(r, i as u32))
        .collect();
    (tree, ids)
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_create");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("create_query_n{}", n), |b| {
            b.iter_batched(
                || DynamicTree::<f64, u32>::with_config(TreeConfig::default()),
                |mut tree| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = tree.create_proxy(r, i as u32);
                    }
                    let hits: usize = tree
                        .query_rect(Aabb2D::<f64>::from_xywh(100.0, 100.0, 400.0, 400.0))
                        .count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    let rects = gen_random_rects(4096, 2000.0, 12.0);
    group.bench_function("create_random", |b| {
        b.iter_batched(
            DynamicTree::<f64, u32>::new,
            |mut tree| {
                for (i, r) in rects.iter().copied().enumerate() {
                    let _ = tree.create_proxy(r, i as u32);
                }
                black_box(tree.height());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_move");
    let rects = gen_grid_rects(64, 10.0);
    // Small jitter stays inside the fat boxes; a full cell step re-inserts everything.
    for &(name, step) in &[("jitter", 0.05), ("reinsert", 10.0)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || build(&rects),
                |(mut tree, ids)| {
                    let mut reinserted = 0usize;
                    for (j, id) in ids.iter().enumerate() {
                        let d = Vec2D::new(step, 0.0);
                        let r = rects[j].translate(d.x, d.y);
                        if tree.move_proxy(*id, r, d) {
                            reinserted += 1;
                        }
                    }
                    black_box(reinserted);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_query");
    let rects = gen_grid_rects(128, 8.0);
    let (tree, _) = build(&rects);
    group.bench_function("many_rect_queries", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let x = (q % 64) as f64 * 8.0;
                let y = (q / 64) as f64 * 8.0;
                tree.query(
                    &mut |_: ProxyId| {
                        total += 1;
                        true
                    },
                    Aabb2D::<f64>::from_xywh(x, y, 64.0, 64.0),
                );
            }
            black_box(total);
        })
    });
    group.bench_function("many_ray_casts", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let y = (q as f64) * 4.0 + 1.0;
                let input = RayCastInput::new(Vec2D::new(-10.0, y), Vec2D::new(1100.0, y + 3.0));
                tree.ray_cast(
                    &mut |sub: &RayCastInput<f64>, _: ProxyId| {
                        total += 1;
                        sub.max_fraction
                    },
                    &input,
                );
            }
            black_box(total);
        })
    });
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_tree_rebuild");
    let rects = gen_random_rects(256, 500.0, 8.0);
    group.bench_function("rebuild_bottom_up_256", |b| {
        b.iter_batched(
            || build(&rects).0,
            |mut tree| {
                tree.rebuild_bottom_up();
                black_box(tree.area_ratio());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_create, bench_move, bench_queries, bench_rebuild);
criterion_main!(benches);
