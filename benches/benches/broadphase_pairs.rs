// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Vec2};
use understory_broadphase::{BroadPhase, ProxyId};

fn gen_bodies(n: usize, cell: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            // Slightly larger than a cell so neighbours overlap.
            out.push(Rect::new(x0, y0, x0 + cell * 1.1, y0 + cell * 1.1));
        }
    }
    out
}

fn build(bodies: &[Rect]) -> (BroadPhase<u32>, Vec<ProxyId>) {
    let mut bp = BroadPhase::new();
    let ids = bodies
        .iter()
        .enumerate()
        .map(|(i, r)| bp.create_proxy(*r, i as u32))
        .collect();
    bp.update_pairs(|_, _| {});
    (bp, ids)
}

fn bench_initial_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase_initial_pairs");
    for &n in &[16usize, 32, 64] {
        let bodies = gen_bodies(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("create_update_n{}", n), |b| {
            b.iter_batched(
                BroadPhase::<u32>::new,
                |mut bp| {
                    for (i, r) in bodies.iter().enumerate() {
                        let _ = bp.create_proxy(*r, i as u32);
                    }
                    let mut pairs = 0usize;
                    bp.update_pairs(|_, _| pairs += 1);
                    black_box(pairs);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase_step");
    let bodies = gen_bodies(48, 10.0);
    // Every fourth body drifts far enough to leave its fat box each step.
    group.bench_function("quarter_moving", |b| {
        b.iter_batched(
            || build(&bodies),
            |(mut bp, ids)| {
                let d = Vec2::new(1.0, 0.5);
                for (i, id) in ids.iter().enumerate().step_by(4) {
                    let _ = bp.move_proxy(*id, bodies[i] + d, d);
                }
                let mut pairs = 0usize;
                bp.update_pairs(|_, _| pairs += 1);
                black_box(pairs);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_initial_pairs, bench_step);
criterion_main!(benches);
