// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broadphase basics: a few bodies falling onto a floor, with pair updates each step.
//!
//! Run:
//! - `cargo run -p understory_demos --example broadphase_basics`

use kurbo::{Rect, Vec2};
use understory_broadphase::BroadPhase;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Body {
    Floor,
    Box(u32),
}

fn main() {
    let mut bp: BroadPhase<Body> = BroadPhase::new();
    let _floor = bp.create_proxy(Rect::new(-50.0, 0.0, 50.0, 1.0), Body::Floor);

    let mut boxes = Vec::new();
    for i in 0..4_u32 {
        let x = f64::from(i) * 3.0 - 6.0;
        let y = 4.0 + f64::from(i) * 2.0;
        let r = Rect::new(x, y, x + 1.0, y + 1.0);
        boxes.push((bp.create_proxy(r, Body::Box(i)), r));
    }

    for step in 0..8 {
        let fall = Vec2::new(0.0, -1.0);
        let mut moved = 0;
        for (id, rect) in &mut boxes {
            // Rest on the floor.
            if rect.y0 + fall.y >= 1.0 {
                *rect = *rect + fall;
                if bp.move_proxy(*id, *rect, fall) {
                    moved += 1;
                }
            }
        }

        let mut pairs = Vec::new();
        bp.update_pairs(|a, b| pairs.push((a.min(b), a.max(b))));
        pairs.sort();
        println!("step {step}: {moved} proxies re-inserted, new pairs {pairs:?}");
    }

    println!(
        "{} proxies, tree height {}, balance {}, quality {:.2}",
        bp.proxy_count(),
        bp.tree_height(),
        bp.tree_balance(),
        bp.tree_quality()
    );
}
