// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closest-hit ray cast against circles stored as fat boxes in a dynamic tree.
//!
//! The tree only knows boxes; the visitor does the exact circle test and clips
//! the ray to the nearest hit so far.
//!
//! Run:
//! - `cargo run -p understory_demos --example dynamic_tree_ray_cast`

use kurbo::{Circle, Point, Shape};
use understory_dynamic_tree::{Aabb2D, DynamicTree, ProxyId, RayCastInput, Vec2D};

/// Fraction along `p1 -> p2` where the segment first enters `circle`, if it does.
fn ray_circle(input: &RayCastInput<f64>, circle: Circle) -> Option<f64> {
    let d = Point::new(input.p2.x, input.p2.y) - Point::new(input.p1.x, input.p1.y);
    let m = Point::new(input.p1.x, input.p1.y) - circle.center;
    let a = d.hypot2();
    let b = m.dot(d);
    let c = m.hypot2() - circle.radius * circle.radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    (0.0..=input.max_fraction).contains(&t).then_some(t)
}

fn main() {
    let circles = [
        Circle::new((8.0, 0.2), 1.0),
        Circle::new((4.0, 3.0), 1.0),
        Circle::new((5.0, -0.5), 0.75),
        Circle::new((12.0, 0.0), 2.0),
    ];

    let mut tree: DynamicTree<f64, usize> = DynamicTree::new();
    for (i, c) in circles.iter().enumerate() {
        let b = c.bounding_box();
        tree.create_proxy(Aabb2D::new(b.x0, b.y0, b.x1, b.y1), i);
    }

    let input = RayCastInput::new(Vec2D::new(0.0, 0.0), Vec2D::new(20.0, 0.0));
    let mut closest: Option<(usize, f64)> = None;
    let mut candidates = 0;
    tree.ray_cast(
        &mut |sub: &RayCastInput<f64>, proxy: ProxyId| {
            candidates += 1;
            let i = tree.payload(proxy);
            match ray_circle(sub, circles[i]) {
                Some(t) => {
                    closest = Some((i, t));
                    t
                }
                None => -1.0,
            }
        },
        &input,
    );

    println!("{candidates} candidate boxes tested");
    match closest {
        Some((i, t)) => {
            let p = input.point_at(t);
            println!("closest hit: circle {i} at fraction {t:.3}, point ({:.3}, {:.3})", p.x, p.y);
        }
        None => println!("no hit"),
    }
}
