// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory Dynamic Tree: create, move, query, and ray cast.

use understory_dynamic_tree::{Aabb2D, DynamicTree, ProxyId, RayCastInput, Vec2D};

fn main() {
    let mut tree: DynamicTree<f32, u32> = DynamicTree::new();
    let a = tree.create_proxy(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1);
    let _b = tree.create_proxy(Aabb2D::new(5.0, 5.0, 15.0, 15.0), 2);
    let _c = tree.create_proxy(Aabb2D::new(40.0, 0.0, 45.0, 5.0), 3);

    // Small move inside the fat box
    let moved = tree.move_proxy(a, Aabb2D::new(0.05, 0.0, 10.05, 10.0), Vec2D::new(0.05, 0.0));
    println!("small move re-inserted: {moved}");

    // Large move
    let moved = tree.move_proxy(a, Aabb2D::new(20.0, 0.0, 30.0, 10.0), Vec2D::new(20.0, 0.0));
    println!("large move re-inserted: {moved}, fat box {:?}", tree.fat_aabb(a));

    // Query a point
    let hits: Vec<_> = tree.query_point(6.0, 6.0).collect();
    println!("hits at (6,6): {hits:?}");

    // Cast a ray along y = 2 and report every candidate
    let input = RayCastInput::new(Vec2D::new(-5.0, 2.0), Vec2D::new(50.0, 2.0));
    tree.ray_cast(
        &mut |sub: &RayCastInput<f32>, proxy: ProxyId| {
            println!("ray candidate {:?} (payload {})", proxy, tree.payload(proxy));
            sub.max_fraction
        },
        &input,
    );

    println!(
        "height {} balance {} area ratio {:.2}",
        tree.height(),
        tree.max_balance(),
        tree.area_ratio()
    );
}
