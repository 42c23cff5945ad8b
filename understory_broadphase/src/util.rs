// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between Kurbo geometry and the tree's geometry-free types.

use kurbo::{Point, Rect, Vec2};
use understory_dynamic_tree::{Aabb2D, Vec2D};

/// Normalizes the rect first, so `x0 > x1` is accepted.
pub(crate) fn rect_to_aabb(r: Rect) -> Aabb2D<f64> {
    let r = r.abs();
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn aabb_to_rect(a: Aabb2D<f64>) -> Rect {
    Rect::new(a.min_x, a.min_y, a.max_x, a.max_y)
}

pub(crate) fn point_to_vec2d(p: Point) -> Vec2D<f64> {
    Vec2D::new(p.x, p.y)
}

pub(crate) fn vec2_to_vec2d(v: Vec2) -> Vec2D<f64> {
    Vec2D::new(v.x, v.y)
}
