// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack-based traversals: AABB queries and ray casts.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::pool::{Kind, NodeIdx};
use crate::tree::{DynamicTree, ProxyId};
use crate::types::{Aabb2D, Scalar, Vec2D, max_t, min_t};
use crate::visitor::{QueryVisitor, RayCastInput, RayCastVisitor};

/// Initial traversal stack capacity; it grows on demand for very tall trees.
const STACK_CAPACITY: usize = 64;

impl<T: Scalar, P: Copy + Debug> DynamicTree<T, P> {
    /// Visit every proxy whose fat AABB overlaps `aabb`.
    ///
    /// The visitor returns `false` to stop the traversal. Visit order is
    /// depth first and otherwise unspecified.
    pub fn query<V: QueryVisitor + ?Sized>(&self, visitor: &mut V, aabb: Aabb2D<T>) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack: Vec<NodeIdx> = Vec::with_capacity(STACK_CAPACITY);
        stack.push(root);
        while let Some(i) = stack.pop() {
            let node = &self.pool[i];
            if !node.aabb.overlaps(&aabb) {
                continue;
            }
            match node.kind {
                Kind::Leaf(_) => {
                    if !visitor.visit(ProxyId::new(i)) {
                        return;
                    }
                }
                Kind::Internal { child1, child2 } => {
                    stack.push(child1);
                    stack.push(child2);
                }
                Kind::Free => unreachable!("free node {i:?} is reachable from the root"),
            }
        }
    }

    /// Collect the proxies whose fat AABB overlaps `rect`, with their payloads.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (ProxyId, P)> + '_ {
        let mut out = Vec::new();
        self.query(
            &mut |proxy: ProxyId| {
                out.push((proxy, self.payload(proxy)));
                true
            },
            rect,
        );
        out.into_iter()
    }

    /// Collect the proxies whose fat AABB contains the point.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = (ProxyId, P)> + '_ {
        self.query_rect(Aabb2D::new(x, y, x, y))
    }

    /// Cast a ray against the fat AABBs in the tree.
    ///
    /// The ray runs from `input.p1` to `input.p1 + input.max_fraction * (input.p2 - input.p1)`.
    /// The visitor does the exact shape test and decides how to continue; see
    /// [`RayCastVisitor::visit`]. Cost is roughly `k * log(n)` for `k` hits.
    ///
    /// Panics if `p1 == p2` or `max_fraction` is outside `(0, 1]`.
    pub fn ray_cast<V: RayCastVisitor<T> + ?Sized>(&self, visitor: &mut V, input: &RayCastInput<T>) {
        let p1 = input.p1;
        let p2 = input.p2;
        let r = p2 - p1;
        assert!(
            r.length_squared() > T::zero(),
            "ray cast needs distinct endpoints, got {p1:?} twice"
        );
        assert!(
            input.max_fraction > T::zero() && input.max_fraction <= T::one(),
            "ray cast max_fraction must be in (0, 1], got {:?}",
            input.max_fraction
        );

        // Separating axis for a segment: |dot(v, p1 - c)| > dot(|v|, h).
        // `v` need not be unit length since both sides scale the same way.
        let v = r.perp();
        let abs_v = v.abs();

        let mut max_fraction = input.max_fraction;
        let mut segment = segment_aabb(p1, input.point_at(max_fraction));

        let Some(root) = self.root else {
            return;
        };
        let mut stack: Vec<NodeIdx> = Vec::with_capacity(STACK_CAPACITY);
        stack.push(root);
        while let Some(i) = stack.pop() {
            let node = &self.pool[i];
            if !node.aabb.overlaps(&segment) {
                continue;
            }

            let c = node.aabb.center();
            let h = node.aabb.extents();
            let separation = T::abs(v.dot(p1 - c)) - abs_v.dot(h);
            if separation > T::zero() {
                continue;
            }

            match node.kind {
                Kind::Leaf(_) => {
                    let sub_input = RayCastInput {
                        p1,
                        p2,
                        max_fraction,
                    };
                    let value = visitor.visit(&sub_input, ProxyId::new(i));
                    if value == T::zero() {
                        return;
                    }
                    if value > T::zero() {
                        // The ray only ever gets shorter.
                        max_fraction = min_t(value, max_fraction);
                        segment = segment_aabb(p1, input.point_at(max_fraction));
                    }
                }
                Kind::Internal { child1, child2 } => {
                    stack.push(child1);
                    stack.push(child2);
                }
                Kind::Free => unreachable!("free node {i:?} is reachable from the root"),
            }
        }
    }
}

fn segment_aabb<T: Scalar>(a: Vec2D<T>, b: Vec2D<T>) -> Aabb2D<T> {
    Aabb2D::new(min_t(a.x, b.x), min_t(a.y, b.y), max_t(a.x, b.x), max_t(a.y, b.y))
}
