// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visitor traits driven by [`DynamicTree::query`](crate::DynamicTree::query) and
//! [`DynamicTree::ray_cast`](crate::DynamicTree::ray_cast).
//!
//! Visitors are handed proxy ids. The tree stays borrowed for the whole
//! traversal, so a visitor cannot mutate the tree it is called from; collect
//! ids and apply changes after the traversal returns.

use crate::tree::ProxyId;
use crate::types::{Scalar, Vec2D};

/// Ray input for [`DynamicTree::ray_cast`](crate::DynamicTree::ray_cast).
///
/// The ray extends from `p1` to `p1 + max_fraction * (p2 - p1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCastInput<T> {
    /// Ray origin.
    pub p1: Vec2D<T>,
    /// Second point defining direction and unit length of the ray.
    pub p2: Vec2D<T>,
    /// Parametric length of the ray, in `(0, 1]`.
    pub max_fraction: T,
}

impl<T: Scalar> RayCastInput<T> {
    /// Create a ray from `p1` towards `p2` covering the whole segment.
    pub fn new(p1: Vec2D<T>, p2: Vec2D<T>) -> Self {
        Self {
            p1,
            p2,
            max_fraction: T::one(),
        }
    }

    /// Replace the maximum fraction.
    pub fn with_max_fraction(mut self, max_fraction: T) -> Self {
        self.max_fraction = max_fraction;
        self
    }

    /// Point along the ray at parametric `t`.
    pub fn point_at(&self, t: T) -> Vec2D<T> {
        self.p1 + (self.p2 - self.p1).scale(t)
    }
}

/// Receives candidate leaves from an AABB query.
pub trait QueryVisitor {
    /// Called for each leaf whose fat AABB overlaps the query box.
    ///
    /// Return `false` to stop the traversal immediately.
    fn visit(&mut self, proxy: ProxyId) -> bool;
}

impl<F: FnMut(ProxyId) -> bool> QueryVisitor for F {
    #[inline]
    fn visit(&mut self, proxy: ProxyId) -> bool {
        self(proxy)
    }
}

/// Receives candidate leaves from a ray cast.
pub trait RayCastVisitor<T: Scalar> {
    /// Called for each leaf whose fat AABB the (possibly clipped) ray may cross.
    ///
    /// `input.max_fraction` is the current clip. The return value controls the
    /// traversal:
    /// - `0` terminates it.
    /// - a positive value clips the ray to that fraction.
    /// - a negative value ignores this leaf and continues unchanged.
    ///
    /// Returning `input.max_fraction` continues without clipping.
    fn visit(&mut self, input: &RayCastInput<T>, proxy: ProxyId) -> T;
}

impl<T: Scalar, F: FnMut(&RayCastInput<T>, ProxyId) -> T> RayCastVisitor<T> for F {
    #[inline]
    fn visit(&mut self, input: &RayCastInput<T>, proxy: ProxyId) -> T {
        self(input, proxy)
    }
}
