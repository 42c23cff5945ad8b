// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Axis-aligned bounding box in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point.
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && le(self.min_y, y) && le(x, self.max_x) && le(y, self.max_y)
    }

    /// Whether this AABB fully encloses `other`. Shared edges count as enclosed.
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(self.min_y, other.min_y)
            && le(other.max_x, self.max_x)
            && le(other.max_y, self.max_y)
    }

    /// Closed-interval overlap test. Touching boxes overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(lt(self.max_x, other.min_x)
            || lt(self.max_y, other.min_y)
            || lt(other.max_x, self.min_x)
            || lt(other.max_y, self.min_y))
    }

    /// The intersection of two AABBs.
    pub fn intersect(&self, other: &Self) -> Self {
        let min_x = max_t(self.min_x, other.min_x);
        let min_y = max_t(self.min_y, other.min_y);
        let max_x = min_t(self.max_x, other.max_x);
        let max_y = min_t(self.max_y, other.max_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The smallest AABB enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }

    /// Return true if the AABB is empty or inverted (no area). Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y)
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from origin and size.
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    /// Center point.
    pub fn center(&self) -> Vec2D<T> {
        Vec2D::new(
            T::half(self.min_x + self.max_x),
            T::half(self.min_y + self.max_y),
        )
    }

    /// Half extents.
    pub fn extents(&self) -> Vec2D<T> {
        Vec2D::new(
            T::half(self.max_x - self.min_x),
            T::half(self.max_y - self.min_y),
        )
    }

    /// Perimeter in the widened accumulator type. Inverted boxes measure zero.
    pub fn perimeter(&self) -> T::Acc {
        perimeter(self)
    }

    /// Grow the box by `margin` on every side.
    pub fn inflate(&self, margin: T) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Translate the box by `(dx, dy)`.
    pub fn translate(&self, dx: T, dy: T) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

/// A 2D vector or point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2D<T> {
    /// X component.
    pub x: T,
    /// Y component.
    pub y: T,
}

impl<T> Vec2D<T> {
    /// Create a vector from components.
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Scalar> Vec2D<T> {
    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(self) -> T {
        self.dot(self)
    }

    /// Perpendicular vector (counter-clockwise).
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(T::abs(self.x), T::abs(self.y))
    }

    /// Uniform scale.
    #[inline]
    pub fn scale(self, s: T) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl<T: Scalar> Add for Vec2D<T> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Scalar> Sub for Vec2D<T> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Floating-point scalar abstraction used by the tree.
///
/// This trait provides the arithmetic the tree needs for fattening, ray tests
/// and SAH-style perimeter metrics, and an associated widened accumulator type
/// for the metrics (e.g., f32→f64).
pub trait Scalar:
    Copy
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Widened accumulator type suitable for perimeter/cost computations.
    type Acc: Copy
        + PartialOrd
        + Add<Output = Self::Acc>
        + Sub<Output = Self::Acc>
        + Mul<Output = Self::Acc>
        + Div<Output = Self::Acc>
        + Debug;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// One value for the scalar type.
    fn one() -> Self;

    /// Half of the value.
    fn half(v: Self) -> Self;

    /// Absolute value.
    fn abs(v: Self) -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Convert a `usize` to the accumulator type (for cost weighting).
    fn acc_from_usize(n: usize) -> Self::Acc;

    /// Convert an `f64` constant to the scalar type.
    fn from_f64(v: f64) -> Self;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn half(v: Self) -> Self {
        0.5 * v
    }

    #[inline]
    fn abs(v: Self) -> Self {
        if v < 0.0 { -v } else { v }
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as f64
    }

    #[inline]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Configuration constants are narrowed to the coordinate type on purpose."
    )]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn half(v: Self) -> Self {
        0.5 * v
    }

    #[inline]
    fn abs(v: Self) -> Self {
        if v < 0.0 { -v } else { v }
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as Self::Acc
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

/// Compute the perimeter of an AABB using the scalar's widened accumulator type.
#[inline]
pub fn perimeter<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    let w = T::max_zero(a.max_x - a.min_x);
    let h = T::max_zero(a.max_y - a.min_y);
    T::acc_from_usize(2) * (T::widen(w) + T::widen(h))
}

/// Helper alias for the widened accumulator type associated with a scalar `T`.
pub type ScalarAcc<T> = <T as Scalar>::Acc;

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}
