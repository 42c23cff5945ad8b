// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning parameters for [`DynamicTree`](crate::DynamicTree).

use crate::types::Scalar;

/// Default fattening margin added on every side of a proxy's tight AABB.
pub const DEFAULT_AABB_MARGIN: f64 = 0.1;

/// Default scale applied to a move displacement when predicting motion.
pub const DEFAULT_DISPLACEMENT_MULTIPLIER: f64 = 2.0;

/// Default number of node slots allocated on first use.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Construction-time configuration of a [`DynamicTree`](crate::DynamicTree).
///
/// Margins are in world units, so pick them relative to the size of the
/// objects being tracked. A zero margin stores tight boxes, which makes every
/// move that leaves the box re-insert the proxy.
///
/// ```
/// use understory_dynamic_tree::{DynamicTree, TreeConfig};
///
/// let config = TreeConfig::<f32>::default()
///     .with_aabb_margin(0.5)
///     .with_initial_capacity(1024);
/// let tree: DynamicTree<f32, u32> = DynamicTree::with_config(config);
/// assert!(tree.is_empty());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeConfig<T> {
    /// Margin added on every side of a proxy's tight AABB.
    pub aabb_margin: T,
    /// Scale applied to the displacement passed to
    /// [`DynamicTree::move_proxy`](crate::DynamicTree::move_proxy).
    pub displacement_multiplier: T,
    /// Node slots allocated on first use; the pool doubles from there.
    pub initial_capacity: usize,
}

impl<T: Scalar> Default for TreeConfig<T> {
    fn default() -> Self {
        Self {
            aabb_margin: T::from_f64(DEFAULT_AABB_MARGIN),
            displacement_multiplier: T::from_f64(DEFAULT_DISPLACEMENT_MULTIPLIER),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl<T: Scalar> TreeConfig<T> {
    /// Configuration with no fattening and no motion prediction.
    ///
    /// Leaves store the caller's boxes unchanged, which is handy for tests and
    /// for static scenes.
    pub fn tight() -> Self {
        Self {
            aabb_margin: T::zero(),
            displacement_multiplier: T::zero(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Replace the fattening margin.
    pub fn with_aabb_margin(mut self, margin: T) -> Self {
        self.aabb_margin = margin;
        self
    }

    /// Replace the displacement multiplier.
    pub fn with_displacement_multiplier(mut self, multiplier: T) -> Self {
        self.displacement_multiplier = multiplier;
        self
    }

    /// Replace the initial pool capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
