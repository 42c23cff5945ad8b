// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dynamic_tree --heading-base-level=0

//! Understory Dynamic Tree: an incrementally balanced 2D AABB tree for broad-phase queries.
//!
//! A dynamic tree indexes many moving axis-aligned boxes ("proxies") so that overlap
//! queries and ray casts only touch a logarithmic slice of them.
//!
//! - Proxies are stored with a fat AABB: the caller's box grown by a margin, and along
//!   the direction of travel when moved. Small moves inside the fat box cost nothing.
//! - Insertion picks a sibling with a perimeter (surface area heuristic) cost and
//!   rotations keep every internal node height balanced.
//! - Queries and ray casts are stack based and driven by visitors, so callers decide
//!   what an exact hit is and when to stop.
//! - Node storage is a single pooled arena with a free list. Proxy ids are stable
//!   indices into it.
//!
//! It is generic over the float scalar `T` and does not depend on any geometry crate.
//! Perimeter metrics use a widened accumulator (f32→f64).
//!
//! # Example
//!
//! ```rust
//! use understory_dynamic_tree::{Aabb2D, DynamicTree, ProxyId, RayCastInput, Vec2D};
//!
//! let mut tree: DynamicTree<f64, &str> = DynamicTree::new();
//! let ball = tree.create_proxy(Aabb2D::new(0.0, 0.0, 1.0, 1.0), "ball");
//! let _wall = tree.create_proxy(Aabb2D::new(10.0, -5.0, 11.0, 5.0), "wall");
//!
//! // Moving a little stays inside the fat box and does not touch the tree.
//! assert!(!tree.move_proxy(ball, Aabb2D::new(0.05, 0.0, 1.05, 1.0), Vec2D::new(0.05, 0.0)));
//!
//! // Overlap query.
//! let hits: Vec<_> = tree.query_rect(Aabb2D::new(-1.0, -1.0, 2.0, 2.0)).collect();
//! assert_eq!(hits, [(ball, "ball")]);
//!
//! // Ray cast: the visitor sees candidates and may clip the ray.
//! let input = RayCastInput::new(Vec2D::new(5.0, 0.0), Vec2D::new(20.0, 0.0));
//! let mut first = None;
//! tree.ray_cast(
//!     &mut |sub: &RayCastInput<f64>, proxy: ProxyId| {
//!         first = Some(tree.payload(proxy));
//!         sub.max_fraction
//!     },
//!     &input,
//! );
//! assert_eq!(first, Some("wall"));
//! ```
//!
//! ## Maintenance and diagnostics
//!
//! [`DynamicTree::validate`] checks every structural invariant and panics on the first
//! violation. [`DynamicTree::max_balance`], [`DynamicTree::area_ratio`] and
//! [`DynamicTree::compute_height`] report tree quality.
//! [`DynamicTree::rebuild_bottom_up`] rebuilds the hierarchy offline and
//! [`DynamicTree::shift_origin`] recenters large worlds.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for coordinates. Debug builds may assert.

#![no_std]

extern crate alloc;

pub mod config;
pub mod maintenance;
mod pool;
pub mod query;
pub mod tree;
pub mod types;
pub mod visitor;

pub use config::{
    DEFAULT_AABB_MARGIN, DEFAULT_DISPLACEMENT_MULTIPLIER, DEFAULT_INITIAL_CAPACITY, TreeConfig,
};
pub use tree::{DynamicTree, DynamicTreeF32, DynamicTreeF64, ProxyId};
pub use types::{Aabb2D, Scalar, Vec2D};
pub use visitor::{QueryVisitor, RayCastInput, RayCastVisitor};
