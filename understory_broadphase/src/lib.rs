// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_broadphase --heading-base-level=0

//! Understory Broadphase: a Kurbo-native collision broad-phase.
//!
//! This crate sits between a body/fixture layer and a contact manager. Geometry comes in
//! as [`kurbo::Rect`], [`kurbo::Point`] and [`kurbo::Vec2`]; the spatial work is done by
//! [`understory_dynamic_tree`].
//!
//! - Proxies are created, moved and destroyed with caller payloads.
//! - Proxies that are created, leave their fat box, or are explicitly touched go into a
//!   move buffer.
//! - [`BroadPhase::update_pairs`] queries the tree for every buffered proxy and reports
//!   each new overlapping pair once.
//! - Region queries and ray casts forward to the tree with Kurbo types.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Rect, Vec2};
//! use understory_broadphase::BroadPhase;
//!
//! let mut bp: BroadPhase<&str> = BroadPhase::new();
//! let ball = bp.create_proxy(Rect::new(0.0, 0.0, 1.0, 1.0), "ball");
//! let _crate = bp.create_proxy(Rect::new(3.0, 0.0, 4.0, 1.0), "crate");
//!
//! let mut pairs = Vec::new();
//! bp.update_pairs(|a, b| pairs.push((a, b)));
//! assert!(pairs.is_empty());
//!
//! // The ball rolls into the crate.
//! bp.move_proxy(ball, Rect::new(2.5, 0.0, 3.5, 1.0), Vec2::new(2.5, 0.0));
//! bp.update_pairs(|a, b| pairs.push((a, b)));
//! assert_eq!(pairs, [("ball", "crate")]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`. Enable the `libm` feature instead of `std`
//! for Kurbo's math on targets without the standard library.

#![no_std]

extern crate alloc;

mod broad_phase;
mod util;

pub use broad_phase::{BroadPhase, RayCast};
pub use understory_dynamic_tree::{ProxyId, TreeConfig};
