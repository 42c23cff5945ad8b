// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The broad-phase: proxies, the move buffer, and pair generation.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect, Vec2};
use understory_dynamic_tree::{DynamicTree, ProxyId, RayCastInput, TreeConfig};

use crate::util::{aabb_to_rect, point_to_vec2d, rect_to_aabb, vec2_to_vec2d};

/// A ray segment for [`BroadPhase::ray_cast`].
///
/// The ray covers `p1` to `p1 + max_fraction * (p2 - p1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCast {
    /// Start of the ray.
    pub p1: Point,
    /// End of the ray at fraction 1.
    pub p2: Point,
    /// Current clip, in `(0, 1]`.
    pub max_fraction: f64,
}

impl RayCast {
    /// A ray covering the whole segment from `p1` to `p2`.
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            max_fraction: 1.0,
        }
    }

    /// Replace the maximum fraction.
    pub fn with_max_fraction(mut self, max_fraction: f64) -> Self {
        self.max_fraction = max_fraction;
        self
    }

    /// The point at fraction `t` along the ray.
    pub fn point_at(&self, t: f64) -> Point {
        self.p1.lerp(self.p2, t)
    }
}

/// A collision broad-phase.
///
/// Proxies live in a [`DynamicTree`]. Every proxy that is created, re-inserted
/// by a move, or touched goes into a move buffer; [`update_pairs`](Self::update_pairs)
/// then reports each pair of proxies whose fat boxes overlap and at least one
/// of which was buffered. Pairs between proxies that both stayed inside their
/// fat boxes are not reported again, so the contact layer keeps the pairs it
/// already knows about.
#[derive(Debug)]
pub struct BroadPhase<P: Copy + Debug> {
    tree: DynamicTree<f64, P>,
    move_buffer: Vec<ProxyId>,
    pair_buffer: Vec<(ProxyId, ProxyId)>,
}

impl<P: Copy + Debug> Default for BroadPhase<P> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<P: Copy + Debug> BroadPhase<P> {
    /// Create an empty broad-phase with the default tree configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty broad-phase with an explicit tree configuration.
    pub fn with_config(config: TreeConfig<f64>) -> Self {
        Self {
            tree: DynamicTree::with_config(config),
            move_buffer: Vec::new(),
            pair_buffer: Vec::new(),
        }
    }

    /// The underlying tree, for diagnostics and custom traversals.
    pub fn tree(&self) -> &DynamicTree<f64, P> {
        &self.tree
    }

    /// Create a proxy for `rect` and buffer it for pairing.
    pub fn create_proxy(&mut self, rect: Rect, payload: P) -> ProxyId {
        let proxy = self.tree.create_proxy(rect_to_aabb(rect), payload);
        self.move_buffer.push(proxy);
        proxy
    }

    /// Destroy a proxy. It is dropped from the move buffer, so no pairs are
    /// reported for it afterwards. Panics if `proxy` is not live.
    pub fn destroy_proxy(&mut self, proxy: ProxyId) {
        self.move_buffer.retain(|&p| p != proxy);
        self.tree.destroy_proxy(proxy);
    }

    /// Move a proxy to `rect`, having travelled `displacement` since the last
    /// move.
    ///
    /// Returns `true` if the proxy left its fat box and was buffered for
    /// pairing.
    pub fn move_proxy(&mut self, proxy: ProxyId, rect: Rect, displacement: Vec2) -> bool {
        let moved =
            self.tree
                .move_proxy(proxy, rect_to_aabb(rect), vec2_to_vec2d(displacement));
        if moved {
            self.move_buffer.push(proxy);
        }
        moved
    }

    /// Buffer a proxy so its pairs are reported again on the next update.
    pub fn touch_proxy(&mut self, proxy: ProxyId) {
        assert!(
            self.tree.contains(proxy),
            "invalid proxy {proxy:?}: not a live leaf"
        );
        self.move_buffer.push(proxy);
    }

    /// Report new overlapping pairs and clear the move buffer.
    ///
    /// `callback` receives the payloads of each pair exactly once, ordered by
    /// proxy id. The broad-phase is borrowed during the callback; buffer any
    /// changes and apply them afterwards.
    pub fn update_pairs<F: FnMut(P, P)>(&mut self, mut callback: F) {
        self.pair_buffer.clear();

        let tree = &self.tree;
        let pairs = &mut self.pair_buffer;
        for &query_proxy in &self.move_buffer {
            let fat = tree.fat_aabb(query_proxy);
            tree.query(
                &mut |proxy: ProxyId| {
                    if proxy != query_proxy {
                        pairs.push((proxy.min(query_proxy), proxy.max(query_proxy)));
                    }
                    true
                },
                fat,
            );
        }

        pairs.sort_unstable();
        pairs.dedup();
        log::trace!(
            "broad-phase update: {} moved proxies, {} pairs",
            self.move_buffer.len(),
            pairs.len()
        );

        for &(a, b) in pairs.iter() {
            callback(tree.payload(a), tree.payload(b));
        }
        self.move_buffer.clear();
    }

    /// Whether the fat boxes of two proxies overlap.
    pub fn test_overlap(&self, a: ProxyId, b: ProxyId) -> bool {
        self.tree.fat_aabb(a).overlaps(&self.tree.fat_aabb(b))
    }

    /// Fat box of a proxy.
    pub fn fat_aabb(&self, proxy: ProxyId) -> Rect {
        aabb_to_rect(self.tree.fat_aabb(proxy))
    }

    /// Payload of a proxy.
    pub fn payload(&self, proxy: ProxyId) -> P {
        self.tree.payload(proxy)
    }

    /// Whether `proxy` is live.
    pub fn contains(&self, proxy: ProxyId) -> bool {
        self.tree.contains(proxy)
    }

    /// Number of live proxies.
    pub fn proxy_count(&self) -> usize {
        self.tree.len()
    }

    /// Number of buffered proxies awaiting [`update_pairs`](Self::update_pairs).
    pub fn move_count(&self) -> usize {
        self.move_buffer.len()
    }

    /// Height of the tree.
    pub fn tree_height(&self) -> u32 {
        self.tree.height()
    }

    /// Largest child height difference in the tree.
    pub fn tree_balance(&self) -> u32 {
        self.tree.max_balance()
    }

    /// Ratio of summed node perimeters to the root perimeter.
    pub fn tree_quality(&self) -> f64 {
        self.tree.area_ratio()
    }

    /// Visit proxies whose fat boxes overlap `rect`. Return `false` to stop.
    pub fn query<F: FnMut(ProxyId) -> bool>(&self, rect: Rect, mut visitor: F) {
        self.tree.query(&mut visitor, rect_to_aabb(rect));
    }

    /// Cast a ray against the fat boxes.
    ///
    /// The visitor gets the ray clipped so far and a candidate proxy. It
    /// returns `0.0` to stop, a positive fraction to clip the ray, or a
    /// negative value to skip the proxy.
    pub fn ray_cast<F: FnMut(&RayCast, ProxyId) -> f64>(&self, ray: RayCast, mut visitor: F) {
        let input = RayCastInput::new(point_to_vec2d(ray.p1), point_to_vec2d(ray.p2))
            .with_max_fraction(ray.max_fraction);
        self.tree.ray_cast(
            &mut |sub: &RayCastInput<f64>, proxy: ProxyId| {
                let clipped = ray.with_max_fraction(sub.max_fraction);
                visitor(&clipped, proxy)
            },
            &input,
        );
    }

    /// Move the world origin to `new_origin`; every stored box shifts by its negation.
    pub fn shift_origin(&mut self, new_origin: Vec2) {
        self.tree.shift_origin(vec2_to_vec2d(new_origin));
    }
}
