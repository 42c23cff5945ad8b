// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics and whole-tree maintenance.
//!
//! The metrics here walk the tree and are meant for tests, tuning and
//! debugging rather than per-frame use. [`DynamicTree::validate`] checks every
//! structural invariant and panics with a description of the first one that
//! does not hold.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::pool::{Kind, NodeIdx};
use crate::tree::DynamicTree;
use crate::types::{Scalar, Vec2D};

impl<T: Scalar, P: Copy + Debug> DynamicTree<T, P> {
    /// Height of the tree computed by a full traversal.
    ///
    /// Always agrees with [`height`](Self::height) on a valid tree.
    pub fn compute_height(&self) -> u32 {
        self.root.map_or(0, |r| self.subtree_height(r))
    }

    fn subtree_height(&self, i: NodeIdx) -> u32 {
        match self.pool[i].kind {
            Kind::Internal { child1, child2 } => {
                1 + self.subtree_height(child1).max(self.subtree_height(child2))
            }
            _ => 0,
        }
    }

    /// Largest height difference between the two children of any internal node.
    pub fn max_balance(&self) -> u32 {
        self.pool
            .iter_live()
            .filter_map(|node| match node.kind {
                Kind::Internal { child1, child2 } => Some(
                    (self.pool[child2].height - self.pool[child1].height).unsigned_abs(),
                ),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Sum of the perimeters of all live nodes divided by the root perimeter.
    ///
    /// Lower is better. Returns zero for an empty tree or a degenerate root.
    pub fn area_ratio(&self) -> T::Acc {
        let zero = T::acc_from_usize(0);
        let Some(root) = self.root else {
            return zero;
        };
        let root_area = self.pool[root].aabb.perimeter();
        if root_area <= zero {
            return zero;
        }
        let total = self
            .pool
            .iter_live()
            .fold(zero, |acc, node| acc + node.aabb.perimeter());
        total / root_area
    }

    /// Check every structural invariant of the tree, panicking on the first
    /// violation.
    ///
    /// This covers parent links, cached heights, the balance bound, parent
    /// boxes enclosing their children, node and proxy counts, and the free
    /// list.
    pub fn validate(&self) {
        let capacity = self.pool.capacity();
        let mut reachable = 0_usize;
        let mut leaves = 0_usize;

        if let Some(root) = self.root {
            assert!(
                self.pool[root].link.is_none(),
                "root {root:?} has parent {:?}",
                self.pool[root].link
            );
            let mut stack: Vec<(NodeIdx, Option<NodeIdx>)> = Vec::new();
            stack.push((root, None));
            while let Some((i, parent)) = stack.pop() {
                assert!(i.get() < capacity, "node {i:?} is outside the pool");
                reachable += 1;
                assert!(
                    reachable <= capacity,
                    "tree walk visited more nodes than the pool holds"
                );
                let node = &self.pool[i];
                assert_eq!(node.link, parent, "node {i:?} has a stale parent link");
                match node.kind {
                    Kind::Free => panic!("free node {i:?} is reachable from the root"),
                    Kind::Leaf(_) => {
                        assert_eq!(node.height, 0, "leaf {i:?} has height {}", node.height);
                        leaves += 1;
                    }
                    Kind::Internal { child1, child2 } => {
                        let h1 = self.pool[child1].height;
                        let h2 = self.pool[child2].height;
                        assert_eq!(
                            node.height,
                            1 + h1.max(h2),
                            "node {i:?} height does not match its children"
                        );
                        assert!(
                            (h2 - h1).abs() <= 1,
                            "node {i:?} is unbalanced: child heights {h1} and {h2}"
                        );
                        assert!(
                            node.aabb.contains(&self.pool[child1].aabb)
                                && node.aabb.contains(&self.pool[child2].aabb),
                            "node {i:?} does not enclose its children"
                        );
                        stack.push((child1, Some(i)));
                        stack.push((child2, Some(i)));
                    }
                }
            }
        }

        assert_eq!(
            reachable,
            self.pool.live(),
            "reachable nodes disagree with the live count"
        );
        assert_eq!(
            leaves, self.proxy_count,
            "reachable leaves disagree with the proxy count"
        );

        let mut free = 0_usize;
        let mut cur = self.pool.free_list_head();
        while let Some(i) = cur {
            free += 1;
            assert!(free <= capacity, "free list has a cycle");
            let node = &self.pool[i];
            assert!(node.is_free(), "live node {i:?} is on the free list");
            assert_eq!(node.height, -1, "free node {i:?} has height {}", node.height);
            cur = node.link;
        }
        assert_eq!(
            free + self.pool.live(),
            capacity,
            "free and live nodes do not account for the whole pool"
        );

        assert_eq!(
            self.height(),
            self.compute_height(),
            "cached root height is stale"
        );
    }

    /// Rebuild the tree from its leaves by greedy bottom-up pairing.
    ///
    /// Every internal node is discarded and the leaves are paired by smallest
    /// combined perimeter, restricted to the lowest nodes available so the
    /// result stays height balanced. Proxy ids, payloads and fat boxes are
    /// unchanged. This is cubic in the number of proxies and meant for
    /// occasional offline use.
    pub fn rebuild_bottom_up(&mut self) {
        let mut nodes: Vec<NodeIdx> = Vec::with_capacity(self.proxy_count);
        for i in self.pool.indices() {
            let kind = self.pool[i].kind;
            match kind {
                Kind::Leaf(_) => {
                    self.pool[i].link = None;
                    nodes.push(i);
                }
                Kind::Internal { .. } => self.pool.free(i),
                Kind::Free => {}
            }
        }

        if nodes.is_empty() {
            self.root = None;
            return;
        }

        while nodes.len() > 1 {
            let min_height = nodes
                .iter()
                .map(|&i| self.pool[i].height)
                .min()
                .unwrap_or(0);
            let lowest = nodes
                .iter()
                .filter(|&&i| self.pool[i].height == min_height)
                .count();

            let mut best: Option<(T::Acc, usize, usize)> = None;
            for i in 0..nodes.len() {
                let hi = self.pool[nodes[i]].height;
                for j in (i + 1)..nodes.len() {
                    let hj = self.pool[nodes[j]].height;
                    // With two or more nodes at the lowest height only those may
                    // pair; a lone lowest node must take part in the pair.
                    let allowed = if lowest >= 2 {
                        hi == min_height && hj == min_height
                    } else {
                        hi == min_height || hj == min_height
                    };
                    if !allowed {
                        continue;
                    }
                    let cost = self.pool[nodes[i]]
                        .aabb
                        .union(&self.pool[nodes[j]].aabb)
                        .perimeter();
                    if best.is_none_or(|(c, _, _)| cost < c) {
                        best = Some((cost, i, j));
                    }
                }
            }
            let (_, i_min, j_min) =
                best.expect("at least one pair involves a lowest node");

            let child1 = nodes[i_min];
            let child2 = nodes[j_min];
            let parent = self.pool.allocate();
            let node = &mut self.pool[parent];
            node.link = None;
            node.kind = Kind::Internal { child1, child2 };
            self.pool[child1].link = Some(parent);
            self.pool[child2].link = Some(parent);
            self.refit(parent);

            nodes.swap_remove(j_min);
            nodes[i_min] = parent;
        }

        self.root = Some(nodes[0]);
        log::debug!(
            "rebuilt dynamic tree bottom-up: {} proxies, height {}",
            self.proxy_count,
            self.height()
        );

        if cfg!(debug_assertions) {
            self.validate();
        }
    }

    /// Move the world origin: every stored box is translated by `-new_origin`.
    ///
    /// Useful for large worlds that periodically recenter around the area of
    /// interest. The tree structure is unchanged.
    pub fn shift_origin(&mut self, new_origin: Vec2D<T>) {
        let dx = -new_origin.x;
        let dy = -new_origin.y;
        for node in self.pool.iter_live_mut() {
            node.aabb = node.aabb.translate(dx, dy);
        }
        log::debug!("shifted dynamic tree origin by {new_origin:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::tree::ProxyId;
    use crate::tree::tests::{Rng, random_box};
    use crate::types::Aabb2D;

    fn random_tree(seed: u64, n: u32) -> (DynamicTree<f64, u32>, Vec<ProxyId>) {
        let mut tree = DynamicTree::new();
        let mut rng = Rng::new(seed);
        let ids = (0..n)
            .map(|i| tree.create_proxy(random_box(&mut rng, 100.0), i))
            .collect();
        (tree, ids)
    }

    fn hits(tree: &DynamicTree<f64, u32>, rect: Aabb2D<f64>) -> Vec<ProxyId> {
        let mut v: Vec<ProxyId> = tree.query_rect(rect).map(|(id, _)| id).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn empty_tree_metrics() {
        let tree: DynamicTree<f64, u32> = DynamicTree::new();
        tree.validate();
        assert_eq!(tree.compute_height(), 0);
        assert_eq!(tree.max_balance(), 0);
        assert_eq!(tree.area_ratio(), 0.0);
    }

    #[test]
    fn computed_height_matches_cached_height() {
        let (mut tree, ids) = random_tree(0x1234_5678_9ABC_DEF1, 300);
        assert_eq!(tree.compute_height(), tree.height());
        for id in ids.iter().step_by(3) {
            tree.destroy_proxy(*id);
        }
        assert_eq!(tree.compute_height(), tree.height());
        assert!(tree.max_balance() <= 1);
    }

    #[test]
    fn area_ratio_sums_node_perimeters() {
        let mut tree: DynamicTree<f64, u32> = DynamicTree::with_config(TreeConfig::tight());
        tree.create_proxy(Aabb2D::new(0.0, 0.0, 1.0, 1.0), 1);
        assert_eq!(tree.area_ratio(), 1.0);
        tree.create_proxy(Aabb2D::new(2.0, 0.0, 3.0, 1.0), 2);
        // Leaves 4 + 4, root 8.
        assert_eq!(tree.area_ratio(), 2.0);
    }

    #[test]
    fn area_ratio_of_degenerate_root_is_zero() {
        let mut tree: DynamicTree<f64, u32> = DynamicTree::with_config(TreeConfig::tight());
        tree.create_proxy(Aabb2D::new(1.0, 1.0, 1.0, 1.0), 1);
        assert_eq!(tree.area_ratio(), 0.0);
    }

    #[test]
    fn rebuild_preserves_proxies_and_queries() {
        let (mut tree, ids) = random_tree(0x0BAD_F00D_0000_0042, 120);
        let probes = [
            Aabb2D::new(0.0, 0.0, 25.0, 25.0),
            Aabb2D::new(40.0, 10.0, 60.0, 90.0),
            Aabb2D::new(90.0, 90.0, 120.0, 120.0),
            Aabb2D::new(-10.0, -10.0, 200.0, 200.0),
        ];
        let before: Vec<Vec<ProxyId>> = probes.iter().map(|r| hits(&tree, *r)).collect();
        let fat_before: Vec<Aabb2D<f64>> = ids.iter().map(|id| tree.fat_aabb(*id)).collect();

        tree.rebuild_bottom_up();
        tree.validate();

        assert_eq!(tree.len(), 120);
        assert_eq!(tree.node_count(), 2 * 120 - 1);
        for (k, id) in ids.iter().enumerate() {
            assert_eq!(tree.payload(*id), u32::try_from(k).unwrap());
            assert_eq!(tree.fat_aabb(*id), fat_before[k]);
        }
        let after: Vec<Vec<ProxyId>> = probes.iter().map(|r| hits(&tree, *r)).collect();
        assert_eq!(before, after);
        assert!(tree.max_balance() <= 1);
    }

    #[test]
    fn rebuild_of_sequential_row_is_balanced() {
        let mut tree: DynamicTree<f64, u32> = DynamicTree::with_config(TreeConfig::tight());
        for i in 0..37 {
            let x = f64::from(i);
            tree.create_proxy(Aabb2D::new(x, 0.0, x + 0.5, 1.0), i);
        }
        tree.rebuild_bottom_up();
        tree.validate();
        assert!(tree.max_balance() <= 1);
        // 37 leaves need at least 6 levels; a balanced tree needs no more than 7.
        assert!((6..=7).contains(&tree.height()), "height {}", tree.height());
    }

    #[test]
    fn rebuild_small_trees() {
        let mut tree: DynamicTree<f64, u32> = DynamicTree::new();
        tree.rebuild_bottom_up();
        assert!(tree.is_empty());

        let a = tree.create_proxy(Aabb2D::new(0.0, 0.0, 1.0, 1.0), 1);
        tree.rebuild_bottom_up();
        assert_eq!(tree.root, Some(a.node()));
        tree.validate();

        let b = tree.create_proxy(Aabb2D::new(5.0, 0.0, 6.0, 1.0), 2);
        tree.rebuild_bottom_up();
        tree.validate();
        assert_eq!(tree.height(), 1);
        assert!(tree.contains(a) && tree.contains(b));
    }

    #[test]
    fn tree_keeps_working_after_rebuild() {
        let (mut tree, ids) = random_tree(0x7777_0000_1111_2222, 50);
        tree.rebuild_bottom_up();
        for id in ids.iter().take(20) {
            tree.destroy_proxy(*id);
        }
        let mut rng = Rng::new(99);
        for i in 0..20 {
            tree.create_proxy(random_box(&mut rng, 100.0), 1000 + i);
        }
        tree.validate();
        assert_eq!(tree.len(), 50);
    }

    #[test]
    fn shift_origin_translates_every_box() {
        let mut tree: DynamicTree<f64, u32> = DynamicTree::with_config(TreeConfig::tight());
        let a = tree.create_proxy(Aabb2D::new(10.0, 10.0, 11.0, 11.0), 1);
        let b = tree.create_proxy(Aabb2D::new(20.0, 10.0, 21.0, 11.0), 2);
        tree.shift_origin(Vec2D::new(10.0, 10.0));
        tree.validate();

        assert_eq!(tree.fat_aabb(a), Aabb2D::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(tree.fat_aabb(b), Aabb2D::new(10.0, 0.0, 11.0, 1.0));
        let root = tree.root.expect("root exists");
        assert_eq!(tree.pool[root].aabb, Aabb2D::new(0.0, 0.0, 11.0, 1.0));
        let found: Vec<u32> = tree.query_point(0.5, 0.5).map(|(_, p)| p).collect();
        assert_eq!(found, [1]);
    }

    #[test]
    #[should_panic(expected = "height does not match")]
    fn validate_catches_stale_height() {
        let (mut tree, _) = random_tree(5, 8);
        let root = tree.root.expect("root exists");
        tree.pool[root].height += 1;
        tree.validate();
    }

    #[test]
    #[should_panic(expected = "does not enclose its children")]
    fn validate_catches_shrunken_parent() {
        let (mut tree, _) = random_tree(6, 8);
        let root = tree.root.expect("root exists");
        let aabb = tree.pool[root].aabb;
        tree.pool[root].aabb = Aabb2D::new(aabb.min_x + 1.0, aabb.min_y, aabb.max_x, aabb.max_y);
        tree.validate();
    }
}
