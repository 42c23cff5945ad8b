// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: proxies, insertion, removal, and balancing.

use core::fmt::Debug;

use crate::config::TreeConfig;
use crate::pool::{Kind, Node, NodeIdx, NodePool};
use crate::types::{Aabb2D, Scalar, Vec2D};

/// Handle of a proxy (a leaf) in a [`DynamicTree`].
///
/// The id is the leaf's slot in the node pool. It stays valid from
/// [`DynamicTree::create_proxy`] until [`DynamicTree::destroy_proxy`], across
/// any number of moves and rebalances, after which the slot may be reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(u32);

impl ProxyId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Proxy ids are intentionally 32-bit; pools never approach u32::MAX slots."
    )]
    pub(crate) const fn new(idx: NodeIdx) -> Self {
        Self(idx.get() as u32)
    }

    pub(crate) const fn node(self) -> NodeIdx {
        NodeIdx::new(self.0 as usize)
    }

    /// The slot index backing this proxy.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A dynamic AABB tree.
///
/// Leaves are proxies holding a caller payload and a fat AABB: the tight box
/// grown by [`TreeConfig::aabb_margin`]. Internal nodes enclose their two
/// children and the tree is kept height balanced, so point updates are
/// `O(log n)`.
///
/// Mutations take `&mut self` and traversals take `&self`; the borrow checker
/// rules out mutating the tree from inside a visitor.
pub struct DynamicTree<T: Scalar, P: Copy + Debug> {
    pub(crate) pool: NodePool<T, P>,
    pub(crate) root: Option<NodeIdx>,
    pub(crate) proxy_count: usize,
    config: TreeConfig<T>,
    insertion_count: u64,
}

impl<T: Scalar, P: Copy + Debug> Default for DynamicTree<T, P> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<T: Scalar, P: Copy + Debug> DynamicTree<T, P> {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with an explicit configuration.
    pub fn with_config(config: TreeConfig<T>) -> Self {
        assert!(
            config.aabb_margin >= T::zero(),
            "aabb_margin must be non-negative, got {:?}",
            config.aabb_margin
        );
        assert!(
            config.displacement_multiplier >= T::zero(),
            "displacement_multiplier must be non-negative, got {:?}",
            config.displacement_multiplier
        );
        Self {
            pool: NodePool::new(config.initial_capacity),
            root: None,
            proxy_count: 0,
            config,
            insertion_count: 0,
        }
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &TreeConfig<T> {
        &self.config
    }

    /// Create a proxy for a tight AABB and return its id.
    ///
    /// The stored box is `aabb` grown by the configured margin.
    pub fn create_proxy(&mut self, aabb: Aabb2D<T>, payload: P) -> ProxyId {
        debug_assert!(!aabb.is_empty(), "proxy AABB is inverted: {aabb:?}");
        let leaf = self.pool.allocate();
        let node = &mut self.pool[leaf];
        node.aabb = aabb.inflate(self.config.aabb_margin);
        node.kind = Kind::Leaf(payload);
        node.height = 0;
        node.link = None;
        self.insert_leaf(leaf);
        self.proxy_count += 1;
        ProxyId::new(leaf)
    }

    /// Destroy a proxy. Panics if `proxy` is not live.
    pub fn destroy_proxy(&mut self, proxy: ProxyId) {
        let leaf = self.leaf_index(proxy);
        self.remove_leaf(leaf);
        self.pool.free(leaf);
        self.proxy_count -= 1;
    }

    /// Move a proxy to a new tight AABB.
    ///
    /// If the fat AABB still contains `aabb` nothing changes and this returns
    /// `false`. Otherwise the leaf is re-inserted under the same id with a new
    /// fat box, extended along `displacement` scaled by
    /// [`TreeConfig::displacement_multiplier`], and this returns `true`.
    pub fn move_proxy(&mut self, proxy: ProxyId, aabb: Aabb2D<T>, displacement: Vec2D<T>) -> bool {
        debug_assert!(!aabb.is_empty(), "proxy AABB is inverted: {aabb:?}");
        let leaf = self.leaf_index(proxy);
        if self.pool[leaf].aabb.contains(&aabb) {
            return false;
        }

        self.remove_leaf(leaf);

        let mut fat = aabb.inflate(self.config.aabb_margin);
        let d = displacement.scale(self.config.displacement_multiplier);
        if d.x < T::zero() {
            fat.min_x = fat.min_x + d.x;
        } else {
            fat.max_x = fat.max_x + d.x;
        }
        if d.y < T::zero() {
            fat.min_y = fat.min_y + d.y;
        } else {
            fat.max_y = fat.max_y + d.y;
        }
        self.pool[leaf].aabb = fat;

        self.insert_leaf(leaf);
        log::trace!("proxy {proxy:?} re-inserted with fat AABB {fat:?}");
        true
    }

    /// Payload of a live proxy. Panics if `proxy` is not live.
    pub fn payload(&self, proxy: ProxyId) -> P {
        match self.pool[self.leaf_index(proxy)].kind {
            Kind::Leaf(payload) => payload,
            _ => unreachable!("leaf_index only returns leaves"),
        }
    }

    /// Fat AABB of a live proxy. Panics if `proxy` is not live.
    pub fn fat_aabb(&self, proxy: ProxyId) -> Aabb2D<T> {
        self.pool[self.leaf_index(proxy)].aabb
    }

    /// Whether `proxy` refers to a live proxy.
    pub fn contains(&self, proxy: ProxyId) -> bool {
        self.pool.slot(proxy.node()).is_some_and(Node::is_leaf)
    }

    /// Number of live proxies.
    pub fn len(&self) -> usize {
        self.proxy_count
    }

    /// True if the tree holds no proxies.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of live nodes, leaves and internal.
    pub fn node_count(&self) -> usize {
        self.pool.live()
    }

    /// Number of node slots in the pool, live or free.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Total leaf insertions performed, including re-insertions from moves.
    pub fn insertion_count(&self) -> u64 {
        self.insertion_count
    }

    /// Height of the tree in `O(1)`. An empty tree and a single leaf both report 0.
    pub fn height(&self) -> u32 {
        self.root.map_or(0, |r| self.pool[r].height.unsigned_abs())
    }

    /// Remove every proxy and release the node pool.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.root = None;
        self.proxy_count = 0;
    }

    /// Iterate over live proxies and their payloads, in slot order.
    pub fn proxies(&self) -> impl Iterator<Item = (ProxyId, P)> + '_ {
        self.pool.indices().filter_map(move |i| match self.pool[i].kind {
            Kind::Leaf(payload) => Some((ProxyId::new(i), payload)),
            _ => None,
        })
    }

    fn leaf_index(&self, proxy: ProxyId) -> NodeIdx {
        assert!(self.contains(proxy), "invalid proxy {proxy:?}: not a live leaf");
        proxy.node()
    }

    pub(crate) fn children(&self, idx: NodeIdx) -> (NodeIdx, NodeIdx) {
        match self.pool[idx].kind {
            Kind::Internal { child1, child2 } => (child1, child2),
            _ => panic!("node {idx:?} is not an internal node"),
        }
    }

    /// Recompute an internal node's height and AABB from its children.
    pub(crate) fn refit(&mut self, idx: NodeIdx) {
        let (child1, child2) = self.children(idx);
        let (a1, h1) = (self.pool[child1].aabb, self.pool[child1].height);
        let (a2, h2) = (self.pool[child2].aabb, self.pool[child2].height);
        let node = &mut self.pool[idx];
        node.height = 1 + h1.max(h2);
        node.aabb = a1.union(&a2);
    }

    fn replace_child(&mut self, parent: NodeIdx, old: NodeIdx, new: NodeIdx) {
        match &mut self.pool[parent].kind {
            Kind::Internal { child1, .. } if *child1 == old => *child1 = new,
            Kind::Internal { child2, .. } => {
                debug_assert_eq!(*child2, old, "{old:?} is not a child of {parent:?}");
                *child2 = new;
            }
            _ => panic!("node {parent:?} is not an internal node"),
        }
    }

    /// Link a detached leaf into the tree next to the sibling with the lowest
    /// perimeter cost, then refit and balance its ancestors.
    pub(crate) fn insert_leaf(&mut self, leaf: NodeIdx) {
        self.insertion_count += 1;

        let Some(root) = self.root else {
            self.root = Some(leaf);
            self.pool[leaf].link = None;
            return;
        };

        let leaf_aabb = self.pool[leaf].aabb;
        let sibling = self.pick_sibling(root, &leaf_aabb);

        let old_parent = self.pool[sibling].link;
        let new_parent = self.pool.allocate();
        let sibling_node = &self.pool[sibling];
        let aabb = leaf_aabb.union(&sibling_node.aabb);
        let height = sibling_node.height + 1;
        let node = &mut self.pool[new_parent];
        node.link = old_parent;
        node.aabb = aabb;
        node.height = height;
        node.kind = Kind::Internal {
            child1: sibling,
            child2: leaf,
        };
        self.pool[sibling].link = Some(new_parent);
        self.pool[leaf].link = Some(new_parent);

        match old_parent {
            Some(p) => self.replace_child(p, sibling, new_parent),
            None => self.root = Some(new_parent),
        }

        self.refit_ancestors(Some(new_parent));
    }

    /// Descend from `root` towards the cheapest place to pair `leaf_aabb`.
    ///
    /// At each internal node we compare the cost of creating a new parent
    /// right here against the cost of descending into either child. The
    /// descent may stop above the leaves only at height-1 nodes so that the
    /// new parent is itself balanced.
    fn pick_sibling(&self, root: NodeIdx, leaf_aabb: &Aabb2D<T>) -> NodeIdx {
        let two = T::acc_from_usize(2);
        let mut index = root;
        while let Kind::Internal { child1, child2 } = self.pool[index].kind {
            let node = &self.pool[index];
            let area = node.aabb.perimeter();
            let combined_area = node.aabb.union(leaf_aabb).perimeter();

            // Cost of creating a new parent for this node and the new leaf.
            let cost = two * combined_area;

            // Minimum cost of pushing the leaf further down the tree.
            let inheritance = two * (combined_area - area);

            let cost1 = self.descend_cost(child1, leaf_aabb, inheritance);
            let cost2 = self.descend_cost(child2, leaf_aabb, inheritance);

            if node.height <= 1 && cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 < cost2 { child1 } else { child2 };
        }
        index
    }

    fn descend_cost(&self, child: NodeIdx, leaf_aabb: &Aabb2D<T>, inheritance: T::Acc) -> T::Acc {
        let node = &self.pool[child];
        let enlarged = node.aabb.union(leaf_aabb).perimeter();
        if node.is_leaf() {
            enlarged + inheritance
        } else {
            enlarged - node.aabb.perimeter() + inheritance
        }
    }

    /// Unlink a leaf from the tree without freeing it.
    pub(crate) fn remove_leaf(&mut self, leaf: NodeIdx) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }

        let parent = self.pool[leaf]
            .link
            .expect("non-root leaf must have a parent");
        let (child1, child2) = self.children(parent);
        let sibling = if child1 == leaf { child2 } else { child1 };
        let grandparent = self.pool[parent].link;

        self.pool[leaf].link = None;
        self.pool.free(parent);

        match grandparent {
            Some(g) => {
                self.replace_child(g, parent, sibling);
                self.pool[sibling].link = Some(g);
                self.refit_ancestors(Some(g));
            }
            None => {
                self.root = Some(sibling);
                self.pool[sibling].link = None;
            }
        }
    }

    fn refit_ancestors(&mut self, mut index: Option<NodeIdx>) {
        while let Some(i) = index {
            let i = self.balance(i);
            self.refit(i);
            index = self.pool[i].link;
        }
    }

    /// Restore the height balance at `a` with a single rotation if one child
    /// is two or more levels taller. Returns the node now at `a`'s position.
    pub(crate) fn balance(&mut self, a: NodeIdx) -> NodeIdx {
        let node = &self.pool[a];
        let Kind::Internal { child1: b, child2: c } = node.kind else {
            return a;
        };
        if node.height < 2 {
            return a;
        }

        let diff = self.pool[c].height - self.pool[b].height;
        if diff > 1 {
            self.rotate_up(a, c)
        } else if diff < -1 {
            self.rotate_up(a, b)
        } else {
            a
        }
    }

    /// Rotate `tall`, a child of `a`, into `a`'s position.
    ///
    /// The taller of `tall`'s children stays with it (ties keep the second
    /// child); the other one takes `tall`'s old slot under `a`, and `a`
    /// becomes `tall`'s first child.
    fn rotate_up(&mut self, a: NodeIdx, tall: NodeIdx) -> NodeIdx {
        let (f, g) = self.children(tall);
        let parent = self.pool[a].link;

        self.pool[tall].link = parent;
        self.pool[a].link = Some(tall);
        match parent {
            Some(p) => self.replace_child(p, a, tall),
            None => self.root = Some(tall),
        }

        let (keep, give) = if self.pool[f].height > self.pool[g].height {
            (f, g)
        } else {
            (g, f)
        };

        self.replace_child(a, tall, give);
        self.pool[give].link = Some(a);
        self.pool[tall].kind = Kind::Internal {
            child1: a,
            child2: keep,
        };

        self.refit(a);
        self.refit(tall);
        tall
    }
}

impl<T: Scalar, P: Copy + Debug> Debug for DynamicTree<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicTree")
            .field("proxies", &self.proxy_count)
            .field("nodes", &self.pool.live())
            .field("capacity", &self.pool.capacity())
            .field("height", &self.height())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Dynamic tree with f32 coordinates and f64 metrics.
pub type DynamicTreeF32<P> = DynamicTree<f32, P>;

/// Dynamic tree with f64 coordinates and f64 metrics.
pub type DynamicTreeF64<P> = DynamicTree<f64, P>;
