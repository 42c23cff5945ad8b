// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node pool: a growable arena of tree nodes with an intrusive free list.
//!
//! Nodes are addressed by index only. Growing the pool may move the backing
//! storage, so nothing outside this module holds references across an
//! allocation.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::{Index, IndexMut};

use crate::types::{Aabb2D, Scalar};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Kind<P> {
    Free,
    Leaf(P),
    Internal { child1: NodeIdx, child2: NodeIdx },
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T, P> {
    /// Fat AABB for leaves, enclosing AABB for internal nodes.
    pub(crate) aabb: Aabb2D<T>,
    /// Parent while live, next free slot while pooled.
    pub(crate) link: Option<NodeIdx>,
    /// Leaf = 0, free = -1.
    pub(crate) height: i32,
    pub(crate) kind: Kind<P>,
}

impl<T: Scalar, P> Node<T, P> {
    fn pooled(next: Option<NodeIdx>) -> Self {
        Self {
            aabb: Aabb2D::new(T::zero(), T::zero(), T::zero(), T::zero()),
            link: next,
            height: -1,
            kind: Kind::Free,
        }
    }
}

impl<T, P> Node<T, P> {
    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf(_))
    }

    pub(crate) const fn is_free(&self) -> bool {
        matches!(self.kind, Kind::Free)
    }
}

pub(crate) struct NodePool<T, P> {
    nodes: Vec<Node<T, P>>,
    free_list: Option<NodeIdx>,
    live: usize,
    initial_capacity: usize,
}

impl<T: Scalar, P: Copy + Debug> NodePool<T, P> {
    pub(crate) fn new(initial_capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            free_list: None,
            live: 0,
            initial_capacity: initial_capacity.max(1),
        }
    }

    /// Take a slot off the free list, growing the pool when it is exhausted.
    ///
    /// The returned node is still marked free (`height == -1`); the caller
    /// fills in its kind, height and links.
    pub(crate) fn allocate(&mut self) -> NodeIdx {
        let idx = match self.free_list {
            Some(idx) => idx,
            None => self.grow(),
        };
        let node = &mut self.nodes[idx.get()];
        debug_assert!(node.is_free(), "free list head {idx:?} is live");
        self.free_list = node.link.take();
        self.live += 1;
        idx
    }

    /// Return a live slot to the free list.
    pub(crate) fn free(&mut self, idx: NodeIdx) {
        let head = self.free_list;
        let node = &mut self.nodes[idx.get()];
        assert!(!node.is_free(), "node {idx:?} freed twice");
        node.kind = Kind::Free;
        node.height = -1;
        node.link = head;
        self.free_list = Some(idx);
        self.live -= 1;
    }

    /// Double the capacity and thread the free list through the new slots.
    /// Returns the first new slot.
    fn grow(&mut self) -> NodeIdx {
        debug_assert!(self.free_list.is_none(), "grow with a non-empty free list");
        let old = self.nodes.len();
        let new_capacity = (old * 2).max(self.initial_capacity);
        self.nodes.reserve_exact(new_capacity - old);
        for i in old..new_capacity {
            let next = (i + 1 < new_capacity).then_some(NodeIdx::new(i + 1));
            self.nodes.push(Node::pooled(next));
        }
        log::debug!("dynamic tree node pool grew from {old} to {new_capacity} slots");
        NodeIdx::new(old)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free_list = None;
        self.live = 0;
    }

    /// Bounds-checked lookup for indices that come from callers.
    pub(crate) fn slot(&self, idx: NodeIdx) -> Option<&Node<T, P>> {
        self.nodes.get(idx.get())
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn free_list_head(&self) -> Option<NodeIdx> {
        self.free_list
    }

    pub(crate) fn indices(&self) -> impl Iterator<Item = NodeIdx> + use<T, P> {
        (0..self.nodes.len()).map(NodeIdx::new)
    }

    pub(crate) fn iter_live(&self) -> impl Iterator<Item = &Node<T, P>> {
        self.nodes.iter().filter(|n| !n.is_free())
    }

    pub(crate) fn iter_live_mut(&mut self) -> impl Iterator<Item = &mut Node<T, P>> {
        self.nodes.iter_mut().filter(|n| !n.is_free())
    }
}

impl<T, P> Index<NodeIdx> for NodePool<T, P> {
    type Output = Node<T, P>;

    #[inline]
    fn index(&self, idx: NodeIdx) -> &Self::Output {
        &self.nodes[idx.get()]
    }
}

impl<T, P> IndexMut<NodeIdx> for NodePool<T, P> {
    #[inline]
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Self::Output {
        &mut self.nodes[idx.get()]
    }
}

impl<T, P> Debug for NodePool<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodePool")
            .field("capacity", &self.nodes.len())
            .field("live", &self.live)
            .field("free_head", &self.free_list)
            .finish_non_exhaustive()
    }
}
