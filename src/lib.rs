//! # keyed-tree
//!
//! An ordered set of values keyed by a caller-supplied extractor, stored in a
//! left-leaning red-black tree (LLRB).
//!
//! Nodes live in a single growable arena addressed by `u32` slot indices, so
//! there is no per-node heap allocation. Removed slots go on a free list and
//! are reused before the arena grows again. Every operation is `O(log N)` in
//! the worst case.
//!
//! ## Example
//!
//! ```rust
//! use keyed_tree::KeyedTree;
//!
//! struct Segment {
//!     start: u32,
//!     label: &'static str,
//! }
//!
//! let mut segments = KeyedTree::new(|s: &Segment| s.start);
//! segments.insert(Segment { start: 10, label: "b" });
//! segments.insert(Segment { start: 0, label: "a" });
//! segments.insert(Segment { start: 20, label: "c" });
//!
//! assert_eq!(segments.get(&10).map(|s| s.label), Some("b"));
//! assert_eq!(segments.floor(&15).map(|s| s.label), Some("b"));
//! assert_eq!(segments.ceiling(&15).map(|s| s.label), Some("c"));
//!
//! let labels: Vec<&str> = segments.iter().map(|s| s.label).collect();
//! assert_eq!(labels, ["a", "b", "c"]);
//! ```
//!
//! The key returned by the extractor for a stored value must not change while
//! the value is in the tree. Nothing detects a violation; ordering silently
//! breaks.

#![forbid(unsafe_code)]

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;

use log::{debug, trace};

mod error;
#[cfg(feature = "serde")]
mod serde_impl;

pub use error::{InvariantViolation, RemoveError};
#[cfg(feature = "serde")]
pub use serde_impl::KeyedTreeSeed;

// =============================================================================
// Slot index
// =============================================================================

/// Arena index. Slot 0 is a permanent sentinel meaning "no node".
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Slot(u32);

impl Slot {
    const NIL: Slot = Slot(0);

    #[inline]
    fn is_nil(self) -> bool {
        self.0 == 0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(raw) => Self(raw),
            Err(_) => panic!("node arena exceeded {} slots", u32::MAX),
        }
    }
}

/// Color of the link from a node's parent into the node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

#[derive(Clone)]
struct Node<V> {
    /// `None` for the sentinel and for slots sitting on the free list.
    value: Option<V>,
    left: Slot,
    right: Slot,
    color: Color,
}

impl<V> Node<V> {
    const fn vacant() -> Self {
        Self {
            value: None,
            left: Slot::NIL,
            right: Slot::NIL,
            color: Color::Black,
        }
    }

    const fn leaf(value: V) -> Self {
        Self {
            value: Some(value),
            left: Slot::NIL,
            right: Slot::NIL,
            color: Color::Red,
        }
    }
}

// =============================================================================
// Node Arena
// =============================================================================
//
// `nodes[0]` is the sentinel. Every other slot is either linked into the tree
// (value present) or on the free list (value absent). The arena never shrinks.
//
// The structural LLRB primitives live here because they only touch links and
// colors; anything that compares keys lives on `KeyedTree`.

#[derive(Clone)]
struct NodeArena<V> {
    nodes: Vec<Node<V>>,
    free: Vec<Slot>,
}

impl<V> NodeArena<V> {
    fn with_capacity(entries: usize) -> Self {
        let mut nodes = Vec::with_capacity(entries.saturating_add(1));
        nodes.push(Node::vacant());
        Self {
            nodes,
            free: Vec::new(),
        }
    }

    /// Entries the arena can hold before it has to reallocate.
    #[inline]
    fn capacity(&self) -> usize {
        self.nodes.capacity() - 1
    }

    fn ensure_capacity(&mut self, entries: usize) {
        let needed = entries.saturating_add(1);
        if needed <= self.nodes.capacity() {
            return;
        }
        let old = self.capacity();
        self.nodes.reserve_exact(needed - self.nodes.len());
        trace!(
            "node arena reserved from {} to {} entries",
            old,
            self.capacity()
        );
    }

    fn memory_usage(&self) -> usize {
        self.nodes.capacity() * mem::size_of::<Node<V>>()
            + self.free.capacity() * mem::size_of::<Slot>()
    }

    fn clear(&mut self) {
        self.nodes.truncate(1);
        self.free.clear();
    }

    fn alloc(&mut self, value: V) -> Slot {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot.index()] = Node::leaf(value);
            return slot;
        }

        let slot = Slot::from_index(self.nodes.len());
        if self.nodes.len() == self.nodes.capacity() {
            let old = self.nodes.capacity();
            self.nodes.reserve_exact(self.nodes.len());
            debug!(
                "node arena grown from {} to {} slots",
                old,
                self.nodes.capacity()
            );
        }
        self.nodes.push(Node::leaf(value));
        slot
    }

    /// Vacates `slot`, pushes it on the free list and hands back its value.
    fn release(&mut self, slot: Slot) -> Option<V> {
        debug_assert!(!slot.is_nil(), "releasing the sentinel slot");
        let node = mem::replace(&mut self.nodes[slot.index()], Node::vacant());
        self.free.push(slot);
        node.value
    }

    #[inline]
    fn node(&self, slot: Slot) -> &Node<V> {
        &self.nodes[slot.index()]
    }

    #[inline]
    fn node_mut(&mut self, slot: Slot) -> &mut Node<V> {
        &mut self.nodes[slot.index()]
    }

    #[inline]
    fn left(&self, slot: Slot) -> Slot {
        self.node(slot).left
    }

    #[inline]
    fn right(&self, slot: Slot) -> Slot {
        self.node(slot).right
    }

    #[inline]
    fn is_red(&self, slot: Slot) -> bool {
        !slot.is_nil() && self.node(slot).color == Color::Red
    }

    #[inline]
    fn value(&self, slot: Slot) -> &V {
        match self.node(slot).value.as_ref() {
            Some(value) => value,
            None => unreachable!("vacant slot {} is linked into the tree", slot.0),
        }
    }

    #[inline]
    fn value_mut(&mut self, slot: Slot) -> &mut V {
        match self.node_mut(slot).value.as_mut() {
            Some(value) => value,
            None => unreachable!("vacant slot {} is linked into the tree", slot.0),
        }
    }

    fn min_slot(&self, mut slot: Slot) -> Slot {
        while !self.left(slot).is_nil() {
            slot = self.left(slot);
        }
        slot
    }

    fn max_slot(&self, mut slot: Slot) -> Slot {
        while !self.right(slot).is_nil() {
            slot = self.right(slot);
        }
        slot
    }

    //              h                       x
    //             / \                     / \
    //            a  (x)       =>        (h)  c
    //               / \                 / \
    //              b   c               a   b
    fn rotate_left(&mut self, h: Slot) -> Slot {
        let x = self.right(h);
        debug_assert!(self.is_red(x), "rotating a black link left");
        let x_left = self.left(x);
        let h_color = self.node(h).color;
        self.node_mut(h).right = x_left;
        self.node_mut(h).color = Color::Red;
        let x_node = self.node_mut(x);
        x_node.left = h;
        x_node.color = h_color;
        x
    }

    //              h                       x
    //             / \                     / \
    //           (x)  c        =>         a  (h)
    //           / \                         / \
    //          a   b                       b   c
    fn rotate_right(&mut self, h: Slot) -> Slot {
        let x = self.left(h);
        debug_assert!(self.is_red(x), "rotating a black link right");
        let x_right = self.right(x);
        let h_color = self.node(h).color;
        self.node_mut(h).left = x_right;
        self.node_mut(h).color = Color::Red;
        let x_node = self.node_mut(x);
        x_node.right = h;
        x_node.color = h_color;
        x
    }

    fn flip_colors(&mut self, h: Slot) {
        let (left, right) = (self.left(h), self.right(h));
        debug_assert!(
            !left.is_nil() && !right.is_nil(),
            "color flip on slot {} with a missing child",
            h.0
        );
        for slot in [h, left, right] {
            let node = self.node_mut(slot);
            node.color = node.color.flip();
        }
    }

    /// Restores the left-leaning shape at `h` after a child link changed.
    ///
    /// Applied unconditionally at every node on the way back up from an
    /// insertion or deletion.
    fn balance(&mut self, mut h: Slot) -> Slot {
        if self.is_red(self.right(h)) && !self.is_red(self.left(h)) {
            h = self.rotate_left(h);
        }
        let left = self.left(h);
        if self.is_red(left) && self.is_red(self.left(left)) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.left(h)) && self.is_red(self.right(h)) {
            self.flip_colors(h);
        }
        h
    }

    /// Makes `h.left` or one of its children red before descending left.
    fn move_red_left(&mut self, mut h: Slot) -> Slot {
        self.flip_colors(h);
        let right = self.right(h);
        if self.is_red(self.left(right)) {
            let right = self.rotate_right(right);
            self.node_mut(h).right = right;
            h = self.rotate_left(h);
            self.flip_colors(h);
        }
        h
    }

    /// Makes `h.right` or one of its children red before descending right.
    fn move_red_right(&mut self, mut h: Slot) -> Slot {
        self.flip_colors(h);
        if self.is_red(self.left(self.left(h))) {
            h = self.rotate_right(h);
            self.flip_colors(h);
        }
        h
    }

    /// Unlinks the minimum of the subtree rooted at `h`.
    ///
    /// Returns the new subtree root and the unlinked slot. The slot still holds
    /// its value; the caller releases it.
    fn delete_min(&mut self, mut h: Slot) -> (Slot, Slot) {
        if self.left(h).is_nil() {
            return (Slot::NIL, h);
        }
        let left = self.left(h);
        if !self.is_red(left) && !self.is_red(self.left(left)) {
            h = self.move_red_left(h);
        }
        let (left, min) = self.delete_min(self.left(h));
        self.node_mut(h).left = left;
        (self.balance(h), min)
    }

    /// Mirror of [`delete_min`](Self::delete_min).
    fn delete_max(&mut self, mut h: Slot) -> (Slot, Slot) {
        if self.is_red(self.left(h)) {
            h = self.rotate_right(h);
        }
        if self.right(h).is_nil() {
            return (Slot::NIL, h);
        }
        let right = self.right(h);
        if !self.is_red(right) && !self.is_red(self.left(right)) {
            h = self.move_red_right(h);
        }
        let (right, max) = self.delete_max(self.right(h));
        self.node_mut(h).right = right;
        (self.balance(h), max)
    }

    #[cfg(test)]
    fn height(&self, slot: Slot) -> usize {
        if slot.is_nil() {
            return 0;
        }
        1 + self.height(self.left(slot)).max(self.height(self.right(slot)))
    }
}

// =============================================================================
// KeyedTree
// =============================================================================

/// An ordered set of `V`, keyed by `F(&V) -> K`.
///
/// Inserting a value whose key is already present overwrites the stored value.
/// Lookups return references into the arena; nothing is cloned.
pub struct KeyedTree<K, V, F = fn(&V) -> K> {
    arena: NodeArena<V>,
    root: Slot,
    len: usize,
    key_fn: F,
    _key: PhantomData<fn() -> K>,
}

impl<K, V, F> KeyedTree<K, V, F> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries the tree can hold before the arena reallocates.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Grows the arena so it can hold at least `entries` values. Never shrinks.
    pub fn ensure_capacity(&mut self, entries: usize) {
        self.arena.ensure_capacity(entries);
    }

    /// Bytes held by the node arena and its free list.
    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage()
    }

    /// Drops every value. The arena allocation is kept for reuse.
    pub fn clear(&mut self) {
        trace!("clearing tree of {} entries", self.len);
        self.arena.clear();
        self.root = Slot::NIL;
        self.len = 0;
    }

    pub fn key_fn(&self) -> &F {
        &self.key_fn
    }

    /// Values in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, self.root, self.len)
    }

    pub fn first(&self) -> Option<&V> {
        (!self.root.is_nil()).then(|| self.arena.value(self.arena.min_slot(self.root)))
    }

    pub fn last(&self) -> Option<&V> {
        (!self.root.is_nil()).then(|| self.arena.value(self.arena.max_slot(self.root)))
    }

    /// Longest root-to-leaf path, in nodes.
    #[cfg(test)]
    fn height(&self) -> usize {
        self.arena.height(self.root)
    }
}

impl<K, V, F> KeyedTree<K, V, F>
where
    K: Ord,
    F: Fn(&V) -> K,
{
    pub fn new(key_fn: F) -> Self {
        Self::with_capacity(0, key_fn)
    }

    pub fn with_capacity(entries: usize, key_fn: F) -> Self {
        Self {
            arena: NodeArena::with_capacity(entries),
            root: Slot::NIL,
            len: 0,
            key_fn,
            _key: PhantomData,
        }
    }

    #[inline]
    fn cmp_key<Q>(&self, slot: Slot, key: &Q) -> Ordering
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let stored = (self.key_fn)(self.arena.value(slot));
        let stored: &Q = stored.borrow();
        stored.cmp(key)
    }

    fn find<Q>(&self, key: &Q) -> Slot
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut slot = self.root;
        while !slot.is_nil() {
            slot = match self.cmp_key(slot, key) {
                Ordering::Less => self.arena.right(slot),
                Ordering::Greater => self.arena.left(slot),
                Ordering::Equal => return slot,
            };
        }
        Slot::NIL
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let slot = self.find(key);
        (!slot.is_nil()).then(|| self.arena.value(slot))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_nil()
    }

    /// The value with the greatest key less than or equal to `key`.
    pub fn floor<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = Slot::NIL;
        let mut slot = self.root;
        while !slot.is_nil() {
            match self.cmp_key(slot, key) {
                Ordering::Equal => return Some(self.arena.value(slot)),
                Ordering::Greater => slot = self.arena.left(slot),
                Ordering::Less => {
                    best = slot;
                    slot = self.arena.right(slot);
                }
            }
        }
        (!best.is_nil()).then(|| self.arena.value(best))
    }

    /// The value with the smallest key greater than or equal to `key`.
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut best = Slot::NIL;
        let mut slot = self.root;
        while !slot.is_nil() {
            match self.cmp_key(slot, key) {
                Ordering::Equal => return Some(self.arena.value(slot)),
                Ordering::Less => slot = self.arena.right(slot),
                Ordering::Greater => {
                    best = slot;
                    slot = self.arena.left(slot);
                }
            }
        }
        (!best.is_nil()).then(|| self.arena.value(best))
    }

    /// Inserts `value` under its extracted key.
    ///
    /// If the key is already present the stored value is replaced in place and
    /// the old one is returned; the tree does not grow.
    pub fn insert(&mut self, value: V) -> Option<V> {
        let key = (self.key_fn)(&value);
        let (root, replaced) = self.insert_at(self.root, &key, value);
        self.root = root;
        self.arena.node_mut(root).color = Color::Black;
        if replaced.is_none() {
            self.len += 1;
        }
        self.check_invariants();
        replaced
    }

    fn insert_at(&mut self, h: Slot, key: &K, value: V) -> (Slot, Option<V>) {
        if h.is_nil() {
            return (self.arena.alloc(value), None);
        }

        let replaced = match self.cmp_key(h, key) {
            Ordering::Greater => {
                let left = self.arena.left(h);
                let (left, replaced) = self.insert_at(left, key, value);
                self.arena.node_mut(h).left = left;
                replaced
            }
            Ordering::Less => {
                let right = self.arena.right(h);
                let (right, replaced) = self.insert_at(right, key, value);
                self.arena.node_mut(h).right = right;
                replaced
            }
            Ordering::Equal => Some(mem::replace(self.arena.value_mut(h), value)),
        };

        (self.arena.balance(h), replaced)
    }

    /// Removes the value stored under `key`.
    ///
    /// Returns `None` if the tree is populated but `key` is absent.
    ///
    /// # Panics
    ///
    /// Panics if the tree is empty. Use [`try_remove`](Self::try_remove) when
    /// emptiness is not already ruled out.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.try_remove(key) {
            Ok(value) => Some(value),
            Err(RemoveError::KeyNotFound) => None,
            Err(err @ RemoveError::EmptyTree) => panic!("{err}"),
        }
    }

    pub fn try_remove<Q>(&mut self, key: &Q) -> Result<V, RemoveError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.root.is_nil() {
            return Err(RemoveError::EmptyTree);
        }
        // The deletion descent assumes the key is present.
        if self.find(key).is_nil() {
            return Err(RemoveError::KeyNotFound);
        }

        self.redden_root();
        let (root, removed) = self.delete_at(self.root, key);
        self.finish_removal(root);
        removed.ok_or(RemoveError::KeyNotFound)
    }

    fn delete_at<Q>(&mut self, mut h: Slot, key: &Q) -> (Slot, Option<V>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removed;
        if self.cmp_key(h, key) == Ordering::Greater {
            let left = self.arena.left(h);
            if !self.arena.is_red(left) && !self.arena.is_red(self.arena.left(left)) {
                h = self.arena.move_red_left(h);
            }
            let (left, value) = self.delete_at(self.arena.left(h), key);
            self.arena.node_mut(h).left = left;
            removed = value;
        } else {
            if self.arena.is_red(self.arena.left(h)) {
                h = self.arena.rotate_right(h);
            }
            if self.cmp_key(h, key) == Ordering::Equal && self.arena.right(h).is_nil() {
                return (Slot::NIL, self.arena.release(h));
            }
            let right = self.arena.right(h);
            if !self.arena.is_red(right) && !self.arena.is_red(self.arena.left(right)) {
                h = self.arena.move_red_right(h);
            }
            if self.cmp_key(h, key) == Ordering::Equal {
                // Pull the in-order successor's value into `h` and free the
                // successor's slot instead.
                let (right, successor) = self.arena.delete_min(self.arena.right(h));
                self.arena.node_mut(h).right = right;
                removed = self
                    .arena
                    .release(successor)
                    .map(|value| mem::replace(self.arena.value_mut(h), value));
            } else {
                let (right, value) = self.delete_at(self.arena.right(h), key);
                self.arena.node_mut(h).right = right;
                removed = value;
            }
        }
        (self.arena.balance(h), removed)
    }

    /// Removes and returns the value with the smallest key.
    pub fn pop_first(&mut self) -> Option<V> {
        if self.root.is_nil() {
            return None;
        }
        self.redden_root();
        let (root, min) = self.arena.delete_min(self.root);
        let value = self.arena.release(min);
        self.finish_removal(root);
        value
    }

    /// Removes and returns the value with the largest key.
    pub fn pop_last(&mut self) -> Option<V> {
        if self.root.is_nil() {
            return None;
        }
        self.redden_root();
        let (root, max) = self.arena.delete_max(self.root);
        let value = self.arena.release(max);
        self.finish_removal(root);
        value
    }

    fn redden_root(&mut self) {
        let root = self.root;
        if !self.arena.is_red(self.arena.left(root)) && !self.arena.is_red(self.arena.right(root))
        {
            self.arena.node_mut(root).color = Color::Red;
        }
    }

    fn finish_removal(&mut self, root: Slot) {
        self.root = root;
        if !root.is_nil() {
            self.arena.node_mut(root).color = Color::Black;
        }
        self.len -= 1;
        self.check_invariants();
    }

    /// Validates every structural invariant of the tree.
    ///
    /// Walks the whole tree, so this is `O(N)`. Enable the `check-invariants`
    /// feature to run it after every mutation.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        let sentinel = self.arena.node(Slot::NIL);
        if sentinel.value.is_some() || !sentinel.left.is_nil() || !sentinel.right.is_nil() {
            return Err(InvariantViolation::SentinelTouched);
        }
        if self.arena.is_red(self.root) {
            return Err(InvariantViolation::RedRoot(self.root.0));
        }

        let mut seen = vec![false; self.arena.nodes.len()];
        let (reachable, _) = self.check_subtree(self.root, None, None, &mut seen)?;
        if reachable != self.len {
            return Err(InvariantViolation::CountMismatch {
                reachable,
                len: self.len,
            });
        }

        for &slot in &self.arena.free {
            if seen[slot.index()] {
                return Err(InvariantViolation::FreeSlotReachable(slot.0));
            }
            if self.arena.node(slot).value.is_some() {
                return Err(InvariantViolation::FreeSlotOccupied(slot.0));
            }
        }
        Ok(())
    }

    /// Returns `(node count, black height)` of the subtree at `h`.
    fn check_subtree(
        &self,
        h: Slot,
        lower: Option<&K>,
        upper: Option<&K>,
        seen: &mut [bool],
    ) -> Result<(usize, usize), InvariantViolation> {
        if h.is_nil() {
            return Ok((0, 0));
        }
        if mem::replace(&mut seen[h.index()], true) {
            // Reached twice: the links form a cycle or a shared subtree.
            return Err(InvariantViolation::OutOfOrder(h.0));
        }

        let node = self.arena.node(h);
        let Some(value) = node.value.as_ref() else {
            return Err(InvariantViolation::VacantNode(h.0));
        };
        let key = (self.key_fn)(value);
        if lower.is_some_and(|lower| key <= *lower) || upper.is_some_and(|upper| key >= *upper) {
            return Err(InvariantViolation::OutOfOrder(h.0));
        }
        if self.arena.is_red(node.right) {
            return Err(InvariantViolation::RedRightLink(h.0));
        }
        if self.arena.is_red(h) && self.arena.is_red(node.left) {
            return Err(InvariantViolation::DoubleRed(h.0));
        }

        let (left_count, left_black) = self.check_subtree(node.left, lower, Some(&key), seen)?;
        let (right_count, right_black) = self.check_subtree(node.right, Some(&key), upper, seen)?;
        if left_black != right_black {
            return Err(InvariantViolation::BlackImbalance {
                slot: h.0,
                left: left_black,
                right: right_black,
            });
        }

        let black = left_black + usize::from(node.color == Color::Black);
        Ok((left_count + right_count + 1, black))
    }

    #[inline]
    fn check_invariants(&self) {
        if cfg!(feature = "check-invariants") {
            if let Err(violation) = self.check() {
                panic!("keyed tree invariant violated: {violation}");
            }
        }
    }
}

impl<K, V, F> Extend<V> for KeyedTree<K, V, F>
where
    K: Ord,
    F: Fn(&V) -> K,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<K, V: Clone, F: Clone> Clone for KeyedTree<K, V, F> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            len: self.len,
            key_fn: self.key_fn.clone(),
            _key: PhantomData,
        }
    }
}

impl<K, V: fmt::Debug, F> fmt::Debug for KeyedTree<K, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, V, F> IntoIterator for &'a KeyedTree<K, V, F> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// In-order iterator over the values of a [`KeyedTree`].
pub struct Iter<'a, V> {
    arena: &'a NodeArena<V>,
    /// Ancestors whose value has not been yielded yet; top is the next value.
    stack: Vec<Slot>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    fn new(arena: &'a NodeArena<V>, root: Slot, len: usize) -> Self {
        let mut iter = Self {
            arena,
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut slot: Slot) {
        while !slot.is_nil() {
            self.stack.push(slot);
            slot = self.arena.left(slot);
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.stack.pop()?;
        let arena = self.arena;
        self.push_left_spine(arena.right(slot));
        self.remaining -= 1;
        Some(arena.value(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}


#[cfg(test)]
mod proptests;
