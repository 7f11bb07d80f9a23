//! An arena-backed red-black tree.
//!
//! Nodes live in a per-tree arena and refer to each other by [`NodeId`]. Slot 0 of the arena is
//! the sentinel: a permanently BLACK node that stands in for every missing child and for the
//! parent of the root. Because every link always names a real slot, the balancing code never has
//! to branch on an absent child; "reached the sentinel" is the only boundary condition.

// Conventions used in comments:
// - `x` is the node being repaired, `p(x)` its parent and `g(x)` its grandparent.
// - The "side" of a node is the direction of the link from its parent to it.
// - The "inner" child of `p(x)` is the child on the side opposite `p(x)`'s own side.
//
// The invariants of a red-black tree are:
// 1. An in-order walk yields keys in non-decreasing order.
// 2. No RED node has a RED child.
// 3. The root is BLACK.
// 4. Every path from a node down to the sentinel passes through the same number of BLACK nodes.
// 5. Parent links are the exact inverse of child links.
//
// Equal keys are routed into the right subtree on insertion. Rotations may later move an equal key
// to the left of another, so (1) is stated on the in-order sequence rather than per subtree.

use core::{borrow::Borrow, cmp::Ordering, fmt, mem, ops::Not};

use log::trace;

mod arena;
pub mod cursor;
mod debug;
pub mod error;
pub mod iter;
pub mod set;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

use arena::Arena;
use cursor::{Cursor, CursorMut};
pub use error::{Error, Result};
use iter::Iter;
pub use set::RbSet;

/// A handle to a node stored in an [`RbTree`].
///
/// Handles stay valid while the node is in the tree, including across rotations and the removal
/// of other nodes. Once the node is erased its slot may be reused by a later insertion, so a
/// handle must not be used after erasing the node it refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

pub(crate) const SENTINEL: NodeId = NodeId(0);

/// The color of a tree node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Links {
    parent: NodeId,
    children: [NodeId; 2],
    color: Color,
}

/// An ordered multiset of keys, kept balanced as a red-black tree.
///
/// Duplicate keys are accepted. Lookups and removals address individual nodes through
/// [`NodeId`] handles, which makes the tree a building block for maps, sets and indexes layered
/// on top of it; see [`RbSet`] for a unique-key set.
pub struct RbTree<K> {
    arena: Arena<K>,
    root: NodeId,
}

impl<K> RbTree<K> {
    /// Returns a new empty tree.
    pub fn new() -> RbTree<K> {
        RbTree {
            arena: Arena::new(),
            root: SENTINEL,
        }
    }

    /// Returns a new empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> RbTree<K> {
        RbTree {
            arena: Arena::with_capacity(capacity),
            root: SENTINEL,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root == SENTINEL);
        empty
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Reserves room for at least `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.arena.reserve(additional);
    }

    /// Reserves room for at least `additional` more nodes, reporting allocation failure.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.arena.try_reserve(additional)
    }

    /// Returns the root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeId> {
        self.live(self.root)
    }

    /// Returns the key stored in `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    pub fn key(&self, node: NodeId) -> &K {
        self.arena.key(node)
    }

    /// Returns the color of `node`.
    pub fn color(&self, node: NodeId) -> Color {
        self.links(node).color()
    }

    /// Returns the parent of `node`, or `None` if `node` is the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.live(self.links(node).parent())
    }

    /// Returns the left child of `node`.
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.live(self.links(node).left())
    }

    /// Returns the right child of `node`.
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.live(self.links(node).right())
    }

    /// Returns the node holding the minimum key, or `None` if the tree is empty.
    pub fn min(&self) -> Option<NodeId> {
        self.live(self.root)
            .map(|root| self.extreme_in_subtree(root, Dir::Left))
    }

    /// Returns the node holding the maximum key, or `None` if the tree is empty.
    pub fn max(&self) -> Option<NodeId> {
        self.live(self.root)
            .map(|root| self.extreme_in_subtree(root, Dir::Right))
    }

    /// Returns the in-order successor of `node`.
    pub fn successor(&self, node: NodeId) -> Option<NodeId> {
        self.neighbor(node, Dir::Right)
    }

    /// Returns the in-order predecessor of `node`.
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.neighbor(node, Dir::Left)
    }

    /// Returns an iterator over the keys of the tree, in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Copies the keys of the tree into `buf` in ascending order.
    ///
    /// At most `buf.len()` keys are written; the tree is never read past that point. Returns the
    /// number of keys written, which is less than [`len`](Self::len) if `buf` is too short.
    pub fn to_array(&self, buf: &mut [K]) -> usize
    where
        K: Clone,
    {
        let mut written = 0;

        for (slot, key) in buf.iter_mut().zip(self.iter()) {
            slot.clone_from(key);
            written += 1;
        }

        written
    }

    /// Returns the keys of the tree in ascending order.
    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns a cursor pointing at the minimum element.
    pub fn cursor_first(&self) -> Cursor<'_, K> {
        Cursor::first(self)
    }

    /// Returns a cursor pointing at the maximum element.
    pub fn cursor_last(&self) -> Cursor<'_, K> {
        Cursor::last(self)
    }

    /// Returns an editing cursor pointing at the minimum element.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, K> {
        CursorMut::first(self)
    }

    /// Returns an editing cursor pointing at the maximum element.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, K> {
        CursorMut::last(self)
    }

    /// Removes `node` from the tree and returns its key.
    ///
    /// Handles to every other node remain valid.
    ///
    /// This operation completes in _O(log(n))_ time.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not a live node of this tree.
    pub fn erase(&mut self, node: NodeId) -> K {
        assert!(
            self.arena.is_live(node),
            "erase: {node:?} is not a live node of this tree"
        );

        let left = self.links(node).left();
        let right = self.links(node).right();

        // `pivot` ends up in the position vacated by whichever node was physically unlinked, and
        // `removed_color` is the color that left that position.
        let (pivot, removed_color) = if left == SENTINEL {
            self.transplant(node, right);
            (right, self.links(node).color())
        } else if right == SENTINEL {
            self.transplant(node, left);
            (left, self.links(node).color())
        } else {
            let successor = self.extreme_in_subtree(right, Dir::Left);
            let successor_color = self.links(successor).color();
            let pivot = self.links(successor).right();

            if successor == right {
                // May write the sentinel's parent; erase-fixup reads it back.
                self.links_mut(pivot).set_parent(successor);
            } else {
                // Elevate the successor's right child to replace it.
                self.transplant(successor, pivot);
                self.links_mut(successor).set_right(right);
                self.links_mut(right).set_parent(successor);
            }

            self.transplant(node, successor);

            // The successor assumes `node`'s place and color.
            let node_color = self.links(node).color();
            self.links_mut(successor).set_left(left);
            self.links_mut(left).set_parent(successor);
            self.links_mut(successor).set_color(node_color);

            (pivot, successor_color)
        };

        if removed_color == Color::Black {
            self.rebalance_erased(pivot);
        }

        self.links_mut(SENTINEL).set_parent(SENTINEL);

        self.arena.release(node)
    }

    /// Removes and returns the minimum key.
    pub fn pop_first(&mut self) -> Option<K> {
        self.min().map(|node| self.erase(node))
    }

    /// Removes and returns the maximum key.
    pub fn pop_last(&mut self) -> Option<K> {
        self.max().map(|node| self.erase(node))
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let len = self.len();
        self.arena.clear();
        self.root = SENTINEL;

        if len > 0 {
            log::debug!("cleared tree of {len} nodes");
        }
    }

    // Descent helpers ========================================================

    fn live(&self, node: NodeId) -> Option<NodeId> {
        (node != SENTINEL).then_some(node)
    }

    // Returns the last node reached from `root` by following `dir` links.
    fn extreme_in_subtree(&self, root: NodeId, dir: Dir) -> NodeId {
        let mut cur = root;

        loop {
            match self.links(cur).child(dir) {
                SENTINEL => return cur,
                next => cur = next,
            }
        }
    }

    // Returns the next node from `node` in direction `dir` of the in-order sequence.
    fn neighbor(&self, node: NodeId, dir: Dir) -> Option<NodeId> {
        let child = self.links(node).child(dir);
        if child != SENTINEL {
            return Some(self.extreme_in_subtree(child, !dir));
        }

        // Climb until arriving from the `!dir` side.
        let mut cur = node;
        loop {
            let parent = self.live(self.links(cur).parent())?;
            if self.which_child(parent, cur) == !dir {
                return Some(parent);
            }
            cur = parent;
        }
    }

    // Structural helpers =====================================================

    #[inline]
    fn links(&self, node: NodeId) -> &Links {
        self.arena.links(node)
    }

    #[inline]
    fn links_mut(&mut self, node: NodeId) -> &mut Links {
        self.arena.links_mut(node)
    }

    #[inline]
    fn is_red(&self, node: NodeId) -> bool {
        self.links(node).color() == Color::Red
    }

    #[inline]
    fn paint(&mut self, node: NodeId, color: Color) {
        debug_assert!(
            node != SENTINEL || color == Color::Black,
            "the sentinel must stay BLACK"
        );
        self.links_mut(node).set_color(color);
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        if self.links(parent).left() == child {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    // Replaces the child link of `parent` pointing at `old_child` with `new_child`, or the root if
    // `parent` is the sentinel.
    //
    // `new_child`'s parent link is not updated.
    #[inline]
    fn replace_child_or_set_root(&mut self, parent: NodeId, old_child: NodeId, new_child: NodeId) {
        if parent == SENTINEL {
            self.root = new_child;
            return;
        }

        let dir = self.which_child(parent, old_child);
        debug_assert_eq!(
            self.links(parent).child(dir),
            old_child,
            "`old_child` must be a child of `parent`"
        );
        self.links_mut(parent).set_child(dir, new_child);
    }

    // Puts `new` where `old` hangs from its parent. `new` may be the sentinel, in which case the
    // sentinel's parent link is pointed at `old`'s parent for erase-fixup to follow.
    //
    // Neither the children of `new` nor the links of `old` are touched.
    fn transplant(&mut self, old: NodeId, new: NodeId) {
        let parent = self.links(old).parent();
        self.replace_child_or_set_root(parent, old, new);
        self.links_mut(new).set_parent(parent);
    }

    // Rotates at `node` in direction `dir`: the child on the `!dir` side moves up into `node`'s
    // position and `node` becomes its `dir` child.
    //
    // Colors are not updated.
    fn rotate(&mut self, node: NodeId, dir: Dir) {
        let up = self.links(node).child(!dir);
        assert_ne!(up, SENTINEL, "cannot rotate the sentinel into place");

        trace!("rotate {dir:?} at {node:?}, promoting {up:?}");

        // `across` moves from the `dir` child of `up` to the `!dir` child of `node`.
        let across = self.links(up).child(dir);
        self.links_mut(node).set_child(!dir, across);
        if across != SENTINEL {
            self.links_mut(across).set_parent(node);
        }

        let parent = self.links(node).parent();
        self.links_mut(up).set_parent(parent);
        self.replace_child_or_set_root(parent, node, up);

        self.links_mut(up).set_child(dir, node);
        self.links_mut(node).set_parent(up);
    }

    // Restores the color invariants after the RED node `node` was linked in as a leaf.
    //
    // The only possible violation is `node` and its parent both being RED. Each pass either pushes
    // the violation two levels up (red uncle) or ends it with one or two rotations.
    fn rebalance_inserted(&mut self, node: NodeId) {
        let mut x = node;

        while self.is_red(self.links(x).parent()) {
            // A RED parent is never the root, so the grandparent is a live node.
            let parent = self.links(x).parent();
            let grandparent = self.links(parent).parent();
            let side = self.which_child(grandparent, parent);
            let uncle = self.links(grandparent).child(!side);

            if self.is_red(uncle) {
                trace!("insert fixup at {x:?}: red uncle, recoloring {grandparent:?}");
                self.paint(parent, Color::Black);
                self.paint(uncle, Color::Black);
                self.paint(grandparent, Color::Red);
                x = grandparent;
                continue;
            }

            if self.which_child(parent, x) != side {
                trace!("insert fixup at {x:?}: inner child, rotating {parent:?}");
                x = parent;
                self.rotate(x, side);
            }

            trace!("insert fixup at {x:?}: outer child, rotating {grandparent:?}");
            let parent = self.links(x).parent();
            self.paint(parent, Color::Black);
            self.paint(grandparent, Color::Red);
            self.rotate(grandparent, !side);
        }

        let root = self.root;
        self.paint(root, Color::Black);
    }

    // Restores black-height uniformity after a BLACK node was removed above `pivot`.
    //
    // `pivot` carries an extra black. Each pass either resolves it with rotations or moves it one
    // level up; a RED node or the root absorbs it.
    fn rebalance_erased(&mut self, pivot: NodeId) {
        let mut x = pivot;

        while x != self.root && !self.is_red(x) {
            let parent = self.links(x).parent();
            let side = self.which_child(parent, x);
            let mut sibling = self.links(parent).child(!side);

            if self.is_red(sibling) {
                trace!("erase fixup at {x:?}: red sibling {sibling:?}");
                self.paint(sibling, Color::Black);
                self.paint(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.links(parent).child(!side);
            }

            let near = self.links(sibling).child(side);
            let far = self.links(sibling).child(!side);

            if !self.is_red(near) && !self.is_red(far) {
                trace!("erase fixup at {x:?}: black nephews, moving up to {parent:?}");
                self.paint(sibling, Color::Red);
                x = parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("erase fixup at {x:?}: red near nephew {near:?}");
                self.paint(near, Color::Black);
                self.paint(sibling, Color::Red);
                self.rotate(sibling, !side);
                sibling = self.links(parent).child(!side);
            }

            trace!("erase fixup at {x:?}: red far nephew, rotating {parent:?}");
            let parent_color = self.links(parent).color();
            let far = self.links(sibling).child(!side);
            self.paint(sibling, parent_color);
            self.paint(parent, Color::Black);
            self.paint(far, Color::Black);
            self.rotate(parent, side);
            x = self.root;
        }

        self.paint(x, Color::Black);
    }
}

impl<K: Ord> RbTree<K> {
    /// Inserts `key` into the tree and returns the root of the tree afterwards.
    ///
    /// Keys equal to an existing key are not rejected; they are placed after it in the in-order
    /// sequence. Use [`find`](Self::find) to obtain a handle to the inserted node.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: K) -> NodeId {
        let node = self.arena.acquire(key);
        self.link_new(node)
    }

    /// Inserts `key` into the tree, reporting allocation failure instead of aborting.
    ///
    /// On error the tree is unchanged.
    pub fn try_insert(&mut self, key: K) -> Result<NodeId> {
        let node = self.arena.try_acquire(key)?;
        Ok(self.link_new(node))
    }

    /// Returns a node whose key is equal to `key`.
    ///
    /// If several nodes hold equal keys, any one of them may be returned.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root;

        while cur != SENTINEL {
            match key.cmp(self.key(cur).borrow()) {
                Ordering::Less => cur = self.links(cur).left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => cur = self.links(cur).right(),
            }
        }

        None
    }

    /// Returns `true` if the tree holds a key equal to `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    // Links the fresh RED node `node` in as a leaf and rebalances. Returns the new root.
    fn link_new(&mut self, node: NodeId) -> NodeId {
        if self.root == SENTINEL {
            // Tree is empty. Set `node` as the BLACK root and return.
            self.paint(node, Color::Black);
            self.root = node;
            return self.root;
        }

        // Descend the tree, looking for a free child slot. Ties go right.
        let mut parent = self.root;
        let dir = loop {
            let dir = if self.key(node) < self.key(parent) {
                Dir::Left
            } else {
                Dir::Right
            };

            match self.links(parent).child(dir) {
                SENTINEL => break dir,
                child => parent = child,
            }
        };

        self.links_mut(parent).set_child(dir, node);
        self.links_mut(node).set_parent(parent);

        self.rebalance_inserted(node);

        self.root
    }

    /// Checks every red-black invariant, panicking on the first violation.
    ///
    /// Returns the black height of the tree.
    #[doc(hidden)]
    pub fn assert_invariants(&self) -> usize {
        let sentinel = self.links(SENTINEL);
        assert_eq!(sentinel.color(), Color::Black, "sentinel must be BLACK");
        assert_eq!(sentinel.left(), SENTINEL, "sentinel left link must be itself");
        assert_eq!(sentinel.right(), SENTINEL, "sentinel right link must be itself");
        assert_eq!(sentinel.parent(), SENTINEL, "sentinel parent link must be itself");

        assert_eq!(self.links(self.root).color(), Color::Black, "root must be BLACK");
        if self.root != SENTINEL {
            assert_eq!(self.links(self.root).parent(), SENTINEL, "root must have no parent");
        }

        let mut count = 0;
        let black_height = self.assert_invariants_at(self.root, &mut count);
        assert_eq!(count, self.len(), "reachable node count must match len");

        let mut keys = self.iter();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                assert!(prev <= key, "in-order keys must be non-decreasing");
                prev = key;
            }
        }

        black_height
    }

    // Returns the black height of the subtree rooted at `node`, counting the sentinel.
    fn assert_invariants_at(&self, node: NodeId, count: &mut usize) -> usize {
        if node == SENTINEL {
            return 1;
        }

        *count += 1;
        let links = self.links(node);

        let mut heights = [0; 2];
        for dir in [Dir::Left, Dir::Right] {
            let child = links.child(dir);

            if child != SENTINEL {
                assert_eq!(
                    self.links(child).parent(),
                    node,
                    "child's parent link must point to this node"
                );

                if links.color() == Color::Red {
                    assert_eq!(
                        self.links(child).color(),
                        Color::Black,
                        "RED node {node:?} has a RED child"
                    );
                }
            }

            heights[dir as usize] = self.assert_invariants_at(child, count);
        }

        assert_eq!(
            heights[0], heights[1],
            "black height differs below {node:?}"
        );

        heights[0] + usize::from(links.color() == Color::Black)
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> FromIterator<K> for RbTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = RbTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RbTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);

        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'tree, K> IntoIterator for &'tree RbTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Links {
    const fn new() -> Self {
        Links {
            parent: SENTINEL,
            children: [SENTINEL; 2],
            color: Color::Red,
        }
    }

    const fn sentinel() -> Self {
        Links {
            parent: SENTINEL,
            children: [SENTINEL; 2],
            color: Color::Black,
        }
    }

    #[inline]
    fn color(&self) -> Color {
        self.color
    }

    #[inline]
    fn parent(&self) -> NodeId {
        self.parent
    }

    #[inline]
    fn child(&self, dir: Dir) -> NodeId {
        self.children[dir as usize]
    }

    #[inline]
    fn left(&self) -> NodeId {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> NodeId {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: NodeId) -> NodeId {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: NodeId) -> NodeId {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: NodeId) -> NodeId {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: NodeId) -> NodeId {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
