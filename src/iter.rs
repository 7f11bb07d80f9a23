use core::iter::FusedIterator;

use crate::{Dir, NodeId, RbTree, SENTINEL};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
    RightChild,
}

/// An in-order iterator over the keys of an [`RbTree`].
///
/// The walk follows parent links instead of keeping a stack, so it uses constant space regardless
/// of the shape of the tree.
pub struct Iter<'tree, K> {
    tree: &'tree RbTree<K>,

    front_cur: NodeId,
    front_from: CameFrom,

    len: usize,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(tree: &'tree RbTree<K>) -> Self {
        Iter {
            tree,

            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
        }
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let mut cur = self.front_cur;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    cur = tree.extreme_in_subtree(cur, Dir::Left);

                    // Once the minimum is found, its (empty) left subtree has been exhausted.
                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next. Save off the
                    // iterator state and return it.
                    self.front_cur = cur;
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(tree.key(cur));
                }

                CameFrom::Here => {
                    let right = tree.links(cur).right();

                    self.front_from = if right != SENTINEL {
                        cur = right;
                        CameFrom::Parent
                    } else {
                        // Nothing on the right, so this whole subtree is done.
                        CameFrom::RightChild
                    };
                }

                CameFrom::RightChild => {
                    // The subtree rooted at `cur` is exhausted; ascend one level. `len` guarantees
                    // an unvisited node remains, so the root is never passed.
                    let parent = tree.links(cur).parent();
                    debug_assert_ne!(parent, SENTINEL, "in-order walk ran off the root");

                    self.front_from = match tree.which_child(parent, cur) {
                        Dir::Left => CameFrom::LeftChild,
                        Dir::Right => CameFrom::RightChild,
                    };

                    cur = parent;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}
