use crate::{NodeId, RbTree};

/// A cursor over an [`RbTree`].
///
/// A cursor points either to an element of the tree or to a "ghost" non-element that connects the
/// last element to the first.
pub struct Cursor<'tree, K> {
    tree: &'tree RbTree<K>,
    current: Option<NodeId>,
}

impl<'tree, K> Cursor<'tree, K> {
    pub(crate) fn first(tree: &'tree RbTree<K>) -> Cursor<'tree, K> {
        Cursor {
            current: tree.min(),
            tree,
        }
    }

    pub(crate) fn last(tree: &'tree RbTree<K>) -> Cursor<'tree, K> {
        Cursor {
            current: tree.max(),
            tree,
        }
    }

    /// Returns the node the cursor points to, or `None` at the "ghost" non-element.
    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    /// Moves the cursor to the next element of the `RbTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method moves it to the first
    /// element. If it is pointing to the last element, this method moves it to the "ghost"
    /// non-element.
    pub fn move_next(&mut self) {
        self.current = next_of(&*self.tree, self.current);
    }

    /// Moves the cursor to the previous element of the `RbTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method moves it to the last
    /// element. If it is pointing to the first element, this method moves it to the "ghost"
    /// non-element.
    pub fn move_prev(&mut self) {
        self.current = prev_of(&*self.tree, self.current);
    }

    /// Returns a reference to the key pointed to by the cursor.
    ///
    /// This returns `None` if the cursor is currently pointing to the "ghost" non-element.
    pub fn get(&self) -> Option<&'tree K> {
        self.current.map(|node| self.tree.key(node))
    }

    /// Returns a reference to the next key.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the first element.
    /// If it is pointing to the last element, this method returns `None`.
    pub fn peek_next(&self) -> Option<&'tree K> {
        next_of(&*self.tree, self.current).map(|node| self.tree.key(node))
    }

    /// Returns a reference to the previous key.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the last element.
    /// If it is pointing to the first element, this method returns `None`.
    pub fn peek_prev(&self) -> Option<&'tree K> {
        prev_of(&*self.tree, self.current).map(|node| self.tree.key(node))
    }
}

/// A cursor over an [`RbTree`] which supports removing elements.
///
/// A cursor points either to an element of the tree or to a "ghost" non-element that connects the
/// last element to the first.
pub struct CursorMut<'tree, K> {
    tree: &'tree mut RbTree<K>,
    current: Option<NodeId>,
}

impl<'tree, K> CursorMut<'tree, K> {
    pub(crate) fn first(tree: &'tree mut RbTree<K>) -> CursorMut<'tree, K> {
        CursorMut {
            current: tree.min(),
            tree,
        }
    }

    pub(crate) fn last(tree: &'tree mut RbTree<K>) -> CursorMut<'tree, K> {
        CursorMut {
            current: tree.max(),
            tree,
        }
    }

    /// Returns a read-only cursor pointing to the current element.
    ///
    /// The `CursorMut` remains immutably borrowed for the lifetime of the returned `Cursor`.
    pub fn as_cursor(&self) -> Cursor<'_, K> {
        Cursor {
            tree: &*self.tree,
            current: self.current,
        }
    }

    /// Returns the node the cursor points to, or `None` at the "ghost" non-element.
    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    /// Moves the cursor to the next element of the `RbTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method will move it to the first
    /// element. If it is pointing to the last element, this method will move it to the "ghost"
    /// non-element.
    pub fn move_next(&mut self) {
        self.current = next_of(&*self.tree, self.current);
    }

    /// Moves the cursor to the previous element of the `RbTree`.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method will move it to the last
    /// element. If it is pointing to the first element, this method will move it to the "ghost"
    /// non-element.
    pub fn move_prev(&mut self) {
        self.current = prev_of(&*self.tree, self.current);
    }

    /// Returns a reference to the key pointed to by the cursor.
    ///
    /// This returns `None` if the cursor is currently pointing to the "ghost" non-element.
    pub fn get(&self) -> Option<&K> {
        self.current.map(|node| self.tree.key(node))
    }

    /// Returns a reference to the next key.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the first element.
    /// If it is pointing to the last element, this method returns `None`.
    pub fn peek_next(&self) -> Option<&K> {
        next_of(&*self.tree, self.current).map(|node| self.tree.key(node))
    }

    /// Returns a reference to the previous key.
    ///
    /// If the cursor is pointing to the "ghost" non-element, this method returns the last element.
    /// If it is pointing to the first element, this method returns `None`.
    pub fn peek_prev(&self) -> Option<&K> {
        prev_of(&*self.tree, self.current).map(|node| self.tree.key(node))
    }

    /// Removes the current element from the tree.
    ///
    /// This returns the removed key and moves the cursor to the next element. If the cursor is
    /// pointing to the "ghost" non-element, this method returns `None`, and neither the tree nor
    /// the cursor is modified.
    pub fn remove_current(&mut self) -> Option<K> {
        let remove = self.current?;

        // Erasing never relocates other nodes, so the neighbor's handle survives the removal.
        self.move_next();

        Some(self.tree.erase(remove))
    }

    /// Removes the current element from the tree.
    ///
    /// This returns the removed key and moves the cursor to the previous element. If the cursor is
    /// pointing to the "ghost" non-element, this method returns `None`, and neither the tree nor
    /// the cursor is modified.
    pub fn remove_current_and_move_prev(&mut self) -> Option<K> {
        let remove = self.current?;

        self.move_prev();

        Some(self.tree.erase(remove))
    }
}

fn next_of<K>(tree: &RbTree<K>, current: Option<NodeId>) -> Option<NodeId> {
    match current {
        Some(node) => tree.successor(node),
        None => tree.min(),
    }
}

fn prev_of<K>(tree: &RbTree<K>, current: Option<NodeId>) -> Option<NodeId> {
    match current {
        Some(node) => tree.predecessor(node),
        None => tree.max(),
    }
}
