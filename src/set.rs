use core::{borrow::Borrow, fmt};

use crate::{error::Result, iter::Iter, RbTree};

/// An ordered set based on a [red-black tree].
///
/// Unlike [`RbTree`], which keeps duplicates, inserting a key that is already present leaves the
/// set unchanged.
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct RbSet<K: Ord> {
    tree: RbTree<K>,
}

impl<K: Ord> RbSet<K> {
    /// Creates a new, empty `RbSet`.
    pub fn new() -> Self {
        Self {
            tree: RbTree::new(),
        }
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Adds `key` to the set.
    ///
    /// Returns `true` if the key was not already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.tree.contains(&key) {
            return false;
        }

        self.tree.insert(key);
        true
    }

    /// Adds `key` to the set, reporting allocation failure instead of aborting.
    pub fn try_insert(&mut self, key: K) -> Result<bool> {
        if self.tree.contains(&key) {
            return Ok(false);
        }

        self.tree.try_insert(key)?;
        Ok(true)
    }

    /// Returns `true` if the set contains `key`.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(key)
    }

    /// Returns a reference to the stored key equal to `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).map(|node| self.tree.key(node))
    }

    /// Removes `key` from the set, returning the stored key if it was present.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.tree.find(key)?;
        Some(self.tree.erase(node))
    }

    /// Returns the minimum key in the set.
    #[inline]
    pub fn first(&self) -> Option<&K> {
        self.tree.min().map(|node| self.tree.key(node))
    }

    /// Returns the maximum key in the set.
    #[inline]
    pub fn last(&self) -> Option<&K> {
        self.tree.max().map(|node| self.tree.key(node))
    }

    /// Removes and returns the minimum key in the set.
    #[inline]
    pub fn pop_first(&mut self) -> Option<K> {
        self.tree.pop_first()
    }

    /// Removes and returns the maximum key in the set.
    #[inline]
    pub fn pop_last(&mut self) -> Option<K> {
        self.tree.pop_last()
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        self.tree.iter()
    }

    /// Clears the set, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the underlying tree.
    pub fn as_tree(&self) -> &RbTree<K> {
        &self.tree
    }
}

impl<K: Ord> Default for RbSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> FromIterator<K> for RbSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = RbSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord> Extend<K> for RbSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for RbSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_inserts_are_ignored() {
        let mut set = RbSet::new();

        assert!(set.insert(3));
        assert!(set.insert(1));
        assert!(!set.insert(3));
        assert!(set.try_insert(2).unwrap());
        assert!(!set.try_insert(1).unwrap());

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
        set.as_tree().assert_invariants();
    }

    #[test]
    fn borrowed_lookups() {
        let set: RbSet<String> = ["pear", "apple", "fig"].into_iter().map(String::from).collect();

        assert!(set.contains("fig"));
        assert!(!set.contains("kiwi"));
        assert_eq!(set.get("apple").map(String::as_str), Some("apple"));
        assert_eq!(set.first().map(String::as_str), Some("apple"));
        assert_eq!(set.last().map(String::as_str), Some("pear"));
    }

    #[test]
    fn remove_and_pop() {
        let mut set: RbSet<u32> = (0..16).collect();

        assert_eq!(set.remove(&7), Some(7));
        assert_eq!(set.remove(&7), None);
        assert_eq!(set.pop_first(), Some(0));
        assert_eq!(set.pop_last(), Some(15));
        assert_eq!(set.len(), 13);
        set.as_tree().assert_invariants();

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.first(), None);
        assert_eq!(format!("{set:?}"), "{}");
    }
}
