use super::OSRBTree;
use crate::raw::RawOSRBTree;

impl<V, K> OSRBTree<V, K> {
    /// Creates an empty tree with room for at least `capacity` distinct values.
    ///
    /// Extra keys for an existing value do not consume capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let tree: OSRBTree<u128, u64> = OSRBTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSRBTree {
            raw: RawOSRBTree::with_capacity(capacity),
        }
    }

    /// Returns the number of distinct values the tree can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let tree: OSRBTree<u128, u64> = OSRBTree::with_capacity(32);
    /// assert!(tree.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
