use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::osrb_tree::Color;

/// Keys held inline before a node's key set spills to the heap.
pub(crate) const INLINE_KEYS: usize = 2;

/// One node per distinct value.
#[derive(Clone)]
pub(crate) struct Node<V, K> {
    pub(crate) value: V,
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) color: Color,
    // Sorted, duplicate free. Never empty while the node is linked.
    keys: SmallVec<[K; INLINE_KEYS]>,
    // Number of keys in the subtree rooted at this node, this node included.
    pub(crate) count: usize,
}

impl<V, K> Node<V, K> {
    /// Creates a detached red node holding a single key.
    pub(crate) fn new(value: V, key: K, parent: Option<Handle>) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        Self {
            value,
            parent,
            left: None,
            right: None,
            color: Color::Red,
            keys,
            count: 1,
        }
    }

    /// The number of keys mapped to this node's value.
    #[inline]
    pub(crate) fn multiplicity(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

impl<V, K: Ord> Node<V, K> {
    /// Returns the slot for `key` in the sorted key set.
    pub(crate) fn search_key<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.binary_search_by(|probe| probe.borrow().cmp(key))
    }

    /// Inserts `key` at `index`, as returned by a failed [`search_key`](Self::search_key).
    pub(crate) fn insert_key(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    /// Removes the key at `index`, as returned by a successful [`search_key`](Self::search_key).
    pub(crate) fn remove_key(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }
}
