use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::raw::{Handle, RawOSRBTree};

mod capacity;
mod inspect;
mod order_statistic;

pub use crate::Rank;
pub use inspect::{Color, NodeInfo};

/// An order-statistic index of values, each held by one or more external keys.
///
/// Values must implement [`Ord`]; they are kept in a red-black tree with one node
/// per distinct value. Keys must implement [`Ord`] too; each node keeps its keys
/// in a small sorted set, and a key may be attached to a given value only once.
/// The same key may of course be attached to many different values.
///
/// Every node records the number of keys stored in its subtree, so rank queries
/// ([`rank`](OSRBTree::rank), [`select_at_rank`](OSRBTree::select_at_rank) and
/// friends) run in O(log n) where n is the number of distinct values.
///
/// It is a logic error for a value to be modified in such a way that its ordering
/// relative to any other value changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use osrb_tree::{Error, OSRBTree};
///
/// // Bids keyed by account.
/// let mut bids = OSRBTree::new();
/// bids.insert("alice", 120).unwrap();
/// bids.insert("bob", 100).unwrap();
/// bids.insert("carol", 120).unwrap();
///
/// // A key may back a value only once.
/// assert_eq!(bids.insert("alice", 120), Err(Error::DuplicateKey));
///
/// assert_eq!(bids.total_entries(), 3);
/// assert_eq!(bids.distinct_len(), 2);
/// assert_eq!(bids.keys(&120), Ok(&["alice", "carol"][..]));
///
/// // 100 holds rank 1, 120 holds ranks 2 and 3.
/// assert_eq!(bids.rank(&120), Ok(2));
/// assert_eq!(bids.select_at_rank(3), Ok(&120));
///
/// bids.remove(&"bob", &100).unwrap();
/// assert_eq!(bids.first_value(), Ok(&120));
/// ```
#[derive(Clone)]
pub struct OSRBTree<V, K> {
    raw: RawOSRBTree<V, K>,
}

/// An iterator over the distinct values of an `OSRBTree` and their keys.
///
/// This `struct` is created by the [`iter`] method on [`OSRBTree`].
///
/// [`iter`]: OSRBTree::iter
pub struct Iter<'a, V, K> {
    raw: &'a RawOSRBTree<V, K>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An iterator over the distinct values of an `OSRBTree`.
///
/// This `struct` is created by the [`values`] method on [`OSRBTree`].
///
/// [`values`]: OSRBTree::values
pub struct Values<'a, V, K> {
    inner: Iter<'a, V, K>,
}

impl<V, K> OSRBTree<V, K> {
    /// Makes a new, empty `OSRBTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert(1u64, 500u128).unwrap();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        OSRBTree { raw: RawOSRBTree::new() }
    }

    /// Returns the number of key/value pairs in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 7).unwrap();
    /// tree.insert("b", 7).unwrap();
    /// assert_eq!(tree.total_entries(), 2);
    /// ```
    #[must_use]
    pub const fn total_entries(&self) -> usize {
        self.raw.total()
    }

    /// Returns the number of distinct values in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 7).unwrap();
    /// tree.insert("b", 7).unwrap();
    /// assert_eq!(tree.distinct_len(), 1);
    /// ```
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.total() == 0
    }

    /// Removes every entry from the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 1).unwrap();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest value in the tree.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// assert_eq!(tree.first_value(), Err(Error::EmptyTree));
    /// tree.insert("a", 50).unwrap();
    /// tree.insert("b", 30).unwrap();
    /// assert_eq!(tree.first_value(), Ok(&30));
    /// ```
    pub fn first_value(&self) -> Result<&V> {
        let handle = self.raw.first().ok_or(Error::EmptyTree)?;
        Ok(&self.raw.node(handle).value)
    }

    /// Returns the largest value in the tree.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 50).unwrap();
    /// tree.insert("b", 70).unwrap();
    /// assert_eq!(tree.last_value(), Ok(&70));
    /// ```
    pub fn last_value(&self) -> Result<&V> {
        let handle = self.raw.last().ok_or(Error::EmptyTree)?;
        Ok(&self.raw.node(handle).value)
    }

    /// Gets an iterator over the distinct values and their keys, in ascending value order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert('b', 2).unwrap();
    /// tree.insert('a', 2).unwrap();
    /// tree.insert('c', 1).unwrap();
    ///
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some((&1, &['c'][..])));
    /// assert_eq!(iter.next(), Some((&2, &['a', 'b'][..])));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, V, K> {
        Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the distinct values, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// for (key, value) in [(1, 30), (2, 10), (3, 20), (4, 10)] {
    ///     tree.insert(key, value).unwrap();
    /// }
    /// let values: Vec<_> = tree.values().copied().collect();
    /// assert_eq!(values, [10, 20, 30]);
    /// ```
    pub fn values(&self) -> Values<'_, V, K> {
        Values { inner: self.iter() }
    }
}

impl<V: Ord, K: Ord> OSRBTree<V, K> {
    /// Associates `key` with `value`.
    ///
    /// The first key for a value creates its node and rebalances the tree. Further
    /// keys for the same value only raise its multiplicity.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] if `key` is already associated with `value`. The tree
    /// is left unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n + m) where m is the multiplicity of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// assert_eq!(tree.insert("k1", 50), Ok(()));
    /// assert_eq!(tree.insert("k2", 50), Ok(()));
    /// assert_eq!(tree.insert("k1", 50), Err(Error::DuplicateKey));
    /// assert_eq!(tree.key_count(&50), Ok(2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.raw.insert(key, value)
    }

    /// Removes the association between `key` and `value`, returning the stored key.
    ///
    /// When the last key of a value goes, the value's node is spliced out and the
    /// tree rebalanced.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent or `key` is not associated with it.
    /// The tree is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("k1", 50).unwrap();
    /// assert_eq!(tree.remove(&"k2", &50), Err(Error::NotFound));
    /// assert_eq!(tree.remove(&"k1", &50), Ok("k1"));
    /// assert!(!tree.exists(&50));
    /// ```
    pub fn remove<KQ, VQ>(&mut self, key: &KQ, value: &VQ) -> Result<K>
    where
        K: Borrow<KQ>,
        KQ: ?Sized + Ord,
        V: Borrow<VQ>,
        VQ: ?Sized + Ord,
    {
        self.raw.remove(key, value)
    }

    /// Returns `true` if at least one key is associated with `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("k1", 50).unwrap();
    /// assert!(tree.exists(&50));
    /// assert!(!tree.exists(&51));
    /// ```
    #[must_use]
    pub fn exists<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(value).is_some()
    }

    /// Returns `true` if `key` is associated with `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("k1", 50).unwrap();
    /// assert!(tree.contains(&"k1", &50));
    /// assert!(!tree.contains(&"k2", &50));
    /// ```
    #[must_use]
    pub fn contains<KQ, VQ>(&self, key: &KQ, value: &VQ) -> bool
    where
        K: Borrow<KQ>,
        KQ: ?Sized + Ord,
        V: Borrow<VQ>,
        VQ: ?Sized + Ord,
    {
        self.raw
            .search(value)
            .is_some_and(|handle| self.raw.node(handle).search_key(key).is_ok())
    }

    /// Returns the number of keys associated with `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent.
    pub fn key_count<Q>(&self, value: &Q) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(value).ok_or(Error::NotFound)?;
        Ok(self.raw.node(handle).multiplicity())
    }

    /// Returns the keys associated with `value`, in ascending key order.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent.
    pub fn keys<Q>(&self, value: &Q) -> Result<&[K]>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(value).ok_or(Error::NotFound)?;
        Ok(self.raw.node(handle).keys())
    }

    /// Returns the `index`-th key (zero-based, ascending) associated with `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent, [`Error::OutOfRange`] if `index`
    /// is not below the value's key count.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert(0xb, 50).unwrap();
    /// tree.insert(0xa, 50).unwrap();
    /// assert_eq!(tree.key_at(&50, 0), Ok(&0xa));
    /// assert_eq!(tree.key_at(&50, 2), Err(Error::OutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn key_at<Q>(&self, value: &Q, index: usize) -> Result<&K>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let keys = self.keys(value)?;
        keys.get(index).ok_or(Error::OutOfRange { index, len: keys.len() })
    }

    /// Returns the smallest value greater than `value`, or `None` if `value` is the largest.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 10).unwrap();
    /// tree.insert("b", 20).unwrap();
    /// assert_eq!(tree.successor(&10), Ok(Some(&20)));
    /// assert_eq!(tree.successor(&20), Ok(None));
    /// assert_eq!(tree.successor(&15), Err(Error::NotFound));
    /// ```
    pub fn successor<Q>(&self, value: &Q) -> Result<Option<&V>>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(value).ok_or(Error::NotFound)?;
        Ok(self.raw.next(handle).map(|next| &self.raw.node(next).value))
    }

    /// Returns the largest value smaller than `value`, or `None` if `value` is the smallest.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 10).unwrap();
    /// tree.insert("b", 20).unwrap();
    /// assert_eq!(tree.predecessor(&20), Ok(Some(&10)));
    /// assert_eq!(tree.predecessor(&10), Ok(None));
    /// ```
    pub fn predecessor<Q>(&self, value: &Q) -> Result<Option<&V>>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(value).ok_or(Error::NotFound)?;
        Ok(self.raw.prev(handle).map(|prev| &self.raw.node(prev).value))
    }
}

impl<V: PartialEq, K: PartialEq> PartialEq for OSRBTree<V, K> {
    fn eq(&self, other: &OSRBTree<V, K>) -> bool {
        self.total_entries() == other.total_entries() && self.iter().eq(other.iter())
    }
}

impl<V: Eq, K: Eq> Eq for OSRBTree<V, K> {}

impl<V: fmt::Debug, K: fmt::Debug> fmt::Debug for OSRBTree<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, K> Default for OSRBTree<V, K> {
    /// Creates an empty `OSRBTree`.
    fn default() -> OSRBTree<V, K> {
        OSRBTree::new()
    }
}

impl<'a, V, K> IntoIterator for &'a OSRBTree<V, K> {
    type Item = (&'a V, &'a [K]);
    type IntoIter = Iter<'a, V, K>;

    fn into_iter(self) -> Iter<'a, V, K> {
        self.iter()
    }
}

impl<'a, V, K> Iterator for Iter<'a, V, K> {
    type Item = (&'a V, &'a [K]);

    fn next(&mut self) -> Option<(&'a V, &'a [K])> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.raw.next(handle);

        let node = self.raw.node(handle);
        Some((&node.value, node.keys()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V, K> DoubleEndedIterator for Iter<'a, V, K> {
    fn next_back(&mut self) -> Option<(&'a V, &'a [K])> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.raw.prev(handle);

        let node = self.raw.node(handle);
        Some((&node.value, node.keys()))
    }
}

impl<V, K> ExactSizeIterator for Iter<'_, V, K> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<V, K> FusedIterator for Iter<'_, V, K> {}

impl<V, K> Clone for Iter<'_, V, K> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<V: fmt::Debug, K: fmt::Debug> fmt::Debug for Iter<'_, V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, V, K> Iterator for Values<'a, V, K> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(value, _)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V, K> DoubleEndedIterator for Values<'a, V, K> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(value, _)| value)
    }
}

impl<V, K> ExactSizeIterator for Values<'_, V, K> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<V, K> FusedIterator for Values<'_, V, K> {}

impl<V, K> Clone for Values<'_, V, K> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<V: fmt::Debug, K> fmt::Debug for Values<'_, V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
