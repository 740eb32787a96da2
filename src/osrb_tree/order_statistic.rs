use core::borrow::Borrow;
use core::ops::Index;

use super::OSRBTree;
use crate::Rank;
use crate::error::{Error, Result};

impl<V, K> OSRBTree<V, K> {
    /// Returns the value occupying the 1-based `rank` in ascending order.
    ///
    /// A value with `m` keys occupies `m` consecutive ranks, so every rank in
    /// `1..=total_entries()` selects some value.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `rank` is zero or greater than
    /// [`total_entries`](OSRBTree::total_entries).
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 30).unwrap();
    /// tree.insert("b", 10).unwrap();
    /// tree.insert("c", 10).unwrap();
    ///
    /// assert_eq!(tree.select_at_rank(1), Ok(&10));
    /// assert_eq!(tree.select_at_rank(2), Ok(&10));
    /// assert_eq!(tree.select_at_rank(3), Ok(&30));
    /// assert_eq!(tree.select_at_rank(4), Err(Error::OutOfRange { index: 4, len: 3 }));
    /// ```
    pub fn select_at_rank(&self, rank: usize) -> Result<&V> {
        let handle = self.raw.select(rank).ok_or(Error::OutOfRange {
            index: rank,
            len: self.total_entries(),
        })?;
        Ok(&self.raw.node(handle).value)
    }

    /// Returns the value occupying the 1-based `rank` in descending order.
    ///
    /// Equivalent to `select_at_rank(total_entries() + 1 - rank)`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `rank` is zero or greater than
    /// [`total_entries`](OSRBTree::total_entries).
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 30).unwrap();
    /// tree.insert("b", 10).unwrap();
    ///
    /// assert_eq!(tree.select_at_rank_reverse(1), Ok(&30));
    /// assert_eq!(tree.select_at_rank_reverse(2), Ok(&10));
    /// ```
    pub fn select_at_rank_reverse(&self, rank: usize) -> Result<&V> {
        let total = self.total_entries();
        if rank == 0 || rank > total {
            return Err(Error::OutOfRange { index: rank, len: total });
        }
        self.select_at_rank(total + 1 - rank)
    }

    /// Returns the value at `percentile` (0..=100) of rank space.
    ///
    /// The target rank is `percentile * total_entries() / 100`, rounded half up and
    /// never below 1.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree is empty, [`Error::OutOfRange`] if
    /// `percentile > 100`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// for value in 1..=10 {
    ///     tree.insert("k", value).unwrap();
    /// }
    /// assert_eq!(tree.at_percentile(0), Ok(&1));
    /// assert_eq!(tree.at_percentile(25), Ok(&3));
    /// assert_eq!(tree.at_percentile(100), Ok(&10));
    /// ```
    pub fn at_percentile(&self, percentile: usize) -> Result<&V> {
        self.select_scaled(percentile, 100)
    }

    /// Returns the value at `permil` (0..=1000) of rank space.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree is empty, [`Error::OutOfRange`] if
    /// `permil > 1000`.
    pub fn at_permil(&self, permil: usize) -> Result<&V> {
        self.select_scaled(permil, 1000)
    }

    /// Returns the median value: the value at rank `ceil(total_entries() / 2)`.
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
    /// for (key, value) in [(1, 10), (2, 100), (3, 110), (4, 200), (5, 300), (6, 10_000)] {
    ///     tree.insert(key, value).unwrap();
    /// }
    /// assert_eq!(tree.median(), Ok(&110));
    /// ```
    pub fn median(&self) -> Result<&V> {
        self.at_percentile(50)
    }

    fn select_scaled(&self, fraction: usize, scale: usize) -> Result<&V> {
        if fraction > scale {
            return Err(Error::OutOfRange {
                index: fraction,
                len: scale + 1,
            });
        }
        let total = self.total_entries();
        if total == 0 {
            return Err(Error::EmptyTree);
        }
        let rank = round_half_up(fraction * total, scale).max(1);
        self.select_at_rank(rank)
    }
}

impl<V: Ord, K: Ord> OSRBTree<V, K> {
    /// Returns the 1-based rank of `value`: one more than the number of entries
    /// holding a smaller value.
    ///
    /// This is the first rank of the band `value` occupies.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 10).unwrap();
    /// tree.insert("b", 10).unwrap();
    /// tree.insert("c", 30).unwrap();
    ///
    /// assert_eq!(tree.rank(&10), Ok(1));
    /// assert_eq!(tree.rank(&30), Ok(3));
    /// assert_eq!(tree.rank(&20), Err(Error::NotFound));
    /// ```
    pub fn rank<Q>(&self, value: &Q) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.raw.locate(value) {
            (below, Some(_)) => Ok(below + 1),
            (_, None) => Err(Error::NotFound),
        }
    }

    /// Returns the number of entries whose value is strictly below `value`.
    ///
    /// `value` does not need to be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 10).unwrap();
    /// tree.insert("b", 10).unwrap();
    /// tree.insert("c", 30).unwrap();
    ///
    /// assert_eq!(tree.values_below(&10), 0);
    /// assert_eq!(tree.values_below(&20), 2);
    /// assert_eq!(tree.values_below(&99), 3);
    /// ```
    #[must_use]
    pub fn values_below<Q>(&self, value: &Q) -> usize
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.locate(value).0
    }

    /// Returns the number of entries whose value is strictly above `value`.
    ///
    /// `value` does not need to be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// tree.insert("a", 10).unwrap();
    /// tree.insert("b", 10).unwrap();
    /// tree.insert("c", 30).unwrap();
    ///
    /// assert_eq!(tree.values_above(&10), 1);
    /// assert_eq!(tree.values_above(&30), 0);
    /// assert_eq!(tree.values_above(&0), 3);
    /// ```
    #[must_use]
    pub fn values_above<Q>(&self, value: &Q) -> usize
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (below, handle) = self.raw.locate(value);
        let equal = handle.map_or(0, |h| self.raw.node(h).multiplicity());
        self.total_entries() - below - equal
    }

    /// Returns the share of entries strictly below `value`, in percent rounded half up.
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
    /// for (key, value) in [(1, 10), (2, 20), (3, 30)] {
    ///     tree.insert(key, value).unwrap();
    /// }
    /// assert_eq!(tree.percentile(&10), Ok(0));
    /// assert_eq!(tree.percentile(&30), Ok(67));
    /// assert_eq!(tree.percentile(&99), Ok(100));
    /// ```
    pub fn percentile<Q>(&self, value: &Q) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.share_below(value, 100)
    }

    /// Returns the share of entries strictly below `value`, in permil rounded half up.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree is empty.
    pub fn permil<Q>(&self, value: &Q) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.share_below(value, 1000)
    }

    fn share_below<Q>(&self, value: &Q, scale: usize) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let total = self.total_entries();
        if total == 0 {
            return Err(Error::EmptyTree);
        }
        Ok(round_half_up(self.values_below(value) * scale, total))
    }
}

/// `numerator / denominator`, rounded half up.
fn round_half_up(numerator: usize, denominator: usize) -> usize {
    (numerator * 10 / denominator + 5) / 10
}

/// Indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is zero or greater than the number of entries.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTree, Rank};
///
/// let mut tree = OSRBTree::new();
/// tree.insert("a", 20).unwrap();
/// tree.insert("b", 10).unwrap();
///
/// assert_eq!(tree[Rank(1)], 10);
/// ```
impl<V, K> Index<Rank> for OSRBTree<V, K> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select_at_rank(rank.0).expect("rank out of bounds")
    }
}
