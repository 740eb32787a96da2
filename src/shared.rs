//! A thread-safe handle around [`OSRBTree`].
//!
//! Mutations take the write lock, so at most one is in flight at a time; queries
//! take the read lock and may run concurrently between mutations.

use std::borrow::Borrow;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::OSRBTree;
use crate::error::Result;

/// A cloneable, shared [`OSRBTree`].
///
/// Clones refer to the same tree. Query methods return owned values, so `V` must
/// be [`Clone`]; use [`read`](SharedOSRBTree::read) to borrow from the tree instead.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use osrb_tree::SharedOSRBTree;
///
/// let tree = SharedOSRBTree::new();
/// let writers: Vec<_> = (0..4u64)
///     .map(|account| {
///         let tree = tree.clone();
///         thread::spawn(move || tree.insert(account, 100 + account as u128))
///     })
///     .collect();
/// for writer in writers {
///     writer.join().unwrap().unwrap();
/// }
///
/// assert_eq!(tree.total_entries(), 4);
/// assert_eq!(tree.first_value(), Ok(100));
/// ```
pub struct SharedOSRBTree<V, K> {
    inner: Arc<RwLock<OSRBTree<V, K>>>,
}

impl<V, K> SharedOSRBTree<V, K> {
    /// Makes a new, empty shared tree.
    #[must_use]
    pub fn new() -> Self {
        Self::from(OSRBTree::new())
    }

    /// Locks the tree for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, OSRBTree<V, K>> {
        self.inner.read()
    }

    /// Locks the tree for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, OSRBTree<V, K>> {
        self.inner.write()
    }

    /// See [`OSRBTree::total_entries`].
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.inner.read().total_entries()
    }
}

impl<V: Ord, K: Ord> SharedOSRBTree<V, K> {
    /// See [`OSRBTree::insert`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::insert`].
    pub fn insert(&self, key: K, value: V) -> Result<()> {
        self.inner.write().insert(key, value)
    }

    /// See [`OSRBTree::remove`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::remove`].
    pub fn remove<KQ, VQ>(&self, key: &KQ, value: &VQ) -> Result<K>
    where
        K: Borrow<KQ>,
        KQ: ?Sized + Ord,
        V: Borrow<VQ>,
        VQ: ?Sized + Ord,
    {
        self.inner.write().remove(key, value)
    }

    /// See [`OSRBTree::exists`].
    #[must_use]
    pub fn exists<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.inner.read().exists(value)
    }

    /// See [`OSRBTree::rank`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::rank`].
    pub fn rank<Q>(&self, value: &Q) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.inner.read().rank(value)
    }
}

impl<V: Clone, K> SharedOSRBTree<V, K> {
    /// See [`OSRBTree::select_at_rank`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::select_at_rank`].
    pub fn select_at_rank(&self, rank: usize) -> Result<V> {
        self.inner.read().select_at_rank(rank).cloned()
    }

    /// See [`OSRBTree::select_at_rank_reverse`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::select_at_rank_reverse`].
    pub fn select_at_rank_reverse(&self, rank: usize) -> Result<V> {
        self.inner.read().select_at_rank_reverse(rank).cloned()
    }

    /// See [`OSRBTree::first_value`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::first_value`].
    pub fn first_value(&self) -> Result<V> {
        self.inner.read().first_value().cloned()
    }

    /// See [`OSRBTree::last_value`].
    ///
    /// # Errors
    ///
    /// As for [`OSRBTree::last_value`].
    pub fn last_value(&self) -> Result<V> {
        self.inner.read().last_value().cloned()
    }
}

impl<V, K> Clone for SharedOSRBTree<V, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, K> Default for SharedOSRBTree<V, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, K> From<OSRBTree<V, K>> for SharedOSRBTree<V, K> {
    fn from(tree: OSRBTree<V, K>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }
}
