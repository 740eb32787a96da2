use core::borrow::Borrow;

use super::OSRBTree;
use crate::error::{Error, Result};
use crate::raw::Handle;

/// Node color for red-black balancing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// A read-only snapshot of one node, for diagnostics and tree dumps.
///
/// Links are reported as the values of the neighbouring nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeInfo<'a, V> {
    pub parent: Option<&'a V>,
    pub left: Option<&'a V>,
    pub right: Option<&'a V>,
    pub color: Color,
    /// Number of keys associated with the node's value.
    pub key_count: usize,
    /// Number of keys in the node's subtree, the node included.
    pub count: usize,
}

impl<V, K> OSRBTree<V, K> {
    /// Returns the value stored at the root of the tree, if any.
    ///
    /// This exposes balancing decisions and is meant for diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTree;
    ///
    /// let mut tree = OSRBTree::new();
    /// assert_eq!(tree.root_value(), None);
    /// for (key, value) in [(1, 10), (2, 20), (3, 30)] {
    ///     tree.insert(key, value).unwrap();
    /// }
    /// assert_eq!(tree.root_value(), Some(&20));
    /// ```
    #[must_use]
    pub fn root_value(&self) -> Option<&V> {
        self.raw.root().map(|root| &self.raw.node(root).value)
    }
}

impl<V: Ord, K: Ord> OSRBTree<V, K> {
    /// Returns the links, color and counts of the node holding `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if `value` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Color, OSRBTree};
    ///
    /// let mut tree = OSRBTree::new();
    /// for (key, value) in [(1, 10), (2, 20), (3, 30), (4, 20)] {
    ///     tree.insert(key, value).unwrap();
    /// }
    ///
    /// let root = tree.node(&20).unwrap();
    /// assert_eq!(root.parent, None);
    /// assert_eq!((root.left, root.right), (Some(&10), Some(&30)));
    /// assert_eq!(root.color, Color::Black);
    /// assert_eq!((root.key_count, root.count), (2, 4));
    ///
    /// let leaf = tree.node(&30).unwrap();
    /// assert_eq!(leaf.parent, Some(&20));
    /// assert_eq!(leaf.color, Color::Red);
    /// ```
    pub fn node<Q>(&self, value: &Q) -> Result<NodeInfo<'_, V>>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.search(value).ok_or(Error::NotFound)?;
        let node = self.raw.node(handle);
        let value_of = |link: Option<Handle>| link.map(|h| &self.raw.node(h).value);

        Ok(NodeInfo {
            parent: value_of(node.parent),
            left: value_of(node.left),
            right: value_of(node.right),
            color: node.color,
            key_count: node.multiplicity(),
            count: node.count,
        })
    }
}
