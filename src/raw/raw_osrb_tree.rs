use core::borrow::Borrow;
use core::cmp::Ordering;

use log::trace;

use super::handle::Handle;
use super::node::Node;
use super::store::NodeStore;
use crate::error::{Error, Result};
use crate::osrb_tree::Color;

const SIBLING_EXISTS: &str = "red-black invariant violated - a doubly black node must have a sibling";

/// The red-black engine backing `OSRBTree`.
///
/// Every node stores the number of keys in its subtree. All structural changes
/// (attach, splice, rotate) re-derive those counts bottom-up so that rank and
/// select can skip whole subtrees.
#[derive(Clone)]
pub(crate) struct RawOSRBTree<V, K> {
    store: NodeStore<V, K>,
}

impl<V, K> RawOSRBTree<V, K> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self { store: NodeStore::new() }
    }

    /// Creates a new tree with room for `capacity` distinct values.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: NodeStore::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Returns the number of key/value pairs in the tree.
    pub(crate) const fn total(&self) -> usize {
        self.store.total()
    }

    /// Returns the number of distinct values in the tree.
    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn clear(&mut self) {
        self.store.clear();
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.store.root()
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<V, K> {
        self.store.get(handle)
    }

    #[inline]
    fn parent(&self, handle: Handle) -> Option<Handle> {
        self.store.get(handle).parent
    }

    #[inline]
    fn left(&self, handle: Handle) -> Option<Handle> {
        self.store.get(handle).left
    }

    #[inline]
    fn right(&self, handle: Handle) -> Option<Handle> {
        self.store.get(handle).right
    }

    /// Absent leaves count as black.
    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.store.get(h).is_red())
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.store.get_mut(handle).color = color;
    }

    /// Returns the subtree count of a possibly absent node.
    #[inline]
    pub(crate) fn count(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.store.get(h).count)
    }

    fn update_count(&mut self, handle: Handle) {
        let node = self.store.get(handle);
        let count = node.multiplicity() + self.count(node.left) + self.count(node.right);
        self.store.get_mut(handle).count = count;
    }

    /// Re-derives subtree counts from `start` up to the root.
    fn recount_to_root(&mut self, start: Option<Handle>) {
        let mut current = start;
        while let Some(handle) = current {
            self.update_count(handle);
            current = self.parent(handle);
        }
    }

    /// Returns the leftmost node of the subtree rooted at `handle`.
    pub(crate) fn minimum(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.left(handle) {
            handle = left;
        }
        handle
    }

    /// Returns the rightmost node of the subtree rooted at `handle`.
    pub(crate) fn maximum(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.right(handle) {
            handle = right;
        }
        handle
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.root().map(|root| self.minimum(root))
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.root().map(|root| self.maximum(root))
    }

    /// Returns the in-order successor of `handle`.
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.right(handle) {
            return Some(self.minimum(right));
        }
        let mut child = handle;
        let mut parent = self.parent(handle);
        while let Some(p) = parent {
            if self.left(p) == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.parent(p);
        }
        None
    }

    /// Returns the in-order predecessor of `handle`.
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.left(handle) {
            return Some(self.maximum(left));
        }
        let mut child = handle;
        let mut parent = self.parent(handle);
        while let Some(p) = parent {
            if self.right(p) == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.parent(p);
        }
        None
    }

    /// Returns the node at 1-based `rank`, where each node spans as many ranks as it has keys.
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank == 0 || rank > self.total() {
            return None;
        }

        let mut remaining = rank;
        let mut current = self.root();
        while let Some(handle) = current {
            let node = self.store.get(handle);
            let left = self.count(node.left);
            if remaining <= left {
                current = node.left;
            } else if remaining <= left + node.multiplicity() {
                return Some(handle);
            } else {
                remaining -= left + node.multiplicity();
                current = node.right;
            }
        }

        panic!(
            "select: subtree count invariant violated - rank {} not found (total: {})",
            rank,
            self.total()
        );
    }

    // ─── Structural primitives ───────────────────────────────────────────────

    /// Points `dest`'s parent (or the root) at `source` instead of `dest`.
    fn replace_child(&mut self, source: Option<Handle>, dest: Handle) {
        let parent = self.parent(dest);
        match parent {
            None => self.store.set_root(source),
            Some(p) => {
                if self.left(p) == Some(dest) {
                    self.store.get_mut(p).left = source;
                } else {
                    self.store.get_mut(p).right = source;
                }
            }
        }
        if let Some(s) = source {
            self.store.get_mut(s).parent = parent;
        }
    }

    /// Moves `source` into `dest`'s position, taking over its children and color.
    fn transplant(&mut self, source: Handle, dest: Handle) {
        self.replace_child(Some(source), dest);

        let (left, right, color) = {
            let d = self.store.get(dest);
            (d.left, d.right, d.color)
        };
        let s = self.store.get_mut(source);
        s.left = left;
        s.right = right;
        s.color = color;
        for child in [left, right].into_iter().flatten() {
            self.store.get_mut(child).parent = Some(source);
        }
    }

    fn rotate_left(&mut self, node: Handle) {
        let right = self.right(node).expect("`rotate_left()` - node has no right child!");

        let right_left = self.left(right);
        self.store.get_mut(node).right = right_left;
        if let Some(rl) = right_left {
            self.store.get_mut(rl).parent = Some(node);
        }

        self.replace_child(Some(right), node);
        self.store.get_mut(right).left = Some(node);
        self.store.get_mut(node).parent = Some(right);

        // Order matters: `node` is now the child.
        self.update_count(node);
        self.update_count(right);
    }

    fn rotate_right(&mut self, node: Handle) {
        let left = self.left(node).expect("`rotate_right()` - node has no left child!");

        let left_right = self.right(left);
        self.store.get_mut(node).left = left_right;
        if let Some(lr) = left_right {
            self.store.get_mut(lr).parent = Some(node);
        }

        self.replace_child(Some(left), node);
        self.store.get_mut(left).right = Some(node);
        self.store.get_mut(node).parent = Some(left);

        self.update_count(node);
        self.update_count(left);
    }

    // ─── Rebalancing ─────────────────────────────────────────────────────────

    /// Restores the red-black invariants after attaching the red leaf `node`.
    fn insert_fix(&mut self, mut node: Handle) {
        while let Some(parent) = self.parent(node).filter(|&p| self.is_red(Some(p))) {
            let grandparent = self.parent(parent).expect("red-black invariant violated - red root");

            if self.left(grandparent) == Some(parent) {
                let uncle = self.right(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    if let Some(u) = uncle {
                        self.set_color(u, Color::Black);
                    }
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    let mut parent = parent;
                    if self.right(parent) == Some(node) {
                        node = parent;
                        self.rotate_left(node);
                        parent = self.parent(node).expect("`insert_fix()` - rotated node lost its parent!");
                    }
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left(grandparent);
                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    if let Some(u) = uncle {
                        self.set_color(u, Color::Black);
                    }
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    let mut parent = parent;
                    if self.left(parent) == Some(node) {
                        node = parent;
                        self.rotate_right(node);
                        parent = self.parent(node).expect("`insert_fix()` - rotated node lost its parent!");
                    }
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }

        if let Some(root) = self.root() {
            self.set_color(root, Color::Black);
        }
    }

    /// Restores the red-black invariants after a black node was spliced out.
    ///
    /// `node` is the (possibly absent) child that took the removed node's place and
    /// `parent` is where it now hangs.
    fn remove_fix(&mut self, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while let Some(p) = parent {
            if self.is_red(node) {
                break;
            }

            if self.left(p) == node {
                let mut sibling = self.right(p).expect(SIBLING_EXISTS);
                if self.is_red(Some(sibling)) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    sibling = self.right(p).expect(SIBLING_EXISTS);
                }

                if !self.is_red(self.left(sibling)) && !self.is_red(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = Some(p);
                    parent = self.parent(p);
                } else {
                    if !self.is_red(self.right(sibling)) {
                        if let Some(near) = self.left(sibling) {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(p).expect(SIBLING_EXISTS);
                    }
                    let color = self.store.get(p).color;
                    self.set_color(sibling, color);
                    self.set_color(p, Color::Black);
                    if let Some(far) = self.right(sibling) {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_left(p);
                    node = self.root();
                    parent = None;
                }
            } else {
                let mut sibling = self.left(p).expect(SIBLING_EXISTS);
                if self.is_red(Some(sibling)) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    sibling = self.left(p).expect(SIBLING_EXISTS);
                }

                if !self.is_red(self.right(sibling)) && !self.is_red(self.left(sibling)) {
                    self.set_color(sibling, Color::Red);
                    node = Some(p);
                    parent = self.parent(p);
                } else {
                    if !self.is_red(self.left(sibling)) {
                        if let Some(near) = self.right(sibling) {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(p).expect(SIBLING_EXISTS);
                    }
                    let color = self.store.get(p).color;
                    self.set_color(sibling, color);
                    self.set_color(p, Color::Black);
                    if let Some(far) = self.left(sibling) {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_right(p);
                    node = self.root();
                    parent = None;
                }
            }
        }

        if let Some(n) = node {
            self.set_color(n, Color::Black);
        }
    }

    /// Detaches `node` from the tree, splicing by successor when it has two children.
    /// The node stays allocated; its subtree count is stale afterwards.
    fn unlink(&mut self, node: Handle) {
        debug_assert!(self.store.contains(node));

        let splice = match (self.left(node), self.right(node)) {
            (Some(_), Some(right)) => self.minimum(right),
            _ => node,
        };
        let subtree = self.left(splice).or(self.right(splice));
        let subtree_parent = if self.parent(splice) == Some(node) {
            Some(splice)
        } else {
            self.parent(splice)
        };
        let removed_black = !self.is_red(Some(splice));

        self.replace_child(subtree, splice);
        if splice != node {
            self.transplant(splice, node);
        }

        // `splice` (if moved) sits above `subtree_parent`, so one walk covers both.
        self.recount_to_root(subtree_parent);

        if removed_black {
            self.remove_fix(subtree, subtree_parent);
        }
    }
}

impl<V: Ord, K: Ord> RawOSRBTree<V, K> {
    /// Searches for a value and returns its node handle if present.
    pub(crate) fn search<Q>(&self, value: &Q) -> Option<Handle>
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root();
        while let Some(handle) = current {
            let node = self.store.get(handle);
            match value.cmp(node.value.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    /// Returns the number of keys held by values strictly below `value`, and the
    /// node holding `value` if there is one.
    pub(crate) fn locate<Q>(&self, value: &Q) -> (usize, Option<Handle>)
    where
        V: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut below = 0;
        let mut current = self.root();
        while let Some(handle) = current {
            let node = self.store.get(handle);
            match value.cmp(node.value.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => {
                    below += self.count(node.left) + node.multiplicity();
                    current = node.right;
                }
                Ordering::Equal => return (below + self.count(node.left), Some(handle)),
            }
        }
        (below, None)
    }

    /// Associates `key` with `value`.
    ///
    /// A new value gets a fresh red leaf and a rebalance; an existing value only
    /// gains a key, which leaves the shape untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<()> {
        let mut parent = None;
        let mut ordering = Ordering::Equal;
        let mut current = self.root();

        while let Some(handle) = current {
            let node = self.store.get(handle);
            ordering = value.cmp(&node.value);
            match ordering {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => {
                    let index = node.search_key(&key).err().ok_or(Error::DuplicateKey)?;
                    self.store.get_mut(handle).insert_key(index, key);
                    self.recount_to_root(Some(handle));
                    self.store.increment_total();
                    return Ok(());
                }
            }
            parent = Some(handle);
        }

        let handle = self.store.alloc(Node::new(value, key, parent));
        match parent {
            None => self.store.set_root(Some(handle)),
            Some(p) if ordering == Ordering::Less => self.store.get_mut(p).left = Some(handle),
            Some(p) => self.store.get_mut(p).right = Some(handle),
        }
        self.recount_to_root(parent);
        self.store.increment_total();
        trace!("osrb_tree: attached node in slot {}", handle.slot());

        self.insert_fix(handle);
        Ok(())
    }

    /// Removes the association between `key` and `value`, returning the stored key.
    ///
    /// The node goes away together with its last key.
    pub(crate) fn remove<KQ, VQ>(&mut self, key: &KQ, value: &VQ) -> Result<K>
    where
        K: Borrow<KQ>,
        KQ: ?Sized + Ord,
        V: Borrow<VQ>,
        VQ: ?Sized + Ord,
    {
        let handle = self.search(value).ok_or(Error::NotFound)?;
        let index = self.store.get(handle).search_key(key).map_err(|_| Error::NotFound)?;

        let removed = self.store.get_mut(handle).remove_key(index);
        self.store.decrement_total();

        if self.store.get(handle).multiplicity() == 0 {
            self.unlink(handle);
            self.store.take(handle);
            trace!("osrb_tree: spliced out node in slot {}", handle.slot());
        } else {
            self.recount_to_root(Some(handle));
        }
        Ok(removed)
    }
}
