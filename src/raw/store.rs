use super::handle::Handle;
use super::node::Node;

/// Owns every node of a tree, plus the root link and the running entry total.
///
/// The store has no ordering knowledge. Freed slots are recycled so handles held
/// by live nodes stay valid across unrelated removals.
#[derive(Clone)]
pub(crate) struct NodeStore<V, K> {
    slots: Vec<Option<Node<V, K>>>,
    free: Vec<Handle>,
    root: Option<Handle>,
    // Sum of every node's multiplicity.
    total: usize,
}

impl<V, K> NodeStore<V, K> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            total: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: None,
            total: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[inline]
    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn set_root(&mut self, root: Option<Handle>) {
        self.root = root;
    }

    #[inline]
    pub(crate) const fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn increment_total(&mut self) {
        self.total += 1;
    }

    pub(crate) fn decrement_total(&mut self) {
        self.total = self.total.checked_sub(1).expect("`NodeStore::decrement_total()` - total is zero!");
    }

    pub(crate) fn alloc(&mut self, node: Node<V, K>) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.slot()] = Some(node);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`NodeStore::alloc()` - store is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(node));
            Handle::from_slot(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &Node<V, K> {
        self.slots[handle.slot()].as_ref().expect("`NodeStore::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut Node<V, K> {
        self.slots[handle.slot()].as_mut().expect("`NodeStore::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.slots.get(handle.slot()).is_some_and(Option::is_some)
    }

    /// Releases a node. The caller must already have unlinked it from the tree.
    pub(crate) fn take(&mut self, handle: Handle) -> Node<V, K> {
        let node = self.slots[handle.slot()].take().expect("`NodeStore::take()` - `handle` is invalid!");
        self.free.push(handle);
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.total = 0;
    }
}
