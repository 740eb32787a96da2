/// A one-based rank into the sorted order of an [`OSRBTree`](crate::OSRBTree).
///
/// Rank space is weighted by multiplicity: a value held by three keys occupies
/// three consecutive ranks.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTree, Rank};
///
/// let mut tree = OSRBTree::new();
/// tree.insert("a", 10).unwrap();
/// tree.insert("b", 10).unwrap();
/// tree.insert("c", 20).unwrap();
///
/// assert_eq!(tree[Rank(2)], 10);
/// assert_eq!(tree[Rank(3)], 20);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
