mod handle;
mod node;
mod raw_osrb_tree;
mod store;

pub(crate) use handle::Handle;
pub(crate) use raw_osrb_tree::RawOSRBTree;
