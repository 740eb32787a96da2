//! Order-statistic red-black tree for Rust.
//!
//! This crate provides [`OSRBTree`], an index of orderable values where every value
//! is associated with one or more external keys (account ids, record ids, ...). On top
//! of the usual insert/remove/lookup it answers rank queries in O(log n):
//!
//! - [`rank`](OSRBTree::rank) - The 1-based sorted position of a value
//! - [`select_at_rank`](OSRBTree::select_at_rank) - The value occupying a sorted position
//! - [`total_entries`](OSRBTree::total_entries) - The number of key/value pairs, in O(1)
//! - Indexing by [`Rank`] - e.g., `tree[Rank(1)]` for the smallest value
//!
//! # Example
//!
//! ```
//! use osrb_tree::{OSRBTree, Rank};
//!
//! let mut prices = OSRBTree::new();
//! prices.insert("k1", 50).unwrap();
//! prices.insert("k2", 30).unwrap();
//! prices.insert("k3", 70).unwrap();
//!
//! assert_eq!(prices.total_entries(), 3);
//! assert_eq!(prices.first_value(), Ok(&30));
//! assert_eq!(prices.rank(&50), Ok(2));
//! assert_eq!(prices.select_at_rank_reverse(1), Ok(&70));
//! assert_eq!(prices[Rank(1)], 30);
//! ```
//!
//! # Ranks and multiplicity
//!
//! A value shared by `m` keys occupies `m` consecutive ranks. [`rank`](OSRBTree::rank)
//! reports the first rank of that band, and every rank inside the band selects the value.
//!
//! # Implementation
//!
//! Nodes live in an arena and link to each other through compact handles, so the
//! parent back-references never fight the borrow checker. Each node carries the total
//! key count of its subtree, which lets rank and select skip whole subtrees.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod error;
mod order_statistic;
mod raw;

pub mod osrb_tree;
pub mod script;
pub mod shared;

pub use error::{Error, Result};
pub use order_statistic::Rank;
pub use osrb_tree::{Color, NodeInfo, OSRBTree};
pub use shared::SharedOSRBTree;
