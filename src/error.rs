use thiserror::Error;

/// Errors reported by [`OSRBTree`](crate::OSRBTree) operations.
///
/// Every failing call is validated before the tree is touched, so an error never
/// leaves a partially applied mutation behind.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// The key is already associated with the value.
    #[error("key is already associated with this value")]
    DuplicateKey,

    /// The value, or the key/value pair, is not present.
    #[error("value or key/value pair not found")]
    NotFound,

    /// A positional argument fell outside its valid range.
    #[error("index {index} is out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    /// The query needs at least one entry.
    #[error("operation requires a non-empty tree")]
    EmptyTree,
}

/// Result type alias for tree operations.
pub type Result<T> = core::result::Result<T, Error>;
