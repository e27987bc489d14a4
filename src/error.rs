use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Only construction can fail. Queries and mutations on a built tree report invalid input with
/// empty results or `None`/`false` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdIndexError {
    /// The tree was configured with zero dimensions.
    #[error("A k-d tree needs at least one dimension")]
    ZeroDimensions,

    /// A bulk point has fewer coordinates than the tree's dimensionality.
    #[error("Point {index} has {len} coordinates, expected at least {dims}")]
    PointTooShort {
        /// Position of the point in the bulk input.
        index: usize,
        /// Number of coordinates the point has.
        len: usize,
        /// Dimensionality of the tree.
        dims: usize,
    },
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
