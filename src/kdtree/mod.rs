//! An owned, mutable k-d tree with exact k-nearest and radius neighbor search.

#![warn(missing_docs)]

mod builder;
pub mod distance;
mod index;
mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use distance::{DistanceMetric, Manhattan, SquaredEuclidean};
pub use index::KDTree;
pub use r#trait::{KDTreeIndex, Neighbors};
pub use traversal::{InOrder, Node};
