#![doc = include_str!("../README.md")]

pub mod candidates;
mod error;
pub mod kdtree;
mod r#type;

pub use error::KdIndexError;
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
