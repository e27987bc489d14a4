//! A sorted, prunable list of `(distance, id)` candidates.
//!
//! This is the accumulator behind k-nearest and radius searches on a
//! [`KDTree`][crate::kdtree::KDTree], exposed for callers that want to maintain their own ranked
//! results.

#![warn(missing_docs)]

mod list;

pub use list::{Candidate, CandidateList};
