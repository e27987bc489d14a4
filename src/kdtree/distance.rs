//! Distance metrics for nearest neighbor queries.
//!
//! Searches prune a subtree by comparing the current bound against
//! [`DistanceMetric::plane_distance`], the metric evaluated on a single coordinate. That is only a
//! valid lower bound when the metric is separable across axes: its value for two points is never
//! less than its value for the same points with every coordinate but one zeroed out. Squared
//! Euclidean and Manhattan distance both qualify; metrics that do not will silently miss
//! neighbors.

use crate::r#type::IndexableNum;

/// A distance between two points.
///
/// Any closure `Fn(&[N], &[N]) -> N` is a metric, so a custom function can be handed straight to
/// [`KDTreeBuilder::metric`][crate::kdtree::KDTreeBuilder::metric]. Implementations must be
/// separable across axes (see the [module docs][self]), and distances passed to
/// [`dnn`][crate::kdtree::KDTreeIndex::dnn] are in the metric's own units.
pub trait DistanceMetric<N: IndexableNum> {
    /// Calculate the distance between two points.
    ///
    /// The two slices need not have the same length.
    fn distance(&self, a: &[N], b: &[N]) -> N;

    /// The distance from `query` to the splitting plane through `node` on `axis`.
    ///
    /// The default evaluates [`distance`][Self::distance] on two points that are zero everywhere
    /// but `axis`, where they hold the query's and the node's coordinate. `axis` is always below
    /// the length of both inputs.
    fn plane_distance(&self, query: &[N], node: &[N], axis: usize) -> N {
        let mut a = vec![N::zero(); query.len()];
        let mut b = vec![N::zero(); node.len()];
        a[axis] = query[axis];
        b[axis] = node[axis];
        self.distance(&a, &b)
    }
}

impl<N: IndexableNum, F> DistanceMetric<N> for F
where
    F: Fn(&[N], &[N]) -> N,
{
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> N {
        self(a, b)
    }
}

/// Squared Euclidean distance.
///
/// This is the default metric. Only the first `min(a.len(), b.len())` coordinates are compared;
/// extra coordinates on the longer point are ignored rather than treated as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredEuclidean;

impl<N: IndexableNum> DistanceMetric<N> for SquaredEuclidean {
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> N {
        a.iter().zip(b).fold(N::zero(), |acc, (&x, &y)| {
            let d = x - y;
            acc + d * d
        })
    }

    #[inline]
    fn plane_distance(&self, query: &[N], node: &[N], axis: usize) -> N {
        let d = query[axis] - node[axis];
        d * d
    }
}

/// Manhattan (taxicab) distance.
///
/// Truncates to the shorter point the same way [`SquaredEuclidean`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl<N: IndexableNum> DistanceMetric<N> for Manhattan {
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> N {
        a.iter()
            .zip(b)
            .fold(N::zero(), |acc, (&x, &y)| acc + (x - y).abs())
    }

    #[inline]
    fn plane_distance(&self, query: &[N], node: &[N], axis: usize) -> N {
        (query[axis] - node[axis]).abs()
    }
}
