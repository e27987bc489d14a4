use crate::error::{KdIndexError, Result};
use crate::kdtree::distance::{DistanceMetric, SquaredEuclidean};
use crate::kdtree::KDTree;
use crate::r#type::IndexableNum;

/// A builder to create a [`KDTree`] from an initial set of points.
///
/// Points added here are not yet indexed; [`finish`][Self::finish] performs a single median
/// build over all of them, which gives a balanced tree. Points inserted later through
/// [`KDTree::insert`] are not rebalanced.
///
/// ```
/// use kd_index::kdtree::{KDTreeBuilder, KDTreeIndex, Manhattan};
///
/// let mut builder = KDTreeBuilder::<f64>::new(2).metric(Manhattan);
/// builder.add([0., 0.]);
/// builder.add([3., 4.]);
/// let tree = builder.finish().unwrap();
///
/// let nearest = tree.knn(&[3., 3.], 1);
/// assert_eq!(nearest.distances, vec![1.]);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: IndexableNum, M = SquaredEuclidean> {
    dims: usize,
    points: Vec<Vec<N>>,
    metric: M,
}

impl<N: IndexableNum> KDTreeBuilder<N, SquaredEuclidean> {
    /// Create a new builder for points of `dims` dimensions, using squared Euclidean distance.
    pub fn new(dims: usize) -> Self {
        Self::new_with_capacity(dims, 0)
    }

    /// Create a new builder with room for `num_items` points.
    pub fn new_with_capacity(dims: usize, num_items: usize) -> Self {
        Self {
            dims,
            points: Vec::with_capacity(num_items),
            metric: SquaredEuclidean,
        }
    }
}

impl<N: IndexableNum, M: DistanceMetric<N>> KDTreeBuilder<N, M> {
    /// Replace the distance metric.
    ///
    /// The metric must be separable across axes; see
    /// [`distance`][crate::kdtree::distance].
    pub fn metric<M2: DistanceMetric<N>>(self, metric: M2) -> KDTreeBuilder<N, M2> {
        KDTreeBuilder {
            dims: self.dims,
            points: self.points,
            metric,
        }
    }

    /// Add a point to the index. Returns the point's position among the added points.
    ///
    /// This is not the identifier the point will have in the finished tree: identifiers follow
    /// the tree's build order.
    pub fn add(&mut self, point: impl Into<Vec<N>>) -> usize {
        self.points.push(point.into());
        self.points.len() - 1
    }

    /// Add every point from `points`.
    pub fn add_all<P: Into<Vec<N>>>(&mut self, points: impl IntoIterator<Item = P>) {
        self.points.extend(points.into_iter().map(Into::into));
    }

    /// The number of points added so far.
    pub fn num_items(&self) -> usize {
        self.points.len()
    }

    /// Consume this builder, validating the points and building a balanced tree.
    ///
    /// Fails if the builder has zero dimensions or any point has fewer coordinates than that.
    pub fn finish(self) -> Result<KDTree<N, M>> {
        if self.dims == 0 {
            return Err(KdIndexError::ZeroDimensions);
        }
        if let Some((index, point)) = self
            .points
            .iter()
            .enumerate()
            .find(|(_, p)| p.len() < self.dims)
        {
            return Err(KdIndexError::PointTooShort {
                index,
                len: point.len(),
                dims: self.dims,
            });
        }

        let mut tree = KDTree::empty(self.dims, self.metric);
        tree.rebuild(self.points);
        Ok(tree)
    }
}
