use std::fmt;

use geo_traits::CoordTrait;
use tracing::{debug, trace};

use crate::error::Result;
use crate::kdtree::distance::{DistanceMetric, SquaredEuclidean};
use crate::kdtree::traversal::Node;
use crate::kdtree::KDTreeBuilder;
use crate::r#type::IndexableNum;

/// An owned, mutable k-d tree.
///
/// Nodes are stored in an arena indexed by identifier. Identifiers are dense and assigned in
/// the order nodes are created: a bulk build numbers the root first, then the left subtree, then
/// the right subtree; a single [`insert`][Self::insert] appends the next free identifier.
///
/// Removal and [`rebalance`][Self::rebalance] rebuild the whole tree from the surviving points,
/// which renumbers every node. Identifiers held across those calls must be looked up again.
///
/// Mutations need `&mut self`; callers sharing a tree between threads must synchronize access
/// themselves.
#[derive(Debug, Clone)]
pub struct KDTree<N: IndexableNum = f64, M = SquaredEuclidean> {
    pub(crate) dims: usize,
    pub(crate) root: Option<usize>,
    pub(crate) nodes: Vec<Node<N>>,
    pub(crate) metric: M,
}

impl<N: IndexableNum> KDTree<N, SquaredEuclidean> {
    /// Create an empty tree for points of `dims` dimensions using squared Euclidean distance.
    pub fn new(dims: usize) -> Result<Self> {
        KDTreeBuilder::new(dims).finish()
    }

    /// Build a balanced tree from `points` using squared Euclidean distance.
    pub fn from_points<P: Into<Vec<N>>>(
        dims: usize,
        points: impl IntoIterator<Item = P>,
    ) -> Result<Self> {
        let mut builder = KDTreeBuilder::new(dims);
        builder.add_all(points);
        builder.finish()
    }
}

impl<N: IndexableNum, M: DistanceMetric<N>> KDTree<N, M> {
    pub(crate) fn empty(dims: usize, metric: M) -> Self {
        debug_assert!(dims > 0);
        Self {
            dims,
            root: None,
            nodes: vec![],
            metric,
        }
    }

    /// The metric this tree measures distances with.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The number of levels in the tree, 0 when empty.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Insert a single point and return its identifier.
    ///
    /// The point descends from the root exactly as a search would, going left when its
    /// coordinate on the splitting axis is strictly less than the node's and right otherwise,
    /// and becomes a new leaf. The tree is never rebalanced here.
    ///
    /// Returns `None`, leaving the tree untouched, if the point has fewer coordinates than the
    /// tree's dimensionality.
    pub fn insert(&mut self, point: impl Into<Vec<N>>) -> Option<usize> {
        let point = point.into();
        if point.len() < self.dims {
            return None;
        }

        let Some(mut current) = self.root else {
            let id = self.push_node(point, 0);
            self.root = Some(id);
            trace!(id, depth = 0, "inserted k-d tree root");
            return Some(id);
        };

        let mut axis = 0;
        loop {
            let node = &self.nodes[current];
            let go_left = point[axis] < node.point[axis];
            let child = if go_left { node.left } else { node.right };
            match child {
                Some(child) => {
                    current = child;
                    axis = (axis + 1) % self.dims;
                }
                None => {
                    let depth = node.depth + 1;
                    let id = self.push_node(point, depth);
                    let parent = &mut self.nodes[current];
                    if go_left {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    trace!(id, depth, "inserted k-d tree point");
                    return Some(id);
                }
            }
        }
    }

    /// Insert a coordinate, using every dimension it carries.
    pub fn insert_coord(&mut self, coord: &impl CoordTrait<T = N>) -> Option<usize> {
        self.insert(coord_to_vec(coord))
    }

    /// Remove the lowest-identifier point whose first `dims` coordinates all match `point`
    /// within `1e-6`, then rebuild the tree from the remaining points.
    ///
    /// Returns `false` without touching the tree when nothing matches.
    pub fn remove_by_point(&mut self, point: &[N]) -> bool {
        if point.len() < self.dims {
            return false;
        }
        let dims = self.dims;
        let epsilon = N::match_epsilon();
        let found = self.nodes.iter().position(|node| {
            node.point[..dims]
                .iter()
                .zip(point)
                .all(|(&a, &b)| (a - b).abs() < epsilon)
        });
        match found {
            Some(id) => {
                self.remove_and_rebuild(id);
                true
            }
            None => false,
        }
    }

    /// Remove the point with identifier `id`, then rebuild the tree from the remaining points.
    ///
    /// Returns `false` without touching the tree when `id` is not in use.
    pub fn remove_by_id(&mut self, id: usize) -> bool {
        if id >= self.nodes.len() {
            return false;
        }
        self.remove_and_rebuild(id);
        true
    }

    /// Rebuild the tree from its current points.
    ///
    /// This restores a balanced shape after many single insertions. The set of points is
    /// unchanged but identifiers are reassigned.
    pub fn rebalance(&mut self) {
        let points = self.take_points();
        self.rebuild(points);
    }

    fn remove_and_rebuild(&mut self, id: usize) {
        let mut points = self.take_points();
        points.remove(id);
        self.rebuild(points);
    }

    /// Drain every point out of the arena in identifier order, leaving the tree empty.
    fn take_points(&mut self) -> Vec<Vec<N>> {
        self.root = None;
        std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| node.point)
            .collect()
    }

    /// Replace the tree's contents with a balanced tree over `points`.
    ///
    /// Identifiers follow creation order: a subtree's root, then its left subtree, then its right
    /// subtree.
    pub(crate) fn rebuild(&mut self, points: Vec<Vec<N>>) {
        let num_items = points.len();
        self.nodes = Vec::with_capacity(num_items);
        self.root = None;

        // Each pending subtree is (points, axis, depth, parent and side). Right halves are
        // pushed before left halves so the left subtree is numbered first.
        let mut pending: Vec<(Vec<Vec<N>>, usize, usize, Option<(usize, bool)>)> =
            vec![(points, 0, 0, None)];

        while let Some((mut points, axis, depth, parent)) = pending.pop() {
            let Some((pivot, left, right)) = split_at_median(&mut points, axis) else {
                continue;
            };
            let id = self.push_node(pivot, depth);
            match parent {
                None => self.root = Some(id),
                Some((parent, true)) => self.nodes[parent].left = Some(id),
                Some((parent, false)) => self.nodes[parent].right = Some(id),
            }

            let next = (axis + 1) % self.dims;
            pending.push((right, next, depth + 1, Some((id, false))));
            pending.push((left, next, depth + 1, Some((id, true))));
        }

        debug!(num_items, height = self.height(), "built k-d tree");
    }

    fn push_node(&mut self, point: Vec<N>, depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, point, depth));
        id
    }
}

/// Renders the tree as nested `{left, node, right}` groups; leaves print as their point and
/// missing children as `nil`.
impl<N: IndexableNum, M: DistanceMetric<N>> fmt::Display for KDTree<N, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step {
            Subtree(Option<usize>),
            Middle(usize),
            Close,
        }

        let mut steps = vec![Step::Subtree(self.root)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Subtree(None) => write!(f, "nil")?,
                Step::Subtree(Some(id)) => {
                    let node = &self.nodes[id];
                    if node.is_leaf() {
                        write!(f, "{}", node)?;
                    } else {
                        write!(f, "{{")?;
                        steps.push(Step::Close);
                        steps.push(Step::Subtree(node.right));
                        steps.push(Step::Middle(id));
                        steps.push(Step::Subtree(node.left));
                    }
                }
                Step::Middle(id) => write!(f, ", {}, ", self.nodes[id])?,
                Step::Close => write!(f, "}}")?,
            }
        }
        Ok(())
    }
}

/// Sort `points` on `axis` and split them around the median.
///
/// The pivot is the first point of the run equal to the median, so every point left of it is
/// strictly less on this axis. Returns `None` for an empty slice.
fn split_at_median<N: IndexableNum>(
    points: &mut Vec<Vec<N>>,
    axis: usize,
) -> Option<(Vec<N>, Vec<Vec<N>>, Vec<Vec<N>>)> {
    if points.len() <= 1 {
        return points.pop().map(|pivot| (pivot, vec![], vec![]));
    }

    // NaN coordinates sort last so the comparison stays a total order
    points.sort_by(|a, b| {
        a[axis]
            .partial_cmp(&b[axis])
            .unwrap_or_else(|| a[axis].is_nan().cmp(&b[axis].is_nan()))
    });

    let median = points[points.len() / 2][axis];
    let mid = points.partition_point(|p| p[axis] < median);
    let right = points.split_off(mid + 1);
    let pivot = points.pop()?;
    Some((pivot, std::mem::take(points), right))
}

pub(crate) fn coord_to_vec<N: IndexableNum>(coord: &impl CoordTrait<T = N>) -> Vec<N> {
    (0..coord.dim().size())
        .map(|i| coord.nth_or_panic(i))
        .collect()
}
