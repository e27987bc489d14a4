use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::candidates::{Candidate, CandidateList};
use crate::kdtree::distance::DistanceMetric;
use crate::kdtree::index::coord_to_vec;
use crate::kdtree::traversal::{InOrder, Node};
use crate::kdtree::KDTree;
use crate::r#type::IndexableNum;

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex<N: IndexableNum>: Sized {
    /// The metric used by searches.
    type Metric: DistanceMetric<N>;

    /// The dimensionality of this tree. Points have at least this many coordinates.
    fn dims(&self) -> usize;

    /// The node arena, indexed by identifier.
    fn nodes(&self) -> &[Node<N>];

    /// Identifier of the root node, `None` when the tree is empty.
    fn root_id(&self) -> Option<usize>;

    /// The metric used by searches.
    fn distance_metric(&self) -> &Self::Metric;

    /// The number of points in this tree.
    fn len(&self) -> usize {
        self.nodes().len()
    }

    /// Whether this tree holds no points.
    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Access the root node for manual traversal.
    fn root(&self) -> Option<&Node<N>> {
        self.root_id().map(|id| &self.nodes()[id])
    }

    /// Access the node with identifier `id`.
    fn node(&self, id: usize) -> Option<&Node<N>> {
        self.nodes().get(id)
    }

    /// All points, ordered by identifier.
    fn points(&self) -> Vec<&[N]> {
        self.nodes().iter().map(Node::point).collect()
    }

    /// All points in tree order: left subtree, node, right subtree.
    fn points_in_order(&self) -> Vec<&[N]> {
        self.in_order().map(Node::point).collect()
    }

    /// Iterate over the nodes in tree order.
    fn in_order(&self) -> InOrder<'_, N> {
        InOrder::new(self.nodes(), self.root_id())
    }

    /// Find up to `k` points nearest to `query`, nearest first.
    ///
    /// Results are empty if the tree is empty, `k` is 0 or `query` has fewer coordinates than
    /// the tree's dimensionality. Points at a NaN distance from `query` are never returned.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let mut tree = KDTree::<f64>::new(2).unwrap();
    /// for point in [[0., 0.], [10., 0.], [0., 10.], [10., 10.], [5., 5.]] {
    ///     tree.insert(point);
    /// }
    ///
    /// let nearest = tree.knn(&[1., 1.], 1);
    /// assert_eq!(nearest.ids, vec![0]);
    /// assert_eq!(nearest.distances, vec![2.]);
    /// assert_eq!(nearest.points, vec![&[0., 0.][..]]);
    /// ```
    fn knn(&self, query: &[N], k: usize) -> Neighbors<'_, N> {
        let Some(root) = self.root_id() else {
            return Neighbors::default();
        };
        if k < 1 || query.len() < self.dims() {
            return Neighbors::default();
        }

        let mut candidates = CandidateList::new();
        knn_search(self, query, k, root, &mut candidates);
        Neighbors::from_candidates(self.nodes(), candidates.iter().take(k))
    }

    /// Find up to `k` points nearest to `coord`, using every dimension it carries.
    fn knn_coord(&self, coord: &impl CoordTrait<T = N>, k: usize) -> Neighbors<'_, N> {
        self.knn(&coord_to_vec(coord), k)
    }

    /// Find every point within `radius` of `query`, nearest first.
    ///
    /// `radius` is in the units of the tree's metric, so with the default squared Euclidean
    /// metric it is a squared distance. Points exactly at `radius` are included.
    ///
    /// Results are empty if the tree is empty, `radius` is not positive or `query` has fewer
    /// coordinates than the tree's dimensionality.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let tree = KDTree::<f64>::from_points(2, [[0., 0.], [1., 1.], [3., 0.]]).unwrap();
    /// let within = tree.dnn(&[0., 0.], 2.);
    /// assert_eq!(within.points, vec![&[0., 0.][..], &[1., 1.][..]]);
    /// assert_eq!(within.distances, vec![0., 2.]);
    /// ```
    fn dnn(&self, query: &[N], radius: N) -> Neighbors<'_, N> {
        let Some(root) = self.root_id() else {
            return Neighbors::default();
        };
        if radius.is_nan() || radius <= N::zero() || query.len() < self.dims() {
            return Neighbors::default();
        }

        let mut candidates = CandidateList::new();
        dnn_search(self, query, radius, root, &mut candidates);
        Neighbors::from_candidates(self.nodes(), candidates.iter())
    }

    /// Find every point within `radius` of `coord`, using every dimension it carries.
    fn dnn_coord(&self, coord: &impl CoordTrait<T = N>, radius: N) -> Neighbors<'_, N> {
        self.dnn(&coord_to_vec(coord), radius)
    }
}

impl<N: IndexableNum, M: DistanceMetric<N>> KDTreeIndex<N> for KDTree<N, M> {
    type Metric = M;

    fn dims(&self) -> usize {
        self.dims
    }

    fn nodes(&self) -> &[Node<N>] {
        &self.nodes
    }

    fn root_id(&self) -> Option<usize> {
        self.root
    }

    fn distance_metric(&self) -> &M {
        &self.metric
    }
}

/// The result of a nearest neighbor search, nearest first.
///
/// The three vectors are parallel: entry `i` of each describes the same point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors<'a, N: IndexableNum> {
    /// The points found.
    pub points: Vec<&'a [N]>,
    /// The distance from the query to each point, in the metric's units.
    pub distances: Vec<N>,
    /// The identifier of each point.
    pub ids: Vec<usize>,
}

impl<'a, N: IndexableNum> Neighbors<'a, N> {
    fn from_candidates<'c>(
        nodes: &'a [Node<N>],
        candidates: impl Iterator<Item = &'c Candidate<N>>,
    ) -> Self {
        let mut result = Self::default();
        for candidate in candidates {
            result.points.push(nodes[candidate.id].point());
            result.distances.push(candidate.distance);
            result.ids.push(candidate.id);
        }
        result
    }

    /// The number of points found.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no points were found.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over `(id, point, distance)` triples, nearest first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a [N], N)> + '_ {
        self.ids
            .iter()
            .zip(&self.points)
            .zip(&self.distances)
            .map(|((&id, &point), &distance)| (id, point, distance))
    }
}

/// The child of `node` on the far side of its splitting plane from `query`.
#[inline]
fn far_side<N: IndexableNum>(node: &Node<N>, query: &[N], axis: usize) -> Option<usize> {
    if query[axis] < node.point[axis] {
        node.right
    } else {
        node.left
    }
}

/// Depth-first branch-and-bound traversal shared by k-nearest and radius searches.
///
/// From each subtree root the query descends as an insertion would, then the path is unwound
/// from its deepest node. `visit` receives each unwound node's id, its distance to the query and
/// the distance to its splitting plane, and returns whether the far side of that plane must be
/// searched too. A far subtree is fully unwound before the rest of the path that led to it.
fn branch_and_bound<N, T, F>(tree: &T, query: &[N], root: usize, mut visit: F)
where
    N: IndexableNum,
    T: KDTreeIndex<N>,
    F: FnMut(usize, N, N) -> bool,
{
    let nodes = tree.nodes();
    let metric = tree.distance_metric();
    let dims = tree.dims();

    // Use TinyVec to avoid heap allocations. Each frame is (node, axis, descend): a descend
    // frame starts a new subtree, the others are path nodes waiting to be unwound.
    let mut stack: TinyVec<[(usize, usize, bool); 32]> = TinyVec::new();
    stack.push((root, 0, true));

    while let Some((id, axis, descend)) = stack.pop() {
        if descend {
            // walk down to where the query would be inserted; the deepest node ends up on top
            let mut current = Some(id);
            let mut axis = axis;
            while let Some(id) = current {
                stack.push((id, axis, false));
                let node = &nodes[id];
                current = if query[axis] < node.point[axis] {
                    node.left
                } else {
                    node.right
                };
                axis = (axis + 1) % dims;
            }
            continue;
        }

        let node = &nodes[id];
        let dist = metric.distance(query, node.point());
        let plane = metric.plane_distance(query, node.point(), axis);

        // check the other side of the splitting plane
        if visit(id, dist, plane) {
            if let Some(next) = far_side(node, query, axis) {
                stack.push((next, (axis + 1) % dims, true));
            }
        }
    }
}

/// Branch-and-bound k-nearest search.
///
/// The candidate list never holds more than `k` entries, and its `k`th distance is the bound a
/// point or a splitting plane must beat.
fn knn_search<N: IndexableNum, T: KDTreeIndex<N>>(
    tree: &T,
    query: &[N],
    k: usize,
    root: usize,
    candidates: &mut CandidateList<N>,
) {
    branch_and_bound(tree, query, root, |id, dist, plane| {
        let mut bound = candidates.kth(k - 1);
        // a NaN distance is never a neighbor
        if !dist.is_nan() && (candidates.len() < k || dist < bound) {
            candidates.insert(dist, id);
            if candidates.len() > k {
                candidates.delete_at(k);
            }
            bound = candidates.kth(k - 1);
        }
        plane < bound
    });
}

/// Collect every point within `radius` of `query`.
fn dnn_search<N: IndexableNum, T: KDTreeIndex<N>>(
    tree: &T,
    query: &[N],
    radius: N,
    root: usize,
    candidates: &mut CandidateList<N>,
) {
    branch_and_bound(tree, query, root, |id, dist, plane| {
        if dist <= radius {
            candidates.insert(dist, id);
        }
        plane <= radius
    });
}
