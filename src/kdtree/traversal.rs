//! Nodes of the k-d tree and iteration over them.

use std::fmt;

use tinyvec::TinyVec;

use crate::r#type::IndexableNum;

/// A node in the KDTree.
///
/// Nodes live in a flat arena owned by the tree, and a node's identifier is its slot in that
/// arena. Children are referred to by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N: IndexableNum> {
    pub(crate) id: usize,
    pub(crate) point: Vec<N>,
    pub(crate) depth: usize,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl<N: IndexableNum> Node<N> {
    pub(crate) fn new(id: usize, point: Vec<N>, depth: usize) -> Self {
        Self {
            id,
            point,
            depth,
            left: None,
            right: None,
        }
    }

    /// The identifier of this node.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The point held by this node.
    pub fn point(&self) -> &[N] {
        &self.point
    }

    /// Distance from the root, which has depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The axis this node splits its children over in a tree of `dims` dimensions.
    pub fn axis(&self, dims: usize) -> usize {
        self.depth % dims
    }

    /// Identifier of the child holding points strictly less on the splitting axis.
    pub fn left(&self) -> Option<usize> {
        self.left
    }

    /// Identifier of the child holding points greater than or equal on the splitting axis.
    pub fn right(&self) -> Option<usize> {
        self.right
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl<N: IndexableNum> fmt::Display for Node<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.point.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.6}", v)?;
        }
        write!(f, "}}")
    }
}

/// An iterator over the nodes of a tree in sorted (left, node, right) order.
#[derive(Debug, Clone)]
pub struct InOrder<'a, N: IndexableNum> {
    nodes: &'a [Node<N>],
    // Use TinyVec to avoid heap allocations
    stack: TinyVec<[usize; 32]>,
    next: Option<usize>,
}

impl<'a, N: IndexableNum> InOrder<'a, N> {
    pub(crate) fn new(nodes: &'a [Node<N>], root: Option<usize>) -> Self {
        Self {
            nodes,
            stack: TinyVec::new(),
            next: root,
        }
    }
}

impl<'a, N: IndexableNum> Iterator for InOrder<'a, N> {
    type Item = &'a Node<N>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.next {
            self.stack.push(id);
            self.next = self.nodes[id].left;
        }
        let id = self.stack.pop()?;
        let node = &self.nodes[id];
        self.next = node.right;
        Some(node)
    }
}
