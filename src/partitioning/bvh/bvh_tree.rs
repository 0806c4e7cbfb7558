use super::BvhBuildError;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use alloc::vec::Vec;
use core::ops::Range;

/// One of the coordinate axes a set of AABBs can be split along.
///
/// The BVH construction cycles through the axes with the tree depth: X, then Y, then Z,
/// then X again.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SplitAxis {
    /// The X axis.
    #[default]
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl SplitAxis {
    /// The coordinate index of this axis (0 for X, 1 for Y, 2 for Z).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The axis used at the next depth of the tree.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::Z,
            Self::Z => Self::X,
        }
    }
}

/// The per-AABB value the leaves are sorted by before each median split.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SplitKey {
    /// Sort by the AABB midpoint `(mins + maxs) / 2`.
    ///
    /// This gives a spatial split: boxes close to each other along the split axis end up in
    /// the same subtree.
    #[default]
    Centroid,
    /// Sort by the AABB half-extents `(maxs - mins) / 2`.
    ///
    /// This sorts boxes by their *size* along the split axis rather than by their position.
    /// It reproduces the layout of trees built by older versions of this algorithm and should
    /// only be used when compatibility with those trees matters.
    HalfExtents,
}

impl SplitKey {
    /// Computes the sort key of `aabb`, one coordinate per axis.
    #[inline]
    pub fn key(self, aabb: &Aabb) -> Point<Real> {
        match self {
            Self::Centroid => aabb.center(),
            Self::HalfExtents => Point::from(aabb.half_extents()),
        }
    }
}

/// Parameters of the BVH construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvhBuildOptions {
    /// The maximum number of AABBs stored in a single leaf. Must be at least 1.
    pub leaf_size: usize,
    /// The value the AABBs are sorted by before being split.
    pub split_key: SplitKey,
    /// The axis used for splitting the root.
    pub first_axis: SplitAxis,
}

impl Default for BvhBuildOptions {
    fn default() -> Self {
        Self {
            leaf_size: 4,
            split_key: SplitKey::default(),
            first_axis: SplitAxis::default(),
        }
    }
}

impl BvhBuildOptions {
    /// Default options with the given leaf size.
    pub fn with_leaf_size(leaf_size: usize) -> Self {
        Self {
            leaf_size,
            ..Self::default()
        }
    }

    /// Checks that these options can be used to build a tree over `num_aabbs` AABBs.
    pub(super) fn validate(&self, num_aabbs: usize) -> Result<(), BvhBuildError> {
        if self.leaf_size == 0 {
            Err(BvhBuildError::ZeroLeafSize)
        } else if num_aabbs == 0 {
            Err(BvhBuildError::EmptyInput)
        } else if num_aabbs > Bvh::MAX_AABBS {
            Err(BvhBuildError::TooManyBoxes(num_aabbs))
        } else {
            Ok(())
        }
    }
}

/// The payload of a BVH node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum BvhNodeKind {
    /// A node with exactly two children.
    Internal {
        /// Indices of the left and right children in the node array.
        children: [u32; 2],
    },
    /// A node referencing a contiguous range of the index array.
    Leaf {
        /// Offset of the first index of this leaf in the index array.
        leaf_index: u32,
        /// Number of AABBs stored in this leaf.
        leaf_size: u32,
    },
}

/// A node (internal or leaf) of a BVH.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvhNode {
    /// Merge of the AABBs of every leaf below this node.
    pub(super) aabb: Aabb,
    pub(super) kind: BvhNodeKind,
}

impl BvhNode {
    /// Initializes a leaf covering `leaf_size` indices starting at `leaf_index`.
    #[inline]
    pub fn leaf(aabb: Aabb, leaf_index: u32, leaf_size: u32) -> Self {
        Self {
            aabb,
            kind: BvhNodeKind::Leaf {
                leaf_index,
                leaf_size,
            },
        }
    }

    /// Initializes an internal node with the given children.
    #[inline]
    pub fn internal(aabb: Aabb, children: [u32; 2]) -> Self {
        Self {
            aabb,
            kind: BvhNodeKind::Internal { children },
        }
    }

    /// This node’s AABB.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// This node’s payload.
    #[inline]
    pub fn kind(&self) -> BvhNodeKind {
        self.kind
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf { .. })
    }

    /// The indices of this node’s children, if it is an internal node.
    #[inline]
    pub fn children(&self) -> Option<[u32; 2]> {
        match self.kind {
            BvhNodeKind::Internal { children } => Some(children),
            BvhNodeKind::Leaf { .. } => None,
        }
    }

    /// The range of the index array covered by this node, if it is a leaf.
    #[inline]
    pub fn leaf_range(&self) -> Option<Range<usize>> {
        match self.kind {
            BvhNodeKind::Leaf {
                leaf_index,
                leaf_size,
            } => Some(leaf_index as usize..(leaf_index as usize).saturating_add(leaf_size as usize)),
            BvhNodeKind::Internal { .. } => None,
        }
    }

    /// Shifts the node and index references of this node by the given offsets.
    #[inline]
    #[cfg(feature = "parallel")]
    pub(super) fn relocated(mut self, node_offset: u32, index_offset: u32) -> Self {
        match &mut self.kind {
            BvhNodeKind::Internal { children } => {
                children[0] += node_offset;
                children[1] += node_offset;
            }
            BvhNodeKind::Leaf { leaf_index, .. } => *leaf_index += index_offset,
        }
        self
    }
}

/// A bounding volume hierarchy built by recursive median splits.
///
/// The tree is stored as two flat arrays:
/// - the nodes, with the root at index 0. A node is always stored before its children.
/// - the indices of the input AABBs, where the indices of a single leaf are contiguous.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use simple_bvh3d::bounding_volume::Aabb;
/// use simple_bvh3d::partitioning::Bvh;
/// use nalgebra::{Point3, Vector3};
///
/// let aabbs: Vec<_> = (0..10)
///     .map(|i| Aabb::from_half_extents(Point3::new(i as f32, 0.0, 0.0), Vector3::repeat(0.5)))
///     .collect();
/// let bvh = Bvh::from_aabbs(&aabbs, 2).unwrap();
///
/// assert_eq!(bvh.indices().len(), 10);
/// assert_eq!(bvh.root().unwrap().aabb().mins, Point3::new(-0.5, -0.5, -0.5));
/// assert_eq!(bvh.root().unwrap().aabb().maxs, Point3::new(9.5, 0.5, 0.5));
///
/// for leaf in bvh.leaves() {
///     assert!(bvh.leaf_indices(leaf).unwrap().len() <= 2);
/// }
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Bvh {
    pub(super) nodes: Vec<BvhNode>,
    pub(super) indices: Vec<u32>,
}

impl Bvh {
    /// The maximum number of AABBs a BVH can be built from.
    ///
    /// A tree over `n` AABBs has up to `2n - 1` nodes, which must all be addressable by a `u32`.
    pub const MAX_AABBS: usize = (u32::MAX / 2) as usize + 1;

    /// An empty BVH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a new BVH over `aabbs`, with at most `leaf_size` AABBs per leaf.
    ///
    /// The leaf indices refer to positions in `aabbs`.
    pub fn from_aabbs(aabbs: &[Aabb], leaf_size: usize) -> Result<Self, BvhBuildError> {
        Self::from_aabbs_with_options(aabbs, &BvhBuildOptions::with_leaf_size(leaf_size))
    }

    /// Builds a new BVH over `aabbs` with the given build options.
    pub fn from_aabbs_with_options(
        aabbs: &[Aabb],
        options: &BvhBuildOptions,
    ) -> Result<Self, BvhBuildError> {
        let mut result = Self::new();
        result.build_with_options(aabbs, options)?;
        Ok(result)
    }

    /// Removes every node and index from this tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.indices.clear();
    }

    /// Does this tree contain no node at all?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All the nodes of this tree. The root is at index 0.
    #[inline]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// The input AABB indices, grouped by leaf.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The root of this tree, or `None` if it is empty.
    #[inline]
    pub fn root(&self) -> Option<&BvhNode> {
        self.nodes.first()
    }

    /// The node at index `id`.
    #[inline]
    pub fn node(&self, id: u32) -> Option<&BvhNode> {
        self.nodes.get(id as usize)
    }

    /// The input AABB indices stored by the node `id`, or `None` if it is not a leaf.
    pub fn leaf_indices(&self, id: u32) -> Option<&[u32]> {
        let range = self.node(id)?.leaf_range()?;
        self.indices.get(range)
    }

    /// Iterates through the indices of all the leaf nodes, from left to right.
    pub fn leaves(&self) -> impl Iterator<Item = u32> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id as u32)
    }

    /// The number of leaf nodes of this tree.
    pub fn leaf_count(&self) -> usize {
        // Every internal node has exactly two children.
        (self.nodes.len() + 1) / 2
    }

    /// The number of nodes along the longest path from the root to a leaf.
    ///
    /// Returns 0 if the tree is empty. Child ids that are out of bounds, or that don’t come
    /// after their parent, are ignored.
    pub fn depth(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let mut max_depth = 0;
        let mut stack = alloc::vec![(0u32, 1usize)];

        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);

            if let Some(children) = self.node(id).and_then(BvhNode::children) {
                for child in children {
                    if child > id && (child as usize) < self.nodes.len() {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }

        max_depth
    }

    /// Consumes this tree, returning its node and index arrays.
    pub fn into_parts(self) -> (Vec<BvhNode>, Vec<u32>) {
        (self.nodes, self.indices)
    }
}

/// Builds the node and index arrays of a BVH over `aabbs`, with at most `leaf_size` AABBs
/// per leaf.
///
/// This is a shorthand for [`Bvh::from_aabbs`] followed by [`Bvh::into_parts`].
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use simple_bvh3d::bounding_volume::Aabb;
/// use simple_bvh3d::partitioning::{build, BvhBuildError};
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let (nodes, indices) = build(&[aabb], 3).unwrap();
/// assert_eq!(nodes.len(), 1);
/// assert!(nodes[0].is_leaf());
/// assert_eq!(indices, vec![0]);
///
/// assert_eq!(build(&[], 3), Err(BvhBuildError::EmptyInput));
/// assert_eq!(build(&[aabb], 0), Err(BvhBuildError::ZeroLeafSize));
/// # }
/// ```
pub fn build(aabbs: &[Aabb], leaf_size: usize) -> Result<(Vec<BvhNode>, Vec<u32>), BvhBuildError> {
    Bvh::from_aabbs(aabbs, leaf_size).map(Bvh::into_parts)
}
