use super::{Bvh, BvhBuildError, BvhBuildOptions, BvhNode, BvhNodeKind, SplitAxis};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real};
use alloc::vec::Vec;
use ordered_float::OrderedFloat;

/// Ranges with at least this many AABBs have their two halves built in parallel.
#[cfg(feature = "parallel")]
pub const PARALLEL_BUILD_THRESHOLD: usize = 4096;

/// An input AABB along with its sort key and its position in the input slice.
#[derive(Copy, Clone, Debug)]
struct BuildRecord {
    key: Point<Real>,
    aabb: Aabb,
    index: u32,
}

impl Bvh {
    /// Rebuilds this BVH over `aabbs`, with at most `leaf_size` AABBs per leaf.
    ///
    /// Default values are used for the other [`BvhBuildOptions`]. On error, `self` is
    /// left unchanged.
    pub fn build(&mut self, aabbs: &[Aabb], leaf_size: usize) -> Result<(), BvhBuildError> {
        self.build_with_options(aabbs, &BvhBuildOptions::with_leaf_size(leaf_size))
    }

    /// Rebuilds this BVH over `aabbs` with the given options.
    ///
    /// Every range of more than `options.leaf_size` AABBs is sorted along the current split
    /// axis, then split at its middle. The split axis cycles between X, Y and Z with the
    /// depth of the tree. On error, `self` is left unchanged.
    pub fn build_with_options(
        &mut self,
        aabbs: &[Aabb],
        options: &BvhBuildOptions,
    ) -> Result<(), BvhBuildError> {
        options.validate(aabbs.len())?;

        let mut records: Vec<_> = aabbs
            .iter()
            .enumerate()
            .map(|(index, aabb)| BuildRecord {
                key: options.split_key.key(aabb),
                aabb: *aabb,
                index: index as u32,
            })
            .collect();

        self.clear();
        self.nodes.reserve(aabbs.len().saturating_mul(2));
        self.indices.reserve(aabbs.len());

        let _ = build_range(
            &mut self.nodes,
            &mut self.indices,
            &mut records,
            options.first_axis,
            options.leaf_size,
        );

        log::debug!(
            "Built BVH over {} AABBs: {} nodes, {} leaves, depth {}.",
            aabbs.len(),
            self.nodes.len(),
            self.leaf_count(),
            self.depth()
        );

        Ok(())
    }
}

/// Builds the subtree over `records`, appending its nodes and indices to `nodes` and `indices`.
///
/// Returns the id of the subtree root. Nodes are laid out in pre-order, so the subtree
/// occupies a contiguous slice of `nodes` starting at its root.
fn build_range(
    nodes: &mut Vec<BvhNode>,
    indices: &mut Vec<u32>,
    records: &mut [BuildRecord],
    axis: SplitAxis,
    leaf_size: usize,
) -> u32 {
    debug_assert!(!records.is_empty());

    let aabb = records[1..]
        .iter()
        .fold(records[0].aabb, |acc, record| acc.merged(&record.aabb));

    // Reserve the slot of this node before building its children.
    let id = nodes.len() as u32;
    nodes.push(BvhNode::leaf(aabb, indices.len() as u32, 0));

    if records.len() <= leaf_size {
        nodes[id as usize].kind = BvhNodeKind::Leaf {
            leaf_index: indices.len() as u32,
            leaf_size: records.len() as u32,
        };
        indices.extend(records.iter().map(|record| record.index));
        return id;
    }

    let dim = axis.index();
    records.sort_by_key(|record| OrderedFloat(record.key[dim]));

    let mid = records.len() / 2;
    let (left_records, right_records) = records.split_at_mut(mid);

    #[cfg(feature = "parallel")]
    let children = if left_records.len() + right_records.len() >= PARALLEL_BUILD_THRESHOLD {
        build_halves_in_parallel(
            nodes,
            indices,
            left_records,
            right_records,
            axis.next(),
            leaf_size,
        )
    } else {
        [
            build_range(nodes, indices, left_records, axis.next(), leaf_size),
            build_range(nodes, indices, right_records, axis.next(), leaf_size),
        ]
    };

    #[cfg(not(feature = "parallel"))]
    let children = [
        build_range(nodes, indices, left_records, axis.next(), leaf_size),
        build_range(nodes, indices, right_records, axis.next(), leaf_size),
    ];

    nodes[id as usize].kind = BvhNodeKind::Internal { children };
    id
}

/// Builds both halves on separate rayon tasks, each into its own arrays, then appends them
/// to `nodes` and `indices`.
///
/// The result is identical to two successive calls to [`build_range`].
#[cfg(feature = "parallel")]
fn build_halves_in_parallel(
    nodes: &mut Vec<BvhNode>,
    indices: &mut Vec<u32>,
    left_records: &mut [BuildRecord],
    right_records: &mut [BuildRecord],
    axis: SplitAxis,
    leaf_size: usize,
) -> [u32; 2] {
    log::trace!(
        "Forking BVH build: {} + {} AABBs.",
        left_records.len(),
        right_records.len()
    );

    let build_detached = |records: &mut [BuildRecord]| {
        let mut nodes = Vec::with_capacity(records.len() * 2);
        let mut indices = Vec::with_capacity(records.len());
        let _ = build_range(&mut nodes, &mut indices, records, axis, leaf_size);
        (nodes, indices)
    };

    let ((left_nodes, left_indices), (right_nodes, right_indices)) = rayon::join(
        || build_detached(left_records),
        || build_detached(right_records),
    );

    [
        append_subtree(nodes, indices, left_nodes, &left_indices),
        append_subtree(nodes, indices, right_nodes, &right_indices),
    ]
}

/// Appends a subtree built with local ids starting at 0, returning the id of its root.
#[cfg(feature = "parallel")]
fn append_subtree(
    nodes: &mut Vec<BvhNode>,
    indices: &mut Vec<u32>,
    subtree_nodes: Vec<BvhNode>,
    subtree_indices: &[u32],
) -> u32 {
    let node_offset = nodes.len() as u32;
    let index_offset = indices.len() as u32;

    nodes.extend(
        subtree_nodes
            .into_iter()
            .map(|node| node.relocated(node_offset, index_offset)),
    );
    indices.extend_from_slice(subtree_indices);

    node_offset
}
