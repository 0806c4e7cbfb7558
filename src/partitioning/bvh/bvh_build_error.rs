/// Error raised when the input of a BVH build is invalid.
///
/// A failed build never modifies the [`Bvh`](crate::partitioning::Bvh) it was called on.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BvhBuildError {
    /// A BVH must be built from at least one AABB.
    #[error("cannot build a BVH from an empty set of AABBs")]
    EmptyInput,
    /// Leaves must be allowed to contain at least one AABB.
    #[error("the leaf size must be at least 1")]
    ZeroLeafSize,
    /// The number of AABBs cannot be addressed by the `u32` node and leaf indices.
    #[error("too many AABBs ({0}) to be indexed by a BVH")]
    TooManyBoxes(usize),
}
