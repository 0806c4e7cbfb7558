//! Spatial partitioning tools.

#[cfg(feature = "parallel")]
pub use self::bvh::PARALLEL_BUILD_THRESHOLD;
pub use self::bvh::{
    build, Bvh, BvhBuildError, BvhBuildOptions, BvhNode, BvhNodeKind, SplitAxis, SplitKey,
};

mod bvh;
