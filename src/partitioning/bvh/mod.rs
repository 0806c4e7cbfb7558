pub use bvh_build_error::BvhBuildError;
#[cfg(feature = "parallel")]
pub use bvh_median_build::PARALLEL_BUILD_THRESHOLD;
pub use bvh_tree::{build, Bvh, BvhBuildOptions, BvhNode, BvhNodeKind, SplitAxis, SplitKey};

mod bvh_build_error;
mod bvh_display;
mod bvh_median_build;
mod bvh_tree;
mod bvh_validation;
