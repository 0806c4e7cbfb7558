extern crate nalgebra as na;

mod aabb_merge;
mod bvh_build;
