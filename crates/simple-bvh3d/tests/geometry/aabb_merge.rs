use approx::assert_relative_eq;
use na::{Point3, Vector3};
use simple_bvh3d::bounding_volume::{Aabb, BoundingVolume};

#[test]
fn test_aabb_merge_encloses_both() {
    let aabb1 = Aabb::from_half_extents(Point3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
    let aabb2 = Aabb::from_half_extents(Point3::new(-8.0, 2.5, 0.0), Vector3::new(0.5, 0.5, 0.5));
    let merged = aabb1.merged(&aabb2);

    assert!(merged.contains(&aabb1));
    assert!(merged.contains(&aabb2));
    assert_eq!(merged.mins, Point3::new(-8.5, -3.0, -3.0));
    assert_eq!(merged.maxs, Point3::new(5.0, 7.0, 9.0));
    assert_eq!(Aabb::merge_all(&[aabb1, aabb2]), Some(merged));
}

#[test]
fn test_aabb_center_is_not_half_extents() {
    let aabb = Aabb::new(Point3::new(10.0, 20.0, 30.0), Point3::new(11.0, 22.0, 33.0));

    assert_relative_eq!(aabb.center(), Point3::new(10.5, 21.0, 31.5));
    assert_relative_eq!(aabb.half_extents(), Vector3::new(0.5, 1.0, 1.5));
}

#[test]
fn test_aabb_relative_eq() {
    let aabb = Aabb::new(Point3::new(0.1, 0.2, 0.3), Point3::new(1.0, 1.0, 1.0));
    let shifted = Aabb::new(
        aabb.mins + Vector3::repeat(1.0e-7),
        aabb.maxs - Vector3::repeat(1.0e-7),
    );

    assert_relative_eq!(aabb, shifted, epsilon = 1.0e-5);
    assert!(aabb != shifted);
}
