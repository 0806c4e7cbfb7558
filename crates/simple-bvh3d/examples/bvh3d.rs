use simple_bvh3d::bounding_volume::Aabb;
use simple_bvh3d::math::{Point, Vector};
use simple_bvh3d::partitioning::Bvh;

fn main() {
    let mut rng = oorandom::Rand32::new(0);

    /*
     * Generate 32 small cubes at random positions.
     */
    let aabbs: Vec<_> = (0..32)
        .map(|_| {
            let mins = Point::new(
                rng.rand_float() * 10.0,
                rng.rand_float() * 10.0,
                rng.rand_float() * 10.0,
            );
            Aabb::new(mins, mins + Vector::repeat(0.5))
        })
        .collect();

    /*
     * Build the tree, with at most 4 cubes per leaf, and print it.
     */
    match Bvh::from_aabbs(&aabbs, 4) {
        Ok(bvh) => print!("{}", bvh),
        Err(e) => eprintln!("Failed to build the BVH: {}", e),
    }
}
