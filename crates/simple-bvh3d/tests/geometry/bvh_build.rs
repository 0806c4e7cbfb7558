use simple_bvh3d::bounding_volume::{Aabb, BoundingVolume};
use simple_bvh3d::math::{Point, Vector};
use simple_bvh3d::partitioning::{
    build, Bvh, BvhBuildError, BvhBuildOptions, BvhNodeKind, SplitKey,
};

fn random_aabbs(seed: u64, len: usize) -> Vec<Aabb> {
    let mut rng = oorandom::Rand32::new(seed);
    (0..len)
        .map(|_| {
            let mins = Point::new(
                rng.rand_float() * 10.0,
                rng.rand_float() * 10.0,
                rng.rand_float() * 10.0,
            );
            Aabb::new(mins, mins + Vector::repeat(0.5))
        })
        .collect()
}

/// Merges the input AABBs of all the leaves below `id`, checking leaf bounds on the way.
fn subtree_aabb(
    nodes: &[simple_bvh3d::partitioning::BvhNode],
    indices: &[u32],
    aabbs: &[Aabb],
    leaf_size: usize,
    id: u32,
) -> Aabb {
    match nodes[id as usize].kind() {
        BvhNodeKind::Leaf {
            leaf_index,
            leaf_size: size,
        } => {
            assert!(size >= 1 && size as usize <= leaf_size);
            let range = leaf_index as usize..(leaf_index + size) as usize;
            Aabb::merge_all(indices[range].iter().map(|i| &aabbs[*i as usize])).unwrap()
        }
        BvhNodeKind::Internal { children } => {
            assert!(children[0] > id && children[1] > id);
            let left = subtree_aabb(nodes, indices, aabbs, leaf_size, children[0]);
            let right = subtree_aabb(nodes, indices, aabbs, leaf_size, children[1]);
            left.merged(&right)
        }
    }
}

#[test]
fn random_trees_cover_and_contain_their_aabbs() {
    for (seed, len) in [(0, 1), (1, 2), (2, 31), (3, 32), (4, 33), (5, 1234)] {
        for leaf_size in [1, 2, 4, 7] {
            let aabbs = random_aabbs(seed, len);
            let (nodes, indices) = build(&aabbs, leaf_size).unwrap();

            // Coverage: every input index exactly once.
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..len as u32).collect::<Vec<_>>());

            // Containment: every node AABB is exactly the merge of its leaves.
            for id in 0..nodes.len() as u32 {
                let expected = subtree_aabb(&nodes, &indices, &aabbs, leaf_size, id);
                assert_eq!(*nodes[id as usize].aabb(), expected);
            }

            assert_eq!(
                *nodes[0].aabb(),
                Aabb::merge_all(&aabbs).unwrap(),
                "the root must cover every input AABB"
            );
        }
    }
}

#[test]
fn demo_sized_tree() {
    let aabbs = random_aabbs(32, 32);
    let bvh = Bvh::from_aabbs(&aabbs, 4).unwrap();

    bvh.assert_well_formed(&aabbs, 4);
    assert_eq!(bvh.leaf_count(), 8);
    assert_eq!(bvh.nodes().len(), 15);
    assert_eq!(bvh.depth(), 4);

    for leaf in bvh.leaves() {
        let leaf_aabb = bvh.node(leaf).unwrap().aabb();
        for i in bvh.leaf_indices(leaf).unwrap() {
            assert!(leaf_aabb.contains(&aabbs[*i as usize]));
        }
    }

    let printed = format!("{}", bvh);
    assert_eq!(printed.lines().count(), 15 + 8);
}

#[test]
fn centroid_split_separates_distant_clusters() {
    // Two clusters far apart along X, interleaved in the input. Integer coordinates keep
    // every extent exact so all the boxes have the same size.
    let aabbs: Vec<_> = (0..16)
        .map(|i| {
            let x = if i % 2 == 0 { 0.0 } else { 100.0 };
            let mins = Point::new(x + i as f32, 0.0, 0.0);
            Aabb::new(mins, mins + Vector::repeat(1.0))
        })
        .collect();

    let bvh = Bvh::from_aabbs(&aabbs, 8).unwrap();
    let [left, right] = bvh.root().unwrap().children().unwrap();
    assert!(bvh.leaf_indices(left).unwrap().iter().all(|i| i % 2 == 0));
    assert!(bvh.leaf_indices(right).unwrap().iter().all(|i| i % 2 == 1));

    // Sorting by size instead mixes both clusters since all boxes have the same size.
    let options = BvhBuildOptions {
        leaf_size: 8,
        split_key: SplitKey::HalfExtents,
        ..Default::default()
    };
    let legacy = Bvh::from_aabbs_with_options(&aabbs, &options).unwrap();
    assert!(aabbs
        .iter()
        .all(|aabb| aabb.half_extents() == aabbs[0].half_extents()));
    let [left, right] = legacy.root().unwrap().children().unwrap();
    assert_eq!(
        legacy.leaf_indices(left).unwrap(),
        &[0, 1, 2, 3, 4, 5, 6, 7]
    );
    assert_eq!(
        legacy.leaf_indices(right).unwrap(),
        &[8, 9, 10, 11, 12, 13, 14, 15]
    );
}

#[test]
fn invalid_inputs_are_rejected() {
    let aabbs = random_aabbs(0, 4);
    assert_eq!(build(&[], 1), Err(BvhBuildError::EmptyInput));
    assert_eq!(build(&aabbs, 0), Err(BvhBuildError::ZeroLeafSize));
    assert_eq!(
        BvhBuildError::EmptyInput.to_string(),
        "cannot build a BVH from an empty set of AABBs"
    );
    assert_eq!(
        BvhBuildError::ZeroLeafSize.to_string(),
        "the leaf size must be at least 1"
    );
}
