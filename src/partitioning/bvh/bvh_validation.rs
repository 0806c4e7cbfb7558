use super::{Bvh, BvhNodeKind};
use crate::bounding_volume::{Aabb, BoundingVolume};
use alloc::vec;

impl Bvh {
    /// Counts the number of leaves that can be reached from the node at index `id`.
    ///
    /// This is mostly a utility for debugging.
    pub fn reachable_leaf_count(&self, id: u32) -> u32 {
        match self.nodes.get(id as usize).map(|node| node.kind) {
            None => 0,
            Some(BvhNodeKind::Leaf { .. }) => 1,
            Some(BvhNodeKind::Internal { children }) => {
                self.reachable_leaf_count(children[0]) + self.reachable_leaf_count(children[1])
            }
        }
    }

    /// Panics if `self` isn’t a well-formed tree built over `aabbs` with at most `leaf_size`
    /// AABBs per leaf.
    ///
    /// The tree is well-formed if:
    /// - its index array contains each position of `aabbs` exactly once.
    /// - every leaf contains between 1 and `leaf_size` AABBs.
    /// - every internal node has two children stored after itself, and every node is reachable
    ///   exactly once from the root.
    /// - every node AABB is exactly the merge of the input AABBs below it.
    pub fn assert_well_formed(&self, aabbs: &[Aabb], leaf_size: usize) {
        if aabbs.is_empty() {
            assert!(self.is_empty());
            assert!(self.indices.is_empty());
            return;
        }

        assert_eq!(self.indices.len(), aabbs.len());

        let mut seen = vec![false; aabbs.len()];
        for &index in &self.indices {
            assert!(
                (index as usize) < aabbs.len(),
                "Index {} out of bounds.",
                index
            );
            assert!(!seen[index as usize], "Index {} stored twice.", index);
            seen[index as usize] = true;
        }

        let mut visited = vec![false; self.nodes.len()];
        let _ = self.assert_well_formed_recurse(0, aabbs, leaf_size, &mut visited);

        assert!(
            visited.iter().all(|v| *v),
            "Some nodes are not reachable from the root."
        );
        assert_eq!(self.leaf_count(), self.leaves().count());
    }

    fn assert_well_formed_recurse(
        &self,
        node_id: u32,
        aabbs: &[Aabb],
        leaf_size: usize,
        visited: &mut [bool],
    ) -> Aabb {
        let node = &self.nodes[node_id as usize];

        if core::mem::replace(&mut visited[node_id as usize], true) {
            panic!("Detected loop. Node {} visited twice.", node_id);
        }

        let calculated_aabb = match node.kind {
            BvhNodeKind::Leaf { leaf_size: size, .. } => {
                assert!(size >= 1, "Leaf {} is empty.", node_id);
                assert!(
                    size as usize <= leaf_size,
                    "Leaf {} contains {} AABBs, more than {}.",
                    node_id,
                    size,
                    leaf_size
                );
                let leaf_indices = self
                    .leaf_indices(node_id)
                    .expect("leaf range out of bounds");
                Aabb::merge_all(leaf_indices.iter().map(|i| &aabbs[*i as usize]))
                    .expect("leaf without AABB")
            }
            BvhNodeKind::Internal { children } => {
                for child in children {
                    assert!(
                        child > node_id,
                        "Child {} stored before its parent {}.",
                        child,
                        node_id
                    );
                    assert!((child as usize) < self.nodes.len());
                }

                let left = self.assert_well_formed_recurse(children[0], aabbs, leaf_size, visited);
                let right =
                    self.assert_well_formed_recurse(children[1], aabbs, leaf_size, visited);
                left.merged(&right)
            }
        };

        assert_eq!(
            node.aabb, calculated_aabb,
            "The AABB of node {} isn’t the merge of its leaves.",
            node_id
        );

        calculated_aabb
    }
}
