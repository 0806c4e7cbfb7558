use super::{Bvh, BvhNodeKind};
use core::fmt;

/// Prints the tree one node per line, children indented below their parent.
///
/// Each leaf is followed by the list of input AABB indices it contains. Node ids that are out
/// of bounds, or that don’t come after their parent, are not printed.
impl fmt::Display for Bvh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            Ok(())
        } else {
            self.fmt_subtree(f, 0, 0)
        }
    }
}

impl Bvh {
    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, id: u32, indent: usize) -> fmt::Result {
        let Some(node) = self.nodes.get(id as usize) else {
            return Ok(());
        };
        writeln!(f, "{:indent$}{}", "", node.aabb, indent = indent)?;

        match node.kind {
            BvhNodeKind::Leaf { .. } => {
                write!(f, "{:indent$}", "", indent = indent + 2)?;
                for (k, index) in self.leaf_indices(id).unwrap_or(&[]).iter().enumerate() {
                    if k > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", index)?;
                }
                writeln!(f)
            }
            BvhNodeKind::Internal { children } => {
                for child in children.into_iter().filter(|child| *child > id) {
                    self.fmt_subtree(f, child, indent + 2)?;
                }
                Ok(())
            }
        }
    }
}
