//! Preorder tree visiting with in-place mutation.

use crate::tree::{Node, NodeKind, TreePath};

/// What the walker does after a visitor returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    /// Descend into the (possibly rewritten) node's children
    #[default]
    Continue,
    /// Do not descend into this node
    Skip,
}

/// Where a visited node sits: its parent's path and its index in the parent.
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    pub parent: &'a [usize],
    pub index: usize,
}

impl Location<'_> {
    /// Full path of the visited node.
    pub fn path(&self) -> TreePath {
        let mut indices = Vec::with_capacity(self.parent.len() + 1);
        indices.extend_from_slice(self.parent);
        indices.push(self.index);
        TreePath::new(indices)
    }
}

/// Visit every descendant of `tree` whose kind is `kind`.
///
/// The visitor may rewrite the node in place (including changing its kind).
/// Children are visited after the visitor returns, so they reflect the
/// rewritten node. The root itself is never passed to the visitor.
pub fn visit_mut<F>(tree: &mut Node, kind: NodeKind, visitor: F)
where
    F: FnMut(&mut Node, Location<'_>) -> Visit,
{
    visit_mut_where(tree, |node| node.kind() == kind, visitor);
}

/// Like [`visit_mut`], selecting nodes with a predicate.
pub fn visit_mut_where<P, F>(tree: &mut Node, test: P, mut visitor: F)
where
    P: Fn(&Node) -> bool,
    F: FnMut(&mut Node, Location<'_>) -> Visit,
{
    let mut path = Vec::new();
    if let Some(children) = tree.children_mut() {
        walk(children, &mut path, &test, &mut visitor);
    }
}

fn walk<P, F>(children: &mut [Node], path: &mut Vec<usize>, test: &P, visitor: &mut F)
where
    P: Fn(&Node) -> bool,
    F: FnMut(&mut Node, Location<'_>) -> Visit,
{
    for (index, node) in children.iter_mut().enumerate() {
        let action = if test(node) {
            visitor(
                node,
                Location {
                    parent: path.as_slice(),
                    index,
                },
            )
        } else {
            Visit::Continue
        };

        if action == Visit::Skip {
            continue;
        }

        if let Some(grandchildren) = node.children_mut() {
            path.push(index);
            walk(grandchildren, path, test, visitor);
            path.pop();
        }
    }
}
