//! Structural invariants of a [`Document`], asserted by tests after edits.

use std::collections::HashSet;

use super::{Document, NodeId};

/// Panics with a descriptive message when the tree is malformed:
/// broken parent links, cycles, children under text or void nodes, or a
/// tracked point outside the tree.
pub fn check(doc: &Document) {
    let root = doc.root();
    assert!(doc.exists(root), "root must exist");
    assert!(doc.parent(root).is_none(), "root must have no parent");

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        assert!(seen.insert(node), "node {node:?} reachable twice");
        if doc.is_text(node) || doc.is_void(node) {
            assert!(
                doc.children(node).is_empty(),
                "leaf node {node:?} ({:?}) has children",
                doc.tag(node)
            );
        }
        for &child in doc.children(node) {
            assert!(doc.exists(child), "child {child:?} of {node:?} is stale");
            assert_eq!(
                doc.parent(child),
                Some(node),
                "child {child:?} does not point back to {node:?}"
            );
            stack.push(child);
        }
    }

    for point in doc.tracked_points() {
        assert!(
            doc.is_valid_point(point),
            "tracked point {point:?} is outside the document"
        );
    }
}

/// Each node in `marked` is still attached to the tree.
pub fn assert_marked_nodes_survive(doc: &Document, marked: &[NodeId]) {
    for &node in marked {
        assert!(doc.is_attached(node), "protected node {node:?} was removed");
    }
}
