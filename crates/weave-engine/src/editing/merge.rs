//! Normalization pass run after every command: adjacent text nodes are
//! joined, empty text nodes dropped and adjacent equivalent inline elements
//! merged, so repeated edits do not pile up redundant wrappers.

use crate::tree::NodeId;

use super::EditContext;

/// Same tag and attributes, both plain editable inline elements that
/// policy allows to merge.
fn equivalent(ctx: &EditContext<'_>, a: NodeId, b: NodeId) -> bool {
    let doc = &*ctx.doc;
    let mergeable = |n: NodeId| {
        doc.is_element(n)
            && !doc.is_block(n)
            && !doc.is_void(n)
            && !doc.is_atomic(n)
            && doc.is_editable(n)
            && !ctx.policy.is_unremovable(doc, n, Some(doc.root()))
    };
    mergeable(a) && mergeable(b) && doc.tag(a) == doc.tag(b) && doc.attrs(a) == doc.attrs(b)
}

/// Merges adjacent equivalent siblings everywhere below `node`.
pub(crate) fn merge_adjacent(ctx: &mut EditContext<'_>, node: NodeId) {
    let mut index = 0;
    while let Some(current) = ctx.doc.child(node, index) {
        if ctx.doc.text(current) == Some("") {
            ctx.doc.remove(current);
            continue;
        }
        if let Some(next) = ctx.doc.child(node, index + 1) {
            if ctx.doc.is_text(current) && ctx.doc.is_text(next) {
                if ctx.doc.merge_text(current, next).is_ok() {
                    continue;
                }
            } else if equivalent(ctx, current, next) {
                log::trace!("merging equivalent siblings {current:?} and {next:?}");
                let at = ctx.doc.node_len(current);
                ctx.doc.move_children(next, current, at);
                ctx.doc.remove(next);
                continue;
            }
        }
        index += 1;
    }

    for child in ctx.doc.children(node).to_vec() {
        if ctx.doc.is_element(child) && !ctx.doc.is_atomic(child) {
            merge_adjacent(ctx, child);
        }
    }
}
