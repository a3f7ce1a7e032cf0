//! Post-edit cleanup shared by deletion and splitting: emptied inline
//! wrappers are removed (or kept as a cursor anchor) and blocks left without
//! rendered content receive a placeholder line break.

use crate::position::Point;
use crate::tree::{Document, NodeId, TrackId};
use crate::visibility::{has_rendered_content, has_zws, ZWS};

use super::EditContext;

/// Marks an inline element kept alive by a zero-width placeholder.
pub const ZWS_INLINE_ATTR: &str = "data-zws-inline";

fn has_line_break(doc: &Document, node: NodeId) -> bool {
    doc.descendants(node).into_iter().any(|n| doc.is_line_break(n))
}

fn is_empty_inline(ctx: &EditContext<'_>, node: NodeId) -> bool {
    let doc = &*ctx.doc;
    doc.is_element(node)
        && !doc.is_block(node)
        && !doc.is_void(node)
        && !doc.is_atomic(node)
        && doc.is_editable(node)
        && !ctx.policy.is_unremovable(doc, node, Some(doc.root()))
        && !has_rendered_content(doc, node)
        && !has_line_break(doc, node)
        && !has_zws(doc, node)
}

/// Keeps the cursor's empty inline alive with a zero-width character the
/// cursor lands after.
pub(crate) fn anchor_cursor(doc: &mut Document, cursor: TrackId) {
    let point = doc.tracked(cursor);
    let container = if doc.is_text(point.node) {
        doc.insert_text(point.node, point.offset, &ZWS.to_string());
        doc.set_tracked(cursor, Point::new(point.node, point.offset + 1));
        doc.parent(point.node)
    } else {
        let zws = doc.create_text(&ZWS.to_string());
        doc.insert_child(point.node, point.offset, zws);
        doc.set_tracked(cursor, Point::new(zws, 1));
        Some(point.node)
    };
    if let Some(container) = container.filter(|&c| c != doc.root() && !doc.is_block(c)) {
        doc.set_attr(container, ZWS_INLINE_ATTR, "");
    }
}

/// Cleans empty inlines and fills empty leaf blocks inside `scopes`.
pub(crate) fn fill_and_clean(ctx: &mut EditContext<'_>, cursor: TrackId, scopes: &[NodeId]) {
    for &scope in scopes {
        if !ctx.doc.is_attached(scope) {
            continue;
        }
        let candidates = ctx.doc.descendants(scope);
        for &node in candidates.iter().rev() {
            if !ctx.doc.is_attached(node) || !is_empty_inline(ctx, node) {
                continue;
            }
            let at = ctx.doc.tracked(cursor);
            if ctx.doc.contains(node, at.node) {
                log::trace!("anchoring cursor inside empty inline {node:?}");
                anchor_cursor(ctx.doc, cursor);
            } else {
                log::trace!("removing empty inline {node:?}");
                ctx.doc.remove(node);
            }
        }
    }

    for &scope in scopes {
        let doc = &mut *ctx.doc;
        if !doc.is_attached(scope) || !doc.is_block(scope) || !doc.is_editable(scope) {
            continue;
        }
        let has_block_child = doc.children(scope).iter().any(|&c| doc.is_block(c));
        if has_block_child
            || has_rendered_content(doc, scope)
            || has_line_break(doc, scope)
            || has_zws(doc, scope)
        {
            continue;
        }
        log::trace!("filling empty block {scope:?}");
        let br = doc.create_element("br");
        doc.append_child(scope, br);
    }
}

/// Closest blocks around the given points plus `extra`, deduplicated.
pub(crate) fn scopes_for(doc: &Document, points: &[NodeId], extra: &[NodeId]) -> Vec<NodeId> {
    let mut scopes: Vec<NodeId> = Vec::new();
    for &node in points.iter().chain(extra) {
        if !doc.is_attached(node) {
            continue;
        }
        let block = doc.closest_block(node);
        if !scopes.contains(&block) {
            scopes.push(block);
        }
    }
    scopes
}
