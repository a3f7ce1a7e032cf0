//! # Split engine
//!
//! [`split_until`] splits an element and its ancestors up to a limit at one
//! position; [`split_around`] isolates a run of siblings under a clone of
//! the limit. [`split_block`] is the Enter command built on top of them.

use crate::error::EditError;
use crate::position::{normalize, NormalizeMode, Point, Side};
use crate::tree::{Document, NodeId};
use crate::visibility::is_fake_line_break;

use super::fill::{fill_and_clean, scopes_for};
use super::EditContext;

/// Splits `element` at `offset` and keeps splitting each parent at the
/// boundary until `limit` itself has been split. Returns the two halves of
/// `limit`.
pub fn split_until(
    doc: &mut Document,
    element: NodeId,
    offset: usize,
    limit: NodeId,
) -> Result<(NodeId, NodeId), EditError> {
    if !doc.contains(limit, element) {
        return Err(EditError::OutsideLimit {
            node: element,
            limit,
        });
    }
    let mut current = element;
    let mut offset = offset;
    loop {
        let (left, right) = doc.split_element(current, offset)?;
        if current == limit {
            return Ok((left, right));
        }
        current = doc.parent(right).ok_or(EditError::NoParent(right))?;
        offset = doc.index_of(right).ok_or(EditError::NoParent(right))?;
    }
}

/// Splits after `node` at every level below `limit`. Returns the (possibly
/// new) node standing for `limit`.
fn split_after(doc: &mut Document, node: NodeId, limit: NodeId) -> Result<NodeId, EditError> {
    let mut current = node;
    let mut limit = limit;
    while current != limit {
        let parent = doc.parent(current).ok_or(EditError::NoParent(current))?;
        let index = doc.index_of(current).ok_or(EditError::NoParent(current))? + 1;
        current = if index < doc.node_len(parent) {
            let (left, _) = doc.split_element(parent, index)?;
            if parent == limit {
                limit = left;
            }
            left
        } else {
            parent
        };
    }
    Ok(limit)
}

fn split_before(doc: &mut Document, node: NodeId, limit: NodeId) -> Result<NodeId, EditError> {
    let mut current = node;
    let mut limit = limit;
    while current != limit {
        let parent = doc.parent(current).ok_or(EditError::NoParent(current))?;
        let index = doc.index_of(current).ok_or(EditError::NoParent(current))?;
        current = if index > 0 {
            let (_, right) = doc.split_element(parent, index)?;
            if parent == limit {
                limit = right;
            }
            right
        } else {
            parent
        };
    }
    Ok(limit)
}

/// Splits everything before and after the contiguous sibling run `nodes`
/// up to `limit`, so the run is the only content left under the returned
/// clone of `limit`.
pub fn split_around(
    doc: &mut Document,
    nodes: &[NodeId],
    limit: NodeId,
) -> Result<NodeId, EditError> {
    let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
        return Ok(limit);
    };
    if !doc.contains(limit, first) {
        return Err(EditError::OutsideLimit { node: first, limit });
    }
    let limit = split_after(doc, last, limit)?;
    split_before(doc, first, limit)
}

/// Element point equivalent to `point`, splitting a text node when the
/// point is strictly inside it.
pub(crate) fn element_point(doc: &mut Document, point: Point) -> Result<Point, EditError> {
    if !doc.is_text(point.node) {
        return Ok(point);
    }
    let node = point.node;
    let at = if point.offset == 0 {
        doc.point_before(node)
    } else if point.offset >= doc.node_len(node) {
        doc.point_after(node)
    } else {
        doc.split_text(node, point.offset)?;
        doc.point_after(node)
    };
    at.ok_or(EditError::NoParent(node))
}

/// Enter at a collapsed `cursor`: the closest block is split in two, or a
/// line break is inserted when the block cannot be split. Returns the new
/// cursor.
pub fn split_block(ctx: &mut EditContext<'_>, cursor: Point) -> Result<Point, EditError> {
    let at = element_point(ctx.doc, cursor)?;
    let block = ctx.doc.closest_block(at.node);

    if ctx.policy.is_unsplittable(ctx.doc, block) || !ctx.doc.is_editable(block) {
        log::debug!("split_block: {block:?} is unsplittable, inserting a line break");
        return insert_line_break(ctx.doc, at);
    }
    let protected = ctx
        .doc
        .ancestors_or_self(at.node)
        .take_while(|&n| n != block)
        .find(|&n| ctx.policy.is_unsplittable(ctx.doc, n));
    if let Some(inline) = protected {
        log::debug!("split_block: {inline:?} must survive, inserting a line break");
        return insert_line_break(ctx.doc, at);
    }

    log::debug!("split_block: splitting {block:?} at {at:?}");
    let (left, right) = split_until(ctx.doc, at.node, at.offset, block)?;
    let target = normalize(
        ctx.doc,
        Point::new(right, 0),
        Side::Right,
        NormalizeMode::Deep,
    );
    let cursor = ctx.doc.track(target);
    let scopes = scopes_for(ctx.doc, &[left, right], &[]);
    fill_and_clean(ctx, cursor, &scopes);
    Ok(ctx.doc.untrack(cursor))
}

/// Inserts a `<br>` at `at` (a second one when the first would not render)
/// and returns the point right after the first.
fn insert_line_break(doc: &mut Document, at: Point) -> Result<Point, EditError> {
    let br = doc.create_element("br");
    doc.insert_child(at.node, at.offset, br);
    if is_fake_line_break(doc, br) {
        let filler = doc.create_element("br");
        doc.insert_after(br, filler)?;
    }
    doc.point_after(br).ok_or(EditError::NoParent(br))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;
    use crate::policy::Policy;
    use crate::selection::Selection;
    use crate::tree::invariants;
    use pretty_assertions::assert_eq;

    fn find(doc: &Document, tag: &str) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&n| doc.has_tag(n, tag))
            .unwrap()
    }

    fn enter(input: &str) -> String {
        let (mut doc, selection) = markup::parse_with_selection(input).unwrap();
        let policy = Policy::new();
        let cursor = split_block(&mut EditContext::new(&mut doc, &policy), selection.anchor).unwrap();
        invariants::check(&doc);
        markup::render_with_selection(&doc, &Selection::collapsed_at(cursor))
    }

    #[test]
    fn test_split_until_splits_ancestor_chain() {
        let mut doc = markup::parse("<p>a<b>bc</b>d</p>").unwrap();
        let b = find(&doc, "b");
        let p = find(&doc, "p");
        let text = doc.first_child(b).unwrap();
        doc.split_text(text, 1).unwrap();

        let (left, right) = split_until(&mut doc, b, 1, p).unwrap();

        assert_eq!(doc.children(doc.root()), &[left, right]);
        assert_eq!(markup::render(&doc), "<p>a<b>b</b></p><p><b>c</b>d</p>");
        invariants::check(&doc);
    }

    #[test]
    fn test_split_until_rejects_foreign_limit() {
        let mut doc = markup::parse("<p><b>x</b></p><p>y</p>").unwrap();
        let b = find(&doc, "b");
        let other = doc.last_child(doc.root()).unwrap();
        assert!(matches!(
            split_until(&mut doc, b, 0, other),
            Err(EditError::OutsideLimit { .. })
        ));
    }

    #[test]
    fn test_split_around_isolates_run() {
        let mut doc = markup::parse("<p><b><i>a</i>xy<i>c</i></b></p>").unwrap();
        let b = find(&doc, "b");
        let run = doc.child(b, 1).unwrap();

        let isolated = split_around(&mut doc, &[run], b).unwrap();

        assert_eq!(doc.children(isolated), &[run]);
        assert_eq!(
            markup::render(&doc),
            "<p><b><i>a</i></b><b>xy</b><b><i>c</i></b></p>"
        );
    }

    #[test]
    fn test_split_around_at_edges_keeps_limit() {
        let mut doc = markup::parse("<p><b>xy</b></p>").unwrap();
        let b = find(&doc, "b");
        let run = doc.first_child(b).unwrap();
        assert_eq!(split_around(&mut doc, &[run], b).unwrap(), b);
    }

    #[test]
    fn test_enter_in_middle_of_text() {
        assert_eq!(enter("<p>ab[]cd</p>"), "<p>ab</p><p>[]cd</p>");
    }

    #[test]
    fn test_enter_at_end_fills_new_block() {
        assert_eq!(enter("<h1>ab[]</h1>"), "<h1>ab</h1><h1>[]<br></h1>");
    }

    #[test]
    fn test_enter_at_start_of_inline_drops_empty_clone() {
        assert_eq!(enter("<p><b>[]ab</b></p>"), "<p><br></p><p><b>[]ab</b></p>");
    }

    #[test]
    fn test_enter_at_end_of_inline_keeps_format_anchor() {
        assert_eq!(
            enter("<p><b>ab[]</b></p>"),
            "<p><b>ab</b></p><p><b data-zws-inline=\"\">\u{200B}[]</b></p>"
        );
    }

    #[test]
    fn test_enter_inside_unremovable_inline_keeps_it() {
        let (mut doc, selection) =
            markup::parse_with_selection(r#"<p>a<span data-unremovable="">x[]y</span>d</p>"#)
                .unwrap();
        let span = find(&doc, "span");
        let policy = Policy::new();
        let cursor = split_block(&mut EditContext::new(&mut doc, &policy), selection.anchor).unwrap();
        invariants::check(&doc);
        invariants::assert_marked_nodes_survive(&doc, &[span]);
        assert_eq!(
            markup::render_with_selection(&doc, &Selection::collapsed_at(cursor)),
            r#"<p>a<span data-unremovable="">x<br>[]y</span>d</p>"#
        );
    }

    #[test]
    fn test_enter_in_unbreakable_block_inserts_line_break() {
        assert_eq!(
            enter(r#"<p data-unbreakable="">ab[]cd</p>"#),
            r#"<p data-unbreakable="">ab<br>[]cd</p>"#
        );
        assert_eq!(
            enter(r#"<p data-unbreakable="">ab[]</p>"#),
            r#"<p data-unbreakable="">ab<br>[]<br></p>"#
        );
    }
}
