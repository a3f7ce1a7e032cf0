//! # Range deletion
//!
//! Removes everything between two points, then reconciles the two half-trees
//! left behind:
//!
//! 1. text boundaries are split so both ends become child indices
//! 2. spanned nodes are removed; unremovable nodes survive and removable
//!    parents around them are unwrapped
//! 3. when every spanned node went away, the fragments are joined
//!    (empty-block precedence, block concatenation, block/inline splicing),
//!    unless an unmergeable node sits on either path
//! 4. the cursor resolves to the tracked start unless the join chose
//!    otherwise
//! 5. emptied inlines are removed or anchored, empty blocks are filled
//!
//! All of it happens on tracked points, so the reported cursor is exact.

use crate::position::{Point, Range, Side};
use crate::tree::{Document, NodeId, TrackId};
use crate::visibility::{
    has_rendered_content, is_fake_line_break, is_visible_char, Step, Walker, NBSP,
};

use super::fill::{fill_and_clean, scopes_for};
use super::EditContext;

/// Outcome of a range deletion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deletion {
    pub cursor: Point,
    /// Every spanned node disappeared.
    pub all_removed: bool,
    /// At least one spanned node disappeared.
    pub any_removed: bool,
    /// The two fragments were joined.
    pub joined: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Join {
    Refused,
    /// Joined; the cursor moves to the given point instead of the tracked
    /// start when set.
    Joined(Option<Point>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Removal {
    Full,
    Partial,
    Untouched,
}

/// A collapsible space next to the deletion, captured before it happens.
struct SpaceGuard {
    track: TrackId,
    /// The space sits right before the tracked offset rather than after it.
    before_offset: bool,
}

/// Deletes the content of `range` and returns where the cursor belongs.
pub fn delete_range(ctx: &mut EditContext<'_>, range: Range) -> Deletion {
    if range.collapsed() {
        return Deletion {
            cursor: range.start,
            all_removed: false,
            any_removed: false,
            joined: false,
        };
    }
    log::debug!("delete_range {:?}..{:?}", range.start, range.end);

    let guards = capture_spaces(ctx.doc, range);
    let start = ctx.doc.track(range.start);
    let end = ctx.doc.track(range.end);

    align(ctx.doc, end);
    align(ctx.doc, start);

    let s = ctx.doc.tracked(start);
    let e = ctx.doc.tracked(end);
    let ca = ctx
        .doc
        .common_ancestor(s.node, e.node)
        .unwrap_or(ctx.doc.root());

    let spanned = collect_spanned(ctx.doc, s, e, ca);
    log::trace!("spanned nodes under {ca:?}: {spanned:?}");
    let mut all_removed = true;
    let mut any_removed = false;
    let mut survivors = vec![ca];
    for node in spanned {
        match remove_respecting(ctx, node) {
            Removal::Full => any_removed = true,
            Removal::Partial => {
                any_removed = true;
                all_removed = false;
                survivors.push(node);
            }
            Removal::Untouched => {
                all_removed = false;
                survivors.push(node);
            }
        }
    }

    let mut hint = None;
    let mut joined = false;
    if all_removed && ctx.doc.is_attached(ca) {
        if let Join::Joined(cursor_hint) = join(ctx, start, end, ca) {
            joined = true;
            hint = cursor_hint;
        }
    }

    let resolved = hint.unwrap_or_else(|| ctx.doc.tracked(start));
    let cursor = ctx.doc.track(resolved);

    restore_spaces(ctx.doc, guards);

    let cursor_node = ctx.doc.tracked(cursor).node;
    let end_node = ctx.doc.tracked(end).node;
    let scopes = scopes_for(ctx.doc, &[cursor_node, end_node], &survivors);
    fill_and_clean(ctx, cursor, &scopes);

    ctx.doc.untrack(start);
    ctx.doc.untrack(end);
    let cursor = ctx.doc.untrack(cursor);
    Deletion {
        cursor,
        all_removed,
        any_removed,
        joined,
    }
}

// ============ Step 1: boundary alignment ============

/// Turns a tracked text point into an element point, splitting the text
/// node when the point is strictly inside it.
fn align(doc: &mut Document, id: TrackId) {
    let point = doc.tracked(id);
    if !doc.is_text(point.node) {
        return;
    }
    let aligned = if point.offset == 0 {
        doc.point_before(point.node)
    } else if point.offset >= doc.node_len(point.node) {
        doc.point_after(point.node)
    } else if doc.split_text(point.node, point.offset).is_ok() {
        doc.point_after(point.node)
    } else {
        None
    };
    if let Some(aligned) = aligned {
        doc.set_tracked(id, aligned);
    }
}

// ============ Step 2: removal ============

/// Top-level nodes fully between two element points with common ancestor
/// `ca`, left side first.
fn collect_spanned(doc: &Document, s: Point, e: Point, ca: NodeId) -> Vec<NodeId> {
    let mut spanned = Vec::new();

    let left_index = if s.node == ca {
        s.offset
    } else {
        spanned.extend_from_slice(&doc.children(s.node)[s.offset.min(doc.node_len(s.node))..]);
        let mut current = s.node;
        loop {
            let Some(parent) = doc.parent(current) else {
                break 0;
            };
            let index = doc.index_of(current).unwrap_or_default();
            if parent == ca {
                break index + 1;
            }
            spanned.extend_from_slice(&doc.children(parent)[index + 1..]);
            current = parent;
        }
    };

    let mut right: Vec<NodeId> = Vec::new();
    let right_index = if e.node == ca {
        e.offset
    } else {
        right.extend(
            doc.children(e.node)[..e.offset.min(doc.node_len(e.node))]
                .iter()
                .rev()
                .copied(),
        );
        let mut current = e.node;
        loop {
            let Some(parent) = doc.parent(current) else {
                break 0;
            };
            let index = doc.index_of(current).unwrap_or_default();
            if parent == ca {
                break index;
            }
            right.extend(doc.children(parent)[..index].iter().rev().copied());
            current = parent;
        }
    };

    if left_index < right_index {
        spanned.extend_from_slice(&doc.children(ca)[left_index..right_index]);
    }
    right.reverse();
    spanned.extend(right);
    spanned
}

/// Removes `node` unless it (or something below it) is unremovable, in
/// which case only the removable parts go and removable wrappers around
/// survivors are unwrapped.
fn remove_respecting(ctx: &mut EditContext<'_>, node: NodeId) -> Removal {
    let root = Some(ctx.doc.root());
    if ctx.policy.is_unremovable(ctx.doc, node, root) {
        let mut touched = false;
        for child in ctx.doc.children(node).to_vec() {
            if remove_respecting(ctx, child) != Removal::Untouched {
                touched = true;
            }
        }
        return if touched {
            Removal::Partial
        } else {
            Removal::Untouched
        };
    }
    if !ctx.policy.has_unremovable(ctx.doc, node, root) {
        ctx.doc.remove(node);
        return Removal::Full;
    }
    for child in ctx.doc.children(node).to_vec() {
        remove_respecting(ctx, child);
    }
    if ctx.doc.unwrap(node).is_err() {
        log::debug!("cannot unwrap detached {node:?}");
    }
    Removal::Partial
}

// ============ Step 3: joining ============

/// One side of the deletion point: the closest block below the common
/// ancestor (if any) and every node between that side and the ancestor.
struct Fragment {
    block: Option<NodeId>,
    path: Vec<NodeId>,
}

fn side_of(doc: &Document, point: Point, ca: NodeId, side: Side) -> Fragment {
    let mut path = Vec::new();
    if point.node == ca {
        let neighbour = match side {
            Side::Left => point.offset.checked_sub(1).and_then(|i| doc.child(ca, i)),
            Side::Right => doc.child(ca, point.offset),
        };
        let mut block = None;
        let mut current = neighbour;
        while let Some(node) = current.filter(|&n| doc.is_element(n) && doc.is_block(n)) {
            path.push(node);
            block = Some(node);
            current = match side {
                Side::Left => doc.last_child(node),
                Side::Right => doc.first_child(node),
            };
        }
        return Fragment { block, path };
    }
    path.extend(doc.ancestors_or_self(point.node).take_while(|&n| n != ca));
    let block = path
        .iter()
        .copied()
        .find(|&n| doc.is_element(n) && doc.is_block(n));
    Fragment { block, path }
}

/// Joins the fragments around the deletion point.
fn join(
    ctx: &mut EditContext<'_>,
    start: TrackId,
    end: TrackId,
    ca: NodeId,
) -> Join {
    let s = ctx.doc.tracked(start);
    let e = ctx.doc.tracked(end);
    let left = side_of(ctx.doc, s, ca, Side::Left);
    let right = side_of(ctx.doc, e, ca, Side::Right);

    let blocked = left
        .path
        .iter()
        .chain(&right.path)
        .find(|&&n| ctx.policy.is_unmergeable(ctx.doc, n));
    if let Some(node) = blocked {
        log::debug!("merge refused: {node:?} is unmergeable");
        return Join::Refused;
    }

    match (left.block, right.block) {
        (Some(l), Some(r)) if l != r => join_blocks(ctx, l, r, end, ca),
        (Some(l), None) => {
            splice_inline_into_block(ctx, l, e, ca);
            Join::Joined(None)
        }
        (None, Some(r)) => splice_block_into_inline(ctx, r, s, ca),
        _ => Join::Joined(None),
    }
}

fn removable(ctx: &EditContext<'_>, node: NodeId) -> bool {
    !ctx.policy.is_unremovable(ctx.doc, node, Some(ctx.doc.root()))
}

fn join_blocks(
    ctx: &mut EditContext<'_>,
    l: NodeId,
    r: NodeId,
    end: TrackId,
    ca: NodeId,
) -> Join {
    let left_empty = !has_rendered_content(ctx.doc, l);
    let right_empty = !has_rendered_content(ctx.doc, r);

    if right_empty {
        if !removable(ctx, r) {
            log::debug!("merge refused: empty right block {r:?} is unremovable");
            return Join::Refused;
        }
        remove_with_empty_ancestors(ctx, r, ca);
        return Join::Joined(None);
    }
    if left_empty {
        if !removable(ctx, l) {
            log::debug!("merge refused: empty left block {l:?} is unremovable");
            return Join::Refused;
        }
        remove_with_empty_ancestors(ctx, l, ca);
        return Join::Joined(Some(ctx.doc.tracked(end)));
    }
    if !removable(ctx, r) {
        log::debug!("merge refused: right block {r:?} is unremovable");
        return Join::Refused;
    }
    remove_trailing_fake_break(ctx.doc, l);
    let at = ctx.doc.node_len(l);
    ctx.doc.move_children(r, l, at);
    remove_with_empty_ancestors(ctx, r, ca);
    Join::Joined(None)
}

/// Moves the inline run starting at `e` (up to the next block or line
/// break, which is dropped) to the end of block `l`.
fn splice_inline_into_block(ctx: &mut EditContext<'_>, l: NodeId, e: Point, ca: NodeId) {
    let first = if e.node == ca {
        e.offset
    } else {
        match doc_top_index(ctx.doc, e.node, ca) {
            Some(index) => index,
            None => return,
        }
    };
    let mut run = Vec::new();
    let mut terminator = None;
    for &node in &ctx.doc.children(ca)[first.min(ctx.doc.node_len(ca))..] {
        if ctx.doc.is_element(node) && ctx.doc.is_block(node) {
            break;
        }
        if ctx.doc.is_line_break(node) {
            terminator = Some(node);
            break;
        }
        run.push(node);
    }
    if run.is_empty() {
        return;
    }
    remove_trailing_fake_break(ctx.doc, l);
    for node in run {
        let at = ctx.doc.node_len(l);
        ctx.doc.move_node(node, l, at);
    }
    if let Some(br) = terminator.filter(|&br| removable(ctx, br)) {
        ctx.doc.remove(br);
    }
}

/// Moves the content of block `r` up into `ca` right after the inline
/// content ending at `s`.
fn splice_block_into_inline(
    ctx: &mut EditContext<'_>,
    r: NodeId,
    s: Point,
    ca: NodeId,
) -> Join {
    if !removable(ctx, r) {
        log::debug!("merge refused: right block {r:?} is unremovable");
        return Join::Refused;
    }
    let at = if s.node == ca {
        s.offset
    } else {
        match doc_top_index(ctx.doc, s.node, ca) {
            Some(index) => index + 1,
            None => return Join::Refused,
        }
    };
    remove_trailing_fake_break(ctx.doc, r);
    let needs_break = ctx.doc.parent(r) == Some(ca)
        && ctx
            .doc
            .next_sibling(r)
            .is_some_and(|n| !(ctx.doc.is_element(n) && ctx.doc.is_block(n)));
    let moved = ctx.doc.move_children(r, ca, at);
    if needs_break && moved > 0 {
        let br = ctx.doc.create_element("br");
        ctx.doc.insert_child(ca, at + moved, br);
    }
    remove_with_empty_ancestors(ctx, r, ca);
    Join::Joined(None)
}

/// Index in `ca` of the child containing `node`.
fn doc_top_index(doc: &Document, node: NodeId, ca: NodeId) -> Option<usize> {
    let top = doc
        .ancestors_or_self(node)
        .find(|&n| doc.parent(n) == Some(ca))?;
    doc.index_of(top)
}

fn remove_trailing_fake_break(doc: &mut Document, block: NodeId) {
    if let Some(last) = doc.last_child(block).filter(|&n| is_fake_line_break(doc, n)) {
        doc.remove(last);
    }
}

/// Removes `node`, then every ancestor left without children, stopping
/// below `ca` and at unremovable nodes.
fn remove_with_empty_ancestors(ctx: &mut EditContext<'_>, node: NodeId, ca: NodeId) {
    let mut parent = ctx.doc.parent(node);
    ctx.doc.remove(node);
    while let Some(current) = parent {
        if current == ca || !ctx.doc.children(current).is_empty() || !removable(ctx, current) {
            break;
        }
        parent = ctx.doc.parent(current);
        ctx.doc.remove(current);
    }
}

// ============ Whitespace restoration ============

/// The character right next to `point` on `side`, looking only through
/// inline element edges.
fn adjacent_char(doc: &Document, point: Point, side: Side) -> Option<(NodeId, usize)> {
    for step in Walker::new(doc, point, side) {
        match step {
            Step::Char { node, index, .. } => return Some((node, index)),
            Step::Enter(n) | Step::Leave(n) if !doc.is_block(n) => continue,
            _ => return None,
        }
    }
    None
}

fn capture_spaces(doc: &mut Document, range: Range) -> Vec<SpaceGuard> {
    let mut guards = Vec::new();
    let candidates = [
        adjacent_char(doc, range.start, Side::Left).map(|c| (c, false)),
        adjacent_char(doc, range.end, Side::Right).map(|c| (c, true)),
    ];
    for ((node, index), before_offset) in candidates.into_iter().flatten() {
        if doc.char_at(node, index) != Some(' ') || !is_visible_char(doc, node, index) {
            continue;
        }
        let offset = if before_offset { index + 1 } else { index };
        guards.push(SpaceGuard {
            track: doc.track(Point::new(node, offset)),
            before_offset,
        });
    }
    guards
}

/// Spaces that were visible before the deletion and no longer are become
/// non-breaking spaces.
fn restore_spaces(doc: &mut Document, guards: Vec<SpaceGuard>) {
    for guard in guards {
        let point = doc.untrack(guard.track);
        let index = if guard.before_offset {
            match point.offset.checked_sub(1) {
                Some(index) => index,
                None => continue,
            }
        } else {
            point.offset
        };
        if doc.is_text(point.node)
            && doc.char_at(point.node, index) == Some(' ')
            && !is_visible_char(doc, point.node, index)
        {
            log::trace!("restoring space at {:?}@{index}", point.node);
            doc.replace_char(point.node, index, NBSP);
        }
    }
}
