//! Override hooks consulted before the default handling of a command.
//!
//! Each hook list is tried in registration order; the first hook returning
//! `Some(cursor)` has handled the command and the default algorithm is
//! skipped.

use crate::navigation::{next_visible_position, previous_visible_position};
use crate::position::{Point, Side};
use crate::tree::{Document, NodeId};
use crate::visibility::{has_rendered_content, is_visible_char, Step, Walker};

use super::fill::{fill_and_clean, scopes_for};
use super::EditContext;

pub type Hook = Box<dyn Fn(&mut EditContext<'_>, Point) -> Option<Point>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HookPoint {
    DeleteBackward,
    DeleteForward,
    SplitBlock,
}

#[derive(Default)]
pub struct Hooks {
    before_delete_backward: Vec<Hook>,
    before_delete_forward: Vec<Hook>,
    before_split_block: Vec<Hook>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_delete_backward", &self.before_delete_backward.len())
            .field("before_delete_forward", &self.before_delete_forward.len())
            .field("before_split_block", &self.before_split_block.len())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, at: HookPoint) -> &[Hook] {
        match at {
            HookPoint::DeleteBackward => &self.before_delete_backward,
            HookPoint::DeleteForward => &self.before_delete_forward,
            HookPoint::SplitBlock => &self.before_split_block,
        }
    }

    pub fn add(
        &mut self,
        at: HookPoint,
        hook: impl Fn(&mut EditContext<'_>, Point) -> Option<Point> + 'static,
    ) {
        let list = match at {
            HookPoint::DeleteBackward => &mut self.before_delete_backward,
            HookPoint::DeleteForward => &mut self.before_delete_forward,
            HookPoint::SplitBlock => &mut self.before_split_block,
        };
        list.push(boxed(hook));
    }

    pub fn len(&self, at: HookPoint) -> usize {
        self.list(at).len()
    }

    pub fn is_empty(&self) -> bool {
        self.before_delete_backward.is_empty()
            && self.before_delete_forward.is_empty()
            && self.before_split_block.is_empty()
    }

    /// Runs the hooks registered for `at`; the first `Some` wins.
    pub(crate) fn run(
        &self,
        at: HookPoint,
        ctx: &mut EditContext<'_>,
        cursor: Point,
    ) -> Option<Point> {
        self.list(at).iter().find_map(|hook| hook(ctx, cursor))
    }
}

fn boxed(hook: impl Fn(&mut EditContext<'_>, Point) -> Option<Point> + 'static) -> Hook {
    Box::new(hook)
}

fn closest_unmergeable(ctx: &EditContext<'_>, node: NodeId) -> Option<NodeId> {
    let root = ctx.doc.root();
    ctx.doc
        .ancestors_or_self(node)
        .take_while(|&n| n != root)
        .find(|&n| ctx.policy.is_unmergeable(ctx.doc, n))
}

/// Keeps single-step deletion inside an unmergeable element: the cursor
/// cannot leave it, and the element itself goes away once it is empty.
pub fn trap_in_unmergeable(side: Side) -> Hook {
    boxed(move |ctx, cursor| {
        let trap = closest_unmergeable(ctx, cursor.node)?;
        if !has_rendered_content(ctx.doc, trap) {
            log::debug!("removing emptied unmergeable {trap:?}");
            let parent = ctx.doc.parent(trap)?;
            let at = ctx.doc.point_before(trap)?;
            let tracked = ctx.doc.track(at);
            ctx.doc.remove(trap);
            let scopes = scopes_for(ctx.doc, &[parent], &[]);
            fill_and_clean(ctx, tracked, &scopes);
            return Some(ctx.doc.untrack(tracked));
        }
        let step = match side {
            Side::Left => previous_visible_position(ctx.doc, cursor),
            Side::Right => next_visible_position(ctx.doc, cursor),
        };
        let escapes =
            step.is_none_or(|s| s.block_switch || !ctx.doc.contains(trap, s.point.node));
        escapes.then_some(cursor)
    })
}

/// Non-editable node right next to `point` on `side`, looking through
/// inline edges and invisible characters.
fn adjacent_opaque(doc: &Document, point: Point, side: Side) -> Option<NodeId> {
    for step in Walker::new(doc, point, side) {
        match step {
            Step::Char { node, index, .. } if !is_visible_char(doc, node, index) => continue,
            Step::Enter(n) | Step::Leave(n) if !doc.is_block(n) => continue,
            Step::Atom(n) if !doc.is_void(n) && !doc.is_editable(n) => return Some(n),
            _ => return None,
        }
    }
    None
}

/// Deletes a non-editable sibling as a whole while the cursor stays where
/// it is, instead of walking over it.
pub fn skip_non_editable_sibling(side: Side) -> Hook {
    boxed(move |ctx, cursor| {
        let opaque = adjacent_opaque(ctx.doc, cursor, side)?;
        log::debug!("deleting non-editable sibling {opaque:?}");
        let tracked = ctx.doc.track(cursor);
        ctx.doc.remove(opaque);
        let at = ctx.doc.tracked(tracked).node;
        let scopes = scopes_for(ctx.doc, &[at], &[]);
        fill_and_clean(ctx, tracked, &scopes);
        Some(ctx.doc.untrack(tracked))
    })
}
