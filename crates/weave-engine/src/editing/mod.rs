/*!
 * # Editing
 *
 * Every edit goes through [`Editor::apply`] with a [`Cmd`]:
 *
 * - **Deletion** ([`delete`]): a range is removed and the two fragments left
 *   behind are joined where policy allows. Backspace and forward delete
 *   reduce to a one-unit range found by character navigation.
 * - **Splitting** ([`split`]): Enter splits the closest block at the cursor,
 *   or inserts a line break in blocks that must not be split.
 * - **Formatting** ([`format`]): inline formats are toggled per selected
 *   text node by splitting, stripping and wrapping inline ancestors.
 *
 * Commands mutate the [`Document`] in place. Positions that must survive a
 * mutation are tracked by the document, so the selection in the returned
 * [`Patch`] is exact. After each command adjacent text nodes and equivalent
 * inline siblings are merged.
 *
 * Feature plugins adjust the behaviour through the [`Policy`] predicates
 * and the [`Hooks`] consulted before Backspace, Delete and Enter.
 *
 * ```rust
 * use weave_engine::editing::{Cmd, Editor, Format};
 *
 * let mut editor = Editor::from_markup("<p>a[bc]d</p>").unwrap();
 * let patch = editor.apply(Cmd::ToggleFormat(Format::Bold)).unwrap();
 * assert!(patch.changed);
 * assert_eq!(editor.render(), "<p>a[<b>bc]</b>d</p>");
 * ```
 */

pub mod commands;
pub mod delete;
pub mod fill;
pub mod format;
pub mod hooks;
pub mod merge;
pub mod patch;
pub mod split;

use std::sync::Arc;

use crate::error::{EditError, MarkupError};
use crate::markup;
use crate::navigation::{next_visible_position, previous_visible_position};
use crate::policy::Policy;
use crate::position::{normalize, NormalizeMode, Point, Range, Side};
use crate::schema::Schema;
use crate::selection::{self, Direction, Selection};
use crate::tree::{Document, NodeId};
use crate::visibility::{has_rendered_content, ZWS};

pub use commands::Cmd;
pub use delete::{delete_range, Deletion};
pub use fill::ZWS_INLINE_ATTR;
pub use format::{is_format_applied, is_formatted, toggle_format, Format};
pub use hooks::{skip_non_editable_sibling, trap_in_unmergeable, Hook, HookPoint, Hooks};
pub use patch::Patch;
pub use split::{split_around, split_block, split_until};

/// What an engine operation works on: the document and the policy deciding
/// which nodes must stay.
pub struct EditContext<'a> {
    pub doc: &'a mut Document,
    pub policy: &'a Policy,
}

impl<'a> EditContext<'a> {
    pub fn new(doc: &'a mut Document, policy: &'a Policy) -> Self {
        Self { doc, policy }
    }
}

/// A document with its selection, policy and hooks.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    selection: Selection,
    policy: Policy,
    hooks: Hooks,
}

impl Editor {
    /// Editor with the cursor at the start of the document.
    pub fn new(doc: Document) -> Self {
        let start = Point::new(doc.root(), 0);
        let selection = Selection::collapsed_at(start);
        Self {
            doc,
            selection,
            policy: Policy::new(),
            hooks: Hooks::new(),
        }
    }

    pub fn with_selection(doc: Document, selection: Selection) -> Result<Self, EditError> {
        let mut editor = Self::new(doc);
        editor.set_selection(selection.anchor, selection.focus)?;
        Ok(editor)
    }

    /// Editor over debug markup; `[` and `]` mark the selection.
    pub fn from_markup(input: &str) -> Result<Self, MarkupError> {
        Self::from_markup_with_schema(input, Arc::new(Schema::default()))
    }

    pub fn from_markup_with_schema(input: &str, schema: Arc<Schema>) -> Result<Self, MarkupError> {
        let (doc, parsed) = markup::parse_with_selection_and_schema(input, schema)?;
        let selection = if parsed.is_collapsed() {
            let point = normalize(&doc, parsed.anchor, Side::Left, NormalizeMode::Shallow);
            Selection::collapsed_at(point)
        } else {
            let range = parsed.range();
            let start = normalize(&doc, range.start, Side::Left, NormalizeMode::Shallow);
            let end = normalize(&doc, range.end, Side::Right, NormalizeMode::Shallow);
            match parsed.direction() {
                Direction::Forward => Selection::new(&doc, start, end),
                Direction::Backward => Selection::new(&doc, end, start),
            }
        };
        let mut editor = Self::new(doc);
        editor.selection = selection;
        Ok(editor)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut Policy {
        &mut self.policy
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Debug markup of the document with the selection marked.
    pub fn render(&self) -> String {
        markup::render_with_selection(&self.doc, &self.selection)
    }

    /// Moves the selection, normalizing both ends in place.
    pub fn set_selection(&mut self, anchor: Point, focus: Point) -> Result<(), EditError> {
        self.set_selection_with(anchor, focus, NormalizeMode::Shallow)
    }

    pub fn set_selection_with(
        &mut self,
        anchor: Point,
        focus: Point,
        mode: NormalizeMode,
    ) -> Result<(), EditError> {
        self.selection = selection::resolve(&self.doc, anchor, focus, mode)?;
        self.clean_placeholders();
        Ok(())
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        selection::selected_nodes(&self.doc, &self.selection)
    }

    pub fn is_format_applied(&self, format: Format) -> bool {
        is_format_applied(&self.doc, &self.selection, format)
    }

    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        log::debug!("apply {cmd:?} at {:?}", self.selection);
        let before = self.doc.version();
        let selection = match cmd {
            Cmd::DeleteSelection => Selection::collapsed_at(self.delete_selection()),
            Cmd::DeleteBackward => Selection::collapsed_at(self.delete_char(Side::Left)),
            Cmd::DeleteForward => Selection::collapsed_at(self.delete_char(Side::Right)),
            Cmd::SplitBlock => Selection::collapsed_at(self.split_block()?),
            Cmd::ToggleFormat(format) => {
                let mut ctx = EditContext::new(&mut self.doc, &self.policy);
                toggle_format(&mut ctx, self.selection, format)?
            }
        };
        Ok(self.finish(before, selection))
    }

    fn delete_selection(&mut self) -> Point {
        let range = self.selection.range();
        let mut ctx = EditContext::new(&mut self.doc, &self.policy);
        delete_range(&mut ctx, range).cursor
    }

    fn delete_char(&mut self, side: Side) -> Point {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let cursor = self.selection.anchor;
        let hook_point = match side {
            Side::Left => HookPoint::DeleteBackward,
            Side::Right => HookPoint::DeleteForward,
        };
        let mut ctx = EditContext::new(&mut self.doc, &self.policy);
        if let Some(handled) = self.hooks.run(hook_point, &mut ctx, cursor) {
            return handled;
        }
        let step = match side {
            Side::Left => previous_visible_position(ctx.doc, cursor),
            Side::Right => next_visible_position(ctx.doc, cursor),
        };
        let Some(step) = step else {
            log::debug!("nothing to delete at the document edge");
            return cursor;
        };
        let range = Range::new(ctx.doc, cursor, step.point);
        delete_range(&mut ctx, range).cursor
    }

    fn split_block(&mut self) -> Result<Point, EditError> {
        let cursor = if self.selection.is_collapsed() {
            self.selection.anchor
        } else {
            self.delete_selection()
        };
        let mut ctx = EditContext::new(&mut self.doc, &self.policy);
        if let Some(handled) = self.hooks.run(HookPoint::SplitBlock, &mut ctx, cursor) {
            return Ok(handled);
        }
        split_block(&mut ctx, cursor)
    }

    fn finish(&mut self, before: u64, selection: Selection) -> Patch {
        let preserved = self.doc.preserve(&selection);
        let root = self.doc.root();
        merge::merge_adjacent(&mut EditContext::new(&mut self.doc, &self.policy), root);
        self.selection = self.doc.restore(preserved);
        Patch {
            changed: self.doc.version() != before,
            selection: self.selection,
            version: self.doc.version(),
        }
    }

    /// Drops zero-width placeholders the selection has left.
    fn clean_placeholders(&mut self) {
        let doc = &self.doc;
        let (anchor, focus) = (self.selection.anchor.node, self.selection.focus.node);
        let stale: Vec<NodeId> = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.has_attr(n, ZWS_INLINE_ATTR))
            .filter(|&n| !doc.contains(n, anchor) && !doc.contains(n, focus))
            .collect();
        if stale.is_empty() {
            return;
        }

        let preserved = self.doc.preserve(&self.selection);
        let cursor = self.doc.track(self.selection.focus);
        for node in stale {
            if !self.doc.is_attached(node) {
                continue;
            }
            log::trace!("cleaning stale placeholder {node:?}");
            for text in self.doc.descendants(node) {
                let positions: Vec<usize> = self
                    .doc
                    .text(text)
                    .into_iter()
                    .flat_map(|t| t.chars().enumerate())
                    .filter(|&(_, ch)| ch == ZWS)
                    .map(|(i, _)| i)
                    .collect();
                for &i in positions.iter().rev() {
                    self.doc.delete_text(text, i, i + 1);
                }
            }
            self.doc.remove_attr(node, ZWS_INLINE_ATTR);
            if !has_rendered_content(&self.doc, node)
                && !self.doc.descendants(node).iter().any(|&n| self.doc.is_line_break(n))
            {
                let block = self.doc.closest_block(node);
                self.doc.remove(node);
                let mut ctx = EditContext::new(&mut self.doc, &self.policy);
                fill::fill_and_clean(&mut ctx, cursor, &[block]);
            }
        }
        self.doc.untrack(cursor);
        self.selection = self.doc.restore(preserved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::invariants;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run(input: &str, cmds: &[Cmd]) -> String {
        let mut editor = Editor::from_markup(input).unwrap();
        for &cmd in cmds {
            editor.apply(cmd).unwrap();
            invariants::check(editor.document());
        }
        editor.render()
    }

    #[rstest]
    #[case("<p>ab[]cd</p>", Cmd::DeleteForward, "<p>ab[]d</p>")]
    #[case("<p>ab[]cd</p>", Cmd::DeleteBackward, "<p>a[]cd</p>")]
    #[case("<p>[]ab</p>", Cmd::DeleteBackward, "<p>[]ab</p>")]
    #[case("<p>ab</p><p>[]cd</p>", Cmd::DeleteBackward, "<p>ab[]cd</p>")]
    #[case("<p>ab[]</p><p>cd</p>", Cmd::DeleteForward, "<p>ab[]cd</p>")]
    #[case("<p>a[b]c</p>", Cmd::DeleteSelection, "<p>a[]c</p>")]
    #[case("<p>ab[]cd</p>", Cmd::DeleteSelection, "<p>ab[]cd</p>")]
    #[case("<p>ab[]cd</p>", Cmd::SplitBlock, "<p>ab</p><p>[]cd</p>")]
    #[case("<p>a[b]c</p>", Cmd::SplitBlock, "<p>a</p><p>[]c</p>")]
    fn test_single_commands(#[case] input: &str, #[case] cmd: Cmd, #[case] expected: &str) {
        assert_eq!(run(input, &[cmd]), expected);
    }

    #[test]
    fn test_noop_is_reported_unchanged() {
        let mut editor = Editor::from_markup("<p>[]ab</p>").unwrap();
        let version = editor.document().version();
        let patch = editor.apply(Cmd::DeleteBackward).unwrap();
        assert!(!patch.changed);
        assert_eq!(patch.version, version);
    }

    #[test]
    fn test_backspace_after_enter_restores_paragraph() {
        assert_eq!(
            run("<p>ab[]cd</p>", &[Cmd::SplitBlock, Cmd::DeleteBackward]),
            "<p>ab[]cd</p>"
        );
    }

    #[test]
    fn test_hook_overrides_split() {
        let mut editor = Editor::from_markup("<p>ab[]</p>").unwrap();
        editor.hooks_mut().add(HookPoint::SplitBlock, |_, at| Some(at));
        let patch = editor.apply(Cmd::SplitBlock).unwrap();
        assert!(!patch.changed);
        assert_eq!(editor.render(), "<p>ab[]</p>");
    }

    #[test]
    fn test_policy_predicate_blocks_merge() {
        let mut editor = Editor::from_markup("<p>ab</p><pre>[]cd</pre>").unwrap();
        editor
            .policy_mut()
            .add_unmergeable(|doc, node| doc.has_tag(node, "pre"));
        let patch = editor.apply(Cmd::DeleteBackward).unwrap();
        assert!(!patch.changed);
        assert_eq!(editor.render(), "<p>ab[]</p><pre>cd</pre>");
    }

    #[test]
    fn test_set_selection_rejects_foreign_points() {
        let mut editor = Editor::from_markup("<p>ab</p>").unwrap();
        let root = editor.document().root();
        assert!(matches!(
            editor.set_selection(Point::new(root, 9), Point::new(root, 0)),
            Err(EditError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_moving_away_drops_format_placeholder() {
        let mut editor = Editor::from_markup("<p>ab[]</p>").unwrap();
        editor.apply(Cmd::ToggleFormat(Format::Bold)).unwrap();
        assert!(editor.render().contains(ZWS));
        assert!(editor.is_format_applied(Format::Bold));

        let root = editor.document().root();
        editor
            .set_selection(Point::new(root, 0), Point::new(root, 0))
            .unwrap();
        assert_eq!(editor.render(), "[]<p>ab</p>");
    }
}
