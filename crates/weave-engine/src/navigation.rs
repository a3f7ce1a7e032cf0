//! # Character navigation
//!
//! Finds the position one rendered unit away from a cursor, the way
//! backspace and delete perceive the document: invisible characters, empty
//! wrappers and fake line breaks are skipped, non-editable subtrees count as
//! a single unit.

use crate::position::{Point, Side};
use crate::tree::Document;
use crate::visibility::{is_fake_line_break, is_visible, is_visible_char, Step, Walker};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VisiblePosition {
    pub point: Point,
    /// A block container edge was crossed on the way.
    pub block_switch: bool,
}

/// Position one visible unit before `point`, or `None` at the start of the
/// document.
pub fn previous_visible_position(doc: &Document, point: Point) -> Option<VisiblePosition> {
    visible_position(doc, point, Side::Left)
}

/// Position one visible unit after `point`, or `None` at the end of the
/// document.
pub fn next_visible_position(doc: &Document, point: Point) -> Option<VisiblePosition> {
    visible_position(doc, point, Side::Right)
}

fn visible_position(doc: &Document, point: Point, side: Side) -> Option<VisiblePosition> {
    let mut walker = Walker::new(doc, point, side);
    let mut block_switch = false;
    loop {
        let before = walker.point();
        let step = walker.next()?;
        let visible = match step {
            Step::Char { node, index, .. } => is_visible_char(doc, node, index),
            Step::Atom(node) if doc.is_line_break(node) => !is_fake_line_break(doc, node),
            Step::Atom(_) => true,
            Step::Enter(node) if doc.is_block(node) && !is_visible(doc, node) => {
                // An empty block is a unit of its own; stop inside it.
                return Some(VisiblePosition {
                    point: walker.point(),
                    block_switch: true,
                });
            }
            Step::Enter(node) | Step::Leave(node) => {
                if doc.is_block(node) {
                    block_switch = true;
                }
                false
            }
        };
        if visible {
            // Crossing a block edge already accounts for one unit.
            let point = if block_switch { before } else { walker.point() };
            return Some(VisiblePosition {
                point,
                block_switch,
            });
        }
    }
}
