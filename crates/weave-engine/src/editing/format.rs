//! # Format toggle
//!
//! A format is on for a node when the nearest ancestor that says anything
//! about it says "on": an inline style property, a dedicated tag, or a block
//! that implies the format (headings are bold). Toggling flips every
//! selected text node to the opposite of the current common state.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::position::Point;
use crate::selection::Selection;
use crate::tree::{Document, NodeId};
use crate::visibility::{is_visible_char, ZWS};

use super::fill::ZWS_INLINE_ATTR;
use super::split::{element_point, split_around};
use super::EditContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
}

impl Format {
    pub const ALL: [Format; 4] = [
        Format::Bold,
        Format::Italic,
        Format::Underline,
        Format::StrikeThrough,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Format::Bold => "bold",
            Format::Italic => "italic",
            Format::Underline => "underline",
            Format::StrikeThrough => "strike-through",
        }
    }

    /// Tags that turn the format on by themselves.
    fn tags(self) -> &'static [&'static str] {
        match self {
            Format::Bold => &["b", "strong"],
            Format::Italic => &["i", "em"],
            Format::Underline => &["u"],
            Format::StrikeThrough => &["s", "strike", "del"],
        }
    }

    /// Blocks whose default rendering carries the format.
    fn implied_by(self) -> &'static [&'static str] {
        match self {
            Format::Bold => &["h1", "h2", "h3", "h4", "h5", "h6", "th"],
            _ => &[],
        }
    }

    /// Style properties consulted, most specific first.
    fn properties(self) -> &'static [&'static str] {
        match self {
            Format::Bold => &["font-weight"],
            Format::Italic => &["font-style"],
            Format::Underline | Format::StrikeThrough => {
                &["text-decoration-line", "text-decoration"]
            }
        }
    }

    fn on_value(self) -> &'static str {
        match self {
            Format::Bold => "bold",
            Format::Italic => "italic",
            Format::Underline => "underline",
            Format::StrikeThrough => "line-through",
        }
    }

    fn neutral_value(self) -> &'static str {
        match self {
            Format::Bold | Format::Italic => "normal",
            Format::Underline | Format::StrikeThrough => "none",
        }
    }

    /// What a style value says about the format, if anything.
    fn judge(self, value: &str) -> Option<bool> {
        let value = value.trim().to_ascii_lowercase();
        match self {
            Format::Bold => match value.as_str() {
                "bold" | "bolder" => Some(true),
                "normal" | "lighter" => Some(false),
                other => other.parse::<u16>().ok().map(|weight| weight >= 600),
            },
            Format::Italic => match value.as_str() {
                "italic" | "oblique" => Some(true),
                "normal" => Some(false),
                _ => None,
            },
            Format::Underline | Format::StrikeThrough => {
                if value.split_ascii_whitespace().any(|v| v == self.on_value()) {
                    Some(true)
                } else if value == "none" {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }
}

/// Whether `node` alone decides the format, and how.
fn decisive(doc: &Document, node: NodeId, format: Format) -> Option<bool> {
    let tag = doc.tag(node)?;
    let from_style = format
        .properties()
        .iter()
        .filter_map(|p| doc.style_property(node, p))
        .find_map(|v| format.judge(&v));
    if from_style.is_some() {
        return from_style;
    }
    (format.tags().contains(&tag) || format.implied_by().contains(&tag)).then_some(true)
}

/// Effective state of `format` at `node`.
pub fn is_formatted(doc: &Document, node: NodeId, format: Format) -> bool {
    doc.ancestors_or_self(node)
        .find_map(|n| decisive(doc, n, format))
        .unwrap_or(false)
}

/// Editable text nodes overlapping the selection that render something or
/// hold a placeholder.
fn selected_texts(doc: &Document, selection: &Selection) -> Vec<NodeId> {
    let range = selection.range();
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.is_text(n) && doc.is_editable(n))
        .filter(|&n| {
            let len = doc.node_len(n);
            doc.compare_points(Point::new(n, len), range.start).is_gt()
                && doc.compare_points(Point::new(n, 0), range.end).is_lt()
        })
        .filter(|&n| {
            doc.text(n).is_some_and(|t| t.contains(ZWS))
                || (0..doc.node_len(n)).any(|i| is_visible_char(doc, n, i))
        })
        .collect()
}

/// Whether every selected text node carries `format`; at a collapsed
/// selection, whether the cursor position does.
pub fn is_format_applied(doc: &Document, selection: &Selection, format: Format) -> bool {
    if selection.is_collapsed() {
        return is_formatted(doc, selection.anchor.node, format);
    }
    let texts = selected_texts(doc, selection);
    !texts.is_empty() && texts.iter().all(|&t| is_formatted(doc, t, format))
}

/// Inline wrappers that may be split, stripped or unwrapped for the sake
/// of a format. Font-size classes are the only classes tolerated.
fn is_candidate(ctx: &EditContext<'_>, node: NodeId) -> bool {
    let doc = &*ctx.doc;
    doc.is_element(node)
        && !doc.is_block(node)
        && !doc.is_atomic(node)
        && doc.is_editable(node)
        && !ctx.policy.is_unremovable(doc, node, Some(doc.root()))
        && doc.classes(node).all(|c| doc.schema().is_font_size_class(c))
}

/// Inline ancestors of `text` up to the first non-candidate.
fn candidate_chain(ctx: &EditContext<'_>, text: NodeId) -> Vec<NodeId> {
    ctx.doc
        .ancestors(text)
        .take_while(|&n| is_candidate(ctx, n))
        .collect()
}

/// Removes every trace of `format` from `node`: dedicated tags are dropped
/// (or renamed to `span` when attributes remain), style properties cleared,
/// bare spans unwrapped.
fn strip(doc: &mut Document, node: NodeId, format: Format) -> Result<(), EditError> {
    for property in format.properties() {
        doc.set_style_property(node, property, None);
    }
    let bare = doc.attrs(node).is_none_or(|a| a.is_empty());
    let tagged = doc.tag(node).is_some_and(|t| format.tags().contains(&t));
    if tagged && !bare {
        doc.set_tag(node, "span");
    }
    if bare && (tagged || doc.has_tag(node, "span")) {
        doc.unwrap(node)?;
    }
    Ok(())
}

/// Gives `text` the style value `value` for `format`, reusing a parent
/// span that wraps nothing else.
fn apply_style(
    ctx: &mut EditContext<'_>,
    text: NodeId,
    format: Format,
    value: &str,
) -> Result<(), EditError> {
    let property = format.properties()[0];
    let reusable = ctx
        .doc
        .parent(text)
        .filter(|&p| ctx.doc.has_tag(p, "span") && ctx.doc.node_len(p) == 1)
        .filter(|&p| is_candidate(ctx, p));
    let span = match reusable {
        Some(span) => span,
        None => {
            let span = ctx.doc.create_element("span");
            ctx.doc.wrap(text, span)?;
            span
        }
    };
    ctx.doc.set_style_property(span, property, Some(value));
    Ok(())
}

fn set_text_format(
    ctx: &mut EditContext<'_>,
    text: NodeId,
    format: Format,
    desired: bool,
) -> Result<(), EditError> {
    if is_formatted(ctx.doc, text, format) == desired {
        return Ok(());
    }
    let chain = candidate_chain(ctx, text);
    let carrier = chain
        .iter()
        .rev()
        .copied()
        .find(|&n| decisive(ctx.doc, n, format).is_some());
    if let Some(top) = carrier {
        log::trace!("isolating {text:?} below {top:?} to strip {}", format.name());
        let top = split_around(ctx.doc, &[text], top)?;
        let stripped: Vec<NodeId> = ctx
            .doc
            .ancestors(text)
            .take_while(|&n| ctx.doc.contains(top, n))
            .collect();
        for node in stripped {
            strip(ctx.doc, node, format)?;
        }
    }

    if is_formatted(ctx.doc, text, format) == desired {
        return Ok(());
    }
    if !desired {
        return apply_style(ctx, text, format, format.neutral_value());
    }
    if let Some(tag) = ctx.doc.schema().preferred_tag(format).map(str::to_string) {
        let wrapper = ctx.doc.create_element(&tag);
        ctx.doc.wrap(text, wrapper)?;
        if is_formatted(ctx.doc, text, format) {
            return Ok(());
        }
        log::debug!("<{tag}> does not render {}, falling back to style", format.name());
        ctx.doc.unwrap(wrapper)?;
    }
    apply_style(ctx, text, format, format.on_value())
}

/// Placeholder text at a collapsed cursor: the one already there, or a new
/// zero-width character in a tagged span.
fn placeholder(doc: &mut Document, cursor: Point) -> Result<NodeId, EditError> {
    let existing = Some(cursor.node)
        .filter(|&n| doc.text(n).is_some_and(|t| t.contains(ZWS)))
        .filter(|&n| doc.ancestors(n).any(|a| doc.has_attr(a, ZWS_INLINE_ATTR)));
    if let Some(text) = existing {
        return Ok(text);
    }
    let at = element_point(doc, cursor)?;
    let span = doc.create_element("span");
    doc.set_attr(span, ZWS_INLINE_ATTR, "");
    let text = doc.create_text(&ZWS.to_string());
    doc.append_child(span, text);
    doc.insert_child(at.node, at.offset, span);
    Ok(text)
}

/// Splits the text nodes at the selection boundaries so every selected text
/// node is fully inside it.
fn split_boundaries(doc: &mut Document, selection: &Selection) -> Result<Selection, EditError> {
    let anchor = doc.track(selection.anchor);
    let focus = doc.track(selection.focus);
    for id in [anchor, focus] {
        let point = doc.tracked(id);
        if doc.is_text(point.node) && point.offset > 0 && point.offset < doc.node_len(point.node) {
            doc.split_text(point.node, point.offset)?;
        }
    }
    let anchor = doc.untrack(anchor);
    let focus = doc.untrack(focus);
    Ok(Selection::new(doc, anchor, focus))
}

/// Flips `format` on the selection and returns the selection to keep.
pub fn toggle_format(
    ctx: &mut EditContext<'_>,
    selection: Selection,
    format: Format,
) -> Result<Selection, EditError> {
    let selection = if selection.is_collapsed() {
        let text = placeholder(ctx.doc, selection.anchor)?;
        Selection::new(ctx.doc, Point::new(text, 0), Point::new(text, 1))
    } else {
        split_boundaries(ctx.doc, &selection)?
    };

    let texts = selected_texts(ctx.doc, &selection);
    if texts.is_empty() {
        return Ok(selection);
    }
    let desired = !texts.iter().all(|&t| is_formatted(ctx.doc, t, format));
    log::debug!(
        "toggle {} {} on {} text nodes",
        format.name(),
        if desired { "on" } else { "off" },
        texts.len()
    );

    let preserved = ctx.doc.preserve(&selection);
    for text in texts {
        set_text_format(ctx, text, format, desired)?;
    }
    Ok(ctx.doc.restore(preserved))
}
