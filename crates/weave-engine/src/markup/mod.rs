//! # Debug markup
//!
//! A small HTML-like reader and writer for fixtures, logs and the CLI. Not a
//! persistence format: there is no sanitization and only double-quoted
//! attributes are understood.
//!
//! With selection markers enabled, `[` marks the anchor and `]` the focus.
//! A marker inside a text run becomes a text offset; a marker with no text
//! before it in the current run becomes a child index of the enclosing
//! element. A collapsed selection renders as `[]`.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::MarkupError;
use crate::position::Point;
use crate::schema::Schema;
use crate::selection::Selection;
use crate::tree::{char_len, Attributes, Document, NodeId};

const ANCHOR: char = '[';
const FOCUS: char = ']';

fn open_tag_regex() -> &'static Regex {
    static OPEN_TAG: OnceLock<Regex> = OnceLock::new();
    OPEN_TAG.get_or_init(|| {
        Regex::new(r#"^<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s=/>]+(?:\s*=\s*"[^"]*")?)*)\s*(/?)>"#)
            .expect("Invalid open tag regex")
    })
}

fn close_tag_regex() -> &'static Regex {
    static CLOSE_TAG: OnceLock<Regex> = OnceLock::new();
    CLOSE_TAG.get_or_init(|| {
        Regex::new(r"^</([a-zA-Z][a-zA-Z0-9-]*)\s*>").expect("Invalid close tag regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([^\s=/>]+)(?:\s*=\s*"([^"]*)")?"#).expect("Invalid attribute regex")
    })
}

/// Parses `input` as the content of a fresh root using the default schema.
pub fn parse(input: &str) -> Result<Document, MarkupError> {
    parse_with_schema(input, Arc::new(Schema::default()))
}

pub fn parse_with_schema(input: &str, schema: Arc<Schema>) -> Result<Document, MarkupError> {
    let mut reader = Reader::new(schema, false);
    reader.read(input)?;
    Ok(reader.doc)
}

/// Parses `input` and the `[`/`]` selection markers in it.
///
/// Without markers the selection is collapsed at the start of the root; with
/// only an anchor it is collapsed there.
pub fn parse_with_selection(input: &str) -> Result<(Document, Selection), MarkupError> {
    parse_with_selection_and_schema(input, Arc::new(Schema::default()))
}

pub fn parse_with_selection_and_schema(
    input: &str,
    schema: Arc<Schema>,
) -> Result<(Document, Selection), MarkupError> {
    let mut reader = Reader::new(schema, true);
    reader.read(input)?;
    let root = reader.doc.root();
    let anchor = reader
        .anchor
        .or(reader.focus)
        .unwrap_or(Point::new(root, 0));
    let focus = reader.focus.unwrap_or(anchor);
    let selection = Selection::new(&reader.doc, anchor, focus);
    Ok((reader.doc, selection))
}

enum Pending {
    Anchor(usize),
    Focus(usize),
}

struct Reader {
    doc: Document,
    markers: bool,
    stack: Vec<NodeId>,
    text: String,
    pending: Vec<Pending>,
    anchor: Option<Point>,
    focus: Option<Point>,
}

impl Reader {
    fn new(schema: Arc<Schema>, markers: bool) -> Self {
        let doc = Document::with_schema(schema);
        let root = doc.root();
        Self {
            doc,
            markers,
            stack: vec![root],
            text: String::new(),
            pending: Vec::new(),
            anchor: None,
            focus: None,
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.doc.root())
    }

    fn read(&mut self, input: &str) -> Result<(), MarkupError> {
        let mut at = 0;
        while at < input.len() {
            let rest = &input[at..];
            if rest.starts_with("</") {
                let caps = close_tag_regex()
                    .captures(rest)
                    .ok_or(MarkupError::MalformedTag(at))?;
                let tag = caps[1].to_ascii_lowercase();
                self.flush();
                if self.stack.len() < 2 || self.doc.tag(self.current()) != Some(tag.as_str()) {
                    return Err(MarkupError::UnexpectedClose { tag, at });
                }
                self.stack.pop();
                at += caps[0].len();
            } else if rest.starts_with('<') {
                let caps = open_tag_regex()
                    .captures(rest)
                    .ok_or(MarkupError::MalformedTag(at))?;
                self.flush();
                let attrs = parse_attributes(caps.get(2).map_or("", |m| m.as_str()));
                let element = self.doc.create_element_with_attrs(&caps[1], attrs);
                let parent = self.current();
                self.doc.append_child(parent, element);
                let self_closing = !caps[3].is_empty();
                if !self_closing && !self.doc.is_void(element) {
                    self.stack.push(element);
                }
                at += caps[0].len();
            } else {
                let ch = rest.chars().next().unwrap_or_default();
                if self.markers && (ch == ANCHOR || ch == FOCUS) {
                    self.marker(ch)?;
                    at += ch.len_utf8();
                    continue;
                }
                let end = rest
                    .find(|c: char| c == '<' || (self.markers && (c == ANCHOR || c == FOCUS)))
                    .unwrap_or(rest.len());
                self.text
                    .push_str(&html_escape::decode_html_entities(&rest[..end]));
                at += end;
            }
        }
        self.flush();
        if self.stack.len() > 1 {
            let tag = self.doc.tag(self.current()).unwrap_or_default().to_string();
            return Err(MarkupError::Unclosed(tag));
        }
        Ok(())
    }

    fn marker(&mut self, ch: char) -> Result<(), MarkupError> {
        let taken = match ch {
            ANCHOR => self.anchor.is_some() || self.pending.iter().any(|p| matches!(p, Pending::Anchor(_))),
            _ => self.focus.is_some() || self.pending.iter().any(|p| matches!(p, Pending::Focus(_))),
        };
        if taken {
            return Err(MarkupError::DuplicateMarker(ch));
        }
        if self.text.is_empty() {
            let current = self.current();
            let point = Point::new(current, self.doc.children(current).len());
            match ch {
                ANCHOR => self.anchor = Some(point),
                _ => self.focus = Some(point),
            }
        } else {
            let offset = char_len(&self.text);
            self.pending.push(match ch {
                ANCHOR => Pending::Anchor(offset),
                _ => Pending::Focus(offset),
            });
        }
        Ok(())
    }

    fn flush(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let node = self.doc.create_text(&self.text);
        let parent = self.current();
        self.doc.append_child(parent, node);
        for pending in self.pending.drain(..) {
            match pending {
                Pending::Anchor(offset) => self.anchor = Some(Point::new(node, offset)),
                Pending::Focus(offset) => self.focus = Some(Point::new(node, offset)),
            }
        }
        self.text.clear();
    }
}

fn parse_attributes(raw: &str) -> Attributes {
    attribute_regex()
        .captures_iter(raw)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

/// Markup for the content of the root.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    render_children(doc, doc.root(), &[], &mut out);
    out
}

/// Markup for the content of the root with `[`/`]` markers.
pub fn render_with_selection(doc: &Document, selection: &Selection) -> String {
    let markers: Vec<(Point, &str)> = if selection.is_collapsed() {
        vec![(selection.anchor, "[]")]
    } else {
        let mut markers = vec![(selection.anchor, "["), (selection.focus, "]")];
        markers.sort_by(|a, b| doc.compare_points(a.0, b.0));
        markers
    };
    let mut out = String::new();
    render_children(doc, doc.root(), &markers, &mut out);
    out
}

fn emit_markers(at: Point, markers: &[(Point, &str)], out: &mut String) {
    for (point, marker) in markers {
        if *point == at {
            out.push_str(marker);
        }
    }
}

fn render_children(doc: &Document, node: NodeId, markers: &[(Point, &str)], out: &mut String) {
    for (index, &child) in doc.children(node).iter().enumerate() {
        emit_markers(Point::new(node, index), markers, out);
        render_node(doc, child, markers, out);
    }
    emit_markers(Point::new(node, doc.children(node).len()), markers, out);
}

fn push_text(piece: &mut String, out: &mut String) {
    out.push_str(&html_escape::encode_text(piece).replace('\u{a0}', "&nbsp;"));
    piece.clear();
}

fn render_node(doc: &Document, node: NodeId, markers: &[(Point, &str)], out: &mut String) {
    if let Some(text) = doc.text(node) {
        let mut piece = String::new();
        for (offset, ch) in text.chars().enumerate() {
            if markers.iter().any(|(p, _)| *p == Point::new(node, offset)) {
                push_text(&mut piece, out);
                emit_markers(Point::new(node, offset), markers, out);
            }
            piece.push(ch);
        }
        push_text(&mut piece, out);
        emit_markers(Point::new(node, char_len(text)), markers, out);
        return;
    }

    let tag = doc.tag(node).unwrap_or_default();
    out.push('<');
    out.push_str(tag);
    for (name, value) in doc.attrs(node).into_iter().flatten() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
    if doc.is_void(node) {
        return;
    }
    render_children(doc, node, markers, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_render_preserve_structure() {
        let input = r#"<h1 class="title">abc</h1><p>a <b>bold</b>&amp;&nbsp;x<br></p>"#;
        let doc = parse(input).unwrap();
        assert_eq!(render(&doc), input);
    }

    #[test]
    fn test_text_marker_positions() {
        let (doc, selection) = parse_with_selection("<p>a[bc]d</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let t = doc.first_child(p).unwrap();
        assert_eq!(selection.anchor, Point::new(t, 1));
        assert_eq!(selection.focus, Point::new(t, 3));
        assert_eq!(doc.text(t), Some("abcd"));
    }

    #[test]
    fn test_element_marker_positions() {
        let (doc, selection) = parse_with_selection("<p><b>ab</b>[]cd</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        assert_eq!(selection.anchor, Point::new(p, 1));
        assert!(selection.is_collapsed());
    }

    #[test]
    fn test_render_with_selection_roundtrips_markers() {
        for input in [
            "<p>a[bc]d</p>",
            "<p>ab[]cd</p>",
            "<h1>abc[</h1><p>]def</p>",
            "<p>[<br>]</p>",
            "<p>x]y[z</p>",
        ] {
            let (doc, selection) = parse_with_selection(input).unwrap();
            assert_eq!(render_with_selection(&doc, &selection), input);
        }
    }

    #[test]
    fn test_markers_are_plain_text_without_selection() {
        let doc = parse("<p>[x]</p>").unwrap();
        assert_eq!(render(&doc), "<p>[x]</p>");
    }

    #[test]
    fn test_malformed_markup_is_reported() {
        assert_eq!(parse("<p>ab").unwrap_err(), MarkupError::Unclosed("p".into()));
        assert!(matches!(
            parse("<p>ab</b>").unwrap_err(),
            MarkupError::UnexpectedClose { .. }
        ));
        assert_eq!(parse("a < b").unwrap_err(), MarkupError::MalformedTag(2));
        assert_eq!(
            parse_with_selection("<p>[a[</p>").unwrap_err(),
            MarkupError::DuplicateMarker('[')
        );
    }

    #[test]
    fn test_self_closing_and_void_tags() {
        let doc = parse("<p>a<br/>b<img src=\"x.png\"></p>").unwrap();
        assert_eq!(render(&doc), "<p>a<br>b<img src=\"x.png\"></p>");
    }
}
