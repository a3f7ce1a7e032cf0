//! # Content visibility
//!
//! Pure queries deciding what a boundary is adjacent to once the tree is
//! rendered: collapsible whitespace, zero-width placeholders and inline
//! element edges are invisible; line breaks and block edges end a line;
//! characters and atomic nodes are content.

use crate::position::{Point, Side};
use crate::tree::{Document, NodeId};

/// Zero-width space used as a cursor anchor inside otherwise empty inlines.
pub const ZWS: char = '\u{200B}';
pub const NBSP: char = '\u{a0}';

/// What lies next to a boundary in one direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Adjacent {
    /// A visible character or an atomic node.
    Content,
    /// A line break or the edge of an enclosing block.
    BlockBoundary,
    /// The edge of the document.
    Nothing,
}

/// One unit crossed while walking the tree from a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Char { node: NodeId, index: usize, ch: char },
    /// Moved into an element through its edge.
    Enter(NodeId),
    /// Moved out of an element through its edge.
    Leave(NodeId),
    /// Passed over a leaf element as a whole: a void element or a
    /// non-editable subtree.
    Atom(NodeId),
}

/// Cursor walk over raw tree steps, bounded by the document root.
pub(crate) struct Walker<'a> {
    doc: &'a Document,
    point: Point,
    side: Side,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(doc: &'a Document, point: Point, side: Side) -> Self {
        Self { doc, point, side }
    }

    /// Position between the last returned step and the next one.
    pub(crate) fn point(&self) -> Point {
        self.point
    }

    fn is_leaf_element(&self, node: NodeId) -> bool {
        self.doc.is_void(node) || self.doc.is_atomic(node)
    }
}

impl Iterator for Walker<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let doc = self.doc;
        loop {
            let Point { node, offset } = self.point;
            if doc.is_text(node) {
                match self.side {
                    Side::Right if offset < doc.node_len(node) => {
                        self.point.offset += 1;
                        let ch = doc.char_at(node, offset)?;
                        return Some(Step::Char { node, index: offset, ch });
                    }
                    Side::Left if offset > 0 => {
                        self.point.offset -= 1;
                        let ch = doc.char_at(node, offset - 1)?;
                        return Some(Step::Char { node, index: offset - 1, ch });
                    }
                    Side::Right => self.point = doc.point_after(node)?,
                    Side::Left => self.point = doc.point_before(node)?,
                }
                continue;
            }

            let child = match self.side {
                Side::Right => doc.child(node, offset),
                Side::Left => offset.checked_sub(1).and_then(|i| doc.child(node, i)),
            };
            let Some(child) = child else {
                if node == doc.root() {
                    return None;
                }
                self.point = match self.side {
                    Side::Right => doc.point_after(node)?,
                    Side::Left => doc.point_before(node)?,
                };
                return Some(Step::Leave(node));
            };

            let (past, inside) = match self.side {
                Side::Right => (Point::new(node, offset + 1), Point::new(child, 0)),
                Side::Left => (
                    Point::new(node, offset - 1),
                    Point::new(child, doc.node_len(child)),
                ),
            };
            if doc.is_text(child) {
                self.point = inside;
                continue;
            }
            if self.is_leaf_element(child) {
                self.point = past;
                return Some(Step::Atom(child));
            }
            self.point = inside;
            return Some(Step::Enter(child));
        }
    }
}

/// Whitespace that collapses in rendering at this text node.
fn is_collapsible(doc: &Document, node: NodeId, ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r') && !doc.is_preformatted(node)
}

/// Finer outcome of a scan, keeping line breaks apart from block edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Scan {
    Content,
    LineBreak,
    Block,
    Edge,
}

impl From<Scan> for Adjacent {
    fn from(scan: Scan) -> Self {
        match scan {
            Scan::Content => Adjacent::Content,
            Scan::LineBreak | Scan::Block => Adjacent::BlockBoundary,
            Scan::Edge => Adjacent::Nothing,
        }
    }
}

fn scan(doc: &Document, point: Point, side: Side) -> Scan {
    for step in Walker::new(doc, point, side) {
        match step {
            Step::Char { node, ch, .. } => {
                if ch == ZWS || is_collapsible(doc, node, ch) {
                    continue;
                }
                return Scan::Content;
            }
            Step::Atom(node) if doc.is_line_break(node) => return Scan::LineBreak,
            Step::Atom(_) => return Scan::Content,
            Step::Enter(node) | Step::Leave(node) => {
                if doc.is_block(node) {
                    return Scan::Block;
                }
            }
        }
    }
    Scan::Edge
}

/// Classifies the nearest rendered unit next to `point` on `side`.
///
/// Zero-width placeholders and collapsible whitespace are looked through;
/// inline element edges are transparent.
pub fn classify(doc: &Document, point: Point, side: Side) -> Adjacent {
    scan(doc, point, side).into()
}

/// Whether the unit right before `point` is content, without looking
/// through whitespace.
fn preceded_by_content(doc: &Document, point: Point) -> bool {
    for step in Walker::new(doc, point, Side::Left) {
        match step {
            Step::Char { node, ch, .. } => {
                if ch == ZWS {
                    continue;
                }
                return !is_collapsible(doc, node, ch);
            }
            Step::Atom(node) => return !doc.is_line_break(node),
            Step::Enter(node) | Step::Leave(node) => {
                if doc.is_block(node) {
                    return false;
                }
            }
        }
    }
    false
}

/// Whether the character at `index` of text node `node` is rendered.
///
/// A collapsible space is visible only when immediately preceded by content
/// and followed by content before the next line boundary.
pub fn is_visible_char(doc: &Document, node: NodeId, index: usize) -> bool {
    let Some(ch) = doc.char_at(node, index) else {
        return false;
    };
    if ch == ZWS {
        return false;
    }
    if !is_collapsible(doc, node, ch) {
        return true;
    }
    preceded_by_content(doc, Point::new(node, index))
        && classify(doc, Point::new(node, index + 1), Side::Right) == Adjacent::Content
}

/// A line break whose removal would not change rendering: it follows
/// content and only a block edge or the document end comes after it.
pub fn is_fake_line_break(doc: &Document, node: NodeId) -> bool {
    if !doc.is_line_break(node) {
        return false;
    }
    let (Some(before), Some(after)) = (doc.point_before(node), doc.point_after(node)) else {
        return false;
    };
    scan(doc, before, Side::Left) == Scan::Content
        && matches!(scan(doc, after, Side::Right), Scan::Block | Scan::Edge)
}

/// Whether `node` contributes anything to the rendering.
pub fn is_visible(doc: &Document, node: NodeId) -> bool {
    if let Some(text) = doc.text(node) {
        return (0..text.chars().count()).any(|i| is_visible_char(doc, node, i));
    }
    if doc.is_line_break(node) {
        return !is_fake_line_break(doc, node);
    }
    if doc.is_atomic(node) {
        return true;
    }
    doc.children(node).iter().any(|&c| is_visible(doc, c))
}

/// Visible characters or atomic nodes below `node`; line breaks do not count.
pub fn has_rendered_content(doc: &Document, node: NodeId) -> bool {
    if let Some(text) = doc.text(node) {
        return (0..text.chars().count()).any(|i| is_visible_char(doc, node, i));
    }
    if doc.is_line_break(node) {
        return false;
    }
    if doc.is_atomic(node) {
        return true;
    }
    doc.children(node).iter().any(|&c| has_rendered_content(doc, c))
}

/// Whether any text below (or at) `node` holds a zero-width placeholder.
pub fn has_zws(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(doc.descendants(node))
        .any(|n| doc.text(n).is_some_and(|t| t.contains(ZWS)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;
    use rstest::rstest;

    fn text_node(doc: &Document, content: &str) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&n| doc.text(n) == Some(content))
            .unwrap()
    }

    fn line_breaks(doc: &Document) -> Vec<NodeId> {
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.is_line_break(n))
            .collect()
    }

    #[test]
    fn test_walker_steps_through_inline_edges() {
        let doc = markup::parse("<p>a<b>c</b></p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let steps: Vec<Step> = Walker::new(&doc, Point::new(p, 0), Side::Right).collect();
        let b = doc.child(p, 1).unwrap();
        assert!(matches!(steps[0], Step::Char { ch: 'a', .. }));
        assert_eq!(steps[1], Step::Enter(b));
        assert!(matches!(steps[2], Step::Char { ch: 'c', .. }));
        assert_eq!(steps[3], Step::Leave(b));
        assert_eq!(steps[4], Step::Leave(p));
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn test_classify_looks_through_inline_edges_and_placeholders() {
        let doc = markup::parse("<p>a<i>\u{200B}</i> </p><p>b</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        assert_eq!(classify(&doc, Point::new(p, 1), Side::Left), Adjacent::Content);
        assert_eq!(classify(&doc, Point::new(p, 1), Side::Right), Adjacent::BlockBoundary);
        assert_eq!(classify(&doc, Point::new(p, 0), Side::Left), Adjacent::BlockBoundary);
        let root = doc.root();
        assert_eq!(classify(&doc, Point::new(root, 0), Side::Left), Adjacent::Nothing);
        assert_eq!(classify(&doc, Point::new(root, 2), Side::Right), Adjacent::Nothing);
    }

    #[test]
    fn test_atomic_nodes_are_content() {
        let doc = markup::parse(r#"<p><img src="x"><span contenteditable="false">z</span></p>"#)
            .unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        assert_eq!(classify(&doc, Point::new(p, 0), Side::Right), Adjacent::Content);
        assert_eq!(classify(&doc, Point::new(p, 2), Side::Left), Adjacent::Content);
        assert!(has_rendered_content(&doc, p));
    }

    #[rstest]
    #[case("<p>a b</p>", "a b", 1, true)]
    #[case("<p>a  b</p>", "a  b", 2, false)]
    #[case("<p> a</p>", " a", 0, false)]
    #[case("<p>a </p>", "a ", 1, false)]
    #[case("<p>a\u{a0}</p>", "a\u{a0}", 1, true)]
    #[case("<pre>a  </pre>", "a  ", 2, true)]
    #[case("<p>a\u{200B}b</p>", "a\u{200B}b", 1, false)]
    fn test_whitespace_visibility(
        #[case] input: &str,
        #[case] text: &str,
        #[case] index: usize,
        #[case] visible: bool,
    ) {
        let doc = markup::parse(input).unwrap();
        let node = text_node(&doc, text);
        assert_eq!(is_visible_char(&doc, node, index), visible);
    }

    #[test]
    fn test_space_before_inline_content_is_visible() {
        let doc = markup::parse("<p>a <b>c</b></p>").unwrap();
        let node = text_node(&doc, "a ");
        assert!(is_visible_char(&doc, node, 1));
    }

    #[rstest]
    #[case("<p>ab<br></p>", vec![true])]
    #[case("<p><br></p>", vec![false])]
    #[case("<p>a<br>b</p>", vec![false])]
    #[case("<p>a<br><br></p>", vec![false, false])]
    #[case("<p>a<br><b></b> </p>", vec![true])]
    fn test_fake_line_breaks(#[case] input: &str, #[case] expected: Vec<bool>) {
        let doc = markup::parse(input).unwrap();
        let actual: Vec<bool> = line_breaks(&doc)
            .into_iter()
            .map(|br| is_fake_line_break(&doc, br))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_rendered_content_ignores_placeholders() {
        let doc = markup::parse("<p><b>\u{200B}</b><br></p><p><i> </i></p>").unwrap();
        let blocks = doc.children(doc.root()).to_vec();
        assert!(!has_rendered_content(&doc, blocks[0]));
        assert!(is_visible(&doc, blocks[0]));
        assert!(!has_rendered_content(&doc, blocks[1]));
        assert!(!is_visible(&doc, blocks[1]));
        assert!(has_zws(&doc, blocks[0]));
    }
}
