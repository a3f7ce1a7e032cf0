//! # Points, ranges and normalization
//!
//! A [`Point`] is a boundary inside the tree: a child index for elements, a
//! code-point index for text. [`normalize`] turns any point into a canonical
//! location that can host a cursor.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::tree::{Document, NodeId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub node: NodeId,
    pub offset: usize,
}

impl Point {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Direction in which a point is relocated or a neighbour is inspected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Only leave void and non-editable containers.
    #[default]
    Shallow,
    /// Additionally sink into the deepest adjacent inline node.
    Deep,
}

/// Ordered pair of points, `start <= end` in document order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    /// Orders `a` and `b` by document position.
    pub fn new(doc: &Document, a: Point, b: Point) -> Self {
        if doc.compare_points(a, b) == Ordering::Greater {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Deepest element containing both endpoints.
    pub fn common_ancestor(&self, doc: &Document) -> NodeId {
        doc.common_ancestor(self.start.node, self.end.node)
            .unwrap_or_else(|| doc.root())
    }

    /// Whether `node` lies entirely between `start` and `end`.
    pub fn contains_node(&self, doc: &Document, node: NodeId) -> bool {
        match (doc.point_before(node), doc.point_after(node)) {
            (Some(before), Some(after)) => {
                doc.compare_points(before, self.start) != Ordering::Less
                    && doc.compare_points(after, self.end) != Ordering::Greater
            }
            _ => false,
        }
    }
}

/// Canonical cursor location for `point`.
///
/// A point inside a void element moves just after it; a point inside a
/// non-editable container moves outward toward `side`. In
/// [`NormalizeMode::Deep`] the point then sinks into the deepest adjacent
/// inline node, trying `side` first. Normalizing twice changes nothing.
pub fn normalize(doc: &Document, point: Point, side: Side, mode: NormalizeMode) -> Point {
    let mut p = point;
    while doc.is_element(p.node) && doc.is_void(p.node) {
        match doc.point_after(p.node) {
            Some(after) => p = after,
            None => break,
        }
    }
    while p.node != doc.root() && !doc.is_editable(p.node) {
        let outward = match side {
            Side::Left => doc.point_before(p.node),
            Side::Right => doc.point_after(p.node),
        };
        match outward {
            Some(next) => p = next,
            None => break,
        }
    }
    if mode == NormalizeMode::Deep {
        p = descend(doc, p, side)
            .or_else(|| descend(doc, p, side.opposite()))
            .unwrap_or(p);
    }
    p
}

/// Inline element the cursor may enter.
fn is_enterable_inline(doc: &Document, node: NodeId) -> bool {
    doc.is_element(node)
        && !doc.is_block(node)
        && !doc.is_void(node)
        && !doc.is_atomic(node)
        && doc.is_editable(node)
}

fn descend(doc: &Document, point: Point, side: Side) -> Option<Point> {
    let mut p = point;
    loop {
        if doc.is_text(p.node) {
            break;
        }
        let candidate = match side {
            Side::Left => p.offset.checked_sub(1).and_then(|i| doc.child(p.node, i)),
            Side::Right => doc.child(p.node, p.offset),
        };
        let Some(candidate) = candidate else { break };
        let inner = match side {
            Side::Left => Point::new(candidate, doc.node_len(candidate)),
            Side::Right => Point::new(candidate, 0),
        };
        if doc.is_text(candidate) {
            p = inner;
            break;
        }
        if !is_enterable_inline(doc, candidate) {
            break;
        }
        p = inner;
    }
    (p != point).then_some(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;
    use pretty_assertions::assert_eq;

    fn find_text(doc: &Document, text: &str) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&n| doc.text(n) == Some(text))
            .unwrap()
    }

    #[test]
    fn test_point_in_void_moves_after_it() {
        let doc = markup::parse("<p>a<img>b</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let img = doc.child(p, 1).unwrap();
        assert_eq!(
            normalize(&doc, Point::new(img, 0), Side::Left, NormalizeMode::Shallow),
            Point::new(p, 2)
        );
    }

    #[test]
    fn test_point_in_non_editable_moves_outward_toward_side() {
        let doc = markup::parse(r#"<p>a<span contenteditable="false">xy</span>b</p>"#).unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let xy = find_text(&doc, "xy");
        assert_eq!(
            normalize(&doc, Point::new(xy, 1), Side::Left, NormalizeMode::Shallow),
            Point::new(p, 1)
        );
        assert_eq!(
            normalize(&doc, Point::new(xy, 1), Side::Right, NormalizeMode::Shallow),
            Point::new(p, 2)
        );
    }

    #[test]
    fn test_deep_prefers_end_of_preceding_inline() {
        let doc = markup::parse("<p><b>ab</b>cd</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let ab = find_text(&doc, "ab");
        let cd = find_text(&doc, "cd");
        assert_eq!(
            normalize(&doc, Point::new(p, 1), Side::Left, NormalizeMode::Deep),
            Point::new(ab, 2)
        );
        assert_eq!(
            normalize(&doc, Point::new(p, 1), Side::Right, NormalizeMode::Deep),
            Point::new(cd, 0)
        );
        assert_eq!(
            normalize(&doc, Point::new(p, 0), Side::Left, NormalizeMode::Deep),
            Point::new(ab, 0)
        );
    }

    #[test]
    fn test_deep_does_not_enter_blocks() {
        let doc = markup::parse("<p>ab</p><p>cd</p>").unwrap();
        let root = doc.root();
        assert_eq!(
            normalize(&doc, Point::new(root, 1), Side::Left, NormalizeMode::Deep),
            Point::new(root, 1)
        );
    }

    #[test]
    fn test_range_orders_endpoints() {
        let doc = markup::parse("<p>ab</p><p>cd</p>").unwrap();
        let ab = find_text(&doc, "ab");
        let cd = find_text(&doc, "cd");
        let range = Range::new(&doc, Point::new(cd, 1), Point::new(ab, 1));
        assert_eq!(range.start, Point::new(ab, 1));
        assert_eq!(range.end, Point::new(cd, 1));
        assert_eq!(range.common_ancestor(&doc), doc.root());
        assert!(!range.collapsed());
    }
}
