//! # Selection model
//!
//! A [`Selection`] keeps the user's anchor and focus; the equivalent
//! [`Range`] is direction-normalized.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::position::{normalize, NormalizeMode, Point, Range, Side};
use crate::tree::{Document, NodeId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Anchor precedes (or equals) focus.
    Forward,
    Backward,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
    direction: Direction,
}

impl Selection {
    /// Selection with its direction derived from document order.
    pub fn new(doc: &Document, anchor: Point, focus: Point) -> Self {
        let direction = if doc.compare_points(anchor, focus) == Ordering::Greater {
            Direction::Backward
        } else {
            Direction::Forward
        };
        Self {
            anchor,
            focus,
            direction,
        }
    }

    pub fn collapsed_at(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
            direction: Direction::Forward,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn range(&self) -> Range {
        match self.direction {
            Direction::Forward => Range {
                start: self.anchor,
                end: self.focus,
            },
            Direction::Backward => Range {
                start: self.focus,
                end: self.anchor,
            },
        }
    }

    pub fn start(&self) -> Point {
        self.range().start
    }

    pub fn end(&self) -> Point {
        self.range().end
    }
}

/// Validates and normalizes a user selection.
///
/// Fails with [`EditError::OutOfBounds`] when an endpoint is not inside the
/// document root. The anchor is normalized toward the left and the focus
/// toward the right; a collapsed selection keeps a single point.
pub fn resolve(
    doc: &Document,
    anchor: Point,
    focus: Point,
    mode: NormalizeMode,
) -> Result<Selection, EditError> {
    doc.check_point(anchor)?;
    doc.check_point(focus)?;
    if anchor == focus {
        let point = normalize(doc, anchor, Side::Left, mode);
        return Ok(Selection::collapsed_at(point));
    }
    let direction = doc.compare_points(anchor, focus);
    let (left, right) = if direction == Ordering::Greater {
        (Side::Right, Side::Left)
    } else {
        (Side::Left, Side::Right)
    };
    let anchor = normalize(doc, anchor, left, mode);
    let focus = normalize(doc, focus, right, mode);
    Ok(Selection::new(doc, anchor, focus))
}

/// Nodes fully inside the selection in document order, widened with the
/// whole content of any selected container around them.
pub fn selected_nodes(doc: &Document, selection: &Selection) -> Vec<NodeId> {
    let range = selection.range();
    let root = doc.root();
    let all = doc.descendants(root);
    let mut picked: HashSet<NodeId> = all
        .iter()
        .copied()
        .filter(|&n| range.contains_node(doc, n))
        .collect();

    let class = doc.schema().selected_container_class();
    let mut containers: HashSet<NodeId> = HashSet::new();
    let seeds = picked
        .iter()
        .copied()
        .chain([range.start.node, range.end.node]);
    for seed in seeds {
        for ancestor in doc.ancestors_or_self(seed) {
            if ancestor == root {
                break;
            }
            if doc.is_element(ancestor) && doc.has_class(ancestor, class) {
                containers.insert(ancestor);
            }
        }
    }
    for container in containers {
        picked.extend(doc.descendants(container));
    }

    all.into_iter().filter(|n| picked.contains(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;
    use pretty_assertions::assert_eq;

    fn tags(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| match doc.tag(n) {
                Some(tag) => tag.to_string(),
                None => format!("#{}", doc.text(n).unwrap_or_default()),
            })
            .collect()
    }

    #[test]
    fn test_direction_follows_document_order() {
        let (doc, selection) = markup::parse_with_selection("<p>a]bc[d</p>").unwrap();
        assert_eq!(selection.direction(), Direction::Backward);
        assert!(!selection.is_collapsed());
        let range = selection.range();
        assert_eq!(range.start, selection.focus);
        assert_eq!(doc.compare_points(range.start, range.end), Ordering::Less);
    }

    #[test]
    fn test_resolve_rejects_foreign_points() {
        let mut doc = markup::parse("<p>ab</p>").unwrap();
        let detached = doc.create_text("zz");
        let root = doc.root();
        let err = resolve(
            &doc,
            Point::new(detached, 0),
            Point::new(root, 0),
            NormalizeMode::Shallow,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EditError::OutOfBounds {
                node: detached,
                offset: 0
            }
        );
        assert!(resolve(&doc, Point::new(root, 5), Point::new(root, 0), NormalizeMode::Shallow).is_err());
    }

    #[test]
    fn test_resolve_collapsed_keeps_single_point() {
        let doc = markup::parse("<p><b>ab</b>cd</p>").unwrap();
        let p = doc.first_child(doc.root()).unwrap();
        let selection =
            resolve(&doc, Point::new(p, 1), Point::new(p, 1), NormalizeMode::Deep).unwrap();
        assert!(selection.is_collapsed());
        assert_eq!(doc.text(selection.anchor.node), Some("ab"));
    }

    #[test]
    fn test_selected_nodes_are_fully_contained() {
        let (doc, selection) =
            markup::parse_with_selection("<p>a[b</p><p>cd</p><p>e]f</p>").unwrap();
        let nodes = selected_nodes(&doc, &selection);
        assert_eq!(tags(&doc, &nodes), vec!["p", "#cd"]);
    }

    #[test]
    fn test_selected_container_widens_to_all_content() {
        let (doc, selection) = markup::parse_with_selection(
            r#"<table><tr><td class="selected">a[b<i>c</i></td><td class="selected">d]e</td></tr></table>"#,
        )
        .unwrap();
        let nodes = selected_nodes(&doc, &selection);
        assert_eq!(tags(&doc, &nodes), vec!["#ab", "i", "#c", "#de"]);
    }
}
