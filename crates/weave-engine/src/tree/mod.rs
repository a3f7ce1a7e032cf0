//! # Document tree
//!
//! A single owned arena of element and text nodes addressed by [`NodeId`]
//! handles. Structural edits go through the mutation primitives below; each
//! primitive bumps the document version and remaps every tracked point so
//! positions registered before an edit stay exact afterwards.
//!
//! Offsets follow the usual live-range rules: an element offset is a child
//! index in `0..=children.len()`, a text offset is a code-point index in
//! `0..=len`.

mod node;
mod tracker;

pub mod invariants;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

pub use node::{Attributes, NodeId, NodeKind};
pub use tracker::{PreservedSelection, TrackId};

pub(crate) use node::{byte_index, char_len};

use crate::error::EditError;
use crate::position::Point;
use crate::schema::Schema;
use crate::selection::Selection;
use crate::style;
use node::NodeData;
use tracker::PointTracker;

/// Tag of the editable root every document starts with.
pub const ROOT_TAG: &str = "div";

/// An editable document: the node arena, its schema and tracked points.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<NodeData>>,
    root: NodeId,
    schema: Arc<Schema>,
    tracker: PointTracker,
    /// Incremented by every structural primitive (enables change detection)
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document using the default schema.
    pub fn new() -> Self {
        Self::with_schema(Arc::new(Schema::default()))
    }

    pub fn with_schema(schema: Arc<Schema>) -> Self {
        Self {
            nodes: vec![Some(NodeData::element(ROOT_TAG, Attributes::new()))],
            root: NodeId(0),
            schema,
            tracker: PointTracker::default(),
            version: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    // ---- reading -------------------------------------------------------

    fn data(&self, id: NodeId) -> &NodeData {
        match self.nodes.get(id.0) {
            Some(Some(data)) => data,
            _ => panic!("stale node handle {id:?}"),
        }
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        match self.nodes.get_mut(id.0) {
            Some(Some(data)) => data,
            _ => panic!("stale node handle {id:?}"),
        }
    }

    /// Whether `id` still refers to a live node.
    pub fn exists(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    /// Fails with [`EditError::StaleNode`] when `id` was freed.
    pub fn check_live(&self, id: NodeId) -> Result<(), EditError> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(EditError::StaleNode(id))
        }
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        !self.is_text(id)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn attrs(&self, id: NodeId) -> Option<&Attributes> {
        match &self.data(id).kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)?.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn char_at(&self, id: NodeId, index: usize) -> Option<char> {
        self.text(id)?.chars().nth(index)
    }

    /// Maximum offset inside `id`: child count or code-point length.
    pub fn node_len(&self, id: NodeId) -> usize {
        match &self.data(id).kind {
            NodeKind::Text(text) => char_len(text),
            NodeKind::Element { .. } => self.data(id).children.len(),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Index of `id` among its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.child(parent, self.index_of(id)? + 1)
    }

    /// Proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// `id` followed by its ancestors.
    pub fn ancestors_or_self(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(id).chain(self.ancestors(id))
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_or_self(node).any(|n| n == ancestor)
    }

    /// Live and reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.exists(id) && self.contains(self.root, id)
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attr(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        style::property(self.attr(id, "style")?, property)
    }

    // ---- schema-driven classification ----------------------------------

    pub fn is_block(&self, id: NodeId) -> bool {
        id == self.root || self.tag(id).is_some_and(|t| self.schema.is_block_tag(t))
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(|t| self.schema.is_void_tag(t))
    }

    pub fn is_line_break(&self, id: NodeId) -> bool {
        self.has_tag(id, "br")
    }

    /// The nearest ancestor-or-self element with a `contenteditable`
    /// attribute decides; the root is editable.
    pub fn is_editable(&self, id: NodeId) -> bool {
        let start = if self.is_text(id) { self.parent(id) } else { Some(id) };
        let Some(start) = start else {
            return false;
        };
        for n in self.ancestors_or_self(start) {
            if let Some(value) = self.attr(n, "contenteditable") {
                return !value.eq_ignore_ascii_case("false");
            }
            if n == self.root {
                return true;
            }
        }
        false
    }

    /// A node the cursor can pass over but never enter: a void element
    /// other than `br`, or the top of a non-editable subtree.
    pub fn is_atomic(&self, id: NodeId) -> bool {
        if self.is_text(id) || id == self.root {
            return false;
        }
        if self.is_void(id) {
            return !self.is_line_break(id);
        }
        !self.is_editable(id) && self.parent(id).is_some_and(|p| self.is_editable(p))
    }

    pub fn is_preformatted(&self, id: NodeId) -> bool {
        self.ancestors_or_self(id)
            .take_while(|&n| n != self.root)
            .any(|n| self.tag(n).is_some_and(|t| self.schema.is_preformatted_tag(t)))
    }

    /// Nearest block ancestor-or-self, the root at worst.
    pub fn closest_block(&self, id: NodeId) -> NodeId {
        self.ancestors_or_self(id)
            .find(|&n| self.is_element(n) && self.is_block(n))
            .unwrap_or(self.root)
    }

    // ---- points --------------------------------------------------------

    pub fn point_before(&self, id: NodeId) -> Option<Point> {
        Some(Point::new(self.parent(id)?, self.index_of(id)?))
    }

    pub fn point_after(&self, id: NodeId) -> Option<Point> {
        Some(Point::new(self.parent(id)?, self.index_of(id)? + 1))
    }

    /// Attached node and offset within `0..=node_len`.
    pub fn is_valid_point(&self, point: Point) -> bool {
        self.is_attached(point.node) && point.offset <= self.node_len(point.node)
    }

    pub fn check_point(&self, point: Point) -> Result<(), EditError> {
        if self.is_valid_point(point) {
            Ok(())
        } else {
            Err(EditError::OutOfBounds {
                node: point.node,
                offset: point.offset,
            })
        }
    }

    /// Child indices from the top of `id`'s tree down to `id`.
    fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = self
            .ancestors_or_self(id)
            .filter_map(|n| self.index_of(n))
            .collect();
        path.reverse();
        path
    }

    /// Document-order comparison of two points of the same tree.
    pub fn compare_points(&self, a: Point, b: Point) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        let pa = self.path(a.node);
        let pb = self.path(b.node);
        let common = pa.iter().zip(&pb).take_while(|(x, y)| x == y).count();
        match (pa.get(common), pb.get(common)) {
            (Some(ia), Some(ib)) => ia.cmp(ib),
            (None, Some(&ib)) => {
                if a.offset <= ib {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Some(&ia), None) => {
                if b.offset <= ia {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (None, None) => a.offset.cmp(&b.offset),
        }
    }

    /// Deepest element containing both nodes.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let chain: HashSet<NodeId> = self.ancestors_or_self(a).collect();
        self.ancestors_or_self(b)
            .find(|n| chain.contains(n) && self.is_element(*n))
    }

    // ---- tracking ------------------------------------------------------

    /// Registers `point` so it follows every later mutation.
    pub fn track(&mut self, point: Point) -> TrackId {
        self.tracker.track(point)
    }

    /// Current location of a tracked point.
    ///
    /// Panics when `id` was already released.
    pub fn tracked(&self, id: TrackId) -> Point {
        match self.tracker.get(id) {
            Some(point) => point,
            None => panic!("tracked point {id:?} was released"),
        }
    }

    pub fn set_tracked(&mut self, id: TrackId, point: Point) {
        self.tracker.set(id, point);
    }

    /// Stops tracking and returns the final location.
    pub fn untrack(&mut self, id: TrackId) -> Point {
        match self.tracker.release(id) {
            Some(point) => point,
            None => panic!("tracked point {id:?} was released twice"),
        }
    }

    pub(crate) fn tracked_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.tracker.points()
    }

    pub fn preserve(&mut self, selection: &Selection) -> PreservedSelection {
        let anchor = self.track(selection.anchor);
        let focus = self.track(selection.focus);
        PreservedSelection::new(anchor, focus)
    }

    pub fn restore(&mut self, preserved: PreservedSelection) -> Selection {
        let (anchor, focus) = preserved.into();
        let anchor = self.untrack(anchor);
        let focus = self.untrack(focus);
        Selection::new(self, anchor, focus)
    }

    // ---- creation ------------------------------------------------------

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Some(data));
        NodeId(self.nodes.len() - 1)
    }

    /// New detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::element(tag, Attributes::new()))
    }

    pub fn create_element_with_attrs(&mut self, tag: &str, attrs: Attributes) -> NodeId {
        self.alloc(NodeData::element(tag, attrs))
    }

    /// New detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::text(text))
    }

    /// Detached copy of `id` without children.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let kind = self.data(id).kind.clone();
        self.alloc(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    // ---- attribute primitives ------------------------------------------

    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Attributes> {
        match &mut self.data_mut(id).kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(attrs) = self.attrs_mut(id) {
            attrs.insert(name.to_string(), value.to_string());
            self.bump();
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let removed = self.attrs_mut(id)?.remove(name);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    pub fn set_tag(&mut self, id: NodeId, new_tag: &str) {
        if let NodeKind::Element { tag, .. } = &mut self.data_mut(id).kind {
            *tag = new_tag.to_ascii_lowercase();
            self.bump();
        }
    }

    /// Sets or (with `None`) clears one inline style property; an emptied
    /// `style` attribute is dropped.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: Option<&str>) {
        let current = self.attr(id, "style").unwrap_or_default();
        let updated = style::with_property(current, property, value);
        if updated.is_empty() {
            self.remove_attr(id, "style");
        } else {
            self.set_attr(id, "style", &updated);
        }
    }

    // ---- structural primitives -----------------------------------------

    /// Inserts the detached node `child` at `index` under `parent`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(self.parent(child).is_none(), "insert_child on attached node");
        let index = index.min(self.children(parent).len());
        self.data_mut(parent).children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
        self.tracker.shift(parent, index, 1);
        self.bump();
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), EditError> {
        let at = self.point_before(reference).ok_or(EditError::NoParent(reference))?;
        self.insert_child(at.node, at.offset, node);
        Ok(())
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), EditError> {
        let at = self.point_after(reference).ok_or(EditError::NoParent(reference))?;
        self.insert_child(at.node, at.offset, node);
        Ok(())
    }

    /// Unlinks `id` from its parent without touching tracked points.
    fn detach_raw(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        self.data_mut(parent).children.remove(index);
        self.data_mut(id).parent = None;
        Some((parent, index))
    }

    fn subtree(&self, id: NodeId) -> HashSet<NodeId> {
        let mut set: HashSet<NodeId> = self.descendants(id).into_iter().collect();
        set.insert(id);
        set
    }

    /// Removes `id` and its subtree. Points inside collapse to where the
    /// node used to be, or to the start of the document when `id` was
    /// detached. The root is never removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            log::warn!("remove: refusing to remove the document root");
            return;
        }
        let doomed = self.subtree(id);
        let slot = self.detach_raw(id);
        let fallback = Point::new(self.root, 0);
        self.tracker.remap(|p| match slot {
            _ if doomed.contains(&p.node) => slot.map_or(fallback, |(parent, index)| {
                Point::new(parent, index)
            }),
            Some((parent, index)) if p.node == parent && p.offset > index => {
                Point::new(parent, p.offset - 1)
            }
            _ => p,
        });
        for n in doomed {
            self.nodes[n.0] = None;
        }
        self.bump();
    }

    /// Moves the attached node `id` to `index` under `to`; `index` is
    /// interpreted after `id` was detached. Points inside `id` move with it.
    pub fn move_node(&mut self, id: NodeId, to: NodeId, index: usize) {
        debug_assert!(!self.contains(id, to), "move_node into own subtree");
        if let Some((parent, old)) = self.detach_raw(id) {
            self.tracker.shift(parent, old, -1);
        }
        let index = index.min(self.children(to).len());
        self.data_mut(to).children.insert(index, id);
        self.data_mut(id).parent = Some(to);
        self.tracker.shift(to, index, 1);
        self.bump();
    }

    /// Moves every child of `from` to `index` under `to`, keeping order.
    /// Returns the number of moved nodes.
    pub fn move_children(&mut self, from: NodeId, to: NodeId, index: usize) -> usize {
        if from == to {
            return 0;
        }
        debug_assert!(!self.contains(from, to), "move_children into own subtree");
        let moved = std::mem::take(&mut self.data_mut(from).children);
        let count = moved.len();
        if count == 0 {
            return 0;
        }
        let index = index.min(self.children(to).len());
        for &child in &moved {
            self.data_mut(child).parent = Some(to);
        }
        self.data_mut(to).children.splice(index..index, moved);
        self.tracker.remap(|p| {
            if p.node == from {
                Point::new(to, index + p.offset)
            } else if p.node == to && p.offset > index {
                Point::new(to, p.offset + count)
            } else {
                p
            }
        });
        self.bump();
        count
    }

    /// Replaces `id` with its children.
    pub fn unwrap(&mut self, id: NodeId) -> Result<(), EditError> {
        let at = self.point_before(id).ok_or(EditError::NoParent(id))?;
        self.move_children(id, at.node, at.offset);
        self.remove(id);
        Ok(())
    }

    /// Puts the detached, empty element `wrapper` in place of `id` and `id`
    /// inside it.
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) -> Result<(), EditError> {
        let (parent, index) = self.detach_raw(id).ok_or(EditError::NoParent(id))?;
        self.data_mut(parent).children.insert(index, wrapper);
        self.data_mut(wrapper).parent = Some(parent);
        self.data_mut(wrapper).children.push(id);
        self.data_mut(id).parent = Some(wrapper);
        self.bump();
        Ok(())
    }

    /// Splits text node `id` at `offset`; the tail becomes a new next
    /// sibling which is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, EditError> {
        let text = self.text(id).ok_or(EditError::StaleNode(id))?;
        let at = byte_index(text, offset);
        let tail = text[at..].to_string();
        let (parent, index) = match (self.parent(id), self.index_of(id)) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(EditError::NoParent(id)),
        };
        let new = self.create_text(&tail);
        if let NodeKind::Text(content) = &mut self.data_mut(id).kind {
            content.truncate(at);
        }
        self.data_mut(parent).children.insert(index + 1, new);
        self.data_mut(new).parent = Some(parent);
        self.tracker.remap(|p| {
            if p.node == parent && p.offset > index {
                Point::new(parent, p.offset + 1)
            } else if p.node == id && p.offset > offset {
                Point::new(new, p.offset - offset)
            } else {
                p
            }
        });
        self.bump();
        Ok(new)
    }

    pub fn insert_text(&mut self, id: NodeId, offset: usize, inserted: &str) {
        if let NodeKind::Text(content) = &mut self.data_mut(id).kind {
            let at = byte_index(content, offset);
            content.insert_str(at, inserted);
            self.tracker.shift(id, offset, char_len(inserted) as isize);
            self.bump();
        }
    }

    /// Deletes the code points `start..end` of text node `id`.
    pub fn delete_text(&mut self, id: NodeId, start: usize, end: usize) {
        if start >= end {
            return;
        }
        if let NodeKind::Text(content) = &mut self.data_mut(id).kind {
            let from = byte_index(content, start);
            let to = byte_index(content, end);
            content.replace_range(from..to, "");
            self.tracker.remap(|p| {
                if p.node != id || p.offset <= start {
                    p
                } else if p.offset > end {
                    Point::new(id, p.offset - (end - start))
                } else {
                    Point::new(id, start)
                }
            });
            self.bump();
        }
    }

    /// Replaces the code point at `index` with `ch`; offsets are unchanged.
    pub fn replace_char(&mut self, id: NodeId, index: usize, ch: char) {
        if let NodeKind::Text(content) = &mut self.data_mut(id).kind {
            let from = byte_index(content, index);
            let to = byte_index(content, index + 1);
            if from < to {
                content.replace_range(from..to, ch.encode_utf8(&mut [0; 4]));
                self.bump();
            }
        }
    }

    /// Appends the content of text node `right` (the next sibling of `left`)
    /// to `left` and removes `right`.
    pub fn merge_text(&mut self, left: NodeId, right: NodeId) -> Result<(), EditError> {
        let tail = self.text(right).ok_or(EditError::StaleNode(right))?.to_string();
        let left_len = self.node_len(left);
        let (parent, index) = match (self.parent(right), self.index_of(right)) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(EditError::NoParent(right)),
        };
        if let NodeKind::Text(content) = &mut self.data_mut(left).kind {
            content.push_str(&tail);
        }
        self.data_mut(parent).children.remove(index);
        self.tracker.remap(|p| {
            if p.node == right {
                Point::new(left, left_len + p.offset)
            } else if p.node == parent && p.offset == index {
                Point::new(left, left_len)
            } else if p.node == parent && p.offset > index {
                Point::new(parent, p.offset - 1)
            } else {
                p
            }
        });
        self.nodes[right.0] = None;
        self.bump();
        Ok(())
    }

    /// Replaces element `id` with two shallow clones partitioning its
    /// children at `offset`. `id` is freed.
    pub fn split_element(
        &mut self,
        id: NodeId,
        offset: usize,
    ) -> Result<(NodeId, NodeId), EditError> {
        self.check_live(id)?;
        let (parent, index) = match (self.parent(id), self.index_of(id)) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(EditError::NoParent(id)),
        };
        let left = self.clone_shallow(id);
        let right = self.clone_shallow(id);
        let mut children = std::mem::take(&mut self.data_mut(id).children);
        let offset = offset.min(children.len());
        let tail = children.split_off(offset);
        for &c in &children {
            self.data_mut(c).parent = Some(left);
        }
        for &c in &tail {
            self.data_mut(c).parent = Some(right);
        }
        self.data_mut(left).children = children;
        self.data_mut(right).children = tail;
        self.data_mut(parent)
            .children
            .splice(index..=index, [left, right]);
        self.data_mut(left).parent = Some(parent);
        self.data_mut(right).parent = Some(parent);
        self.tracker.remap(|p| {
            if p.node == id {
                if p.offset < offset {
                    Point::new(left, p.offset)
                } else {
                    Point::new(right, p.offset - offset)
                }
            } else if p.node == parent && p.offset > index {
                Point::new(parent, p.offset + 1)
            } else {
                p
            }
        });
        self.nodes[id.0] = None;
        self.bump();
        Ok((left, right))
    }
}
