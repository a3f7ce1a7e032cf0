//! Structural policy predicates.
//!
//! Built-in rules cover the document root and the `data-unremovable`,
//! `data-unmergeable` and `data-unbreakable` attributes. Feature plugins
//! register further predicates; any predicate answering `true` wins.

use crate::tree::{Document, NodeId};

pub const UNREMOVABLE_ATTR: &str = "data-unremovable";
pub const UNMERGEABLE_ATTR: &str = "data-unmergeable";
pub const UNBREAKABLE_ATTR: &str = "data-unbreakable";

/// `(document, node, root of the operation)`
pub type RemovablePredicate = Box<dyn Fn(&Document, NodeId, Option<NodeId>) -> bool>;
pub type NodePredicate = Box<dyn Fn(&Document, NodeId) -> bool>;

#[derive(Default)]
pub struct Policy {
    unremovable: Vec<RemovablePredicate>,
    unmergeable: Vec<NodePredicate>,
    unsplittable: Vec<NodePredicate>,
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("unremovable", &self.unremovable.len())
            .field("unmergeable", &self.unmergeable.len())
            .field("unsplittable", &self.unsplittable.len())
            .finish()
    }
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unremovable(
        &mut self,
        predicate: impl Fn(&Document, NodeId, Option<NodeId>) -> bool + 'static,
    ) {
        self.unremovable.push(Box::new(predicate));
    }

    pub fn add_unmergeable(&mut self, predicate: impl Fn(&Document, NodeId) -> bool + 'static) {
        self.unmergeable.push(Box::new(predicate));
    }

    pub fn add_unsplittable(&mut self, predicate: impl Fn(&Document, NodeId) -> bool + 'static) {
        self.unsplittable.push(Box::new(predicate));
    }

    /// Unmergeable nodes are always unremovable.
    pub fn is_unremovable(&self, doc: &Document, node: NodeId, root: Option<NodeId>) -> bool {
        node == doc.root()
            || Some(node) == root
            || doc.has_attr(node, UNREMOVABLE_ATTR)
            || self.is_unmergeable(doc, node)
            || self.unremovable.iter().any(|p| p(doc, node, root))
    }

    pub fn is_unmergeable(&self, doc: &Document, node: NodeId) -> bool {
        (doc.is_element(node) && doc.has_attr(node, UNMERGEABLE_ATTR))
            || self.unmergeable.iter().any(|p| p(doc, node))
    }

    /// Blocks that receive a line break instead of a structural split.
    pub fn is_unsplittable(&self, doc: &Document, node: NodeId) -> bool {
        self.is_unremovable(doc, node, None)
            || doc.has_attr(node, UNBREAKABLE_ATTR)
            || self.unsplittable.iter().any(|p| p(doc, node))
    }

    /// Whether `node` or anything below it is unremovable.
    pub fn has_unremovable(&self, doc: &Document, node: NodeId, root: Option<NodeId>) -> bool {
        self.is_unremovable(doc, node, root)
            || doc
                .descendants(node)
                .into_iter()
                .any(|n| self.is_unremovable(doc, n, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;

    #[test]
    fn test_builtin_attributes() {
        let doc = markup::parse(
            r#"<p data-unremovable="">a</p><p data-unmergeable="">b</p><p data-unbreakable="">c</p><p>d</p>"#,
        )
        .unwrap();
        let policy = Policy::new();
        let blocks = doc.children(doc.root()).to_vec();

        assert!(policy.is_unremovable(&doc, blocks[0], None));
        assert!(!policy.is_unmergeable(&doc, blocks[0]));
        assert!(policy.is_unmergeable(&doc, blocks[1]));
        assert!(policy.is_unremovable(&doc, blocks[1], None));
        assert!(policy.is_unsplittable(&doc, blocks[2]));
        assert!(!policy.is_unremovable(&doc, blocks[2], None));
        assert!(!policy.is_unremovable(&doc, blocks[3], None));
        assert!(policy.is_unremovable(&doc, doc.root(), None));
    }

    #[test]
    fn test_registered_predicates() {
        let doc = markup::parse("<ul><li>a</li></ul><p>b</p>").unwrap();
        let mut policy = Policy::new();
        policy.add_unremovable(|doc, node, _| doc.has_tag(node, "ul"));
        let ul = doc.first_child(doc.root()).unwrap();
        let li = doc.first_child(ul).unwrap();

        assert!(policy.is_unremovable(&doc, ul, None));
        assert!(!policy.is_unremovable(&doc, li, None));
        assert!(policy.has_unremovable(&doc, ul, None));
        assert!(!policy.has_unremovable(&doc, li, None));
    }
}
