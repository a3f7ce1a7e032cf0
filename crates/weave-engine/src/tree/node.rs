use std::collections::BTreeMap;

/// Ordered attribute map of an element.
pub type Attributes = BTreeMap<String, String>;

/// Stable handle to a node in a [`crate::tree::Document`] arena.
///
/// Handles are never reused, so a handle to a removed node stays detectable
/// through [`crate::tree::Document::exists`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index, mostly useful in logs.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String, attrs: Attributes },
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn element(tag: &str, attrs: Attributes) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn text(content: &str) -> Self {
        Self {
            kind: NodeKind::Text(content.to_string()),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Number of code points in `s`; text offsets are code-point indices.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the code point at `char_index`, clamped to the end of `s`.
pub(crate) fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map_or(s.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_index_counts_code_points() {
        let s = "a\u{e9}b";
        assert_eq!(byte_index(s, 0), 0);
        assert_eq!(byte_index(s, 1), 1);
        assert_eq!(byte_index(s, 2), 3);
        assert_eq!(byte_index(s, 3), 4);
        assert_eq!(byte_index(s, 10), 4);
        assert_eq!(char_len(s), 3);
    }

    #[test]
    fn test_element_tags_are_lowercased() {
        let data = NodeData::element("STRONG", Attributes::new());
        assert!(matches!(data.kind, NodeKind::Element { ref tag, .. } if tag == "strong"));
    }
}
