use crate::tree::NodeId;

/// Integration errors raised by the kernel.
///
/// Expected no-op outcomes (nothing to delete, a refused merge, no visible
/// position left) are reported through `Option`/`Patch::changed` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Point {node:?}@{offset} is outside the document")]
    OutOfBounds { node: NodeId, offset: usize },
    #[error("Node handle {0:?} no longer exists")]
    StaleNode(NodeId),
    #[error("Node {0:?} has no parent to split into")]
    NoParent(NodeId),
    #[error("Node {node:?} is not inside split limit {limit:?}")]
    OutsideLimit { node: NodeId, limit: NodeId },
}

/// Errors produced while reading debug markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("Malformed tag at byte {0}")]
    MalformedTag(usize),
    #[error("Unexpected closing tag </{tag}> at byte {at}")]
    UnexpectedClose { tag: String, at: usize },
    #[error("Unclosed element <{0}>")]
    Unclosed(String),
    #[error("Selection marker '{0}' appears more than once")]
    DuplicateMarker(char),
}
