use crate::selection::Selection;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Whether the tree changed structurally (undo recorders skip no-ops)
    pub changed: bool,
    pub selection: Selection,
    pub version: u64,
}
