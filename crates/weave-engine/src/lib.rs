pub mod editing;
pub mod error;
pub mod markup;
pub mod navigation;
pub mod policy;
pub mod position;
pub mod schema;
pub mod selection;
pub mod style;
pub mod tree;
pub mod visibility;

pub use tree::invariants;

// Re-export key types for easier usage
pub use editing::{Cmd, Deletion, EditContext, Editor, Format, HookPoint, Hooks, Patch};
pub use error::{EditError, MarkupError};
pub use navigation::{VisiblePosition, next_visible_position, previous_visible_position};
pub use policy::Policy;
pub use position::{NormalizeMode, Point, Range, Side, normalize};
pub use schema::Schema;
pub use selection::{Direction, Selection};
pub use tree::{Attributes, Document, NodeId, NodeKind};
pub use visibility::{Adjacent, classify};
