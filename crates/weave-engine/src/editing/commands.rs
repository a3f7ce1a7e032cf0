use serde::{Deserialize, Serialize};

use super::Format;

/// Edit commands understood by [`super::Editor::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmd {
    /// Remove the selected content; no-op on a collapsed selection.
    DeleteSelection,
    /// Backspace.
    DeleteBackward,
    /// Forward delete.
    DeleteForward,
    /// Enter: split the current block at the cursor.
    SplitBlock,
    ToggleFormat(Format),
}

impl Cmd {
    /// Parses the short command names used by fixtures and the CLI.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "delete" | "delete-selection" => Cmd::DeleteSelection,
            "backspace" | "delete-backward" => Cmd::DeleteBackward,
            "delete-forward" => Cmd::DeleteForward,
            "enter" | "split-block" => Cmd::SplitBlock,
            "bold" => Cmd::ToggleFormat(Format::Bold),
            "italic" => Cmd::ToggleFormat(Format::Italic),
            "underline" => Cmd::ToggleFormat(Format::Underline),
            "strike" | "strikethrough" => Cmd::ToggleFormat(Format::StrikeThrough),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        assert_eq!(Cmd::from_name("backspace"), Some(Cmd::DeleteBackward));
        assert_eq!(Cmd::from_name("enter"), Some(Cmd::SplitBlock));
        assert_eq!(
            Cmd::from_name("strike"),
            Some(Cmd::ToggleFormat(Format::StrikeThrough))
        );
        assert_eq!(Cmd::from_name("paste"), None);
    }
}
