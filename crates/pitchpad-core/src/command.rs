//! Editor commands reachable from the keyboard.
//!
//! ## Learning: Exhaustive Enums
//!
//! The command set of this core is small and closed, so a plain enum with
//! exhaustive matches beats a dynamic registry: adding a variant makes
//! every dispatch site fail to compile until it handles the new case.

/// Built-in editor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Step back one history snapshot.
    Undo,
    /// Step forward one history snapshot.
    Redo,
    /// Empty the editor and all tracked spans.
    ClearAll,
    /// Delete the word before the caret.
    DeleteWordBackward,
}

impl Command {
    /// Returns the command's display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::ClearAll => "Clear All",
            Command::DeleteWordBackward => "Delete Word Backward",
        }
    }

    /// Parses a command identifier as used in config key bindings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "editor.undo" => Some(Command::Undo),
            "editor.redo" => Some(Command::Redo),
            "editor.clearAll" => Some(Command::ClearAll),
            "editor.deleteWordBackward" => Some(Command::DeleteWordBackward),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_name() {
        assert_eq!(Command::Undo.display_name(), "Undo");
        assert_eq!(Command::ClearAll.display_name(), "Clear All");
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("editor.undo"), Some(Command::Undo));
        assert_eq!(
            Command::parse("editor.deleteWordBackward"),
            Some(Command::DeleteWordBackward)
        );
        assert_eq!(Command::parse("editor.unknown"), None);
    }
}
