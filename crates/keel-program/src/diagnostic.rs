//! Program diagnostics

use std::fmt;

use crate::source::SourceUnit;

/// Step of a compilation that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Syntactic,
    Global,
    Semantic,
    Emit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Syntactic => "syntactic",
            Phase::Global => "global",
            Phase::Semantic => "semantic",
            Phase::Emit => "emit",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Error,
    Warning,
    Message,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Message => "message",
        };
        write!(f, "{}", name)
    }
}

/// Where in a file a diagnostic points. `line` and `character` are 0-based
/// and derived from the file's line index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticFile {
    pub file_name: String,
    pub start: usize,
    pub length: usize,
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub file: Option<DiagnosticFile>,
    pub category: Category,
    pub code: u32,
    /// Head message followed by any elaborations
    pub message_chain: Vec<String>,
}

impl Diagnostic {
    /// Error not tied to a file position
    pub fn global(phase: Phase, code: u32, message: impl Into<String>) -> Self {
        Self {
            phase,
            file: None,
            category: Category::Error,
            code,
            message_chain: vec![message.into()],
        }
    }

    /// Error at `start..start + length` in `unit`
    pub fn in_file(
        phase: Phase,
        unit: &SourceUnit,
        start: usize,
        length: usize,
        code: u32,
        message: impl Into<String>,
    ) -> Self {
        let (line, character) = unit.line_and_character(start);
        Self {
            phase,
            file: Some(DiagnosticFile {
                file_name: unit.file_name.clone(),
                start,
                length,
                line,
                character,
            }),
            category: Category::Error,
            code,
            message_chain: vec![message.into()],
        }
    }

    /// Message chain joined with `new_line`
    pub fn message_text(&self, new_line: &str) -> String {
        self.message_chain.join(new_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_in_file_position() {
        let unit = SourceUnit::parse("a.ts", "\nconst x = 1;", 0);
        let diagnostic = Diagnostic::in_file(Phase::Semantic, &unit, 7, 1, 2322, "bad");
        let file = diagnostic.file.unwrap();
        assert_eq!((file.line, file.character), (1, 6));
        assert_eq!(diagnostic.category.to_string(), "error");
    }

    #[test]
    fn test_message_chain() {
        let mut diagnostic = Diagnostic::global(Phase::Global, 5012, "head");
        diagnostic.message_chain.push("detail".to_string());
        assert_eq!(diagnostic.message_text("\n"), "head\ndetail");
        assert_eq!(diagnostic.phase.to_string(), "global");
    }
}
