//! Parsed source files

use keel_ast::Program as Ast;
use keel_parser::ParseError;

/// Byte offsets at which each line starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 1;
                }
                b'\r' | b'\n' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { line_starts }
    }

    /// 0-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(0)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// One file as the program sees it: text, syntax tree and parse errors
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub file_name: String,
    pub text: String,
    pub ast: Ast,
    pub parse_diagnostics: Vec<ParseError>,
    /// `.d.ts` files are checked but never emitted
    pub is_declaration: bool,
    file_id: usize,
    line_index: LineIndex,
}

impl SourceUnit {
    /// Parses `text`; every span in the tree carries `file_id`.
    pub fn parse(file_name: &str, text: impl Into<String>, file_id: usize) -> Self {
        let text = text.into();
        let (ast, parse_diagnostics) = keel_parser::parse(&text, file_id);
        Self {
            file_name: file_name.to_string(),
            line_index: LineIndex::new(&text),
            is_declaration: file_name.ends_with(".d.ts"),
            text,
            ast,
            parse_diagnostics,
            file_id,
        }
    }

    pub fn file_id(&self) -> usize {
        self.file_id
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// 0-based line and character of a byte offset. Characters are counted
    /// in UTF-16 units.
    pub fn line_and_character(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self.line_index.line_of(offset);
        let start = self.line_index.line_start(line);
        let character = self
            .text
            .get(start..offset)
            .map_or(0, |prefix| prefix.encode_utf16().count());
        (line, character)
    }

    /// Text of a 0-based line without its terminator
    pub fn line_text(&self, line: usize) -> &str {
        let start = self.line_index.line_start(line);
        let rest = self.text.get(start..).unwrap_or("");
        let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_and_character() {
        let unit = SourceUnit::parse("a.ts", "let a = 1;\r\nlet b = 'é';\nlet c;", 3);
        assert_eq!(unit.file_id(), 3);
        assert_eq!(unit.line_index().line_count(), 3);
        assert_eq!(unit.line_and_character(0), (0, 0));
        assert_eq!(unit.line_and_character(16), (1, 4));
        let c = unit.text.find("c;").unwrap();
        assert_eq!(unit.line_and_character(c), (2, 4));
        assert_eq!(unit.line_text(1), "let b = 'é';");
        assert_eq!(unit.line_text(2), "let c;");
    }

    #[test]
    fn test_declaration_flag() {
        assert!(SourceUnit::parse("lib.d.ts", "declare var x: number;", 0).is_declaration);
        assert!(!SourceUnit::parse("a.ts", "", 0).is_declaration);
    }
}
