//! One-line diagnostic rendering

use keel_program::Diagnostic;

/// Renders diagnostics as `file(line,col): category TS<code>: message`
#[derive(Debug, Clone)]
pub struct Reporter {
    new_line: String,
}

impl Reporter {
    pub fn new(new_line: impl Into<String>) -> Self {
        Self {
            new_line: new_line.into(),
        }
    }

    pub fn new_line(&self) -> &str {
        &self.new_line
    }

    /// One diagnostic, terminated by the newline. Positions are 1-based.
    pub fn render_one(&self, diagnostic: &Diagnostic) -> String {
        let mut line = String::new();
        if let Some(file) = &diagnostic.file {
            line.push_str(&format!(
                "{}({},{}): ",
                file.file_name,
                file.line + 1,
                file.character + 1
            ));
        }
        line.push_str(&format!(
            "{} TS{}: {}{}",
            diagnostic.category,
            diagnostic.code,
            diagnostic.message_text(&self.new_line),
            self.new_line
        ));
        line
    }

    pub fn render_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics.iter().map(|d| self.render_one(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_program::{Category, DiagnosticFile, Phase};
    use pretty_assertions::assert_eq;

    fn at(line: usize, character: usize) -> Diagnostic {
        Diagnostic {
            phase: Phase::Semantic,
            file: Some(DiagnosticFile {
                file_name: "src/a.ts".to_string(),
                start: 0,
                length: 1,
                line,
                character,
            }),
            category: Category::Error,
            code: 2304,
            message_chain: vec!["Cannot find name 'x'.".to_string()],
        }
    }

    #[test]
    fn test_origin_renders_one_based() {
        let reporter = Reporter::new("\n");
        assert_eq!(
            reporter.render_one(&at(0, 0)),
            "src/a.ts(1,1): error TS2304: Cannot find name 'x'.\n"
        );
    }

    #[test]
    fn test_global_and_chained() {
        let reporter = Reporter::new("\r\n");
        let mut diagnostic = Diagnostic::global(Phase::Global, 5012, "Cannot read file 'b.ts': denied.");
        diagnostic.category = Category::Warning;
        diagnostic.message_chain.push("  while loading a.ts".to_string());
        assert_eq!(
            reporter.render_one(&diagnostic),
            "warning TS5012: Cannot read file 'b.ts': denied.\r\n  while loading a.ts\r\n"
        );
    }

    #[test]
    fn test_render_all_keeps_order() {
        let reporter = Reporter::new("\n");
        let rendered = reporter.render_all(&[at(3, 9), at(0, 4)]);
        assert_eq!(
            rendered,
            "src/a.ts(4,10): error TS2304: Cannot find name 'x'.\nsrc/a.ts(1,5): error TS2304: Cannot find name 'x'.\n"
        );
        assert_eq!(reporter.render_all(&[]), "");
    }
}
