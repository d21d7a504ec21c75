//! Line-oriented output buffer with indentation

const INDENT: &str = "    ";

#[derive(Debug, Clone)]
pub(crate) struct CodeWriter {
    output: String,
    indent: usize,
    new_line: String,
    /// Written before the next line's text, after its indentation
    prefix: Option<String>,
}

impl CodeWriter {
    pub(crate) fn new(new_line: &str, indent: usize) -> Self {
        Self {
            output: String::new(),
            indent,
            new_line: new_line.to_string(),
            prefix: None,
        }
    }

    /// Writes one line at the current indentation. `text` may span several
    /// lines when it embeds an already indented block.
    pub(crate) fn line(&mut self, text: &str) {
        self.emit_indent();
        if let Some(prefix) = self.prefix.take() {
            self.output.push_str(&prefix);
        }
        self.output.push_str(text);
        self.output.push_str(&self.new_line);
    }

    /// Appends text that already carries its own indentation and newlines.
    pub(crate) fn raw(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub(crate) fn set_prefix(&mut self, prefix: String) {
        self.prefix = Some(prefix);
    }

    fn emit_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn level(&self) -> usize {
        self.indent
    }

    pub(crate) fn indent_text(&self) -> String {
        INDENT.repeat(self.indent)
    }

    pub(crate) fn new_line(&self) -> &str {
        &self.new_line
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub(crate) fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_indented_lines() {
        let mut writer = CodeWriter::new("\r\n", 0);
        writer.line("if (a) {");
        writer.indent();
        writer.set_prefix("outer: ".to_string());
        writer.line("for (;;) {}");
        writer.dedent();
        writer.line("}");
        assert_eq!(writer.finish(), "if (a) {\r\n    outer: for (;;) {}\r\n}\r\n");
    }
}
