//! Compiling every script under a prefix of an artifact tree

use keel_program::{Diagnostic, LineIndex, ScriptTarget};
use tracing::{debug, info};

use crate::error::BatchError;
use crate::provider::{ArtifactTree, TreeProvider};
use crate::reporter::Reporter;

const DEFAULT_PREFIX: &str = ".atomist";

/// Compiles each `.ts` file below a path prefix on its own
#[derive(Debug, Clone)]
pub struct BatchCompiler {
    prefix: String,
    target: ScriptTarget,
}

impl Default for BatchCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl BatchCompiler {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target: ScriptTarget::default(),
        }
    }

    pub fn with_target(mut self, target: ScriptTarget) -> Self {
        self.target = target;
        self
    }

    /// Paths this compiler would compile, in tree order
    pub fn sources<'t>(&self, tree: &'t ArtifactTree) -> Vec<&'t str> {
        tree.files()
            .map(|(path, _)| path)
            .filter(|path| path.starts_with(&self.prefix) && path.ends_with(".ts") && !path.ends_with(".d.ts"))
            .collect()
    }

    pub fn supports(&self, tree: &ArtifactTree) -> bool {
        !self.sources(tree).is_empty()
    }

    /// Compiles every source against the unmodified `tree`
    pub fn compile(&self, tree: &ArtifactTree) -> BatchOutcome {
        let provider = TreeProvider::new(tree);
        let mut outcome = BatchOutcome {
            tree: tree.clone(),
            failures: Vec::new(),
        };

        for path in self.sources(tree) {
            let compilation = crate::run(path, &provider, self.target);
            if compilation.failed() {
                let reporter = Reporter::new(crate::host::platform_new_line());
                let frames = compilation
                    .diagnostics()
                    .map(|diagnostic| code_frame(&reporter, tree, diagnostic))
                    .collect::<Vec<_>>()
                    .join(reporter.new_line());
                debug!(file = path, "batch entry failed");
                outcome.failures.push(FileFailure {
                    file_name: path.to_string(),
                    frames,
                });
            } else {
                outcome.tree.plus(output_path(path), compilation.output);
            }
        }

        info!(
            prefix = %self.prefix,
            compiled = self.sources(tree).len() - outcome.failures.len(),
            failed = outcome.failures.len(),
            "batch compiled"
        );
        outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file_name: String,
    /// Code frames of every diagnostic, separated by blank lines
    pub frames: String,
}

/// Result of [`BatchCompiler::compile`]
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Input tree plus one `.js` file per successful compile
    pub tree: ArtifactTree,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<ArtifactTree, BatchError> {
        if self.failures.is_empty() {
            return Ok(self.tree);
        }
        let new_line = crate::host::platform_new_line();
        let message = self
            .failures
            .iter()
            .map(|failure| failure.frames.as_str())
            .collect::<Vec<_>>()
            .join(new_line);
        Err(BatchError {
            message,
            failed_files: self.failures.into_iter().map(|failure| failure.file_name).collect(),
        })
    }
}

/// `dir/Name.ts` becomes `dir/Name.js`; only the file name is touched
fn output_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/{}", name.replacen(".ts", ".js", 1)),
        None => path.replacen(".ts", ".js", 1),
    }
}

/// Diagnostic line, the source line it points at and a caret under the
/// column
fn code_frame(reporter: &Reporter, tree: &ArtifactTree, diagnostic: &Diagnostic) -> String {
    let mut frame = reporter.render_one(diagnostic);
    if let Some(file) = &diagnostic.file {
        let source_line = tree
            .find_file(&file.file_name)
            .map_or("", |text| line_text(text, file.line));
        frame.push_str(source_line);
        frame.push_str(reporter.new_line());
        frame.push_str(&" ".repeat(file.character));
        frame.push('^');
        frame.push_str(reporter.new_line());
    }
    frame
}

/// 0-based `line` of `text`, with lines broken the way diagnostic
/// positions count them (`\r\n`, `\r` or `\n`)
fn line_text(text: &str, line: usize) -> &str {
    let index = LineIndex::new(text);
    if line >= index.line_count() {
        return "";
    }
    let rest = text.get(index.line_start(line)..).unwrap_or("");
    let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    &rest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(".atomist/editors/MyEditor.ts"), ".atomist/editors/MyEditor.js");
        assert_eq!(output_path("a.tsx.d/b.ts.ts"), "a.tsx.d/b.js.ts");
        assert_eq!(output_path("top.ts"), "top.js");
    }

    #[test]
    fn test_sources_filter() {
        let tree = ArtifactTree::new()
            .with_file(".atomist/editors/A.ts", "")
            .with_file(".atomist/typings.d.ts", "")
            .with_file(".atomist/README.md", "")
            .with_file("src/B.ts", "");
        let batch = BatchCompiler::default();
        assert_eq!(batch.sources(&tree), vec![".atomist/editors/A.ts"]);
        assert!(batch.supports(&tree));
        assert!(!BatchCompiler::new("lib").supports(&tree));
    }

    #[test]
    fn test_frames_follow_diagnostic_line_breaks() {
        assert_eq!(line_text("a\rb\r\nc\nd", 1), "b");
        assert_eq!(line_text("a\rb\r\nc\nd", 3), "d");
        assert_eq!(line_text("a\n", 5), "");

        let tree = ArtifactTree::new().with_file(".atomist/A.ts", "let a = 1;\rlet b = new Missing();\n");
        let error = BatchCompiler::default().compile(&tree).into_result().unwrap_err();
        assert_eq!(
            error.to_string(),
            ".atomist/A.ts(2,13): error TS2304: Cannot find name 'Missing'.\n\
             let b = new Missing();\n\
             \x20           ^\n"
        );
    }
}
