//! Compiler host over a [`SourceProvider`]

use keel_program::{CompilerHost, CompilerOptions, ScriptTarget, SourceFetch, SourceUnit, WriteError};

use crate::error::SourceError;
use crate::provider::SourceProvider;

const LIB_ES5: &str = "typescript/lib/lib.core.d.ts";
const LIB_ES2015: &str = "typescript/lib/lib.core.es6.d.ts";

/// Serves one compilation: every lookup goes to the provider on behalf of
/// `entry`, and everything written lands in one buffer.
pub struct ProviderHost<'p> {
    entry: String,
    provider: &'p dyn SourceProvider,
    output: String,
}

impl<'p> ProviderHost<'p> {
    pub fn new(entry: impl Into<String>, provider: &'p dyn SourceProvider) -> Self {
        Self {
            entry: entry.into(),
            provider,
            output: String::new(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl CompilerHost for ProviderHost<'_> {
    fn get_default_lib_file_name(&self, options: &CompilerOptions) -> String {
        let lib = match options.target {
            ScriptTarget::Es2015 => LIB_ES2015,
            ScriptTarget::Es3 | ScriptTarget::Es5 => LIB_ES5,
        };
        lib.to_string()
    }

    fn get_current_directory(&self) -> String {
        String::new()
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        true
    }

    fn get_canonical_file_name(&self, file_name: &str) -> String {
        file_name.to_string()
    }

    fn get_new_line(&self) -> String {
        platform_new_line().to_string()
    }

    fn get_source_file(&mut self, file_name: &str, _target: ScriptTarget, file_id: usize) -> SourceFetch {
        match self.provider.get_source(file_name, &self.entry) {
            Ok(text) => SourceFetch::Found(SourceUnit::parse(file_name, text, file_id)),
            Err(SourceError::NotFound) => SourceFetch::Missing,
            Err(err) => SourceFetch::Failed {
                unit: SourceUnit::parse(file_name, "", file_id),
                message: err.to_string(),
            },
        }
    }

    fn write_file(&mut self, _file_name: &str, data: &str, _write_bom: bool) -> Result<(), WriteError> {
        self.output.push_str(data);
        Ok(())
    }

    fn file_exists(&self, file_name: &str) -> bool {
        self.provider.get_source(file_name, &self.entry).is_ok()
    }
}

pub(crate) fn platform_new_line() -> &'static str {
    if cfg!(windows) {
        "\r\n"
    } else {
        "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ArtifactTree, TreeProvider};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct Recording {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl SourceProvider for Recording {
        fn get_source(&self, file_name: &str, requesting_entry: &str) -> Result<String, SourceError> {
            self.calls
                .borrow_mut()
                .push((file_name.to_string(), requesting_entry.to_string()));
            match file_name {
                "ok.ts" => Ok("let a = 1;".to_string()),
                "locked.ts" => Err(SourceError::Other { message: None }),
                _ => Err(SourceError::NotFound),
            }
        }
    }

    #[test]
    fn test_default_lib_follows_target() {
        let tree = ArtifactTree::new();
        let provider = TreeProvider::new(&tree);
        let host = ProviderHost::new("a.ts", &provider);
        let mut options = CompilerOptions::default();
        assert_eq!(host.get_default_lib_file_name(&options), "typescript/lib/lib.core.d.ts");
        options.target = ScriptTarget::Es3;
        assert_eq!(host.get_default_lib_file_name(&options), "typescript/lib/lib.core.d.ts");
        options.target = ScriptTarget::Es2015;
        assert_eq!(host.get_default_lib_file_name(&options), "typescript/lib/lib.core.es6.d.ts");
        assert_eq!(host.get_current_directory(), "");
        assert!(host.use_case_sensitive_file_names());
        assert_eq!(host.get_canonical_file_name("Src/A.ts"), "Src/A.ts");
    }

    #[test]
    fn test_fetch_outcomes() {
        let provider = Recording {
            calls: RefCell::new(Vec::new()),
        };
        let mut host = ProviderHost::new("entry.ts", &provider);

        match host.get_source_file("ok.ts", ScriptTarget::Es5, 4) {
            SourceFetch::Found(unit) => {
                assert_eq!(unit.text, "let a = 1;");
                assert_eq!(unit.file_id(), 4);
            }
            other => panic!("expected a unit, got {other:?}"),
        }
        assert!(matches!(
            host.get_source_file("nope.ts", ScriptTarget::Es5, 5),
            SourceFetch::Missing
        ));
        match host.get_source_file("locked.ts", ScriptTarget::Es5, 6) {
            SourceFetch::Failed { unit, message } => {
                assert_eq!(unit.text, "");
                assert_eq!(message, "Unknown error");
            }
            other => panic!("expected a failure, got {other:?}"),
        }

        assert!(host.file_exists("ok.ts"));
        assert!(!host.file_exists("locked.ts"));
        assert!(!host.file_exists("nope.ts"));
        assert!(provider.calls.borrow().iter().all(|(_, entry)| entry == "entry.ts"));
    }

    #[test]
    fn test_writes_append() {
        let tree = ArtifactTree::new();
        let provider = TreeProvider::new(&tree);
        let mut host = ProviderHost::new("a.ts", &provider);
        host.write_file("a.js", "var a;\n", false).unwrap();
        host.write_file("b.js", "var b;\n", true).unwrap();
        assert_eq!(host.output(), "var a;\nvar b;\n");
        assert_eq!(host.into_output(), "var a;\nvar b;\n");
    }
}
