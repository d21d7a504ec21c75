//! # Keel Program
//!
//! Ties the compiler together for a set of root files. A [`Program`] pulls
//! sources through a [`CompilerHost`], resolves imports to more files and
//! exposes diagnostics phase by phase: syntactic, global, semantic and emit.
//!
//! The host decides where sources come from, so a program can run over a
//! directory, an in-memory tree or anything else that can hand out text.

mod diagnostic;
mod host;
mod program;
mod resolver;
mod source;

pub use diagnostic::{Category, Diagnostic, DiagnosticFile, Phase};
pub use host::{CompilerHost, SourceFetch, WriteError};
pub use keel_emit::ScriptTarget;
pub use program::{EmitResult, Program};
pub use source::{LineIndex, SourceUnit};

/// Module system of the generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModuleKind {
    #[default]
    CommonJs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub module: ModuleKind,
    pub target: ScriptTarget,
    pub experimental_decorators: bool,
    /// Skip the default library; the checker falls back to its prelude
    pub no_lib: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            module: ModuleKind::CommonJs,
            target: ScriptTarget::Es5,
            experimental_decorators: true,
            no_lib: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, HashSet};

    const LIB: &str = "typescript/lib/lib.core.d.ts";

    #[derive(Default)]
    struct MemoryHost {
        files: BTreeMap<String, String>,
        unreadable: HashSet<String>,
        read_only: bool,
        fetched: Vec<String>,
        output: String,
    }

    impl MemoryHost {
        fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(name, text)| (name.to_string(), text.to_string()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl CompilerHost for MemoryHost {
        fn get_default_lib_file_name(&self, _options: &CompilerOptions) -> String {
            LIB.to_string()
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
            "\n".to_string()
        }

        fn get_source_file(&mut self, file_name: &str, _target: ScriptTarget, file_id: usize) -> SourceFetch {
            self.fetched.push(file_name.to_string());
            if self.unreadable.contains(file_name) {
                return SourceFetch::Failed {
                    unit: SourceUnit::parse(file_name, "", file_id),
                    message: "permission denied".to_string(),
                };
            }
            match self.files.get(file_name) {
                Some(text) => SourceFetch::Found(SourceUnit::parse(file_name, text.clone(), file_id)),
                None => SourceFetch::Missing,
            }
        }

        fn write_file(&mut self, _file_name: &str, data: &str, _write_bom: bool) -> Result<(), WriteError> {
            if self.read_only {
                return Err(WriteError::new("read-only"));
            }
            self.output.push_str(data);
            Ok(())
        }

        fn file_exists(&self, file_name: &str) -> bool {
            self.files.contains_key(file_name)
        }
    }

    fn names(program: &Program) -> Vec<&str> {
        program.source_files().map(|unit| unit.file_name.as_str()).collect()
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    fn roots(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_file_order() {
        let mut host = MemoryHost::with(&[
            (LIB, "interface Array<T> { length: number; }\n"),
            ("src/main.ts", "import { twice } from './math/ops';\nexport const four = twice(2);\n"),
            ("src/math/ops.ts", "import { one } from '../one';\nexport function twice(n: number) { return n * 2 * one; }\n"),
            ("src/one.ts", "export const one = 1;\n"),
        ]);
        let program = Program::create(&roots(&["src/main.ts"]), CompilerOptions::default(), &mut host);
        assert_eq!(names(&program), vec![LIB, "src/one.ts", "src/math/ops.ts", "src/main.ts"]);
        assert_eq!(
            host.fetched,
            vec![LIB, "src/main.ts", "src/math/ops.ts", "src/one.ts"]
        );
        assert_eq!(codes(&program.syntactic_diagnostics()), Vec::<u32>::new());
        assert_eq!(codes(&program.global_diagnostics()), Vec::<u32>::new());
    }

    #[test]
    fn test_program_keeps_its_options() {
        let mut host = MemoryHost::with(&[("a.ts", "let a = 1;\n")]);
        let options = CompilerOptions {
            target: ScriptTarget::Es2015,
            no_lib: true,
            ..CompilerOptions::default()
        };
        let program = Program::create(&roots(&["a.ts"]), options, &mut host);
        assert_eq!(program.options().target, ScriptTarget::Es2015);
        assert!(program.options().no_lib);
        assert_eq!(program.root_file_names(), ["a.ts".to_string()]);
        assert_eq!(host.fetched, vec!["a.ts"]);
    }

    #[test]
    fn test_node_modules_and_ambient_modules() {
        let mut host = MemoryHost::with(&[
            (".atomist/editors/Simple.ts", "import { Project } from '@atomist/rug';\nimport * as fs from 'fs';\nlet p: Project;\n"),
            ("node_modules/@atomist/rug/index.d.ts", "export interface Project { name(): string; }\n"),
            ("typings.d.ts", "declare module 'fs' { export function read(): string; }\n"),
            ("node_modules/fs.ts", "export const shadowed = true;\n"),
        ]);
        let options = CompilerOptions {
            no_lib: true,
            ..CompilerOptions::default()
        };
        let program = Program::create(&roots(&["typings.d.ts", ".atomist/editors/Simple.ts"]), options, &mut host);
        assert_eq!(
            names(&program),
            vec!["typings.d.ts", "node_modules/@atomist/rug/index.d.ts", ".atomist/editors/Simple.ts"]
        );
        assert_eq!(codes(&program.semantic_diagnostics()), Vec::<u32>::new());
    }

    #[test]
    fn test_missing_module_is_semantic() {
        let mut host = MemoryHost::with(&[("a.ts", "import { x } from './nope';\n")]);
        let program = Program::create(&roots(&["a.ts"]), CompilerOptions::default(), &mut host);
        assert_eq!(codes(&program.global_diagnostics()), Vec::<u32>::new());
        let semantic = program.semantic_diagnostics();
        assert_eq!(codes(&semantic), vec![2307]);
        assert_eq!(semantic[0].message_text("\n"), "Cannot find module './nope'.");
        let file = semantic[0].file.as_ref().unwrap();
        assert_eq!((file.file_name.as_str(), file.line, file.character), ("a.ts", 0, 18));
    }

    #[test]
    fn test_missing_root_and_unreadable_file() {
        let mut host = MemoryHost::with(&[("a.ts", "import './b';\n"), ("b.ts", "x")]);
        host.unreadable.insert("b.ts".to_string());
        let program = Program::create(&roots(&["a.ts", "gone.ts"]), CompilerOptions::default(), &mut host);
        let global = program.global_diagnostics();
        assert_eq!(codes(&global), vec![5012, 6053]);
        assert_eq!(global[0].message_text("\n"), "Cannot read file 'b.ts': permission denied.");
        assert_eq!(global[1].message_text("\n"), "File 'gone.ts' not found.");
        assert!(global.iter().all(|d| d.file.is_none() && d.phase == Phase::Global));
        assert_eq!(names(&program), vec!["b.ts", "a.ts"]);
    }

    #[test]
    fn test_reference_directives_are_fetched_directly() {
        let mut host = MemoryHost::with(&[
            ("src/a.ts", "/// <reference path=\"types/b.d.ts\" />\n/// <reference path=\"../c.ts\" />\n/// <reference path=\"gone.ts\" />\nlet a = VERSION;\n"),
            ("src/types/b.d.ts", "declare var VERSION: string;\n"),
        ]);
        host.unreadable.insert("c.ts".to_string());
        let program = Program::create(&roots(&["src/a.ts"]), CompilerOptions::default(), &mut host);
        let global = program.global_diagnostics();
        assert_eq!(codes(&global), vec![5012, 6053]);
        assert_eq!(global[0].message_text("\n"), "Cannot read file 'c.ts': permission denied.");
        assert_eq!(global[1].message_text("\n"), "File 'src/gone.ts' not found.");
        assert_eq!(names(&program), vec!["src/types/b.d.ts", "c.ts", "src/a.ts"]);
        assert_eq!(codes(&program.semantic_diagnostics()), Vec::<u32>::new());
    }

    #[test]
    fn test_syntax_errors_are_positioned() {
        let mut host = MemoryHost::with(&[("a.ts", "let ok = 1;\nlet = ;\n")]);
        let program = Program::create(&roots(&["a.ts"]), CompilerOptions::default(), &mut host);
        let syntactic = program.syntactic_diagnostics();
        assert!(!syntactic.is_empty());
        let file = syntactic[0].file.as_ref().unwrap();
        assert_eq!(file.line, 1);
        assert_eq!(syntactic[0].phase, Phase::Syntactic);
    }

    #[test]
    fn test_emit_skips_declarations() {
        let mut host = MemoryHost::with(&[
            ("main.ts", "import { helper } from './helper';\nhelper();\n"),
            ("helper.ts", "export function helper() {}\n"),
            ("types.d.ts", "declare var VERSION: string;\n"),
        ]);
        let program = Program::create(&roots(&["types.d.ts", "main.ts"]), CompilerOptions::default(), &mut host);
        let result = program.emit(&mut host);
        assert_eq!(result.diagnostics, vec![]);
        assert_eq!(result.emitted_files, vec!["helper.js", "main.js"]);
        assert!(host.output.contains("function helper() { }\nexports.helper = helper;\n"));
        assert!(host.output.ends_with("var helper_1 = require(\"./helper\");\nhelper_1.helper();\n"));
    }

    #[test]
    fn test_emit_reports_write_failures_and_downlevel_errors() {
        let mut host = MemoryHost::with(&[("gen.ts", "function* numbers() { yield 1; }\n")]);
        host.read_only = true;
        let program = Program::create(&roots(&["gen.ts"]), CompilerOptions::default(), &mut host);
        let result = program.emit(&mut host);
        assert_eq!(codes(&result.diagnostics), vec![1220, 5033]);
        assert_eq!(
            result.diagnostics[1].message_text("\n"),
            "Could not write file 'gen.js': read-only."
        );
        assert!(result.emitted_files.is_empty());
    }
}
