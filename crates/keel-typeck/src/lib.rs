//! # Keel Type Checker
//!
//! Semantic checking for the TypeScript subset the keel compiler accepts.
//! Errors carry the TypeScript diagnostic code and message text so hosts can
//! report them the way `tsc` would.

mod builtins;
mod checker;
mod decl_checker;
mod env;
mod error;
mod expr_checker;
mod helpers;
mod stmt_checker;
mod types;

use std::collections::HashMap;

pub use checker::TypeChecker;
pub use env::{ModuleExports, Symbol, SymbolKind, TypeEnv};
pub use error::{TypeError, TypeErrorKind};
pub use helpers::TypeHelpers;
pub use types::{LiteralType, ParamSig, PropertySig, Shape, Signature, Type};

use keel_ast::Program;

/// Role of a file in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Default library; supplies globals, never reports errors
    Library,
    /// `.d.ts` file
    Declaration,
    /// `.ts` or `.tsx` source
    Source,
}

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub experimental_decorators: bool,
}

/// One parsed file handed to the checker.
#[derive(Debug, Clone)]
pub struct CheckFile<'a> {
    pub program: &'a Program,
    pub kind: FileKind,
    /// Module specifier -> `file_id` of the file it resolved to
    pub resolved_modules: HashMap<String, usize>,
}

impl<'a> CheckFile<'a> {
    pub fn source(program: &'a Program) -> Self {
        Self {
            program,
            kind: FileKind::Source,
            resolved_modules: HashMap::new(),
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Checks a set of files as one program, in order. Errors are sorted by
/// file order, then position.
pub fn check_files(files: &[CheckFile<'_>], options: &CheckOptions) -> Vec<TypeError> {
    TypeChecker::new(options.clone()).check_files(files)
}

/// Checks a single file against the built-in prelude.
pub fn check_program(program: &Program) -> Vec<TypeError> {
    let options = CheckOptions {
        experimental_decorators: true,
    };
    check_files(&[CheckFile::source(program)], &options)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn check_source(source: &str) -> Vec<TypeError> {
        let (program, parse_errors) = keel_parser::parse(source, 0);
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
        check_program(&program)
    }

    pub fn codes(source: &str) -> Vec<u32> {
        check_source(source).iter().map(TypeError::code).collect()
    }

    pub fn messages(source: &str) -> Vec<String> {
        check_source(source).iter().map(TypeError::message).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_support::{check_source, codes, messages};
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str, file_id: usize) -> Program {
        let (program, errors) = keel_parser::parse(source, file_id);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        program
    }

    #[test]
    fn test_assignment_message_and_position() {
        let errors = check_source("const x: number = 'bad';\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), 2322);
        assert_eq!(errors[0].message(), "Type 'string' is not assignable to type 'number'.");
        assert_eq!(errors[0].span.start, 6);
    }

    #[test]
    fn test_literal_targets_keep_literal_sources() {
        let source = "type Mode = 'a' | 'b';\nconst m: Mode = 'c';\n";
        assert_eq!(
            messages(source),
            vec!["Type '\"c\"' is not assignable to type 'Mode'.".to_string()]
        );
        let source = "type Id = string | number;\nfunction find(id: Id) {}\nfind(true);\nconst plain: string | number = false;\n";
        assert_eq!(
            messages(source),
            vec![
                "Argument of type 'boolean' is not assignable to parameter of type 'Id'.".to_string(),
                "Type 'boolean' is not assignable to type 'Id'.".to_string(),
            ]
        );
    }

    #[test]
    fn test_valid_class_program() {
        let source = r#"
interface Shape {
    area(): number;
}

abstract class Base implements Shape {
    constructor(protected name: string) {}
    abstract area(): number;
    describe(): string {
        return this.name + ': ' + this.area();
    }
}

class Square extends Base {
    static count = 0;
    constructor(private side: number) {
        super('square');
        Square.count++;
    }
    area(): number {
        return this.side * this.side;
    }
}

enum Color { Red, Green = 2, Blue = Green + 1 }

namespace Util {
    export function twice(n: number): number {
        return n * 2;
    }
}

const shapes: Shape[] = [new Square(2)];
for (const s of shapes) {
    console.log(s.area(), Util.twice(Color.Blue));
}
"#;
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn test_overriding_method_replaces_inherited_one() {
        let source = "class Base {\n    area(): number { return 0; }\n}\nclass Sq extends Base {\n    area(): number { return 1; }\n}\nconst s: Base = new Sq();\nconst n: number = s.area();\nconst m: number = new Sq().area();\n";
        assert_eq!(check_source(source), vec![]);
    }

    #[test]
    fn test_redeclarations() {
        assert_eq!(codes("let a = 1;\nlet a = 2;\n"), vec![2451, 2451]);
        assert_eq!(codes("class A {}\nclass A {}\n"), vec![2300, 2300]);
        assert_eq!(codes("var v = 1;\nvar v = 2;\ninterface I {}\ninterface I {}\n"), Vec::<u32>::new());
    }

    #[test]
    fn test_interface_members() {
        let source = "interface P { x: number; y?: string; }\nconst p: P = { x: 1 };\np.z;\nconst q: P = { y: 'a' };\n";
        assert_eq!(codes(source), vec![2339, 2322]);
    }

    #[test]
    fn test_decorators_need_flag() {
        let source = "function d(target: any) {}\n@d\nclass C {}\n";
        let (program, _) = keel_parser::parse(source, 0);
        let errors = check_files(&[CheckFile::source(&program)], &CheckOptions::default());
        assert_eq!(errors.iter().map(TypeError::code).collect::<Vec<_>>(), vec![1219]);
        assert!(check_program(&program).is_empty());
    }

    #[test]
    fn test_modules_across_files() {
        let lib = parse("export const answer = 42;\nexport interface Point { x: number; }\n", 0);
        let main = parse(
            "import { answer, Point, missing } from './lib';\nimport * as other from './nope';\nconst p: Point = { x: answer };\n",
            1,
        );

        let files = vec![
            CheckFile::source(&lib),
            CheckFile {
                program: &main,
                kind: FileKind::Source,
                resolved_modules: HashMap::from([("./lib".to_string(), 0)]),
            },
        ];
        let errors = check_files(&files, &CheckOptions::default());
        let found: Vec<(u32, usize)> = errors.iter().map(|e| (e.code(), e.span.file_id)).collect();
        assert_eq!(found, vec![(2305, 1), (2307, 1)]);
    }

    #[test]
    fn test_ambient_modules_and_globals() {
        let decls = parse(
            "declare module 'fs' {\n    export function readFileSync(path: string): string;\n}\ndeclare module 'untyped';\ndeclare var VERSION: string;\n",
            0,
        );
        let main = parse(
            "import { readFileSync } from 'fs';\nimport * as u from 'untyped';\nconst text: string = readFileSync(VERSION);\nu.anything();\nreadFileSync(1);\n",
            1,
        );
        let files = vec![
            CheckFile {
                program: &decls,
                kind: FileKind::Declaration,
                resolved_modules: HashMap::new(),
            },
            CheckFile::source(&main),
        ];
        let errors = check_files(&files, &CheckOptions::default());
        assert_eq!(errors.iter().map(TypeError::code).collect::<Vec<_>>(), vec![2345]);
    }

    #[test]
    fn test_library_errors_are_silent() {
        let lib = parse("declare var nothing: Missing;\ninterface Array<T> { length: number; }\n", 0);
        let main = parse("const n: number = 1;\nlet s: string = n;\n", 1);
        let files = vec![
            CheckFile {
                program: &lib,
                kind: FileKind::Library,
                resolved_modules: HashMap::new(),
            },
            CheckFile::source(&main),
        ];
        let errors = check_files(&files, &CheckOptions::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span.file_id, 1);
    }
}
