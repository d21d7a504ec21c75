//! # Keel Emitter
//!
//! Turns a parsed TypeScript file into JavaScript. Types are erased and,
//! below ES2015, newer syntax is rewritten: classes become constructor
//! functions, arrows capture `_this`, destructuring and default parameters
//! expand into plain statements. Modules compile to CommonJS.
//!
//! Constructs the chosen target cannot express are emitted as written and
//! reported through [`EmitOutput::diagnostics`].

mod decl;
mod emitter;
mod error;
mod expr;
mod helpers;
mod scan;
mod stmt;
mod writer;

use std::fmt;
use std::str::FromStr;

use keel_ast::Program;

pub use error::{EmitError, EmitErrorKind};

/// ECMAScript version of the generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptTarget {
    Es3,
    #[default]
    Es5,
    Es2015,
}

impl FromStr for ScriptTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es3" => Ok(ScriptTarget::Es3),
            "es5" => Ok(ScriptTarget::Es5),
            "es2015" | "es6" => Ok(ScriptTarget::Es2015),
            other => Err(format!("unknown target '{other}'")),
        }
    }
}

impl fmt::Display for ScriptTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptTarget::Es3 => "es3",
            ScriptTarget::Es5 => "es5",
            ScriptTarget::Es2015 => "es2015",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub target: ScriptTarget,
    /// Line terminator written after every line
    pub new_line: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            target: ScriptTarget::Es5,
            new_line: "\n".to_string(),
        }
    }
}

/// Generated text plus the constructs the target could not express
#[derive(Debug, Clone, PartialEq)]
pub struct EmitOutput {
    pub text: String,
    pub diagnostics: Vec<EmitError>,
}

// =============================================================================
// Public API
// =============================================================================

/// Emits one file. Import bindings that are only used as types are elided.
pub fn emit_program(program: &Program, options: &EmitOptions) -> EmitOutput {
    emitter::Emitter::new(program, options).emit_program(program)
}

/// `src/a.ts` -> `src/a.js`
pub fn output_file_name(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".tsx")
        .or_else(|| file_name.strip_suffix(".ts"))
        .unwrap_or(file_name);
    format!("{stem}.js")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emit_with(source: &str, target: ScriptTarget) -> EmitOutput {
        let (program, errors) = keel_parser::parse(source, 0);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        let options = EmitOptions {
            target,
            ..EmitOptions::default()
        };
        emit_program(&program, &options)
    }

    fn emit(source: &str) -> String {
        let output = emit_with(source, ScriptTarget::Es5);
        assert_eq!(output.diagnostics, vec![]);
        output.text
    }

    fn codes(source: &str, target: ScriptTarget) -> Vec<u32> {
        emit_with(source, target).diagnostics.iter().map(EmitError::code).collect()
    }

    #[test]
    fn test_target_names() {
        assert_eq!("ES6".parse::<ScriptTarget>(), Ok(ScriptTarget::Es2015));
        assert_eq!("es3".parse::<ScriptTarget>(), Ok(ScriptTarget::Es3));
        assert!("es2017".parse::<ScriptTarget>().is_err());
        assert_eq!(ScriptTarget::default().to_string(), "es5");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("src/a.ts"), "src/a.js");
        assert_eq!(output_file_name("view.tsx"), "view.js");
        assert_eq!(output_file_name("plain"), "plain.js");
    }

    #[test]
    fn test_es5_class() {
        let source = r#"
class Greeter {
    constructor(private greeting: string) {}
    greet(): string {
        return "Hello, " + this.greeting;
    }
}
"#;
        let expected = r#"var Greeter = (function () {
    function Greeter(greeting) {
        this.greeting = greeting;
    }
    Greeter.prototype.greet = function () {
        return "Hello, " + this.greeting;
    };
    return Greeter;
})();
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_derived_class_and_super() {
        let source = r#"
class Base {
    describe() { return "base"; }
}
class Derived extends Base {
    static create() { return new Derived(); }
    describe() { return super.describe() + "!"; }
}
"#;
        let text = emit(source);
        assert!(text.starts_with("var __extends = "), "{text}");
        assert!(text.contains("var Derived = (function (_super) {\n    __extends(Derived, _super);\n"));
        assert!(text.contains("    function Derived() {\n        _super.apply(this, arguments);\n    }\n"));
        assert!(text.contains("return _super.prototype.describe.call(this) + \"!\";"));
        assert!(text.contains("})(Base);\n"));
    }

    #[test]
    fn test_module_imports_and_exports() {
        let source = r#"
import { readFile, Unused } from "./util/file-utils";
import * as path from "path";
import Thing from "thing";
import { OnlyType } from "./types";
export const answer = readFile(path.sep);
export function run(x: OnlyType) {
    return new Thing(answer, x);
}
"#;
        let expected = r#""use strict";
var file_utils_1 = require("./util/file-utils");
var path = require("path");
var thing_1 = require("thing");
exports.answer = file_utils_1.readFile(path.sep);
function run(x) {
    return new thing_1.default(exports.answer, x);
}
exports.run = run;
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_reexports() {
        let source = "export * from \"./a\";\nexport { b as c } from \"./b\";\nexport default 42;\n";
        let text = emit(source);
        assert!(text.contains("function __export(m) {"));
        assert!(text.contains("__export(require(\"./a\"));\nvar b_1 = require(\"./b\");\nexports.c = b_1.b;\nexports.default = 42;\n"));
    }

    #[test]
    fn test_enum() {
        let source = "enum Color { Red, Green = 4, Blue }\nlet c = Color.Blue;\n";
        let expected = r#"var Color;
(function (Color) {
    Color[Color["Red"] = 0] = "Red";
    Color[Color["Green"] = 4] = "Green";
    Color[Color["Blue"] = 5] = "Blue";
})(Color || (Color = {}));
var c = Color.Blue;
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_namespace() {
        let source = r#"
namespace Geometry {
    export const unit = 1;
    export function double(n: number) {
        return n * 2 * unit;
    }
}
namespace Types {
    export interface Point { x: number; }
}
"#;
        let expected = r#"var Geometry;
(function (Geometry) {
    Geometry.unit = 1;
    function double(n) {
        return n * 2 * Geometry.unit;
    }
    Geometry.double = double;
})(Geometry || (Geometry = {}));
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_arrow_captures_this() {
        let source = r#"
class Counter {
    count = 0;
    start() {
        setTimeout(() => this.count++, 10);
    }
}
"#;
        let expected = r#"var Counter = (function () {
    function Counter() {
        this.count = 0;
    }
    Counter.prototype.start = function () {
        var _this = this;
        setTimeout(function () { return _this.count++; }, 10);
    };
    return Counter;
})();
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_template_and_for_of() {
        let source = r#"
const names = ["a", "b"];
for (const name of names) {
    console.log(`hello ${name}!`);
}
"#;
        let expected = r#"var names = ["a", "b"];
for (var _i = 0, names_1 = names; _i < names_1.length; _i++) {
    var name = names_1[_i];
    console.log("hello " + name + "!");
}
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_default_and_rest_parameters() {
        let source = r#"
function greet(greeting = "hi", ...names: string[]) {
    return greeting + names.join(", ");
}
"#;
        let expected = r#"function greet(greeting) {
    if (greeting === void 0) { greeting = "hi"; }
    var names = [];
    for (var _i = 1; _i < arguments.length; _i++) {
        names[_i - 1] = arguments[_i];
    }
    return greeting + names.join(", ");
}
"#;
        assert_eq!(emit(source), expected);
    }

    #[test]
    fn test_spread_and_nullish() {
        let source = "const merged = { ...base, extra: 1 };\nconst name = user?.name ?? \"anon\";\nf(...args);\n";
        let text = emit(source);
        assert!(text.starts_with("var __assign = "), "{text}");
        assert!(text.contains("var _a;\n"));
        assert!(text.contains("var merged = __assign({}, base, { extra: 1 });\n"));
        assert!(text.contains(
            "var name = (_a = (user === null || user === void 0 ? void 0 : user.name)) !== null && _a !== void 0 ? _a : \"anon\";\n"
        ));
        assert!(text.contains("f.apply(void 0, args);\n"));
    }

    #[test]
    fn test_decorators() {
        let source = r#"
function Editor(name: string) { return (target: any) => target; }
function Parameter(target: any, key: string) {}
@Editor("simple")
class SimpleEditor {
    @Parameter
    pattern: string;
}
"#;
        let text = emit(source);
        assert!(text.contains("var SimpleEditor = (function () {"));
        assert!(text.contains("    __decorate([\n        Parameter\n    ], SimpleEditor.prototype, \"pattern\", void 0);\n"));
        assert!(text.contains("    SimpleEditor = __decorate([\n        Editor(\"simple\")\n    ], SimpleEditor);\n"));
    }

    #[test]
    fn test_unsupported_constructs_are_reported() {
        let source = "async function load() {}\nfunction* gen() {}\nconst [[a]] = [[1]];\nnew Foo(...args);\n";
        assert_eq!(codes(source, ScriptTarget::Es5), vec![1311, 1220, 1312, 1313]);
        assert_eq!(codes(source, ScriptTarget::Es2015), Vec::<u32>::new());
        assert_eq!(codes("let o = { get x() { return 1; } };\n", ScriptTarget::Es3), vec![1056]);
    }

    #[test]
    fn test_es2015_keeps_modern_syntax() {
        let output = emit_with("let x = 1;\nconst f = (a: number) => a * 2;\n", ScriptTarget::Es2015);
        assert_eq!(output.text, "let x = 1;\nconst f = (a) => a * 2;\n");
    }

    #[test]
    fn test_new_line_option() {
        let (program, _) = keel_parser::parse("var x = 1;\nvar y = x;\n", 0);
        let options = EmitOptions {
            new_line: "\r\n".to_string(),
            ..EmitOptions::default()
        };
        assert_eq!(emit_program(&program, &options).text, "var x = 1;\r\nvar y = x;\r\n");
    }
}
