//! End-to-end tests of single-file compilation over in-memory providers.

use std::cell::RefCell;
use std::collections::HashMap;

use keel_driver::{
    compile, compile_with_target, run, ArtifactTree, Phase, ScriptTarget, SourceError, SourceProvider,
    TreeProvider,
};
use pretty_assertions::assert_eq;

/// Map-backed provider that remembers every request
struct MapProvider {
    files: HashMap<String, String>,
    failures: HashMap<String, Option<String>>,
    requests: RefCell<Vec<String>>,
}

impl MapProvider {
    fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
            failures: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn failing(mut self, name: &str, message: Option<&str>) -> Self {
        self.failures.insert(name.to_string(), message.map(str::to_string));
        self
    }
}

impl SourceProvider for MapProvider {
    fn get_source(&self, file_name: &str, _requesting_entry: &str) -> Result<String, SourceError> {
        self.requests.borrow_mut().push(file_name.to_string());
        if let Some(message) = self.failures.get(file_name) {
            return Err(SourceError::Other {
                message: message.clone(),
            });
        }
        self.files.get(file_name).cloned().ok_or(SourceError::NotFound)
    }
}

#[test]
fn clean_input_returns_exact_output() {
    let provider = MapProvider::new(&[
        ("a.ts", "import { double } from './lib/math';\nexport const eight = double(4);\n"),
        ("lib/math.ts", "export function double(n: number) {\n    return n * 2;\n}\n"),
    ]);
    let output = compile("a.ts", &provider).unwrap();
    assert_eq!(
        output,
        "\"use strict\";\nfunction double(n) {\n    return n * 2;\n}\nexports.double = double;\n\
         \"use strict\";\nvar math_1 = require(\"./lib/math\");\nexports.eight = math_1.double(4);\n"
    );
    assert!(!output.contains("<#>"));
}

#[test]
fn syntax_errors_stop_before_later_phases() {
    let provider = MapProvider::new(&[("a.ts", "let ok: number = 'no';\nlet = ;\n")]);
    let compilation = run("a.ts", &provider, ScriptTarget::Es5);
    assert_eq!(compilation.gate.phases_run(), vec![Phase::Syntactic]);
    assert!(compilation.failed());

    let failure = compilation.clone().into_result().unwrap_err();
    let report = failure.report();
    assert!(!report.is_empty());
    assert_eq!(report.lines().count(), compilation.checking.len() + compilation.emit.len());
    for line in report.lines() {
        assert!(line.starts_with("a.ts(2,"), "unexpected line {line:?}");
        assert!(!line.contains("TS2322"));
    }
    assert_eq!(failure.payload(), format!("<#>{report}<#>"));
}

#[test]
fn missing_import_only_surfaces_as_unresolved_module() {
    let provider = MapProvider::new(&[("a.ts", "import { x } from './missing';\nx;\n")]);
    let failure = compile("a.ts", &provider).unwrap_err();
    assert_eq!(
        failure.to_string(),
        "<#>a.ts(1,19): error TS2307: Cannot find module './missing'.\n<#>"
    );
    assert!(!failure.report().contains("not found"));
}

#[test]
fn provider_failure_is_recorded_and_compilation_completes() {
    let provider = MapProvider::new(&[]).failing("a.ts", Some("disk error"));
    let compilation = run("a.ts", &provider, ScriptTarget::Es5);
    assert_eq!(compilation.gate.phases_run(), vec![Phase::Syntactic, Phase::Global]);
    assert_eq!(compilation.output, "");
    assert_eq!(
        compilation.into_result().unwrap_err().report(),
        "error TS5012: Cannot read file 'a.ts': disk error.\n"
    );

    let provider = MapProvider::new(&[]).failing("a.ts", None);
    assert_eq!(
        compile("a.ts", &provider).unwrap_err().report(),
        "error TS5012: Cannot read file 'a.ts': Unknown error.\n"
    );
}

#[test]
fn referenced_file_failure_is_recorded() {
    let provider = MapProvider::new(&[("a.ts", "/// <reference path=\"b.ts\" />\nlet a = 1;\n")])
        .failing("b.ts", Some("disk error"));
    let compilation = run("a.ts", &provider, ScriptTarget::Es5);
    assert_eq!(compilation.gate.phases_run(), vec![Phase::Syntactic, Phase::Global]);
    assert!(provider.requests.borrow().iter().any(|name| name == "b.ts"));
    assert_eq!(
        compilation.into_result().unwrap_err().report(),
        "error TS5012: Cannot read file 'b.ts': disk error.\n"
    );
}

#[test]
fn fresh_hosts_give_identical_output() {
    let provider = MapProvider::new(&[(
        "a.ts",
        "class Counter {\n    private n = 0;\n    next() { return ++this.n; }\n}\nnew Counter().next();\n",
    )]);
    let first = compile("a.ts", &provider).unwrap();
    let second = compile("a.ts", &provider).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("var Counter = (function () {"));
}

#[test]
fn origin_position_renders_as_one_one() {
    let provider = MapProvider::new(&[("a.ts", "}\n")]);
    let failure = compile("a.ts", &provider).unwrap_err();
    assert!(
        failure.payload().starts_with("<#>a.ts(1,1): error TS"),
        "unexpected payload {:?}",
        failure.payload()
    );
}

#[test]
fn semantic_error_produces_one_line() {
    let provider = MapProvider::new(&[("a.ts", "const x: number = 'bad';")]);
    let compilation = run("a.ts", &provider, ScriptTarget::Es5);
    assert_eq!(
        compilation.gate.phases_run(),
        vec![Phase::Syntactic, Phase::Global, Phase::Semantic]
    );
    assert_eq!(compilation.gate.decisive_count(), 1);
    assert_eq!(
        compilation.into_result().unwrap_err().payload(),
        "<#>a.ts(1,7): error TS2322: Type 'string' is not assignable to type 'number'.\n<#>"
    );
}

#[test]
fn emit_diagnostics_fail_a_clean_check() {
    let provider = MapProvider::new(&[("gen.ts", "function* numbers() { yield 1; }\n")]);
    let compilation = run("gen.ts", &provider, ScriptTarget::Es5);
    assert_eq!(compilation.gate.decisive_count(), 0);
    assert_eq!(compilation.emit.len(), 1);
    assert!(compilation.into_result().unwrap_err().report().contains("error TS1220"));

    let output = compile_with_target("gen.ts", &provider, ScriptTarget::Es2015).unwrap();
    assert!(output.contains("function* numbers()"));
}

#[test]
fn default_library_is_requested_per_target() {
    let provider = MapProvider::new(&[("a.ts", "const f = (a: number) => a * 2;\n")]);
    assert_eq!(
        compile_with_target("a.ts", &provider, ScriptTarget::Es2015).unwrap(),
        "const f = (a) => a * 2;\n"
    );
    assert_eq!(
        provider.requests.borrow().first().map(String::as_str),
        Some("typescript/lib/lib.core.es6.d.ts")
    );
}

#[test]
fn library_from_provider_is_used() {
    let tree = ArtifactTree::new()
        .with_file("typescript/lib/lib.core.d.ts", "declare var VERSION: string;\n")
        .with_file("a.ts", "let v: string = VERSION;\n");
    let provider = TreeProvider::new(&tree);
    assert_eq!(compile("a.ts", &provider).unwrap(), "var v = VERSION;\n");
}

#[test]
fn node_modules_are_remapped_onto_the_tree() {
    let tree = ArtifactTree::new()
        .with_file("@atomist/rug/index.d.ts", "export interface Project { name(): string; }\n")
        .with_file(
            ".atomist/editors/Simple.ts",
            "import { Project } from '@atomist/rug';\nexport function describe(p: Project) { return p.name(); }\n",
        );
    let provider = TreeProvider::new(&tree);
    let output = compile(".atomist/editors/Simple.ts", &provider).unwrap();
    assert!(output.contains("function describe(p) {\n    return p.name();\n}\nexports.describe = describe;\n"));
    assert!(!output.contains("require(\"@atomist/rug\")"));
}
