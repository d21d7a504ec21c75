//! Tests of the `keel` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

fn keel(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keel"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run keel")
}

/// Fresh directory holding `files`
fn project(files: &[(&str, &str)]) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("keel_cli_{}_{}", std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    for (name, text) in files {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn compile_prints_javascript() {
    let dir = project(&[("src/main.ts", "let greeting: string = `hi ${1 + 1}`;\n")]);
    let output = keel(&["compile", "src/main.ts"], &dir);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "var greeting = \"hi \" + (1 + 1);\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn compile_with_root_and_target() {
    let dir = project(&[("app/main.ts", "const twice = (n: number) => n * 2;\n")]);
    let output = keel(&["compile", "main.ts", "--root", "app", "--target", "es2015"], &dir);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "const twice = (n) => n * 2;\n");

    let output = keel(&["compile", "main.ts", "--root", "app", "--target", "es9"], &dir);
    assert!(!output.status.success());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn compile_failure_prints_report() {
    let dir = project(&[("a.ts", "const x: number = 'bad';\n")]);
    let output = keel(&["compile", "a.ts"], &dir);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        stderr(&output),
        "<#>a.ts(1,7): error TS2322: Type 'string' is not assignable to type 'number'.\n<#>"
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_problems() {
    let dir = project(&[("ok.ts", "let a = 1;\n"), ("bad.ts", "let b: number = missing;\n")]);

    let output = keel(&["check", "ok.ts"], &dir);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No problems found in ok.ts"));

    let output = keel(&["check", "bad.ts"], &dir);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("TS2304"), "stderr: {err}");
    assert!(err.contains("Cannot find name 'missing'."));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn build_writes_tree_with_outputs() {
    let dir = project(&[
        ("in/.atomist/editors/MyEditor.ts", "class SimpleEditor {\n    edit() { return \"yeah\"; }\n}\n"),
        ("in/README.md", "docs\n"),
    ]);
    let output = keel(&["build", "in", "out"], &dir);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let js = fs::read_to_string(dir.join("out/.atomist/editors/MyEditor.js")).unwrap();
    assert!(js.starts_with("var SimpleEditor = (function () {"));
    assert!(dir.join("out/.atomist/editors/MyEditor.ts").exists());
    assert_eq!(fs::read_to_string(dir.join("out/README.md")).unwrap(), "docs\n");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn build_without_sources_fails() {
    let dir = project(&[("in/src/main.ts", "let a = 1;\n")]);
    let output = keel(&["build", "in", "out"], &dir);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Nothing to compile"));

    let output = keel(&["build", "in", "out", "--prefix", "src"], &dir);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.join("out/src/main.js").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn lex_and_parse_dumps() {
    let dir = project(&[("a.ts", "let a = 1;\n"), ("broken.ts", "let = ;\n")]);

    let output = keel(&["lex", "a.ts"], &dir);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Tokens for a.ts:"));

    let output = keel(&["parse", "a.ts"], &dir);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Program"));

    let output = keel(&["parse", "broken.ts"], &dir);
    assert!(!output.status.success());
    let _ = fs::remove_dir_all(&dir);
}
