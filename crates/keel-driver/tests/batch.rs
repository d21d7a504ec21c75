//! Batch compilation over artifact trees and directory providers.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use keel_driver::{compile, ArtifactTree, BatchCompiler, DirectoryProvider, SourceError, SourceProvider};
use pretty_assertions::assert_eq;

const EDITOR: &str = "class SimpleEditor  {\n\n    edit() {\n        return \"yeah\"\n    }\n}\n";

const BROKEN_EDITOR: &str =
    "class SimpleEditor  {\n\n    edit() {\n        let bla = new Test();\n        return \"yeah\"\n    }\n}\n";

fn temp_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("keel_batch_{}_{}_{}", label, std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn compiles_scripts_under_the_prefix() {
    let tree = ArtifactTree::new()
        .with_file(".atomist/editors/MyEditor.ts", EDITOR)
        .with_file("README.md", "# editors\n");
    let batch = BatchCompiler::default();
    assert!(batch.supports(&tree));

    let result = batch.compile(&tree).into_result().unwrap();
    let js = result.find_file(".atomist/editors/MyEditor.js").unwrap();
    assert!(js.contains("var SimpleEditor = (function () {"));
    assert_eq!(result.find_file(".atomist/editors/MyEditor.ts"), Some(EDITOR));
    assert_eq!(result.len(), 3);
}

#[test]
fn failures_carry_code_frames() {
    let tree = ArtifactTree::new()
        .with_file(".atomist/editors/MyEditor1.ts", BROKEN_EDITOR)
        .with_file(".atomist/editors/MyEditor2.ts", BROKEN_EDITOR);
    let outcome = BatchCompiler::default().compile(&tree);
    assert!(!outcome.is_success());

    let error = outcome.into_result().unwrap_err();
    assert_eq!(
        error.failed_files,
        vec![".atomist/editors/MyEditor1.ts", ".atomist/editors/MyEditor2.ts"]
    );
    assert_eq!(
        error.to_string(),
        ".atomist/editors/MyEditor1.ts(4,23): error TS2304: Cannot find name 'Test'.\n\
         \x20       let bla = new Test();\n\
         \x20                     ^\n\
         \n\
         .atomist/editors/MyEditor2.ts(4,23): error TS2304: Cannot find name 'Test'.\n\
         \x20       let bla = new Test();\n\
         \x20                     ^\n"
    );
}

#[test]
fn failed_entries_get_no_output() {
    let tree = ArtifactTree::new()
        .with_file(".atomist/Good.ts", EDITOR)
        .with_file(".atomist/Bad.ts", BROKEN_EDITOR);
    let outcome = BatchCompiler::default().compile(&tree);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file_name, ".atomist/Bad.ts");
    assert!(outcome.tree.find_file(".atomist/Good.js").is_some());
    assert!(outcome.tree.find_file(".atomist/Bad.js").is_none());
}

#[test]
fn unsupported_tree() {
    let tree = ArtifactTree::new()
        .with_file("src/Main.ts", EDITOR)
        .with_file(".atomist/types.d.ts", "declare var x: number;\n");
    let batch = BatchCompiler::default();
    assert!(!batch.supports(&tree));
    assert_eq!(batch.compile(&tree).into_result().unwrap(), tree);
}

#[test]
fn directory_provider_maps_io_errors() {
    let dir = temp_dir("provider");
    fs::create_dir_all(dir.join("src/nested")).unwrap();
    fs::write(dir.join("src/a.ts"), "export const a = 1;\n").unwrap();

    let provider = DirectoryProvider::new(&dir);
    assert_eq!(provider.get_source("src/a.ts", "src/a.ts"), Ok("export const a = 1;\n".to_string()));
    assert_eq!(provider.get_source("src/b.ts", "src/a.ts"), Err(SourceError::NotFound));
    assert!(matches!(
        provider.get_source("src/nested", "src/a.ts"),
        Err(SourceError::Other { message: Some(_) })
    ));

    assert_eq!(
        compile("src/a.ts", &provider).unwrap(),
        "\"use strict\";\nexports.a = 1;\n"
    );
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn trees_round_trip_through_directories() {
    let source = temp_dir("tree_in");
    fs::create_dir_all(source.join(".atomist/editors")).unwrap();
    fs::write(source.join(".atomist/editors/MyEditor.ts"), EDITOR).unwrap();
    fs::write(source.join("package.json"), "{}\n").unwrap();

    let tree = ArtifactTree::from_directory(&source).unwrap();
    assert_eq!(
        tree.files().map(|(path, _)| path).collect::<Vec<_>>(),
        vec![".atomist/editors/MyEditor.ts", "package.json"]
    );

    let target = temp_dir("tree_out");
    tree.write_to(&target).unwrap();
    assert_eq!(fs::read_to_string(target.join(".atomist/editors/MyEditor.ts")).unwrap(), EDITOR);

    let _ = fs::remove_dir_all(&source);
    let _ = fs::remove_dir_all(&target);
}
