//! Module specifier resolution over logical, `/`-separated file names

const EXTENSIONS: [&str; 3] = [".ts", ".tsx", ".d.ts"];
const INDEX_FILES: [&str; 2] = ["/index.ts", "/index.d.ts"];

/// `./x` and `../x` resolve against the importing file
pub(crate) fn is_relative(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
}

/// Directory part of a file name; `""` for a top-level file
pub(crate) fn directory_of(file_name: &str) -> &str {
    file_name.rsplit_once('/').map_or("", |(dir, _)| dir)
}

pub(crate) fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        normalize(relative)
    } else {
        normalize(&format!("{dir}/{relative}"))
    }
}

/// Collapses `.` and `..` segments. Leading `..` segments that climb above
/// the root are kept.
pub(crate) fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// File names tried for a module path, in order
pub(crate) fn candidates(base: &str) -> Vec<String> {
    EXTENSIONS
        .iter()
        .chain(INDEX_FILES.iter())
        .map(|suffix| format!("{base}{suffix}"))
        .collect()
}

/// `<dir>/node_modules/<m>` for the importer's directory and each parent,
/// ending with `node_modules/<m>`
pub(crate) fn node_modules_paths(importer: &str, specifier: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut dir = directory_of(importer);
    loop {
        if dir.rsplit('/').next() != Some("node_modules") {
            paths.push(join(dir, &format!("node_modules/{specifier}")));
        }
        if dir.is_empty() {
            break;
        }
        dir = directory_of(dir);
    }
    paths
}

/// Targets of the `/// <reference path="..." />` directives heading a file.
/// Scanning stops at the first line that is neither blank nor a comment.
pub(crate) fn reference_paths(text: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for line in text.split(['\n', '\r']) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with("//") {
            break;
        }
        let Some(directive) = line.strip_prefix("///") else {
            continue;
        };
        let directive = directive.trim_start();
        if !directive.starts_with("<reference") {
            continue;
        }
        if let Some(path) = attribute(directive, "path") {
            paths.push(path.to_string());
        }
    }
    paths
}

/// Quoted value of `name=` inside a directive tag
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag;
    while let Some(index) = rest.find(name) {
        let before = rest[..index].chars().next_back();
        let after = rest[index + name.len()..].trim_start();
        rest = &rest[index + name.len()..];
        if before.is_some_and(|c| c.is_alphanumeric() || c == '-') {
            continue;
        }
        let Some(value) = after.strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &value[1..];
        return value.find(quote).map(|end| &value[..end]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b/../c"), "a/c");
        assert_eq!(normalize("../x"), "../x");
        assert_eq!(normalize("a/../../x"), "../x");
        assert_eq!(join("src/editors", "../util"), "src/util");
        assert_eq!(join("", "./util"), "util");
    }

    #[test]
    fn test_relative_detection() {
        assert!(is_relative("./a"));
        assert!(is_relative("../a"));
        assert!(is_relative(".."));
        assert!(!is_relative("@atomist/rug"));
        assert!(!is_relative(".hidden"));
    }

    #[test]
    fn test_candidates() {
        assert_eq!(
            candidates("src/util"),
            vec![
                "src/util.ts",
                "src/util.tsx",
                "src/util.d.ts",
                "src/util/index.ts",
                "src/util/index.d.ts"
            ]
        );
    }

    #[test]
    fn test_node_modules_walk() {
        assert_eq!(
            node_modules_paths(".atomist/editors/Simple.ts", "@atomist/rug"),
            vec![
                ".atomist/editors/node_modules/@atomist/rug",
                ".atomist/node_modules/@atomist/rug",
                "node_modules/@atomist/rug"
            ]
        );
        assert_eq!(node_modules_paths("main.ts", "m"), vec!["node_modules/m"]);
        assert_eq!(
            node_modules_paths("node_modules/a/index.ts", "b"),
            vec!["node_modules/a/node_modules/b", "node_modules/b"]
        );
    }

    #[test]
    fn test_reference_paths() {
        let text = "// header\r/// <reference path=\"lib/a.ts\" />\n\n///<reference path='b.d.ts'/>\n/// <reference types=\"node\" />\nlet x = 1;\n/// <reference path=\"late.ts\" />\n";
        assert_eq!(reference_paths(text), vec!["lib/a.ts", "b.d.ts"]);
        assert_eq!(reference_paths("/// <reference no-default-lib=\"true\"/>\n"), Vec::<String>::new());
        assert_eq!(reference_paths("let a = 1;\n"), Vec::<String>::new());
    }
}
