//! Source providers: where file text comes from

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SourceError;

const NODE_MODULES: &str = "node_modules/";

/// Resolves logical file names to text
pub trait SourceProvider {
    /// `requesting_entry` is the entry file of the compilation asking.
    fn get_source(&self, file_name: &str, requesting_entry: &str) -> Result<String, SourceError>;
}

/// Reads files below a directory
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceProvider for DirectoryProvider {
    fn get_source(&self, file_name: &str, requesting_entry: &str) -> Result<String, SourceError> {
        let path = self.root.join(file_name);
        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(file = file_name, entry = requesting_entry, layer = "directory", "resolved source");
                Ok(text)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(SourceError::NotFound),
            Err(err) => {
                warn!(file = file_name, path = %path.display(), error = %err, "failed to read source");
                Err(SourceError::other(err.to_string()))
            }
        }
    }
}

/// In-memory file tree keyed by `/`-separated path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactTree {
    files: BTreeMap<String, String>,
}

impl ArtifactTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ArtifactTree::plus`]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.plus(path, content);
        self
    }

    /// Adds `path`, replacing any file already there
    pub fn plus(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn find_file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Every file as `(path, content)`, sorted by path
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(path, content)| (path.as_str(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Reads every UTF-8 file below `root`. Paths are relative to `root`.
    pub fn from_directory(root: &Path) -> io::Result<Self> {
        let mut tree = Self::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                let name = relative
                    .components()
                    .map(|part| part.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                match fs::read_to_string(&path) {
                    Ok(content) => tree.plus(name, content),
                    Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                        debug!(file = %name, "skipping non-text file");
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(tree)
    }

    /// Writes every file below `root`, creating directories as needed
    pub fn write_to(&self, root: &Path) -> io::Result<()> {
        for (name, content) in self.files() {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }
        Ok(())
    }
}

/// Looks names up in an [`ArtifactTree`]. Names under `node_modules/` are
/// retried without that prefix, then the fallback is asked.
pub struct TreeProvider<'a> {
    tree: &'a ArtifactTree,
    fallback: Option<&'a dyn SourceProvider>,
}

impl<'a> TreeProvider<'a> {
    pub fn new(tree: &'a ArtifactTree) -> Self {
        Self { tree, fallback: None }
    }

    /// Layers `fallback` below the tree
    pub fn with_fallback(mut self, fallback: &'a dyn SourceProvider) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

impl SourceProvider for TreeProvider<'_> {
    fn get_source(&self, file_name: &str, requesting_entry: &str) -> Result<String, SourceError> {
        if let Some(content) = self.tree.find_file(file_name) {
            debug!(file = file_name, entry = requesting_entry, layer = "tree", "resolved source");
            return Ok(content.to_string());
        }

        let name = file_name.strip_prefix(NODE_MODULES).unwrap_or(file_name);
        if name != file_name {
            if let Some(content) = self.tree.find_file(name) {
                debug!(file = file_name, entry = requesting_entry, layer = "tree-remapped", "resolved source");
                return Ok(content.to_string());
            }
        }

        match self.fallback {
            Some(fallback) => {
                let text = fallback.get_source(name, requesting_entry)?;
                debug!(file = file_name, entry = requesting_entry, layer = "fallback", "resolved source");
                Ok(text)
            }
            None => Err(SourceError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Failing;

    impl SourceProvider for Failing {
        fn get_source(&self, _file_name: &str, _requesting_entry: &str) -> Result<String, SourceError> {
            Err(SourceError::other("broken pipe"))
        }
    }

    #[test]
    fn test_tree_lookup_and_plus() {
        let mut tree = ArtifactTree::new().with_file("b.ts", "b").with_file("a.ts", "a");
        tree.plus("a.ts", "a2");
        assert_eq!(tree.files().collect::<Vec<_>>(), vec![("a.ts", "a2"), ("b.ts", "b")]);
        assert_eq!(tree.find_file("c.ts"), None);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_node_modules_remapping() {
        let tree = ArtifactTree::new().with_file("@atomist/rug/index.d.ts", "export {}");
        let provider = TreeProvider::new(&tree);
        assert_eq!(
            provider.get_source("node_modules/@atomist/rug/index.d.ts", "main.ts"),
            Ok("export {}".to_string())
        );
        assert_eq!(provider.get_source("@atomist/rug/index.ts", "main.ts"), Err(SourceError::NotFound));
    }

    #[test]
    fn test_fallback_layer() {
        let lower = ArtifactTree::new().with_file("lib.d.ts", "declare var x: number;");
        let lower_provider = TreeProvider::new(&lower);
        let upper = ArtifactTree::new().with_file("main.ts", "x;");
        let provider = TreeProvider::new(&upper).with_fallback(&lower_provider);
        assert_eq!(provider.get_source("main.ts", "main.ts"), Ok("x;".to_string()));
        assert_eq!(
            provider.get_source("node_modules/lib.d.ts", "main.ts"),
            Ok("declare var x: number;".to_string())
        );
        assert_eq!(provider.get_source("other.ts", "main.ts"), Err(SourceError::NotFound));

        let failing = TreeProvider::new(&upper).with_fallback(&Failing);
        assert_eq!(failing.get_source("gone.ts", "main.ts"), Err(SourceError::other("broken pipe")));
    }
}
