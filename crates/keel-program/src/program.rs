//! Program construction, diagnostics and emit

use std::collections::{HashMap, HashSet};

use keel_ast::{Decl, ModuleItem, ModuleName, Node};
use keel_emit::{output_file_name, EmitOptions, ScriptTarget};
use keel_typeck::{check_files, CheckFile, CheckOptions, FileKind};
use tracing::{debug, trace};

use crate::diagnostic::{Diagnostic, Phase};
use crate::host::{CompilerHost, SourceFetch};
use crate::resolver::{candidates, directory_of, is_relative, join, node_modules_paths, reference_paths};
use crate::source::SourceUnit;
use crate::CompilerOptions;

/// Result of [`Program::emit`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Output names handed to the host, in emit order
    pub emitted_files: Vec<String>,
}

/// A set of root files and everything they import, parsed and ready to
/// check or emit.
#[derive(Debug)]
pub struct Program {
    options: CompilerOptions,
    root_names: Vec<String>,
    /// Indexed by file id, which is the order files were fetched in
    units: Vec<SourceUnit>,
    /// File ids: default library, then dependencies before dependents
    order: Vec<usize>,
    library: Option<usize>,
    /// Per file id: module specifier -> file id it resolved to
    resolved_modules: HashMap<usize, HashMap<String, usize>>,
    global_diagnostics: Vec<Diagnostic>,
}

impl Program {
    /// Loads the root files, their imports and the default library through
    /// `host`. Each file is fetched at most once.
    pub fn create(root_names: &[String], options: CompilerOptions, host: &mut dyn CompilerHost) -> Self {
        let mut loader = Loader {
            host,
            target: options.target,
            units: Vec::new(),
            by_name: HashMap::new(),
            missing: HashSet::new(),
            ambient_modules: HashSet::new(),
            order: Vec::new(),
            resolved_modules: HashMap::new(),
            global_diagnostics: Vec::new(),
        };

        let library = if options.no_lib {
            None
        } else {
            let lib = loader.host.get_default_lib_file_name(&options);
            if loader.host.file_exists(&lib) {
                loader.load(&lib)
            } else {
                debug!(lib = %lib, "default library not available, using built-in prelude");
                None
            }
        };

        for root in root_names {
            if loader.load(root).is_none() {
                loader
                    .global_diagnostics
                    .push(Diagnostic::global(Phase::Global, 6053, format!("File '{root}' not found.")));
            }
        }

        let Loader {
            units,
            order,
            resolved_modules,
            global_diagnostics,
            ..
        } = loader;
        debug!(
            roots = root_names.len(),
            files = order.len(),
            library = library.is_some(),
            "program created"
        );
        Program {
            options,
            root_names: root_names.to_vec(),
            units,
            order,
            library,
            resolved_modules,
            global_diagnostics,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn root_file_names(&self) -> &[String] {
        &self.root_names
    }

    /// Loaded files in program order
    pub fn source_files(&self) -> impl Iterator<Item = &SourceUnit> {
        self.order.iter().filter_map(|&id| self.units.get(id))
    }

    pub fn get_source_file(&self, file_name: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|unit| unit.file_name == file_name)
    }

    /// Parse errors of every file, in program order
    pub fn syntactic_diagnostics(&self) -> Vec<Diagnostic> {
        self.source_files()
            .flat_map(|unit| {
                unit.parse_diagnostics.iter().map(move |error| {
                    let length = error.span.end.saturating_sub(error.span.start);
                    Diagnostic::in_file(
                        Phase::Syntactic,
                        unit,
                        error.span.start,
                        length,
                        error.code,
                        error.message.clone(),
                    )
                })
            })
            .collect()
    }

    /// Problems not tied to a position: unreadable and missing files
    pub fn global_diagnostics(&self) -> Vec<Diagnostic> {
        self.global_diagnostics.clone()
    }

    /// Type errors in every file except the default library
    pub fn semantic_diagnostics(&self) -> Vec<Diagnostic> {
        let files: Vec<CheckFile<'_>> = self
            .order
            .iter()
            .filter_map(|&id| {
                let unit = self.units.get(id)?;
                Some(CheckFile {
                    program: &unit.ast,
                    kind: self.file_kind(unit),
                    resolved_modules: self.resolved_modules.get(&id).cloned().unwrap_or_default(),
                })
            })
            .collect();
        let options = CheckOptions {
            experimental_decorators: self.options.experimental_decorators,
        };

        check_files(&files, &options)
            .into_iter()
            .filter_map(|error| {
                let unit = self.units.get(error.span.file_id)?;
                let length = error.span.end.saturating_sub(error.span.start);
                Some(Diagnostic::in_file(
                    Phase::Semantic,
                    unit,
                    error.span.start,
                    length,
                    error.code(),
                    error.message(),
                ))
            })
            .collect()
    }

    /// Emits every non-declaration file through `host.write_file`.
    pub fn emit(&self, host: &mut dyn CompilerHost) -> EmitResult {
        let options = EmitOptions {
            target: self.options.target,
            new_line: host.get_new_line(),
        };
        let mut result = EmitResult::default();
        for unit in self.source_files().filter(|unit| !unit.is_declaration) {
            let output = keel_emit::emit_program(&unit.ast, &options);
            for error in &output.diagnostics {
                let length = error.span.end.saturating_sub(error.span.start);
                result.diagnostics.push(Diagnostic::in_file(
                    Phase::Emit,
                    unit,
                    error.span.start,
                    length,
                    error.code(),
                    error.message(),
                ));
            }

            let name = output_file_name(&unit.file_name);
            match host.write_file(&name, &output.text, false) {
                Ok(()) => {
                    trace!(file = %name, bytes = output.text.len(), "wrote output");
                    result.emitted_files.push(name);
                }
                Err(err) => result.diagnostics.push(Diagnostic::global(
                    Phase::Emit,
                    5033,
                    format!("Could not write file '{name}': {err}."),
                )),
            }
        }
        debug!(
            files = result.emitted_files.len(),
            diagnostics = result.diagnostics.len(),
            "emit finished"
        );
        result
    }

    fn file_kind(&self, unit: &SourceUnit) -> FileKind {
        if Some(unit.file_id()) == self.library {
            FileKind::Library
        } else if unit.is_declaration {
            FileKind::Declaration
        } else {
            FileKind::Source
        }
    }
}

/// Depth-first file collection
struct Loader<'h> {
    host: &'h mut dyn CompilerHost,
    target: ScriptTarget,
    units: Vec<SourceUnit>,
    by_name: HashMap<String, usize>,
    missing: HashSet<String>,
    ambient_modules: HashSet<String>,
    order: Vec<usize>,
    resolved_modules: HashMap<usize, HashMap<String, usize>>,
    global_diagnostics: Vec<Diagnostic>,
}

impl Loader<'_> {
    /// Fetches `file_name` and, before it, everything it imports. Returns
    /// the file id, or `None` when the host has no such file.
    fn load(&mut self, file_name: &str) -> Option<usize> {
        let canonical = self.host.get_canonical_file_name(file_name);
        if let Some(&id) = self.by_name.get(&canonical) {
            return Some(id);
        }
        if self.missing.contains(&canonical) {
            return None;
        }

        let file_id = self.units.len();
        let unit = match self.host.get_source_file(file_name, self.target, file_id) {
            SourceFetch::Found(unit) => unit,
            SourceFetch::Missing => {
                self.missing.insert(canonical);
                return None;
            }
            SourceFetch::Failed { unit, message } => {
                self.global_diagnostics.push(Diagnostic::global(
                    Phase::Global,
                    5012,
                    format!("Cannot read file '{file_name}': {message}."),
                ));
                unit
            }
        };
        trace!(file = file_name, file_id, "loaded source file");

        let specifiers: Vec<String> = unit
            .ast
            .module_references()
            .into_iter()
            .map(|source| source.value.clone())
            .collect();
        let references = reference_paths(&unit.text);
        self.ambient_modules.extend(ambient_module_names(&unit));
        self.by_name.insert(canonical, file_id);
        self.units.push(unit);

        // no `file_exists` check: a read failure here is a TS5012
        for reference in references {
            let path = join(directory_of(file_name), &reference);
            if self.load(&path).is_none() {
                self.global_diagnostics.push(Diagnostic::global(
                    Phase::Global,
                    6053,
                    format!("File '{path}' not found."),
                ));
            }
        }

        let mut resolved = HashMap::new();
        for specifier in specifiers {
            if let Some(dependency) = self.resolve(&specifier, file_name) {
                resolved.insert(specifier, dependency);
            }
        }
        self.resolved_modules.insert(file_id, resolved);
        self.order.push(file_id);
        Some(file_id)
    }

    fn resolve(&mut self, specifier: &str, importer: &str) -> Option<usize> {
        if is_relative(specifier) {
            let base = join(directory_of(importer), specifier);
            return self.load_first(&base);
        }
        if self.ambient_modules.contains(specifier) {
            return None;
        }
        node_modules_paths(importer, specifier)
            .into_iter()
            .find_map(|base| self.load_first(&base))
    }

    /// Loads the first candidate for `base` that exists
    fn load_first(&mut self, base: &str) -> Option<usize> {
        for candidate in candidates(base) {
            let canonical = self.host.get_canonical_file_name(&candidate);
            if let Some(&id) = self.by_name.get(&canonical) {
                return Some(id);
            }
            if self.host.file_exists(&candidate) {
                if let Some(id) = self.load(&candidate) {
                    return Some(id);
                }
            }
        }
        None
    }
}

/// Names of `declare module "name"` blocks
fn ambient_module_names(unit: &SourceUnit) -> Vec<String> {
    unit.ast
        .items
        .iter()
        .filter_map(|item| match &item.value {
            ModuleItem::Decl(Node {
                value: Decl::Module(module),
                ..
            }) => match &module.name {
                ModuleName::String(name) => Some(name.value.clone()),
                ModuleName::Ident(_) => None,
            },
            _ => None,
        })
        .collect()
}
