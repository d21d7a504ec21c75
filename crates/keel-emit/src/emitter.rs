//! Emitter state and module-level lowering

use std::collections::{BTreeSet, HashMap, HashSet};

use keel_ast::*;
use tracing::debug;

use crate::error::{EmitError, EmitErrorKind};
use crate::helpers::{is_reserved_word, module_var_base, quote, Helper};
use crate::scan::scan_program;
use crate::writer::CodeWriter;
use crate::{EmitOptions, EmitOutput, ScriptTarget};

/// Use-site spelling of names in one scope. `None` marks a local that
/// shadows any rewrite from an outer scope.
type Bindings = HashMap<String, Option<String>>;

/// Per-function bookkeeping for `_this` capture and hoisted temporaries
#[derive(Debug, Default)]
pub(crate) struct FunctionScope {
    /// Lowered arrow; `this` inside refers to the enclosing function
    pub(crate) is_arrow: bool,
    pub(crate) captures_this: bool,
    pub(crate) temps: Vec<String>,
}

/// Object that exported declarations are attached to
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Container {
    Script,
    Module,
    /// Namespace IIFE, by parameter name
    Namespace(String),
}

pub(crate) struct Emitter {
    pub(crate) target: ScriptTarget,
    pub(crate) out: CodeWriter,
    pub(crate) diagnostics: Vec<EmitError>,
    pub(crate) helpers: BTreeSet<Helper>,
    pub(crate) functions: Vec<FunctionScope>,
    pub(crate) containers: Vec<Container>,
    /// Inside a static member, where `super` is the base constructor itself
    pub(crate) in_static: bool,
    bindings: Vec<Bindings>,
    /// Names already introduced with `var`, per container
    declared: Vec<HashSet<String>>,
    /// Every identifier in the file plus every generated name so far
    names: HashSet<String>,
    references: HashSet<String>,
    temp_counter: usize,
    counter_counter: usize,
}

impl Emitter {
    pub(crate) fn new(program: &Program, options: &EmitOptions) -> Self {
        let scan = scan_program(program);
        Self {
            target: options.target,
            out: CodeWriter::new(&options.new_line, 0),
            diagnostics: Vec::new(),
            helpers: BTreeSet::new(),
            functions: Vec::new(),
            containers: Vec::new(),
            in_static: false,
            bindings: Vec::new(),
            declared: Vec::new(),
            names: scan.names,
            references: scan.references,
            temp_counter: 0,
            counter_counter: 0,
        }
    }

    pub(crate) fn emit_program(mut self, program: &Program) -> EmitOutput {
        let is_module = program.is_external_module();
        self.containers.push(if is_module { Container::Module } else { Container::Script });
        self.functions.push(FunctionScope::default());
        self.bindings.push(Bindings::new());
        self.declared.push(HashSet::new());

        let items = match program.items.split_first() {
            Some((first, rest)) if is_module && is_use_strict(&first.value) => rest,
            _ => &program.items[..],
        };
        self.emit_items(items);

        let new_line = self.out.new_line().to_string();
        let body = std::mem::replace(&mut self.out, CodeWriter::new(&new_line, 0)).finish();
        let scope = self.functions.pop().unwrap_or_default();

        let mut out = CodeWriter::new(&new_line, 0);
        if is_module {
            out.line("\"use strict\";");
        }
        for helper in &self.helpers {
            for line in helper.source().lines() {
                out.line(line);
            }
        }
        if scope.captures_this {
            out.line("var _this = this;");
        }
        if !scope.temps.is_empty() {
            out.line(&format!("var {};", scope.temps.join(", ")));
        }
        out.raw(&body);

        debug!(
            script_target = ?self.target,
            module = is_module,
            helpers = self.helpers.len(),
            diagnostics = self.diagnostics.len(),
            "emitted file"
        );
        EmitOutput {
            text: out.finish(),
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // State helpers
    // =========================================================================

    pub(crate) fn report(&mut self, kind: EmitErrorKind, span: Span) {
        self.diagnostics.push(EmitError::new(kind, span));
    }

    /// Whether ES2015 syntax has to be rewritten
    pub(crate) fn downlevel(&self) -> bool {
        self.target < ScriptTarget::Es2015
    }

    pub(crate) fn push_bindings(&mut self) {
        self.bindings.push(Bindings::new());
    }

    pub(crate) fn pop_bindings(&mut self) {
        self.bindings.pop();
    }

    pub(crate) fn bind(&mut self, name: &str, replacement: String) {
        if let Some(scope) = self.bindings.last_mut() {
            scope.insert(name.to_string(), Some(replacement));
        }
    }

    pub(crate) fn shadow(&mut self, name: &str) {
        if let Some(scope) = self.bindings.last_mut() {
            scope.insert(name.to_string(), None);
        }
    }

    /// Marks names declared directly in a function body as locals.
    pub(crate) fn shadow_declarations(&mut self, stmts: &[Node<Stmt>]) {
        for stmt in stmts {
            match &stmt.value {
                Stmt::VarDecl(var) => {
                    for declarator in &var.declarations {
                        for name in declarator.pattern.value.bound_names() {
                            self.shadow(name);
                        }
                    }
                }
                Stmt::Decl(decl) => {
                    for name in decl.value.value_names() {
                        self.shadow(name);
                    }
                }
                _ => {}
            }
        }
    }

    /// Use-site text for an identifier
    pub(crate) fn ident_text(&self, name: &str) -> String {
        for scope in self.bindings.iter().rev() {
            if let Some(entry) = scope.get(name) {
                return entry.clone().unwrap_or_else(|| name.to_string());
            }
        }
        name.to_string()
    }

    /// Records `name` as declared in the current container; false when it
    /// already was (a namespace merging with a class, say).
    pub(crate) fn declare_once(&mut self, name: &str) -> bool {
        match self.declared.last_mut() {
            Some(declared) => declared.insert(name.to_string()),
            None => true,
        }
    }

    pub(crate) fn push_container(&mut self, container: Container) {
        self.containers.push(container);
        self.declared.push(HashSet::new());
        self.push_bindings();
    }

    pub(crate) fn pop_container(&mut self) {
        self.pop_bindings();
        self.declared.pop();
        self.containers.pop();
    }

    /// Object that receives exports of the current container
    pub(crate) fn export_object(&self) -> Option<String> {
        match self.containers.last() {
            Some(Container::Module) => Some("exports".to_string()),
            Some(Container::Namespace(name)) => Some(name.clone()),
            Some(Container::Script) | None => None,
        }
    }

    /// `this`, or `_this` inside a lowered arrow
    pub(crate) fn this_name(&mut self) -> &'static str {
        if !self.functions.last().is_some_and(|scope| scope.is_arrow) {
            return "this";
        }
        if let Some(owner) = self.functions.iter_mut().rev().find(|scope| !scope.is_arrow) {
            owner.captures_this = true;
        }
        "_this"
    }

    fn fresh(&mut self, candidate: String) -> Option<String> {
        if self.names.contains(&candidate) {
            None
        } else {
            self.names.insert(candidate.clone());
            Some(candidate)
        }
    }

    /// `_a`, `_b`, ... unique in the file
    pub(crate) fn unique_temp(&mut self) -> String {
        loop {
            let index = self.temp_counter;
            self.temp_counter += 1;
            let letter = (b'a' + (index % 26) as u8) as char;
            let candidate = match index / 26 {
                0 => format!("_{letter}"),
                round => format!("_{letter}{round}"),
            };
            if let Some(name) = self.fresh(candidate) {
                return name;
            }
        }
    }

    /// Temporary declared with `var` at the top of the enclosing function
    pub(crate) fn hoisted_temp(&mut self) -> String {
        let name = self.unique_temp();
        self.hoist(name.clone());
        name
    }

    pub(crate) fn hoist(&mut self, name: String) {
        if let Some(scope) = self.functions.iter_mut().rev().find(|scope| !scope.is_arrow) {
            scope.temps.push(name);
        }
    }

    /// Loop counters: `_i`, `_j`, ...
    pub(crate) fn unique_counter(&mut self) -> String {
        loop {
            let index = self.counter_counter;
            self.counter_counter += 1;
            let letter = (b'i' + (index % 18) as u8) as char;
            let candidate = match index / 18 {
                0 => format!("_{letter}"),
                round => format!("_{letter}{round}"),
            };
            if let Some(name) = self.fresh(candidate) {
                return name;
            }
        }
    }

    /// `base_1`, `base_2`, ... unique in the file
    pub(crate) fn unique_name(&mut self, base: &str) -> String {
        let mut n = 1;
        loop {
            if let Some(name) = self.fresh(format!("{base}_{n}")) {
                return name;
            }
            n += 1;
        }
    }

    /// `object.name`, bracketed where ES3 rejects the name after a dot
    pub(crate) fn member_text(&self, object: &str, name: &str) -> String {
        if self.target == ScriptTarget::Es3 && is_reserved_word(name) {
            format!("{object}[{}]", quote(name))
        } else {
            format!("{object}.{name}")
        }
    }

    /// Renders with the writer indented one extra level, for constructs
    /// laid out over several lines inside an expression.
    pub(crate) fn nested<T>(&mut self, render: impl FnOnce(&mut Self) -> T) -> T {
        self.out.indent();
        let result = render(self);
        self.out.dedent();
        result
    }

    // =========================================================================
    // Module items
    // =========================================================================

    pub(crate) fn emit_items(&mut self, items: &[Node<ModuleItem>]) {
        let mut imports = HashMap::new();
        let mut values = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            match &item.value {
                ModuleItem::Import(import) => {
                    for specifier in &import.specifiers {
                        values.insert(specifier.local_name().value.name.clone());
                    }
                    imports.insert(index, self.plan_import(import));
                }
                ModuleItem::Export(ExportDecl::Decl(decl)) | ModuleItem::Export(ExportDecl::DefaultDecl(decl)) => {
                    if !decl.value.is_type_only() {
                        values.extend(decl.value.value_names().into_iter().map(str::to_string));
                    }
                    if let Decl::Var(var) = &decl.value {
                        self.bind_exported_var(var);
                    }
                }
                ModuleItem::Decl(decl) if !decl.value.is_type_only() => {
                    values.extend(decl.value.value_names().into_iter().map(str::to_string));
                }
                ModuleItem::Stmt(stmt) => match &stmt.value {
                    Stmt::VarDecl(var) if !var.is_declare => {
                        for declarator in &var.declarations {
                            values.extend(declarator.pattern.value.bound_names().into_iter().map(str::to_string));
                        }
                    }
                    Stmt::Decl(decl) if !decl.value.is_type_only() => {
                        values.extend(decl.value.value_names().into_iter().map(str::to_string));
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        for (index, item) in items.iter().enumerate() {
            match &item.value {
                ModuleItem::Import(_) => {
                    if let Some(Some(statement)) = imports.remove(&index) {
                        self.out.line(&statement);
                    }
                }
                ModuleItem::Export(export) => self.emit_export(export, &values),
                ModuleItem::Stmt(stmt) => self.emit_stmt(stmt),
                ModuleItem::Decl(decl) => self.emit_decl(decl, false),
            }
        }
    }

    /// Binds the import's names and returns its `require` statement, or
    /// `None` when every binding is only used as a type.
    fn plan_import(&mut self, import: &ImportDecl) -> Option<String> {
        if import.type_only {
            return None;
        }
        let require = format!("require({})", quote(&import.source.value));
        if import.specifiers.is_empty() {
            return Some(format!("{require};"));
        }

        let used: Vec<&ImportSpecifier> = import
            .specifiers
            .iter()
            .filter(|specifier| !matches!(specifier, ImportSpecifier::Named { type_only: true, .. }))
            .filter(|specifier| self.references.contains(&specifier.local_name().value.name))
            .collect();
        if used.is_empty() {
            return None;
        }

        let namespace = used.iter().find_map(|specifier| match specifier {
            ImportSpecifier::Namespace(name) => Some(name.value.name.clone()),
            _ => None,
        });
        let module_var = match &namespace {
            Some(name) => name.clone(),
            None => self.unique_name(&module_var_base(&import.source.value)),
        };

        for specifier in used {
            match specifier {
                ImportSpecifier::Namespace(_) => {}
                ImportSpecifier::Default(local) => {
                    let text = self.member_text(&module_var, "default");
                    self.bind(&local.value.name, text);
                }
                ImportSpecifier::Named { imported, local, .. } => {
                    let text = self.member_text(&module_var, &imported.value.name);
                    let local = local.as_ref().unwrap_or(imported);
                    self.bind(&local.value.name, text);
                }
            }
        }
        Some(format!("var {module_var} = {require};"))
    }

    /// Exported variables live on the export object; every use is rewritten.
    fn bind_exported_var(&mut self, var: &VarDecl) {
        let Some(object) = self.export_object() else {
            return;
        };
        if var.is_declare {
            return;
        }
        for declarator in &var.declarations {
            if let Pattern::Ident { name, .. } = &declarator.pattern.value {
                let text = self.member_text(&object, &name.value.name);
                self.bind(&name.value.name, text);
            }
        }
    }

    fn emit_export(&mut self, export: &ExportDecl, values: &HashSet<String>) {
        let object = self.export_object().unwrap_or_else(|| "exports".to_string());
        match export {
            ExportDecl::Named {
                specifiers,
                source: None,
                type_only,
            } => {
                if *type_only {
                    return;
                }
                for specifier in specifiers.iter().filter(|s| !s.type_only) {
                    let local = &specifier.local.value.name;
                    if !values.contains(local) {
                        continue;
                    }
                    let target = self.member_text(&object, specifier.exported_name());
                    let value = self.ident_text(local);
                    self.out.line(&format!("{target} = {value};"));
                }
            }
            ExportDecl::Named {
                specifiers,
                source: Some(source),
                type_only,
            } => {
                if *type_only {
                    return;
                }
                let module_var = self.unique_name(&module_var_base(&source.value));
                self.out
                    .line(&format!("var {module_var} = require({});", quote(&source.value)));
                for specifier in specifiers.iter().filter(|s| !s.type_only) {
                    let target = self.member_text(&object, specifier.exported_name());
                    let value = self.member_text(&module_var, &specifier.local.value.name);
                    self.out.line(&format!("{target} = {value};"));
                }
            }
            ExportDecl::Default(expr) => {
                let target = self.member_text(&object, "default");
                let value = self.expr(expr);
                self.out.line(&format!("{target} = {value};"));
            }
            ExportDecl::DefaultDecl(decl) => {
                if decl.value.is_type_only() {
                    return;
                }
                self.emit_decl(decl, false);
                if let Some(name) = decl.value.value_names().first() {
                    let target = self.member_text(&object, "default");
                    self.out.line(&format!("{target} = {name};"));
                }
            }
            ExportDecl::All {
                source,
                as_name: None,
            } => {
                self.helpers.insert(Helper::Export);
                self.out.line(&format!("__export(require({}));", quote(&source.value)));
            }
            ExportDecl::All {
                source,
                as_name: Some(name),
            } => {
                let target = self.member_text(&object, &name.value.name);
                self.out
                    .line(&format!("{target} = require({});", quote(&source.value)));
            }
            ExportDecl::Decl(decl) => self.emit_decl(decl, true),
            ExportDecl::Assign(expr) => {
                let value = self.expr(expr);
                self.out.line(&format!("module.exports = {value};"));
            }
        }
    }

    /// Emits a declaration; exported ones are also attached to the
    /// container's export object.
    pub(crate) fn emit_decl(&mut self, decl: &Node<Decl>, exported: bool) {
        if decl.value.is_type_only() {
            return;
        }
        let object = if exported { self.export_object() } else { None };
        match &decl.value {
            Decl::Function(func) => {
                self.emit_function_decl(func, decl.span);
                if let Some(object) = object {
                    let name = &func.name.value.name;
                    let target = self.member_text(&object, name);
                    self.out.line(&format!("{target} = {name};"));
                }
            }
            Decl::Class(class) => {
                self.emit_class(class);
                if let Some(object) = object {
                    let name = &class.name.value.name;
                    let target = self.member_text(&object, name);
                    self.out.line(&format!("{target} = {name};"));
                }
            }
            Decl::Enum(decl) => self.emit_enum(decl, object),
            Decl::Module(module) => self.emit_namespace(module, object),
            Decl::Var(var) => match object {
                Some(object) => self.emit_exported_var(var, &object),
                None => {
                    if let Some(text) = self.var_decl_text(var) {
                        self.out.line(&format!("{text};"));
                    }
                }
            },
            Decl::Interface(_) | Decl::TypeAlias(_) => {}
        }
    }

    fn emit_exported_var(&mut self, var: &VarDecl, object: &str) {
        for declarator in &var.declarations {
            match &declarator.pattern.value {
                Pattern::Ident { name, .. } => {
                    if let Some(init) = &declarator.init {
                        let target = self.member_text(object, &name.value.name);
                        let value = self.expr(init);
                        self.out.line(&format!("{target} = {value};"));
                    }
                }
                pattern => {
                    let single = VarDecl {
                        kind: var.kind,
                        declarations: vec![declarator.clone()],
                        is_declare: false,
                    };
                    if let Some(text) = self.var_decl_text(&single) {
                        self.out.line(&format!("{text};"));
                    }
                    for name in pattern.bound_names() {
                        let target = self.member_text(object, name);
                        self.out.line(&format!("{target} = {name};"));
                    }
                }
            }
        }
    }
}

fn is_use_strict(item: &ModuleItem) -> bool {
    matches!(
        item,
        ModuleItem::Stmt(Node {
            value: Stmt::Expr(Node {
                value: Expr::Literal(Literal::String { value, .. }),
                ..
            }),
            ..
        }) if value == "use strict"
    )
}
