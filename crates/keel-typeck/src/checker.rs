//! Main type checker struct

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use keel_ast::{
    Decl, ExportDecl, FunctionDecl, Ident, ImportDecl, ImportSpecifier, ModuleBody, ModuleDecl, ModuleItem,
    ModuleName, Node, Pattern, Span, Stmt, VarDecl, VarDeclKind,
};
use tracing::{debug, trace};

use crate::builtins::register_builtins;
use crate::env::{ModuleExports, Symbol, SymbolKind, TypeEnv};
use crate::error::{TypeError, TypeErrorKind};
use crate::types::Type;
use crate::{CheckFile, CheckOptions, FileKind};

/// A declaration that binds a name before the statements of its scope run.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Hoisted<'a> {
    Decl(&'a Decl),
    Var(&'a VarDecl),
    Import(&'a ImportDecl),
}

/// Declaration space a hoisted name occupies, for redeclaration checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Enum,
    Namespace { instantiated: bool },
    Interface,
    TypeAlias,
    Import,
}

impl DeclKind {
    fn can_merge(self, other: DeclKind) -> bool {
        use DeclKind::*;
        match (self, other) {
            (Import, _) | (_, Import) => true,
            (Var, Var) | (Function, Function) | (Enum, Enum) | (Interface, Interface) => true,
            (Class, Interface) | (Interface, Class) => true,
            (Namespace { instantiated: false }, _) | (_, Namespace { instantiated: false }) => true,
            (Namespace { .. }, Namespace { .. } | Function | Class | Enum | Interface) => true,
            (Function | Class | Enum | Interface, Namespace { .. }) => true,
            // type-only names never clash with plain values
            (Interface | TypeAlias, Var | Let | Const | Function) => true,
            (Var | Let | Const | Function, Interface | TypeAlias) => true,
            _ => false,
        }
    }
}

/// Main type checker
pub struct TypeChecker {
    pub(crate) env: TypeEnv,
    pub(crate) errors: Vec<TypeError>,
    pub(crate) options: CheckOptions,
    /// Declared return type of the function being checked
    pub(crate) current_return_type: Option<Type>,
    /// Type of `this` in the current class body
    pub(crate) current_this: Option<Type>,
    /// Inside `declare` contexts every declaration is exported
    pub(crate) ambient: bool,
    default_export: Option<Type>,
    module_exports: HashMap<usize, Rc<ModuleExports>>,
    ambient_modules: HashMap<String, Rc<ModuleExports>>,
    resolved_modules: HashMap<String, usize>,
    silent_files: HashSet<usize>,
    reported: HashSet<(u32, usize, usize, usize)>,
    /// Union types declared through a type alias, shown by the alias name
    pub(crate) alias_names: Vec<(Type, String)>,
}

impl TypeChecker {
    pub fn new(options: CheckOptions) -> Self {
        Self {
            env: TypeEnv::new(),
            errors: Vec::new(),
            options,
            current_return_type: None,
            current_this: None,
            ambient: false,
            default_export: None,
            module_exports: HashMap::new(),
            ambient_modules: HashMap::new(),
            resolved_modules: HashMap::new(),
            silent_files: HashSet::new(),
            reported: HashSet::new(),
            alias_names: Vec::new(),
        }
    }

    /// Spelling of `ty` in messages: a union declared by an alias shows as
    /// the alias name.
    pub(crate) fn display_type(&self, ty: &Type) -> String {
        if matches!(ty, Type::Union(_)) {
            if let Some((_, name)) = self.alias_names.iter().find(|(aliased, _)| aliased == ty) {
                return name.clone();
            }
        }
        ty.to_string()
    }

    /// Records an error once per code and location. Errors inside library
    /// files are dropped.
    pub(crate) fn report(&mut self, kind: TypeErrorKind, span: Span) {
        if self.silent_files.contains(&span.file_id) {
            return;
        }
        if self
            .reported
            .insert((kind.code(), span.start, span.end, span.file_id))
        {
            self.errors.push(TypeError::new(kind, span));
        }
    }

    /// Checks a whole program. Files are identified by the `file_id` of
    /// their spans; files a module imports are expected before the importer.
    pub fn check_files(mut self, files: &[CheckFile<'_>]) -> Vec<TypeError> {
        debug!(files = files.len(), "checking program");

        let positions: HashMap<usize, usize> = files
            .iter()
            .enumerate()
            .map(|(position, file)| (file.program.span.file_id, position))
            .collect();
        for file in files {
            if file.kind == FileKind::Library {
                self.silent_files.insert(file.program.span.file_id);
            }
        }
        if !files.iter().any(|f| f.kind == FileKind::Library) {
            register_builtins(&mut self.env);
        }

        // Script files and `declare global` blocks share the global scope
        let mut globals = Vec::new();
        for file in files {
            if file.program.is_external_module() {
                for item in &file.program.items {
                    if let ModuleItem::Decl(decl) = &item.value {
                        if let Some(ModuleBody::Block(items)) = global_augmentation(&decl.value) {
                            collect_module_hoisted(items, &mut globals);
                        }
                    }
                }
            } else {
                collect_module_hoisted(&file.program.items, &mut globals);
            }
        }
        self.hoist(&globals);

        self.bind_ambient_modules(files);

        for file in files {
            let file_id = file.program.span.file_id;
            trace!(file = file_id, kind = ?file.kind, "checking file");
            self.resolved_modules = file.resolved_modules.clone();
            if file.program.is_external_module() {
                let exports = self.check_module_body(&file.program.items, false);
                self.module_exports.insert(file_id, Rc::new(exports));
            } else {
                self.ambient = file.kind != FileKind::Source;
                self.check_items(&file.program.items);
                self.ambient = false;
            }
        }

        let mut errors = self.errors;
        errors.sort_by_key(|e| {
            let position = positions.get(&e.span.file_id).copied().unwrap_or(usize::MAX);
            (position, e.span.start)
        });
        debug!(errors = errors.len(), "program checked");
        errors
    }

    // =========================================================================
    // Modules
    // =========================================================================

    /// Binds every `declare module "name"` found in any file.
    fn bind_ambient_modules(&mut self, files: &[CheckFile<'_>]) {
        let mut decls = Vec::new();
        for (index, file) in files.iter().enumerate() {
            for item in &file.program.items {
                if let ModuleItem::Decl(Node {
                    value: Decl::Module(module),
                    ..
                }) = &item.value
                {
                    if let ModuleName::String(name) = &module.name {
                        decls.push((index, name.value.clone(), module));
                    }
                }
            }
        }

        // Placeholders first, so ambient modules may import each other
        for (_, name, _) in &decls {
            self.ambient_modules
                .insert(name.clone(), Rc::new(ModuleExports::opaque()));
        }

        let mut seen = HashSet::new();
        for (index, name, module) in decls {
            let ModuleBody::Block(items) = &module.body else {
                continue;
            };
            // `declare module "m";` without a body accepts any import
            if items.is_empty() {
                continue;
            }
            self.resolved_modules = files[index].resolved_modules.clone();
            let saved = std::mem::replace(&mut self.ambient, true);
            let exports = self.check_module_body(items, true);
            self.ambient = saved;

            let merged = match self.ambient_modules.get(&name) {
                Some(previous) if seen.contains(&name) => {
                    let mut merged = (**previous).clone();
                    merged.merge_star(&exports);
                    merged
                }
                _ => exports,
            };
            seen.insert(name.clone());
            self.ambient_modules.insert(name, Rc::new(merged));
        }
    }

    /// Checks the items of a module or namespace body in a fresh scope and
    /// returns what the body exports.
    pub(crate) fn check_module_body(
        &mut self,
        items: &[Node<ModuleItem>],
        export_all: bool,
    ) -> ModuleExports {
        self.env.push_scope();
        let mut hoisted = Vec::new();
        collect_module_hoisted(items, &mut hoisted);
        self.hoist(&hoisted);

        let saved_default = self.default_export.take();
        self.check_items(items);
        let exports = self.collect_exports(items, export_all);
        self.default_export = saved_default;

        self.env.pop_scope();
        exports
    }

    pub(crate) fn check_items(&mut self, items: &[Node<ModuleItem>]) {
        for item in items {
            match &item.value {
                // bound while hoisting
                ModuleItem::Import(_) => {}
                ModuleItem::Stmt(stmt) => self.check_stmt(&stmt.value, stmt.span),
                ModuleItem::Decl(decl) => self.check_decl(&decl.value),
                ModuleItem::Export(export) => self.check_export(export),
            }
        }
    }

    fn check_export(&mut self, export: &ExportDecl) {
        match export {
            ExportDecl::Decl(decl) | ExportDecl::DefaultDecl(decl) => {
                self.check_decl(&decl.value)
            }
            ExportDecl::Default(expr) => {
                let ty = self.check_expr(expr);
                self.default_export = Some(ty);
            }
            ExportDecl::Assign(expr) => {
                self.check_expr(expr);
            }
            ExportDecl::Named {
                specifiers,
                source: None,
                ..
            } => {
                for spec in specifiers {
                    if self.env.lookup(&spec.local.value.name).is_none() {
                        self.report(
                            TypeErrorKind::CannotFindName(spec.local.value.name.clone()),
                            spec.local.span,
                        );
                    }
                }
            }
            // re-exports are resolved with the export table
            ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
        }
    }

    fn collect_exports(&mut self, items: &[Node<ModuleItem>], export_all: bool) -> ModuleExports {
        let mut exports = ModuleExports::default();

        for item in items {
            match &item.value {
                ModuleItem::Decl(decl) if export_all => {
                    for name in declared_names(&decl.value) {
                        self.export_symbol(name, name, &mut exports);
                    }
                }
                ModuleItem::Stmt(Node {
                    value: Stmt::VarDecl(var),
                    ..
                }) if export_all => {
                    for declarator in &var.declarations {
                        for name in declarator.pattern.value.bound_names() {
                            self.export_symbol(name, name, &mut exports);
                        }
                    }
                }
                ModuleItem::Export(ExportDecl::Decl(decl)) => {
                    for name in declared_names(&decl.value) {
                        self.export_symbol(name, name, &mut exports);
                    }
                }
                ModuleItem::Export(ExportDecl::DefaultDecl(decl)) => {
                    for name in declared_names(&decl.value) {
                        self.export_symbol(name, "default", &mut exports);
                    }
                }
                ModuleItem::Export(ExportDecl::Default(_)) => {
                    let ty = self.default_export.clone().unwrap_or(Type::Any);
                    exports.values.insert("default".to_string(), ty);
                }
                ModuleItem::Export(ExportDecl::Named {
                    specifiers,
                    source: None,
                    ..
                }) => {
                    for spec in specifiers {
                        self.export_symbol(&spec.local.value.name, spec.exported_name(), &mut exports);
                    }
                }
                ModuleItem::Export(ExportDecl::Named {
                    specifiers,
                    source: Some(source),
                    ..
                }) => {
                    let Some(target) = self.resolve_module(source) else {
                        for spec in specifiers {
                            exports.values.insert(spec.exported_name().to_string(), Type::Any);
                        }
                        continue;
                    };
                    for spec in specifiers {
                        let local = &spec.local.value.name;
                        let exported = spec.exported_name().to_string();
                        if target.export_equals {
                            exports.values.insert(exported, Type::Any);
                            continue;
                        }
                        if !target.has_member(local) {
                            self.report(
                                TypeErrorKind::NoExportedMember {
                                    module: source.value.clone(),
                                    member: local.clone(),
                                },
                                spec.local.span,
                            );
                            exports.values.insert(exported, Type::Any);
                            continue;
                        }
                        if let Some(value) = target.values.get(local) {
                            exports.values.insert(exported.clone(), value.clone());
                        }
                        if let Some(ty) = target.types.get(local) {
                            exports.types.insert(exported.clone(), ty.clone());
                        }
                        if let Some(ns) = target.namespaces.get(local) {
                            exports.namespaces.insert(exported, ns.clone());
                        }
                    }
                }
                ModuleItem::Export(ExportDecl::All { source, as_name }) => {
                    let Some(target) = self.resolve_module(source) else {
                        continue;
                    };
                    match as_name {
                        Some(name) => {
                            let name = name.value.name.clone();
                            exports
                                .values
                                .insert(name.clone(), target.namespace_object(&name));
                            exports.namespaces.insert(name, target);
                        }
                        None => exports.merge_star(&target),
                    }
                }
                ModuleItem::Export(ExportDecl::Assign(_)) => exports.export_equals = true,
                _ => {}
            }
        }

        exports
    }

    fn export_symbol(&self, local: &str, exported: &str, exports: &mut ModuleExports) {
        let Some(symbol) = self.env.lookup(local) else {
            return;
        };
        if let Some(value) = &symbol.value {
            exports.values.insert(exported.to_string(), value.clone());
        }
        if let Some(ty) = &symbol.ty {
            exports.types.insert(exported.to_string(), ty.clone());
        }
        if let Some(ns) = &symbol.exports {
            exports.namespaces.insert(exported.to_string(), ns.clone());
        }
    }

    /// Export table for a module specifier, reporting TS2307 when nothing
    /// provides it.
    fn resolve_module(&mut self, source: &Node<String>) -> Option<Rc<ModuleExports>> {
        if let Some(index) = self.resolved_modules.get(&source.value) {
            let exports = self
                .module_exports
                .get(index)
                .cloned()
                .unwrap_or_else(|| Rc::new(ModuleExports::opaque()));
            return Some(exports);
        }
        if let Some(exports) = self.ambient_modules.get(&source.value) {
            return Some(exports.clone());
        }
        self.report(TypeErrorKind::CannotFindModule(source.value.clone()), source.span);
        None
    }

    fn bind_import(&mut self, import: &ImportDecl) {
        let target = self.resolve_module(&import.source);

        for spec in &import.specifiers {
            let local = spec.local_name();
            let mut symbol = Symbol::value(SymbolKind::Import, Type::Any);

            match (spec, &target) {
                (_, None) => {}
                (_, Some(exports)) if exports.export_equals => {}
                (ImportSpecifier::Namespace(name), Some(exports)) => {
                    symbol.value = Some(exports.namespace_object(&name.value.name));
                    symbol.exports = Some(exports.clone());
                }
                (ImportSpecifier::Default(name), Some(exports)) => {
                    if exports.has_member("default") {
                        symbol.value = exports.values.get("default").cloned();
                        symbol.ty = exports.types.get("default").cloned();
                    } else {
                        self.report(
                            TypeErrorKind::NoDefaultExport(import.source.value.clone()),
                            name.span,
                        );
                    }
                }
                (ImportSpecifier::Named { imported, .. }, Some(exports)) => {
                    let member = &imported.value.name;
                    if exports.has_member(member) || exports.namespaces.contains_key(member) {
                        symbol.value = exports.values.get(member).cloned();
                        symbol.ty = exports.types.get(member).cloned();
                        symbol.exports = exports.namespaces.get(member).cloned();
                    } else {
                        self.report(
                            TypeErrorKind::NoExportedMember {
                                module: import.source.value.clone(),
                                member: member.clone(),
                            },
                            imported.span,
                        );
                    }
                }
            }

            self.env.insert(local.value.name.clone(), symbol);
        }
    }

    // =========================================================================
    // Hoisting
    // =========================================================================

    /// Binds every declaration of a scope before its statements are checked.
    pub(crate) fn hoist(&mut self, hoisted: &[Hoisted<'_>]) {
        self.check_duplicates(hoisted);

        for item in hoisted.iter().copied() {
            self.declare_placeholder(item);
        }
        for item in hoisted.iter().copied() {
            if let Hoisted::Import(import) = item {
                self.bind_import(import);
            }
        }

        // Two rounds let declarations see each other regardless of order
        let type_decls: Vec<&Decl> = hoisted
            .iter()
            .copied()
            .filter_map(|item| match item {
                Hoisted::Decl(decl)
                    if matches!(
                        decl,
                        Decl::Interface(_) | Decl::TypeAlias(_) | Decl::Enum(_) | Decl::Class(_)
                    ) =>
                {
                    Some(decl)
                }
                _ => None,
            })
            .collect();
        for _ in 0..2 {
            self.declare_type_decls(&type_decls);
        }

        let functions: Vec<&FunctionDecl> = hoisted
            .iter()
            .copied()
            .filter_map(|item| match item {
                Hoisted::Decl(Decl::Function(func)) => Some(func),
                _ => None,
            })
            .collect();
        self.declare_functions(&functions);

        for item in hoisted.iter().copied() {
            if let Hoisted::Var(var) | Hoisted::Decl(Decl::Var(var)) = item {
                self.declare_var_annotations(var);
            }
        }

        for item in hoisted.iter().copied() {
            if let Hoisted::Decl(Decl::Module(module)) = item {
                self.hoist_namespace(module);
            }
        }
    }

    fn declare_placeholder(&mut self, item: Hoisted<'_>) {
        match item {
            Hoisted::Import(_) => {}
            Hoisted::Var(var) => self.declare_var_placeholder(var),
            Hoisted::Decl(decl) => match decl {
                Decl::Var(var) => self.declare_var_placeholder(var),
                Decl::Function(func) => self.env.declare(
                    func.name.value.name.clone(),
                    Symbol::value(SymbolKind::Function, Type::Any),
                ),
                Decl::Class(class) => self.env.declare(
                    class.name.value.name.clone(),
                    Symbol {
                        kind: SymbolKind::Class,
                        value: Some(Type::Any),
                        ty: Some(Type::Any),
                        exports: None,
                    },
                ),
                Decl::Enum(decl) => self.env.declare(
                    decl.name.value.name.clone(),
                    Symbol {
                        kind: SymbolKind::Enum,
                        value: Some(Type::Any),
                        ty: Some(Type::Any),
                        exports: None,
                    },
                ),
                Decl::Interface(decl) => self.env.declare(
                    decl.name.value.name.clone(),
                    Symbol::type_only(SymbolKind::Interface, Type::Any),
                ),
                Decl::TypeAlias(decl) => self.env.declare(
                    decl.name.value.name.clone(),
                    Symbol::type_only(SymbolKind::TypeAlias, Type::Any),
                ),
                Decl::Module(module) => {
                    if let ModuleName::Ident(name) = &module.name {
                        let existing = self.env.lookup_in_current_scope(&name.value.name);
                        if existing.and_then(|s| s.exports.as_ref()).is_none() {
                            self.env.declare(
                                name.value.name.clone(),
                                Symbol {
                                    kind: SymbolKind::Namespace,
                                    value: module.has_values().then_some(Type::Any),
                                    ty: None,
                                    exports: Some(Rc::new(ModuleExports::opaque())),
                                },
                            );
                        }
                    }
                }
            },
        }
    }

    fn declare_var_placeholder(&mut self, var: &VarDecl) {
        let kind = match var.kind {
            VarDeclKind::Var => SymbolKind::Var,
            VarDeclKind::Let => SymbolKind::Let,
            VarDeclKind::Const => SymbolKind::Const,
        };
        for declarator in &var.declarations {
            for name in declarator.pattern.value.bound_names() {
                // an earlier `var x: T` keeps its type
                if var.kind == VarDeclKind::Var
                    && self
                        .env
                        .lookup_in_current_scope(name)
                        .is_some_and(|s| s.value.is_some())
                {
                    continue;
                }
                self.env.declare(name, Symbol::value(kind, Type::Any));
            }
        }
    }

    fn declare_var_annotations(&mut self, var: &VarDecl) {
        for declarator in &var.declarations {
            let pattern = &declarator.pattern.value;
            if let (Some(name), Some(annotation)) = (pattern.as_ident(), pattern.type_annotation()) {
                let ty = self.resolve_type(annotation);
                self.env.set_value(&name.value.name, ty);
            }
        }
    }

    fn hoist_namespace(&mut self, module: &ModuleDecl) {
        let ModuleName::Ident(name) = &module.name else {
            return;
        };
        let name = name.value.name.clone();
        // `declare global` was bound with the global scope
        if global_body(module).is_some() {
            return;
        }

        let saved = self.ambient;
        self.ambient = saved || module.is_declare;
        let exports = match &module.body {
            ModuleBody::Block(items) => self.check_module_body(items, self.ambient),
            ModuleBody::Namespace(inner) => {
                self.env.push_scope();
                self.hoist_namespace(&inner.value);
                let mut exports = ModuleExports::default();
                if let ModuleName::Ident(inner_name) = &inner.value.name {
                    self.export_symbol(&inner_name.value.name, &inner_name.value.name, &mut exports);
                }
                self.env.pop_scope();
                exports
            }
        };
        self.ambient = saved;

        let mut symbol = self
            .env
            .lookup_in_current_scope(&name)
            .cloned()
            .unwrap_or(Symbol {
                kind: SymbolKind::Namespace,
                value: None,
                ty: None,
                exports: None,
            });

        let merged = match &symbol.exports {
            Some(previous) if !previous.export_equals => {
                let mut merged = (**previous).clone();
                merged.merge_star(&exports);
                merged
            }
            _ => exports,
        };

        match symbol.kind {
            // a namespace merged into a class, function or enum adds members
            SymbolKind::Class | SymbolKind::Function | SymbolKind::Enum => {
                if let Some(Type::Object(shape)) = &mut symbol.value {
                    for (member, ty) in &merged.values {
                        if shape.property(member).is_none() {
                            shape
                                .properties
                                .push(crate::types::PropertySig::new(member.clone(), ty.clone()));
                        }
                    }
                }
            }
            _ => {
                symbol.kind = SymbolKind::Namespace;
                let instantiated = module.has_values() || symbol.value.is_some();
                symbol.value = instantiated.then(|| merged.namespace_object(&name));
            }
        }
        symbol.exports = Some(Rc::new(merged));
        self.env.insert(name, symbol);
    }

    fn check_duplicates(&mut self, hoisted: &[Hoisted<'_>]) {
        let mut names: Vec<(&Node<Ident>, DeclKind)> = Vec::new();

        for item in hoisted.iter().copied() {
            match item {
                Hoisted::Import(import) => {
                    for spec in &import.specifiers {
                        names.push((spec.local_name(), DeclKind::Import));
                    }
                }
                Hoisted::Var(var) | Hoisted::Decl(Decl::Var(var)) => {
                    let kind = match var.kind {
                        VarDeclKind::Var => DeclKind::Var,
                        VarDeclKind::Let => DeclKind::Let,
                        VarDeclKind::Const => DeclKind::Const,
                    };
                    for declarator in &var.declarations {
                        let mut idents = Vec::new();
                        pattern_idents(&declarator.pattern.value, &mut idents);
                        names.extend(idents.into_iter().map(|ident| (ident, kind)));
                    }
                }
                Hoisted::Decl(Decl::Function(func)) => names.push((&func.name, DeclKind::Function)),
                Hoisted::Decl(Decl::Class(class)) => names.push((&class.name, DeclKind::Class)),
                Hoisted::Decl(Decl::Enum(decl)) => names.push((&decl.name, DeclKind::Enum)),
                Hoisted::Decl(Decl::Interface(decl)) => names.push((&decl.name, DeclKind::Interface)),
                Hoisted::Decl(Decl::TypeAlias(decl)) => names.push((&decl.name, DeclKind::TypeAlias)),
                Hoisted::Decl(Decl::Module(module)) => {
                    if let ModuleName::Ident(name) = &module.name {
                        let instantiated = module.has_values();
                        names.push((name, DeclKind::Namespace { instantiated }));
                    }
                }
            }
        }

        let mut groups: Vec<(&str, Vec<(&Node<Ident>, DeclKind)>)> = Vec::new();
        for (ident, kind) in names {
            match groups.iter_mut().find(|(name, _)| *name == ident.value.name) {
                Some((_, group)) => group.push((ident, kind)),
                None => groups.push((&ident.value.name, vec![(ident, kind)])),
            }
        }

        for (name, group) in groups {
            let conflicting = group.iter().enumerate().any(|(i, (_, a))| {
                group[i + 1..].iter().any(|(_, b)| !a.can_merge(*b))
            });
            if !conflicting {
                continue;
            }
            let block_scoped = group
                .iter()
                .any(|(_, kind)| matches!(kind, DeclKind::Let | DeclKind::Const));
            for (ident, _) in &group {
                let kind = if block_scoped {
                    TypeErrorKind::RedeclareBlockScoped(name.to_string())
                } else {
                    TypeErrorKind::DuplicateIdentifier(name.to_string())
                };
                self.report(kind, ident.span);
            }
        }
    }
}

// =============================================================================
// Collection of hoisted declarations
// =============================================================================

/// `declare global { ... }` body, if `decl` is one.
pub(crate) fn global_augmentation(decl: &Decl) -> Option<&ModuleBody> {
    match decl {
        Decl::Module(module) => global_body(module),
        _ => None,
    }
}

fn global_body(module: &ModuleDecl) -> Option<&ModuleBody> {
    match module {
        ModuleDecl {
            name: ModuleName::Ident(name),
            body,
            is_declare: true,
        } if name.value.name == "global" => Some(body),
        _ => None,
    }
}

fn is_ambient_module(decl: &Decl) -> bool {
    matches!(
        decl,
        Decl::Module(ModuleDecl {
            name: ModuleName::String(_),
            ..
        })
    )
}

/// Declarations bound at the top of a module, namespace or script.
pub(crate) fn collect_module_hoisted<'a>(items: &'a [Node<ModuleItem>], out: &mut Vec<Hoisted<'a>>) {
    for item in items {
        match &item.value {
            ModuleItem::Import(import) => out.push(Hoisted::Import(import)),
            ModuleItem::Decl(decl) => {
                if !is_ambient_module(&decl.value) && global_augmentation(&decl.value).is_none() {
                    out.push(Hoisted::Decl(&decl.value));
                }
            }
            ModuleItem::Export(ExportDecl::Decl(decl) | ExportDecl::DefaultDecl(decl)) => {
                out.push(Hoisted::Decl(&decl.value));
            }
            ModuleItem::Export(_) => {}
            ModuleItem::Stmt(stmt) => collect_stmt_hoisted(&stmt.value, out),
        }
    }
}

/// Declarations bound at the top of a function body.
pub(crate) fn collect_function_hoisted<'a>(stmts: &'a [Node<Stmt>], out: &mut Vec<Hoisted<'a>>) {
    for stmt in stmts {
        collect_stmt_hoisted(&stmt.value, out);
    }
}

/// Block-scoped declarations of a block; `var` belongs to the function.
pub(crate) fn collect_block_hoisted<'a>(stmts: &'a [Node<Stmt>], out: &mut Vec<Hoisted<'a>>) {
    for stmt in stmts {
        match &stmt.value {
            Stmt::VarDecl(var) if var.kind.is_block_scoped() => out.push(Hoisted::Var(var)),
            Stmt::Decl(decl) => match &decl.value {
                Decl::Var(var) if !var.kind.is_block_scoped() => {}
                other => out.push(Hoisted::Decl(other)),
            },
            _ => {}
        }
    }
}

fn collect_stmt_hoisted<'a>(stmt: &'a Stmt, out: &mut Vec<Hoisted<'a>>) {
    match stmt {
        Stmt::VarDecl(var) => out.push(Hoisted::Var(var)),
        Stmt::Decl(decl) => out.push(Hoisted::Decl(&decl.value)),
        other => collect_nested_vars(other, out),
    }
}

/// `var` declarations nested in control flow, hoisted to the function.
fn collect_nested_vars<'a>(stmt: &'a Stmt, out: &mut Vec<Hoisted<'a>>) {
    fn visit<'a>(stmt: &'a Node<Stmt>, out: &mut Vec<Hoisted<'a>>) {
        match &stmt.value {
            Stmt::VarDecl(var) if var.kind == VarDeclKind::Var => out.push(Hoisted::Var(var)),
            other => collect_nested_vars(other, out),
        }
    }

    match stmt {
        Stmt::Block(block) => {
            for inner in &block.stmts {
                visit(inner, out);
            }
        }
        Stmt::If {
            then_stmt,
            else_stmt,
            ..
        } => {
            visit(then_stmt, out);
            if let Some(else_stmt) = else_stmt {
                visit(else_stmt, out);
            }
        }
        Stmt::For { init, body, .. } => {
            if let Some(keel_ast::ForInit::VarDecl(var)) = init {
                if var.kind == VarDeclKind::Var {
                    out.push(Hoisted::Var(var));
                }
            }
            visit(body, out);
        }
        Stmt::ForIn { left, body, .. } | Stmt::ForOf { left, body, .. } => {
            if let keel_ast::ForInLeft::VarDecl(var) = left {
                if var.kind == VarDeclKind::Var {
                    out.push(Hoisted::Var(var));
                }
            }
            visit(body, out);
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => visit(body, out),
        Stmt::Labeled { stmt, .. } => visit(stmt, out),
        Stmt::Try {
            block,
            catch,
            finally,
        } => {
            for inner in &block.value.stmts {
                visit(inner, out);
            }
            if let Some(catch) = catch {
                for inner in &catch.body.value.stmts {
                    visit(inner, out);
                }
            }
            if let Some(finally) = finally {
                for inner in &finally.value.stmts {
                    visit(inner, out);
                }
            }
        }
        Stmt::Switch { cases, .. } => {
            for case in cases {
                for inner in &case.consequent {
                    visit(inner, out);
                }
            }
        }
        _ => {}
    }
}

/// Names a declaration binds in either space.
pub(crate) fn declared_names(decl: &Decl) -> Vec<&str> {
    match decl {
        Decl::Interface(decl) => vec![decl.name.value.name.as_str()],
        Decl::TypeAlias(decl) => vec![decl.name.value.name.as_str()],
        other => other.value_names(),
    }
}

/// Identifier nodes bound by a pattern.
pub(crate) fn pattern_idents<'a>(pattern: &'a Pattern, out: &mut Vec<&'a Node<Ident>>) {
    match pattern {
        Pattern::Ident { name, .. } => out.push(name),
        Pattern::Array { elements, rest } => {
            for element in elements.iter().flatten() {
                pattern_idents(&element.value, out);
            }
            if let Some(rest) = rest {
                pattern_idents(&rest.value, out);
            }
        }
        Pattern::Object { properties, rest } => {
            for prop in properties {
                pattern_idents(&prop.value.value, out);
            }
            if let Some(rest) = rest {
                pattern_idents(&rest.value, out);
            }
        }
        Pattern::Assignment { pattern, .. } => pattern_idents(&pattern.value, out),
    }
}
