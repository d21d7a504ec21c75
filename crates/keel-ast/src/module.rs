//! Module system definitions for the AST

use super::*;

/// Module item (top-level in a module)
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    /// Import declaration
    Import(ImportDecl),

    /// Export declaration
    Export(ExportDecl),

    /// Statement
    Stmt(Node<Stmt>),

    /// Declaration
    Decl(Node<Decl>),
}

/// Import declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    /// Module specifier, with the span of the string literal
    pub source: Node<String>,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// import name from "module"
    Default(Node<Ident>),

    /// import * as name from "module"
    Namespace(Node<Ident>),

    /// import { name } from "module" or import { name as alias } from "module"
    Named {
        imported: Node<Ident>,
        local: Option<Node<Ident>>,
        type_only: bool,
    },
}

impl ImportSpecifier {
    /// The name this specifier binds in the importing module.
    pub fn local_name(&self) -> &Node<Ident> {
        match self {
            ImportSpecifier::Default(name) | ImportSpecifier::Namespace(name) => name,
            ImportSpecifier::Named { imported, local, .. } => local.as_ref().unwrap_or(imported),
        }
    }
}

/// Export declaration
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// export { name } or export { name } from "module"
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<Node<String>>,
        type_only: bool,
    },

    /// export default expr
    Default(Node<Expr>),

    /// export default declaration
    DefaultDecl(Box<Node<Decl>>),

    /// export * from "module"
    All {
        source: Node<String>,
        as_name: Option<Node<Ident>>,
    },

    /// export declaration
    Decl(Box<Node<Decl>>),

    /// export = expr
    Assign(Node<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Node<Ident>,
    pub exported: Option<Node<Ident>>,
    pub type_only: bool,
}

impl ExportSpecifier {
    pub fn exported_name(&self) -> &str {
        &self.exported.as_ref().unwrap_or(&self.local).value.name
    }
}

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Node<ModuleItem>>,
    pub span: Span,
}

impl Program {
    /// A file is an external module once it imports or exports anything.
    pub fn is_external_module(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item.value, ModuleItem::Import(_) | ModuleItem::Export(_)))
    }

    /// Module specifiers referenced by imports and re-exports, in source order.
    pub fn module_references(&self) -> Vec<&Node<String>> {
        self.items
            .iter()
            .filter_map(|item| match &item.value {
                ModuleItem::Import(import) => Some(&import.source),
                ModuleItem::Export(ExportDecl::Named {
                    source: Some(source),
                    ..
                }) => Some(source),
                ModuleItem::Export(ExportDecl::All { source, .. }) => Some(source),
                _ => None,
            })
            .collect()
    }
}
