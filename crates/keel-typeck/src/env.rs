//! Type environment (scoped symbol table)

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::types::{PropertySig, Shape, Type};

/// How a name was declared; decides redeclaration and assignment rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Let,
    Const,
    Param,
    Function,
    Class,
    Enum,
    Namespace,
    Import,
    Interface,
    TypeAlias,
    TypeParam,
    Builtin,
}

impl SymbolKind {
    pub fn is_block_scoped(self) -> bool {
        matches!(self, SymbolKind::Let | SymbolKind::Const)
    }
}

/// A declared name. A symbol may carry a value meaning, a type meaning, or
/// both (classes and enums).
#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub value: Option<Type>,
    pub ty: Option<Type>,
    /// Members of a namespace or namespace import, for `ns.T` type references
    pub exports: Option<Rc<ModuleExports>>,
}

impl Symbol {
    pub fn value(kind: SymbolKind, ty: Type) -> Self {
        Self {
            kind,
            value: Some(ty),
            ty: None,
            exports: None,
        }
    }

    pub fn type_only(kind: SymbolKind, ty: Type) -> Self {
        Self {
            kind,
            value: None,
            ty: Some(ty),
            exports: None,
        }
    }
}

/// What an external module, ambient module or namespace makes visible.
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    pub values: BTreeMap<String, Type>,
    pub types: BTreeMap<String, Type>,
    pub namespaces: BTreeMap<String, Rc<ModuleExports>>,
    /// `export =` replaces the module object; members are not checked
    pub export_equals: bool,
}

impl ModuleExports {
    /// An export table that accepts every member as `any`.
    pub fn opaque() -> Self {
        Self {
            export_equals: true,
            ..Self::default()
        }
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.export_equals || self.values.contains_key(name) || self.types.contains_key(name)
    }

    /// Value of `import * as ns`: a closed object of the exported values.
    pub fn namespace_object(&self, name: &str) -> Type {
        if self.export_equals {
            return Type::Any;
        }
        let mut shape = Shape::named(format!("typeof {}", name));
        for (member, ty) in &self.values {
            shape.properties.push(PropertySig::new(member.clone(), ty.clone()));
        }
        Type::object(shape)
    }

    /// Adds everything from `other` except its default export.
    pub fn merge_star(&mut self, other: &ModuleExports) {
        if other.export_equals {
            return;
        }
        for (name, ty) in &other.values {
            if name != "default" {
                self.values.entry(name.clone()).or_insert_with(|| ty.clone());
            }
        }
        for (name, ty) in &other.types {
            self.types.entry(name.clone()).or_insert_with(|| ty.clone());
        }
        for (name, ns) in &other.namespaces {
            self.namespaces.entry(name.clone()).or_insert_with(|| ns.clone());
        }
    }
}

/// Type environment with scoped symbol tables
#[derive(Debug, Clone)]
pub struct TypeEnv {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares `name` in the innermost scope, merging with an existing
    /// declaration of the other meaning (an interface next to a variable).
    pub fn declare(&mut self, name: impl Into<String>, symbol: Symbol) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        let name = name.into();
        match scope.get_mut(&name) {
            Some(existing) => {
                if symbol.value.is_some() {
                    existing.value = symbol.value;
                    existing.kind = symbol.kind;
                }
                if symbol.ty.is_some() {
                    existing.ty = symbol.ty;
                }
                if symbol.exports.is_some() {
                    existing.exports = symbol.exports;
                }
            }
            None => {
                scope.insert(name, symbol);
            }
        }
    }

    /// Binds `name` in the innermost scope, replacing any earlier symbol.
    pub fn insert(&mut self, name: impl Into<String>, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), symbol);
        }
    }

    /// Declares `name` in the outermost (global) scope.
    pub fn declare_global(&mut self, name: impl Into<String>, symbol: Symbol) {
        let saved: Vec<_> = self.scopes.drain(1..).collect();
        self.declare(name, symbol);
        self.scopes.extend(saved);
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Nearest declaration of `name` that has a value meaning.
    pub fn lookup_value(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .filter_map(|scope| scope.get(name))
            .find(|symbol| symbol.value.is_some())
    }

    /// Nearest declaration of `name` that has a type meaning.
    pub fn lookup_type(&self, name: &str) -> Option<&Type> {
        self.scopes
            .iter()
            .rev()
            .filter_map(|scope| scope.get(name))
            .find_map(|symbol| symbol.ty.as_ref())
    }

    pub fn lookup_namespace(&self, name: &str) -> Option<Rc<ModuleExports>> {
        self.scopes
            .iter()
            .rev()
            .filter_map(|scope| scope.get(name))
            .find_map(|symbol| symbol.exports.clone())
    }

    pub fn lookup_in_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    /// Replaces the value type of the nearest declaration of `name`.
    pub fn set_value(&mut self, name: &str, ty: Type) {
        if let Some(symbol) = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        {
            symbol.value = Some(ty);
        }
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoping_and_merging() {
        let mut env = TypeEnv::new();
        env.declare("x", Symbol::value(SymbolKind::Var, Type::Number));
        env.push_scope();
        env.declare("x", Symbol::value(SymbolKind::Let, Type::String));
        assert_eq!(env.lookup_value("x").and_then(|s| s.value.clone()), Some(Type::String));

        env.declare("Point", Symbol::type_only(SymbolKind::Interface, Type::Any));
        env.declare("Point", Symbol::value(SymbolKind::Const, Type::Number));
        let point = env.lookup("Point").expect("declared");
        assert!(point.value.is_some() && point.ty.is_some());

        env.declare_global("g", Symbol::value(SymbolKind::Var, Type::Boolean));
        env.pop_scope();
        assert_eq!(env.lookup_value("x").and_then(|s| s.value.clone()), Some(Type::Number));
        assert!(env.lookup_value("g").is_some());
        assert!(env.lookup_type("Point").is_none());
    }

    #[test]
    fn test_namespace_object_is_closed() {
        let mut exports = ModuleExports::default();
        exports.values.insert("a".into(), Type::Number);
        let ns = exports.namespace_object("m");
        let shape = ns.as_shape().expect("object");
        assert!(shape.closed);
        assert!(shape.property("a").is_some());
        assert!(ModuleExports::opaque().has_member("anything"));
    }
}
