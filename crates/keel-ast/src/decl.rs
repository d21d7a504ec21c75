//! Declaration definitions for the AST

use super::*;
use std::fmt;

/// Declaration node
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
    Module(ModuleDecl),
    Var(VarDecl),
}

impl Decl {
    /// Declarations that exist only in the type system produce no output.
    pub fn is_type_only(&self) -> bool {
        match self {
            Decl::Interface(_) | Decl::TypeAlias(_) => true,
            Decl::Function(func) => func.is_declare || func.body.is_none(),
            Decl::Class(class) => class.is_declare,
            Decl::Enum(decl) => decl.is_declare,
            Decl::Module(module) => module.is_declare || !module.has_values(),
            Decl::Var(var) => var.is_declare,
        }
    }

    /// Names bound in the value space by this declaration.
    pub fn value_names(&self) -> Vec<&str> {
        match self {
            Decl::Function(func) => vec![func.name.value.name.as_str()],
            Decl::Class(class) => vec![class.name.value.name.as_str()],
            Decl::Enum(decl) => vec![decl.name.value.name.as_str()],
            Decl::Module(module) => match &module.name {
                ModuleName::Ident(name) => vec![name.value.name.as_str()],
                ModuleName::String(_) => vec![],
            },
            Decl::Var(var) => var
                .declarations
                .iter()
                .flat_map(|d| d.pattern.value.bound_names())
                .collect(),
            Decl::Interface(_) | Decl::TypeAlias(_) => vec![],
        }
    }
}

/// `function name<T>(params): R { body }`; `body` is `None` for overloads and `declare`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub params: Vec<Param>,
    pub return_type: Option<Box<Node<Type>>>,
    pub body: Option<Node<BlockStmt>>,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_declare: bool,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: Node<Pattern>,
    pub type_annotation: Option<Box<Node<Type>>>,
    pub optional: bool,
    pub is_rest: bool,
    pub decorators: Vec<Node<Expr>>,
    /// Set on constructor parameter properties (`constructor(private x: T)`)
    pub accessibility: Option<AccessModifier>,
    pub is_readonly: bool,
}

impl Param {
    pub fn simple(pattern: Node<Pattern>) -> Self {
        Self {
            pattern,
            type_annotation: None,
            optional: false,
            is_rest: false,
            decorators: vec![],
            accessibility: None,
            is_readonly: false,
        }
    }

    /// Whether this constructor parameter also declares an instance property.
    pub fn is_parameter_property(&self) -> bool {
        self.accessibility.is_some() || self.is_readonly
    }

    pub fn default_value(&self) -> Option<&Node<Expr>> {
        match &self.pattern.value {
            Pattern::Assignment { default, .. } => Some(default),
            _ => None,
        }
    }
}

/// `class Name<T> extends Base implements I { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub extends: Option<ClassExtends>,
    pub implements: Vec<Node<Type>>,
    pub members: Vec<Node<ClassMember>>,
    pub is_abstract: bool,
    pub is_declare: bool,
    pub decorators: Vec<Node<Expr>>,
}

impl ClassDecl {
    pub fn constructor(&self) -> Option<(&Vec<Param>, Option<&Node<BlockStmt>>)> {
        self.members.iter().find_map(|m| match &m.value {
            ClassMember::Constructor { params, body, .. } => Some((params, body.as_ref())),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassExtends {
    pub base: Box<Node<Expr>>,
    pub type_args: Option<Vec<Node<Type>>>,
}

/// Class member
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Constructor {
        params: Vec<Param>,
        body: Option<Node<BlockStmt>>,
        access: AccessModifier,
    },

    Method {
        name: PropertyName,
        type_params: Option<Vec<TypeParam>>,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: Option<Node<BlockStmt>>,
        access: AccessModifier,
        is_static: bool,
        is_async: bool,
        is_generator: bool,
        is_abstract: bool,
        is_optional: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Property/field
    Property {
        name: PropertyName,
        type_annotation: Option<Box<Node<Type>>>,
        init: Option<Node<Expr>>,
        access: AccessModifier,
        is_static: bool,
        is_readonly: bool,
        is_abstract: bool,
        is_optional: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Getter
    Getter {
        name: PropertyName,
        return_type: Option<Box<Node<Type>>>,
        body: Option<Node<BlockStmt>>,
        access: AccessModifier,
        is_static: bool,
        is_abstract: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Setter
    Setter {
        name: PropertyName,
        param: Param,
        body: Option<Node<BlockStmt>>,
        access: AccessModifier,
        is_static: bool,
        is_abstract: bool,
        decorators: Vec<Node<Expr>>,
    },

    /// Index signature
    IndexSignature {
        key_name: Node<Ident>,
        key_type: Node<Type>,
        value_type: Node<Type>,
        is_readonly: bool,
    },
}

impl ClassMember {
    pub fn is_static(&self) -> bool {
        match self {
            ClassMember::Method { is_static, .. }
            | ClassMember::Property { is_static, .. }
            | ClassMember::Getter { is_static, .. }
            | ClassMember::Setter { is_static, .. } => *is_static,
            ClassMember::Constructor { .. } | ClassMember::IndexSignature { .. } => false,
        }
    }

    pub fn name(&self) -> Option<&PropertyName> {
        match self {
            ClassMember::Method { name, .. }
            | ClassMember::Property { name, .. }
            | ClassMember::Getter { name, .. }
            | ClassMember::Setter { name, .. } => Some(name),
            ClassMember::Constructor { .. } | ClassMember::IndexSignature { .. } => None,
        }
    }

    pub fn decorators(&self) -> &[Node<Expr>] {
        match self {
            ClassMember::Method { decorators, .. }
            | ClassMember::Property { decorators, .. }
            | ClassMember::Getter { decorators, .. }
            | ClassMember::Setter { decorators, .. } => decorators,
            ClassMember::Constructor { .. } | ClassMember::IndexSignature { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

/// `interface Name<T> extends A, B { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub extends: Vec<Node<Type>>,
    pub members: Vec<ObjectTypeMember>,
    pub is_declare: bool,
}

/// `type Name<T> = ...`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Node<Ident>,
    pub type_params: Option<Vec<TypeParam>>,
    pub ty: Node<Type>,
    pub is_declare: bool,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Node<Ident>,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
    pub is_declare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: Node<Ident>,
    pub init: Option<Node<Expr>>,
}

/// `namespace`/`module` block
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: ModuleName,
    pub body: ModuleBody,
    pub is_declare: bool,
}

impl ModuleDecl {
    /// A namespace without value declarations is erased entirely.
    pub fn has_values(&self) -> bool {
        match &self.body {
            ModuleBody::Namespace(inner) => inner.value.has_values(),
            ModuleBody::Block(items) => items.iter().any(|item| match &item.value {
                ModuleItem::Stmt(_) => true,
                ModuleItem::Decl(decl) => !decl.value.is_type_only(),
                ModuleItem::Export(ExportDecl::Decl(decl)) => !decl.value.is_type_only(),
                ModuleItem::Export(_) | ModuleItem::Import(_) => false,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleName {
    Ident(Node<Ident>),
    /// Ambient external module: `declare module "name" { ... }`
    String(Node<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleBody {
    Block(Vec<Node<ModuleItem>>),
    /// Dotted namespace: `namespace A.B { ... }`
    Namespace(Box<Node<ModuleDecl>>),
}

// Display implementations

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessModifier::Public => write!(f, "public"),
            AccessModifier::Private => write!(f, "private"),
            AccessModifier::Protected => write!(f, "protected"),
        }
    }
}
