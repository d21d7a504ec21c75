//! Statement definitions for the AST

use super::*;
use std::fmt;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Node<Expr>),
    VarDecl(VarDecl),
    /// Local function, class, enum, interface or alias declaration
    Decl(Box<Node<Decl>>),
    Return(Option<Node<Expr>>),
    If {
        condition: Node<Expr>,
        then_stmt: Box<Node<Stmt>>,
        else_stmt: Option<Box<Node<Stmt>>>,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Node<Expr>>,
        update: Option<Node<Expr>>,
        body: Box<Node<Stmt>>,
    },
    ForIn {
        left: ForInLeft,
        right: Node<Expr>,
        body: Box<Node<Stmt>>,
    },
    ForOf {
        left: ForInLeft,
        right: Node<Expr>,
        body: Box<Node<Stmt>>,
    },
    While {
        condition: Node<Expr>,
        body: Box<Node<Stmt>>,
    },
    DoWhile {
        body: Box<Node<Stmt>>,
        condition: Node<Expr>,
    },
    Block(BlockStmt),
    Break(Option<Node<Ident>>),
    Continue(Option<Node<Ident>>),
    Throw(Node<Expr>),
    Try {
        block: Node<BlockStmt>,
        catch: Option<CatchClause>,
        finally: Option<Node<BlockStmt>>,
    },
    Switch {
        discriminant: Node<Expr>,
        cases: Vec<SwitchCase>,
    },
    Labeled {
        label: Node<Ident>,
        stmt: Box<Node<Stmt>>,
    },
    Empty,
    Debugger,
}

/// Block statement
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub stmts: Vec<Node<Stmt>>,
}

/// Variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarDeclKind,
    pub declarations: Vec<VarDeclarator>,
    /// `declare const x: T;` produces no output
    pub is_declare: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarDeclKind {
    Let,
    Const,
    Var,
}

impl VarDeclKind {
    pub fn is_block_scoped(self) -> bool {
        !matches!(self, VarDeclKind::Var)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub pattern: Node<Pattern>,
    pub init: Option<Node<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Node<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    VarDecl(VarDecl),
    Pattern(Node<Pattern>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Node<Pattern>>,
    pub body: Node<BlockStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Node<Expr>>,
    pub consequent: Vec<Node<Stmt>>,
}

/// Pattern for destructuring
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident {
        name: Node<Ident>,
        type_annotation: Option<Box<Node<Type>>>,
    },
    Array {
        elements: Vec<Option<Node<Pattern>>>,
        rest: Option<Box<Node<Pattern>>>,
    },
    Object {
        properties: Vec<ObjectPatternProperty>,
        rest: Option<Box<Node<Pattern>>>,
    },
    Assignment {
        pattern: Box<Node<Pattern>>,
        default: Box<Node<Expr>>,
    },
}

impl Pattern {
    /// Every identifier this pattern binds, left to right.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Ident { name, .. } => out.push(&name.value.name),
            Pattern::Array { elements, rest } => {
                for element in elements.iter().flatten() {
                    element.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.value.collect_names(out);
                }
            }
            Pattern::Object { properties, rest } => {
                for prop in properties {
                    prop.value.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.value.collect_names(out);
                }
            }
            Pattern::Assignment { pattern, .. } => pattern.value.collect_names(out),
        }
    }

    /// The identifier node for a plain `name` or `name = default` pattern.
    pub fn as_ident(&self) -> Option<&Node<Ident>> {
        match self {
            Pattern::Ident { name, .. } => Some(name),
            Pattern::Assignment { pattern, .. } => pattern.value.as_ident(),
            _ => None,
        }
    }

    pub fn type_annotation(&self) -> Option<&Node<Type>> {
        match self {
            Pattern::Ident {
                type_annotation, ..
            } => type_annotation.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: PropertyName,
    pub value: Node<Pattern>,
    pub shorthand: bool,
}

// Display implementations

impl fmt::Display for VarDeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarDeclKind::Let => write!(f, "let"),
            VarDeclKind::Const => write!(f, "const"),
            VarDeclKind::Var => write!(f, "var"),
        }
    }
}
