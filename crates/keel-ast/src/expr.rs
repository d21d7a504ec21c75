//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(Ident),
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Node<Expr>>,
    },
    Assignment {
        target: Box<Node<Expr>>,
        op: AssignmentOp,
        value: Box<Node<Expr>>,
    },
    Call {
        callee: Box<Node<Expr>>,
        type_args: Option<Vec<Node<Type>>>,
        args: Vec<Node<Expr>>,
    },
    Member {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },
    Index {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },
    Array(Vec<Option<Node<Expr>>>),
    Object(Vec<ObjectProperty>),
    /// `(params) => body`
    Arrow {
        type_params: Option<Vec<TypeParam>>,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: ArrowBody,
        is_async: bool,
    },
    Function {
        name: Option<Node<Ident>>,
        type_params: Option<Vec<TypeParam>>,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: Box<Node<BlockStmt>>,
        is_async: bool,
        is_generator: bool,
    },
    Ternary {
        condition: Box<Node<Expr>>,
        then_expr: Box<Node<Expr>>,
        else_expr: Box<Node<Expr>>,
    },
    /// Template literal: `hello ${expr}`; `quasis.len() == exprs.len() + 1`
    Template {
        quasis: Vec<TemplateQuasi>,
        exprs: Vec<Node<Expr>>,
    },
    New {
        callee: Box<Node<Expr>>,
        type_args: Option<Vec<Node<Type>>>,
        args: Vec<Node<Expr>>,
    },
    /// Type assertion: `expr as Type` or `<Type>expr`
    TypeCast {
        expr: Box<Node<Expr>>,
        ty: Box<Node<Type>>,
    },
    Await(Box<Node<Expr>>),
    Paren(Box<Node<Expr>>),
    This,
    Super,
    Sequence(Vec<Node<Expr>>),
    /// `...expr` in arguments and array literals
    Spread(Box<Node<Expr>>),
    /// `f?.(args)`
    OptionalCall {
        callee: Box<Node<Expr>>,
        args: Vec<Node<Expr>>,
    },
    OptionalIndex {
        object: Box<Node<Expr>>,
        index: Box<Node<Expr>>,
    },
    /// `a?.b`; `a?.[i]` is `OptionalIndex`
    OptionalMember {
        object: Box<Node<Expr>>,
        property: Node<Ident>,
    },
    /// `` tag`...` ``
    TaggedTemplate {
        tag: Box<Node<Expr>>,
        quasis: Vec<TemplateQuasi>,
        exprs: Vec<Node<Expr>>,
    },
    /// `expr!`, erased on emit
    NonNullAssertion(Box<Node<Expr>>),
    /// Meta property: new.target
    MetaProperty {
        meta: Node<Ident>,
        property: Node<Ident>,
    },
    /// `yield expr` or `yield* expr`
    Yield {
        argument: Option<Box<Node<Expr>>>,
        delegate: bool,
    },
}

impl Expr {
    /// Strips parentheses, type assertions and non-null assertions.
    pub fn unwrap_transparent(&self) -> &Expr {
        match self {
            Expr::Paren(inner) | Expr::NonNullAssertion(inner) => inner.value.unwrap_transparent(),
            Expr::TypeCast { expr, .. } => expr.value.unwrap_transparent(),
            other => other,
        }
    }
}

/// Literal values. `raw` keeps the exact source spelling for re-emission.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number { value: f64, raw: String },
    String { value: String, raw: String },
    Boolean(bool),
    Null,
    RegExp { pattern: String, flags: String },
}

/// One literal chunk of a template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateQuasi {
    pub cooked: String,
    pub raw: String,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
    NullishCoalesce,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,

    // Other
    In,
    InstanceOf,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    pub fn is_update(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
        )
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    AndAssign,
    OrAssign,
    NullishAssign,
}

/// Arrow function body
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Node<Expr>>),
    Block(Box<Node<BlockStmt>>),
}

/// Object property
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    Property {
        key: PropertyName,
        value: Node<Expr>,
        shorthand: bool,
    },
    Method {
        key: PropertyName,
        type_params: Option<Vec<TypeParam>>,
        params: Vec<Param>,
        return_type: Option<Box<Node<Type>>>,
        body: Node<BlockStmt>,
        is_async: bool,
        is_generator: bool,
    },
    Getter {
        key: PropertyName,
        return_type: Option<Box<Node<Type>>>,
        body: Node<BlockStmt>,
    },
    Setter {
        key: PropertyName,
        param: Param,
        body: Node<BlockStmt>,
    },
    Spread(Node<Expr>),
}

/// Property name
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Ident(Node<Ident>),
    String(String),
    Number(f64),
    Computed(Box<Node<Expr>>),
}

impl PropertyName {
    /// Property key as a string, when it is known without evaluation.
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyName::Ident(ident) => Some(ident.value.name.clone()),
            PropertyName::String(s) => Some(s.clone()),
            PropertyName::Number(n) => Some(format_number(*n)),
            PropertyName::Computed(_) => None,
        }
    }
}

/// Formats a number the way JavaScript's `Number.prototype.toString` does
/// for the values that appear in source code.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

// Display implementations

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalesce => "??",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AssignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::AddAssign => "+=",
            AssignmentOp::SubAssign => "-=",
            AssignmentOp::MulAssign => "*=",
            AssignmentOp::DivAssign => "/=",
            AssignmentOp::ModAssign => "%=",
            AssignmentOp::PowAssign => "**=",
            AssignmentOp::LeftShiftAssign => "<<=",
            AssignmentOp::RightShiftAssign => ">>=",
            AssignmentOp::UnsignedRightShiftAssign => ">>>=",
            AssignmentOp::BitAndAssign => "&=",
            AssignmentOp::BitOrAssign => "|=",
            AssignmentOp::BitXorAssign => "^=",
            AssignmentOp::AndAssign => "&&=",
            AssignmentOp::OrAssign => "||=",
            AssignmentOp::NullishAssign => "??=",
        };
        write!(f, "{}", s)
    }
}
