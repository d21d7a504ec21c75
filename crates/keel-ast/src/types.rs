//! Type annotations as written in source. These are erased on emit and only
//! consulted by the checker.

use super::*;
use std::fmt;

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Primitive types: number, string, boolean, void, null, undefined, any, never, unknown, object
    Primitive(PrimitiveType),
    /// Array type: T[]
    Array(Box<Node<Type>>),
    Tuple(Vec<Node<Type>>),
    Union(Vec<Node<Type>>),
    Intersection(Vec<Node<Type>>),
    Function(FunctionType),
    /// Constructor type: new (args) => InstanceType
    Constructor(FunctionType),
    /// Type reference: `SomeType`, `ns.SomeType`, `Array<T>`
    TypeRef {
        name: Node<Ident>,
        type_args: Option<Vec<Node<Type>>>,
    },
    Object(ObjectType),
    Literal(LiteralType),
    Paren(Box<Node<Type>>),
    Conditional {
        check_type: Box<Node<Type>>,
        extends_type: Box<Node<Type>>,
        true_type: Box<Node<Type>>,
        false_type: Box<Node<Type>>,
    },
    Mapped {
        type_param: Node<Ident>,
        constraint: Box<Node<Type>>,
        value_type: Box<Node<Type>>,
        readonly: Option<MappedModifier>,
        optional: Option<MappedModifier>,
    },
    IndexedAccess {
        object_type: Box<Node<Type>>,
        index_type: Box<Node<Type>>,
    },
    Keyof(Box<Node<Type>>),
    /// Type query: typeof value
    TypeQuery(Node<Ident>),
    /// Type predicate in return position: `x is T`
    Predicate {
        param: Node<Ident>,
        ty: Box<Node<Type>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Number,
    String,
    Boolean,
    Symbol,
    Object,
    Void,
    Null,
    Undefined,
    Any,
    Never,
    Unknown,
}

impl PrimitiveType {
    /// Primitive named by a type keyword such as `number` or `void`.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "number" => PrimitiveType::Number,
            "string" => PrimitiveType::String,
            "boolean" => PrimitiveType::Boolean,
            "symbol" => PrimitiveType::Symbol,
            "object" => PrimitiveType::Object,
            "void" => PrimitiveType::Void,
            "null" => PrimitiveType::Null,
            "undefined" => PrimitiveType::Undefined,
            "any" => PrimitiveType::Any,
            "never" => PrimitiveType::Never,
            "unknown" => PrimitiveType::Unknown,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub type_params: Option<Vec<TypeParam>>,
    pub params: Vec<FunctionTypeParam>,
    pub return_type: Box<Node<Type>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeParam {
    pub name: Option<Node<Ident>>,
    pub ty: Node<Type>,
    pub optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub members: Vec<ObjectTypeMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectTypeMember {
    Property {
        name: PropertyName,
        ty: Option<Node<Type>>,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: PropertyName,
        type_params: Option<Vec<TypeParam>>,
        params: Vec<FunctionTypeParam>,
        return_type: Option<Node<Type>>,
        optional: bool,
    },
    IndexSignature {
        key_name: Node<Ident>,
        key_type: Node<Type>,
        value_type: Node<Type>,
        readonly: bool,
    },
    CallSignature {
        type_params: Option<Vec<TypeParam>>,
        params: Vec<FunctionTypeParam>,
        return_type: Option<Node<Type>>,
    },
    ConstructSignature {
        type_params: Option<Vec<TypeParam>>,
        params: Vec<FunctionTypeParam>,
        return_type: Option<Node<Type>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// Type parameter (generic)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Node<Ident>,
    pub constraint: Option<Box<Node<Type>>>,
    pub default: Option<Box<Node<Type>>>,
}

/// Modifier for mapped types (+/- readonly, +/- optional)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    Add,
    Remove,
    Present,
}

// Display implementations

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Symbol => "symbol",
            PrimitiveType::Object => "object",
            PrimitiveType::Void => "void",
            PrimitiveType::Null => "null",
            PrimitiveType::Undefined => "undefined",
            PrimitiveType::Any => "any",
            PrimitiveType::Never => "never",
            PrimitiveType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralType::String(s) => write!(f, "\"{}\"", s),
            LiteralType::Number(n) => write!(f, "{}", format_number(*n)),
            LiteralType::Boolean(b) => write!(f, "{}", b),
        }
    }
}
