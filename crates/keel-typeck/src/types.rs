//! Internal type representation

use std::fmt;

/// Internal type representation used by the type checker
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Primitive types
    Number,
    String,
    Boolean,
    Symbol,
    Void,
    Null,
    Undefined,
    Any,
    Never,
    Unknown,
    /// The non-primitive `object` type
    NonPrimitive,

    /// Literal type
    Literal(LiteralType),

    /// Array type
    Array(Box<Type>),

    /// Tuple type
    Tuple(Vec<Type>),

    /// Union type, flattened and without duplicates
    Union(Vec<Type>),

    /// Function type
    Function(Box<Signature>),

    /// Object, interface, class instance or constructor shape
    Object(Box<Shape>),

    /// Member of the named enum
    Enum(String),

    /// Generic type parameter; related to everything
    TypeParam(String),
}

/// Literal types
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<ParamSig>,
    pub return_type: Type,
    pub has_type_params: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSig {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
    pub is_rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySig {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
    pub is_method: bool,
}

/// Structural object type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    /// Display name (`Point`, `typeof Point`); anonymous shapes print their members
    pub name: Option<String>,
    pub properties: Vec<PropertySig>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    pub index: Option<Type>,
    /// Every member is known, so a missing property is an error
    pub closed: bool,
}

impl Shape {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            closed: true,
            ..Self::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertySig> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Adds a property, replacing an inherited one of the same name.
    pub fn set_property(&mut self, prop: PropertySig) {
        match self.properties.iter_mut().find(|p| p.name == prop.name) {
            Some(existing) => *existing = prop,
            None => self.properties.push(prop),
        }
    }
}

impl Signature {
    pub fn new(params: Vec<ParamSig>, return_type: Type) -> Self {
        Self {
            params,
            return_type,
            has_type_params: false,
        }
    }

    /// Number of arguments a call must supply.
    pub fn min_args(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| !p.optional && !p.is_rest)
            .count()
    }

    /// Upper bound on arguments, or `None` with a rest parameter.
    pub fn max_args(&self) -> Option<usize> {
        if self.params.iter().any(|p| p.is_rest) {
            None
        } else {
            Some(self.params.len())
        }
    }

    /// Declared type of the parameter receiving argument `index`.
    pub fn param_type(&self, index: usize) -> Option<Type> {
        match self.params.get(index) {
            Some(param) if param.is_rest => Some(element_type(&param.ty)),
            Some(param) => Some(param.ty.clone()),
            None => self
                .params
                .last()
                .filter(|p| p.is_rest)
                .map(|p| element_type(&p.ty)),
        }
    }
}

impl ParamSig {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            is_rest: false,
        }
    }
}

impl PropertySig {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            is_method: false,
        }
    }

    pub fn method(name: impl Into<String>, sig: Signature) -> Self {
        Self {
            name: name.into(),
            ty: Type::function(sig),
            optional: false,
            is_method: true,
        }
    }
}

fn element_type(ty: &Type) -> Type {
    match ty {
        Type::Array(elem) => (**elem).clone(),
        _ => Type::Any,
    }
}

impl Type {
    pub fn function(sig: Signature) -> Type {
        Type::Function(Box::new(sig))
    }

    pub fn object(shape: Shape) -> Type {
        Type::Object(Box::new(shape))
    }

    /// Builds a union, flattening nested unions and dropping duplicates.
    /// `any` absorbs everything.
    pub fn union(types: impl IntoIterator<Item = Type>) -> Type {
        let mut members: Vec<Type> = Vec::new();
        for ty in types {
            let parts = match ty {
                Type::Union(inner) => inner,
                other => vec![other],
            };
            for part in parts {
                if part == Type::Any {
                    return Type::Any;
                }
                if !members.contains(&part) {
                    members.push(part);
                }
            }
        }
        match members.len() {
            0 => Type::Never,
            1 => members.remove(0),
            _ => Type::Union(members),
        }
    }

    /// Whether this type relates to everything in both directions.
    pub fn is_any_like(&self) -> bool {
        matches!(self, Type::Any | Type::TypeParam(_))
    }

    /// Literal types widen to their primitive; enum members and other types
    /// are kept.
    pub fn widen(&self) -> Type {
        match self {
            Type::Literal(LiteralType::String(_)) => Type::String,
            Type::Literal(LiteralType::Number(_)) => Type::Number,
            Type::Literal(LiteralType::Boolean(_)) => Type::Boolean,
            Type::Union(members) => Type::union(members.iter().map(Type::widen)),
            Type::Null | Type::Undefined => Type::Any,
            other => other.clone(),
        }
    }

    /// Like `widen`, but keeps `null` and `undefined` as written.
    pub fn widen_literals(&self) -> Type {
        match self {
            Type::Null | Type::Undefined => self.clone(),
            Type::Union(members) => Type::union(members.iter().map(Type::widen_literals)),
            other => other.widen(),
        }
    }

    pub fn contains_literal(&self) -> bool {
        match self {
            Type::Literal(_) => true,
            Type::Union(members) => members.iter().any(Type::contains_literal),
            _ => false,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Type::Object(shape) => Some(shape),
            _ => None,
        }
    }

    /// Signatures a call expression on this type may resolve to.
    pub fn call_signatures(&self) -> Vec<&Signature> {
        match self {
            Type::Function(sig) => vec![sig],
            Type::Object(shape) => shape.call_signatures.iter().collect(),
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Display, following the compiler's own spelling of types in messages
// =============================================================================

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralType::String(s) => write!(f, "\"{}\"", s),
            LiteralType::Number(n) => write!(f, "{}", keel_ast::format_number(*n)),
            LiteralType::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_params(f, &self.params)?;
        write!(f, ") => {}", self.return_type)
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[ParamSig]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if param.is_rest {
            write!(f, "...")?;
        }
        write!(f, "{}", param.name)?;
        if param.optional {
            write!(f, "?")?;
        }
        write!(f, ": {}", param.ty)?;
    }
    Ok(())
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return write!(f, "{}", name);
        }
        if self.properties.is_empty()
            && self.call_signatures.is_empty()
            && self.construct_signatures.is_empty()
            && self.index.is_none()
        {
            return write!(f, "{{}}");
        }
        if self.properties.is_empty() && self.index.is_none() && self.call_signatures.len() == 1 {
            return write!(f, "{}", self.call_signatures[0]);
        }

        write!(f, "{{ ")?;
        for sig in &self.call_signatures {
            write!(f, "(")?;
            write_params(f, &sig.params)?;
            write!(f, "): {}; ", sig.return_type)?;
        }
        for sig in &self.construct_signatures {
            write!(f, "new (")?;
            write_params(f, &sig.params)?;
            write!(f, "): {}; ", sig.return_type)?;
        }
        if let Some(index) = &self.index {
            write!(f, "[x: string]: {}; ", index)?;
        }
        for prop in &self.properties {
            match (&prop.ty, prop.is_method) {
                (Type::Function(sig), true) => {
                    write!(f, "{}(", prop.name)?;
                    write_params(f, &sig.params)?;
                    write!(f, "): {}; ", sig.return_type)?;
                }
                (ty, _) => {
                    let optional = if prop.optional { "?" } else { "" };
                    write!(f, "{}{}: {}; ", prop.name, optional, ty)?;
                }
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Symbol => write!(f, "symbol"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Undefined => write!(f, "undefined"),
            Type::Any => write!(f, "any"),
            Type::Never => write!(f, "never"),
            Type::Unknown => write!(f, "unknown"),
            Type::NonPrimitive => write!(f, "object"),
            Type::Literal(lit) => write!(f, "{}", lit),
            Type::Array(elem) => match **elem {
                Type::Union(_) | Type::Function(_) => write!(f, "({})[]", elem),
                _ => write!(f, "{}[]", elem),
            },
            Type::Tuple(elems) => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    match member {
                        Type::Function(_) => write!(f, "({})", member)?,
                        _ => write!(f, "{}", member)?,
                    }
                }
                Ok(())
            }
            Type::Function(sig) => write!(f, "{}", sig),
            Type::Object(shape) => write!(f, "{}", shape),
            Type::Enum(name) | Type::TypeParam(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_union_flattens_and_dedupes() {
        let ty = Type::union(vec![
            Type::String,
            Type::union(vec![Type::Number, Type::String]),
        ]);
        assert_eq!(ty, Type::Union(vec![Type::String, Type::Number]));
        assert_eq!(Type::union(vec![Type::Number, Type::Any]), Type::Any);
        assert_eq!(Type::union(vec![Type::Boolean]), Type::Boolean);
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Literal(LiteralType::String("bad".into())).to_string(), "\"bad\"");
        assert_eq!(
            Type::Array(Box::new(Type::union(vec![Type::String, Type::Number]))).to_string(),
            "(string | number)[]"
        );
        let sig = Signature::new(
            vec![ParamSig::new("a", Type::Number), ParamSig {
                optional: true,
                ..ParamSig::new("b", Type::String)
            }],
            Type::Void,
        );
        assert_eq!(Type::function(sig.clone()).to_string(), "(a: number, b?: string) => void");

        let mut shape = Shape::default();
        shape.properties.push(PropertySig::new("x", Type::Number));
        shape.properties.push(PropertySig::method("m", sig));
        assert_eq!(
            Type::object(shape).to_string(),
            "{ x: number; m(a: number, b?: string): void; }"
        );
        assert_eq!(Type::object(Shape::named("Point")).to_string(), "Point");
    }

    #[test]
    fn test_widen() {
        let lit = Type::Literal(LiteralType::Number(1.0));
        assert_eq!(lit.widen(), Type::Number);
        assert_eq!(Type::Null.widen(), Type::Any);
        assert_eq!(Type::Null.widen_literals(), Type::Null);
    }

    #[test]
    fn test_signature_arity() {
        let sig = Signature::new(
            vec![
                ParamSig::new("a", Type::Number),
                ParamSig {
                    optional: true,
                    ..ParamSig::new("b", Type::Number)
                },
                ParamSig {
                    is_rest: true,
                    ..ParamSig::new("rest", Type::Array(Box::new(Type::String)))
                },
            ],
            Type::Void,
        );
        assert_eq!(sig.min_args(), 1);
        assert_eq!(sig.max_args(), None);
        assert_eq!(sig.param_type(5), Some(Type::String));
    }
}
