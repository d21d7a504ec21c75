//! # Keel AST
//!
//! Abstract syntax tree for the TypeScript subset accepted by the keel
//! compiler. Every node carries a byte span into its source file so that
//! diagnostics can be mapped back to `line,character` positions.

use std::fmt;

// =============================================================================
// Core Types
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod module;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use module::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    #[test]
    fn test_span_merge_and_len() {
        let a = Span::new(4, 9, 2);
        let b = Span::new(1, 6, 2);
        let merged = a.merge(&b);
        assert_eq!(merged, Span::new(1, 9, 2));
        assert_eq!(merged.len(), 8);
        assert!(Span::new(3, 3, 0).is_empty());
    }

    #[test]
    fn test_basic_types() {
        assert_eq!(format!("{}", PrimitiveType::Number), "number");

        let array_type = Type::Array(Box::new(Node::new(
            Type::Primitive(PrimitiveType::String),
            dummy_span(),
        )));

        assert!(matches!(array_type, Type::Array(_)));
    }

    #[test]
    fn test_expressions() {
        let literal = Expr::Literal(Literal::Number {
            value: 42.0,
            raw: "42".to_string(),
        });
        assert!(matches!(literal, Expr::Literal(Literal::Number { value, .. }) if value == 42.0));

        let ident = Expr::Ident(Ident::new("x"));
        assert!(matches!(ident, Expr::Ident(_)));
    }

    #[test]
    fn test_binary_op() {
        assert_eq!(format!("{}", BinaryOp::Add), "+");
        assert_eq!(format!("{}", BinaryOp::StrictEq), "===");
        assert_eq!(format!("{}", AssignmentOp::NullishAssign), "??=");
    }

    #[test]
    fn test_var_decl() {
        let decl = VarDecl {
            kind: VarDeclKind::Let,
            declarations: vec![VarDeclarator {
                pattern: Node::new(
                    Pattern::Ident {
                        name: Node::new(Ident::new("x"), dummy_span()),
                        type_annotation: None,
                    },
                    dummy_span(),
                ),
                init: Some(Node::new(
                    Expr::Literal(Literal::Number {
                        value: 10.0,
                        raw: "10".to_string(),
                    }),
                    dummy_span(),
                )),
            }],
            is_declare: false,
        };

        assert_eq!(decl.kind, VarDeclKind::Let);
        assert_eq!(decl.declarations.len(), 1);
        assert_eq!(decl.declarations[0].pattern.value.bound_names(), vec!["x"]);
    }

    #[test]
    fn test_pattern_bound_names() {
        let ident = |name: &str| {
            Node::new(
                Pattern::Ident {
                    name: Node::new(Ident::new(name), dummy_span()),
                    type_annotation: None,
                },
                dummy_span(),
            )
        };
        let pattern = Pattern::Object {
            properties: vec![ObjectPatternProperty {
                key: PropertyName::Ident(Node::new(Ident::new("a"), dummy_span())),
                value: ident("a"),
                shorthand: true,
            }],
            rest: Some(Box::new(Node::new(
                Pattern::Array {
                    elements: vec![Some(ident("b")), None],
                    rest: Some(Box::new(ident("c"))),
                },
                dummy_span(),
            ))),
        };

        assert_eq!(pattern.bound_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_class_decl() {
        let class = ClassDecl {
            name: Node::new(Ident::new("MyClass"), dummy_span()),
            type_params: None,
            extends: None,
            implements: vec![],
            members: vec![Node::new(
                ClassMember::Property {
                    name: PropertyName::Ident(Node::new(Ident::new("field"), dummy_span())),
                    type_annotation: Some(Box::new(Node::new(
                        Type::Primitive(PrimitiveType::String),
                        dummy_span(),
                    ))),
                    init: None,
                    access: AccessModifier::Private,
                    is_static: false,
                    is_readonly: false,
                    is_abstract: false,
                    is_optional: false,
                    decorators: vec![],
                },
                dummy_span(),
            )],
            is_abstract: false,
            is_declare: false,
            decorators: vec![],
        };

        assert_eq!(class.name.value.name, "MyClass");
        assert_eq!(class.members.len(), 1);
    }

    #[test]
    fn test_property_name_text() {
        let span = dummy_span();
        assert_eq!(
            PropertyName::Ident(Node::new(Ident::new("id"), span)).static_name(),
            Some("id".to_string())
        );
        assert_eq!(
            PropertyName::Number(2.0).static_name(),
            Some("2".to_string())
        );
        assert_eq!(
            PropertyName::Computed(Box::new(Node::new(Expr::This, span))).static_name(),
            None
        );
    }
}
