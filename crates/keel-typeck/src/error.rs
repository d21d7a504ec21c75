//! Type checking errors

use keel_ast::Span;
use thiserror::Error;

/// Semantic error kinds, each mapping to one TypeScript diagnostic code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeErrorKind {
    #[error("Type '{source_type}' is not assignable to type '{target}'.")]
    NotAssignable { source_type: String, target: String },

    #[error("Argument of type '{argument}' is not assignable to parameter of type '{parameter}'.")]
    ArgumentNotAssignable { argument: String, parameter: String },

    /// `expected` is already spelled out (`2`, `1-2`, `at least 1`)
    #[error("Expected {expected} arguments, but got {found}.")]
    ArgumentCount { expected: String, found: usize },

    #[error("Cannot find name '{0}'.")]
    CannotFindName(String),

    #[error("Property '{property}' does not exist on type '{ty}'.")]
    PropertyNotFound { property: String, ty: String },

    #[error("Cannot assign to '{0}' because it is a constant.")]
    AssignToConstant(String),

    #[error("Cannot redeclare block-scoped variable '{0}'.")]
    RedeclareBlockScoped(String),

    #[error("Duplicate identifier '{0}'.")]
    DuplicateIdentifier(String),

    #[error("Cannot find module '{0}'.")]
    CannotFindModule(String),

    #[error("Module '\"{module}\"' has no exported member '{member}'.")]
    NoExportedMember { module: String, member: String },

    #[error("Module '\"{0}\"' has no default export.")]
    NoDefaultExport(String),

    #[error("This expression is not callable.")]
    NotCallable,

    #[error("Value of type '{0}' is not callable. Did you mean to include 'new'?")]
    ClassNotCallable(String),

    #[error("This expression is not constructable.")]
    NotConstructable,

    #[error("'{0}' only refers to a type, but is being used as a value here.")]
    TypeUsedAsValue(String),

    #[error(
        "Experimental support for decorators is a feature that is subject to change in a future release. \
         Set the 'experimentalDecorators' option to remove this warning."
    )]
    ExperimentalDecorators,
}

impl TypeErrorKind {
    pub fn code(&self) -> u32 {
        match self {
            TypeErrorKind::NotAssignable { .. } => 2322,
            TypeErrorKind::ArgumentNotAssignable { .. } => 2345,
            TypeErrorKind::ArgumentCount { .. } => 2554,
            TypeErrorKind::CannotFindName(_) => 2304,
            TypeErrorKind::PropertyNotFound { .. } => 2339,
            TypeErrorKind::AssignToConstant(_) => 2588,
            TypeErrorKind::RedeclareBlockScoped(_) => 2451,
            TypeErrorKind::DuplicateIdentifier(_) => 2300,
            TypeErrorKind::CannotFindModule(_) => 2307,
            TypeErrorKind::NoExportedMember { .. } => 2305,
            TypeErrorKind::NoDefaultExport(_) => 1192,
            TypeErrorKind::NotCallable => 2349,
            TypeErrorKind::ClassNotCallable(_) => 2348,
            TypeErrorKind::NotConstructable => 2351,
            TypeErrorKind::TypeUsedAsValue(_) => 2693,
            TypeErrorKind::ExperimentalDecorators => 1219,
        }
    }
}

/// Type error with location information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TS{}: {kind}", .kind.code())]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        let err = TypeError::new(
            TypeErrorKind::NotAssignable {
                source_type: "string".into(),
                target: "number".into(),
            },
            Span::new(6, 7, 0),
        );
        assert_eq!(err.code(), 2322);
        assert_eq!(
            err.to_string(),
            "TS2322: Type 'string' is not assignable to type 'number'."
        );
        assert_eq!(
            TypeErrorKind::NoExportedMember {
                module: "./b".into(),
                member: "y".into()
            }
            .to_string(),
            "Module '\"./b\"' has no exported member 'y'."
        );
    }
}
