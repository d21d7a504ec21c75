//! Emit errors

use keel_ast::Span;
use thiserror::Error;

/// Constructs the emitter cannot lower for the selected target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmitErrorKind {
    #[error("Accessors are only available when targeting ECMAScript 5 and higher.")]
    AccessorsBelowEs5,

    #[error("Generators are only available when targeting ECMAScript 2015 or higher.")]
    Generator,

    #[error("Async functions are only available when targeting ECMAScript 2015 or higher.")]
    AsyncFunction,

    #[error("Nested destructuring patterns are only available when targeting ECMAScript 2015 or higher.")]
    NestedDestructuring,

    #[error(
        "Spread in call arguments is only supported on identifier or property-access callees \
         when targeting below ECMAScript 2015."
    )]
    UnsupportedSpread,
}

impl EmitErrorKind {
    pub fn code(self) -> u32 {
        match self {
            EmitErrorKind::AccessorsBelowEs5 => 1056,
            EmitErrorKind::Generator => 1220,
            EmitErrorKind::AsyncFunction => 1311,
            EmitErrorKind::NestedDestructuring => 1312,
            EmitErrorKind::UnsupportedSpread => 1313,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TS{}: {kind}", .kind.code())]
pub struct EmitError {
    pub kind: EmitErrorKind,
    pub span: Span,
}

impl EmitError {
    pub fn new(kind: EmitErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
