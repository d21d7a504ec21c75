//! Parse error types

use keel_ast::Span;
use thiserror::Error;

/// A syntax error carrying the TypeScript diagnostic code it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TS{code}: {message}")]
pub struct ParseError {
    pub code: u32,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(code: u32, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }
}

impl From<keel_lexer::LexError> for ParseError {
    fn from(err: keel_lexer::LexError) -> Self {
        Self::new(err.code, err.message, err.span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
