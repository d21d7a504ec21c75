pub mod token;
pub mod lexer;

pub use token::{LexError, Token, TokenKind};
pub use lexer::Lexer;

/// Tokenizes `source`, returning the tokens (ending in `Eof`) together with
/// any lexical errors encountered along the way.
pub fn tokenize(source: &str, file_id: usize) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::with_file_id(source, file_id);
    let tokens = lexer.tokenize();
    (tokens, lexer.into_errors())
}
