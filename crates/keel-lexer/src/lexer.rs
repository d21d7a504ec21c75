use crate::token::{LexError, Token, TokenKind};
use keel_ast::Span;

/// Multi-character punctuators, longest first so that the first prefix
/// match is the maximal munch.
const PUNCTUATORS: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::GtGtGtEq),
    ("...", TokenKind::DotDotDot),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::BangEqEq),
    ("**=", TokenKind::StarStarEq),
    ("&&=", TokenKind::AmpAmpEq),
    ("||=", TokenKind::PipePipeEq),
    ("??=", TokenKind::QuestionQuestionEq),
    ("<<=", TokenKind::LtLtEq),
    (">>=", TokenKind::GtGtEq),
    (">>>", TokenKind::GtGtGt),
    ("=>", TokenKind::FatArrow),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("??", TokenKind::QuestionQuestion),
    ("?.", TokenKind::QuestionDot),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("**", TokenKind::StarStar),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Bang),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("?", TokenKind::Question),
    (".", TokenKind::Dot),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    ("@", TokenKind::At),
];

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// The lexer/tokenizer for TypeScript source.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    errors: Vec<LexError>,
    /// Kind of the last token produced, for regex/division disambiguation
    last_kind: Option<TokenKind>,
    brace_depth: usize,
    /// Brace depth at each open `${` of an enclosing template
    template_stack: Vec<usize>,
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        let mut lexer = Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            errors: Vec::new(),
            last_kind: None,
            brace_depth: 0,
            template_stack: Vec::new(),
            saw_newline: false,
        };
        if source.starts_with("#!") {
            while matches!(lexer.current_char, Some(ch) if !is_line_terminator(ch)) {
                lexer.advance();
            }
        }
        lexer
    }

    /// Tokenizes the entire source. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    pub fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        loop {
            self.skip_whitespace_and_comments();
            let start = self.current_pos;

            let Some(ch) = self.current_char else {
                let token = self.make(TokenKind::Eof, start);
                return self.finish(token);
            };

            let token = match ch {
                '"' | '\'' => self.read_string_literal(ch),
                '`' => self.read_template_chunk(start),
                '0'..='9' => self.read_number(),
                '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
                '/' if self.last_kind.map_or(true, TokenKind::allows_regex_after) => {
                    self.read_regex()
                }
                '{' => {
                    self.advance();
                    self.brace_depth += 1;
                    self.make(TokenKind::LBrace, start)
                }
                '}' => {
                    if self.template_stack.last() == Some(&self.brace_depth) {
                        self.template_stack.pop();
                        self.read_template_chunk(start)
                    } else {
                        self.advance();
                        self.brace_depth = self.brace_depth.saturating_sub(1);
                        self.make(TokenKind::RBrace, start)
                    }
                }
                _ if is_identifier_start(ch) => self.read_identifier_or_keyword(),
                _ => match self.read_punctuator(start) {
                    Some(token) => token,
                    None => {
                        self.advance();
                        self.errors.push(LexError::new(
                            1127,
                            "Invalid character.",
                            Span::new(start, self.current_pos, self.file_id),
                        ));
                        continue;
                    }
                },
            };
            return self.finish(token);
        }
    }

    // Helper methods

    fn finish(&mut self, mut token: Token) -> Token {
        token.preceded_by_newline = self.saw_newline;
        self.last_kind = Some(token.kind);
        token
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        let text = self.source[start..self.current_pos].to_string();
        Token::new(
            kind,
            Span::new(start, self.current_pos, self.file_id),
            text.clone(),
            text,
        )
    }

    fn make_with_value(&self, kind: TokenKind, start: usize, value: String) -> Token {
        Token::new(
            kind,
            Span::new(start, self.current_pos, self.file_id),
            value,
            self.source[start..self.current_pos].to_string(),
        )
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, c)| c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char {
                Some(ch) if is_line_terminator(ch) => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => self.advance(),
                Some('/') if self.peek() == Some('/') => {
                    while matches!(self.current_char, Some(ch) if !is_line_terminator(ch)) {
                        self.advance();
                    }
                }
                Some('/') if self.peek() == Some('*') => self.skip_multi_line_comment(),
                _ => break,
            }
        }
    }

    fn skip_multi_line_comment(&mut self) {
        // Skip /*
        self.advance_by(2);

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance_by(2);
                return;
            }
            if is_line_terminator(ch) {
                self.saw_newline = true;
            }
            self.advance();
        }

        let end = self.source.len();
        self.errors.push(LexError::new(
            1010,
            "'*/' expected.",
            Span::new(end, end, self.file_id),
        ));
    }

    fn read_punctuator(&mut self, start: usize) -> Option<Token> {
        let rest = &self.source[start..];
        let (text, mut kind) = PUNCTUATORS
            .iter()
            .find(|(text, _)| rest.starts_with(text))
            .copied()?;
        let mut len = text.len();

        // `a?.5:b` is a conditional, not optional chaining
        if kind == TokenKind::QuestionDot && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            kind = TokenKind::Question;
            len = 1;
        }

        self.advance_by(len);
        Some(self.make(kind, start))
    }

    /// Reads one escape sequence after the backslash and appends its cooked
    /// value. Line continuations cook to nothing.
    fn read_escape(&mut self, value: &mut String) {
        let Some(escaped) = self.current_char else {
            return;
        };
        match escaped {
            'u' => {
                self.advance();
                value.push(self.read_unicode_escape());
            }
            'x' => {
                self.advance();
                value.push(self.read_hex_digits(2));
            }
            '\r' => {
                self.advance();
                if self.current_char == Some('\n') {
                    self.advance();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => self.advance(),
            _ => {
                let unescaped = match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'v' => '\u{b}',
                    '0' => '\0',
                    _ => escaped,
                };
                value.push(unescaped);
                self.advance();
            }
        }
    }

    fn read_unicode_escape(&mut self) -> char {
        if self.current_char != Some('{') {
            return self.read_hex_digits(4);
        }
        self.advance();
        let mut code = 0u32;
        while let Some(digit) = self.current_char.and_then(|c| c.to_digit(16)) {
            code = code.saturating_mul(16).saturating_add(digit);
            self.advance();
        }
        if self.current_char == Some('}') {
            self.advance();
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    fn read_hex_digits(&mut self, count: usize) -> char {
        let mut code = 0u32;
        for _ in 0..count {
            match self.current_char.and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => break,
            }
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        loop {
            match self.current_char {
                Some(ch) if ch == quote => {
                    self.advance();
                    return self.make_with_value(TokenKind::StringLiteral, start, value);
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut value);
                }
                Some(ch) if ch != '\n' && ch != '\r' => {
                    value.push(ch);
                    self.advance();
                }
                _ => break,
            }
        }

        self.errors.push(LexError::new(
            1002,
            "Unterminated string literal.",
            Span::new(start, self.current_pos, self.file_id),
        ));
        self.make_with_value(TokenKind::StringLiteral, start, value)
    }

    /// Reads a template chunk starting at an opening backtick or at the `}`
    /// closing a substitution.
    fn read_template_chunk(&mut self, start: usize) -> Token {
        let is_head = self.current_char == Some('`');
        self.advance();

        let mut value = String::new();

        loop {
            match self.current_char {
                Some('`') => {
                    self.advance();
                    let kind = if is_head {
                        TokenKind::NoSubstitutionTemplate
                    } else {
                        TokenKind::TemplateTail
                    };
                    return self.make_with_value(kind, start, value);
                }
                Some('$') if self.peek() == Some('{') => {
                    self.advance_by(2);
                    self.template_stack.push(self.brace_depth);
                    let kind = if is_head {
                        TokenKind::TemplateHead
                    } else {
                        TokenKind::TemplateMiddle
                    };
                    return self.make_with_value(kind, start, value);
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut value);
                }
                Some('\r') => {
                    // CRLF and lone CR cook to LF
                    self.advance();
                    if self.current_char == Some('\n') {
                        self.advance();
                    }
                    value.push('\n');
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
                None => break,
            }
        }

        self.errors.push(LexError::new(
            1160,
            "Unterminated template literal.",
            Span::new(start, self.current_pos, self.file_id),
        ));
        let kind = if is_head {
            TokenKind::NoSubstitutionTemplate
        } else {
            TokenKind::TemplateTail
        };
        self.make_with_value(kind, start, value)
    }

    fn read_regex(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening slash

        let mut in_class = false;
        let mut terminated = false;

        while let Some(ch) = self.current_char {
            if is_line_terminator(ch) {
                break;
            }
            self.advance();
            match ch {
                '\\' => {
                    if matches!(self.current_char, Some(c) if !is_line_terminator(c)) {
                        self.advance();
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    terminated = true;
                    break;
                }
                _ => {}
            }
        }

        if !terminated {
            self.errors.push(LexError::new(
                1161,
                "Unterminated regular expression literal.",
                Span::new(start, self.current_pos, self.file_id),
            ));
            return self.make(TokenKind::RegexLiteral, start);
        }

        while matches!(self.current_char, Some(ch) if is_identifier_part(ch)) {
            self.advance();
        }

        self.make(TokenKind::RegexLiteral, start)
    }

    fn read_digits(&mut self, value: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(ch) = self.current_char {
            if accept(ch) {
                value.push(ch);
            } else if ch != '_' {
                break;
            }
            self.advance();
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;

        if self.current_char == Some('0') {
            let radix_prefix = match self.peek() {
                Some('x' | 'X') => Some("0x"),
                Some('o' | 'O') => Some("0o"),
                Some('b' | 'B') => Some("0b"),
                _ => None,
            };
            if let Some(prefix) = radix_prefix {
                self.advance_by(2);
                let mut value = prefix.to_string();
                let radix = match prefix {
                    "0x" => 16,
                    "0o" => 8,
                    _ => 2,
                };
                self.read_digits(&mut value, |c| c.is_digit(radix));
                return self.make_with_value(TokenKind::NumberLiteral, start, value);
            }
        }

        let mut value = String::new();

        if self.current_char == Some('.') {
            value.push('0');
        } else {
            self.read_digits(&mut value, |c| c.is_ascii_digit());
        }

        if self.current_char == Some('.') {
            value.push('.');
            self.advance();
            self.read_digits(&mut value, |c| c.is_ascii_digit());
        }

        if matches!(self.current_char, Some('e' | 'E')) {
            let sign = self.peek();
            let has_exponent = match sign {
                Some('+' | '-') => self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_exponent {
                value.push('e');
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char {
                    value.push(sign);
                    self.advance();
                }
                self.read_digits(&mut value, |c| c.is_ascii_digit());
            }
        }

        self.make_with_value(TokenKind::NumberLiteral, start, value)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;

        while matches!(self.current_char, Some(ch) if is_identifier_part(ch)) {
            self.advance();
        }

        let word = &self.source[start..self.current_pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        self.make(kind, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_contextual_words() {
        let source = "let const var function return if else type declare namespace";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Var,
                TokenKind::Function,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let source = "123 45.67 0x1A 0o77 0b1010 1_000_000 .5 2e10";
        let tokens = Lexer::new(source).tokenize();

        let values: Vec<&str> = tokens[..8].iter().map(|t| t.value.as_str()).collect();
        assert_eq!(
            values,
            vec!["123", "45.67", "0x1A", "0o77", "0b1010", "1000000", "0.5", "2e10"]
        );
        assert!(tokens[..8].iter().all(|t| t.kind == TokenKind::NumberLiteral));
        assert_eq!(tokens[5].text, "1_000_000");
    }

    #[test]
    fn test_strings() {
        let source = r#""hello\n" 'wor\'ld' "A\x42""#;
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "hello\n");
        assert_eq!(tokens[0].text, r#""hello\n""#);
        assert_eq!(tokens[1].value, "wor'ld");
        assert_eq!(tokens[2].value, "AB");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("let s = \"abc\nlet t = 1;");
        let tokens = lexer.tokenize();

        assert_eq!(tokens[3].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[3].value, "abc");
        assert_eq!(lexer.errors().len(), 1);
        assert_eq!(lexer.errors()[0].code, 1002);
        assert_eq!(tokens[4].kind, TokenKind::Let);
        assert!(tokens[4].preceded_by_newline);
    }

    #[test]
    fn test_operators() {
        let source = "a + - * b / % ** += -= === !== <= >= && || ?? ?. >>>= ... =>";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::StarStar,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEqEq,
                TokenKind::BangEqEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::QuestionQuestion,
                TokenKind::QuestionDot,
                TokenKind::GtGtGtEq,
                TokenKind::DotDotDot,
                TokenKind::FatArrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_conditional_with_fraction_is_not_optional_chain() {
        assert_eq!(
            kinds("a?.5:b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Question,
                TokenKind::NumberLiteral,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let source = "// Single line comment\nlet x = 5; /* multi\n line */ const y = 10;";
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert!(tokens[0].preceded_by_newline);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert!(!tokens[1].preceded_by_newline);
        assert_eq!(tokens[5].kind, TokenKind::Const);
        assert!(tokens[5].preceded_by_newline);
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new("let a; /* open");
        lexer.tokenize();
        assert_eq!(lexer.errors()[0].code, 1010);
        assert_eq!(lexer.errors()[0].message, "'*/' expected.");
    }

    #[test]
    fn test_identifiers() {
        let source = "foo bar_123 _private $jquery";
        let tokens = Lexer::new(source).tokenize();

        let names: Vec<&str> = tokens[..4].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar_123", "_private", "$jquery"]);
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn test_regex_versus_division() {
        let tokens = Lexer::new("x = a / b / c; y = /ab+[/]c/gi.test(s);").tokenize();
        let regex = tokens
            .iter()
            .find(|t| t.kind == TokenKind::RegexLiteral)
            .expect("regex token");
        assert_eq!(regex.text, "/ab+[/]c/gi");
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Slash).count(),
            2
        );
    }

    #[test]
    fn test_template_with_substitutions() {
        let tokens = Lexer::new("`a${x + { k: 1 }.k}b${y}c` + 1").tokenize();
        let template: Vec<(TokenKind, &str)> = tokens
            .iter()
            .filter(|t| {
                matches!(
                    t.kind,
                    TokenKind::TemplateHead | TokenKind::TemplateMiddle | TokenKind::TemplateTail
                )
            })
            .map(|t| (t.kind, t.value.as_str()))
            .collect();

        assert_eq!(
            template,
            vec![
                (TokenKind::TemplateHead, "a"),
                (TokenKind::TemplateMiddle, "b"),
                (TokenKind::TemplateTail, "c"),
            ]
        );
        assert_eq!(tokens[tokens.len() - 3].kind, TokenKind::Plus);
    }

    #[test]
    fn test_invalid_character_is_skipped() {
        let mut lexer = Lexer::new("let # x");
        let tokens = lexer.tokenize();

        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(lexer.errors()[0].code, 1127);
        assert_eq!(lexer.errors()[0].span, Span::new(4, 5, 0));
    }
}
