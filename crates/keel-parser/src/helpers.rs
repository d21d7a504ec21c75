//! Helper methods and utilities

use super::*;

/// Parser position saved before a speculative parse.
pub(crate) struct Checkpoint {
    current: usize,
    errors: usize,
    splits: usize,
}

impl Parser {
    // =========================================================================
    // Identifiers and names
    // =========================================================================

    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        if !self.check(&TokenKind::Identifier) {
            return Err(self.error(1003, "Identifier expected."));
        }
        let token = self.advance();
        Ok(Node::new(Ident::new(token.text.clone()), token.span))
    }

    /// Identifier or reserved word, as allowed after `.` and in property keys.
    pub(crate) fn parse_identifier_name(&mut self) -> ParseResult<Node<Ident>> {
        let kind = self.current_token().kind;
        if kind != TokenKind::Identifier && !kind.is_keyword() {
            return Err(self.error(1003, "Identifier expected."));
        }
        let token = self.advance();
        Ok(Node::new(Ident::new(token.text.clone()), token.span))
    }

    pub(crate) fn is_property_name_start(&self) -> bool {
        let kind = self.current_token().kind;
        matches!(
            kind,
            TokenKind::Identifier
                | TokenKind::StringLiteral
                | TokenKind::NumberLiteral
                | TokenKind::LBracket
        ) || kind.is_keyword()
    }

    pub(crate) fn parse_property_name(&mut self) -> ParseResult<PropertyName> {
        match self.current_token().kind {
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::String(value))
            }
            TokenKind::NumberLiteral => {
                let value = self.advance().value.clone();
                Ok(PropertyName::Number(parse_number_value(&value)))
            }
            TokenKind::LBracket => {
                self.advance();
                let expr = Box::new(self.parse_assignment_expr()?);
                self.consume(TokenKind::RBracket)?;
                Ok(PropertyName::Computed(expr))
            }
            _ => Ok(PropertyName::Ident(self.parse_identifier_name()?)),
        }
    }

    /// Parses a module specifier string, keeping the literal's span.
    pub(crate) fn parse_module_specifier(&mut self) -> ParseResult<Node<String>> {
        let token = self.consume(TokenKind::StringLiteral)?;
        Ok(Node::new(token.value.clone(), token.span))
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Parses `( params )`, including the parentheses.
    pub(crate) fn parse_function_params(&mut self) -> ParseResult<Vec<Param>> {
        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_function_param()?);
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RParen)?;
        Ok(params)
    }

    pub(crate) fn parse_function_param(&mut self) -> ParseResult<Param> {
        let decorators = self.parse_decorators()?;

        let mut accessibility = None;
        let mut is_readonly = false;
        loop {
            let modifier = match self.current_token().text.as_str() {
                "public" => Some(AccessModifier::Public),
                "private" => Some(AccessModifier::Private),
                "protected" => Some(AccessModifier::Protected),
                "readonly" => None,
                _ => break,
            };
            if !self.check(&TokenKind::Identifier) || !self.next_starts_binding(1) {
                break;
            }
            self.advance();
            match modifier {
                Some(access) => accessibility = Some(access),
                None => is_readonly = true,
            }
        }

        let is_rest = self.eat(TokenKind::DotDotDot);

        let start = self.current_token().span;
        let pattern = if self.check(&TokenKind::This) {
            let token = self.advance();
            let name = Node::new(Ident::new("this"), token.span);
            Node::new(
                Pattern::Ident {
                    name,
                    type_annotation: None,
                },
                token.span,
            )
        } else {
            self.parse_binding_target()?
        };

        let optional = self.eat(TokenKind::Question);

        let type_annotation = if self.eat(TokenKind::Colon) {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        let pattern = if self.eat(TokenKind::Eq) {
            let default = self.parse_assignment_expr()?;
            let span = start.merge(&default.span);
            Node::new(
                Pattern::Assignment {
                    pattern: Box::new(pattern),
                    default: Box::new(default),
                },
                span,
            )
        } else {
            pattern
        };

        Ok(Param {
            pattern,
            type_annotation,
            optional,
            is_rest,
            decorators,
            accessibility,
            is_readonly,
        })
    }

    fn next_starts_binding(&self, offset: usize) -> bool {
        matches!(
            self.peek_kind(offset),
            Some(TokenKind::Identifier)
                | Some(TokenKind::LBrace)
                | Some(TokenKind::LBracket)
                | Some(TokenKind::DotDotDot)
                | Some(TokenKind::This)
        )
    }

    /// Optional `: Type` annotation.
    pub(crate) fn parse_type_annotation(&mut self) -> ParseResult<Option<Box<Node<Type>>>> {
        if self.eat(TokenKind::Colon) {
            Ok(Some(Box::new(self.parse_type()?)))
        } else {
            Ok(None)
        }
    }

    /// Optional return type, which may be a type predicate `x is T`.
    pub(crate) fn parse_return_type(&mut self) -> ParseResult<Option<Box<Node<Type>>>> {
        if !self.eat(TokenKind::Colon) {
            return Ok(None);
        }
        Ok(Some(Box::new(self.parse_type_or_predicate()?)))
    }

    pub(crate) fn parse_decorators(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        let mut decorators = Vec::new();
        while self.eat(TokenKind::At) {
            decorators.push(self.parse_decorator_expression()?);
        }
        Ok(decorators)
    }

    // =========================================================================
    // Operators
    // =========================================================================

    pub(crate) fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::NotEq,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::BangEqEq => BinaryOp::StrictNotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::QuestionQuestion => BinaryOp::NullishCoalesce,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::LtLt => BinaryOp::LeftShift,
            TokenKind::GtGt => BinaryOp::RightShift,
            TokenKind::GtGtGt => BinaryOp::UnsignedRightShift,
            TokenKind::In => BinaryOp::In,
            TokenKind::Instanceof => BinaryOp::InstanceOf,
            _ => return None,
        };
        Some(op)
    }

    pub(crate) fn assignment_operator(kind: TokenKind) -> Option<AssignmentOp> {
        let op = match kind {
            TokenKind::Eq => AssignmentOp::Assign,
            TokenKind::PlusEq => AssignmentOp::AddAssign,
            TokenKind::MinusEq => AssignmentOp::SubAssign,
            TokenKind::StarEq => AssignmentOp::MulAssign,
            TokenKind::SlashEq => AssignmentOp::DivAssign,
            TokenKind::PercentEq => AssignmentOp::ModAssign,
            TokenKind::StarStarEq => AssignmentOp::PowAssign,
            TokenKind::AmpAmpEq => AssignmentOp::AndAssign,
            TokenKind::PipePipeEq => AssignmentOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignmentOp::NullishAssign,
            TokenKind::LtLtEq => AssignmentOp::LeftShiftAssign,
            TokenKind::GtGtEq => AssignmentOp::RightShiftAssign,
            TokenKind::GtGtGtEq => AssignmentOp::UnsignedRightShiftAssign,
            TokenKind::AmpEq => AssignmentOp::BitAndAssign,
            TokenKind::PipeEq => AssignmentOp::BitOrAssign,
            TokenKind::CaretEq => AssignmentOp::BitXorAssign,
            _ => return None,
        };
        Some(op)
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    /// Binding power of the binary operator at the current token, or 0.
    pub(crate) fn get_infix_precedence(&self) -> u8 {
        let token = self.current_token();
        match token.kind {
            TokenKind::QuestionQuestion => 3,
            TokenKind::PipePipe => 4,
            TokenKind::AmpAmp => 5,
            TokenKind::Pipe => 6,
            TokenKind::Caret => 7,
            TokenKind::Amp => 8,
            TokenKind::EqEq | TokenKind::BangEq | TokenKind::EqEqEq | TokenKind::BangEqEq => 9,
            TokenKind::In if self.no_in => 0,
            TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Instanceof => 10,
            TokenKind::Identifier if token.text == "as" && !token.preceded_by_newline => 10,
            TokenKind::LtLt | TokenKind::GtGt | TokenKind::GtGtGt => 11,
            TokenKind::Plus | TokenKind::Minus => 12,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 13,
            TokenKind::StarStar => 14,
            _ => 0,
        }
    }

    // =========================================================================
    // Utility Methods (Token Manipulation)
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    /// Advances past the current token when it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Whether the current token is the contextual keyword `word`.
    pub(crate) fn check_word(&self, word: &str) -> bool {
        let token = self.current_token();
        token.kind == TokenKind::Identifier && token.text == word
    }

    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.current + offset).map(|t| t.kind)
    }

    pub(crate) fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset)
    }

    /// The token `offset` ahead exists and does not start a new line.
    pub(crate) fn peek_same_line(&self, offset: usize) -> bool {
        self.peek_token(offset)
            .is_some_and(|t| t.kind != TokenKind::Eof && !t.preceded_by_newline)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else if kind == TokenKind::Identifier {
            Err(self.error(1003, "Identifier expected."))
        } else {
            Err(self.error(1005, format!("'{}' expected.", kind)))
        }
    }

    pub(crate) fn consume_word(&mut self, word: &str) -> ParseResult<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.error(1005, format!("'{}' expected.", word)))
        }
    }

    /// Consumes a `;`, or accepts its automatic insertion before `}`, at the
    /// end of input, or after a line break.
    pub(crate) fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.current_token();
        if token.kind == TokenKind::RBrace || token.kind == TokenKind::Eof || token.preceded_by_newline {
            return Ok(());
        }
        Err(self.error(1005, "';' expected."))
    }

    /// Consumes a `>` closing a type argument or parameter list, splitting
    /// `>>`, `>=` and friends when the lexer glued them together.
    pub(crate) fn consume_type_closer(&mut self) -> ParseResult<()> {
        let token = self.current_token().clone();
        let rest = match token.kind {
            TokenKind::Gt => {
                self.advance();
                return Ok(());
            }
            TokenKind::GtGt => TokenKind::Gt,
            TokenKind::GtGtGt => TokenKind::GtGt,
            TokenKind::GtEq => TokenKind::Eq,
            TokenKind::GtGtEq => TokenKind::GtEq,
            TokenKind::GtGtGtEq => TokenKind::GtGtEq,
            _ => return Err(self.error(1005, "'>' expected.")),
        };

        let split = token.span.start + 1;
        let first = Token {
            kind: TokenKind::Gt,
            span: Span::new(token.span.start, split, token.span.file_id),
            value: ">".to_string(),
            text: ">".to_string(),
            preceded_by_newline: token.preceded_by_newline,
        };
        let second = Token {
            kind: rest,
            span: Span::new(split, token.span.end, token.span.file_id),
            value: token.text[1..].to_string(),
            text: token.text[1..].to_string(),
            preceded_by_newline: false,
        };

        self.splits.push((self.current, token));
        self.tokens[self.current] = first;
        self.tokens.insert(self.current + 1, second);
        self.advance();
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current: self.current,
            errors: self.errors.len(),
            splits: self.splits.len(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        while self.splits.len() > checkpoint.splits {
            if let Some((index, original)) = self.splits.pop() {
                self.tokens.remove(index + 1);
                self.tokens[index] = original;
            }
        }
        self.current = checkpoint.current;
        self.errors.truncate(checkpoint.errors);
    }

    /// Runs `f` speculatively, rewinding on failure.
    pub(crate) fn try_parse<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<Option<T>>,
    ) -> Option<T> {
        let checkpoint = self.checkpoint();
        match f(self) {
            Ok(Some(value)) => Some(value),
            _ => {
                self.restore(checkpoint);
                None
            }
        }
    }

    pub(crate) fn error(&self, code: u32, message: impl Into<String>) -> ParseError {
        ParseError::new(code, message, self.current_token().span)
    }

    /// Skips to a likely statement boundary after an error.
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous_token().kind == TokenKind::Semicolon
                || self.current_token().kind == TokenKind::RBrace
                || self.current_token().preceded_by_newline
            {
                return;
            }

            match self.current_token().kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Import
                | TokenKind::Export => return,
                _ => {}
            }

            self.advance();
        }
    }
}

/// Numeric value of a number token, honouring `0x`, `0o` and `0b` prefixes.
pub(crate) fn parse_number_value(text: &str) -> f64 {
    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => 16,
        Some("0o") | Some("0O") => 8,
        Some("0b") | Some("0B") => 2,
        _ => return text.parse::<f64>().unwrap_or(f64::NAN),
    };
    text[2..].chars().fold(0.0, |acc, c| {
        acc * radix as f64 + c.to_digit(radix).unwrap_or(0) as f64
    })
}
