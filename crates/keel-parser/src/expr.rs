//! Expression parsing
//!
//! Assignment, conditional and arrow forms are handled by dedicated entry
//! points; binary operators use precedence climbing driven by
//! `get_infix_precedence`.

use super::*;

/// Deepest expression nesting accepted; the checker and emitter recurse
/// over the same tree.
const MAX_EXPRESSION_DEPTH: usize = 64;

/// Stack left before the parser grows it, and the size of each growth
const RED_ZONE: usize = 100 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Parsed head of an arrow function, up to and excluding `=>`.
struct ArrowHead {
    is_async: bool,
    type_params: Option<Vec<TypeParam>>,
    params: Vec<Param>,
    return_type: Option<Box<Node<Type>>>,
}

impl Parser {
    /// Expression including the comma operator.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        let first = self.parse_assignment_expr()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let start = first.span;
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_assignment_expr()?);
        }

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Expr::Sequence(exprs), span))
    }

    pub(crate) fn parse_assignment_expr(&mut self) -> ParseResult<Node<Expr>> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return Err(self.error(1109, "Expression is nested too deeply."));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.assignment_expr());
        self.depth -= 1;
        result
    }

    fn assignment_expr(&mut self) -> ParseResult<Node<Expr>> {
        if self.check(&TokenKind::Yield) {
            return self.parse_yield_expression();
        }
        if let Some(arrow) = self.try_parse_arrow_function()? {
            return Ok(arrow);
        }

        let start = self.current_token().span;
        let left = self.parse_conditional_expression()?;

        let Some(op) = Self::assignment_operator(self.current_token().kind) else {
            return Ok(left);
        };
        self.advance();

        if !is_assignment_target(&left.value, op) {
            self.errors.push(ParseError::new(
                2364,
                "The left-hand side of an assignment expression must be a variable or a property access.",
                left.span,
            ));
        }

        let value = Box::new(self.parse_assignment_expr()?);
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Assignment {
                target: Box::new(left),
                op,
                value,
            },
            span,
        ))
    }

    fn parse_yield_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        self.consume(TokenKind::Yield)?;
        let delegate = self.eat(TokenKind::Star);

        let token = self.current_token();
        let has_argument = !token.preceded_by_newline
            && !matches!(
                token.kind,
                TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::Colon
                    | TokenKind::Eof
            );
        let argument = if has_argument || delegate {
            Some(Box::new(self.parse_assignment_expr()?))
        } else {
            None
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Expr::Yield { argument, delegate }, span))
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn try_parse_arrow_function(&mut self) -> ParseResult<Option<Node<Expr>>> {
        let start = self.current_token().span;
        let kind = self.current_token().kind;
        let is_async_word = self.check_word("async") && self.peek_same_line(1);

        // x => ...  /  async x => ...
        let single_param_at = |offset: usize| {
            self.peek_kind(offset) == Some(TokenKind::Identifier)
                && self.peek_kind(offset + 1) == Some(TokenKind::FatArrow)
                && self.peek_same_line(offset + 1)
        };
        let simple_offset = if single_param_at(0) {
            Some(0)
        } else if is_async_word && single_param_at(1) {
            Some(1)
        } else {
            None
        };
        if let Some(offset) = simple_offset {
            let is_async = offset == 1;
            if is_async {
                self.advance();
            }
            let name = self.parse_identifier()?;
            let span = name.span;
            let param = Param::simple(Node::new(
                Pattern::Ident {
                    name,
                    type_annotation: None,
                },
                span,
            ));
            let head = ArrowHead {
                is_async,
                type_params: None,
                params: vec![param],
                return_type: None,
            };
            return self.parse_arrow_body(start, head).map(Some);
        }

        let may_be_parenthesized = matches!(kind, TokenKind::LParen | TokenKind::Lt)
            || (is_async_word
                && matches!(self.peek_kind(1), Some(TokenKind::LParen | TokenKind::Lt)));
        if !may_be_parenthesized {
            return Ok(None);
        }

        match self.try_parse(|p| p.parse_arrow_head()) {
            Some(head) => self.parse_arrow_body(start, head).map(Some),
            None => Ok(None),
        }
    }

    fn parse_arrow_head(&mut self) -> ParseResult<Option<ArrowHead>> {
        let is_async = self.check_word("async") && self.peek_same_line(1);
        if is_async {
            self.advance();
        }
        let type_params = self.parse_type_parameters()?;
        if !self.check(&TokenKind::LParen) {
            return Ok(None);
        }
        let params = self.parse_function_params()?;
        let return_type = self.parse_return_type()?;

        if self.check(&TokenKind::FatArrow) && !self.current_token().preceded_by_newline {
            Ok(Some(ArrowHead {
                is_async,
                type_params,
                params,
                return_type,
            }))
        } else {
            Ok(None)
        }
    }

    fn parse_arrow_body(&mut self, start: Span, head: ArrowHead) -> ParseResult<Node<Expr>> {
        self.consume(TokenKind::FatArrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            ArrowBody::Block(Box::new(self.parse_function_body()?))
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment_expr()?))
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Arrow {
                type_params: head.type_params,
                params: head.params,
                return_type: head.return_type,
                body,
                is_async: head.is_async,
            },
            span,
        ))
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn parse_conditional_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let condition = self.parse_binary_expression(3)?;

        if !self.eat(TokenKind::Question) {
            return Ok(condition);
        }

        let saved = std::mem::replace(&mut self.no_in, false);
        let then_expr = self.parse_assignment_expr();
        self.no_in = saved;
        let then_expr = Box::new(then_expr?);

        self.consume(TokenKind::Colon)?;
        let else_expr = Box::new(self.parse_assignment_expr()?);

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Ternary {
                condition: Box::new(condition),
                then_expr,
                else_expr,
            },
            span,
        ))
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let mut left = self.parse_unary_expression()?;

        loop {
            let precedence = self.get_infix_precedence();
            if precedence == 0 || precedence < min_precedence {
                break;
            }

            // expr as Type
            if self.eat_word("as") {
                let ty = Box::new(self.parse_assertion_type()?);
                let span = start.merge(&self.previous_token().span);
                left = Node::new(
                    Expr::TypeCast {
                        expr: Box::new(left),
                        ty,
                    },
                    span,
                );
                continue;
            }

            let Some(op) = Self::binary_operator(self.current_token().kind) else {
                break;
            };
            self.advance();

            // `**` is right-associative
            let next_min = if op == BinaryOp::Pow {
                precedence
            } else {
                precedence + 1
            };
            let right = Box::new(self.parse_binary_expression(next_min)?);

            let span = start.merge(&self.previous_token().span);
            left = Node::new(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right,
                },
                span,
            );
        }

        Ok(left)
    }

    /// Type after `as` or inside `<T>expr`; `as const` is accepted too.
    fn parse_assertion_type(&mut self) -> ParseResult<Node<Type>> {
        if self.check(&TokenKind::Const) {
            let token = self.advance();
            return Ok(Node::new(
                Type::TypeRef {
                    name: Node::new(Ident::new("const"), token.span),
                    type_args: None,
                },
                token.span,
            ));
        }
        self.parse_type()
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let op = match self.current_token().kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
            _ => None,
        };

        let expr = if let Some(op) = op {
            self.advance();
            let expr = Box::new(self.parse_unary_expression()?);
            Expr::Unary { op, expr }
        } else if self.eat(TokenKind::Await) {
            Expr::Await(Box::new(self.parse_unary_expression()?))
        } else if self.eat(TokenKind::Lt) {
            // <Type>expr
            let ty = Box::new(self.parse_assertion_type()?);
            self.consume_type_closer()?;
            let expr = Box::new(self.parse_unary_expression()?);
            Expr::TypeCast { expr, ty }
        } else {
            return self.parse_postfix_expression();
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let expr = self.parse_member_chain(true)?;

        let token = self.current_token();
        if token.preceded_by_newline {
            return Ok(expr);
        }
        let op = match token.kind {
            TokenKind::PlusPlus => UnaryOp::PostIncrement,
            TokenKind::MinusMinus => UnaryOp::PostDecrement,
            _ => return Ok(expr),
        };
        self.advance();

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::Unary {
                op,
                expr: Box::new(expr),
            },
            span,
        ))
    }

    // =========================================================================
    // Calls and member access
    // =========================================================================

    /// Expression after `extends` in a class heading.
    pub(crate) fn parse_heritage_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_member_chain(true)
    }

    /// Expression after `@`: a name with optional member accesses and calls.
    pub(crate) fn parse_decorator_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_member_chain(true)
    }

    /// Primary or `new` expression followed by member accesses, and by calls
    /// when `allow_calls` is set (it is not for the callee of `new`).
    fn parse_member_chain(&mut self, allow_calls: bool) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            let token = self.current_token();
            let value = match token.kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_identifier_name()?;
                    Expr::Member {
                        object: Box::new(expr),
                        property,
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let saved = std::mem::replace(&mut self.no_in, false);
                    let index = self.parse_expression();
                    self.no_in = saved;
                    let index = Box::new(index?);
                    self.consume(TokenKind::RBracket)?;
                    Expr::Index {
                        object: Box::new(expr),
                        index,
                    }
                }
                TokenKind::QuestionDot if allow_calls => {
                    self.advance();
                    if self.check(&TokenKind::LParen) {
                        let args = self.parse_arguments()?;
                        Expr::OptionalCall {
                            callee: Box::new(expr),
                            args,
                        }
                    } else if self.eat(TokenKind::LBracket) {
                        let index = Box::new(self.parse_expression()?);
                        self.consume(TokenKind::RBracket)?;
                        Expr::OptionalIndex {
                            object: Box::new(expr),
                            index,
                        }
                    } else {
                        let property = self.parse_identifier_name()?;
                        Expr::OptionalMember {
                            object: Box::new(expr),
                            property,
                        }
                    }
                }
                TokenKind::LParen if allow_calls => {
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(expr),
                        type_args: None,
                        args,
                    }
                }
                TokenKind::Lt if allow_calls => {
                    let Some(type_args) = self.try_parse(|p| p.parse_call_type_arguments()) else {
                        break;
                    };
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(expr),
                        type_args: Some(type_args),
                        args,
                    }
                }
                TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead if allow_calls => {
                    let (quasis, exprs) = self.parse_template()?;
                    Expr::TaggedTemplate {
                        tag: Box::new(expr),
                        quasis,
                        exprs,
                    }
                }
                TokenKind::Bang if !token.preceded_by_newline => {
                    self.advance();
                    Expr::NonNullAssertion(Box::new(expr))
                }
                _ => break,
            };

            let span = start.merge(&self.previous_token().span);
            expr = Node::new(value, span);
        }

        Ok(expr)
    }

    /// `<T, U>` directly followed by an argument list.
    fn parse_call_type_arguments(&mut self) -> ParseResult<Option<Vec<Node<Type>>>> {
        let type_args = self.parse_type_arguments()?;
        if self.check(&TokenKind::LParen) {
            Ok(Some(type_args))
        } else {
            Ok(None)
        }
    }

    fn parse_new_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let new_token = self.consume(TokenKind::New)?.clone();

        // new.target
        if self.eat(TokenKind::Dot) {
            let property = self.parse_identifier_name()?;
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(
                Expr::MetaProperty {
                    meta: Node::new(Ident::new("new"), new_token.span),
                    property,
                },
                span,
            ));
        }

        let callee = Box::new(self.parse_member_chain(false)?);

        let type_args = if self.check(&TokenKind::Lt) {
            self.try_parse(|p| p.parse_type_arguments().map(Some))
        } else {
            None
        };

        let args = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Expr::New {
                callee,
                type_args,
                args,
            },
            span,
        ))
    }

    /// Parses `( args )`, where each argument may be a spread.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        self.consume(TokenKind::LParen)?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut args = Vec::new();
        let result = loop {
            if self.check(&TokenKind::RParen) || self.is_at_end() {
                break Ok(());
            }
            match self.parse_spread_or_assignment() {
                Ok(arg) => args.push(arg),
                Err(err) => break Err(err),
            }
            if !self.check(&TokenKind::RParen) {
                if let Err(err) = self.consume(TokenKind::Comma) {
                    break Err(err);
                }
            }
        };

        self.no_in = saved;
        result?;
        self.consume(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_spread_or_assignment(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        if self.eat(TokenKind::DotDotDot) {
            let expr = self.parse_assignment_expr()?;
            let span = start.merge(&expr.span);
            return Ok(Node::new(Expr::Spread(Box::new(expr)), span));
        }
        self.parse_assignment_expr()
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    pub(crate) fn parse_primary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let token = self.current_token().clone();

        let expr = match token.kind {
            TokenKind::NumberLiteral => {
                self.advance();
                Expr::Literal(Literal::Number {
                    value: parse_number_value(&token.value),
                    raw: token.text,
                })
            }
            TokenKind::StringLiteral => {
                self.advance();
                Expr::Literal(Literal::String {
                    value: token.value,
                    raw: token.text,
                })
            }
            TokenKind::RegexLiteral => {
                self.advance();
                let close = token.text.rfind('/').filter(|&i| i > 0).unwrap_or(token.text.len());
                Expr::Literal(Literal::RegExp {
                    pattern: token.text.get(1..close).unwrap_or_default().to_string(),
                    flags: token.text.get(close + 1..).unwrap_or_default().to_string(),
                })
            }
            TokenKind::NoSubstitutionTemplate | TokenKind::TemplateHead => {
                let (quasis, exprs) = self.parse_template()?;
                Expr::Template { quasis, exprs }
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Boolean(token.kind == TokenKind::True))
            }
            TokenKind::Null => {
                self.advance();
                Expr::Literal(Literal::Null)
            }
            TokenKind::This => {
                self.advance();
                Expr::This
            }
            TokenKind::Super => {
                self.advance();
                Expr::Super
            }
            TokenKind::Identifier
                if token.text == "async"
                    && self.peek_kind(1) == Some(TokenKind::Function)
                    && self.peek_same_line(1) =>
            {
                self.advance();
                self.parse_function_expression(true)?
            }
            TokenKind::Identifier => {
                self.advance();
                Expr::Ident(Ident::new(token.text))
            }
            TokenKind::LParen => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_in, false);
                let inner = self.parse_expression();
                self.no_in = saved;
                let inner = inner?;
                self.consume(TokenKind::RParen)?;
                Expr::Paren(Box::new(inner))
            }
            TokenKind::LBracket => self.parse_array_literal()?,
            TokenKind::LBrace => self.parse_object_literal()?,
            TokenKind::Function => self.parse_function_expression(false)?,
            _ => return Err(self.error(1109, "Expression expected.")),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    /// Parses a template starting at the current head token. Returns the
    /// literal chunks and the substituted expressions between them.
    fn parse_template(&mut self) -> ParseResult<(Vec<TemplateQuasi>, Vec<Node<Expr>>)> {
        let head = self.advance().clone();
        let mut quasis = vec![template_quasi(&head)];
        let mut exprs = Vec::new();

        if head.kind == TokenKind::NoSubstitutionTemplate {
            return Ok((quasis, exprs));
        }

        loop {
            let saved = std::mem::replace(&mut self.no_in, false);
            let expr = self.parse_expression();
            self.no_in = saved;
            exprs.push(expr?);

            match self.current_token().kind {
                TokenKind::TemplateMiddle => {
                    let token = self.advance().clone();
                    quasis.push(template_quasi(&token));
                }
                TokenKind::TemplateTail => {
                    let token = self.advance().clone();
                    quasis.push(template_quasi(&token));
                    break;
                }
                _ => return Err(self.error(1005, "'}' expected.")),
            }
        }

        Ok((quasis, exprs))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        self.consume(TokenKind::LBracket)?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut elements = Vec::new();
        let result: ParseResult<()> = (|| {
            while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                if self.eat(TokenKind::Comma) {
                    elements.push(None);
                    continue;
                }
                elements.push(Some(self.parse_spread_or_assignment()?));
                if !self.check(&TokenKind::RBracket) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            Ok(())
        })();

        self.no_in = saved;
        result?;
        self.consume(TokenKind::RBracket)?;
        Ok(Expr::Array(elements))
    }

    /// The token `offset` ahead can begin a property name.
    pub(crate) fn peek_is_property_name(&self, offset: usize) -> bool {
        self.peek_kind(offset).is_some_and(|kind| {
            matches!(
                kind,
                TokenKind::Identifier
                    | TokenKind::StringLiteral
                    | TokenKind::NumberLiteral
                    | TokenKind::LBracket
            ) || kind.is_keyword()
        })
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expr> {
        self.consume(TokenKind::LBrace)?;
        let saved = std::mem::replace(&mut self.no_in, false);

        let mut properties = Vec::new();
        let result: ParseResult<()> = (|| {
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                properties.push(self.parse_object_property()?);
                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            Ok(())
        })();

        self.no_in = saved;
        result?;
        self.consume(TokenKind::RBrace)?;
        Ok(Expr::Object(properties))
    }

    fn parse_object_property(&mut self) -> ParseResult<ObjectProperty> {
        if self.eat(TokenKind::DotDotDot) {
            return Ok(ObjectProperty::Spread(self.parse_assignment_expr()?));
        }

        let is_async = self.check_word("async")
            && self.peek_same_line(1)
            && (self.peek_is_property_name(1) || self.peek_kind(1) == Some(TokenKind::Star));
        if is_async {
            self.advance();
        }
        let is_generator = self.eat(TokenKind::Star);

        let accessor = if !is_async
            && !is_generator
            && (self.check_word("get") || self.check_word("set"))
            && self.peek_is_property_name(1)
        {
            Some(self.advance().text.clone())
        } else {
            None
        };

        if !self.is_property_name_start() {
            return Err(self.error(1136, "Property assignment expected."));
        }
        let key = self.parse_property_name()?;

        match accessor.as_deref() {
            Some("get") => {
                self.consume(TokenKind::LParen)?;
                self.consume(TokenKind::RParen)?;
                let return_type = self.parse_type_annotation()?;
                let body = self.parse_function_body()?;
                return Ok(ObjectProperty::Getter {
                    key,
                    return_type,
                    body,
                });
            }
            Some(_) => {
                self.consume(TokenKind::LParen)?;
                let param = self.parse_function_param()?;
                self.consume(TokenKind::RParen)?;
                let body = self.parse_function_body()?;
                return Ok(ObjectProperty::Setter { key, param, body });
            }
            None => {}
        }

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let type_params = self.parse_type_parameters()?;
            let params = self.parse_function_params()?;
            let return_type = self.parse_return_type()?;
            let body = self.parse_function_body()?;
            return Ok(ObjectProperty::Method {
                key,
                type_params,
                params,
                return_type,
                body,
                is_async,
                is_generator,
            });
        }

        if self.eat(TokenKind::Colon) {
            let value = self.parse_assignment_expr()?;
            return Ok(ObjectProperty::Property {
                key,
                value,
                shorthand: false,
            });
        }

        match key {
            PropertyName::Ident(ident) => {
                let value = Node::new(Expr::Ident(ident.value.clone()), ident.span);
                Ok(ObjectProperty::Property {
                    key: PropertyName::Ident(ident),
                    value,
                    shorthand: true,
                })
            }
            _ => Err(self.error(1005, "':' expected.")),
        }
    }

    fn parse_function_expression(&mut self, is_async: bool) -> ParseResult<Expr> {
        self.consume(TokenKind::Function)?;
        let is_generator = self.eat(TokenKind::Star);

        let name = if self.check(&TokenKind::Identifier) {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        let type_params = self.parse_type_parameters()?;
        let params = self.parse_function_params()?;
        let return_type = self.parse_return_type()?;
        let body = Box::new(self.parse_function_body()?);

        Ok(Expr::Function {
            name,
            type_params,
            params,
            return_type,
            body,
            is_async,
            is_generator,
        })
    }
}

/// Destructuring targets are only valid for plain `=`.
fn is_assignment_target(expr: &Expr, op: AssignmentOp) -> bool {
    match expr {
        Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. } => true,
        Expr::Paren(inner) | Expr::NonNullAssertion(inner) => is_assignment_target(&inner.value, op),
        Expr::TypeCast { expr, .. } => is_assignment_target(&expr.value, op),
        Expr::Array(_) | Expr::Object(_) => op == AssignmentOp::Assign,
        _ => false,
    }
}

/// Builds a template chunk from its token, stripping the delimiters
/// (`` ` ``, `}`, `${`) from the raw source text.
fn template_quasi(token: &Token) -> TemplateQuasi {
    let text = token.text.as_str();
    let closed = match token.kind {
        TokenKind::NoSubstitutionTemplate | TokenKind::TemplateTail => text.len() > 1 && text.ends_with('`'),
        _ => true,
    };
    let suffix = match token.kind {
        TokenKind::TemplateHead | TokenKind::TemplateMiddle => 2,
        _ if closed => 1,
        _ => 0,
    };
    let raw = text
        .get(1..text.len().saturating_sub(suffix).max(1))
        .unwrap_or_default();
    TemplateQuasi {
        cooked: token.value.clone(),
        raw: raw.to_string(),
    }
}
