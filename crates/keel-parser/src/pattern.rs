//! Pattern parsing

use super::*;

impl Parser {
    /// Parses a binding identifier or destructuring pattern, without a type
    /// annotation or default value.
    pub(crate) fn parse_binding_target(&mut self) -> ParseResult<Node<Pattern>> {
        let start = self.current_token().span;

        let pattern = match self.current_token().kind {
            TokenKind::LBracket => self.parse_array_pattern()?,
            TokenKind::LBrace => self.parse_object_pattern()?,
            _ => {
                let name = self.parse_identifier()?;
                Pattern::Ident {
                    name,
                    type_annotation: None,
                }
            }
        };

        Ok(Node::new(pattern, start.merge(&self.previous_token().span)))
    }

    /// A destructuring element, which may carry a default value.
    pub(crate) fn parse_binding_element(&mut self) -> ParseResult<Node<Pattern>> {
        let target = self.parse_binding_target()?;
        self.with_default(target)
    }

    fn with_default(&mut self, target: Node<Pattern>) -> ParseResult<Node<Pattern>> {
        if !self.eat(TokenKind::Eq) {
            return Ok(target);
        }
        let default = Box::new(self.parse_assignment_expr()?);
        let span = target.span.merge(&default.span);
        Ok(Node::new(
            Pattern::Assignment {
                pattern: Box::new(target),
                default,
            },
            span,
        ))
    }

    fn parse_array_pattern(&mut self) -> ParseResult<Pattern> {
        self.consume(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            if self.eat(TokenKind::DotDotDot) {
                rest = Some(Box::new(self.parse_binding_target()?));
                break;
            } else if self.eat(TokenKind::Comma) {
                elements.push(None);
            } else {
                elements.push(Some(self.parse_binding_element()?));
                if !self.check(&TokenKind::RBracket) {
                    self.consume(TokenKind::Comma)?;
                }
            }
        }

        self.consume(TokenKind::RBracket)?;

        Ok(Pattern::Array { elements, rest })
    }

    fn parse_object_pattern(&mut self) -> ParseResult<Pattern> {
        self.consume(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.eat(TokenKind::DotDotDot) {
                rest = Some(Box::new(self.parse_binding_target()?));
                break;
            }

            let key = self.parse_property_name()?;

            let (value, shorthand) = if self.eat(TokenKind::Colon) {
                (self.parse_binding_element()?, false)
            } else if let PropertyName::Ident(ident) = &key {
                let target = Node::new(
                    Pattern::Ident {
                        name: ident.clone(),
                        type_annotation: None,
                    },
                    ident.span,
                );
                (self.with_default(target)?, true)
            } else {
                return Err(self.error(1005, "':' expected."));
            };

            properties.push(ObjectPatternProperty {
                key,
                value,
                shorthand,
            });

            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Pattern::Object { properties, rest })
    }

    /// Reinterprets an already-parsed expression as an assignment target,
    /// as in `for (x of xs)` or `[a, b] = pair`.
    pub(crate) fn expr_to_pattern(&self, expr: Node<Expr>) -> ParseResult<Node<Pattern>> {
        let span = expr.span;
        let pattern = match expr.value {
            Expr::Ident(ident) => Pattern::Ident {
                name: Node::new(ident, span),
                type_annotation: None,
            },
            Expr::Paren(inner) => return self.expr_to_pattern(*inner),
            Expr::Assignment {
                target,
                op: AssignmentOp::Assign,
                value,
            } => Pattern::Assignment {
                pattern: Box::new(self.expr_to_pattern(*target)?),
                default: value,
            },
            Expr::Array(elements) => {
                let mut patterns = Vec::new();
                let mut rest = None;
                for element in elements {
                    match element {
                        Some(Node {
                            value: Expr::Spread(inner),
                            ..
                        }) => rest = Some(Box::new(self.expr_to_pattern(*inner)?)),
                        Some(element) => patterns.push(Some(self.expr_to_pattern(element)?)),
                        None => patterns.push(None),
                    }
                }
                Pattern::Array {
                    elements: patterns,
                    rest,
                }
            }
            Expr::Object(props) => {
                let mut properties = Vec::new();
                let mut rest = None;
                for prop in props {
                    match prop {
                        ObjectProperty::Property {
                            key,
                            value,
                            shorthand,
                        } => properties.push(ObjectPatternProperty {
                            key,
                            value: self.expr_to_pattern(value)?,
                            shorthand,
                        }),
                        ObjectProperty::Spread(inner) => {
                            rest = Some(Box::new(self.expr_to_pattern(inner)?))
                        }
                        _ => {
                            return Err(ParseError::new(
                                1005,
                                "':' expected.",
                                span,
                            ))
                        }
                    }
                }
                Pattern::Object { properties, rest }
            }
            _ => {
                return Err(ParseError::new(
                    2364,
                    "The left-hand side of an assignment expression must be a variable or a property access.",
                    span,
                ))
            }
        };
        Ok(Node::new(pattern, span))
    }
}
