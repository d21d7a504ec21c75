//! Type annotation parsing

use super::*;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<Type>> {
        if self.check(&TokenKind::New)
            || (self.check_word("abstract") && self.peek_kind(1) == Some(TokenKind::New))
        {
            return self.parse_function_type(true);
        }
        if self.check(&TokenKind::Lt) {
            return self.parse_function_type(false);
        }
        if self.check(&TokenKind::LParen) {
            if let Some(ty) = self.try_parse(|p| p.parse_parenthesized_function_type()) {
                return Ok(ty);
            }
        }

        let start = self.current_token().span;
        let check_type = self.parse_union_type()?;

        // T extends U ? X : Y
        if !self.check(&TokenKind::Extends) || self.current_token().preceded_by_newline {
            return Ok(check_type);
        }
        self.advance();
        let extends_type = Box::new(self.parse_union_type()?);
        self.consume(TokenKind::Question)?;
        let true_type = Box::new(self.parse_type()?);
        self.consume(TokenKind::Colon)?;
        let false_type = Box::new(self.parse_type()?);

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(
            Type::Conditional {
                check_type: Box::new(check_type),
                extends_type,
                true_type,
                false_type,
            },
            span,
        ))
    }

    /// Return type position, where `x is T` and `asserts x` are allowed.
    pub(crate) fn parse_type_or_predicate(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        let asserts = self.check_word("asserts")
            && matches!(self.peek_kind(1), Some(TokenKind::Identifier | TokenKind::This))
            && self.peek_same_line(1);
        if asserts {
            self.advance();
        }

        let is_predicate = matches!(self.current_token().kind, TokenKind::Identifier | TokenKind::This)
            && self.peek_token(1).is_some_and(|t| t.is_word("is") && !t.preceded_by_newline);

        if is_predicate {
            let token = self.advance();
            let param = Node::new(Ident::new(token.text.clone()), token.span);
            self.consume_word("is")?;
            let ty = Box::new(self.parse_type()?);
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(Type::Predicate { param, ty }, span));
        }

        if asserts {
            // asserts x: the function returns normally only when x is truthy
            self.advance();
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(Type::Primitive(PrimitiveType::Void), span));
        }

        self.parse_type()
    }

    fn parse_function_type(&mut self, is_constructor: bool) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        if is_constructor {
            self.eat_word("abstract");
            self.consume(TokenKind::New)?;
        }

        let type_params = self.parse_type_parameters()?;
        let params = self.parse_function_type_params()?;
        self.consume(TokenKind::FatArrow)?;
        let return_type = Box::new(self.parse_type_or_predicate()?);

        let function = FunctionType {
            type_params,
            params,
            return_type,
        };
        let span = start.merge(&self.previous_token().span);
        let ty = if is_constructor {
            Type::Constructor(function)
        } else {
            Type::Function(function)
        };
        Ok(Node::new(ty, span))
    }

    /// `(params) => T`, giving up when no `=>` follows the parameter list.
    fn parse_parenthesized_function_type(&mut self) -> ParseResult<Option<Node<Type>>> {
        let start = self.current_token().span;
        let params = self.parse_function_type_params()?;
        if !self.eat(TokenKind::FatArrow) {
            return Ok(None);
        }
        let return_type = Box::new(self.parse_type_or_predicate()?);

        let span = start.merge(&self.previous_token().span);
        Ok(Some(Node::new(
            Type::Function(FunctionType {
                type_params: None,
                params,
                return_type,
            }),
            span,
        )))
    }

    fn parse_function_type_params(&mut self) -> ParseResult<Vec<FunctionTypeParam>> {
        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_function_type_param()?);
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_function_type_param(&mut self) -> ParseResult<FunctionTypeParam> {
        // Modifiers are meaningless here but allowed in overload signatures
        while matches!(
            self.current_token().text.as_str(),
            "public" | "private" | "protected" | "readonly"
        ) && self.peek_kind(1) == Some(TokenKind::Identifier)
        {
            self.advance();
        }

        let is_rest = self.eat(TokenKind::DotDotDot);

        let name = match self.current_token().kind {
            TokenKind::Identifier | TokenKind::This => {
                let token = self.advance();
                Some(Node::new(Ident::new(token.text.clone()), token.span))
            }
            TokenKind::LBrace | TokenKind::LBracket => {
                self.parse_binding_target()?;
                None
            }
            _ => return Err(self.error(1003, "Identifier expected.")),
        };

        let optional = self.eat(TokenKind::Question);
        let ty = if self.eat(TokenKind::Colon) {
            self.parse_type()?
        } else {
            Node::new(Type::Primitive(PrimitiveType::Any), self.previous_token().span)
        };

        Ok(FunctionTypeParam {
            name,
            ty,
            optional,
            is_rest,
        })
    }

    fn parse_union_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        self.eat(TokenKind::Pipe);
        let mut types = vec![self.parse_intersection_type()?];

        while self.eat(TokenKind::Pipe) {
            types.push(self.parse_intersection_type()?);
        }

        if types.len() == 1 {
            return Ok(types.remove(0));
        }
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Type::Union(types), span))
    }

    fn parse_intersection_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        self.eat(TokenKind::Amp);
        let mut types = vec![self.parse_type_operator()?];

        while self.eat(TokenKind::Amp) {
            types.push(self.parse_type_operator()?);
        }

        if types.len() == 1 {
            return Ok(types.remove(0));
        }
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Type::Intersection(types), span))
    }

    fn parse_type_operator(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        if self.eat_word("keyof") {
            let operand = Box::new(self.parse_type_operator()?);
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(Type::Keyof(operand), span));
        }

        // readonly T[] and unique symbol have the same shape as their operand
        if (self.check_word("readonly") || self.check_word("unique"))
            && matches!(self.peek_kind(1), Some(TokenKind::Identifier | TokenKind::LBracket | TokenKind::LParen))
        {
            self.advance();
            return self.parse_type_operator();
        }

        // infer U (inside a conditional's extends clause)
        if self.check_word("infer") && self.peek_kind(1) == Some(TokenKind::Identifier) {
            self.advance();
            let name = self.parse_identifier()?;
            let span = name.span;
            return Ok(Node::new(
                Type::TypeRef {
                    name,
                    type_args: None,
                },
                span,
            ));
        }

        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let mut ty = self.parse_primary_type()?;

        while self.check(&TokenKind::LBracket) && !self.current_token().preceded_by_newline {
            self.advance();
            if self.eat(TokenKind::RBracket) {
                let span = start.merge(&self.previous_token().span);
                ty = Node::new(Type::Array(Box::new(ty)), span);
                continue;
            }

            let index_type = Box::new(self.parse_type()?);
            self.consume(TokenKind::RBracket)?;
            let span = start.merge(&self.previous_token().span);
            ty = Node::new(
                Type::IndexedAccess {
                    object_type: Box::new(ty),
                    index_type,
                },
                span,
            );
        }

        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let token = self.current_token().clone();

        let ty = match token.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RParen)?;
                Type::Paren(Box::new(inner))
            }
            TokenKind::LBracket => self.parse_tuple_type()?,
            TokenKind::LBrace if self.is_mapped_type_start() => self.parse_mapped_type()?,
            TokenKind::LBrace => Type::Object(ObjectType {
                members: self.parse_object_type_members()?,
            }),
            TokenKind::StringLiteral | TokenKind::NoSubstitutionTemplate => {
                self.advance();
                Type::Literal(LiteralType::String(token.value))
            }
            TokenKind::NumberLiteral => {
                self.advance();
                Type::Literal(LiteralType::Number(parse_number_value(&token.value)))
            }
            TokenKind::Minus if self.peek_kind(1) == Some(TokenKind::NumberLiteral) => {
                self.advance();
                let value = parse_number_value(&self.advance().value);
                Type::Literal(LiteralType::Number(-value))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Type::Literal(LiteralType::Boolean(token.kind == TokenKind::True))
            }
            TokenKind::Null => {
                self.advance();
                Type::Primitive(PrimitiveType::Null)
            }
            TokenKind::Void => {
                self.advance();
                Type::Primitive(PrimitiveType::Void)
            }
            TokenKind::This => {
                self.advance();
                Type::TypeRef {
                    name: Node::new(Ident::new("this"), token.span),
                    type_args: None,
                }
            }
            TokenKind::Typeof => {
                self.advance();
                Type::TypeQuery(self.parse_dotted_name()?)
            }
            TokenKind::Identifier if self.peek_kind(1) != Some(TokenKind::Dot) => {
                match PrimitiveType::from_keyword(&token.text) {
                    Some(primitive) => {
                        self.advance();
                        Type::Primitive(primitive)
                    }
                    None => return self.parse_type_reference(),
                }
            }
            TokenKind::Identifier => return self.parse_type_reference(),
            _ => return Err(self.error(1110, "Type expected.")),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(ty, span))
    }

    /// `Name`, `ns.Name` or `Name<Args>`.
    pub(crate) fn parse_type_reference(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;
        let name = self.parse_dotted_name()?;

        let type_args = if self.check(&TokenKind::Lt) {
            Some(self.parse_type_arguments()?)
        } else {
            None
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Type::TypeRef { name, type_args }, span))
    }

    /// Entity name such as `a.b.C`, kept as one dotted identifier.
    fn parse_dotted_name(&mut self) -> ParseResult<Node<Ident>> {
        let first = if self.check(&TokenKind::This) {
            let token = self.advance();
            Node::new(Ident::new("this"), token.span)
        } else {
            self.parse_identifier()?
        };

        let mut name = first.value.name;
        let mut span = first.span;
        while self.check(&TokenKind::Dot) {
            self.advance();
            let part = self.parse_identifier_name()?;
            name.push('.');
            name.push_str(&part.value.name);
            span = span.merge(&part.span);
        }

        Ok(Node::new(Ident::new(name), span))
    }

    fn parse_tuple_type(&mut self) -> ParseResult<Type> {
        self.consume(TokenKind::LBracket)?;
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            self.eat(TokenKind::DotDotDot);

            // Labelled element: [name: T] or [name?: T]
            let labelled = self.check(&TokenKind::Identifier)
                && (self.peek_kind(1) == Some(TokenKind::Colon)
                    || (self.peek_kind(1) == Some(TokenKind::Question)
                        && self.peek_kind(2) == Some(TokenKind::Colon)));
            if labelled {
                self.advance();
                self.eat(TokenKind::Question);
                self.consume(TokenKind::Colon)?;
            }

            elements.push(self.parse_type()?);
            self.eat(TokenKind::Question);

            if !self.check(&TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBracket)?;
        Ok(Type::Tuple(elements))
    }

    fn is_mapped_type_start(&self) -> bool {
        let mut offset = 1;
        if matches!(self.peek_kind(offset), Some(TokenKind::Plus | TokenKind::Minus)) {
            offset += 1;
        }
        if self.peek_token(offset).is_some_and(|t| t.is_word("readonly")) {
            offset += 1;
        }
        self.peek_kind(offset) == Some(TokenKind::LBracket)
            && self.peek_kind(offset + 1) == Some(TokenKind::Identifier)
            && self.peek_kind(offset + 2) == Some(TokenKind::In)
    }

    fn parse_mapped_modifier(&mut self, word: Option<&str>) -> ParseResult<Option<MappedModifier>> {
        let modifier = if self.eat(TokenKind::Plus) {
            MappedModifier::Add
        } else if self.eat(TokenKind::Minus) {
            MappedModifier::Remove
        } else {
            let present = match word {
                Some(word) => self.eat_word(word),
                None => self.eat(TokenKind::Question),
            };
            return Ok(present.then_some(MappedModifier::Present));
        };

        match word {
            Some(word) => self.consume_word(word)?,
            None => {
                self.consume(TokenKind::Question)?;
            }
        }
        Ok(Some(modifier))
    }

    /// `{ readonly [K in C]?: V }`
    fn parse_mapped_type(&mut self) -> ParseResult<Type> {
        self.consume(TokenKind::LBrace)?;
        let readonly = self.parse_mapped_modifier(Some("readonly"))?;

        self.consume(TokenKind::LBracket)?;
        let type_param = self.parse_identifier()?;
        self.consume(TokenKind::In)?;
        let constraint = Box::new(self.parse_type()?);
        // key remapping (`as`) does not change the value side
        if self.eat_word("as") {
            self.parse_type()?;
        }
        self.consume(TokenKind::RBracket)?;

        let optional = self.parse_mapped_modifier(None)?;

        let value_type = if self.eat(TokenKind::Colon) {
            Box::new(self.parse_type()?)
        } else {
            Box::new(Node::new(
                Type::Primitive(PrimitiveType::Any),
                self.previous_token().span,
            ))
        };

        if !self.eat(TokenKind::Semicolon) {
            self.eat(TokenKind::Comma);
        }
        self.consume(TokenKind::RBrace)?;

        Ok(Type::Mapped {
            type_param,
            constraint,
            value_type,
            readonly,
            optional,
        })
    }

    /// `<T extends C = D, ...>`, if present.
    pub(crate) fn parse_type_parameters(&mut self) -> ParseResult<Option<Vec<TypeParam>>> {
        if !self.eat(TokenKind::Lt) {
            return Ok(None);
        }

        let mut params = Vec::new();
        while !self.check(&TokenKind::Gt) && !self.is_at_end() {
            // variance and const modifiers
            while (self.check(&TokenKind::Const) || self.check(&TokenKind::In) || self.check_word("out"))
                && self.peek_kind(1) == Some(TokenKind::Identifier)
            {
                self.advance();
            }

            let name = self.parse_identifier()?;
            let constraint = if self.eat(TokenKind::Extends) {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            let default = if self.eat(TokenKind::Eq) {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };

            params.push(TypeParam {
                name,
                constraint,
                default,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.consume_type_closer()?;
        Ok(Some(params))
    }

    /// `<A, B>` after a type name, call or heritage clause.
    pub(crate) fn parse_type_arguments(&mut self) -> ParseResult<Vec<Node<Type>>> {
        self.consume(TokenKind::Lt)?;

        let mut args = vec![self.parse_type()?];
        while self.eat(TokenKind::Comma) {
            args.push(self.parse_type()?);
        }

        self.consume_type_closer()?;
        Ok(args)
    }

    /// `{ members }` of an interface or object type literal.
    pub(crate) fn parse_object_type_members(&mut self) -> ParseResult<Vec<ObjectTypeMember>> {
        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_object_type_member()?);

            if !self.eat(TokenKind::Semicolon)
                && !self.eat(TokenKind::Comma)
                && !self.check(&TokenKind::RBrace)
                && !self.current_token().preceded_by_newline
            {
                return Err(self.error(1005, "';' expected."));
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(members)
    }

    fn parse_signature_return_type(&mut self) -> ParseResult<Option<Node<Type>>> {
        Ok(self.parse_return_type()?.map(|ty| *ty))
    }

    fn parse_object_type_member(&mut self) -> ParseResult<ObjectTypeMember> {
        // call signature
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let type_params = self.parse_type_parameters()?;
            let params = self.parse_function_type_params()?;
            let return_type = self.parse_signature_return_type()?;
            return Ok(ObjectTypeMember::CallSignature {
                type_params,
                params,
                return_type,
            });
        }

        // construct signature
        if self.check(&TokenKind::New)
            && matches!(self.peek_kind(1), Some(TokenKind::LParen | TokenKind::Lt))
        {
            self.advance();
            let type_params = self.parse_type_parameters()?;
            let params = self.parse_function_type_params()?;
            let return_type = self.parse_signature_return_type()?;
            return Ok(ObjectTypeMember::ConstructSignature {
                type_params,
                params,
                return_type,
            });
        }

        let readonly = self.check_word("readonly") && self.peek_is_property_name(1);
        if readonly {
            self.advance();
        }

        // index signature: [key: K]: V
        if self.check(&TokenKind::LBracket)
            && self.peek_kind(1) == Some(TokenKind::Identifier)
            && self.peek_kind(2) == Some(TokenKind::Colon)
        {
            self.advance();
            let key_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let key_type = self.parse_type()?;
            self.consume(TokenKind::RBracket)?;
            self.consume(TokenKind::Colon)?;
            let value_type = self.parse_type()?;
            return Ok(ObjectTypeMember::IndexSignature {
                key_name,
                key_type,
                value_type,
                readonly,
            });
        }

        // get x(): T / set x(v: T) behave like a property
        let accessor = (self.check_word("get") || self.check_word("set")) && self.peek_is_property_name(1);
        if accessor {
            let is_getter = self.advance().text == "get";
            let name = self.parse_property_name()?;
            let params = self.parse_function_type_params()?;
            let return_type = self.parse_signature_return_type()?;
            let ty = if is_getter {
                return_type
            } else {
                params.into_iter().next().map(|param| param.ty)
            };
            return Ok(ObjectTypeMember::Property {
                name,
                ty,
                optional: false,
                readonly: false,
            });
        }

        if !self.is_property_name_start() {
            return Err(self.error(1131, "Property or signature expected."));
        }
        let name = self.parse_property_name()?;
        let optional = self.eat(TokenKind::Question);

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let type_params = self.parse_type_parameters()?;
            let params = self.parse_function_type_params()?;
            let return_type = self.parse_signature_return_type()?;
            return Ok(ObjectTypeMember::Method {
                name,
                type_params,
                params,
                return_type,
                optional,
            });
        }

        let ty = self.parse_type_annotation()?.map(|ty| *ty);
        Ok(ObjectTypeMember::Property {
            name,
            ty,
            optional,
            readonly,
        })
    }
}
