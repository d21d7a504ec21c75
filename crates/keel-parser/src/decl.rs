//! Declaration parsing

use super::*;

const DEFAULT_EXPORT_NAME: &str = "default_1";

impl Parser {
    /// Whether the current token begins a function, class, interface, type
    /// alias, enum, namespace or ambient declaration. Plain `var`/`let`/`const`
    /// are parsed as statements instead.
    pub(crate) fn is_declaration_start(&self) -> bool {
        let token = self.current_token();
        match token.kind {
            TokenKind::At | TokenKind::Function | TokenKind::Class | TokenKind::Enum => true,
            TokenKind::Const => self.peek_kind(1) == Some(TokenKind::Enum),
            TokenKind::Identifier => {
                let next = self.peek_kind(1);
                let same_line = self.peek_same_line(1);
                match token.text.as_str() {
                    "async" => next == Some(TokenKind::Function) && same_line,
                    "abstract" => next == Some(TokenKind::Class) && same_line,
                    "interface" | "namespace" => next == Some(TokenKind::Identifier) && same_line,
                    "module" => {
                        matches!(next, Some(TokenKind::Identifier | TokenKind::StringLiteral))
                            && same_line
                    }
                    "type" => {
                        next == Some(TokenKind::Identifier)
                            && same_line
                            && matches!(self.peek_kind(2), Some(TokenKind::Eq | TokenKind::Lt))
                    }
                    "declare" => {
                        same_line
                            && self.peek_token(1).is_some_and(|t| {
                                t.kind.is_keyword() || t.kind == TokenKind::Identifier
                            })
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Node<Decl>> {
        let start = self.current_token().span;

        let mut decorators = std::mem::take(&mut self.pending_decorators);
        decorators.extend(self.parse_decorators()?);
        if !decorators.is_empty()
            && !self.check(&TokenKind::Class)
            && !(self.check_word("abstract") && self.peek_kind(1) == Some(TokenKind::Class))
        {
            return Err(self.error(1206, "Decorators are not valid here."));
        }

        let is_declare = self.check_word("declare") && self.peek_same_line(1);
        if is_declare {
            self.advance();
        }

        let token = self.current_token();
        let decl = match (token.kind, token.text.as_str()) {
            (TokenKind::Function, _) => {
                Decl::Function(self.parse_function_declaration(is_declare, false)?)
            }
            (TokenKind::Identifier, "async") => {
                self.advance();
                Decl::Function(self.parse_function_declaration(is_declare, true)?)
            }
            (TokenKind::Class, _) => {
                let mut class_decl = self.parse_class_declaration(is_declare, false)?;
                class_decl.decorators = decorators;
                Decl::Class(class_decl)
            }
            (TokenKind::Identifier, "abstract") => {
                self.advance();
                let mut class_decl = self.parse_class_declaration(is_declare, true)?;
                class_decl.decorators = decorators;
                Decl::Class(class_decl)
            }
            (TokenKind::Enum, _) => Decl::Enum(self.parse_enum_declaration(is_declare, false)?),
            (TokenKind::Const, _) if self.peek_kind(1) == Some(TokenKind::Enum) => {
                self.advance();
                Decl::Enum(self.parse_enum_declaration(is_declare, true)?)
            }
            (TokenKind::Var | TokenKind::Let | TokenKind::Const, _) => {
                let mut var_decl = self.parse_variable_declaration()?;
                var_decl.is_declare = is_declare;
                self.consume_semicolon()?;
                Decl::Var(var_decl)
            }
            (TokenKind::Identifier, "interface") => {
                Decl::Interface(self.parse_interface_declaration(is_declare)?)
            }
            (TokenKind::Identifier, "type") => {
                Decl::TypeAlias(self.parse_type_alias_declaration(is_declare)?)
            }
            (TokenKind::Identifier, "namespace" | "module") => {
                self.advance();
                Decl::Module(self.parse_module_declaration(is_declare)?)
            }
            (TokenKind::Identifier, "global") if is_declare => {
                let name = self.parse_identifier()?;
                let body = self.parse_module_block()?;
                Decl::Module(ModuleDecl {
                    name: ModuleName::Ident(name),
                    body,
                    is_declare,
                })
            }
            _ => return Err(self.error(1128, "Declaration or statement expected.")),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(decl, span))
    }

    /// Name of a function or class, which may be omitted after `export default`.
    fn parse_binding_name(&mut self) -> ParseResult<Node<Ident>> {
        if self.anonymous_default && !self.check(&TokenKind::Identifier) {
            self.anonymous_default = false;
            let span = self.current_token().span;
            return Ok(Node::new(
                Ident::new(DEFAULT_EXPORT_NAME),
                Span::new(span.start, span.start, span.file_id),
            ));
        }
        self.anonymous_default = false;
        self.parse_identifier()
    }

    pub(crate) fn parse_function_declaration(
        &mut self,
        is_declare: bool,
        is_async: bool,
    ) -> ParseResult<FunctionDecl> {
        self.consume(TokenKind::Function)?;

        let is_generator = self.eat(TokenKind::Star);
        let name = self.parse_binding_name()?;
        let type_params = self.parse_type_parameters()?;
        let params = self.parse_function_params()?;
        let return_type = self.parse_return_type()?;

        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_function_body()?)
        } else {
            self.consume_semicolon()?;
            None
        };

        Ok(FunctionDecl {
            name,
            type_params,
            params,
            return_type,
            body,
            is_async,
            is_generator,
            is_declare,
        })
    }

    pub(crate) fn parse_class_declaration(
        &mut self,
        is_declare: bool,
        is_abstract: bool,
    ) -> ParseResult<ClassDecl> {
        self.consume(TokenKind::Class)?;
        let name = self.parse_binding_name()?;
        let type_params = self.parse_type_parameters()?;

        let extends = if self.eat(TokenKind::Extends) {
            let base = Box::new(self.parse_heritage_expression()?);
            let type_args = if self.check(&TokenKind::Lt) {
                Some(self.parse_type_arguments()?)
            } else {
                None
            };
            Some(ClassExtends { base, type_args })
        } else {
            None
        };

        let mut implements = Vec::new();
        if self.eat_word("implements") {
            loop {
                implements.push(self.parse_type_reference()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let start = self.current_token().span;
            let member = self.parse_class_member()?;
            let span = start.merge(&self.previous_token().span);
            members.push(Node::new(member, span));
        }

        self.consume(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            type_params,
            extends,
            implements,
            members,
            is_abstract,
            is_declare,
            decorators: vec![],
        })
    }

    /// A modifier word only acts as one when a member name follows it.
    fn modifier_applies(&self) -> bool {
        let Some(next) = self.peek_token(1) else {
            return false;
        };
        match next.kind {
            TokenKind::Identifier
            | TokenKind::StringLiteral
            | TokenKind::NumberLiteral
            | TokenKind::LBracket
            | TokenKind::Star => true,
            kind => kind.is_keyword(),
        }
    }

    pub(crate) fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let decorators = self.parse_decorators()?;

        let mut access = AccessModifier::Public;
        let mut is_static = false;
        let mut is_readonly = false;
        let mut is_abstract = false;
        let mut is_async = false;

        while self.check(&TokenKind::Identifier) && self.modifier_applies() {
            match self.current_token().text.as_str() {
                "public" => access = AccessModifier::Public,
                "private" => access = AccessModifier::Private,
                "protected" => access = AccessModifier::Protected,
                "static" => is_static = true,
                "readonly" => is_readonly = true,
                "abstract" => is_abstract = true,
                "declare" | "override" => {}
                "async" if self.peek_same_line(1) => is_async = true,
                _ => break,
            }
            self.advance();
        }

        // Index signature: [key: string]: T
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
            self.consume_semicolon()?;

            return Ok(ClassMember::IndexSignature {
                key_name,
                key_type,
                value_type,
                is_readonly,
            });
        }

        let is_generator = self.eat(TokenKind::Star);

        let accessor = if !is_generator
            && (self.check_word("get") || self.check_word("set"))
            && self.modifier_applies()
            && self.peek_kind(1) != Some(TokenKind::Star)
        {
            let word = self.advance().text.clone();
            Some(word)
        } else {
            None
        };

        if !self.is_property_name_start() {
            return Err(self.error(
                1068,
                "Unexpected token. A constructor, method, accessor, or property was expected.",
            ));
        }

        // Constructor
        if accessor.is_none() && !is_static && self.check_word("constructor") {
            self.advance();
            let params = self.parse_function_params()?;
            let body = self.parse_optional_body()?;
            return Ok(ClassMember::Constructor {
                params,
                body,
                access,
            });
        }

        let name = self.parse_property_name()?;

        match accessor.as_deref() {
            Some("get") => {
                self.consume(TokenKind::LParen)?;
                self.consume(TokenKind::RParen)?;
                let return_type = self.parse_type_annotation()?;
                let body = self.parse_optional_body()?;
                return Ok(ClassMember::Getter {
                    name,
                    return_type,
                    body,
                    access,
                    is_static,
                    is_abstract,
                    decorators,
                });
            }
            Some(_) => {
                self.consume(TokenKind::LParen)?;
                let param = self.parse_function_param()?;
                self.consume(TokenKind::RParen)?;
                let body = self.parse_optional_body()?;
                return Ok(ClassMember::Setter {
                    name,
                    param,
                    body,
                    access,
                    is_static,
                    is_abstract,
                    decorators,
                });
            }
            None => {}
        }

        let is_optional = self.eat(TokenKind::Question);
        self.eat(TokenKind::Bang);

        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            let type_params = self.parse_type_parameters()?;
            let params = self.parse_function_params()?;
            let return_type = self.parse_return_type()?;
            let body = self.parse_optional_body()?;

            return Ok(ClassMember::Method {
                name,
                type_params,
                params,
                return_type,
                body,
                access,
                is_static,
                is_async,
                is_generator,
                is_abstract,
                is_optional,
                decorators,
            });
        }

        let type_annotation = self.parse_type_annotation()?;
        let init = if self.eat(TokenKind::Eq) {
            Some(self.parse_assignment_expr()?)
        } else {
            None
        };
        self.consume_semicolon()?;

        Ok(ClassMember::Property {
            name,
            type_annotation,
            init,
            access,
            is_static,
            is_readonly,
            is_abstract,
            is_optional,
            decorators,
        })
    }

    /// Body of a member that may be abstract or an overload signature.
    fn parse_optional_body(&mut self) -> ParseResult<Option<Node<BlockStmt>>> {
        if self.check(&TokenKind::LBrace) {
            Ok(Some(self.parse_function_body()?))
        } else {
            self.consume_semicolon()?;
            Ok(None)
        }
    }

    pub(crate) fn parse_interface_declaration(&mut self, is_declare: bool) -> ParseResult<InterfaceDecl> {
        self.consume_word("interface")?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_type_parameters()?;

        let mut extends = Vec::new();
        if self.eat(TokenKind::Extends) {
            loop {
                extends.push(self.parse_type_reference()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let members = self.parse_object_type_members()?;

        Ok(InterfaceDecl {
            name,
            type_params,
            extends,
            members,
            is_declare,
        })
    }

    pub(crate) fn parse_type_alias_declaration(&mut self, is_declare: bool) -> ParseResult<TypeAliasDecl> {
        self.consume_word("type")?;
        let name = self.parse_identifier()?;
        let type_params = self.parse_type_parameters()?;
        self.consume(TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.consume_semicolon()?;

        Ok(TypeAliasDecl {
            name,
            type_params,
            ty,
            is_declare,
        })
    }

    pub(crate) fn parse_enum_declaration(&mut self, is_declare: bool, is_const: bool) -> ParseResult<EnumDecl> {
        self.consume(TokenKind::Enum)?;
        let name = self.parse_identifier()?;
        self.consume(TokenKind::LBrace)?;

        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let member_name = if self.check(&TokenKind::StringLiteral) {
                let token = self.advance();
                Node::new(Ident::new(token.value.clone()), token.span)
            } else {
                self.parse_identifier_name()?
            };
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment_expr()?)
            } else {
                None
            };

            members.push(EnumMember {
                name: member_name,
                init,
            });

            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RBrace)?;

        Ok(EnumDecl {
            name,
            members,
            is_const,
            is_declare,
        })
    }

    /// Parses the rest of `namespace A.B { ... }` or `module "m" { ... }`
    /// after the keyword.
    pub(crate) fn parse_module_declaration(&mut self, is_declare: bool) -> ParseResult<ModuleDecl> {
        if self.check(&TokenKind::StringLiteral) {
            let name = ModuleName::String(self.parse_module_specifier()?);
            // Shorthand ambient module: declare module "m";
            let body = if self.check(&TokenKind::LBrace) {
                self.parse_module_block()?
            } else {
                self.consume_semicolon()?;
                ModuleBody::Block(vec![])
            };
            return Ok(ModuleDecl {
                name,
                body,
                is_declare,
            });
        }

        let name = self.parse_identifier()?;

        let body = if self.eat(TokenKind::Dot) {
            let nested_start = self.current_token().span;
            let nested = self.parse_module_declaration(is_declare)?;
            let span = nested_start.merge(&self.previous_token().span);
            ModuleBody::Namespace(Box::new(Node::new(nested, span)))
        } else {
            self.parse_module_block()?
        };

        Ok(ModuleDecl {
            name: ModuleName::Ident(name),
            body,
            is_declare,
        })
    }

    fn parse_module_block(&mut self) -> ParseResult<ModuleBody> {
        self.consume(TokenKind::LBrace)?;
        let mut items = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_module_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        self.consume(TokenKind::RBrace)?;
        Ok(ModuleBody::Block(items))
    }
}
