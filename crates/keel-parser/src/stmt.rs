//! Statement parsing

use super::*;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        if self.is_declaration_start() {
            let decl = self.parse_declaration()?;
            let span = decl.span;
            return Ok(Node::new(Stmt::Decl(Box::new(decl)), span));
        }

        let stmt = match self.current_token().kind {
            TokenKind::LBrace => Stmt::Block(self.parse_block_statement()?.value),
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::For => self.parse_for_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::Do => self.parse_do_while_statement()?,
            TokenKind::Switch => self.parse_switch_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::Break | TokenKind::Continue => self.parse_jump_statement()?,
            TokenKind::Throw => self.parse_throw_statement()?,
            TokenKind::Try => self.parse_try_statement()?,
            TokenKind::Debugger => {
                self.advance();
                self.consume_semicolon()?;
                Stmt::Debugger
            }
            TokenKind::Semicolon => {
                self.advance();
                Stmt::Empty
            }
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                let var_decl = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Stmt::VarDecl(var_decl)
            }
            TokenKind::Identifier if self.peek_kind(1) == Some(TokenKind::Colon) => {
                let label = self.parse_identifier()?;
                self.consume(TokenKind::Colon)?;
                let stmt = Box::new(self.parse_statement()?);
                Stmt::Labeled { label, stmt }
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Stmt::Expr(expr)
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(stmt, span))
    }

    /// Parses `{ stmts }`, recovering from errors inside the block so that
    /// one bad statement does not hide the rest.
    pub(crate) fn parse_block_statement(&mut self) -> ParseResult<Node<BlockStmt>> {
        let start = self.current_token().span;
        self.consume(TokenKind::LBrace)?;

        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        self.consume(TokenKind::RBrace)?;
        let span = start.merge(&self.previous_token().span);

        Ok(Node::new(BlockStmt { stmts }, span))
    }

    /// Function bodies reset the `for`-initializer restriction on `in`.
    pub(crate) fn parse_function_body(&mut self) -> ParseResult<Node<BlockStmt>> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let body = self.parse_block_statement();
        self.no_in = saved;
        body
    }

    /// Parses `var`/`let`/`const` declarators without the trailing semicolon.
    pub(crate) fn parse_variable_declaration(&mut self) -> ParseResult<VarDecl> {
        let kind = match self.current_token().kind {
            TokenKind::Const => VarDeclKind::Const,
            TokenKind::Let => VarDeclKind::Let,
            TokenKind::Var => VarDeclKind::Var,
            _ => return Err(self.error(1128, "Declaration or statement expected.")),
        };
        self.advance();

        let mut declarations = Vec::new();

        loop {
            let mut pattern = self.parse_binding_target()?;
            self.eat(TokenKind::Bang);
            if let Some(annotation) = self.parse_type_annotation()? {
                pattern.span = pattern.span.merge(&annotation.span);
                if let Pattern::Ident {
                    type_annotation, ..
                } = &mut pattern.value
                {
                    *type_annotation = Some(annotation);
                }
            }

            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assignment_expr()?)
            } else {
                None
            };

            declarations.push(VarDeclarator { pattern, init });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok(VarDecl {
            kind,
            declarations,
            is_declare: false,
        })
    }

    fn parse_paren_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.consume(TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.consume(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::If)?;
        let condition = self.parse_paren_expression()?;
        let then_stmt = Box::new(self.parse_statement()?);

        let else_stmt = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_stmt,
            else_stmt,
        })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::For)?;
        self.consume(TokenKind::LParen)?;

        let saved = std::mem::replace(&mut self.no_in, true);
        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.current_token().kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            Some(ForInit::VarDecl(self.parse_variable_declaration()?))
        } else {
            Some(ForInit::Expr(self.parse_expression()?))
        };
        self.no_in = saved;

        let is_in = self.check(&TokenKind::In);
        if is_in || self.check_word("of") {
            self.advance();
            let left = match init {
                Some(ForInit::VarDecl(decl)) => ForInLeft::VarDecl(decl),
                Some(ForInit::Expr(expr)) => ForInLeft::Pattern(self.expr_to_pattern(expr)?),
                None => return Err(self.error(1109, "Expression expected.")),
            };
            let right = if is_in {
                self.parse_expression()?
            } else {
                self.parse_assignment_expr()?
            };
            self.consume(TokenKind::RParen)?;
            let body = Box::new(self.parse_statement()?);

            return Ok(if is_in {
                Stmt::ForIn { left, right, body }
            } else {
                Stmt::ForOf { left, right, body }
            });
        }

        self.consume(TokenKind::Semicolon)?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::While)?;
        let condition = self.parse_paren_expression()?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Do)?;
        let body = Box::new(self.parse_statement()?);
        self.consume(TokenKind::While)?;
        let condition = self.parse_paren_expression()?;
        // The semicolon after do-while is always optional
        self.eat(TokenKind::Semicolon);

        Ok(Stmt::DoWhile { body, condition })
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Switch)?;
        let discriminant = self.parse_paren_expression()?;
        self.consume(TokenKind::LBrace)?;

        let mut cases = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let test = if self.eat(TokenKind::Case) {
                Some(self.parse_expression()?)
            } else {
                self.consume(TokenKind::Default)?;
                None
            };
            self.consume(TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                match self.parse_statement() {
                    Ok(stmt) => consequent.push(stmt),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                }
            }

            cases.push(SwitchCase { test, consequent });
        }

        self.consume(TokenKind::RBrace)?;

        Ok(Stmt::Switch {
            discriminant,
            cases,
        })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Return)?;

        let value = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.current_token().preceded_by_newline
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.consume_semicolon()?;
        Ok(Stmt::Return(value))
    }

    fn parse_jump_statement(&mut self) -> ParseResult<Stmt> {
        let is_break = self.advance().kind == TokenKind::Break;

        let label = if self.check(&TokenKind::Identifier) && !self.current_token().preceded_by_newline {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        self.consume_semicolon()?;
        Ok(if is_break {
            Stmt::Break(label)
        } else {
            Stmt::Continue(label)
        })
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Throw)?;
        if self.current_token().preceded_by_newline {
            return Err(self.error(1109, "Expression expected."));
        }
        let expr = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Stmt::Throw(expr))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Try)?;
        let block = self.parse_block_statement()?;

        let catch = if self.eat(TokenKind::Catch) {
            let param = if self.eat(TokenKind::LParen) {
                let pattern = self.parse_binding_target()?;
                // catch clause annotations may only be `any`/`unknown`; they are erased
                self.parse_type_annotation()?;
                self.consume(TokenKind::RParen)?;
                Some(pattern)
            } else {
                None
            };
            let body = self.parse_block_statement()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finally = if self.eat(TokenKind::Finally) {
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            return Err(self.error(1005, "'catch' expected."));
        }

        Ok(Stmt::Try {
            block,
            catch,
            finally,
        })
    }
}
