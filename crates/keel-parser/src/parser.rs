//! Core Parser struct and main parsing methods

use super::*;

/// Recursive descent parser for TypeScript
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    /// Errors recovered from inside blocks; top-level errors are collected
    /// by `parse_program` directly.
    pub(crate) errors: Vec<ParseError>,
    /// Set while parsing a `for` initializer, where `in` ends the expression
    pub(crate) no_in: bool,
    /// Tokens split by `consume_type_closer`, for undoing on rewind
    pub(crate) splits: Vec<(usize, Token)>,
    /// Decorators written before `export`, applied to the exported class
    pub(crate) pending_decorators: Vec<Node<Expr>>,
    /// The next function or class name may be omitted (`export default class {}`)
    pub(crate) anonymous_default: bool,
    /// Assignment expressions currently open
    pub(crate) depth: usize,
}

impl Parser {
    /// Creates a new parser from a token stream ending in `Eof`.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            no_in: false,
            splits: Vec::new(),
            pending_decorators: Vec::new(),
            anonymous_default: false,
            depth: 0,
        }
    }

    /// Parses a complete source file. Always produces a tree; syntax errors
    /// are returned alongside it in source order.
    pub fn parse_program(&mut self) -> (Program, Vec<ParseError>) {
        let start_span = self.current_token().span;
        let mut items = Vec::new();

        while !self.is_at_end() {
            if self.check(&TokenKind::RBrace) {
                let err = self.error(1128, "Declaration or statement expected.");
                self.errors.push(err);
                self.advance();
                continue;
            }
            match self.parse_module_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        let end_span = self.current_token().span;
        let program = Program {
            items,
            span: start_span.merge(&end_span),
        };

        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| e.span.start);
        (program, errors)
    }

    // =========================================================================
    // Module Items
    // =========================================================================

    pub(crate) fn parse_module_item(&mut self) -> ParseResult<Node<ModuleItem>> {
        let start = self.current_token().span;

        let item = match self.current_token().kind {
            TokenKind::Import if !matches!(self.peek_kind(1), Some(TokenKind::LParen | TokenKind::Dot)) => {
                ModuleItem::Import(self.parse_import_decl()?)
            }
            TokenKind::Export => ModuleItem::Export(self.parse_export_decl()?),
            TokenKind::At => {
                let decorators = self.parse_decorators()?;
                self.pending_decorators = decorators;
                if self.check(&TokenKind::Export) {
                    ModuleItem::Export(self.parse_export_decl()?)
                } else {
                    ModuleItem::Decl(self.parse_declaration()?)
                }
            }
            _ if self.is_declaration_start() => ModuleItem::Decl(self.parse_declaration()?),
            _ => ModuleItem::Stmt(self.parse_statement()?),
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(item, span))
    }

    // =========================================================================
    // Import/Export
    // =========================================================================

    pub(crate) fn parse_import_decl(&mut self) -> ParseResult<ImportDecl> {
        self.consume(TokenKind::Import)?;

        // import type { A } from "m"; import type X from "m"
        let type_only = self.check_word("type")
            && matches!(self.peek_kind(1), Some(TokenKind::LBrace | TokenKind::Star))
            || (self.check_word("type")
                && self.peek_kind(1) == Some(TokenKind::Identifier)
                && self.peek_token(2).is_some_and(|t| t.is_word("from")));
        if type_only {
            self.advance();
        }

        let mut specifiers = Vec::new();

        // import "module"
        if self.check(&TokenKind::StringLiteral) {
            let source = self.parse_module_specifier()?;
            self.consume_semicolon()?;
            return Ok(ImportDecl {
                specifiers,
                source,
                type_only,
            });
        }

        // import defaultName from "module" / import x = require("module")
        if self.check(&TokenKind::Identifier) {
            let name = self.parse_identifier()?;

            if self.eat(TokenKind::Eq) {
                return self.parse_import_equals(name);
            }

            specifiers.push(ImportSpecifier::Default(name));
            if !self.eat(TokenKind::Comma) {
                self.consume_word("from")?;
                let source = self.parse_module_specifier()?;
                self.consume_semicolon()?;
                return Ok(ImportDecl {
                    specifiers,
                    source,
                    type_only,
                });
            }
        }

        if self.eat(TokenKind::Star) {
            // import * as name from "module"
            self.consume_word("as")?;
            let name = self.parse_identifier()?;
            specifiers.push(ImportSpecifier::Namespace(name));
        } else {
            // import { a, b as c } from "module"
            self.consume(TokenKind::LBrace)?;

            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = self.check_word("type")
                    && matches!(self.peek_kind(1), Some(TokenKind::Identifier))
                    && !self.peek_token(1).is_some_and(|t| t.text == "as");
                if spec_type_only {
                    self.advance();
                }

                let imported = self.parse_identifier_name()?;
                let local = if self.eat_word("as") {
                    Some(self.parse_identifier()?)
                } else {
                    None
                };

                specifiers.push(ImportSpecifier::Named {
                    imported,
                    local,
                    type_only: spec_type_only,
                });

                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }

            self.consume(TokenKind::RBrace)?;
        }

        self.consume_word("from")?;
        let source = self.parse_module_specifier()?;
        self.consume_semicolon()?;

        Ok(ImportDecl {
            specifiers,
            source,
            type_only,
        })
    }

    /// `import x = require("m");` binds the whole module like a namespace import.
    fn parse_import_equals(&mut self, name: Node<Ident>) -> ParseResult<ImportDecl> {
        self.consume_word("require")?;
        self.consume(TokenKind::LParen)?;
        let source = self.parse_module_specifier()?;
        self.consume(TokenKind::RParen)?;
        self.consume_semicolon()?;

        Ok(ImportDecl {
            specifiers: vec![ImportSpecifier::Namespace(name)],
            source,
            type_only: false,
        })
    }

    pub(crate) fn parse_export_decl(&mut self) -> ParseResult<ExportDecl> {
        self.consume(TokenKind::Export)?;

        // export = expr
        if self.eat(TokenKind::Eq) {
            let expr = self.parse_assignment_expr()?;
            self.consume_semicolon()?;
            return Ok(ExportDecl::Assign(expr));
        }

        // export as namespace Name; (UMD global in declaration files)
        if self.check_word("as") && self.peek_token(1).is_some_and(|t| t.is_word("namespace")) {
            self.advance();
            self.advance();
            self.parse_identifier()?;
            self.consume_semicolon()?;
            return Ok(ExportDecl::Named {
                specifiers: vec![],
                source: None,
                type_only: true,
            });
        }

        // export default
        if self.eat(TokenKind::Default) {
            if self.check(&TokenKind::Function)
                || self.check(&TokenKind::Class)
                || self.check(&TokenKind::At)
                || (self.check_word("abstract") && self.peek_kind(1) == Some(TokenKind::Class))
                || (self.check_word("async") && self.peek_kind(1) == Some(TokenKind::Function))
                || (self.check_word("interface") && self.peek_kind(1) == Some(TokenKind::Identifier))
            {
                self.anonymous_default = true;
                let decl = self.parse_declaration();
                self.anonymous_default = false;
                return Ok(ExportDecl::DefaultDecl(Box::new(decl?)));
            }
            let expr = self.parse_assignment_expr()?;
            self.consume_semicolon()?;
            return Ok(ExportDecl::Default(expr));
        }

        // export * from "module"
        if self.eat(TokenKind::Star) {
            let as_name = if self.eat_word("as") {
                Some(self.parse_identifier_name()?)
            } else {
                None
            };

            self.consume_word("from")?;
            let source = self.parse_module_specifier()?;
            self.consume_semicolon()?;

            return Ok(ExportDecl::All { source, as_name });
        }

        // export type { ... }
        let type_only = self.check_word("type") && self.peek_kind(1) == Some(TokenKind::LBrace);
        if type_only {
            self.advance();
        }

        // export { ... }
        if self.eat(TokenKind::LBrace) {
            let mut specifiers = Vec::new();

            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                let spec_type_only = self.check_word("type")
                    && matches!(self.peek_kind(1), Some(TokenKind::Identifier))
                    && !self.peek_token(1).is_some_and(|t| t.text == "as");
                if spec_type_only {
                    self.advance();
                }

                let local = self.parse_identifier_name()?;
                let exported = if self.eat_word("as") {
                    Some(self.parse_identifier_name()?)
                } else {
                    None
                };

                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    type_only: spec_type_only,
                });

                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }

            self.consume(TokenKind::RBrace)?;

            let source = if self.eat_word("from") {
                Some(self.parse_module_specifier()?)
            } else {
                None
            };

            self.consume_semicolon()?;

            return Ok(ExportDecl::Named {
                specifiers,
                source,
                type_only,
            });
        }

        // export declaration
        if !self.is_declaration_start()
            && !matches!(
                self.current_token().kind,
                TokenKind::Var | TokenKind::Let | TokenKind::Const
            )
        {
            return Err(self.error(1128, "Declaration or statement expected."));
        }
        let decl = self.parse_declaration()?;
        Ok(ExportDecl::Decl(Box::new(decl)))
    }
}
