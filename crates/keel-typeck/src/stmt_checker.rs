//! Statement checking methods

use keel_ast::{
    ForInLeft, ForInit, Node, Pattern, PropertyName, Span, Stmt, SwitchCase, VarDecl, VarDeclKind,
};

use crate::checker::{collect_block_hoisted, pattern_idents, Hoisted, TypeChecker};
use crate::decl_checker::property_type;
use crate::env::{Symbol, SymbolKind};
use crate::error::TypeErrorKind;
use crate::helpers::TypeHelpers;
use crate::types::Type;

impl TypeChecker {
    pub(crate) fn check_stmts(&mut self, stmts: &[Node<Stmt>]) {
        for stmt in stmts {
            self.check_stmt(&stmt.value, stmt.span);
        }
    }

    pub(crate) fn check_stmt(&mut self, stmt: &Stmt, span: Span) {
        match stmt {
            Stmt::Expr(expr) => {
                self.check_expr(expr);
            }
            Stmt::VarDecl(var_decl) => self.check_var_decl(var_decl),
            Stmt::Decl(decl) => self.check_decl(&decl.value),
            Stmt::Return(value) => self.check_return(value.as_ref(), span),
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                self.check_expr(condition);
                self.check_stmt(&then_stmt.value, then_stmt.span);
                if let Some(else_stmt) = else_stmt {
                    self.check_stmt(&else_stmt.value, else_stmt.span);
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => self.check_for(init.as_ref(), condition.as_ref(), update.as_ref(), body),
            Stmt::ForIn { left, right, body } => {
                self.check_expr(right);
                self.check_for_each(left, Type::String, body);
            }
            Stmt::ForOf { left, right, body } => {
                let iterated = self.check_expr(right);
                let element = match iterated {
                    Type::Array(elem) => *elem,
                    Type::Tuple(elems) => Type::union(elems),
                    Type::String | Type::Literal(crate::types::LiteralType::String(_)) => Type::String,
                    _ => Type::Any,
                };
                self.check_for_each(left, element, body);
            }
            Stmt::While { condition, body } | Stmt::DoWhile { body, condition } => {
                self.check_expr(condition);
                self.check_stmt(&body.value, body.span);
            }
            Stmt::Block(block) => self.check_block(&block.stmts),
            Stmt::Throw(expr) => {
                self.check_expr(expr);
            }
            Stmt::Try {
                block,
                catch,
                finally,
            } => {
                self.check_block(&block.value.stmts);
                if let Some(catch) = catch {
                    self.env.push_scope();
                    if let Some(param) = &catch.param {
                        self.bind_pattern(&param.value, Type::Any, Some(SymbolKind::Let));
                    }
                    self.hoist_block(&catch.body.value.stmts);
                    self.check_stmts(&catch.body.value.stmts);
                    self.env.pop_scope();
                }
                if let Some(finally) = finally {
                    self.check_block(&finally.value.stmts);
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => self.check_switch(discriminant, cases),
            Stmt::Labeled { stmt, .. } => self.check_stmt(&stmt.value, stmt.span),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty | Stmt::Debugger => {}
        }
    }

    pub(crate) fn check_var_decl(&mut self, var_decl: &VarDecl) {
        for declarator in &var_decl.declarations {
            let pattern = &declarator.pattern.value;
            let annotation = pattern.type_annotation().map(|ty| self.resolve_type(ty));
            let init = declarator
                .init
                .as_ref()
                .map(|init| (init, self.check_expr(init)));

            let ty = match (annotation, init) {
                (Some(target), Some((init, source))) => {
                    if !TypeHelpers::is_assignable(&source, &target) {
                        let span = pattern
                            .as_ident()
                            .map_or(declarator.pattern.span, |ident| ident.span);
                        self.report_not_assignable(&source, &target, &init.value, span);
                    }
                    target
                }
                (Some(target), None) => target,
                (None, Some((_, source))) if var_decl.kind == VarDeclKind::Const => source,
                (None, Some((_, source))) => source.widen(),
                (None, None) => Type::Any,
            };
            self.bind_pattern(pattern, ty, None);
        }
    }

    /// Binds the names of `pattern`. With `declare` set the names are new
    /// symbols of that kind; otherwise the hoisted symbols get their types.
    pub(crate) fn bind_pattern(&mut self, pattern: &Pattern, ty: Type, declare: Option<SymbolKind>) {
        match pattern {
            Pattern::Ident { name, .. } => {
                let name = &name.value.name;
                match declare {
                    Some(_) if name == "this" => {}
                    Some(kind) => self.env.declare(name.clone(), Symbol::value(kind, ty)),
                    None => self.env.set_value(name, ty),
                }
            }
            Pattern::Assignment { pattern, default } => {
                let default_type = self.check_expr(default);
                let ty = if ty == Type::Any { default_type.widen() } else { ty };
                self.bind_pattern(&pattern.value, ty, declare);
            }
            Pattern::Object { properties, rest } => {
                for prop in properties {
                    if let PropertyName::Computed(key) = &prop.key {
                        self.check_expr(key);
                    }
                    let member = prop
                        .key
                        .static_name()
                        .and_then(|key| property_type(&ty, &key))
                        .unwrap_or(Type::Any);
                    self.bind_pattern(&prop.value.value, member, declare);
                }
                if let Some(rest) = rest {
                    self.bind_pattern(&rest.value, Type::Any, declare);
                }
            }
            Pattern::Array { elements, rest } => {
                let element = match &ty {
                    Type::Array(elem) => (**elem).clone(),
                    _ => Type::Any,
                };
                for (index, elem) in elements.iter().enumerate() {
                    let Some(elem) = elem else {
                        continue;
                    };
                    let elem_type = match &ty {
                        Type::Tuple(elems) => elems.get(index).cloned().unwrap_or(Type::Any),
                        _ => element.clone(),
                    };
                    self.bind_pattern(&elem.value, elem_type, declare);
                }
                if let Some(rest) = rest {
                    self.bind_pattern(&rest.value, Type::Array(Box::new(element)), declare);
                }
            }
        }
    }

    fn check_return(&mut self, value: Option<&Node<keel_ast::Expr>>, span: Span) {
        let Some(value) = value else {
            return;
        };
        let actual = self.check_expr(value);
        let Some(expected) = self.current_return_type.clone() else {
            return;
        };
        if !TypeHelpers::is_assignable(&actual, &expected) {
            self.report_not_assignable(&actual, &expected, &value.value, span);
        }
    }

    fn check_block(&mut self, stmts: &[Node<Stmt>]) {
        self.env.push_scope();
        self.hoist_block(stmts);
        self.check_stmts(stmts);
        self.env.pop_scope();
    }

    fn hoist_block(&mut self, stmts: &[Node<Stmt>]) {
        let mut hoisted = Vec::new();
        collect_block_hoisted(stmts, &mut hoisted);
        self.hoist(&hoisted);
    }

    fn check_for(
        &mut self,
        init: Option<&ForInit>,
        condition: Option<&Node<keel_ast::Expr>>,
        update: Option<&Node<keel_ast::Expr>>,
        body: &Node<Stmt>,
    ) {
        // `let` and `const` in the head get a scope of their own
        let scoped = match init {
            Some(ForInit::VarDecl(var_decl)) if var_decl.kind.is_block_scoped() => Some(var_decl),
            _ => None,
        };
        if let Some(var_decl) = scoped {
            self.env.push_scope();
            self.hoist(&[Hoisted::Var(var_decl)]);
        }

        match init {
            Some(ForInit::VarDecl(var_decl)) => self.check_var_decl(var_decl),
            Some(ForInit::Expr(expr)) => {
                self.check_expr(expr);
            }
            None => {}
        }
        if let Some(condition) = condition {
            self.check_expr(condition);
        }
        if let Some(update) = update {
            self.check_expr(update);
        }
        self.check_stmt(&body.value, body.span);

        if scoped.is_some() {
            self.env.pop_scope();
        }
    }

    fn check_for_each(&mut self, left: &ForInLeft, element: Type, body: &Node<Stmt>) {
        match left {
            ForInLeft::VarDecl(var_decl) => {
                let scoped = var_decl.kind.is_block_scoped();
                if scoped {
                    self.env.push_scope();
                    self.hoist(&[Hoisted::Var(var_decl)]);
                }
                for declarator in &var_decl.declarations {
                    self.bind_pattern(&declarator.pattern.value, element.clone(), None);
                }
                self.check_stmt(&body.value, body.span);
                if scoped {
                    self.env.pop_scope();
                }
            }
            ForInLeft::Pattern(pattern) => {
                let mut idents = Vec::new();
                pattern_idents(&pattern.value, &mut idents);
                for ident in idents {
                    if self.env.lookup(&ident.value.name).is_none() {
                        self.report(TypeErrorKind::CannotFindName(ident.value.name.clone()), ident.span);
                    }
                }
                self.check_stmt(&body.value, body.span);
            }
        }
    }

    fn check_switch(&mut self, discriminant: &Node<keel_ast::Expr>, cases: &[SwitchCase]) {
        self.check_expr(discriminant);

        // All cases share one block scope
        self.env.push_scope();
        let mut hoisted = Vec::new();
        for case in cases {
            collect_block_hoisted(&case.consequent, &mut hoisted);
        }
        self.hoist(&hoisted);
        for case in cases {
            if let Some(test) = &case.test {
                self.check_expr(test);
            }
            self.check_stmts(&case.consequent);
        }
        self.env.pop_scope();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::codes;

    #[test]
    fn test_block_scoping() {
        let source = "let a = 1;\n{ let a = 'x'; a = 'y'; }\na = 2;\n";
        assert_eq!(codes(source), Vec::<u32>::new());

        let source = "for (let i = 0; i < 3; i++) {}\ni;\n";
        assert_eq!(codes(source), vec![2304]);
    }

    #[test]
    fn test_var_is_function_scoped() {
        let source = "function f() {\n    if (true) { var x = 1; }\n    return x;\n}\n";
        assert_eq!(codes(source), Vec::<u32>::new());
    }

    #[test]
    fn test_return_type_mismatch() {
        let source = "function f(): number {\n    return 'no';\n}\n";
        assert_eq!(codes(source), vec![2322]);

        let source = "async function f(): Promise<number> {\n    return 1;\n}\n";
        assert_eq!(codes(source), Vec::<u32>::new());
    }

    #[test]
    fn test_for_of_element_type() {
        let source = "const xs: string[] = [];\nfor (const x of xs) {\n    const n: number = x;\n}\n";
        assert_eq!(codes(source), vec![2322]);
    }

    #[test]
    fn test_destructuring_types() {
        let source = "const p = { x: 1, y: 'a' };\nconst { x, y } = p;\nconst s: string = x;\n";
        assert_eq!(codes(source), vec![2322]);
    }
}
