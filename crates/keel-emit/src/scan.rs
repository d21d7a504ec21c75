//! Pre-pass collecting the identifiers a file uses.
//!
//! `references` holds names read in value positions; imports whose bindings
//! never appear there are erased. `names` is every identifier in the file,
//! which generated temporaries must avoid.

use std::collections::HashSet;

use keel_ast::*;

#[derive(Debug, Default)]
pub(crate) struct NameScan {
    pub(crate) references: HashSet<String>,
    pub(crate) names: HashSet<String>,
}

pub(crate) fn scan_program(program: &Program) -> NameScan {
    let mut scan = NameScan::default();
    scan.items(&program.items);
    scan
}

impl NameScan {
    fn reference(&mut self, name: &str) {
        self.references.insert(name.to_string());
        self.names.insert(name.to_string());
    }

    fn binding(&mut self, ident: &Node<Ident>) {
        self.names.insert(ident.value.name.clone());
    }

    fn items(&mut self, items: &[Node<ModuleItem>]) {
        for item in items {
            match &item.value {
                ModuleItem::Import(import) => {
                    for specifier in &import.specifiers {
                        self.binding(specifier.local_name());
                    }
                }
                ModuleItem::Export(export) => self.export(export),
                ModuleItem::Stmt(stmt) => self.stmt(&stmt.value),
                ModuleItem::Decl(decl) => self.decl(&decl.value),
            }
        }
    }

    fn export(&mut self, export: &ExportDecl) {
        match export {
            ExportDecl::Named {
                specifiers,
                source,
                type_only,
            } => {
                if source.is_none() && !type_only {
                    for specifier in specifiers.iter().filter(|s| !s.type_only) {
                        self.reference(&specifier.local.value.name);
                    }
                }
            }
            ExportDecl::Default(expr) | ExportDecl::Assign(expr) => self.expr(&expr.value),
            ExportDecl::DefaultDecl(decl) | ExportDecl::Decl(decl) => self.decl(&decl.value),
            ExportDecl::All { .. } => {}
        }
    }

    fn decl(&mut self, decl: &Decl) {
        if decl.is_type_only() {
            return;
        }
        match decl {
            Decl::Function(func) => {
                self.binding(&func.name);
                self.params(&func.params);
                if let Some(body) = &func.body {
                    self.stmts(&body.value.stmts);
                }
            }
            Decl::Class(class) => self.class(class),
            Decl::Enum(decl) => {
                self.binding(&decl.name);
                for member in &decl.members {
                    if let Some(init) = &member.init {
                        self.expr(&init.value);
                    }
                }
            }
            Decl::Module(module) => self.module(module),
            Decl::Var(var) => self.var_decl(var),
            Decl::Interface(_) | Decl::TypeAlias(_) => {}
        }
    }

    fn module(&mut self, module: &ModuleDecl) {
        if let ModuleName::Ident(name) = &module.name {
            self.binding(name);
        }
        match &module.body {
            ModuleBody::Block(items) => self.items(items),
            ModuleBody::Namespace(inner) => self.module(&inner.value),
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.binding(&class.name);
        self.exprs(&class.decorators);
        if let Some(extends) = &class.extends {
            self.expr(&extends.base.value);
        }
        for member in &class.members {
            self.exprs(member.value.decorators());
            if let Some(PropertyName::Computed(key)) = member.value.name() {
                self.expr(&key.value);
            }
            match &member.value {
                ClassMember::Constructor { params, body, .. } | ClassMember::Method { params, body, .. } => {
                    self.params(params);
                    if let Some(body) = body {
                        self.stmts(&body.value.stmts);
                    }
                }
                ClassMember::Property { init, .. } => {
                    if let Some(init) = init {
                        self.expr(&init.value);
                    }
                }
                ClassMember::Getter { body, .. } => {
                    if let Some(body) = body {
                        self.stmts(&body.value.stmts);
                    }
                }
                ClassMember::Setter { param, body, .. } => {
                    self.params(std::slice::from_ref(param));
                    if let Some(body) = body {
                        self.stmts(&body.value.stmts);
                    }
                }
                ClassMember::IndexSignature { .. } => {}
            }
        }
    }

    fn params(&mut self, params: &[Param]) {
        for param in params {
            self.exprs(&param.decorators);
            self.pattern(&param.pattern.value);
        }
    }

    fn pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Ident { name, .. } => self.binding(name),
            Pattern::Array { elements, rest } => {
                for element in elements.iter().flatten() {
                    self.pattern(&element.value);
                }
                if let Some(rest) = rest {
                    self.pattern(&rest.value);
                }
            }
            Pattern::Object { properties, rest } => {
                for prop in properties {
                    if let PropertyName::Computed(key) = &prop.key {
                        self.expr(&key.value);
                    }
                    self.pattern(&prop.value.value);
                }
                if let Some(rest) = rest {
                    self.pattern(&rest.value);
                }
            }
            Pattern::Assignment { pattern, default } => {
                self.pattern(&pattern.value);
                self.expr(&default.value);
            }
        }
    }

    fn var_decl(&mut self, var: &VarDecl) {
        if var.is_declare {
            return;
        }
        for declarator in &var.declarations {
            self.pattern(&declarator.pattern.value);
            if let Some(init) = &declarator.init {
                self.expr(&init.value);
            }
        }
    }

    fn stmts(&mut self, stmts: &[Node<Stmt>]) {
        for stmt in stmts {
            self.stmt(&stmt.value);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) | Stmt::Throw(expr) => self.expr(&expr.value),
            Stmt::VarDecl(var) => self.var_decl(var),
            Stmt::Decl(decl) => self.decl(&decl.value),
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.expr(&value.value);
                }
            }
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                self.expr(&condition.value);
                self.stmt(&then_stmt.value);
                if let Some(else_stmt) = else_stmt {
                    self.stmt(&else_stmt.value);
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                match init {
                    Some(ForInit::VarDecl(var)) => self.var_decl(var),
                    Some(ForInit::Expr(expr)) => self.expr(&expr.value),
                    None => {}
                }
                for expr in condition.iter().chain(update.iter()) {
                    self.expr(&expr.value);
                }
                self.stmt(&body.value);
            }
            Stmt::ForIn { left, right, body } | Stmt::ForOf { left, right, body } => {
                match left {
                    ForInLeft::VarDecl(var) => self.var_decl(var),
                    ForInLeft::Pattern(pattern) => {
                        for name in pattern.value.bound_names() {
                            self.reference(name);
                        }
                    }
                }
                self.expr(&right.value);
                self.stmt(&body.value);
            }
            Stmt::While { condition, body } | Stmt::DoWhile { body, condition } => {
                self.expr(&condition.value);
                self.stmt(&body.value);
            }
            Stmt::Block(block) => self.stmts(&block.stmts),
            Stmt::Try {
                block,
                catch,
                finally,
            } => {
                self.stmts(&block.value.stmts);
                if let Some(catch) = catch {
                    if let Some(param) = &catch.param {
                        self.pattern(&param.value);
                    }
                    self.stmts(&catch.body.value.stmts);
                }
                if let Some(finally) = finally {
                    self.stmts(&finally.value.stmts);
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                self.expr(&discriminant.value);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.expr(&test.value);
                    }
                    self.stmts(&case.consequent);
                }
            }
            Stmt::Labeled { stmt, .. } => self.stmt(&stmt.value),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty | Stmt::Debugger => {}
        }
    }

    fn exprs(&mut self, exprs: &[Node<Expr>]) {
        for expr in exprs {
            self.expr(&expr.value);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.reference(&ident.name),
            Expr::Literal(_) | Expr::This | Expr::Super | Expr::MetaProperty { .. } => {}
            Expr::Binary { left, right, .. } => {
                self.expr(&left.value);
                self.expr(&right.value);
            }
            Expr::Assignment { target, value, .. } => {
                self.expr(&target.value);
                self.expr(&value.value);
            }
            Expr::Unary { expr, .. }
            | Expr::Await(expr)
            | Expr::Paren(expr)
            | Expr::Spread(expr)
            | Expr::NonNullAssertion(expr)
            | Expr::TypeCast { expr, .. } => self.expr(&expr.value),
            Expr::Call { callee, args, .. }
            | Expr::New { callee, args, .. }
            | Expr::OptionalCall { callee, args } => {
                self.expr(&callee.value);
                self.exprs(args);
            }
            Expr::Member { object, .. } | Expr::OptionalMember { object, .. } => self.expr(&object.value),
            Expr::Index { object, index } | Expr::OptionalIndex { object, index } => {
                self.expr(&object.value);
                self.expr(&index.value);
            }
            Expr::Array(elements) => {
                for element in elements.iter().flatten() {
                    self.expr(&element.value);
                }
            }
            Expr::Object(properties) => {
                for prop in properties {
                    self.object_property(prop);
                }
            }
            Expr::Arrow { params, body, .. } => {
                self.params(params);
                match body {
                    ArrowBody::Expr(expr) => self.expr(&expr.value),
                    ArrowBody::Block(block) => self.stmts(&block.value.stmts),
                }
            }
            Expr::Function { name, params, body, .. } => {
                if let Some(name) = name {
                    self.binding(name);
                }
                self.params(params);
                self.stmts(&body.value.stmts);
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.expr(&condition.value);
                self.expr(&then_expr.value);
                self.expr(&else_expr.value);
            }
            Expr::Template { exprs, .. } => self.exprs(exprs),
            Expr::TaggedTemplate { tag, exprs, .. } => {
                self.expr(&tag.value);
                self.exprs(exprs);
            }
            Expr::Sequence(exprs) => self.exprs(exprs),
            Expr::Yield { argument, .. } => {
                if let Some(argument) = argument {
                    self.expr(&argument.value);
                }
            }
        }
    }

    fn object_property(&mut self, prop: &ObjectProperty) {
        match prop {
            ObjectProperty::Property { key, value, .. } => {
                if let PropertyName::Computed(key) = key {
                    self.expr(&key.value);
                }
                self.expr(&value.value);
            }
            ObjectProperty::Method { params, body, .. } => {
                self.params(params);
                self.stmts(&body.value.stmts);
            }
            ObjectProperty::Getter { body, .. } => self.stmts(&body.value.stmts),
            ObjectProperty::Setter { param, body, .. } => {
                self.params(std::slice::from_ref(param));
                self.stmts(&body.value.stmts);
            }
            ObjectProperty::Spread(expr) => self.expr(&expr.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_positions_are_not_references() {
        let source = "import { A, B, C } from './m';\nlet a: A = new B();\nfunction f(x: C) { return x; }\n";
        let (program, errors) = keel_parser::parse(source, 0);
        assert!(errors.is_empty());
        let scan = scan_program(&program);
        assert!(!scan.references.contains("A"));
        assert!(scan.references.contains("B"));
        assert!(!scan.references.contains("C"));
        assert!(scan.names.contains("x"));
    }
}
