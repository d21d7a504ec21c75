//! Statement lowering and destructuring expansion

use keel_ast::*;

use crate::emitter::Emitter;
use crate::error::EmitErrorKind;
use crate::helpers::{quote, Helper};

/// `(name, value)` declarator pairs produced by destructuring expansion
type Declarators = Vec<(String, String)>;

impl Emitter {
    pub(crate) fn emit_stmts(&mut self, stmts: &[Node<Stmt>]) {
        for stmt in stmts {
            self.emit_stmt(stmt);
        }
    }

    pub(crate) fn emit_stmt(&mut self, stmt: &Node<Stmt>) {
        match &stmt.value {
            Stmt::Expr(expr) => {
                let text = self.expr(expr);
                self.out.line(&format!("{text};"));
            }
            Stmt::VarDecl(var) => {
                if let Some(text) = self.var_decl_text(var) {
                    self.out.line(&format!("{text};"));
                }
            }
            Stmt::Decl(decl) => self.emit_decl(decl, false),
            Stmt::Return(None) => self.out.line("return;"),
            Stmt::Return(Some(value)) => {
                let text = self.expr(value);
                self.out.line(&format!("return {text};"));
            }
            Stmt::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                let condition = self.expr(condition);
                self.emit_embedded(&format!("if ({condition})"), then_stmt);
                if let Some(else_stmt) = else_stmt {
                    if let Stmt::If { .. } = else_stmt.value {
                        self.out.set_prefix("else ".to_string());
                        self.emit_stmt(else_stmt);
                    } else {
                        self.emit_embedded("else", else_stmt);
                    }
                }
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::VarDecl(var)) => self.var_decl_text(var).unwrap_or_default(),
                    Some(ForInit::Expr(expr)) => self.expr(expr),
                    None => String::new(),
                };
                let condition = match condition {
                    Some(condition) => format!(" {}", self.expr(condition)),
                    None => String::new(),
                };
                let update = match update {
                    Some(update) => format!(" {}", self.expr(update)),
                    None => String::new(),
                };
                self.emit_embedded(&format!("for ({init};{condition};{update})"), body);
            }
            Stmt::ForIn { left, right, body } => {
                let left = self.for_left_text(left);
                let right = self.expr(right);
                self.emit_embedded(&format!("for ({left} in {right})"), body);
            }
            Stmt::ForOf { left, right, body } => {
                if self.downlevel() {
                    self.emit_for_of_es5(left, right, body);
                } else {
                    let left = self.for_left_text(left);
                    let right = self.expr(right);
                    self.emit_embedded(&format!("for ({left} of {right})"), body);
                }
            }
            Stmt::While { condition, body } => {
                let condition = self.expr(condition);
                self.emit_embedded(&format!("while ({condition})"), body);
            }
            Stmt::DoWhile { body, condition } => {
                let condition = self.expr(condition);
                match &body.value {
                    Stmt::Block(block) => {
                        self.out.line("do {");
                        self.emit_block_body(&block.stmts);
                        self.out.line(&format!("}} while ({condition});"));
                    }
                    _ => {
                        self.out.line("do");
                        self.out.indent();
                        self.emit_stmt(body);
                        self.out.dedent();
                        self.out.line(&format!("while ({condition});"));
                    }
                }
            }
            Stmt::Block(block) => {
                self.out.line("{");
                self.emit_block_body(&block.stmts);
                self.out.line("}");
            }
            Stmt::Break(label) => match label {
                Some(label) => self.out.line(&format!("break {};", label.value.name)),
                None => self.out.line("break;"),
            },
            Stmt::Continue(label) => match label {
                Some(label) => self.out.line(&format!("continue {};", label.value.name)),
                None => self.out.line("continue;"),
            },
            Stmt::Throw(expr) => {
                let text = self.expr(expr);
                self.out.line(&format!("throw {text};"));
            }
            Stmt::Try {
                block,
                catch,
                finally,
            } => {
                self.out.line("try {");
                self.emit_block_body(&block.value.stmts);
                self.out.line("}");
                if let Some(catch) = catch {
                    let param = match &catch.param {
                        Some(param) => self.pattern_text(&param.value),
                        None if self.downlevel() => self.unique_temp(),
                        None => String::new(),
                    };
                    if param.is_empty() {
                        self.out.line("catch {");
                    } else {
                        self.out.line(&format!("catch ({param}) {{"));
                    }
                    self.emit_block_body(&catch.body.value.stmts);
                    self.out.line("}");
                }
                if let Some(finally) = finally {
                    self.out.line("finally {");
                    self.emit_block_body(&finally.value.stmts);
                    self.out.line("}");
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
            } => {
                let discriminant = self.expr(discriminant);
                self.out.line(&format!("switch ({discriminant}) {{"));
                self.out.indent();
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            let test = self.expr(test);
                            self.out.line(&format!("case {test}:"));
                        }
                        None => self.out.line("default:"),
                    }
                    self.emit_block_body(&case.consequent);
                }
                self.out.dedent();
                self.out.line("}");
            }
            Stmt::Labeled { label, stmt } => {
                self.out.set_prefix(format!("{}: ", label.value.name));
                self.emit_stmt(stmt);
            }
            Stmt::Empty => self.out.line(";"),
            Stmt::Debugger => self.out.line("debugger;"),
        }
    }

    fn emit_block_body(&mut self, stmts: &[Node<Stmt>]) {
        self.out.indent();
        self.emit_stmts(stmts);
        self.out.dedent();
    }

    /// Statement head followed by a block or an indented single statement
    fn emit_embedded(&mut self, head: &str, body: &Node<Stmt>) {
        match &body.value {
            Stmt::Block(block) => {
                self.out.line(&format!("{head} {{"));
                self.emit_block_body(&block.stmts);
                self.out.line("}");
            }
            _ => {
                self.out.line(head);
                self.out.indent();
                self.emit_stmt(body);
                self.out.dedent();
            }
        }
    }

    fn for_left_text(&mut self, left: &ForInLeft) -> String {
        match left {
            ForInLeft::VarDecl(var) => self.var_decl_text(var).unwrap_or_default(),
            ForInLeft::Pattern(pattern) => match &pattern.value {
                Pattern::Ident { name, .. } => self.ident_text(&name.value.name),
                other => self.pattern_text(other),
            },
        }
    }

    /// `for (var _i = 0, xs_1 = xs; _i < xs_1.length; _i++)`
    fn emit_for_of_es5(&mut self, left: &ForInLeft, right: &Node<Expr>, body: &Node<Stmt>) {
        let counter = self.unique_counter();
        let source = self.expr(right);
        let array = match right.value.unwrap_transparent() {
            Expr::Ident(ident) => self.unique_name(&ident.name),
            _ => self.unique_temp(),
        };
        self.out.line(&format!(
            "for (var {counter} = 0, {array} = {source}; {counter} < {array}.length; {counter}++) {{"
        ));
        self.out.indent();

        let element = format!("{array}[{counter}]");
        match left {
            ForInLeft::VarDecl(var) => {
                if let Some(declarator) = var.declarations.first() {
                    match &declarator.pattern.value {
                        Pattern::Ident { name, .. } => {
                            self.out.line(&format!("var {} = {element};", name.value.name));
                        }
                        pattern => {
                            if let Some(text) = self.destructure_decl(pattern, declarator.pattern.span, element) {
                                self.out.line(&format!("{text};"));
                            }
                        }
                    }
                }
            }
            ForInLeft::Pattern(pattern) => match &pattern.value {
                Pattern::Ident { name, .. } => {
                    let target = self.ident_text(&name.value.name);
                    self.out.line(&format!("{target} = {element};"));
                }
                other if is_nested(other) => {
                    self.report(EmitErrorKind::NestedDestructuring, pattern.span);
                    let text = self.pattern_text(other);
                    self.out.line(&format!("{text} = {element};"));
                }
                other => {
                    let mut pairs = Declarators::new();
                    self.expand_pattern(other, element, true, &mut pairs);
                    let bound = other.bound_names();
                    let mut assignments = Vec::new();
                    for (name, value) in pairs {
                        if !bound.contains(&name.as_str()) {
                            self.hoist(name.clone());
                        }
                        let target = self.ident_text(&name);
                        assignments.push(format!("{target} = {value}"));
                    }
                    self.out.line(&format!("{};", assignments.join(", ")));
                }
            },
        }

        match &body.value {
            Stmt::Block(block) => self.emit_stmts(&block.stmts),
            _ => self.emit_stmt(body),
        }
        self.out.dedent();
        self.out.line("}");
    }

    // =========================================================================
    // Variable declarations
    // =========================================================================

    /// Declaration text without the trailing semicolon; `None` for ambient
    /// declarations.
    pub(crate) fn var_decl_text(&mut self, var: &VarDecl) -> Option<String> {
        if var.is_declare {
            return None;
        }
        let keyword = if self.downlevel() {
            "var".to_string()
        } else {
            var.kind.to_string()
        };

        let mut parts = Vec::new();
        for declarator in &var.declarations {
            let init = declarator.init.as_ref().map(|init| self.expr(init));
            match &declarator.pattern.value {
                Pattern::Ident { name, .. } => parts.push(match init {
                    Some(init) => format!("{} = {init}", name.value.name),
                    None => name.value.name.clone(),
                }),
                pattern if self.downlevel() && !is_nested(pattern) => {
                    let reusable = declarator
                        .init
                        .as_ref()
                        .is_some_and(|init| matches!(init.value.unwrap_transparent(), Expr::Ident(_) | Expr::This));
                    let mut pairs = Declarators::new();
                    self.expand_pattern(pattern, init.unwrap_or_else(|| "void 0".to_string()), reusable, &mut pairs);
                    parts.extend(pairs.into_iter().map(|(name, value)| format!("{name} = {value}")));
                }
                pattern => {
                    if self.downlevel() {
                        self.report(EmitErrorKind::NestedDestructuring, declarator.pattern.span);
                    }
                    let text = self.pattern_text(pattern);
                    parts.push(match init {
                        Some(init) => format!("{text} = {init}"),
                        None => text,
                    });
                }
            }
        }
        Some(format!("{keyword} {}", parts.join(", ")))
    }

    /// `var a = source.a, b = source.b` for a parameter or loop variable
    /// pattern.
    pub(crate) fn destructure_decl(&mut self, pattern: &Pattern, span: Span, source: String) -> Option<String> {
        if is_nested(pattern) {
            self.report(EmitErrorKind::NestedDestructuring, span);
            let text = self.pattern_text(pattern);
            return Some(format!("var {text} = {source}"));
        }
        let mut pairs = Declarators::new();
        self.expand_pattern(pattern, source, true, &mut pairs);
        if pairs.is_empty() {
            return None;
        }
        let declarators: Vec<String> = pairs
            .into_iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect();
        Some(format!("var {}", declarators.join(", ")))
    }

    /// Flattens a one-level pattern into declarators reading from `source`.
    /// A source that is not `reusable` is first stored in a temporary.
    pub(crate) fn expand_pattern(&mut self, pattern: &Pattern, source: String, reusable: bool, out: &mut Declarators) {
        match pattern {
            Pattern::Ident { name, .. } => out.push((name.value.name.clone(), source)),
            Pattern::Assignment { pattern, default } => {
                let temp = self.unique_temp();
                out.push((temp.clone(), source));
                let value = self.expr(default);
                self.expand_pattern(&pattern.value, format!("{temp} === void 0 ? {value} : {temp}"), false, out);
            }
            Pattern::Object { properties, rest } => {
                let reads = properties.len() + usize::from(rest.is_some());
                let base = self.reusable_source(source, reusable || reads == 1, out);
                for prop in properties {
                    let access = self.member_slot(&base, &prop.key);
                    self.expand_pattern(&prop.value.value, access, false, out);
                }
                if let Some(rest) = rest {
                    self.helpers.insert(Helper::Rest);
                    let keys: Vec<String> = properties
                        .iter()
                        .filter_map(|prop| prop.key.static_name())
                        .map(|key| quote(&key))
                        .collect();
                    self.expand_pattern(&rest.value, format!("__rest({base}, [{}])", keys.join(", ")), false, out);
                }
            }
            Pattern::Array { elements, rest } => {
                let reads = elements.iter().flatten().count() + usize::from(rest.is_some());
                let base = self.reusable_source(source, reusable || reads == 1, out);
                for (index, element) in elements.iter().enumerate() {
                    if let Some(element) = element {
                        self.expand_pattern(&element.value, format!("{base}[{index}]"), false, out);
                    }
                }
                if let Some(rest) = rest {
                    self.expand_pattern(&rest.value, format!("{base}.slice({})", elements.len()), false, out);
                }
            }
        }
    }

    fn reusable_source(&mut self, source: String, reusable: bool, out: &mut Declarators) -> String {
        if reusable {
            source
        } else {
            let temp = self.unique_temp();
            out.push((temp.clone(), source));
            temp
        }
    }

    /// Pattern in ES2015 syntax, types erased
    pub(crate) fn pattern_text(&mut self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::Ident { name, .. } => name.value.name.clone(),
            Pattern::Array { elements, rest } => {
                let mut parts: Vec<String> = elements
                    .iter()
                    .map(|element| match element {
                        Some(element) => self.pattern_text(&element.value),
                        None => String::new(),
                    })
                    .collect();
                if let Some(rest) = rest {
                    parts.push(format!("...{}", self.pattern_text(&rest.value)));
                }
                format!("[{}]", parts.join(", "))
            }
            Pattern::Object { properties, rest } => {
                let mut parts = Vec::new();
                for prop in properties {
                    let value = self.pattern_text(&prop.value.value);
                    if prop.shorthand {
                        parts.push(value);
                    } else {
                        let key = self.property_key(&prop.key);
                        parts.push(format!("{key}: {value}"));
                    }
                }
                if let Some(rest) = rest {
                    parts.push(format!("...{}", self.pattern_text(&rest.value)));
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            Pattern::Assignment { pattern, default } => {
                let target = self.pattern_text(&pattern.value);
                let value = self.expr(default);
                format!("{target} = {value}")
            }
        }
    }
}

/// A pattern containing another object or array pattern
pub(crate) fn is_nested(pattern: &Pattern) -> bool {
    fn is_pattern(pattern: &Pattern) -> bool {
        let inner = match pattern {
            Pattern::Assignment { pattern, .. } => &pattern.value,
            other => other,
        };
        matches!(inner, Pattern::Object { .. } | Pattern::Array { .. })
    }
    match pattern {
        Pattern::Object { properties, rest } => {
            properties.iter().any(|prop| is_pattern(&prop.value.value))
                || rest.as_ref().is_some_and(|rest| is_pattern(&rest.value))
        }
        Pattern::Array { elements, rest } => {
            elements.iter().flatten().any(|element| is_pattern(&element.value))
                || rest.as_ref().is_some_and(|rest| is_pattern(&rest.value))
        }
        Pattern::Assignment { pattern, .. } => is_nested(&pattern.value),
        Pattern::Ident { .. } => false,
    }
}
