//! Function, class, enum and namespace lowering

use std::collections::HashMap;

use keel_ast::*;

use crate::emitter::{Container, Emitter, FunctionScope};
use crate::error::EmitErrorKind;
use crate::helpers::{quote, Helper};
use crate::writer::CodeWriter;
use crate::ScriptTarget;

#[derive(Clone, Copy)]
pub(crate) enum FnBody<'a> {
    Block(&'a [Node<Stmt>]),
    Expr(&'a Node<Expr>),
}

#[derive(Clone, Copy)]
pub(crate) enum FnKind<'a> {
    Function,
    Arrow,
    Constructor(&'a ClassDecl),
}

/// Rendered pieces of a function
pub(crate) struct FunctionParts {
    pub(crate) params: String,
    /// Braced body, closing at the current indentation
    pub(crate) body: String,
    /// The bare expression of an expression-bodied arrow that needed no
    /// prologue
    pub(crate) expr_body: Option<String>,
}

impl Emitter {
    // =========================================================================
    // Functions
    // =========================================================================

    pub(crate) fn emit_function_decl(&mut self, func: &FunctionDecl, span: Span) {
        let Some(body) = &func.body else {
            return;
        };
        let name = &func.name.value.name;
        self.declare_once(name);
        let prefix = self.function_prefix(func.is_async, func.is_generator, span);
        let parts = self.function_parts(&func.params, FnBody::Block(&body.value.stmts), FnKind::Function);
        self.out.line(&format!("{prefix}{name}({}) {}", parts.params, parts.body));
    }

    /// `function `, `function* `, `async function `; reports what the
    /// target cannot run.
    pub(crate) fn function_prefix(&mut self, is_async: bool, is_generator: bool, span: Span) -> String {
        self.check_function_flags(is_async, is_generator, span);
        let star = if is_generator { "* " } else { " " };
        let keyword = format!("function{star}");
        if is_async {
            format!("async {keyword}")
        } else {
            keyword
        }
    }

    pub(crate) fn check_function_flags(&mut self, is_async: bool, is_generator: bool, span: Span) {
        if !self.downlevel() {
            return;
        }
        if is_async {
            self.report(EmitErrorKind::AsyncFunction, span);
        }
        if is_generator {
            self.report(EmitErrorKind::Generator, span);
        }
    }

    /// Renders parameters and body inside a fresh function scope.
    pub(crate) fn function_parts(&mut self, params: &[Param], body: FnBody<'_>, kind: FnKind<'_>) -> FunctionParts {
        let is_arrow = matches!(kind, FnKind::Arrow);
        self.functions.push(FunctionScope {
            is_arrow: is_arrow && self.downlevel(),
            ..FunctionScope::default()
        });
        let saved_static = self.in_static;
        if let FnKind::Constructor(_) = kind {
            self.in_static = false;
        }
        self.push_bindings();
        for param in params {
            for name in param.pattern.value.bound_names() {
                self.shadow(name);
            }
        }
        if let FnBody::Block(stmts) = body {
            self.shadow_declarations(stmts);
        }

        let base = self.out.level();
        let new_line = self.out.new_line().to_string();
        let saved = std::mem::replace(&mut self.out, CodeWriter::new(&new_line, base + 1));

        let param_list = self.param_list(params);
        let mut expr_text = None;
        match (body, kind) {
            (FnBody::Block(stmts), FnKind::Constructor(class)) => self.emit_constructor_body(class, params, stmts),
            (FnBody::Block(stmts), _) => self.emit_stmts(stmts),
            (FnBody::Expr(expr), _) => expr_text = Some(self.expr(expr)),
        }

        let body_writer = std::mem::replace(&mut self.out, saved);
        let scope = self.functions.pop().unwrap_or_default();
        self.pop_bindings();
        self.in_static = saved_static;

        let mut prologue = CodeWriter::new(&new_line, base + 1);
        if scope.captures_this {
            prologue.line("var _this = this;");
        }
        if !scope.temps.is_empty() {
            prologue.line(&format!("var {};", scope.temps.join(", ")));
        }

        if let Some(text) = &expr_text {
            if prologue.is_empty() && body_writer.is_empty() {
                return FunctionParts {
                    params: param_list,
                    body: format!("{{ return {text}; }}"),
                    expr_body: expr_text,
                };
            }
        }

        let mut inner = prologue.finish();
        inner.push_str(&body_writer.finish());
        if let Some(text) = expr_text {
            inner.push_str(&format!("{}    return {text};{new_line}", self.out.indent_text()));
        }
        if inner.is_empty() {
            return FunctionParts {
                params: param_list,
                body: "{ }".to_string(),
                expr_body: None,
            };
        }
        FunctionParts {
            params: param_list,
            body: format!("{{{new_line}{inner}{}}}", self.out.indent_text()),
            expr_body: None,
        }
    }

    /// Parameter list text. Below ES2015 defaults, rest parameters and
    /// patterns turn into statements written at the top of the body.
    fn param_list(&mut self, params: &[Param]) -> String {
        let params: Vec<&Param> = params.iter().filter(|p| !is_this_param(p)).collect();
        if !self.downlevel() {
            return params
                .iter()
                .map(|param| {
                    let pattern = self.pattern_text(&param.pattern.value);
                    if param.is_rest {
                        format!("...{pattern}")
                    } else {
                        pattern
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
        }

        let mut names = Vec::new();
        for (index, param) in params.iter().enumerate() {
            let (pattern, default) = match &param.pattern.value {
                Pattern::Assignment { pattern, default } => (&pattern.value, Some(default)),
                pattern => (pattern, None),
            };
            let name = match pattern {
                Pattern::Ident { name, .. } => name.value.name.clone(),
                _ => self.unique_temp(),
            };

            if param.is_rest {
                self.emit_rest_collection(&name, index);
            } else {
                names.push(name.clone());
                if let Some(default) = default {
                    let value = self.expr(default);
                    self.out
                        .line(&format!("if ({name} === void 0) {{ {name} = {value}; }}"));
                }
            }

            if !matches!(pattern, Pattern::Ident { .. }) {
                if let Some(text) = self.destructure_decl(pattern, param.pattern.span, name) {
                    self.out.line(&format!("{text};"));
                }
            }
        }
        names.join(", ")
    }

    fn emit_rest_collection(&mut self, name: &str, index: usize) {
        let counter = self.unique_counter();
        self.out.line(&format!("var {name} = [];"));
        self.out.line(&format!(
            "for (var {counter} = {index}; {counter} < arguments.length; {counter}++) {{"
        ));
        self.out.indent();
        let slot = match index {
            0 => counter.clone(),
            _ => format!("{counter} - {index}"),
        };
        self.out.line(&format!("{name}[{slot}] = arguments[{counter}];"));
        self.out.dedent();
        self.out.line("}");
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn emit_class(&mut self, class: &ClassDecl) {
        if class.is_declare {
            return;
        }
        self.declare_once(&class.name.value.name);
        if self.downlevel() {
            self.emit_class_es5(class);
        } else {
            self.emit_class_es2015(class);
        }
    }

    fn emit_class_es5(&mut self, class: &ClassDecl) {
        let name = class.name.value.name.clone();
        let base = class.extends.as_ref().map(|extends| self.expr(&extends.base));

        let param = if base.is_some() { "_super" } else { "" };
        self.out.line(&format!("var {name} = (function ({param}) {{"));
        self.out.indent();
        if base.is_some() {
            self.helpers.insert(Helper::Extends);
            self.out.line(&format!("__extends({name}, _super);"));
        }

        let (params, body) = constructor_of(class);
        let parts = self.function_parts(params, FnBody::Block(body), FnKind::Constructor(class));
        self.out.line(&format!("function {name}({}) {}", parts.params, parts.body));

        let mut accessors_done = Vec::new();
        for member in &class.members {
            let saved_static = self.in_static;
            self.in_static = member.value.is_static();
            match &member.value {
                ClassMember::Method {
                    name: key,
                    params,
                    body: Some(body),
                    is_static,
                    is_async,
                    is_generator,
                    ..
                } => {
                    let target = member_target(&name, *is_static);
                    let slot = self.member_slot(&target, key);
                    let prefix = self.function_prefix(*is_async, *is_generator, member.span);
                    let parts = self.function_parts(params, FnBody::Block(&body.value.stmts), FnKind::Function);
                    self.out.line(&format!("{slot} = {prefix}({}) {};", parts.params, parts.body));
                }
                ClassMember::Getter { name: key, is_static, .. } | ClassMember::Setter { name: key, is_static, .. } => {
                    let Some(key_name) = key.static_name() else {
                        continue;
                    };
                    if accessors_done.contains(&(key_name.clone(), *is_static)) {
                        continue;
                    }
                    accessors_done.push((key_name.clone(), *is_static));
                    if self.target == ScriptTarget::Es3 {
                        self.report(EmitErrorKind::AccessorsBelowEs5, member.span);
                    }
                    self.emit_define_property(class, &name, &key_name, *is_static);
                }
                _ => {}
            }
            self.in_static = saved_static;
        }

        for member in &class.members {
            if let ClassMember::Property {
                name: key,
                init: Some(init),
                is_static: true,
                ..
            } = &member.value
            {
                self.in_static = true;
                let slot = self.member_slot(&name, key);
                let value = self.expr(init);
                self.out.line(&format!("{slot} = {value};"));
                self.in_static = false;
            }
        }

        self.emit_member_decorators(class, &name);
        self.emit_class_decorators(class, &name);
        self.out.line(&format!("return {name};"));
        self.out.dedent();
        self.out.line(&format!("}})({});", base.unwrap_or_default()));
    }

    fn emit_define_property(&mut self, class: &ClassDecl, class_name: &str, key: &str, is_static: bool) {
        let target = member_target(class_name, is_static);
        self.out.line(&format!("Object.defineProperty({target}, {}, {{", quote(key)));
        self.out.indent();
        for member in &class.members {
            if member.value.is_static() != is_static
                || member.value.name().and_then(PropertyName::static_name).as_deref() != Some(key)
            {
                continue;
            }
            match &member.value {
                ClassMember::Getter { body: Some(body), .. } => {
                    let parts = self.function_parts(&[], FnBody::Block(&body.value.stmts), FnKind::Function);
                    self.out.line(&format!("get: function () {},", parts.body));
                }
                ClassMember::Setter {
                    param, body: Some(body), ..
                } => {
                    let parts = self.function_parts(
                        std::slice::from_ref(param),
                        FnBody::Block(&body.value.stmts),
                        FnKind::Function,
                    );
                    self.out
                        .line(&format!("set: function ({}) {},", parts.params, parts.body));
                }
                _ => {}
            }
        }
        self.out.line("enumerable: true,");
        self.out.line("configurable: true");
        self.out.dedent();
        self.out.line("});");
    }

    fn emit_class_es2015(&mut self, class: &ClassDecl) {
        let name = class.name.value.name.clone();
        let heritage = match &class.extends {
            Some(extends) => format!(" extends {}", self.expr(&extends.base)),
            None => String::new(),
        };
        let decorated = !class.decorators.is_empty() || constructor_of(class).0.iter().any(|p| !p.decorators.is_empty());
        if decorated {
            self.out.line(&format!("let {name} = class {name}{heritage} {{"));
        } else {
            self.out.line(&format!("class {name}{heritage} {{"));
        }
        self.out.indent();

        let (params, body) = constructor_of(class);
        let has_instance_fields = class.members.iter().any(|m| {
            matches!(&m.value, ClassMember::Property { init: Some(_), is_static: false, .. })
        }) || params.iter().any(Param::is_parameter_property);
        if class.constructor().is_some() || has_instance_fields {
            let parts = self.function_parts(params, FnBody::Block(body), FnKind::Constructor(class));
            self.out.line(&format!("constructor({}) {}", parts.params, parts.body));
        }

        for member in &class.members {
            let saved_static = self.in_static;
            self.in_static = member.value.is_static();
            let modifier = if member.value.is_static() { "static " } else { "" };
            match &member.value {
                ClassMember::Method {
                    name: key,
                    params,
                    body: Some(body),
                    is_async,
                    is_generator,
                    ..
                } => {
                    let key = self.property_key(key);
                    let flags = match (*is_async, *is_generator) {
                        (true, true) => "async *",
                        (true, false) => "async ",
                        (false, true) => "*",
                        (false, false) => "",
                    };
                    let parts = self.function_parts(params, FnBody::Block(&body.value.stmts), FnKind::Function);
                    self.out
                        .line(&format!("{modifier}{flags}{key}({}) {}", parts.params, parts.body));
                }
                ClassMember::Getter {
                    name: key, body: Some(body), ..
                } => {
                    let key = self.property_key(key);
                    let parts = self.function_parts(&[], FnBody::Block(&body.value.stmts), FnKind::Function);
                    self.out.line(&format!("{modifier}get {key}() {}", parts.body));
                }
                ClassMember::Setter {
                    name: key,
                    param,
                    body: Some(body),
                    ..
                } => {
                    let key = self.property_key(key);
                    let parts = self.function_parts(
                        std::slice::from_ref(param),
                        FnBody::Block(&body.value.stmts),
                        FnKind::Function,
                    );
                    self.out
                        .line(&format!("{modifier}set {key}({}) {}", parts.params, parts.body));
                }
                _ => {}
            }
            self.in_static = saved_static;
        }
        self.out.dedent();
        self.out.line(if decorated { "};" } else { "}" });

        for member in &class.members {
            if let ClassMember::Property {
                name: key,
                init: Some(init),
                is_static: true,
                ..
            } = &member.value
            {
                let slot = self.member_slot(&name, key);
                let value = self.expr(init);
                self.out.line(&format!("{slot} = {value};"));
            }
        }
        self.emit_member_decorators(class, &name);
        self.emit_class_decorators(class, &name);
    }

    /// Constructor statements with parameter properties and instance field
    /// initializers placed after the `super` call.
    fn emit_constructor_body(&mut self, class: &ClassDecl, params: &[Param], stmts: &[Node<Stmt>]) {
        let derived = class.extends.is_some();
        let split = if derived {
            stmts.iter().position(|stmt| is_super_call(&stmt.value)).map_or(0, |i| i + 1)
        } else {
            0
        };
        let (before, after) = stmts.split_at(split);

        if derived && class.constructor().is_none() {
            if self.downlevel() {
                self.out.line("_super.apply(this, arguments);");
            } else {
                self.out.line("super(...arguments);");
            }
        }
        self.emit_stmts(before);

        for param in params.iter().filter(|p| p.is_parameter_property()) {
            if let Some(ident) = param.pattern.value.as_ident() {
                let this = self.this_name();
                let name = &ident.value.name;
                let target = self.member_text(this, name);
                self.out.line(&format!("{target} = {name};"));
            }
        }
        for member in &class.members {
            if let ClassMember::Property {
                name: key,
                init: Some(init),
                is_static: false,
                ..
            } = &member.value
            {
                let this = self.this_name();
                let slot = self.member_slot(this, key);
                let value = self.expr(init);
                self.out.line(&format!("{slot} = {value};"));
            }
        }
        self.emit_stmts(after);
    }

    /// `target.key` or `target[key]`
    pub(crate) fn member_slot(&mut self, target: &str, key: &PropertyName) -> String {
        match key {
            PropertyName::Ident(ident) => self.member_text(target, &ident.value.name),
            PropertyName::String(value) => format!("{target}[{}]", quote(value)),
            PropertyName::Number(value) => format!("{target}[{}]", format_number(*value)),
            PropertyName::Computed(expr) => format!("{target}[{}]", self.expr(expr)),
        }
    }

    fn emit_member_decorators(&mut self, class: &ClassDecl, name: &str) {
        for member in &class.members {
            let mut decorators: Vec<String> = member
                .value
                .decorators()
                .iter()
                .map(|d| self.nested(|e| e.expr(d)))
                .collect();
            if let ClassMember::Method { params, .. } = &member.value {
                decorators.extend(self.param_decorators(params));
            }
            if decorators.is_empty() {
                continue;
            }
            let Some(key) = member.value.name().and_then(PropertyName::static_name) else {
                continue;
            };
            let target = member_target(name, member.value.is_static());
            let descriptor = match member.value {
                ClassMember::Property { .. } => "void 0",
                _ => "null",
            };
            self.emit_decorate_call("", &decorators, &format!("{target}, {}, {descriptor}", quote(&key)));
        }
    }

    fn emit_class_decorators(&mut self, class: &ClassDecl, name: &str) {
        let mut decorators: Vec<String> = class
            .decorators
            .iter()
            .map(|d| self.nested(|e| e.expr(d)))
            .collect();
        decorators.extend(self.param_decorators(constructor_of(class).0));
        if !decorators.is_empty() {
            self.emit_decorate_call(&format!("{name} = "), &decorators, name);
        }
    }

    fn param_decorators(&mut self, params: &[Param]) -> Vec<String> {
        let mut out = Vec::new();
        for (index, param) in params.iter().filter(|p| !is_this_param(p)).enumerate() {
            for decorator in &param.decorators {
                self.helpers.insert(Helper::Param);
                let text = self.nested(|e| e.expr(decorator));
                out.push(format!("__param({index}, {text})"));
            }
        }
        out
    }

    fn emit_decorate_call(&mut self, assign: &str, decorators: &[String], arguments: &str) {
        self.helpers.insert(Helper::Decorate);
        self.out.line(&format!("{assign}__decorate(["));
        self.out.indent();
        for (index, decorator) in decorators.iter().enumerate() {
            let comma = if index + 1 < decorators.len() { "," } else { "" };
            self.out.line(&format!("{decorator}{comma}"));
        }
        self.out.dedent();
        self.out.line(&format!("], {arguments});"));
    }

    // =========================================================================
    // Enums and namespaces
    // =========================================================================

    /// `Name || (Name = {})`, attached to `object` when exported
    fn container_argument(name: &str, object: Option<&str>) -> String {
        match object {
            Some(object) => format!("{name} = {object}.{name} || ({object}.{name} = {{}})"),
            None => format!("{name} || ({name} = {{}})"),
        }
    }

    pub(crate) fn emit_enum(&mut self, decl: &EnumDecl, object: Option<String>) {
        if decl.is_declare {
            return;
        }
        let name = decl.name.value.name.clone();
        if self.declare_once(&name) {
            self.out.line(&format!("var {name};"));
        }
        self.out.line(&format!("(function ({name}) {{"));
        self.out.indent();

        self.push_bindings();
        for member in &decl.members {
            let member_name = &member.name.value.name;
            let text = format!("{name}.{member_name}");
            self.bind(member_name, text);
        }

        let mut known: HashMap<String, f64> = HashMap::new();
        let mut next = Some(0.0);
        let mut previous: Option<String> = None;
        for member in &decl.members {
            let member_name = member.name.value.name.clone();
            let key = quote(&member_name);
            let constant = match &member.init {
                Some(init) => enum_constant(&init.value, &name, &known),
                None => next,
            };
            match (constant, &member.init) {
                (Some(value), _) => {
                    known.insert(member_name.clone(), value);
                    next = Some(value + 1.0);
                    self.out.line(&format!(
                        "{name}[{name}[{key}] = {}] = {key};",
                        format_number(value)
                    ));
                }
                (None, Some(init)) if is_string_literal(&init.value) => {
                    next = None;
                    let value = self.expr(init);
                    self.out.line(&format!("{name}[{key}] = {value};"));
                }
                (None, Some(init)) => {
                    next = None;
                    let value = self.expr(init);
                    self.out.line(&format!("{name}[{name}[{key}] = {value}] = {key};"));
                }
                (None, None) => {
                    let value = match &previous {
                        Some(prev) => format!("{name}[{}] + 1", quote(prev)),
                        None => "0".to_string(),
                    };
                    self.out.line(&format!("{name}[{name}[{key}] = {value}] = {key};"));
                }
            }
            previous = Some(member_name);
        }
        self.pop_bindings();

        self.out.dedent();
        let argument = Self::container_argument(&name, object.as_deref());
        self.out.line(&format!("}})({argument});"));
    }

    pub(crate) fn emit_namespace(&mut self, module: &ModuleDecl, object: Option<String>) {
        if module.is_declare || !module.has_values() {
            return;
        }
        let ModuleName::Ident(ident) = &module.name else {
            return;
        };
        let name = ident.value.name.clone();
        if self.declare_once(&name) {
            self.out.line(&format!("var {name};"));
        }
        self.out.line(&format!("(function ({name}) {{"));
        self.out.indent();
        self.push_container(Container::Namespace(name.clone()));
        match &module.body {
            ModuleBody::Block(items) => self.emit_items(items),
            ModuleBody::Namespace(inner) => self.emit_namespace(&inner.value, Some(name.clone())),
        }
        self.pop_container();
        self.out.dedent();
        let argument = Self::container_argument(&name, object.as_deref());
        self.out.line(&format!("}})({argument});"));
    }
}

fn member_target(class_name: &str, is_static: bool) -> String {
    if is_static {
        class_name.to_string()
    } else {
        format!("{class_name}.prototype")
    }
}

/// Parameters and statements of the implementing constructor; an implicit
/// constructor has neither.
fn constructor_of(class: &ClassDecl) -> (&[Param], &[Node<Stmt>]) {
    class
        .members
        .iter()
        .find_map(|member| match &member.value {
            ClassMember::Constructor {
                params,
                body: Some(body),
                ..
            } => Some((params.as_slice(), body.value.stmts.as_slice())),
            _ => None,
        })
        .unwrap_or((&[], &[]))
}

fn is_super_call(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::Expr(Node {
            value: Expr::Call { callee, .. },
            ..
        }) if matches!(callee.value, Expr::Super)
    )
}

/// `this: T` declares the receiver type and is not a real parameter.
pub(crate) fn is_this_param(param: &Param) -> bool {
    matches!(&param.pattern.value, Pattern::Ident { name, .. } if name.value.name == "this")
}

fn is_string_literal(expr: &Expr) -> bool {
    matches!(expr.unwrap_transparent(), Expr::Literal(Literal::String { .. }) | Expr::Template { .. })
}

/// Folds an enum initializer built from numbers and earlier members.
fn enum_constant(expr: &Expr, enum_name: &str, known: &HashMap<String, f64>) -> Option<f64> {
    match expr {
        Expr::Literal(Literal::Number { value, .. }) => Some(*value),
        Expr::Paren(inner) => enum_constant(&inner.value, enum_name, known),
        Expr::Ident(ident) => known.get(&ident.name).copied(),
        Expr::Member { object, property } => match &object.value {
            Expr::Ident(object) if object.name == enum_name => known.get(&property.value.name).copied(),
            _ => None,
        },
        Expr::Unary { op, expr } => {
            let value = enum_constant(&expr.value, enum_name, known)?;
            match op {
                UnaryOp::Minus => Some(-value),
                UnaryOp::Plus => Some(value),
                UnaryOp::BitNot => Some(!(value as i32) as f64),
                _ => None,
            }
        }
        Expr::Binary { left, op, right } => {
            let l = enum_constant(&left.value, enum_name, known)?;
            let r = enum_constant(&right.value, enum_name, known)?;
            let (li, ri) = (l as i32, r as i32);
            Some(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Mod => l % r,
                BinaryOp::BitOr => (li | ri) as f64,
                BinaryOp::BitAnd => (li & ri) as f64,
                BinaryOp::BitXor => (li ^ ri) as f64,
                BinaryOp::LeftShift => li.wrapping_shl(ri as u32 & 31) as f64,
                BinaryOp::RightShift => li.wrapping_shr(ri as u32 & 31) as f64,
                BinaryOp::UnsignedRightShift => (li as u32).wrapping_shr(ri as u32 & 31) as f64,
                _ => return None,
            })
        }
        _ => None,
    }
}
