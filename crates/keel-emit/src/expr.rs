//! Expression lowering. Expressions render to strings; nested function
//! bodies are laid out relative to the writer's current indentation.

use keel_ast::*;

use crate::decl::{FnBody, FnKind};
use crate::emitter::Emitter;
use crate::error::EmitErrorKind;
use crate::helpers::{quote, Helper};
use crate::ScriptTarget;

/// Object literals longer than this are laid out one property per line
const MAX_INLINE_OBJECT: usize = 80;

impl Emitter {
    pub(crate) fn expr(&mut self, node: &Node<Expr>) -> String {
        let span = node.span;
        match &node.value {
            Expr::Literal(literal) => self.literal(literal),
            Expr::Ident(ident) => self.ident_text(&ident.name),
            Expr::Binary { left, op, right } => self.binary(left, *op, right),
            Expr::Unary { op, expr } => self.unary(*op, expr),
            Expr::Assignment { target, op, value } => self.assignment(target, *op, value),
            Expr::Call { callee, args, .. } => self.call(callee, args),
            Expr::Member { object, property } => self.member(object, &property.value.name),
            Expr::Index { object, index } => {
                let object = self.operand(object);
                let index = self.expr(index);
                format!("{object}[{index}]")
            }
            Expr::Array(elements) => {
                let has_spread = elements
                    .iter()
                    .flatten()
                    .any(|element| matches!(element.value, Expr::Spread(_)));
                if has_spread && self.downlevel() {
                    let elements: Vec<Option<&Node<Expr>>> = elements.iter().map(Option::as_ref).collect();
                    self.concat_segments(&elements, true)
                } else {
                    let items: Vec<String> = elements
                        .iter()
                        .map(|element| match element {
                            Some(element) => self.expr(element),
                            None => String::new(),
                        })
                        .collect();
                    format!("[{}]", items.join(", "))
                }
            }
            Expr::Object(properties) => {
                let properties: Vec<&ObjectProperty> = properties.iter().collect();
                self.object_literal(&properties)
            }
            Expr::Arrow {
                params,
                body,
                is_async,
                ..
            } => self.arrow(params, body, *is_async, span),
            Expr::Function {
                name,
                params,
                body,
                is_async,
                is_generator,
                ..
            } => {
                let prefix = self.function_prefix(*is_async, *is_generator, span);
                let parts = self.function_parts(params, FnBody::Block(&body.value.stmts), FnKind::Function);
                let name = name.as_ref().map_or("", |name| name.value.name.as_str());
                format!("{prefix}{name}({}) {}", parts.params, parts.body)
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                let condition = self.expr(condition);
                let then_expr = self.expr(then_expr);
                let else_expr = self.expr(else_expr);
                format!("{condition} ? {then_expr} : {else_expr}")
            }
            Expr::Template { quasis, exprs } => self.template(quasis, exprs),
            Expr::New { callee, args, .. } => {
                if self.downlevel() && args.iter().any(|arg| matches!(arg.value, Expr::Spread(_))) {
                    self.report(EmitErrorKind::UnsupportedSpread, span);
                }
                let callee = self.operand(callee);
                let args = self.arguments(args);
                format!("new {callee}({args})")
            }
            Expr::TypeCast { expr, .. } | Expr::NonNullAssertion(expr) => self.expr(expr),
            Expr::Await(inner) => format!("await {}", self.expr(inner)),
            Expr::Paren(inner) => self.paren(inner),
            Expr::This => self.this_name().to_string(),
            Expr::Super => {
                let keyword = if self.downlevel() { "_super" } else { "super" };
                keyword.to_string()
            }
            Expr::Sequence(exprs) => exprs
                .iter()
                .map(|expr| self.expr(expr))
                .collect::<Vec<_>>()
                .join(", "),
            Expr::Spread(inner) => format!("...{}", self.expr(inner)),
            Expr::OptionalMember { object, property } => {
                let name = property.value.name.clone();
                self.optional_chain(object, |emitter, base| emitter.member_text(base, &name))
            }
            Expr::OptionalIndex { object, index } => self.optional_chain(object, |emitter, base| {
                let index = emitter.expr(index);
                format!("{base}[{index}]")
            }),
            Expr::OptionalCall { callee, args } => {
                if self.downlevel() && args.iter().any(|arg| matches!(arg.value, Expr::Spread(_))) {
                    self.report(EmitErrorKind::UnsupportedSpread, span);
                }
                self.optional_chain(callee, |emitter, base| {
                    let args = emitter.arguments(args);
                    format!("{base}({args})")
                })
            }
            Expr::TaggedTemplate { tag, quasis, exprs } => self.tagged_template(tag, quasis, exprs),
            Expr::MetaProperty { meta, property } => {
                format!("{}.{}", meta.value.name, property.value.name)
            }
            Expr::Yield { argument, delegate } => {
                let keyword = if *delegate { "yield*" } else { "yield" };
                match argument {
                    Some(argument) => format!("{keyword} {}", self.expr(argument)),
                    None => keyword.to_string(),
                }
            }
        }
    }

    /// Renders `node`, parenthesized unless it binds tighter than any
    /// operator it may be embedded in.
    pub(crate) fn operand(&mut self, node: &Node<Expr>) -> String {
        let text = self.expr(node);
        if self.is_primary(&node.value) {
            text
        } else {
            format!("({text})")
        }
    }

    fn is_primary(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Template { exprs, .. } => exprs.is_empty() || !self.downlevel(),
            Expr::TypeCast { expr, .. } | Expr::NonNullAssertion(expr) => self.is_primary(&expr.value),
            Expr::Literal(_)
            | Expr::Ident(_)
            | Expr::This
            | Expr::Super
            | Expr::Member { .. }
            | Expr::Index { .. }
            | Expr::Call { .. }
            | Expr::New { .. }
            | Expr::Paren(_)
            | Expr::Array(_)
            | Expr::Object(_)
            | Expr::OptionalMember { .. }
            | Expr::OptionalIndex { .. }
            | Expr::OptionalCall { .. }
            | Expr::TaggedTemplate { .. }
            | Expr::MetaProperty { .. } => true,
            _ => false,
        }
    }

    fn literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::Number { value, raw } => {
                let modern_radix = ["0b", "0B", "0o", "0O"].iter().any(|prefix| raw.starts_with(prefix));
                if raw.contains('_') || (modern_radix && self.downlevel()) {
                    format_number(*value)
                } else {
                    raw.clone()
                }
            }
            Literal::String { raw, .. } => raw.clone(),
            Literal::Boolean(value) => value.to_string(),
            Literal::Null => "null".to_string(),
            Literal::RegExp { pattern, flags } => format!("/{pattern}/{flags}"),
        }
    }

    /// Drops parentheses that only wrapped a type assertion.
    fn paren(&mut self, inner: &Node<Expr>) -> String {
        let asserted = matches!(inner.value, Expr::TypeCast { .. } | Expr::NonNullAssertion(_));
        let bare = matches!(
            inner.value.unwrap_transparent(),
            Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } | Expr::This | Expr::Paren(_)
        );
        let text = self.expr(inner);
        if asserted && bare {
            text
        } else {
            format!("({text})")
        }
    }

    fn binary(&mut self, left: &Node<Expr>, op: BinaryOp, right: &Node<Expr>) -> String {
        match op {
            BinaryOp::Pow if self.downlevel() => {
                let left = self.expr(left);
                let right = self.expr(right);
                format!("Math.pow({left}, {right})")
            }
            BinaryOp::NullishCoalesce => {
                let (first, again) = self.reusable(left);
                let right = self.expr(right);
                format!("{first} !== null && {again} !== void 0 ? {again} : {right}")
            }
            _ => {
                let left = self.expr(left);
                let right = self.expr(right);
                format!("{left} {op} {right}")
            }
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: &Node<Expr>) -> String {
        let text = self.expr(operand);
        match op {
            UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete => format!("{op} {text}"),
            _ if op.is_postfix() => format!("{text}{op}"),
            _ => {
                let symbol = op.to_string();
                let clash = matches!(op, UnaryOp::Plus | UnaryOp::Minus | UnaryOp::PreIncrement | UnaryOp::PreDecrement)
                    && symbol.chars().next().is_some_and(|c| text.starts_with(c));
                if clash {
                    format!("{symbol} {text}")
                } else {
                    format!("{symbol}{text}")
                }
            }
        }
    }

    fn assignment(&mut self, target: &Node<Expr>, op: AssignmentOp, value: &Node<Expr>) -> String {
        if op == AssignmentOp::Assign && self.downlevel() {
            if let Expr::Array(_) | Expr::Object(_) = target.value {
                if let Some(text) = self.destructuring_assignment(target, value) {
                    return text;
                }
                self.report(EmitErrorKind::NestedDestructuring, target.span);
            }
        }
        let target_text = self.expr(target);
        let value_text = self.expr(value);
        match op {
            AssignmentOp::PowAssign if self.downlevel() => {
                format!("{target_text} = Math.pow({target_text}, {value_text})")
            }
            AssignmentOp::AndAssign => format!("{target_text} && ({target_text} = {value_text})"),
            AssignmentOp::OrAssign => format!("{target_text} || ({target_text} = {value_text})"),
            AssignmentOp::NullishAssign => format!(
                "{target_text} !== null && {target_text} !== void 0 ? {target_text} : ({target_text} = {value_text})"
            ),
            _ => format!("{target_text} {op} {value_text}"),
        }
    }

    /// `[a, b] = v` becomes `(_a = v, a = _a[0], b = _a[1], _a)`. Only plain
    /// targets are supported; anything else returns `None`.
    fn destructuring_assignment(&mut self, target: &Node<Expr>, value: &Node<Expr>) -> Option<String> {
        fn is_simple_target(expr: &Expr) -> bool {
            matches!(expr, Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. })
        }
        let supported = match &target.value {
            Expr::Array(elements) => {
                let count = elements.len();
                elements.iter().enumerate().all(|(index, element)| match element {
                    Some(Node {
                        value: Expr::Spread(inner),
                        ..
                    }) => index + 1 == count && is_simple_target(&inner.value),
                    Some(element) => is_simple_target(&element.value),
                    None => true,
                })
            }
            Expr::Object(properties) => properties.iter().all(|prop| match prop {
                ObjectProperty::Property { value, .. } => is_simple_target(&value.value),
                _ => false,
            }),
            _ => false,
        };
        if !supported {
            return None;
        }

        let source = self.expr(value);
        let temp = self.hoisted_temp();
        let mut parts = vec![format!("{temp} = {source}")];
        match &target.value {
            Expr::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    match element {
                        Some(Node {
                            value: Expr::Spread(inner),
                            ..
                        }) => {
                            let target = self.expr(inner);
                            parts.push(format!("{target} = {temp}.slice({index})"));
                        }
                        Some(element) => {
                            let target = self.expr(element);
                            parts.push(format!("{target} = {temp}[{index}]"));
                        }
                        None => {}
                    }
                }
            }
            Expr::Object(properties) => {
                for prop in properties {
                    if let ObjectProperty::Property { key, value, .. } = prop {
                        let target = self.expr(value);
                        let slot = self.member_slot(&temp, key);
                        parts.push(format!("{target} = {slot}"));
                    }
                }
            }
            _ => {}
        }
        parts.push(temp);
        Some(format!("({})", parts.join(", ")))
    }

    fn arguments(&mut self, args: &[Node<Expr>]) -> String {
        args.iter()
            .map(|arg| self.expr(arg))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn call(&mut self, callee: &Node<Expr>, args: &[Node<Expr>]) -> String {
        let spread = self.downlevel() && args.iter().any(|arg| matches!(arg.value, Expr::Spread(_)));
        match &callee.value {
            Expr::Super if self.downlevel() => {
                let this = self.this_name();
                if spread {
                    let array = self.spread_arguments(args);
                    format!("_super.apply({this}, {array})")
                } else {
                    let mut list = vec![this.to_string()];
                    list.extend(args.iter().map(|arg| self.expr(arg)));
                    format!("_super.call({})", list.join(", "))
                }
            }
            Expr::Member { object, property } if self.downlevel() && matches!(object.value, Expr::Super) => {
                let method = self.super_member(&property.value.name);
                let this = self.this_name();
                if spread {
                    let array = self.spread_arguments(args);
                    format!("{method}.apply({this}, {array})")
                } else {
                    let mut list = vec![this.to_string()];
                    list.extend(args.iter().map(|arg| self.expr(arg)));
                    format!("{method}.call({})", list.join(", "))
                }
            }
            _ if spread => self.spread_call(callee, args),
            _ => {
                let callee = self.operand(callee);
                let args = self.arguments(args);
                format!("{callee}({args})")
            }
        }
    }

    /// `f.apply(void 0, args)`, or `o.m.apply(o, args)` keeping the receiver
    fn spread_call(&mut self, callee: &Node<Expr>, args: &[Node<Expr>]) -> String {
        let (function, receiver) = match &callee.value {
            Expr::Member { object, property } => {
                let (first, again) = self.reusable(object);
                (self.member_text(&first, &property.value.name), again)
            }
            Expr::Index { object, index } => {
                let (first, again) = self.reusable(object);
                let index = self.expr(index);
                (format!("{first}[{index}]"), again)
            }
            _ => (self.operand(callee), "void 0".to_string()),
        };
        let array = self.spread_arguments(args);
        format!("{function}.apply({receiver}, {array})")
    }

    fn spread_arguments(&mut self, args: &[Node<Expr>]) -> String {
        let elements: Vec<Option<&Node<Expr>>> = args.iter().map(Some).collect();
        self.concat_segments(&elements, false)
    }

    /// Array built from plain and spread elements with `concat`. A lone
    /// spread is copied with `slice()` when `copy` is set.
    fn concat_segments(&mut self, elements: &[Option<&Node<Expr>>], copy: bool) -> String {
        let mut segments: Vec<String> = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut first_is_spread = false;
        for element in elements {
            match element {
                Some(Node {
                    value: Expr::Spread(inner),
                    ..
                }) => {
                    if !pending.is_empty() {
                        segments.push(format!("[{}]", pending.join(", ")));
                        pending.clear();
                    }
                    if segments.is_empty() {
                        first_is_spread = true;
                    }
                    segments.push(self.operand(inner));
                }
                Some(element) => pending.push(self.expr(element)),
                None => pending.push(String::new()),
            }
        }
        if !pending.is_empty() {
            segments.push(format!("[{}]", pending.join(", ")));
        }
        match segments.split_first() {
            None => "[]".to_string(),
            Some((only, [])) if first_is_spread && copy => format!("{only}.slice()"),
            Some((only, [])) => only.clone(),
            Some((first, rest)) => format!("{first}.concat({})", rest.join(", ")),
        }
    }

    fn member(&mut self, object: &Node<Expr>, name: &str) -> String {
        if self.downlevel() && matches!(object.value, Expr::Super) {
            return self.super_member(name);
        }
        let object = self.operand(object);
        self.member_text(&object, name)
    }

    /// Base-class member reached through `super`
    fn super_member(&self, name: &str) -> String {
        if self.in_static {
            self.member_text("_super", name)
        } else {
            self.member_text("_super.prototype", name)
        }
    }

    /// Text for an expression used twice: identifiers repeat, anything else
    /// is stored in a temporary on first use.
    fn reusable(&mut self, node: &Node<Expr>) -> (String, String) {
        match node.value.unwrap_transparent() {
            Expr::Ident(_) | Expr::This => {
                let text = self.operand(node);
                (text.clone(), text)
            }
            _ => {
                let text = self.expr(node);
                let temp = self.hoisted_temp();
                (format!("({temp} = {text})"), temp)
            }
        }
    }

    fn optional_chain(&mut self, object: &Node<Expr>, access: impl FnOnce(&mut Self, &str) -> String) -> String {
        let (first, again) = self.reusable(object);
        let tail = access(self, &again);
        format!("({first} === null || {again} === void 0 ? void 0 : {tail})")
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn arrow(&mut self, params: &[Param], body: &ArrowBody, is_async: bool, span: Span) -> String {
        let body = match body {
            ArrowBody::Expr(expr) => FnBody::Expr(expr),
            ArrowBody::Block(block) => FnBody::Block(&block.value.stmts),
        };
        if self.downlevel() {
            self.check_function_flags(is_async, false, span);
            let parts = self.function_parts(params, body, FnKind::Arrow);
            let keyword = if is_async { "async function" } else { "function" };
            return format!("{keyword} ({}) {}", parts.params, parts.body);
        }
        let parts = self.function_parts(params, body, FnKind::Arrow);
        let body = parts.expr_body.unwrap_or(parts.body);
        let keyword = if is_async { "async " } else { "" };
        format!("{keyword}({}) => {body}", parts.params)
    }

    // =========================================================================
    // Templates
    // =========================================================================

    fn template(&mut self, quasis: &[TemplateQuasi], exprs: &[Node<Expr>]) -> String {
        if !self.downlevel() {
            let mut out = String::from("`");
            for (index, quasi) in quasis.iter().enumerate() {
                out.push_str(&quasi.raw);
                if let Some(expr) = exprs.get(index) {
                    let text = self.expr(expr);
                    out.push_str(&format!("${{{text}}}"));
                }
            }
            out.push('`');
            return out;
        }

        let mut parts = Vec::new();
        for (index, quasi) in quasis.iter().enumerate() {
            if !quasi.cooked.is_empty() {
                parts.push(quote(&quasi.cooked));
            }
            if let Some(expr) = exprs.get(index) {
                parts.push(self.operand(expr));
            }
        }
        let starts_with_string = quasis.first().is_some_and(|quasi| !quasi.cooked.is_empty());
        if !starts_with_string {
            parts.insert(0, "\"\"".to_string());
        }
        if parts.len() == 2 && exprs.is_empty() {
            parts.remove(0);
        }
        parts.join(" + ")
    }

    fn tagged_template(&mut self, tag: &Node<Expr>, quasis: &[TemplateQuasi], exprs: &[Node<Expr>]) -> String {
        let tag = self.operand(tag);
        if !self.downlevel() {
            let template = self.template(quasis, exprs);
            return format!("{tag}{template}");
        }
        let temp = self.hoisted_temp();
        let cooked: Vec<String> = quasis.iter().map(|quasi| quote(&quasi.cooked)).collect();
        let raw: Vec<String> = quasis.iter().map(|quasi| quote(&quasi.raw)).collect();
        let mut args = vec![format!(
            "({temp} = [{}], {temp}.raw = [{}], {temp})",
            cooked.join(", "),
            raw.join(", ")
        )];
        args.extend(exprs.iter().map(|expr| self.expr(expr)));
        format!("{tag}({})", args.join(", "))
    }

    // =========================================================================
    // Object literals
    // =========================================================================

    /// Key as written in an object literal or class body
    pub(crate) fn property_key(&mut self, key: &PropertyName) -> String {
        match key {
            PropertyName::Ident(ident) => ident.value.name.clone(),
            PropertyName::String(value) => quote(value),
            PropertyName::Number(value) => format_number(*value),
            PropertyName::Computed(expr) => format!("[{}]", self.expr(expr)),
        }
    }

    fn object_literal(&mut self, properties: &[&ObjectProperty]) -> String {
        if properties.is_empty() {
            return "{}".to_string();
        }
        if self.downlevel() {
            if properties.iter().any(|prop| matches!(prop, ObjectProperty::Spread(_))) {
                return self.object_spread(properties);
            }
            if let Some(split) = properties.iter().position(|prop| has_computed_key(prop)) {
                return self.object_with_computed_keys(properties, split);
            }
        }
        let rendered: Vec<String> = self.nested(|emitter| {
            properties
                .iter()
                .map(|prop| emitter.object_property(prop))
                .collect()
        });
        self.layout_object(&rendered)
    }

    fn layout_object(&self, rendered: &[String]) -> String {
        if rendered.is_empty() {
            return "{}".to_string();
        }
        let inline = format!("{{ {} }}", rendered.join(", "));
        if !inline.contains('\n') && inline.len() <= MAX_INLINE_OBJECT {
            return inline;
        }
        let new_line = self.out.new_line();
        let outer = self.out.indent_text();
        let inner = format!("{outer}    ");
        let lines: Vec<String> = rendered.iter().map(|prop| format!("{inner}{prop}")).collect();
        format!("{{{new_line}{}{new_line}{outer}}}", lines.join(&format!(",{new_line}")))
    }

    fn object_property(&mut self, prop: &ObjectProperty) -> String {
        match prop {
            ObjectProperty::Property {
                key,
                value,
                shorthand: true,
            } => {
                let name = self.property_key(key);
                let value = self.expr(value);
                if self.downlevel() || value != name {
                    format!("{name}: {value}")
                } else {
                    name
                }
            }
            ObjectProperty::Property { key, value, .. } => {
                let key = self.property_key(key);
                let value = self.expr(value);
                format!("{key}: {value}")
            }
            ObjectProperty::Method {
                key,
                params,
                body,
                is_async,
                is_generator,
                ..
            } => {
                let key = self.property_key(key);
                if self.downlevel() {
                    let prefix = self.function_prefix(*is_async, *is_generator, body.span);
                    let parts = self.function_parts(params, FnBody::Block(&body.value.stmts), FnKind::Function);
                    format!("{key}: {prefix}({}) {}", parts.params, parts.body)
                } else {
                    let flags = match (*is_async, *is_generator) {
                        (true, true) => "async *",
                        (true, false) => "async ",
                        (false, true) => "*",
                        (false, false) => "",
                    };
                    let parts = self.function_parts(params, FnBody::Block(&body.value.stmts), FnKind::Function);
                    format!("{flags}{key}({}) {}", parts.params, parts.body)
                }
            }
            ObjectProperty::Getter { key, body, .. } => {
                if self.target == ScriptTarget::Es3 {
                    self.report(EmitErrorKind::AccessorsBelowEs5, body.span);
                }
                let key = self.property_key(key);
                let parts = self.function_parts(&[], FnBody::Block(&body.value.stmts), FnKind::Function);
                format!("get {key}() {}", parts.body)
            }
            ObjectProperty::Setter { key, param, body } => {
                if self.target == ScriptTarget::Es3 {
                    self.report(EmitErrorKind::AccessorsBelowEs5, body.span);
                }
                let key = self.property_key(key);
                let parts = self.function_parts(
                    std::slice::from_ref(param),
                    FnBody::Block(&body.value.stmts),
                    FnKind::Function,
                );
                format!("set {key}({}) {}", parts.params, parts.body)
            }
            ObjectProperty::Spread(expr) => format!("...{}", self.expr(expr)),
        }
    }

    /// `{ a: 1, ...b }` becomes `__assign({ a: 1 }, b)`
    fn object_spread(&mut self, properties: &[&ObjectProperty]) -> String {
        self.helpers.insert(Helper::Assign);
        let mut args = Vec::new();
        let mut group: Vec<&ObjectProperty> = Vec::new();
        for prop in properties {
            match prop {
                ObjectProperty::Spread(expr) => {
                    if !group.is_empty() {
                        args.push(self.object_literal(&group));
                        group.clear();
                    }
                    args.push(self.expr(expr));
                }
                _ => group.push(*prop),
            }
        }
        if !group.is_empty() {
            args.push(self.object_literal(&group));
        }
        if matches!(properties.first(), Some(ObjectProperty::Spread(_))) {
            args.insert(0, "{}".to_string());
        }
        format!("__assign({})", args.join(", "))
    }

    /// Properties from the first computed key on are assigned one by one:
    /// `(_a = { a: 1 }, _a[k] = 2, _a)`.
    fn object_with_computed_keys(&mut self, properties: &[&ObjectProperty], split: usize) -> String {
        let (head, tail) = properties.split_at(split);
        let temp = self.hoisted_temp();
        let initial = self.object_literal(head);
        let mut parts = vec![format!("{temp} = {initial}")];
        for prop in tail {
            match prop {
                ObjectProperty::Property { key, value, .. } => {
                    let slot = self.member_slot(&temp, key);
                    let value = self.expr(value);
                    parts.push(format!("{slot} = {value}"));
                }
                ObjectProperty::Method {
                    key,
                    params,
                    body,
                    is_async,
                    is_generator,
                    ..
                } => {
                    let slot = self.member_slot(&temp, key);
                    let prefix = self.function_prefix(*is_async, *is_generator, body.span);
                    let parts_text =
                        self.function_parts(params, FnBody::Block(&body.value.stmts), FnKind::Function);
                    parts.push(format!("{slot} = {prefix}({}) {}", parts_text.params, parts_text.body));
                }
                ObjectProperty::Getter { key, body, .. } => {
                    let key = self.accessor_key(key);
                    let getter = self.function_parts(&[], FnBody::Block(&body.value.stmts), FnKind::Function);
                    parts.push(format!(
                        "Object.defineProperty({temp}, {key}, {{ get: function () {}, enumerable: true, configurable: true }})",
                        getter.body
                    ));
                }
                ObjectProperty::Setter { key, param, body } => {
                    let key = self.accessor_key(key);
                    let setter = self.function_parts(
                        std::slice::from_ref(param),
                        FnBody::Block(&body.value.stmts),
                        FnKind::Function,
                    );
                    parts.push(format!(
                        "Object.defineProperty({temp}, {key}, {{ set: function ({}) {}, enumerable: true, configurable: true }})",
                        setter.params, setter.body
                    ));
                }
                ObjectProperty::Spread(_) => {}
            }
        }
        parts.push(temp);
        format!("({})", parts.join(", "))
    }

    fn accessor_key(&mut self, key: &PropertyName) -> String {
        match key {
            PropertyName::Computed(expr) => self.expr(expr),
            other => quote(&other.static_name().unwrap_or_default()),
        }
    }
}

fn has_computed_key(prop: &ObjectProperty) -> bool {
    matches!(
        prop,
        ObjectProperty::Property {
            key: PropertyName::Computed(_),
            ..
        } | ObjectProperty::Method {
            key: PropertyName::Computed(_),
            ..
        } | ObjectProperty::Getter {
            key: PropertyName::Computed(_),
            ..
        } | ObjectProperty::Setter {
            key: PropertyName::Computed(_),
            ..
        }
    )
}
