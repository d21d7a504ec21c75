//! Expression checking methods

use keel_ast::{
    ArrowBody, AssignmentOp, BinaryOp, Expr, Ident, Literal, Node, ObjectProperty, Param, PropertyName,
    Span, Type as AstType, TypeParam, UnaryOp,
};

use crate::checker::TypeChecker;
use crate::env::{Symbol, SymbolKind};
use crate::error::TypeErrorKind;
use crate::helpers::{TypeHelpers, FUNCTION_MEMBERS, OBJECT_MEMBERS};
use crate::types::{LiteralType, PropertySig, Shape, Signature, Type};

impl TypeChecker {
    pub(crate) fn check_expr(&mut self, expr: &Node<Expr>) -> Type {
        let span = expr.span;
        match &expr.value {
            Expr::Literal(lit) => literal_type(lit),
            Expr::Ident(ident) => self.check_ident(&ident.name, span),
            Expr::Binary { left, op, right } => self.check_binary(left, *op, right),
            Expr::Unary { op, expr: operand } => self.check_unary(*op, operand),
            Expr::Assignment { target, op, value } => self.check_assignment(target, *op, value),
            Expr::Call { callee, args, .. } => self.check_call(callee, args, span),
            Expr::New { callee, args, .. } => self.check_new(callee, args, span),
            Expr::Member { object, property } | Expr::OptionalMember { object, property } => {
                let object_type = self.check_expr(object);
                self.member_type(&object_type, property)
            }
            Expr::Index { object, index } | Expr::OptionalIndex { object, index } => {
                let object_type = self.check_expr(object);
                self.check_expr(index);
                index_type(&object_type, &index.value)
            }
            Expr::Array(elements) => {
                let mut types = Vec::new();
                for elem in elements.iter().flatten() {
                    let ty = self.check_expr(elem);
                    types.push(match (&elem.value, ty) {
                        (Expr::Spread(_), Type::Array(inner)) => *inner,
                        (Expr::Spread(_), _) => Type::Any,
                        (_, ty) => ty.widen(),
                    });
                }
                match types.is_empty() {
                    true => Type::Array(Box::new(Type::Any)),
                    false => Type::Array(Box::new(Type::union(types))),
                }
            }
            Expr::Object(props) => self.check_object_literal(props),
            Expr::Arrow {
                type_params,
                params,
                return_type,
                body,
                is_async,
            } => self.check_arrow(
                type_params.as_deref(),
                params,
                return_type.as_deref(),
                body,
                *is_async,
            ),
            Expr::Function {
                name,
                type_params,
                params,
                return_type,
                body,
                is_async,
                is_generator,
            } => {
                let sig = self.params_signature(type_params.as_deref(), params, return_type.as_deref());
                let ty = Type::function(sig);

                // a named function expression sees itself
                self.env.push_scope();
                if let Some(name) = name {
                    self.env.declare(
                        name.value.name.clone(),
                        Symbol::value(SymbolKind::Function, ty.clone()),
                    );
                }
                let saved_this = self.current_this.take();
                self.check_function_body(
                    type_params.as_deref(),
                    params,
                    return_type.as_deref(),
                    body,
                    *is_async || *is_generator,
                );
                self.current_this = saved_this;
                self.env.pop_scope();
                ty
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.check_expr(condition);
                let then_type = self.check_expr(then_expr);
                let else_type = self.check_expr(else_expr);
                Type::union([then_type, else_type])
            }
            Expr::Template { exprs, .. } => {
                for e in exprs {
                    self.check_expr(e);
                }
                Type::String
            }
            Expr::TaggedTemplate { tag, exprs, .. } => {
                self.check_expr(tag);
                for e in exprs {
                    self.check_expr(e);
                }
                Type::Any
            }
            Expr::TypeCast { expr: inner, ty } => {
                let inner_type = self.check_expr(inner);
                match &ty.value {
                    AstType::TypeRef { name, .. } if name.value.name == "const" => inner_type,
                    _ => self.resolve_type(ty),
                }
            }
            Expr::Paren(inner) | Expr::NonNullAssertion(inner) | Expr::Spread(inner) => self.check_expr(inner),
            Expr::Await(inner) => {
                self.check_expr(inner);
                Type::Any
            }
            Expr::This => self.current_this.clone().unwrap_or(Type::Any),
            Expr::Super | Expr::MetaProperty { .. } => Type::Any,
            Expr::Sequence(exprs) => {
                let mut last = Type::Undefined;
                for e in exprs {
                    last = self.check_expr(e);
                }
                last
            }
            Expr::OptionalCall { callee, args } => {
                self.check_expr(callee);
                for arg in args {
                    self.check_expr(arg);
                }
                Type::Any
            }
            Expr::Yield { argument, .. } => {
                if let Some(argument) = argument {
                    self.check_expr(argument);
                }
                Type::Any
            }
        }
    }

    fn check_ident(&mut self, name: &str, span: Span) -> Type {
        if name == "undefined" {
            return Type::Undefined;
        }
        if let Some(symbol) = self.env.lookup_value(name) {
            return symbol.value.clone().unwrap_or(Type::Any);
        }
        if self.env.lookup_namespace(name).is_some() {
            return Type::Any;
        }
        let kind = match self.env.lookup_type(name) {
            Some(_) => TypeErrorKind::TypeUsedAsValue(name.to_string()),
            None => TypeErrorKind::CannotFindName(name.to_string()),
        };
        self.report(kind, span);
        Type::Any
    }

    fn check_binary(&mut self, left: &Node<Expr>, op: BinaryOp, right: &Node<Expr>) -> Type {
        let left_type = self.check_expr(left);
        let right_type = self.check_expr(right);

        match op {
            BinaryOp::Add => {
                if is_string_like(&left_type) || is_string_like(&right_type) {
                    Type::String
                } else if is_number_like(&left_type) && is_number_like(&right_type) {
                    Type::Number
                } else {
                    Type::Any
                }
            }
            BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Pow
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::LeftShift
            | BinaryOp::RightShift
            | BinaryOp::UnsignedRightShift => Type::Number,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::StrictEq
            | BinaryOp::StrictNotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::InstanceOf => Type::Boolean,
            BinaryOp::And => right_type,
            BinaryOp::Or | BinaryOp::NullishCoalesce => Type::union([left_type, right_type]),
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Node<Expr>) -> Type {
        let operand_type = self.check_expr(operand);
        if op.is_update() {
            self.check_const_target(operand);
            return Type::Number;
        }
        match op {
            UnaryOp::Not | UnaryOp::Delete => Type::Boolean,
            UnaryOp::TypeOf => Type::String,
            UnaryOp::Void => Type::Undefined,
            UnaryOp::Minus => match operand_type {
                Type::Literal(LiteralType::Number(n)) => Type::Literal(LiteralType::Number(-n)),
                _ => Type::Number,
            },
            _ => Type::Number,
        }
    }

    /// Reports TS2588 when `target` names a constant. Returns whether it did.
    fn check_const_target(&mut self, target: &Node<Expr>) -> bool {
        let Expr::Ident(ident) = &target.value else {
            return false;
        };
        let is_const = self
            .env
            .lookup_value(&ident.name)
            .is_some_and(|symbol| symbol.kind == SymbolKind::Const);
        if is_const {
            self.report(TypeErrorKind::AssignToConstant(ident.name.clone()), target.span);
        }
        is_const
    }

    fn check_assignment(&mut self, target: &Node<Expr>, op: AssignmentOp, value: &Node<Expr>) -> Type {
        let value_type = self.check_expr(value);
        if self.check_const_target(target) {
            return value_type;
        }

        let target_type = match &target.value {
            Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. } | Expr::Paren(_) => {
                self.check_expr(target)
            }
            // destructuring assignment
            _ => {
                self.check_expr(target);
                return value_type;
            }
        };
        if op == AssignmentOp::Assign && !TypeHelpers::is_assignable(&value_type, &target_type) {
            self.report_not_assignable(&value_type, &target_type, &value.value, target.span);
        }
        value_type
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn check_call(&mut self, callee: &Node<Expr>, args: &[Node<Expr>], span: Span) -> Type {
        let callee_type = self.check_expr(callee);
        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg)).collect();
        if callee_type.is_any_like() {
            return Type::Any;
        }

        let signatures = callee_type.call_signatures();
        if signatures.is_empty() {
            match &callee_type {
                Type::Object(shape) if !shape.construct_signatures.is_empty() => {
                    self.report(
                        TypeErrorKind::ClassNotCallable(callee_type.to_string()),
                        callee.span,
                    );
                }
                ty if is_known_non_callable(ty) => self.report(TypeErrorKind::NotCallable, callee.span),
                _ => {}
            }
            return Type::Any;
        }
        self.check_arguments(&signatures, args, &arg_types, span)
    }

    fn check_new(&mut self, callee: &Node<Expr>, args: &[Node<Expr>], span: Span) -> Type {
        let callee_type = self.check_expr(callee);
        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg)).collect();
        if callee_type.is_any_like() {
            return Type::Any;
        }

        let signatures: Vec<&Signature> = match &callee_type {
            Type::Object(shape) => shape.construct_signatures.iter().collect(),
            _ => Vec::new(),
        };
        if signatures.is_empty() {
            // plain functions may be called with `new`
            if callee_type.call_signatures().is_empty() && is_known_non_callable(&callee_type) {
                self.report(TypeErrorKind::NotConstructable, callee.span);
            }
            return Type::Any;
        }
        self.check_arguments(&signatures, args, &arg_types, span)
    }

    /// Relates arguments to the candidate signatures and yields the result
    /// type. Only a single candidate produces errors.
    fn check_arguments(
        &mut self,
        signatures: &[&Signature],
        args: &[Node<Expr>],
        arg_types: &[Type],
        span: Span,
    ) -> Type {
        let has_spread = args.iter().any(|arg| matches!(arg.value, Expr::Spread(_)));

        let [sig] = signatures else {
            let matching = signatures.iter().find(|sig| {
                arity_matches(sig, args.len())
                    && arg_types.iter().enumerate().all(|(i, ty)| {
                        sig.param_type(i)
                            .map_or(true, |param| TypeHelpers::is_assignable(ty, &param))
                    })
            });
            return match matching {
                Some(sig) if !sig.has_type_params => sig.return_type.clone(),
                _ => Type::Any,
            };
        };

        let result = if sig.has_type_params {
            Type::Any
        } else {
            sig.return_type.clone()
        };
        if has_spread {
            return result;
        }
        if !arity_matches(sig, args.len()) {
            self.report(
                TypeErrorKind::ArgumentCount {
                    expected: TypeHelpers::expected_arguments(signatures),
                    found: args.len(),
                },
                span,
            );
            return result;
        }
        for (index, (arg, arg_type)) in args.iter().zip(arg_types).enumerate() {
            let Some(param) = sig.param_type(index) else {
                continue;
            };
            if !TypeHelpers::is_assignable(arg_type, &param) {
                self.report(
                    TypeErrorKind::ArgumentNotAssignable {
                        argument: describe_source(arg_type, &param, &arg.value),
                        parameter: self.display_type(&param),
                    },
                    arg.span,
                );
            }
        }
        result
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub(crate) fn member_type(&mut self, object: &Type, property: &Node<Ident>) -> Type {
        let name = property.value.name.as_str();
        match object {
            Type::String | Type::Literal(LiteralType::String(_)) | Type::Array(_) | Type::Tuple(_)
                if name == "length" =>
            {
                Type::Number
            }
            Type::Object(shape) => {
                if let Some(prop) = shape.property(name) {
                    return prop.ty.clone();
                }
                if let Some(index) = &shape.index {
                    return index.clone();
                }
                let callable = !shape.call_signatures.is_empty() || !shape.construct_signatures.is_empty();
                if !shape.closed
                    || OBJECT_MEMBERS.contains(&name)
                    || (callable && FUNCTION_MEMBERS.contains(&name))
                {
                    return Type::Any;
                }
                self.report(
                    TypeErrorKind::PropertyNotFound {
                        property: name.to_string(),
                        ty: object.to_string(),
                    },
                    property.span,
                );
                Type::Any
            }
            _ => Type::Any,
        }
    }

    fn check_object_literal(&mut self, props: &[ObjectProperty]) -> Type {
        let mut shape = Shape {
            closed: true,
            ..Shape::default()
        };

        for prop in props {
            match prop {
                ObjectProperty::Property { key, value, .. } => {
                    let ty = self.check_expr(value).widen();
                    self.add_literal_member(&mut shape, key, ty);
                }
                ObjectProperty::Method {
                    key,
                    type_params,
                    params,
                    return_type,
                    body,
                    is_async,
                    is_generator,
                } => {
                    let sig = self.params_signature(type_params.as_deref(), params, return_type.as_deref());
                    let saved_this = self.current_this.take();
                    self.check_function_body(
                        type_params.as_deref(),
                        params,
                        return_type.as_deref(),
                        body,
                        *is_async || *is_generator,
                    );
                    self.current_this = saved_this;
                    self.add_literal_member(&mut shape, key, Type::function(sig));
                }
                ObjectProperty::Getter {
                    key,
                    return_type,
                    body,
                } => {
                    let saved_this = self.current_this.take();
                    self.check_function_body(None, &[], return_type.as_deref(), body, false);
                    self.current_this = saved_this;
                    let ty = return_type
                        .as_ref()
                        .map(|ty| self.resolve_type(ty))
                        .unwrap_or(Type::Any);
                    self.add_literal_member(&mut shape, key, ty);
                }
                ObjectProperty::Setter { key, param, body } => {
                    let saved_this = self.current_this.take();
                    self.check_function_body(None, std::slice::from_ref(param), None, body, false);
                    self.current_this = saved_this;
                    let exists = key.static_name().is_some_and(|name| shape.property(&name).is_some());
                    if !exists {
                        let ty = self.param_type(param);
                        self.add_literal_member(&mut shape, key, ty);
                    }
                }
                ObjectProperty::Spread(expr) => match self.check_expr(expr) {
                    Type::Object(spread) => {
                        for prop in &spread.properties {
                            shape.set_property(prop.clone());
                        }
                        shape.closed &= spread.closed;
                    }
                    _ => shape.closed = false,
                },
            }
        }
        Type::object(shape)
    }

    fn add_literal_member(&mut self, shape: &mut Shape, key: &PropertyName, ty: Type) {
        if let PropertyName::Computed(expr) = key {
            self.check_expr(expr);
        }
        match key.static_name() {
            Some(name) => shape.set_property(PropertySig::new(name, ty)),
            None => shape.closed = false,
        }
    }

    fn check_arrow(
        &mut self,
        type_params: Option<&[TypeParam]>,
        params: &[Param],
        return_type: Option<&Node<AstType>>,
        body: &ArrowBody,
        is_async: bool,
    ) -> Type {
        let mut sig = self.params_signature(type_params, params, return_type);
        match body {
            ArrowBody::Block(block) => {
                self.check_function_body(type_params, params, return_type, block, is_async)
            }
            ArrowBody::Expr(expr) => {
                self.env.push_scope();
                self.declare_type_params(type_params);
                self.bind_params(params);
                let saved_return = self.current_return_type.take();
                let body_type = self.check_expr(expr);
                self.current_return_type = saved_return;
                self.env.pop_scope();

                // async bodies are wrapped in a promise
                match return_type {
                    None if !is_async => sig.return_type = body_type.widen(),
                    Some(_) if !is_async && !TypeHelpers::is_assignable(&body_type, &sig.return_type) => {
                        let target = sig.return_type.clone();
                        self.report_not_assignable(&body_type, &target, &expr.value, expr.span);
                    }
                    _ => {}
                }
            }
        }
        Type::function(sig)
    }

    /// Reports TS2322 for `source` flowing from `expr` into `target`.
    pub(crate) fn report_not_assignable(&mut self, source: &Type, target: &Type, expr: &Expr, span: Span) {
        self.report(
            TypeErrorKind::NotAssignable {
                source_type: describe_source(source, target, expr),
                target: self.display_type(target),
            },
            span,
        );
    }
}

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Number { value, .. } => Type::Literal(LiteralType::Number(*value)),
        Literal::String { value, .. } => Type::Literal(LiteralType::String(value.clone())),
        Literal::Boolean(b) => Type::Literal(LiteralType::Boolean(*b)),
        Literal::Null => Type::Null,
        Literal::RegExp { .. } => Type::Any,
    }
}

/// Literals written in place are shown widened; values read from a name
/// keep their declared literal type.
fn describe_source(source: &Type, target: &Type, expr: &Expr) -> String {
    if is_fresh(expr) {
        TypeHelpers::display_source(source, target)
    } else {
        source.to_string()
    }
}

fn is_fresh(expr: &Expr) -> bool {
    match expr {
        Expr::Paren(inner) => is_fresh(&inner.value),
        Expr::Literal(_)
        | Expr::Template { .. }
        | Expr::Unary { .. }
        | Expr::Binary { .. }
        | Expr::Ternary { .. }
        | Expr::Array(_)
        | Expr::Object(_) => true,
        _ => false,
    }
}

fn arity_matches(sig: &Signature, count: usize) -> bool {
    count >= sig.min_args() && sig.max_args().map_or(true, |max| count <= max)
}

fn is_string_like(ty: &Type) -> bool {
    matches!(ty, Type::String | Type::Literal(LiteralType::String(_)))
}

fn is_number_like(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Number | Type::Enum(_) | Type::Literal(LiteralType::Number(_))
    )
}

/// Types whose values are known to have no call signature.
fn is_known_non_callable(ty: &Type) -> bool {
    match ty {
        Type::Number
        | Type::String
        | Type::Boolean
        | Type::Literal(_)
        | Type::Array(_)
        | Type::Tuple(_)
        | Type::Enum(_) => true,
        Type::Object(shape) => {
            shape.closed
                && shape.call_signatures.is_empty()
                && shape.name.as_deref() != Some("Function")
                && shape.property("apply").is_none()
        }
        _ => false,
    }
}

fn index_type(object: &Type, index: &Expr) -> Type {
    match (object, index.unwrap_transparent()) {
        (Type::Array(elem), _) => (**elem).clone(),
        (Type::Tuple(elems), Expr::Literal(Literal::Number { value, .. })) => {
            elems.get(*value as usize).cloned().unwrap_or(Type::Any)
        }
        (Type::Object(shape), Expr::Literal(Literal::String { value, .. })) => shape
            .property(value)
            .map(|prop| prop.ty.clone())
            .or_else(|| shape.index.clone())
            .unwrap_or(Type::Any),
        (Type::Object(shape), _) => shape.index.clone().unwrap_or(Type::Any),
        _ => Type::Any,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::{codes, messages};

    #[test]
    fn test_unknown_names() {
        assert_eq!(codes("let a = b;\n"), vec![2304]);
        assert_eq!(codes("interface I {}\nlet a = I;\n"), vec![2693]);
        assert_eq!(codes("let u = undefined;\nconsole.log(u);\n"), Vec::<u32>::new());
    }

    #[test]
    fn test_property_access() {
        let source = "const p = { x: 1 };\np.y;\np.toString();\n";
        assert_eq!(
            messages(source),
            vec!["Property 'y' does not exist on type '{ x: number; }'.".to_string()]
        );
        assert_eq!(codes("const s = 'abc';\nconst n: number = s.length;\n"), Vec::<u32>::new());
    }

    #[test]
    fn test_call_arity_and_arguments() {
        let source = "function f(a: number, b?: string) {}\nf();\nf(1, 'x', 2);\nf('x');\n";
        assert_eq!(
            messages(source),
            vec![
                "Expected 1-2 arguments, but got 0.".to_string(),
                "Expected 1-2 arguments, but got 3.".to_string(),
                "Argument of type 'string' is not assignable to parameter of type 'number'.".to_string(),
            ]
        );
    }

    #[test]
    fn test_callability() {
        assert_eq!(codes("class A {}\nA();\n"), vec![2348]);
        assert_eq!(codes("const n = 1;\nn();\n"), vec![2349]);
        assert_eq!(codes("const o = { a: 1 };\nnew o();\n"), vec![2351]);
        assert_eq!(codes("function F() {}\nnew F();\n"), Vec::<u32>::new());
    }

    #[test]
    fn test_constant_assignment() {
        assert_eq!(codes("const c = 1;\nc = 2;\nc++;\n"), vec![2588, 2588]);
        assert_eq!(codes("let x = 1;\nx = 'a';\n"), vec![2322]);
    }

    #[test]
    fn test_arrow_inference() {
        let source = "const f = (x: number) => x * 2;\nconst s: string = f(1);\n";
        assert_eq!(
            messages(source),
            vec!["Type 'number' is not assignable to type 'string'.".to_string()]
        );
    }
}
