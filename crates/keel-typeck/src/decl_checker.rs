//! Declaration checking methods

use std::collections::HashSet;

use keel_ast::{
    ClassDecl, ClassMember, Decl, EnumDecl, Expr, FunctionDecl, FunctionTypeParam, Ident,
    InterfaceDecl, Node, ObjectTypeMember, Param, PropertyName, Span, Type as AstType, TypeParam,
};

use crate::checker::TypeChecker;
use crate::env::{Symbol, SymbolKind};
use crate::error::TypeErrorKind;
use crate::helpers::TypeHelpers;
use crate::types::{ParamSig, PropertySig, Shape, Signature, Type};

impl TypeChecker {
    pub(crate) fn check_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Function(func) => self.check_function_decl(func),
            Decl::Class(class) => self.check_class_decl(class),
            Decl::Enum(enum_decl) => self.check_enum_decl(enum_decl),
            Decl::Var(var_decl) => self.check_var_decl(var_decl),
            // Interfaces and aliases are resolved while hoisting; namespaces
            // are checked there too
            Decl::Interface(_) | Decl::TypeAlias(_) | Decl::Module(_) => {}
        }
    }

    fn check_function_decl(&mut self, func: &FunctionDecl) {
        let Some(body) = &func.body else {
            return;
        };
        self.check_function_body(
            func.type_params.as_deref(),
            &func.params,
            func.return_type.as_deref(),
            body,
            func.is_async || func.is_generator,
        );
    }

    /// Checks a function body in its own scope. Returns are not checked
    /// against the declared type for async functions and generators.
    pub(crate) fn check_function_body(
        &mut self,
        type_params: Option<&[TypeParam]>,
        params: &[Param],
        return_type: Option<&Node<AstType>>,
        body: &Node<keel_ast::BlockStmt>,
        wraps_return: bool,
    ) {
        self.env.push_scope();
        self.declare_type_params(type_params);
        self.env
            .declare("arguments", Symbol::value(SymbolKind::Var, Type::Any));
        self.bind_params(params);

        let declared = return_type.map(|ty| self.resolve_type(ty));
        let prev_return_type = std::mem::replace(
            &mut self.current_return_type,
            if wraps_return { None } else { declared },
        );

        let mut hoisted = Vec::new();
        crate::checker::collect_function_hoisted(&body.value.stmts, &mut hoisted);
        self.hoist(&hoisted);
        self.check_stmts(&body.value.stmts);

        self.current_return_type = prev_return_type;
        self.env.pop_scope();
    }

    pub(crate) fn bind_params(&mut self, params: &[Param]) {
        for param in params {
            for decorator in &param.decorators {
                self.check_expr(decorator);
            }
            let ty = self.param_type(param);
            self.bind_pattern(&param.pattern.value, ty, Some(SymbolKind::Param));
        }
    }

    pub(crate) fn param_type(&mut self, param: &Param) -> Type {
        match &param.type_annotation {
            Some(annotation) => self.resolve_type(annotation),
            None if param.is_rest => Type::Array(Box::new(Type::Any)),
            None => Type::Any,
        }
    }

    pub(crate) fn declare_type_params(&mut self, type_params: Option<&[TypeParam]>) {
        for param in type_params.unwrap_or_default() {
            let name = param.name.value.name.clone();
            self.env.declare(
                name.clone(),
                Symbol::type_only(SymbolKind::TypeParam, Type::TypeParam(name)),
            );
        }
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Signature of a function, method or constructor declaration.
    pub(crate) fn params_signature(
        &mut self,
        type_params: Option<&[TypeParam]>,
        params: &[Param],
        return_type: Option<&Node<AstType>>,
    ) -> Signature {
        self.env.push_scope();
        self.declare_type_params(type_params);

        let mut sig_params = Vec::new();
        for (index, param) in params.iter().enumerate() {
            let name = match param.pattern.value.as_ident() {
                Some(ident) => ident.value.name.clone(),
                None => format!("__{}", index),
            };
            if name == "this" {
                continue;
            }
            sig_params.push(ParamSig {
                ty: self.param_type(param),
                optional: param.optional || param.default_value().is_some(),
                is_rest: param.is_rest,
                name,
            });
        }
        let return_type = return_type
            .map(|ty| self.resolve_type(ty))
            .unwrap_or(Type::Any);

        self.env.pop_scope();
        Signature {
            params: sig_params,
            return_type,
            has_type_params: type_params.is_some_and(|params| !params.is_empty()),
        }
    }

    /// Signature written in type position.
    pub(crate) fn type_signature(
        &mut self,
        type_params: Option<&[TypeParam]>,
        params: &[FunctionTypeParam],
        return_type: Option<&Node<AstType>>,
    ) -> Signature {
        self.env.push_scope();
        self.declare_type_params(type_params);

        let mut sig_params = Vec::new();
        for (index, param) in params.iter().enumerate() {
            let name = match &param.name {
                Some(ident) => ident.value.name.clone(),
                None => format!("__{}", index),
            };
            if name == "this" {
                continue;
            }
            sig_params.push(ParamSig {
                ty: self.resolve_type(&param.ty),
                optional: param.optional,
                is_rest: param.is_rest,
                name,
            });
        }
        let return_type = return_type
            .map(|ty| self.resolve_type(ty))
            .unwrap_or(Type::Any);

        self.env.pop_scope();
        Signature {
            params: sig_params,
            return_type,
            has_type_params: type_params.is_some_and(|params| !params.is_empty()),
        }
    }

    // =========================================================================
    // Type annotations
    // =========================================================================

    pub(crate) fn resolve_type(&mut self, ty: &Node<AstType>) -> Type {
        match &ty.value {
            AstType::Primitive(prim) => TypeHelpers::convert_primitive(*prim),
            AstType::Array(elem) => Type::Array(Box::new(self.resolve_type(elem))),
            AstType::Tuple(elems) => Type::Tuple(elems.iter().map(|e| self.resolve_type(e)).collect()),
            AstType::Union(members) => {
                let members: Vec<Type> = members.iter().map(|m| self.resolve_type(m)).collect();
                Type::union(members)
            }
            AstType::Intersection(members) => {
                let members: Vec<Type> = members.iter().map(|m| self.resolve_type(m)).collect();
                intersect(members)
            }
            AstType::Function(func) => Type::function(self.type_signature(
                func.type_params.as_deref(),
                &func.params,
                Some(&*func.return_type),
            )),
            AstType::Constructor(func) => {
                let sig = self.type_signature(
                    func.type_params.as_deref(),
                    &func.params,
                    Some(&*func.return_type),
                );
                Type::object(Shape {
                    construct_signatures: vec![sig],
                    closed: true,
                    ..Shape::default()
                })
            }
            AstType::TypeRef { name, type_args } => self.resolve_type_ref(name, type_args.as_deref()),
            AstType::Object(object) => {
                let mut shape = Shape {
                    closed: true,
                    ..Shape::default()
                };
                self.add_object_members(&mut shape, &object.members);
                Type::object(shape)
            }
            AstType::Literal(lit) => Type::Literal(TypeHelpers::convert_literal_type(lit)),
            AstType::Paren(inner) => self.resolve_type(inner),
            AstType::TypeQuery(name) => self.resolve_type_query(name),
            AstType::Predicate { .. } => Type::Boolean,
            AstType::Conditional { .. }
            | AstType::Mapped { .. }
            | AstType::IndexedAccess { .. }
            | AstType::Keyof(_) => Type::Any,
        }
    }

    fn resolve_type_ref(&mut self, name: &Node<Ident>, type_args: Option<&[Node<AstType>]>) -> Type {
        let mut args: Vec<Type> = type_args
            .unwrap_or_default()
            .iter()
            .map(|arg| self.resolve_type(arg))
            .collect();
        let text = name.value.name.as_str();

        if matches!(text, "Array" | "ReadonlyArray") && args.len() == 1 {
            return Type::Array(Box::new(args.remove(0)));
        }
        // `as const`
        if text == "const" {
            return Type::Any;
        }

        if let Some((first, rest)) = text.split_once('.') {
            return self.resolve_qualified_type(first, rest);
        }
        if let Some(ty) = self.env.lookup_type(text) {
            return ty.clone();
        }
        self.report(TypeErrorKind::CannotFindName(text.to_string()), name.span);
        Type::Any
    }

    /// `ns.Inner.T`, walked through namespace exports.
    fn resolve_qualified_type(&self, first: &str, rest: &str) -> Type {
        let Some(mut exports) = self.env.lookup_namespace(first) else {
            return Type::Any;
        };
        let mut parts: Vec<&str> = rest.split('.').collect();
        let Some(last) = parts.pop() else {
            return Type::Any;
        };
        for part in parts {
            match exports.namespaces.get(part).cloned() {
                Some(inner) => exports = inner,
                None => return Type::Any,
            }
        }
        exports.types.get(last).cloned().unwrap_or(Type::Any)
    }

    fn resolve_type_query(&mut self, name: &Node<Ident>) -> Type {
        let mut parts = name.value.name.split('.');
        let first = parts.next().unwrap_or_default();
        let Some(mut ty) = self.env.lookup_value(first).and_then(|s| s.value.clone()) else {
            if first != "this" {
                self.report(TypeErrorKind::CannotFindName(first.to_string()), name.span);
            }
            return Type::Any;
        };
        for part in parts {
            ty = property_type(&ty, part).unwrap_or(Type::Any);
        }
        ty
    }

    pub(crate) fn add_object_members(&mut self, shape: &mut Shape, members: &[ObjectTypeMember]) {
        for member in members {
            match member {
                ObjectTypeMember::Property {
                    name, ty, optional, ..
                } => {
                    let Some(key) = name.static_name() else {
                        shape.closed = false;
                        continue;
                    };
                    let ty = ty.as_ref().map(|t| self.resolve_type(t)).unwrap_or(Type::Any);
                    shape.set_property(PropertySig {
                        name: key,
                        ty,
                        optional: *optional,
                        is_method: false,
                    });
                }
                ObjectTypeMember::Method {
                    name,
                    type_params,
                    params,
                    return_type,
                    optional,
                } => {
                    let sig = self.type_signature(type_params.as_deref(), params, return_type.as_ref());
                    match name.static_name() {
                        Some(key) => add_method(shape, key, sig, *optional, true),
                        None => shape.closed = false,
                    }
                }
                ObjectTypeMember::IndexSignature { value_type, .. } => {
                    shape.index = Some(self.resolve_type(value_type));
                }
                ObjectTypeMember::CallSignature {
                    type_params,
                    params,
                    return_type,
                } => {
                    let sig = self.type_signature(type_params.as_deref(), params, return_type.as_ref());
                    shape.call_signatures.push(sig);
                }
                ObjectTypeMember::ConstructSignature {
                    type_params,
                    params,
                    return_type,
                } => {
                    let sig = self.type_signature(type_params.as_deref(), params, return_type.as_ref());
                    shape.construct_signatures.push(sig);
                }
            }
        }
    }

    // =========================================================================
    // Hoisted declarations
    // =========================================================================

    /// Computes interfaces, aliases, enums and classes of one scope.
    pub(crate) fn declare_type_decls(&mut self, decls: &[&Decl]) {
        let mut interfaces: Vec<(&str, Vec<&InterfaceDecl>)> = Vec::new();
        for decl in decls {
            if let Decl::Interface(interface) = decl {
                let name = interface.name.value.name.as_str();
                match interfaces.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, group)) => group.push(interface),
                    None => interfaces.push((name, vec![interface])),
                }
            }
        }

        let mut interface_types = Vec::new();
        for (name, group) in &interfaces {
            let ty = self.interface_type(name, group);
            self.env
                .declare(*name, Symbol::type_only(SymbolKind::Interface, ty.clone()));
            interface_types.push((*name, ty));
        }

        for decl in decls {
            match decl {
                Decl::TypeAlias(alias) => {
                    self.env.push_scope();
                    self.declare_type_params(alias.type_params.as_deref());
                    let mut ty = self.resolve_type(&alias.ty);
                    self.env.pop_scope();

                    let generic = alias.type_params.as_ref().is_some_and(|p| !p.is_empty());
                    if matches!(ty, Type::Union(_)) && !generic {
                        self.alias_names.push((ty.clone(), alias.name.value.name.clone()));
                    }
                    if let Type::Object(shape) = &mut ty {
                        if shape.name.is_none() && !shape.properties.is_empty() {
                            shape.name = Some(alias.name.value.name.clone());
                        }
                    }
                    self.env.declare(
                        alias.name.value.name.clone(),
                        Symbol::type_only(SymbolKind::TypeAlias, ty),
                    );
                }
                Decl::Enum(enum_decl) => self.declare_enum(enum_decl),
                Decl::Class(class) => {
                    let merged = interface_types
                        .iter()
                        .find(|(name, _)| *name == class.name.value.name)
                        .map(|(_, ty)| ty.clone());
                    self.declare_class(class, merged);
                }
                _ => {}
            }
        }
    }

    fn interface_type(&mut self, name: &str, decls: &[&InterfaceDecl]) -> Type {
        let mut shape = Shape::named(name);
        for decl in decls {
            self.env.push_scope();
            self.declare_type_params(decl.type_params.as_deref());
            self.add_object_members(&mut shape, &decl.members);
            for base in &decl.extends {
                match self.resolve_type(base) {
                    Type::Object(base) => inherit(&mut shape, &base),
                    _ => shape.closed = false,
                }
            }
            self.env.pop_scope();
        }
        Type::object(shape)
    }

    fn declare_enum(&mut self, decl: &EnumDecl) {
        let name = decl.name.value.name.clone();
        let object_name = format!("typeof {}", name);

        // Enum declarations of one name merge their members
        let mut shape = match self
            .env
            .lookup_in_current_scope(&name)
            .and_then(|symbol| symbol.value.clone())
        {
            Some(Type::Object(shape)) if shape.name.as_deref() == Some(object_name.as_str()) => *shape,
            _ => Shape::named(object_name),
        };
        for member in &decl.members {
            shape.set_property(PropertySig::new(
                member.name.value.name.clone(),
                Type::Enum(name.clone()),
            ));
        }

        self.env.declare(
            name.clone(),
            Symbol {
                kind: SymbolKind::Enum,
                value: Some(Type::object(shape)),
                ty: Some(Type::Enum(name)),
                exports: None,
            },
        );
    }

    /// Binds the instance type and the constructor (`typeof C`) of a class.
    fn declare_class(&mut self, class: &ClassDecl, merged_interface: Option<Type>) {
        let name = class.name.value.name.clone();
        self.env.push_scope();
        self.declare_type_params(class.type_params.as_deref());

        let mut instance = Shape::named(name.clone());
        let mut constructor = Shape::named(format!("typeof {}", name));
        let mut inherited_construct = None;

        if let Some(extends) = &class.extends {
            let base = self.entity_value(&extends.base.value);
            match base.as_ref().and_then(Type::as_shape) {
                Some(base_ctor) if !base_ctor.construct_signatures.is_empty() => {
                    match base_ctor.construct_signatures[0].return_type.as_shape() {
                        Some(base_instance) => {
                            instance.properties = base_instance.properties.clone();
                            instance.index = base_instance.index.clone();
                            instance.closed = base_instance.closed;
                        }
                        None => instance.closed = false,
                    }
                    constructor.properties = base_ctor
                        .properties
                        .iter()
                        .filter(|p| p.name != "prototype")
                        .cloned()
                        .collect();
                    constructor.closed = base_ctor.closed;
                    inherited_construct = Some(base_ctor.construct_signatures.clone());
                }
                _ => {
                    instance.closed = false;
                    constructor.closed = false;
                }
            }
        }

        let mut constructor_params = None;
        let mut own_methods = HashSet::new();
        for member in &class.members {
            match &member.value {
                ClassMember::Constructor { params, .. } => {
                    constructor_params = Some(params);
                    for param in params.iter().filter(|p| p.is_parameter_property()) {
                        if let Some(ident) = param.pattern.value.as_ident() {
                            let ty = self.param_type(param);
                            instance.set_property(PropertySig {
                                optional: param.optional,
                                ..PropertySig::new(ident.value.name.clone(), ty)
                            });
                        }
                    }
                }
                ClassMember::Property {
                    name,
                    type_annotation,
                    init,
                    is_static,
                    is_optional,
                    ..
                } => {
                    let target = if *is_static { &mut constructor } else { &mut instance };
                    let Some(key) = name.static_name() else {
                        target.closed = false;
                        continue;
                    };
                    let ty = match type_annotation {
                        Some(annotation) => self.resolve_type(annotation),
                        None => init
                            .as_ref()
                            .map(|init| initializer_hint(&init.value))
                            .unwrap_or(Type::Any),
                    };
                    target.set_property(PropertySig {
                        optional: *is_optional,
                        ..PropertySig::new(key, ty)
                    });
                }
                ClassMember::Method {
                    name,
                    type_params,
                    params,
                    return_type,
                    is_static,
                    is_optional,
                    ..
                } => {
                    let sig = self.params_signature(type_params.as_deref(), params, return_type.as_deref());
                    let target = if *is_static { &mut constructor } else { &mut instance };
                    match name.static_name() {
                        Some(key) => {
                            // an inherited method of this name is overridden, not overloaded
                            let overload = !own_methods.insert((*is_static, key.clone()));
                            add_method(target, key, sig, *is_optional, overload)
                        }
                        None => target.closed = false,
                    }
                }
                ClassMember::Getter {
                    name,
                    return_type,
                    is_static,
                    ..
                } => {
                    let ty = return_type
                        .as_ref()
                        .map(|ty| self.resolve_type(ty))
                        .unwrap_or(Type::Any);
                    let target = if *is_static { &mut constructor } else { &mut instance };
                    match name.static_name() {
                        Some(key) => target.set_property(PropertySig::new(key, ty)),
                        None => target.closed = false,
                    }
                }
                ClassMember::Setter {
                    name,
                    param,
                    is_static,
                    ..
                } => {
                    let ty = self.param_type(param);
                    let target = if *is_static { &mut constructor } else { &mut instance };
                    match name.static_name() {
                        // a getter of the same name decides the type
                        Some(key) if target.property(&key).is_none() => {
                            target.properties.push(PropertySig::new(key, ty))
                        }
                        Some(_) => {}
                        None => target.closed = false,
                    }
                }
                ClassMember::IndexSignature { value_type, .. } => {
                    instance.index = Some(self.resolve_type(value_type));
                }
            }
        }

        if let Some(Type::Object(extra)) = merged_interface {
            inherit(&mut instance, &extra);
        }

        let instance_type = Type::object(instance);
        let has_type_params = class.type_params.as_ref().is_some_and(|p| !p.is_empty());
        let construct = match (constructor_params, inherited_construct) {
            (Some(params), _) => vec![self.params_signature(None, params, None)],
            (None, Some(inherited)) => inherited,
            (None, None) => vec![Signature::new(vec![], Type::Any)],
        };
        constructor.construct_signatures = construct
            .into_iter()
            .map(|sig| Signature {
                return_type: instance_type.clone(),
                has_type_params: has_type_params || sig.has_type_params,
                ..sig
            })
            .collect();
        constructor
            .properties
            .push(PropertySig::new("prototype", instance_type.clone()));

        self.env.pop_scope();
        self.env.declare(
            name,
            Symbol {
                kind: SymbolKind::Class,
                value: Some(Type::object(constructor)),
                ty: Some(instance_type),
                exports: None,
            },
        );
    }

    /// Binds function declarations; overloads become one shape with every
    /// signature but the implementation.
    pub(crate) fn declare_functions(&mut self, funcs: &[&FunctionDecl]) {
        let mut groups: Vec<(&str, Vec<&FunctionDecl>)> = Vec::new();
        for func in funcs {
            let name = func.name.value.name.as_str();
            match groups.iter_mut().find(|(n, _)| *n == name) {
                Some((_, group)) => group.push(func),
                None => groups.push((name, vec![func])),
            }
        }

        for (name, group) in groups {
            let overloads: Vec<&FunctionDecl> =
                group.iter().copied().filter(|f| f.body.is_none()).collect();
            let decls = if overloads.is_empty() { group } else { overloads };

            let mut signatures: Vec<Signature> = decls
                .iter()
                .map(|f| {
                    self.params_signature(f.type_params.as_deref(), &f.params, f.return_type.as_deref())
                })
                .collect();
            let ty = match signatures.len() {
                1 => Type::function(signatures.remove(0)),
                _ => Type::object(Shape {
                    call_signatures: signatures,
                    ..Shape::default()
                }),
            };
            self.env.declare(name, Symbol::value(SymbolKind::Function, ty));
        }
    }

    /// Value of an entity name expression (`a` or `a.b.c`) without
    /// reporting anything.
    pub(crate) fn entity_value(&self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::Ident(ident) => self.env.lookup_value(&ident.name).and_then(|s| s.value.clone()),
            Expr::Member { object, property } => {
                let object = self.entity_value(&object.value)?;
                if object.is_any_like() {
                    return Some(Type::Any);
                }
                property_type(&object, &property.value.name)
            }
            Expr::Paren(inner) => self.entity_value(&inner.value),
            _ => None,
        }
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    pub(crate) fn check_class_decl(&mut self, class: &ClassDecl) {
        self.check_decorators(&class.decorators, class.name.span);
        if let Some(extends) = &class.extends {
            self.check_expr(&extends.base);
        }
        for implemented in &class.implements {
            self.resolve_type(implemented);
        }

        let name = &class.name.value.name;
        let instance = self.env.lookup_type(name).cloned();
        let constructor = self.env.lookup_value(name).and_then(|s| s.value.clone());

        self.env.push_scope();
        self.declare_type_params(class.type_params.as_deref());

        for member in &class.members {
            let this_type = if member.value.is_static() {
                constructor.clone()
            } else {
                instance.clone()
            };
            let saved_this = std::mem::replace(&mut self.current_this, this_type);

            if let Some(name) = member.value.name() {
                self.check_decorators(member.value.decorators(), property_name_span(name, member.span));
            }

            match &member.value {
                ClassMember::Property {
                    name,
                    type_annotation,
                    init: Some(init),
                    ..
                } => {
                    let source = self.check_expr(init);
                    if let Some(annotation) = type_annotation {
                        let target = self.resolve_type(annotation);
                        if !TypeHelpers::is_assignable(&source, &target) {
                            self.report_not_assignable(
                                &source,
                                &target,
                                &init.value,
                                property_name_span(name, member.span),
                            );
                        }
                    }
                }
                ClassMember::Method {
                    type_params,
                    params,
                    return_type,
                    body: Some(body),
                    is_async,
                    is_generator,
                    ..
                } => self.check_function_body(
                    type_params.as_deref(),
                    params,
                    return_type.as_deref(),
                    body,
                    *is_async || *is_generator,
                ),
                ClassMember::Constructor {
                    params,
                    body: Some(body),
                    ..
                } => self.check_function_body(None, params, None, body, false),
                ClassMember::Getter {
                    return_type,
                    body: Some(body),
                    ..
                } => self.check_function_body(None, &[], return_type.as_deref(), body, false),
                ClassMember::Setter {
                    param,
                    body: Some(body),
                    ..
                } => self.check_function_body(None, std::slice::from_ref(param), None, body, false),
                _ => {}
            }

            self.current_this = saved_this;
        }

        self.env.pop_scope();
    }

    fn check_enum_decl(&mut self, decl: &EnumDecl) {
        // Members are in scope unqualified inside initializers
        self.env.push_scope();
        let enum_type = Type::Enum(decl.name.value.name.clone());
        for member in &decl.members {
            self.env.declare(
                member.name.value.name.clone(),
                Symbol::value(SymbolKind::Const, enum_type.clone()),
            );
        }
        for member in &decl.members {
            if let Some(init) = &member.init {
                self.check_expr(init);
            }
        }
        self.env.pop_scope();
    }

    fn check_decorators(&mut self, decorators: &[Node<Expr>], name_span: Span) {
        if decorators.is_empty() {
            return;
        }
        if !self.options.experimental_decorators {
            self.report(TypeErrorKind::ExperimentalDecorators, name_span);
        }
        for decorator in decorators {
            self.check_expr(decorator);
        }
    }
}

// =============================================================================
// Shape helpers
// =============================================================================

/// Type of a known property, looking through object shapes only.
pub(crate) fn property_type(ty: &Type, name: &str) -> Option<Type> {
    let shape = ty.as_shape()?;
    match shape.property(name) {
        Some(prop) => Some(prop.ty.clone()),
        None => shape.index.clone(),
    }
}

pub(crate) fn property_name_span(name: &PropertyName, fallback: Span) -> Span {
    match name {
        PropertyName::Ident(ident) => ident.span,
        _ => fallback,
    }
}

/// Copies members `shape` does not declare itself from `base`.
fn inherit(shape: &mut Shape, base: &Shape) {
    for prop in &base.properties {
        if shape.property(&prop.name).is_none() {
            shape.properties.push(prop.clone());
        }
    }
    if shape.call_signatures.is_empty() {
        shape.call_signatures = base.call_signatures.clone();
    }
    if shape.construct_signatures.is_empty() {
        shape.construct_signatures = base.construct_signatures.clone();
    }
    if shape.index.is_none() {
        shape.index = base.index.clone();
    }
    shape.closed &= base.closed;
}

/// Adds a method signature. With `overload`, a method already present under
/// `name` becomes an overload set instead of being replaced.
fn add_method(shape: &mut Shape, name: String, sig: Signature, optional: bool, overload: bool) {
    let existing = shape.properties.iter_mut().find(|p| overload && p.name == name);
    if let Some(existing) = existing {
        let overloaded = match &existing.ty {
            Type::Function(_) => existing.is_method,
            Type::Object(set) => set.name.is_none() && !set.call_signatures.is_empty(),
            _ => false,
        };
        if overloaded {
            let mut signatures = match std::mem::replace(&mut existing.ty, Type::Any) {
                Type::Function(first) => vec![*first],
                Type::Object(set) => set.call_signatures,
                _ => Vec::new(),
            };
            signatures.push(sig);
            existing.ty = Type::object(Shape {
                call_signatures: signatures,
                ..Shape::default()
            });
            existing.is_method = false;
            return;
        }
    }
    shape.set_property(PropertySig {
        optional,
        ..PropertySig::method(name, sig)
    });
}

/// Type of an unannotated property from the shape of its initializer.
fn initializer_hint(init: &Expr) -> Type {
    match init.unwrap_transparent() {
        Expr::Literal(keel_ast::Literal::Number { .. }) => Type::Number,
        Expr::Literal(keel_ast::Literal::String { .. }) | Expr::Template { .. } => Type::String,
        Expr::Literal(keel_ast::Literal::Boolean(_)) => Type::Boolean,
        Expr::Array(_) => Type::Array(Box::new(Type::Any)),
        _ => Type::Any,
    }
}

/// Intersection of object shapes; anything else intersects to `any`.
fn intersect(members: Vec<Type>) -> Type {
    let mut merged = Shape {
        closed: true,
        ..Shape::default()
    };
    for member in members {
        match member {
            Type::Object(shape) => inherit(&mut merged, &shape),
            _ => return Type::Any,
        }
    }
    Type::object(merged)
}
