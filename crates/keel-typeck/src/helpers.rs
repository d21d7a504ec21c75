//! Helper methods for type conversion and checking

use keel_ast::{PrimitiveType, PropertyName};

use crate::types::{LiteralType, Shape, Signature, Type};

/// Members every string value has, for relating strings to object types.
const STRING_MEMBERS: &[&str] = &[
    "length", "charAt", "charCodeAt", "concat", "indexOf", "lastIndexOf", "slice", "substring",
    "substr", "split", "toLowerCase", "toUpperCase", "trim", "replace", "match", "search",
    "toString", "valueOf", "localeCompare",
];

const NUMBER_MEMBERS: &[&str] = &["toFixed", "toExponential", "toPrecision", "toString", "valueOf"];

/// Members of every function value.
pub(crate) const FUNCTION_MEMBERS: &[&str] = &[
    "apply", "call", "bind", "length", "name", "prototype", "toString", "arguments", "caller",
];

/// Members inherited from `Object.prototype`.
pub(crate) const OBJECT_MEMBERS: &[&str] = &[
    "constructor",
    "toString",
    "toLocaleString",
    "valueOf",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
];

/// Structural comparisons stop here and assume success.
const MAX_DEPTH: usize = 8;

/// Helper methods for type conversion and checking
pub struct TypeHelpers;

impl TypeHelpers {
    pub fn convert_primitive(prim: PrimitiveType) -> Type {
        match prim {
            PrimitiveType::Number => Type::Number,
            PrimitiveType::String => Type::String,
            PrimitiveType::Boolean => Type::Boolean,
            PrimitiveType::Symbol => Type::Symbol,
            PrimitiveType::Object => Type::NonPrimitive,
            PrimitiveType::Void => Type::Void,
            PrimitiveType::Null => Type::Null,
            PrimitiveType::Undefined => Type::Undefined,
            PrimitiveType::Any => Type::Any,
            PrimitiveType::Never => Type::Never,
            PrimitiveType::Unknown => Type::Unknown,
        }
    }

    pub fn convert_literal_type(lit: &keel_ast::LiteralType) -> LiteralType {
        match lit {
            keel_ast::LiteralType::String(s) => LiteralType::String(s.clone()),
            keel_ast::LiteralType::Number(n) => LiteralType::Number(*n),
            keel_ast::LiteralType::Boolean(b) => LiteralType::Boolean(*b),
        }
    }

    /// Statically known property name; computed keys have none.
    pub fn property_name_to_string(name: &PropertyName) -> Option<String> {
        name.static_name()
    }

    /// Spelling of the expected argument count in TS2554.
    pub fn expected_arguments(signatures: &[&Signature]) -> String {
        let min = signatures.iter().map(|s| s.min_args()).min().unwrap_or(0);
        let max = signatures
            .iter()
            .map(|s| s.max_args())
            .try_fold(0usize, |acc, max| max.map(|m| acc.max(m)));
        match max {
            None => format!("at least {}", min),
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{}-{}", min, max),
        }
    }

    /// Source type as shown in a "not assignable" message: literals are
    /// widened unless the target itself mentions literal types.
    pub fn display_source(source: &Type, target: &Type) -> String {
        if target.contains_literal() {
            source.to_string()
        } else {
            source.widen_literals().to_string()
        }
    }

    pub fn is_assignable(source: &Type, target: &Type) -> bool {
        Self::assignable_at(source, target, 0)
    }

    fn assignable_at(source: &Type, target: &Type, depth: usize) -> bool {
        if depth > MAX_DEPTH || source == target {
            return true;
        }

        match (source, target) {
            (s, t) if s.is_any_like() || t.is_any_like() => true,
            (_, Type::Unknown) => true,
            (Type::Never, _) => true,
            // null and undefined belong to every type without strict null checks
            (Type::Null | Type::Undefined, _) => true,
            (Type::Void, Type::Undefined) => true,
            (_, Type::Void) => matches!(source, Type::Undefined),

            (Type::Union(members), _) => members
                .iter()
                .all(|member| Self::assignable_at(member, target, depth + 1)),
            (_, Type::Union(members)) => members
                .iter()
                .any(|member| Self::assignable_at(source, member, depth + 1)),

            (Type::Literal(LiteralType::String(_)), Type::String)
            | (Type::Literal(LiteralType::Number(_)), Type::Number)
            | (Type::Literal(LiteralType::Boolean(_)), Type::Boolean) => true,
            (Type::Literal(_), Type::Literal(_)) => false,

            // enums and numbers relate in both directions
            (Type::Enum(_), Type::Number) | (Type::Number, Type::Enum(_)) => true,
            (Type::Literal(LiteralType::Number(_)), Type::Enum(_)) => true,
            (Type::Enum(_), Type::Literal(LiteralType::Number(_))) => true,

            (Type::Array(s), Type::Array(t)) => Self::assignable_at(s, t, depth + 1),
            (Type::Tuple(elems), Type::Array(t)) => {
                elems.iter().all(|e| Self::assignable_at(e, t, depth + 1))
            }
            (Type::Tuple(s), Type::Tuple(t)) => {
                s.len() == t.len()
                    && s.iter()
                        .zip(t.iter())
                        .all(|(a, b)| Self::assignable_at(a, b, depth + 1))
            }
            (Type::Array(_), Type::Tuple(_)) => false,

            (Type::Function(s), Type::Function(t)) => Self::signature_assignable(s, t, depth),

            (_, Type::NonPrimitive) => matches!(
                source,
                Type::Object(_) | Type::Array(_) | Type::Tuple(_) | Type::Function(_) | Type::NonPrimitive
            ),

            (_, Type::Object(target_shape)) => Self::assignable_to_shape(source, target_shape, depth),

            _ => false,
        }
    }

    fn signature_assignable(source: &Signature, target: &Signature, depth: usize) -> bool {
        if source.has_type_params || target.has_type_params {
            return true;
        }
        // A function may ignore trailing parameters it is passed
        if source.min_args() > target.params.len() && target.max_args().is_some() {
            return false;
        }
        let params_ok = source.params.iter().enumerate().all(|(i, param)| {
            match target.param_type(i) {
                // parameters are compared bivariantly
                Some(target_param) => {
                    Self::assignable_at(&target_param, &param.ty, depth + 1)
                        || Self::assignable_at(&param.ty, &target_param, depth + 1)
                }
                None => true,
            }
        });
        params_ok
            && (target.return_type == Type::Void
                || Self::assignable_at(&source.return_type, &target.return_type, depth + 1))
    }

    fn assignable_to_shape(source: &Type, target: &Shape, depth: usize) -> bool {
        // Library interfaces standing for primitives accept their primitive
        match target.name.as_deref() {
            Some("Object") => return true,
            Some("String") if matches!(source, Type::String | Type::Literal(LiteralType::String(_))) => {
                return true
            }
            Some("Number")
                if matches!(source, Type::Number | Type::Enum(_) | Type::Literal(LiteralType::Number(_))) =>
            {
                return true
            }
            Some("Boolean") if matches!(source, Type::Boolean | Type::Literal(LiteralType::Boolean(_))) => {
                return true
            }
            Some("Function") if !source.call_signatures().is_empty() => return true,
            _ => {}
        }

        let required = target
            .properties
            .iter()
            .filter(|p| !p.optional && !OBJECT_MEMBERS.contains(&p.name.as_str()));

        match source {
            Type::Object(source_shape) => {
                for prop in &target.properties {
                    match source_shape.property(&prop.name) {
                        Some(found) => {
                            if !Self::assignable_at(&found.ty, &prop.ty, depth + 1) {
                                return false;
                            }
                        }
                        None if prop.optional || OBJECT_MEMBERS.contains(&prop.name.as_str()) => {}
                        None if source_shape.closed && source_shape.index.is_none() => return false,
                        None => {}
                    }
                }
                if let Some(target_sig) = target.call_signatures.first() {
                    match source_shape.call_signatures.first() {
                        Some(source_sig) => {
                            if !Self::signature_assignable(source_sig, target_sig, depth + 1) {
                                return false;
                            }
                        }
                        None if source_shape.closed => return false,
                        None => {}
                    }
                }
                if !target.construct_signatures.is_empty()
                    && source_shape.construct_signatures.is_empty()
                    && source_shape.closed
                {
                    return false;
                }
                true
            }
            Type::Function(sig) => {
                let props_ok = required
                    .clone()
                    .all(|p| FUNCTION_MEMBERS.contains(&p.name.as_str()));
                let call_ok = target
                    .call_signatures
                    .first()
                    .map_or(true, |t| Self::signature_assignable(sig, t, depth + 1));
                props_ok && call_ok && target.construct_signatures.is_empty()
            }
            Type::String | Type::Literal(LiteralType::String(_)) => {
                Self::only_members(required, STRING_MEMBERS) && target.call_signatures.is_empty()
            }
            Type::Number | Type::Enum(_) | Type::Literal(LiteralType::Number(_)) => {
                Self::only_members(required, NUMBER_MEMBERS) && target.call_signatures.is_empty()
            }
            Type::Boolean | Type::Literal(LiteralType::Boolean(_)) | Type::Symbol => {
                Self::only_members(required, &["toString", "valueOf"])
                    && target.call_signatures.is_empty()
            }
            // arrays carry many members we do not model
            Type::Array(_) | Type::Tuple(_) => target.call_signatures.is_empty(),
            Type::NonPrimitive => target.properties.iter().all(|p| p.optional),
            _ => false,
        }
    }

    fn only_members<'a>(
        mut required: impl Iterator<Item = &'a crate::types::PropertySig>,
        members: &[&str],
    ) -> bool {
        required.all(|p| members.contains(&p.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParamSig, PropertySig};

    fn lit_str(s: &str) -> Type {
        Type::Literal(LiteralType::String(s.into()))
    }

    fn point() -> Type {
        let mut shape = Shape::named("Point");
        shape.properties.push(PropertySig::new("x", Type::Number));
        shape.properties.push(PropertySig::new("y", Type::Number));
        Type::object(shape)
    }

    #[test]
    fn test_primitives_and_literals() {
        assert!(TypeHelpers::is_assignable(&lit_str("a"), &Type::String));
        assert!(!TypeHelpers::is_assignable(&lit_str("a"), &Type::Number));
        assert!(!TypeHelpers::is_assignable(&Type::String, &lit_str("a")));
        assert!(TypeHelpers::is_assignable(&Type::Null, &Type::Number));
        assert!(TypeHelpers::is_assignable(&Type::Undefined, &point()));
        assert!(TypeHelpers::is_assignable(&Type::Any, &Type::Number));
        assert!(TypeHelpers::is_assignable(&Type::Number, &Type::Any));
        assert!(TypeHelpers::is_assignable(&Type::Enum("Color".into()), &Type::Number));
        assert!(TypeHelpers::is_assignable(&Type::Number, &Type::Enum("Color".into())));
        assert!(!TypeHelpers::is_assignable(&Type::Number, &Type::Void));
    }

    #[test]
    fn test_unions() {
        let target = Type::union(vec![Type::String, Type::Number]);
        assert!(TypeHelpers::is_assignable(&Type::Number, &target));
        assert!(!TypeHelpers::is_assignable(&Type::Boolean, &target));
        assert!(!TypeHelpers::is_assignable(&target, &Type::String));
    }

    #[test]
    fn test_structural_shapes() {
        let mut literal = Shape {
            closed: true,
            ..Shape::default()
        };
        literal.properties.push(PropertySig::new("x", Type::Literal(LiteralType::Number(1.0))));
        literal.properties.push(PropertySig::new("y", Type::Number));
        literal.properties.push(PropertySig::new("z", Type::String));
        assert!(TypeHelpers::is_assignable(&Type::object(literal.clone()), &point()));

        literal.properties.remove(1);
        assert!(!TypeHelpers::is_assignable(&Type::object(literal), &point()));

        let open = Shape::default();
        assert!(TypeHelpers::is_assignable(&Type::object(open), &point()));
    }

    #[test]
    fn test_functions() {
        let one = Signature::new(vec![ParamSig::new("a", Type::Number)], Type::Number);
        let two = Signature::new(
            vec![ParamSig::new("a", Type::Number), ParamSig::new("b", Type::Number)],
            Type::Number,
        );
        let silent = Signature::new(vec![ParamSig::new("a", Type::Number)], Type::Void);
        assert!(TypeHelpers::is_assignable(&Type::function(one.clone()), &Type::function(two.clone())));
        assert!(!TypeHelpers::is_assignable(&Type::function(two.clone()), &Type::function(one.clone())));
        // a void result does not satisfy a number result, but anything satisfies void
        assert!(!TypeHelpers::is_assignable(&Type::function(silent.clone()), &Type::function(two)));
        assert!(TypeHelpers::is_assignable(&Type::function(one), &Type::function(silent)));
    }

    #[test]
    fn test_messages_helpers() {
        assert_eq!(TypeHelpers::display_source(&lit_str("bad"), &Type::Number), "string");
        assert_eq!(
            TypeHelpers::display_source(&lit_str("bad"), &Type::union(vec![lit_str("a"), lit_str("b")])),
            "\"bad\""
        );
        let sig = Signature::new(
            vec![
                ParamSig::new("a", Type::Number),
                ParamSig {
                    optional: true,
                    ..ParamSig::new("b", Type::Number)
                },
            ],
            Type::Void,
        );
        assert_eq!(TypeHelpers::expected_arguments(&[&sig]), "1-2");
    }
}
