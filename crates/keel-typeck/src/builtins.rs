//! Built-in ambient prelude
//!
//! Globals bound when the program carries no default library file. Objects
//! whose full surface is not modelled are left open so that unknown members
//! type as `any` instead of raising errors.

use crate::env::{Symbol, SymbolKind, TypeEnv};
use crate::types::{ParamSig, PropertySig, Shape, Signature, Type};

/// Global type names that resolve to `any` when no library declares them.
const OPAQUE_TYPES: &[&str] = &[
    "Object",
    "Function",
    "String",
    "Number",
    "Boolean",
    "Array",
    "ReadonlyArray",
    "Promise",
    "PromiseLike",
    "RegExp",
    "Date",
    "Error",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Symbol",
    "Iterable",
    "Iterator",
    "IterableIterator",
    "Partial",
    "Required",
    "Readonly",
    "Record",
    "Pick",
    "Omit",
    "Exclude",
    "Extract",
    "NonNullable",
    "ReturnType",
    "Parameters",
    "InstanceType",
    "ArrayLike",
    "PropertyKey",
    "TemplateStringsArray",
];

/// Global constructors and namespaces whose members are not modelled.
const OPAQUE_VALUES: &[&str] = &[
    "Object", "Array", "String", "Number", "Boolean", "Date", "Error", "Promise", "RegExp",
    "Symbol", "Map", "Set", "WeakMap", "WeakSet", "Function", "TypeError", "RangeError",
    "require", "module", "exports", "process",
];

fn sig(params: &[(&str, Type)], return_type: Type) -> Signature {
    Signature::new(
        params
            .iter()
            .map(|(name, ty)| ParamSig::new(*name, ty.clone()))
            .collect(),
        return_type,
    )
}

fn variadic(name: &str, return_type: Type) -> Signature {
    Signature::new(
        vec![ParamSig {
            is_rest: true,
            ..ParamSig::new(name, Type::Array(Box::new(Type::Any)))
        }],
        return_type,
    )
}

fn object(name: &str, members: Vec<PropertySig>, closed: bool) -> Type {
    let mut shape = Shape::named(name);
    shape.properties = members;
    shape.closed = closed;
    Type::object(shape)
}

fn declare(env: &mut TypeEnv, name: &str, ty: Type) {
    env.declare_global(name, Symbol::value(SymbolKind::Builtin, ty));
}

/// Binds the prelude into the global scope of `env`.
pub fn register_builtins(env: &mut TypeEnv) {
    for name in OPAQUE_TYPES {
        env.declare_global(*name, Symbol::type_only(SymbolKind::Builtin, Type::Any));
    }
    for name in OPAQUE_VALUES {
        declare(env, name, Type::Any);
    }

    // Hosts add their own console methods
    let console = ["log", "error", "warn", "info", "debug", "trace"]
        .iter()
        .map(|name| PropertySig::method(*name, variadic("data", Type::Void)))
        .collect();
    declare(env, "console", object("Console", console, false));

    let unary = |name: &str| PropertySig::method(name, sig(&[("x", Type::Number)], Type::Number));
    let mut math: Vec<PropertySig> = [
        "abs", "acos", "asin", "atan", "ceil", "cos", "exp", "floor", "log", "round", "sin",
        "sqrt", "tan",
    ]
    .iter()
    .map(|name| unary(*name))
    .collect();
    math.push(PropertySig::method(
        "atan2",
        sig(&[("y", Type::Number), ("x", Type::Number)], Type::Number),
    ));
    math.push(PropertySig::method(
        "pow",
        sig(&[("x", Type::Number), ("y", Type::Number)], Type::Number),
    ));
    math.push(PropertySig::method("max", variadic("values", Type::Number)));
    math.push(PropertySig::method("min", variadic("values", Type::Number)));
    math.push(PropertySig::method("random", sig(&[], Type::Number)));
    for constant in ["E", "LN10", "LN2", "LOG2E", "LOG10E", "PI", "SQRT1_2", "SQRT2"] {
        math.push(PropertySig::new(constant, Type::Number));
    }
    declare(env, "Math", object("Math", math, true));

    let json = vec![
        PropertySig::method(
            "parse",
            Signature::new(
                vec![
                    ParamSig::new("text", Type::String),
                    ParamSig {
                        optional: true,
                        ..ParamSig::new("reviver", Type::Any)
                    },
                ],
                Type::Any,
            ),
        ),
        PropertySig::method(
            "stringify",
            Signature::new(
                vec![
                    ParamSig::new("value", Type::Any),
                    ParamSig {
                        optional: true,
                        ..ParamSig::new("replacer", Type::Any)
                    },
                    ParamSig {
                        optional: true,
                        ..ParamSig::new("space", Type::Any)
                    },
                ],
                Type::String,
            ),
        ),
    ];
    declare(env, "JSON", object("JSON", json, true));

    let radix = Signature::new(
        vec![
            ParamSig::new("string", Type::String),
            ParamSig {
                optional: true,
                ..ParamSig::new("radix", Type::Number)
            },
        ],
        Type::Number,
    );
    declare(env, "parseInt", Type::function(radix));
    declare(
        env,
        "parseFloat",
        Type::function(sig(&[("string", Type::String)], Type::Number)),
    );
    declare(
        env,
        "isNaN",
        Type::function(sig(&[("number", Type::Number)], Type::Boolean)),
    );
    declare(
        env,
        "isFinite",
        Type::function(sig(&[("number", Type::Number)], Type::Boolean)),
    );

    // Timers take the handler, a delay and extra arguments
    let timer = Signature::new(
        vec![
            ParamSig::new("handler", Type::Any),
            ParamSig {
                optional: true,
                ..ParamSig::new("timeout", Type::Any)
            },
            ParamSig {
                is_rest: true,
                ..ParamSig::new("args", Type::Array(Box::new(Type::Any)))
            },
        ],
        Type::Number,
    );
    declare(env, "setTimeout", Type::function(timer.clone()));
    declare(env, "setInterval", Type::function(timer));
    let clear = Signature::new(
        vec![ParamSig {
            optional: true,
            ..ParamSig::new("handle", Type::Any)
        }],
        Type::Void,
    );
    declare(env, "clearTimeout", Type::function(clear.clone()));
    declare(env, "clearInterval", Type::function(clear));

    declare(env, "__dirname", Type::String);
    declare(env, "__filename", Type::String);
    declare(env, "NaN", Type::Number);
    declare(env, "Infinity", Type::Number);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_bindings() {
        let mut env = TypeEnv::new();
        register_builtins(&mut env);

        let console = env.lookup_value("console").and_then(|s| s.value.clone());
        let console = console.expect("console is bound");
        assert!(console.as_shape().and_then(|s| s.property("log")).is_some());

        assert_eq!(env.lookup_type("Promise"), Some(&Type::Any));
        assert!(env.lookup_value("Interface").is_none());
        assert_eq!(
            env.lookup_value("process").and_then(|s| s.value.clone()),
            Some(Type::Any)
        );
    }
}
