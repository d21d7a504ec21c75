//! # Keel Parser
//!
//! Recursive descent parser for TypeScript. Expressions use precedence
//! climbing; ambiguous constructs (arrow functions, generic calls) are
//! resolved by speculative parsing with rewind.
//!
//! The parser never gives up on a file: it recovers at statement boundaries
//! and returns the tree together with every syntax error it met.

use keel_ast::*;
use keel_lexer::{Token, TokenKind};

mod decl;
mod error;
mod expr;
mod helpers;
mod parser;
mod pattern;
mod stmt;
mod types;

pub use error::{ParseError, ParseResult};
pub use parser::Parser;

use helpers::parse_number_value;

/// Lexes and parses `source`. Lexical and syntactic errors are merged into
/// one list ordered by position.
pub fn parse(source: &str, file_id: usize) -> (Program, Vec<ParseError>) {
    let (tokens, lex_errors) = keel_lexer::tokenize(source, file_id);
    let mut parser = Parser::new(tokens);
    let (program, parse_errors) = parser.parse_program();

    let mut errors: Vec<ParseError> = lex_errors.into_iter().map(ParseError::from).collect();
    errors.extend(parse_errors);
    errors.sort_by_key(|e| e.span.start);
    (program, errors)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> Program {
        let (program, errors) = parse(source, 0);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        program
    }

    fn error_codes(source: &str) -> Vec<u32> {
        parse(source, 0).1.iter().map(|e| e.code).collect()
    }

    fn first_stmt_expr(program: &Program) -> &Expr {
        match &program.items[0].value {
            ModuleItem::Stmt(Node {
                value: Stmt::Expr(expr),
                ..
            }) => &expr.value,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_variable_declaration() {
        let program = parse_ok("let x: number = 42;");
        assert_eq!(program.items.len(), 1);
        match &program.items[0].value {
            ModuleItem::Stmt(Node {
                value: Stmt::VarDecl(decl),
                ..
            }) => {
                assert_eq!(decl.kind, VarDeclKind::Let);
                assert!(decl.declarations[0].pattern.value.type_annotation().is_some());
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_declaration() {
        let program = parse_ok("function add(a: number, b: number): number { return a + b; }");
        assert_eq!(program.items.len(), 1);
        assert!(matches!(
            &program.items[0].value,
            ModuleItem::Decl(Node { value: Decl::Function(f), .. }) if f.params.len() == 2
        ));
    }

    #[test]
    fn test_parse_arrow_functions() {
        parse_ok("const add = (a: number, b: number): number => a + b;");
        parse_ok("const id = x => x;");
        parse_ok("const f = async (x) => { await x; };");
        parse_ok("const g = <T>(value: T): T => value;");
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        let program = parse_ok("(a + b) * c;");
        assert!(matches!(
            first_stmt_expr(&program),
            Expr::Binary { op: BinaryOp::Mul, .. }
        ));
    }

    #[test]
    fn test_ternary_with_parenthesized_branch() {
        let program = parse_ok("x ? (y) : z;");
        assert!(matches!(first_stmt_expr(&program), Expr::Ternary { .. }));
    }

    #[test]
    fn test_parse_class_declaration() {
        let source = r#"
            class Point extends Base<number> implements Shape {
                x: number;
                private readonly y: number = 0;
                static origin = new Point(0, 0);

                constructor(x: number, public z: number) {
                    super();
                    this.x = x;
                }

                get length(): number { return 0; }
                move(dx: number): void {}
            }
        "#;
        let program = parse_ok(source);
        match &program.items[0].value {
            ModuleItem::Decl(Node {
                value: Decl::Class(class),
                ..
            }) => {
                assert_eq!(class.name.value.name, "Point");
                assert!(class.extends.is_some());
                assert_eq!(class.implements.len(), 1);
                assert_eq!(class.members.len(), 6);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_interface_and_type_alias() {
        let source = r#"
            interface Named<T> extends Base {
                readonly name: string;
                age?: number
                greet(other: Named<T>): string;
                [key: string]: any;
            }
            type Pair = [string, number];
            type Handler = (event: string) => void;
            type Keys = keyof Named<string>;
            type Maybe<T> = T extends null ? never : T;
            type Flags = { readonly [K in Keys]?: boolean };
        "#;
        let program = parse_ok(source);
        assert_eq!(program.items.len(), 6);
    }

    #[test]
    fn test_parse_generic_call() {
        let program = parse_ok("identity<string>('a');");
        assert!(matches!(
            first_stmt_expr(&program),
            Expr::Call { type_args: Some(args), .. } if args.len() == 1
        ));
    }

    #[test]
    fn test_less_than_is_not_generic_call() {
        let program = parse_ok("a < b;");
        assert!(matches!(
            first_stmt_expr(&program),
            Expr::Binary { op: BinaryOp::Lt, .. }
        ));
    }

    #[test]
    fn test_nested_generic_closer() {
        parse_ok("let m: Map<string, Array<number>> = new Map<string, Array<number>>();");
    }

    #[test]
    fn test_parse_imports_and_exports() {
        let source = r#"
            import fs = require("fs");
            import * as path from "path";
            import def, { a, b as c } from "./mod";
            export const x = 1;
            export default function () {}
            export { x as y };
            export * from "./other";
        "#;
        let program = parse_ok(source);
        assert_eq!(program.items.len(), 7);
        assert_eq!(
            program
                .module_references()
                .iter()
                .map(|s| s.value.as_str())
                .collect::<Vec<_>>(),
            vec!["fs", "path", "./mod", "./other"]
        );
    }

    #[test]
    fn test_default_export_gets_synthesized_name() {
        let program = parse_ok("export default class {}");
        match &program.items[0].value {
            ModuleItem::Export(ExportDecl::DefaultDecl(decl)) => match &decl.value {
                Decl::Class(class) => assert_eq!(class.name.value.name, "default_1"),
                other => panic!("unexpected decl {:?}", other),
            },
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parse_enum_and_namespace() {
        let source = r#"
            enum Color { Red, Green = 4, "Blue" }
            const enum Flag { A = 1 << 0 }
            namespace Outer.Inner { export const z = 1; }
            declare module "ext" { export function f(): void; }
        "#;
        let program = parse_ok(source);
        assert_eq!(program.items.len(), 4);
    }

    #[test]
    fn test_parse_control_flow() {
        let source = r#"
            for (let i = 0; i < 10; i++) { if (i % 2) continue; }
            for (const k in obj) {}
            for (const [a, b] of pairs) {}
            while (x) { x--; }
            do { y++; } while (y < 3)
            switch (v) { case 1: break; default: v = 0; }
            try { risky(); } catch (e) { log(e); } finally { done(); }
            outer: for (;;) { break outer; }
        "#;
        let program = parse_ok(source);
        assert_eq!(program.items.len(), 8);
    }

    #[test]
    fn test_for_in_initializer_does_not_consume_in() {
        let program = parse_ok("for (var k in obj) {}");
        assert!(matches!(
            &program.items[0].value,
            ModuleItem::Stmt(Node { value: Stmt::ForIn { .. }, .. })
        ));
    }

    #[test]
    fn test_expressions() {
        parse_ok("a ?? b || c && d;");
        parse_ok("x = y ** 2 ** 3;");
        parse_ok("obj?.prop?.[key]?.(arg);");
        parse_ok("const s = `a ${b + `c ${d}`} e`;");
        parse_ok("const o = { a, b: 1, [k]: 2, m() {}, get g() { return 1; }, ...rest };");
        parse_ok("const r = /ab+c/gi.test(s);");
        parse_ok("const v = <any>value as string;");
        parse_ok("el!.focus();");
        parse_ok("tag`hello ${world}`;");
    }

    #[test]
    fn test_decorators() {
        let source = r#"
            @Component({ selector: "app" })
            export class App {
                @Input() name: string;
                constructor(@Inject(TOKEN) private svc: Service) {}
            }
        "#;
        let program = parse_ok(source);
        match &program.items[0].value {
            ModuleItem::Export(ExportDecl::Decl(decl)) => match &decl.value {
                Decl::Class(class) => assert_eq!(class.decorators.len(), 1),
                other => panic!("unexpected decl {:?}", other),
            },
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_asi() {
        let program = parse_ok("let a = 1\nlet b = 2\na\n++b");
        assert_eq!(program.items.len(), 4);
    }

    #[test]
    fn test_missing_semicolon_reported() {
        assert_eq!(error_codes("let a = 1 let b = 2;"), vec![1005]);
    }

    #[test]
    fn test_expression_expected() {
        let (_, errors) = parse("let x = ;", 0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, 1109);
        assert_eq!(errors[0].message, "Expression expected.");
        assert_eq!(errors[0].span.start, 8);
    }

    #[test]
    fn test_recovers_and_reports_every_error() {
        let source = "function f() {\n  let a = ;\n  let b = ;\n}\nlet ok = 1;";
        let (program, errors) = parse(source, 0);
        assert_eq!(errors.iter().map(|e| e.code).collect::<Vec<_>>(), vec![1109, 1109]);
        assert_eq!(program.items.len(), 2);
    }

    #[test]
    fn test_lexer_errors_are_merged() {
        let codes = error_codes("let s = 'open\nlet t = 1;");
        assert!(codes.contains(&1002));
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(error_codes("f() = 1;"), vec![2364]);
        assert!(error_codes("[a, b] = pair;").is_empty());
    }

    #[test]
    fn test_stray_closing_brace() {
        assert_eq!(error_codes("let a = 1;\n}"), vec![1128]);
    }

    #[test]
    fn test_deep_nesting_is_reported() {
        let nested = |depth: usize| format!("let x = {}1{};", "(".repeat(depth), ")".repeat(depth));

        parse_ok(&nested(50));

        let source = format!("{}\nlet after = 2;", nested(300));
        let (program, errors) = parse(&source, 0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, 1109);
        assert_eq!(errors[0].message, "Expression is nested too deeply.");
        assert_eq!(program.items.len(), 1);
    }

    #[test]
    fn test_type_expected() {
        assert_eq!(error_codes("let a: = 1;"), vec![1110]);
    }
}
