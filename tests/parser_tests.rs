use cinder::parser::{
    self,
    ast::{
        ClassElement, Expression, FunctionParam, Pattern, Program, ProgramKind, Statement,
        Toplevel,
    },
    source::Source,
    Comment, CommentKind, ParseError, ParseOptions, ParseResult, PrintOptions, TokenEvent,
};

use num_bigint::BigInt;

use std::cell::RefCell;
use std::rc::Rc;

fn source(contents: &str) -> Rc<Source> {
    Rc::new(Source::new_from_string("test.js", contents.to_owned()))
}

fn parse_script(contents: &str) -> ParseResult<Program> {
    parser::parse_script(&source(contents))
}

fn parse_module(contents: &str) -> ParseResult<Program> {
    parser::parse_module(&source(contents))
}

fn parse_with(contents: &str, options: ParseOptions) -> ParseResult<Program> {
    parser::parse(&source(contents), options)
}

fn assert_ok(result: ParseResult<Program>) -> Program {
    match result {
        Ok(program) => program,
        Err(err) => panic!("expected successful parse, found {}", err),
    }
}

fn expect_error(result: ParseResult<Program>) -> ParseError {
    match result {
        Ok(_) => panic!("expected parse error"),
        Err(err) => err.error,
    }
}

/// The expression of the first statement in a program.
fn first_expression(program: &Program) -> &Expression {
    match &program.toplevels[0] {
        Toplevel::Statement(Statement::Expr(stmt)) => &stmt.expr,
        _ => panic!("expected expression statement"),
    }
}

#[test]
fn with_statement_in_strict_mode() {
    let error = expect_error(parse_script("'use strict'; with(x){}"));
    assert!(matches!(error, ParseError::WithInStrictMode));

    assert_ok(parse_script("with(x){}"));
}

#[test]
fn var_and_lexical_redeclarations() {
    let error = expect_error(parse_script("var x; let x;"));
    assert!(matches!(error, ParseError::NameRedeclaration(name, _) if name == "x"));

    assert_ok(parse_script("var x; var x;"));
    assert_ok(parse_script("let x; { let x; }"));
    assert_ok(parse_script("function f() {} var f;"));
    assert_ok(parse_script("try {} catch (e) { var e; }"));

    assert!(parse_script("let x; var x;").is_err());
    assert!(parse_script("let x; { var x; }").is_err());
    assert!(parse_script("const x = 1; function x() {}").is_err());
    assert!(parse_script("try {} catch ([e]) { var e; }").is_err());

    assert!(parse_script("let let = 1;").is_err());
    assert!(parse_script("const [let] = [];").is_err());
}

#[test]
fn arrow_function_or_sequence() {
    let program = assert_ok(parse_with("(a, b) => a + b", ParseOptions::default()));
    let Expression::ArrowFunction(func) = first_expression(&program) else {
        panic!("expected arrow function");
    };

    assert_eq!(func.params.len(), 2);
    for (param, name) in func.params.iter().zip(["a", "b"]) {
        match param {
            FunctionParam::Pattern(Pattern::Id(id)) => assert_eq!(id.name, name),
            _ => panic!("expected identifier parameter"),
        }
    }

    let program = assert_ok(parse_with("(a, b)", ParseOptions::default()));
    let Expression::Sequence(seq) = first_expression(&program) else {
        panic!("expected sequence expression");
    };
    assert_eq!(seq.expressions.len(), 2);
}

#[test]
fn duplicate_default_export() {
    let error = expect_error(parse_module("export default 1; export default 2;"));
    assert!(matches!(error, ParseError::DuplicateExport(name) if name == "default"));

    let error = expect_error(parse_module("export var a; export { a };"));
    assert!(matches!(error, ParseError::DuplicateExport(name) if name == "a"));
}

#[test]
fn duplicate_parameters_depend_on_body_strictness() {
    let error = expect_error(parse_script("function f(a, a) { 'use strict'; }"));
    assert!(matches!(error, ParseError::InvalidDuplicateParameters(_)));

    assert_ok(parse_script("function f(a, a) {}"));

    assert!(parse_script("(a, a) => 1").is_err());
    assert!(parse_script("function f(a, [a]) {}").is_err());
    assert!(parse_script("({ m(a, a) {} })").is_err());
}

#[test]
fn numeric_literals() {
    let number_value = |contents: &str| {
        let program = assert_ok(parse_script(contents));
        match first_expression(&program) {
            Expression::Number(lit) => lit.value,
            _ => panic!("expected number literal"),
        }
    };

    assert_eq!(number_value("0x1F"), 31.0);
    assert_eq!(number_value("0b101"), 5.0);
    assert_eq!(number_value("0o17"), 15.0);
    assert_eq!(number_value("1_000"), 1000.0);
    assert_eq!(number_value("010"), 8.0);

    let program = assert_ok(parse_script("1n"));
    match first_expression(&program) {
        Expression::BigInt(lit) => assert_eq!(lit.value, BigInt::from(1)),
        _ => panic!("expected BigInt literal"),
    }

    let options = ParseOptions { implied_strict: true, ..ParseOptions::default() };
    let error = expect_error(parse_with("08", options));
    assert!(matches!(error, ParseError::LegacyOctalLiteralInStrictMode));

    assert!(parse_script("1__0").is_err());
    assert!(parse_script("1_").is_err());
    assert!(parse_script("3in x").is_err());
}

#[test]
fn unterminated_constructs_point_at_end_of_input() {
    for contents in ["\"abc", "`abc", "/* abc"] {
        match parse_script(contents) {
            Ok(_) => panic!("expected parse error for {}", contents),
            Err(err) => assert_eq!(err.index(), Some(contents.len())),
        }
    }
}

#[test]
fn error_positions_and_descriptions() {
    let err = match parse_script("var x;\nlet x;") {
        Ok(_) => panic!("expected parse error"),
        Err(err) => err,
    };

    assert_eq!(err.index(), Some(11));
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(4));
    assert_eq!(err.description(), "Redeclaration of var x");
    assert_eq!(err.to_string(), "SyntaxError: test.js:2:4 Redeclaration of var x");
}

#[test]
fn labels() {
    let error = expect_error(parse_script("a: a: ;"));
    assert!(matches!(error, ParseError::DuplicateLabel(name) if name == "a"));

    let error = expect_error(parse_script("while (true) { break foo; }"));
    assert!(matches!(error, ParseError::LabelNotFound(name) if name == "foo"));

    let error = expect_error(parse_script("while (true) { a: { continue a; } }"));
    assert!(matches!(error, ParseError::ContinueTargetNotIteration(name) if name == "a"));

    let error = expect_error(parse_script("break;"));
    assert!(matches!(error, ParseError::UnlabeledBreakOutsideBreakable));

    let error = expect_error(parse_script("continue;"));
    assert!(matches!(error, ParseError::ContinueOutsideIterable));

    assert_ok(parse_script("a: b: while (true) { continue a; }"));
    assert_ok(parse_script("a: { break a; }"));
    assert_ok(parse_script("a: ; a: ;"));
}

#[test]
fn top_level_return() {
    let error = expect_error(parse_script("return 1;"));
    assert!(matches!(error, ParseError::ReturnOutsideFunction));

    let options = ParseOptions { global_return: true, ..ParseOptions::default() };
    assert_ok(parse_with("return 1;", options));
}

#[test]
fn strict_mode_restrictions() {
    let error = expect_error(parse_script("'use strict'; delete x;"));
    assert!(matches!(error, ParseError::DeleteIdentifierInStrictMode));

    let error = expect_error(parse_script("'use strict'; eval = 1;"));
    assert!(matches!(error, ParseError::AssignEvalInStrictMode));

    let error = expect_error(parse_script("function f(a = 1) { 'use strict'; }"));
    assert!(matches!(error, ParseError::UseStrictFunctionNonSimpleParameterList));

    let options = ParseOptions { implied_strict: true, ..ParseOptions::default() };
    assert!(parse_with("var let = 1;", options).is_err());

    assert_ok(parse_script("delete x; eval = 1; var let = 1;"));

    let program = assert_ok(parse_script("'use strict';"));
    assert!(program.is_strict_mode);
    assert!(program.has_use_strict_directive);
}

#[test]
fn declarations() {
    let error = expect_error(parse_script("const a;"));
    assert!(matches!(error, ParseError::ConstWithoutInitializer));

    let error = expect_error(parse_script("let [a];"));
    assert!(matches!(error, ParseError::DestructuringWithoutInitializer));

    let error = expect_error(parse_script("while (true) const a = 1;"));
    assert!(matches!(error, ParseError::DeclarationInStatementPosition));

    assert_ok(parse_script("for (const a of b) ;"));
    assert_ok(parse_script("let\nx = 1;"));
}

#[test]
fn annex_b_function_declarations() {
    assert_ok(parse_script("if (x) function f() {}"));
    assert_ok(parse_script("a: function f() {}"));
    assert_ok(parse_script("{ function f() {} function f() {} }"));

    let error = expect_error(parse_script("'use strict'; a: function f() {}"));
    assert!(matches!(error, ParseError::InvalidLabeledFunction(true)));

    let error = expect_error(parse_script("a: function* f() {}"));
    assert!(matches!(error, ParseError::InvalidLabeledFunction(false)));

    assert!(parse_script("'use strict'; if (x) function f() {}").is_err());
    assert!(parse_script("'use strict'; { function f() {} function f() {} }").is_err());
}

#[test]
fn class_element_rules() {
    let error = expect_error(parse_script("class A { constructor() {} constructor() {} }"));
    assert!(matches!(error, ParseError::MultipleConstructors));

    let error = expect_error(parse_script("class A { static prototype() {} }"));
    assert!(matches!(error, ParseError::ClassStaticPrototype));

    let error = expect_error(parse_script("class A { constructor = 1; }"));
    assert!(matches!(error, ParseError::ConstructorClassField));

    let error = expect_error(parse_script("class A { get constructor() {} }"));
    assert!(matches!(error, ParseError::NonSimpleConstructor));

    assert_ok(parse_script("class A { static constructor() {} prototype() {} }"));

    let program = assert_ok(parse_script(
        "class A { x = 1; static y; #z; static { this.y = 2; } get #w() {} set #w(v) {} }",
    ));
    let Toplevel::Statement(Statement::ClassDecl(class)) = &program.toplevels[0] else {
        panic!("expected class declaration");
    };
    assert_eq!(class.body.len(), 6);
    assert!(matches!(class.body[3], ClassElement::StaticBlock(_)));
}

#[test]
fn private_names() {
    let error = expect_error(parse_script("class A { #x; #x; }"));
    assert!(matches!(error, ParseError::DuplicatePrivateName(name) if name == "x"));

    let error = expect_error(parse_script("class A { m() { this.#y; } }"));
    assert!(matches!(error, ParseError::PrivateNameNotDefined(name) if name == "y"));

    let error = expect_error(parse_script("class A { #x; m() { delete this.#x; } }"));
    assert!(matches!(error, ParseError::DeletePrivateName));

    assert!(parse_script("this.#x;").is_err());
    assert!(parse_script("class A { #constructor; }").is_err());

    assert_ok(parse_script("class A { #x; static has(o) { return #x in o; } }"));
    assert_ok(parse_script("class A { m() { this.#x; } #x; }"));
    assert_ok(parse_script("class A { #x; m() { class B { n() { this.#x; } } } }"));
}

#[test]
fn super_and_new_target() {
    let error = expect_error(parse_script("class A { constructor() { super(); } }"));
    assert!(matches!(error, ParseError::SuperCallOutsideDerivedConstructor));

    let error = expect_error(parse_script("super.x;"));
    assert!(matches!(error, ParseError::SuperPropertyOutsideMethod));

    let error = expect_error(parse_script("new.target;"));
    assert!(matches!(error, ParseError::NewTargetOutsideFunction));

    let error = expect_error(parse_script("class A { x = arguments; }"));
    assert!(matches!(error, ParseError::ArgumentsInClassInitializer));

    assert_ok(parse_script("class A extends B { constructor() { (() => super())(); } }"));
    assert_ok(parse_script("class A { m() { return super.m(); } }"));
    assert_ok(parse_script("({ m() { return super.x; } })"));
    assert_ok(parse_script("function f() { return () => new.target; }"));
    assert_ok(parse_script("class A { x = new.target; }"));
}

#[test]
fn accessor_arity() {
    let error = expect_error(parse_script("({ get x(a) {} })"));
    assert!(matches!(error, ParseError::GetterWrongNumberOfParams));

    let error = expect_error(parse_script("({ set x() {} })"));
    assert!(matches!(error, ParseError::SetterWrongNumberOfParams));

    let error = expect_error(parse_script("({ set x(...a) {} })"));
    assert!(matches!(error, ParseError::SetterRestParameter));

    assert_ok(parse_script("({ get x() {}, set x(v) {} })"));
}

#[test]
fn module_items() {
    let error = expect_error(parse_script("import x from 'm';"));
    assert!(matches!(error, ParseError::ModuleItemOutsideModule));

    let error = expect_error(parse_module("{ export var x; }"));
    assert!(matches!(error, ParseError::ModuleItemNotTopLevel));

    let error = expect_error(parse_module("export { y };"));
    assert!(matches!(error, ParseError::ExportedNameNotDeclared(name) if name == "y"));

    let error = expect_error(parse_script("import.meta;"));
    assert!(matches!(error, ParseError::ImportMetaOutsideModule));

    let program = assert_ok(parse_module(
        "import a, * as ns from 'm';\n\
         import { b as c, 'd e' as f } from 'n';\n\
         export { a, c as default, ns as 'g h' };\n\
         export * from 'o';\n\
         export * as p from 'q';\n\
         export function g() {}\n\
         export const h = import.meta;\n\
         await import('r');",
    ));
    assert_eq!(program.kind, ProgramKind::Module);
    assert!(program.is_strict_mode);
    assert_eq!(program.toplevels.len(), 8);

    assert_ok(parse_module("export { x }; var x;"));
    assert_ok(parse_module("export { x as y } from 'm'; export { y as z } from 'm';"));
    assert_ok(parse_script("import('m'); var await;"));
}

#[test]
fn import_attributes_require_next() {
    assert!(parse_module("import a from 'm' with { type: 'json' };").is_err());

    let error = expect_error(parse_script("import('m', { with: { type: 'json' } });"));
    assert!(matches!(error, ParseError::ImportCallArguments));

    let next_module = || ParseOptions { module: true, next: true, ..ParseOptions::default() };
    assert_ok(parse_with("import a from 'm' with { type: 'json' };", next_module()));
    assert_ok(parse_with("import('m', { with: { type: 'json' } });", next_module()));

    let error = expect_error(parse_with(
        "import a from 'm' with { type: 'json', type: 'css' };",
        next_module(),
    ));
    assert!(matches!(error, ParseError::DuplicateImportAttribute(key) if key == "type"));
}

#[test]
fn cover_grammar() {
    let error = expect_error(parse_script("({ a = 1 });"));
    assert!(matches!(error, ParseError::InvalidPatternInitializer));
    assert_ok(parse_script("({ a = 1 } = {});"));
    assert_ok(parse_script("({ a = 1 }) => a;"));

    let error = expect_error(parse_script("({ __proto__: 1, __proto__: 2 });"));
    assert!(matches!(error, ParseError::DuplicateProtoProperty));
    assert_ok(parse_script("({ __proto__: a, __proto__: b } = {});"));
    assert_ok(parse_script("({ __proto__: 1, ['__proto__']: 2, __proto__() {} });"));

    let error = expect_error(parse_script("1 = 2;"));
    assert!(matches!(error, ParseError::InvalidAssignmentLeftHandSide));

    assert_ok(parse_script("[a, [b], { c: d.e }, ...f] = g;"));
    assert_ok(parse_script("(a) = 1; (a.b) = 1;"));
    assert!(parse_script("([a]) = 1;").is_err());
    assert!(parse_script("[...a, b] = c;").is_err());
    assert!(parse_script("(a, ...b);").is_err());
    assert!(parse_script("a++ = 1;").is_err());
    assert!(parse_script("++a.b()").is_err());
}

#[test]
fn operator_restrictions() {
    let error = expect_error(parse_script("a ?? b || c;"));
    assert!(matches!(error, ParseError::NullishCoalesceMixedWithLogical));
    assert_ok(parse_script("(a ?? b) || c; a ?? (b || c);"));

    let error = expect_error(parse_script("-a ** 2;"));
    assert!(matches!(error, ParseError::ExponentLHSUnary));
    assert_ok(parse_script("(-a) ** 2; a ** -b;"));

    let error = expect_error(parse_script("new a?.b();"));
    assert!(matches!(error, ParseError::OptionalChainFromNew));

    let error = expect_error(parse_script("a?.b`c`;"));
    assert!(matches!(error, ParseError::TaggedTemplateInChain));

    assert_ok(parse_script("a?.b.c?.(d)?.[e]; a ||= b; a &&= b; a ??= b;"));
}

#[test]
fn yield_and_await() {
    let error = expect_error(parse_script("async function f(a = await 1) {}"));
    assert!(matches!(error, ParseError::AwaitInParameters));

    assert!(parse_script("function* g(a = yield) {}").is_err());
    assert!(parse_script("async function f() { (a = await 1) => a; }").is_err());
    assert!(parse_script("await 1;").is_err());

    assert_ok(parse_script("function* g() { yield; yield* g(); var x = yield 1; }"));
    assert_ok(parse_script("async function f() { for await (const x of y) ; }"));
    assert_ok(parse_script("var yield, await; async => async;"));
    assert_ok(parse_module("await 1;"));
}

#[test]
fn arrow_restrictions() {
    let error = expect_error(parse_script("(a)\n=> a;"));
    assert!(matches!(error, ParseError::ArrowOnNewLine));

    assert!(parse_script("a + b => c;").is_err());
    assert!(parse_script("(a, b) => {}\n(c);").is_ok());
    assert_ok(parse_script("x = a => b => a + b;"));
    assert_ok(parse_script("f(async (a) => await a, async b => b);"));
}

#[test]
fn jsx() {
    let jsx = || ParseOptions { jsx: true, ..ParseOptions::default() };

    let program = assert_ok(parse_with(
        "<a.b c=\"d\" {...e} f={g}>text &amp; <h:i /><>{/* empty */}</></a.b>;",
        jsx(),
    ));
    assert!(matches!(first_expression(&program), Expression::JSXElement(_)));

    let error = expect_error(parse_with("<a></b>;", jsx()));
    assert!(matches!(error, ParseError::MismatchedJsxClosingTag(name) if name == "a"));

    assert!(parse_script("<a />;").is_err());
}

#[test]
fn comment_and_token_callbacks() {
    let comments = RefCell::new(vec![]);
    let tokens = RefCell::new(vec![]);

    let options = ParseOptions {
        on_comment: Some(Box::new(|comment: Comment| comments.borrow_mut().push(comment))),
        on_token: Some(Box::new(|token: TokenEvent| tokens.borrow_mut().push(token))),
        ..ParseOptions::default()
    };
    assert_ok(parse_with("/* a */ x = 1; // b", options));

    let comments = comments.into_inner();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].kind, CommentKind::Block);
    assert_eq!(comments[0].value, " a ");
    assert_eq!(comments[1].kind, CommentKind::Line);
    assert_eq!(comments[1].value, " b");

    let tokens = tokens.into_inner();
    let values = tokens.iter().map(|token| token.value.as_str()).collect::<Vec<_>>();
    assert_eq!(values, vec!["x", "=", "1", ";"]);
    assert_eq!(tokens[0].kind, "Identifier");
    assert_eq!(tokens[1].kind, "Punctuator");
    assert_eq!(tokens[2].kind, "Numeric");
}

#[test]
fn callbacks_not_called_on_failure() {
    let num_calls = RefCell::new(0);

    let options = ParseOptions {
        on_comment: Some(Box::new(|_: Comment| *num_calls.borrow_mut() += 1)),
        on_token: Some(Box::new(|_: TokenEvent| *num_calls.borrow_mut() += 1)),
        ..ParseOptions::default()
    };
    assert!(parse_with("// a\nx = ;", options).is_err());

    assert_eq!(*num_calls.borrow(), 0);
}

#[test]
fn printed_locations() {
    let source = source("let x;\n/a/g;");
    let program = assert_ok(parser::parse_script(&source));

    let options = PrintOptions { ranges: true, loc: true, raw: true, directives: false };
    let json = parser::program_to_json(&program, &source, options);

    assert_eq!(json["type"], "Program");
    assert_eq!(json["sourceType"], "script");
    assert_eq!(json["start"], 0);
    assert_eq!(json["end"], 12);

    let declarator = &json["body"][0]["declarations"][0];
    assert_eq!(declarator["id"]["name"], "x");
    assert_eq!(declarator["id"]["start"], 4);
    assert_eq!(declarator["id"]["loc"]["start"]["line"], 1);
    assert_eq!(declarator["id"]["loc"]["start"]["column"], 4);

    let regex = &json["body"][1]["expression"];
    assert_eq!(regex["regex"]["pattern"], "a");
    assert_eq!(regex["regex"]["flags"], "g");
    assert_eq!(regex["raw"], "/a/g");
    assert_eq!(regex["loc"]["start"]["line"], 2);
    assert_eq!(regex["loc"]["end"]["column"], 4);
}

#[test]
fn printed_directives() {
    let options = ParseOptions { directives: true, ..ParseOptions::default() };
    let print_options = options.print_options();

    let source = source("'use strict'; 'b'; x;");
    let program = assert_ok(parser::parse(&source, options));
    let json = parser::program_to_json(&program, &source, print_options);

    assert_eq!(json["body"][0]["directive"], "use strict");
    assert_eq!(json["body"][1]["directive"], "b");
    assert!(json["body"][2].get("directive").is_none());
    assert!(json["body"][0].get("start").is_none());
}

/// Unterminated prefixes that each open one more level of nesting when repeated.
const NESTING_PREFIXES: &[&str] = &[
    "(",
    "[",
    "x = {a:",
    "!",
    "a = ",
    "if (x) ",
    "{",
    "`${",
    "() => ",
    "f(",
    "new ",
    "x ? ",
    "class A extends ",
    "function f(){",
    "async function f(){",
    "class A { m(){ ",
    "const a = () => { let b = function(){ ",
];

fn assert_nesting_is_bounded(num_levels: usize) {
    for prefix in NESTING_PREFIXES {
        let error = expect_error(parse_script(&prefix.repeat(num_levels)));
        assert!(
            matches!(error, ParseError::TooMuchRecursion),
            "nesting {:?} failed with: {}",
            prefix,
            error
        );
    }
}

#[test]
fn deep_nesting_is_bounded() {
    // The depth limit is reached before a large stack is exhausted
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let depth = 100_000;
            let contents = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

            let error = expect_error(parse_script(&contents));
            assert!(matches!(error, ParseError::TooMuchRecursion));

            assert_nesting_is_bounded(20_000);

            let contents = format!("{}1{}", "(".repeat(100), ")".repeat(100));
            assert_ok(parse_script(&contents));

            let contents = format!("{}{}", "function f(){".repeat(100), "}".repeat(100));
            assert_ok(parse_script(&contents));
        })
        .unwrap();

    handle.join().unwrap();
}

#[test]
fn deep_nesting_is_bounded_on_default_stack() {
    let handle = std::thread::spawn(|| assert_nesting_is_bounded(50_000));
    handle.join().unwrap();
}
