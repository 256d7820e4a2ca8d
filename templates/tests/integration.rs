use std::cell::RefCell;
use std::ptr;

use estree::{EcmaVersion, Node, NodeKind, NodeList, ParserOptions, SourceType};
use pretty_assertions::assert_eq;
use templates::{Template, TemplateError, TemplateManager, Visitor, lists_equal, nodes_equal};

fn module_options() -> ParserOptions {
    ParserOptions {
        source_type: SourceType::Module,
        ..ParserOptions::default()
    }
}

fn parse(source: &str) -> Node {
    estree::parse(source, &module_options()).expect("parse failed")
}

/// Whether any node of `source` matches `template_source`.
fn found_in(template_source: &str, source: &str) -> bool {
    let mut manager = TemplateManager::new();
    let template = manager.template(template_source).expect("template failed");
    count_matches(&template, &parse(source)) > 0
}

/// Whether the whole of `source` matches `template_source`. Both are wrapped
/// in a call to an unusual name so only the top-level expressions line up.
fn matches(template_source: &str, source: &str) -> bool {
    let wrap = |s: &str| format!("uniqueEnoughIdentifier(({}))", s);
    found_in(&wrap(template_source), &wrap(source))
}

/// The first statement of `tree`, unwrapped to its expression when it is an
/// expression statement, the same way templates pick their root.
fn root_of(tree: &Node) -> &Node {
    let NodeKind::Program { body, .. } = &tree.kind else {
        panic!("expected program");
    };
    match &body[0].kind {
        NodeKind::ExpressionStatement { expression } => expression,
        _ => &body[0],
    }
}

/// `parts` interleaved with `pieces`, the way `template_parts` interleaves
/// fragments with variables.
fn instantiate(parts: &[&str], pieces: &[&str]) -> String {
    let mut source = parts[0].to_string();
    for (piece, part) in pieces.iter().zip(&parts[1..]) {
        source.push_str(piece);
        source.push_str(part);
    }
    source
}

fn count_matches(template: &Template, tree: &Node) -> usize {
    let count = RefCell::new(0);
    let mut table = Visitor::new()
        .on_template(template, |_, _, _| *count.borrow_mut() += 1)
        .compile()
        .expect("visitor failed");
    estree::visit(tree, &mut table);
    drop(table);
    count.into_inner()
}

// ---------------------------------------------------------------------------
// Visitors
// ---------------------------------------------------------------------------

#[test]
fn mixing_templates_into_a_visitor() {
    let mut manager = TemplateManager::new();
    let a = manager.variable();
    let template = manager
        .template(&format!("{a}.parentNode.removeChild({a})"))
        .expect("template failed");
    let tree = parse("foo.parentNode.removeChild(foo);\nfoo.parentNode.removeChild(bar);");

    let matched = RefCell::new(Vec::new());
    let members = RefCell::new(0);
    let mut table = Visitor::new()
        .on_template(&template, |node, _, _| matched.borrow_mut().push(node.span.clone()))
        .on_kind("MemberExpression", |_, _| *members.borrow_mut() += 1)
        .compile()
        .expect("visitor failed");
    estree::visit(&tree, &mut table);
    drop(table);

    assert_eq!(matched.into_inner(), vec![0..31]);
    assert_eq!(members.into_inner(), 4);
}

#[test]
fn variable_matching() {
    let mut manager = TemplateManager::new();
    let a = manager.variable();
    let template = manager.template(&format!("{a}.foo()")).expect("template failed");
    assert_eq!(count_matches(&template, &parse("foo.bar()")), 0);
    assert_eq!(count_matches(&template, &parse("bar.foo()")), 1);
}

#[test]
fn merged_handlers_run_in_registration_order() {
    let mut manager = TemplateManager::new();
    let template = manager.template("f()").expect("template failed");
    let calls = RefCell::new(Vec::new());
    let mut table = Visitor::new()
        .on_kind("CallExpression", |_, _| calls.borrow_mut().push("kind"))
        .on_template(&template, |_, _, _| calls.borrow_mut().push("template"))
        .on_kind("CallExpression", |_, _| calls.borrow_mut().push("kind again"))
        .compile()
        .expect("visitor failed");
    assert_eq!(table.len(), 1);
    estree::visit(&parse("f(); g();"), &mut table);
    drop(table);
    assert_eq!(
        calls.into_inner(),
        ["kind", "template", "kind again", "kind", "kind again"]
    );
}

#[test]
fn handlers_receive_ancestors() {
    let mut manager = TemplateManager::new();
    let template = manager.template("inner").expect("template failed");
    let chain = RefCell::new(Vec::new());
    let mut table = Visitor::new()
        .on_template(&template, |_, _, ancestors| {
            chain
                .borrow_mut()
                .extend(ancestors.iter().map(|node| node.kind_name()));
        })
        .compile()
        .expect("visitor failed");
    estree::visit(&parse("outer(inner);"), &mut table);
    drop(table);
    assert_eq!(
        chain.into_inner(),
        ["Program", "ExpressionStatement", "CallExpression"]
    );
}

// ---------------------------------------------------------------------------
// Literal templates
// ---------------------------------------------------------------------------

#[test]
fn identifiers() {
    assert!(!matches("foo", "bar"));
    assert!(matches("foo", "foo"));
    assert!(!found_in("x", "[a, b, c]"));
    assert!(found_in("b", "[a, b, c]"));
}

#[test]
fn numbers() {
    assert!(!matches("1", "2"));
    assert!(matches("1", "1"));
    assert!(!found_in("9", "[1, 2, 3]"));
    assert!(found_in("2", "[1, 2, 3]"));
}

#[test]
fn numbers_compare_raw_text() {
    assert!(!matches("f(1)", "f(1.0)"));
    assert!(!matches("f(0)", "f(0x0)"));
    assert!(!matches("1", "1e0"));
    assert!(matches("f(0x0)", "f(0x0)"));
}

#[test]
fn strings_compare_raw_text() {
    assert!(!matches("'a'", "\"a\""));
    assert!(!matches("'a'", "'\\x61'"));
    assert!(matches("'a'", "'a'"));
}

#[test]
fn objects() {
    assert!(!found_in("({})", "({a:[]})"));
    assert!(found_in("({})", "[{}]"));
}

#[test]
fn functions() {
    assert!(!matches("(() => {})", "(function() {})"));
    assert!(matches("(( ) => { })", "(()=>{})"));
}

#[test]
fn not_a_number() {
    assert!(!matches("NaN", "-NaN"));
    assert!(matches("NaN", "NaN"));
    assert!(found_in("NaN", "NaN"));
    assert!(found_in("NaN", "-NaN"));
    assert!(!found_in("-NaN", "+NaN"));
    assert!(!found_in("+NaN", "-NaN"));
}

#[test]
fn regular_expressions() {
    assert!(!matches("/a/", "/a/g"));
    assert!(matches("/a/", "/a/"));
    assert!(found_in("/x/", "foo(/x/)"));
    assert!(!found_in("/x/", "foo(/x/y)"));
}

#[test]
fn signed_zeros() {
    assert!(!matches("0", "+0"));
    assert!(!matches("0", "-0"));
    assert!(matches("0", "0"));
    assert!(found_in("0", "+0"));
    assert!(found_in("0", "-0"));
    assert!(found_in("0", "0"));
    assert!(!found_in("-0", "0"));
    assert!(!found_in("+0", "0"));
}

#[test]
fn templates_match_their_own_source() {
    let sources = [
        "a.b(c, ...d)",
        "x => x * 2",
        "async function f() { await g(); }",
        "class A extends B { static m() { return super.m(); } }",
        "for (const [k, v] of entries) { if (!v) continue; }",
        "({ a, b: [c = 1], ...rest } = obj)",
        "tag`a${b}c`",
        "try { f(); } catch (e) { g(e); } finally { h(); }",
        "if (x) /a/.test(y);",
        "while (busy) /\\s+/g.exec(line);",
        "[a, , b] = [1, , 2]",
        "label: for (var i in o) { if (i) break label; }",
        "switch (k) { case 1: f(); break; default: g(); }",
        "new Foo(...args)",
        "(function* () { yield* inner(); })",
    ];
    for source in sources {
        let mut manager = TemplateManager::new();
        let template = manager.template(source).expect("template failed");
        assert_eq!(count_matches(&template, &parse(source)), 1, "{}", source);
    }
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

#[test]
fn variable_values() {
    let mut manager = TemplateManager::new();
    let receiver = manager.variable();
    let method = manager.variable();
    let template = manager
        .template(&format!("{receiver}.{method}()"))
        .expect("template failed");

    let tree = parse("bar.foo()");
    let NodeKind::Program { body, .. } = &tree.kind else {
        panic!("expected program");
    };
    let NodeKind::ExpressionStatement { expression } = &body[0].kind else {
        panic!("expected expression statement");
    };
    let context = template.matches(expression).expect("should match");
    assert_eq!(context.node(&receiver).and_then(Node::as_identifier), Some("bar"));
    assert_eq!(context.node(&method).and_then(Node::as_identifier), Some("foo"));

    assert_eq!(count_matches(&template, &parse("bar.foo(argument)")), 0);
    assert_eq!(count_matches(&template, &parse("bar.foo(...arguments)")), 0);
}

#[test]
fn spread_variable_matching_arguments() {
    let mut manager = TemplateManager::new();
    let arguments = manager.spread_variable();
    let template = manager
        .template(&format!("receiver.method({arguments})"))
        .expect("template failed");

    let recorded = RefCell::new(Vec::new());
    let mut table = Visitor::new()
        .on_template(&template, |node, context, _| {
            let NodeKind::CallExpression { arguments: actual, .. } = &node.kind else {
                panic!("expected call expression");
            };
            let captured = context.nodes(&arguments).expect("spread not bound");
            let captured = captured.as_dense().expect("arguments have no holes");
            assert!(ptr::eq(captured, actual.as_slice()));
            recorded
                .borrow_mut()
                .push(captured.iter().map(Node::kind_name).collect::<Vec<_>>());
        })
        .compile()
        .expect("visitor failed");

    for source in [
        "receiver.method()",
        "receiver.method(onlyArgument)",
        "receiver.method(argument1, argument2)",
        "receiver.method(...arguments)",
    ] {
        estree::visit(&parse(source), &mut table);
    }
    drop(table);

    assert_eq!(
        recorded.into_inner(),
        vec![
            vec![],
            vec!["Identifier"],
            vec!["Identifier", "Identifier"],
            vec!["SpreadElement"],
        ]
    );
}

#[test]
fn spread_variable_matching_statements() {
    let mut manager = TemplateManager::new();
    let statements = manager.spread_variable();
    let template = manager
        .template(&format!("() => {{{statements}}}"))
        .expect("template failed");
    assert_eq!(template.kind_name(), "ArrowFunctionExpression");

    let lengths = RefCell::new(Vec::new());
    let mut table = Visitor::new()
        .on_template(&template, |_, context, _| {
            let captured = context.nodes(&statements).expect("spread not bound");
            lengths.borrow_mut().push(captured.len());
        })
        .compile()
        .expect("visitor failed");
    for source in [
        "() => {}",
        "() => { onlyStatement; }",
        "() => { statement1; statement2 }",
        "() => expression",
    ] {
        estree::visit(&parse(source), &mut table);
    }
    drop(table);

    assert_eq!(lengths.into_inner(), [0, 1, 2]);
}

#[test]
fn variable_unification() {
    let mut manager = TemplateManager::new();
    let x = manager.variable();
    let template = manager.template(&format!("{x} + {x}")).expect("template failed");

    let tree = parse("foo + foo");
    let checked = RefCell::new(false);
    let mut table = Visitor::new()
        .on_template(&template, |node, context, _| {
            assert_eq!(node.kind_name(), "BinaryExpression");
            let bound: Vec<&Node> = context
                .get_matches(&x)
                .iter()
                .filter_map(|capture| capture.as_node())
                .collect();
            assert_eq!(bound.len(), 2);
            assert_eq!(bound[0].as_identifier(), Some("foo"));
            assert!(!ptr::eq(bound[0], bound[1]));
            assert!(nodes_equal(bound[0], bound[1]));
            *checked.borrow_mut() = true;
        })
        .compile()
        .expect("visitor failed");
    estree::visit(&tree, &mut table);
    drop(table);
    assert!(checked.into_inner());

    assert_eq!(count_matches(&template, &parse("foo + bar")), 0);
    assert_eq!(count_matches(&template, &parse("bar + foo")), 0);
    assert_eq!(count_matches(&template, &parse("a.b(1) + a.b(1)")), 1);
}

#[test]
fn declaration_group_variable() {
    let mut manager = TemplateManager::new();
    let group = manager.declaration_group_variable();
    let template = manager
        .template_parts(&["", "rest;"], &[group])
        .expect("template failed");
    assert_eq!(template.kind_name(), "VariableDeclaration");

    assert_eq!(count_matches(&template, &parse("var a, b;")), 1);
    assert_eq!(count_matches(&template, &parse("var a = 1, b = 2, c;")), 1);
    assert_eq!(count_matches(&template, &parse("let a, b;")), 0);
    assert_eq!(count_matches(&template, &parse("var a;")), 0);
}

#[test]
fn captures_equal_the_substituted_source() {
    let mut manager = TemplateManager::new();
    let promise = manager.variable();
    let handlers = manager.spread_variable();
    let parts = ["", ".then(", ")"];
    let pieces = ["fetch(url).json()", "onOk, (e) => log(e, 0x1)"];
    let template = manager
        .template_parts(&parts, &[promise, handlers])
        .expect("template failed");

    let tree = parse(&instantiate(&parts, &pieces));
    let context = template.matches(root_of(&tree)).expect("should match");

    let expected = parse(pieces[0]);
    let captured = context.node(&promise).expect("promise not bound");
    assert!(nodes_equal(captured, root_of(&expected)));
    assert_eq!(captured.source_text(&instantiate(&parts, &pieces)), pieces[0]);

    let call = parse(&format!("f({})", pieces[1]));
    let NodeKind::CallExpression { arguments, .. } = &root_of(&call).kind else {
        panic!("expected call");
    };
    let captured = context.nodes(&handlers).expect("handlers not bound");
    assert!(lists_equal(captured, NodeList::Dense(arguments)));
}

#[test]
fn captures_equal_substituted_statements_and_elements() {
    let mut manager = TemplateManager::new();
    let test = manager.variable();
    let body = manager.spread_variable();
    let parts = ["if (", ") { ", " }"];
    let pieces = ["a && !b", "first(); second = /x/g;"];
    let template = manager.template_parts(&parts, &[test, body]).expect("template failed");
    let tree = parse(&instantiate(&parts, &pieces));
    let context = template.matches(root_of(&tree)).expect("should match");
    assert!(nodes_equal(
        context.node(&test).expect("test not bound"),
        root_of(&parse(pieces[0]))
    ));
    let statements = parse(pieces[1]);
    let NodeKind::Program { body: expected, .. } = &statements.kind else {
        panic!("expected program");
    };
    assert!(lists_equal(
        context.nodes(&body).expect("body not bound"),
        NodeList::Dense(expected)
    ));

    let items = manager.spread_variable();
    let callback = manager.variable();
    let parts = ["[", "].map(", ")"];
    let pieces = ["1, , 'three'", "x => x * 2"];
    let template = manager.template_parts(&parts, &[items, callback]).expect("template failed");
    let tree = parse(&instantiate(&parts, &pieces));
    let context = template.matches(root_of(&tree)).expect("should match");
    let array = parse(&format!("[{}]", pieces[0]));
    let NodeKind::ArrayExpression { elements } = &root_of(&array).kind else {
        panic!("expected array");
    };
    assert!(lists_equal(
        context.nodes(&items).expect("items not bound"),
        NodeList::Sparse(elements)
    ));
    assert!(nodes_equal(
        context.node(&callback).expect("callback not bound"),
        root_of(&parse(pieces[1]))
    ));
}

#[test]
fn templates_can_be_rematched_from_their_own_handler() {
    let mut manager = TemplateManager::new();
    let inner = manager.variable();
    let template = manager.template(&format!("wrap({inner})")).expect("template failed");

    let seen = RefCell::new(Vec::new());
    let mut table = Visitor::new()
        .on_template(&template, |node, context, _| {
            let again = template.matches(node).expect("a matched node matches again");
            let captured = context.node(&inner).expect("inner not bound");
            let nested = template.matches(captured).map(|nested| {
                nested
                    .node(&inner)
                    .and_then(Node::as_identifier)
                    .map(str::to_string)
            });
            assert!(ptr::eq(again.node(&inner).expect("inner not rebound"), captured));
            assert!(ptr::eq(context.node(&inner).expect("context still valid"), captured));
            seen.borrow_mut().push((captured.kind_name(), nested));
        })
        .compile()
        .expect("visitor failed");
    estree::visit(&parse("wrap(wrap(leaf));"), &mut table);
    drop(table);

    assert_eq!(
        seen.into_inner(),
        vec![
            ("CallExpression", Some(Some("leaf".to_string()))),
            ("Identifier", None),
        ]
    );
}

#[test]
fn es2020_templates() {
    let options = ParserOptions::default().with_ecma_version(EcmaVersion::Es2020);
    let mut manager = TemplateManager::with_options(templates::SessionOptions { parser: options });
    let object = manager.variable();
    let template = manager.template(&format!("{object}?.length ?? 0")).expect("template failed");
    assert_eq!(template.kind_name(), "LogicalExpression");

    let tree = estree::parse("a?.length ?? 0; a.length ?? 0; a?.length || 0;", &options).expect("parse failed");
    assert_eq!(count_matches(&template, &tree), 1);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn variables_from_another_session_are_rejected() {
    let mut other = TemplateManager::new();
    let foreign = other.variable();
    let mut manager = TemplateManager::new();
    let err = manager
        .template(&format!("{foreign}.foo()"))
        .expect_err("template should fail");
    assert!(matches!(err, TemplateError::UnknownVariable { name, .. } if name == foreign.placeholder()));

    let err = manager
        .template_parts(&["", ".foo()"], &[foreign])
        .expect_err("template should fail");
    assert!(matches!(err, TemplateError::UnknownVariable { span, .. } if span == (0..foreign.placeholder().len())));
}

#[test]
fn misplaced_spreads_are_rejected() {
    let mut manager = TemplateManager::new();
    let rest = manager.spread_variable();
    let err = manager
        .template(&format!("f(first, {rest})"))
        .expect_err("template should fail");
    assert!(matches!(err, TemplateError::MisplacedSpread { .. }));
}

#[test]
fn syntax_errors_are_reported() {
    let mut manager = TemplateManager::new();
    let err = manager.template("foo(").expect_err("template should fail");
    assert!(matches!(err, TemplateError::Syntax(_)));
    assert!(matches!(manager.template(""), Err(TemplateError::Empty)));
}

#[test]
fn parser_options_apply_to_templates() {
    let mut script = TemplateManager::new();
    assert!(matches!(
        script.template("import x from 'y';"),
        Err(TemplateError::Syntax(_))
    ));

    let mut module = TemplateManager::with_options(templates::SessionOptions {
        parser: module_options(),
    });
    let template = module.template("import x from 'y';").expect("template failed");
    assert_eq!(template.kind_name(), "ImportDeclaration");
}
