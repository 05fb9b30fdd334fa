mod common;

use common::{format_diagnostics, parse_cleanly};
use graphql_validator::{Error, NodeKind, SourceFile, parse, parse_and_validate, render_errors};

#[test]
fn kitchen_sink_parses() {
    let document = parse_cleanly(
        r#"
        query queryName($foo: ComplexType, $site: Site = MOBILE) @onQuery {
          whoever123is: node(id: [123, 456]) {
            id
            ... on User @onInlineFragment {
              field2 {
                id
                alias: field1(first: 10, after: $foo) @include(if: $foo) {
                  id
                  ...frag @onFragmentSpread
                }
              }
            }
            ... @skip(unless: $foo) { id }
            ... { id }
          }
        }

        mutation likeStory @onMutation {
          like(story: 123) @onField { story { id } }
        }

        subscription StoryLikeSubscription($input: StoryLikeSubscribeInput) {
          storyLikeSubscribe(input: $input) { story { likers { count } } }
        }

        fragment frag on Friend @onFragmentDefinition {
          foo(size: $size, bar: $b, obj: {key: "value", block: """
            block string uses \"""
          """})
        }

        { unnamed(truthy: true, falsy: false, nullish: null), query }
        "#,
    );

    assert_eq!(document.operations().count(), 4);
    assert_eq!(document.fragments().count(), 1);

    let kinds: Vec<&str> = document
        .operations()
        .map(|operation| operation.value().unwrap_or_default())
        .collect();
    assert_eq!(kinds, vec!["query", "mutation", "subscription", "query"]);
}

#[test]
fn aliases_become_response_keys() {
    let document = parse_cleanly("{ first: hero { name } hero }");
    let selection_set = document
        .operations()
        .next()
        .and_then(|operation| operation.child(NodeKind::SelectionSet))
        .expect("selection set");

    let keys: Vec<&str> = selection_set
        .children()
        .iter()
        .filter_map(|field| field.response_key())
        .collect();
    assert_eq!(keys, vec!["first", "hero"]);
    assert_eq!(selection_set.children()[0].name(), Some("hero"));
    assert_eq!(selection_set.children()[0].alias(), Some("first"));
}

#[test]
fn node_ids_follow_document_order() {
    let document = parse_cleanly("query($a: Int) { f(x: [1, {y: 2}]) }");
    let ids: Vec<usize> = document
        .root()
        .descendants()
        .map(|node| node.id().index())
        .collect();
    assert_eq!(ids, (0..document.node_count()).collect::<Vec<_>>());
}

#[test]
fn variable_definitions_keep_types_and_defaults() {
    let document = parse_cleanly("query($ids: [ID!]! = [\"1\"] @deprecated) { f }");
    let variable = document
        .root()
        .descendants()
        .find(|node| node.kind() == NodeKind::VariableDefinition)
        .expect("variable definition");

    assert_eq!(variable.name(), Some("ids"));
    let kinds: Vec<NodeKind> = variable.children().iter().map(|child| child.kind()).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::NonNullType, NodeKind::ListValue, NodeKind::Directive]
    );
}

#[test]
fn recovery_reports_every_broken_definition() {
    let result = parse("query A { a( } query B { b(: 1) } query C { c }");

    assert!(result.has_errors());
    assert!(result.document.is_none());
    assert_eq!(
        result.diagnostics.len(),
        2,
        "{}",
        format_diagnostics(&result.diagnostics)
    );
    assert!(
        result
            .diagnostics
            .iter()
            .all(|diag| diag.code.as_deref().is_some_and(|code| code.starts_with('P')))
    );
}

#[test]
fn lexer_and_parser_errors_are_combined() {
    let result = parse("query { a(x: \"bad \\q escape\") } fragment on on T { b }");
    let codes: Vec<&str> = result
        .diagnostics
        .iter()
        .filter_map(|diag| diag.code.as_deref())
        .collect();

    assert!(codes.contains(&"L003"), "{codes:?}");
    assert!(codes.contains(&"P004"), "{codes:?}");
}

#[test]
fn syntax_errors_stop_before_validation() {
    match parse_and_validate("query($a: Int, $a: Int) { f") {
        Err(Error::Syntax(diags)) => assert!(!diags.is_empty()),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn syntax_reports_render_with_codes() {
    let source = "{ }";
    let result = parse(source);
    let reports = result.reports(&SourceFile::with_name(source, "empty.graphql"));

    assert_eq!(reports.len(), 1);
    let code = reports[0].code().map(|code| code.to_string());
    assert_eq!(code.as_deref(), Some("P005"));
}

#[test]
fn validation_reports_render_against_source() {
    let source = "query($a: Int,\n      $a: String) { f }";
    let errors = parse_and_validate(source).expect("parsed");
    let reports = render_errors(&errors, &SourceFile::with_name(source, "dup.graphql"));

    assert_eq!(reports.len(), 1);
    let rendered = format!("{:?}", reports[0]);
    assert!(rendered.contains("There can be only one variable named \"a\""));
    assert!(rendered.contains("first defined here"));
    assert!(rendered.contains("conflicts here"));
    assert!(rendered.contains("UniqueVariableNames"));
}
