//! Recursive-descent parsing of executable definitions.

use smol_str::SmolStr;

use super::base::{ParseResult, TokenStream};
use crate::ast::{LineIndex, Node, NodeId, NodeKind, Span};
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};

/// Parses a token stream into a `Document` root node.
///
/// Definition-level errors are recorded and parsing resumes at the next
/// definition keyword, so every broken definition is reported once.
pub(super) fn parse_document_tokens(tokens: &[Token], source: &str) -> (Node, Vec<Diag>) {
    let mut parser = DocumentParser {
        stream: TokenStream::new(tokens),
        source,
        lines: LineIndex::new(source),
        diagnostics: Vec::new(),
    };
    let root = parser.parse_document();
    (root, parser.diagnostics)
}

struct DocumentParser<'a> {
    stream: TokenStream<'a>,
    source: &'a str,
    lines: LineIndex,
    diagnostics: Vec<Diag>,
}

impl DocumentParser<'_> {
    fn parse_document(&mut self) -> Node {
        let start = self.stream.current().span.start;
        let mut definitions = Vec::new();

        if self.stream.is_eof() {
            self.diagnostics.push(
                Diag::error("document must contain at least one definition")
                    .with_primary_label(start..start, "empty document")
                    .with_code("P002"),
            );
        }

        while !self.stream.is_eof() {
            match self.parse_definition() {
                Ok(definition) => definitions.push(definition),
                Err(diag) => {
                    self.diagnostics.push(*diag);
                    self.synchronize();
                }
            }
        }

        self.node(NodeKind::Document, 0..self.source.len())
            .with_children(definitions)
    }

    /// Skips to the next token that can start a definition.
    fn synchronize(&mut self) {
        self.stream.advance();
        while !self.stream.is_eof() && !self.at_definition_start() {
            self.stream.advance();
        }
    }

    fn at_definition_start(&self) -> bool {
        ["query", "mutation", "subscription", "fragment"]
            .iter()
            .any(|keyword| self.stream.check_name(keyword))
    }

    fn parse_definition(&mut self) -> ParseResult<Node> {
        if self.stream.check(&TokenKind::LBrace) {
            let start = self.stream.current().span.start;
            let selection_set = self.parse_selection_set()?;
            return Ok(self
                .finish(NodeKind::OperationDefinition, start)
                .with_value("query")
                .with_child(selection_set));
        }

        match &self.stream.current().kind {
            TokenKind::Name(name) if matches!(name.as_str(), "query" | "mutation" | "subscription") => {
                self.parse_operation_definition()
            }
            TokenKind::Name(name) if name == "fragment" => self.parse_fragment_definition(),
            other => Err(self.stream.error_here_with_code(
                format!("expected an operation or fragment definition, found {other}"),
                "P003",
            )),
        }
    }

    fn parse_operation_definition(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        let (operation, _) = self.stream.expect_name()?;

        let name = match &self.stream.current().kind {
            TokenKind::Name(_) => Some(self.stream.expect_name()?.0),
            _ => None,
        };

        let mut children = Vec::new();
        if self.stream.check(&TokenKind::LParen) {
            children.extend(self.parse_variable_definitions()?);
        }
        children.extend(self.parse_directives(false)?);
        children.push(self.parse_selection_set()?);

        let mut node = self
            .finish(NodeKind::OperationDefinition, start)
            .with_value(operation)
            .with_children(children);
        if let Some(name) = name {
            node = node.with_name(name);
        }
        Ok(node)
    }

    fn parse_fragment_definition(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        self.stream.expect_keyword("fragment")?;

        if self.stream.check_name("on") {
            return Err(self
                .stream
                .error_here_with_code("fragment cannot be named 'on'", "P004"));
        }
        let (name, _) = self.stream.expect_name()?;
        let type_condition = self.parse_type_condition()?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(self
            .finish(NodeKind::FragmentDefinition, start)
            .with_name(name)
            .with_child(type_condition)
            .with_children(directives)
            .with_child(selection_set))
    }

    fn parse_type_condition(&mut self) -> ParseResult<Node> {
        self.stream.expect_keyword("on")?;
        self.parse_named_type()
    }

    fn parse_variable_definitions(&mut self) -> ParseResult<Vec<Node>> {
        self.stream.expect(TokenKind::LParen)?;
        let mut definitions = Vec::new();
        while !self.stream.check(&TokenKind::RParen) {
            definitions.push(self.parse_variable_definition()?);
        }
        if definitions.is_empty() {
            return Err(self
                .stream
                .error_here_with_code("expected at least one variable definition", "P005"));
        }
        self.stream.expect(TokenKind::RParen)?;
        Ok(definitions)
    }

    fn parse_variable_definition(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        let name = self.parse_variable_name()?;
        self.stream.expect(TokenKind::Colon)?;

        let mut children = vec![self.parse_type()?];
        if self.stream.consume(&TokenKind::Equals) {
            children.push(self.parse_value(true)?);
        }
        children.extend(self.parse_directives(true)?);

        Ok(self
            .finish(NodeKind::VariableDefinition, start)
            .with_name(name)
            .with_children(children))
    }

    fn parse_variable_name(&mut self) -> ParseResult<SmolStr> {
        self.stream.expect(TokenKind::Dollar)?;
        Ok(self.stream.expect_name()?.0)
    }

    fn parse_type(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        let inner = if self.stream.consume(&TokenKind::LBracket) {
            let item = self.parse_type()?;
            self.stream.expect(TokenKind::RBracket)?;
            self.finish(NodeKind::ListType, start).with_child(item)
        } else {
            self.parse_named_type()?
        };

        if self.stream.consume(&TokenKind::Bang) {
            Ok(self.finish(NodeKind::NonNullType, start).with_child(inner))
        } else {
            Ok(inner)
        }
    }

    fn parse_named_type(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        let (name, _) = self.stream.expect_name()?;
        Ok(self.finish(NodeKind::NamedType, start).with_name(name))
    }

    fn parse_directives(&mut self, is_const: bool) -> ParseResult<Vec<Node>> {
        let mut directives = Vec::new();
        while self.stream.check(&TokenKind::At) {
            let start = self.stream.current().span.start;
            self.stream.advance();
            let (name, _) = self.stream.expect_name()?;
            let arguments = self.parse_arguments(is_const)?;
            directives.push(
                self.finish(NodeKind::Directive, start)
                    .with_name(name)
                    .with_children(arguments),
            );
        }
        Ok(directives)
    }

    fn parse_arguments(&mut self, is_const: bool) -> ParseResult<Vec<Node>> {
        if !self.stream.consume(&TokenKind::LParen) {
            return Ok(Vec::new());
        }
        let mut arguments = Vec::new();
        while !self.stream.check(&TokenKind::RParen) {
            let start = self.stream.current().span.start;
            let (name, _) = self.stream.expect_name()?;
            self.stream.expect(TokenKind::Colon)?;
            let value = self.parse_value(is_const)?;
            arguments.push(
                self.finish(NodeKind::Argument, start)
                    .with_name(name)
                    .with_child(value),
            );
        }
        if arguments.is_empty() {
            return Err(self
                .stream
                .error_here_with_code("expected at least one argument", "P005"));
        }
        self.stream.expect(TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_selection_set(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        self.stream.expect(TokenKind::LBrace)?;
        let mut selections = Vec::new();
        while !self.stream.check(&TokenKind::RBrace) {
            if self.stream.is_eof() {
                return Err(self.stream.error_here("unclosed selection set"));
            }
            selections.push(self.parse_selection()?);
        }
        if selections.is_empty() {
            return Err(self
                .stream
                .error_here_with_code("selection set cannot be empty", "P005"));
        }
        self.stream.expect(TokenKind::RBrace)?;
        Ok(self
            .finish(NodeKind::SelectionSet, start)
            .with_children(selections))
    }

    fn parse_selection(&mut self) -> ParseResult<Node> {
        if self.stream.check(&TokenKind::Spread) {
            self.parse_fragment_selection()
        } else {
            self.parse_field()
        }
    }

    fn parse_fragment_selection(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        self.stream.expect(TokenKind::Spread)?;

        match &self.stream.current().kind {
            TokenKind::Name(name) if name != "on" => {
                let (name, _) = self.stream.expect_name()?;
                let directives = self.parse_directives(false)?;
                Ok(self
                    .finish(NodeKind::FragmentSpread, start)
                    .with_name(name)
                    .with_children(directives))
            }
            _ => {
                let mut children = Vec::new();
                if self.stream.check_name("on") {
                    children.push(self.parse_type_condition()?);
                }
                children.extend(self.parse_directives(false)?);
                children.push(self.parse_selection_set()?);
                Ok(self
                    .finish(NodeKind::InlineFragment, start)
                    .with_children(children))
            }
        }
    }

    fn parse_field(&mut self) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        let (first, _) = self.stream.expect_name()?;
        let (alias, name) = if self.stream.consume(&TokenKind::Colon) {
            (Some(first), self.stream.expect_name()?.0)
        } else {
            (None, first)
        };

        let mut children = self.parse_arguments(false)?;
        children.extend(self.parse_directives(false)?);
        if self.stream.check(&TokenKind::LBrace) {
            children.push(self.parse_selection_set()?);
        }

        let mut field = self
            .finish(NodeKind::Field, start)
            .with_name(name)
            .with_children(children);
        if let Some(alias) = alias {
            field = field.with_alias(alias);
        }
        Ok(field)
    }

    fn parse_value(&mut self, is_const: bool) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        let token = self.stream.current();

        let node = match &token.kind {
            TokenKind::Dollar => {
                if is_const {
                    return Err(self.stream.error_here_with_code(
                        "variables are not allowed in constant values",
                        "P006",
                    ));
                }
                let name = self.parse_variable_name()?;
                return Ok(self.finish(NodeKind::Variable, start).with_name(name));
            }
            TokenKind::IntValue(text) => self.leaf(NodeKind::IntValue, token).with_value(text.as_str()),
            TokenKind::FloatValue(text) => {
                self.leaf(NodeKind::FloatValue, token).with_value(text.as_str())
            }
            TokenKind::StringValue(text) | TokenKind::BlockString(text) => {
                self.leaf(NodeKind::StringValue, token).with_value(text.as_str())
            }
            TokenKind::Name(name) => match name.as_str() {
                "true" | "false" => self.leaf(NodeKind::BooleanValue, token).with_value(name.clone()),
                "null" => self.leaf(NodeKind::NullValue, token),
                _ => self.leaf(NodeKind::EnumValue, token).with_value(name.clone()),
            },
            TokenKind::LBracket => return self.parse_list_value(is_const),
            TokenKind::LBrace => return self.parse_object_value(is_const),
            other => {
                return Err(self
                    .stream
                    .error_here(format!("expected a value, found {other}")));
            }
        };

        self.stream.advance();
        Ok(node)
    }

    fn parse_list_value(&mut self, is_const: bool) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        self.stream.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        while !self.stream.check(&TokenKind::RBracket) {
            if self.stream.is_eof() {
                return Err(self.stream.error_here("unclosed list value"));
            }
            items.push(self.parse_value(is_const)?);
        }
        self.stream.expect(TokenKind::RBracket)?;
        Ok(self.finish(NodeKind::ListValue, start).with_children(items))
    }

    fn parse_object_value(&mut self, is_const: bool) -> ParseResult<Node> {
        let start = self.stream.current().span.start;
        self.stream.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.stream.check(&TokenKind::RBrace) {
            let field_start = self.stream.current().span.start;
            let (name, _) = self.stream.expect_name()?;
            self.stream.expect(TokenKind::Colon)?;
            let value = self.parse_value(is_const)?;
            fields.push(
                self.finish(NodeKind::ObjectField, field_start)
                    .with_name(name)
                    .with_child(value),
            );
        }
        self.stream.expect(TokenKind::RBrace)?;
        Ok(self.finish(NodeKind::ObjectValue, start).with_children(fields))
    }

    /// Creates a node covering a single token.
    fn leaf(&self, kind: NodeKind, token: &Token) -> Node {
        self.node(kind, token.span.clone())
    }

    /// Creates a node spanning from `start` to the end of the last consumed token.
    fn finish(&self, kind: NodeKind, start: usize) -> Node {
        let end = self.stream.previous_end().max(start);
        self.node(kind, start..end)
    }

    /// Ids are placeholders until the tree is wrapped in a `Document`.
    fn node(&self, kind: NodeKind, span: Span) -> Node {
        let location = self.lines.location(self.source, span.start);
        Node::new(NodeId::new(0), kind, span, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Location;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> (Node, Vec<Diag>) {
        let lexed = tokenize(source);
        assert!(lexed.diagnostics.is_empty(), "lexer errors in {source}");
        parse_document_tokens(&lexed.tokens, source)
    }

    fn kinds(node: &Node) -> Vec<NodeKind> {
        node.descendants().map(Node::kind).collect()
    }

    #[test]
    fn shorthand_query() {
        let (root, diags) = parse("{ f }");
        assert!(diags.is_empty());
        assert_eq!(
            kinds(&root),
            vec![
                NodeKind::Document,
                NodeKind::OperationDefinition,
                NodeKind::SelectionSet,
                NodeKind::Field,
            ]
        );
        let operation = &root.children()[0];
        assert_eq!(operation.value(), Some("query"));
        assert_eq!(operation.name(), None);
    }

    #[test]
    fn ids_are_pre_order() {
        let (root, _) = parse("query Q($a: [Int!]! = [1]) { a: f(x: {y: 1}) { g } }");
        let document = crate::ast::Document::new(root);
        let ids: Vec<usize> = document.root().descendants().map(|n| n.id().index()).collect();
        let expected: Vec<usize> = (0..ids.len()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn variable_definitions_and_types() {
        let (root, diags) = parse("query Q($a: Int, $b: [String!]! = [\"x\"] @deprecated) { f }");
        assert!(diags.is_empty(), "{diags:?}");

        let operation = &root.children()[0];
        assert_eq!(operation.name(), Some("Q"));
        let variables: Vec<&Node> = operation.children_of(NodeKind::VariableDefinition).collect();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[0].name(), Some("a"));
        assert_eq!(variables[0].location(), Location::new(1, 9));
        assert_eq!(
            kinds(variables[1]),
            vec![
                NodeKind::VariableDefinition,
                NodeKind::NonNullType,
                NodeKind::ListType,
                NodeKind::NonNullType,
                NodeKind::NamedType,
                NodeKind::ListValue,
                NodeKind::StringValue,
                NodeKind::Directive,
            ]
        );
    }

    #[test]
    fn fields_fragments_and_values() {
        let source = r#"
            query {
              hero: character(id: $id, filter: {tags: [A, B], exact: true}) {
                ...Parts
                ... on Droid @include(if: $flag) { primaryFunction }
                ... { name }
              }
            }
            fragment Parts on Character { id }
        "#;
        let (root, diags) = parse(source);
        assert!(diags.is_empty(), "{diags:?}");

        let field = root
            .descendants()
            .find(|n| n.kind() == NodeKind::Field)
            .expect("field");
        assert_eq!(field.name(), Some("character"));
        assert_eq!(field.alias(), Some("hero"));
        assert_eq!(field.response_key(), Some("hero"));
        assert_eq!(field.children_of(NodeKind::Argument).count(), 2);

        let enums: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == NodeKind::EnumValue)
            .filter_map(Node::value)
            .collect();
        assert_eq!(enums, vec!["A", "B"]);

        assert_eq!(
            root.descendants()
                .filter(|n| n.kind() == NodeKind::InlineFragment)
                .count(),
            2
        );
        let fragment = root.child(NodeKind::FragmentDefinition).expect("fragment");
        assert_eq!(fragment.name(), Some("Parts"));
        assert_eq!(
            fragment.child(NodeKind::NamedType).and_then(Node::name),
            Some("Character")
        );
    }

    #[test]
    fn literal_kinds() {
        let (root, diags) = parse(r#"{ f(a: 1, b: 2.5, c: "s", d: """b""", e: false, g: null) }"#);
        assert!(diags.is_empty());
        let values: Vec<(NodeKind, Option<&str>)> = root
            .descendants()
            .filter(|n| n.kind().is_value())
            .map(|n| (n.kind(), n.value()))
            .collect();
        assert_eq!(
            values,
            vec![
                (NodeKind::IntValue, Some("1")),
                (NodeKind::FloatValue, Some("2.5")),
                (NodeKind::StringValue, Some("s")),
                (NodeKind::StringValue, Some("b")),
                (NodeKind::BooleanValue, Some("false")),
                (NodeKind::NullValue, None),
            ]
        );
    }

    #[test]
    fn variables_rejected_in_defaults() {
        let (_, diags) = parse("query($a: Int = $b) { f }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("P006"));
    }

    #[test]
    fn empty_document_is_an_error() {
        let (root, diags) = parse("   ");
        assert!(root.children().is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("P002"));
    }

    #[test]
    fn recovers_at_next_definition() {
        let (root, diags) = parse("query { } query Ok { f } garbage fragment F on T { g }");
        assert_eq!(diags.len(), 2, "{diags:?}");
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].name(), Some("Ok"));
        assert_eq!(root.children()[1].name(), Some("F"));
    }

    #[test]
    fn fragment_named_on_is_rejected() {
        let (_, diags) = parse("fragment on on T { f }");
        assert_eq!(diags[0].code.as_deref(), Some("P004"));
    }

    #[test]
    fn spans_cover_definitions() {
        let source = "query A { f }\nquery B { g }";
        let (root, _) = parse(source);
        let second = &root.children()[1];
        assert_eq!(&source[second.span().clone()], "query B { g }");
        assert_eq!(second.location(), Location::new(2, 1));
    }
}
