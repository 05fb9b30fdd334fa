use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{Node, NodeId, NodeKind};
use crate::validation::{Rule, RuleDefect, RuleRegistrar, ValidationContext, ValidationError};

pub const CODE: &str = "5.4.2";

pub fn duplicate_argument_message(name: &str) -> String {
    format!("There can be only one argument named \"{name}\".")
}

/// Arguments of one field or directive must be uniquely named.
///
/// Each field and directive opens its own scope; nested fields do not share
/// names with their parent.
#[derive(Debug, Default)]
pub struct UniqueArgumentNames {
    scopes: Vec<HashMap<SmolStr, NodeId>>,
}

impl Rule for UniqueArgumentNames {
    fn name(&self) -> &'static str {
        "UniqueArgumentNames"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar
            .enter(NodeKind::Field)
            .leave(NodeKind::Field)
            .enter(NodeKind::Directive)
            .leave(NodeKind::Directive)
            .enter(NodeKind::Argument);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        if node.kind() != NodeKind::Argument {
            self.scopes.push(HashMap::new());
            return Ok(());
        }

        let rule = self.name();
        let name = node
            .name()
            .ok_or_else(|| RuleDefect::missing_name(rule, node))?;
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| RuleDefect::internal(rule, "argument outside a field or directive"))?;

        match scope.get(name) {
            Some(&first) => {
                let first = ctx
                    .document()
                    .node(first)
                    .ok_or_else(|| RuleDefect::internal(rule, "lost first argument"))?;
                ctx.report(
                    ValidationError::new(CODE, duplicate_argument_message(name))
                        .with_node(first)
                        .with_node(node),
                );
            }
            None => {
                scope.insert(name.into(), node.id());
            }
        }
        Ok(())
    }

    fn leave(&mut self, _ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        self.scopes
            .pop()
            .map(drop)
            .ok_or_else(|| RuleDefect::unbalanced_scope(self.name(), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::test_support::{assert_valid, errors_for};

    #[test]
    fn same_name_in_different_scopes() {
        assert_valid::<UniqueArgumentNames>(
            "{ a(x: 1) @skip(if: false) @include(if: true) { b(x: 2) { c(x: 3) } } d(x: 4) }",
        );
    }

    #[test]
    fn duplicate_field_arguments() {
        let errors = errors_for::<UniqueArgumentNames>("{ hero(id: 1, id: 2) { name(id: 3) } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, CODE);
        assert_eq!(errors[0].message, "There can be only one argument named \"id\".");
        assert_eq!(errors[0].path.to_string(), "hero");
    }

    #[test]
    fn duplicate_directive_arguments() {
        let errors = errors_for::<UniqueArgumentNames>("{ f @skip(if: true, if: false) }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path.to_string(), "f");
    }
}
