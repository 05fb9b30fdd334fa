use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{Node, NodeId, NodeKind};
use crate::validation::{Rule, RuleDefect, RuleRegistrar, ValidationContext, ValidationError};

pub const CODE: &str = "5.6.3";

pub fn duplicate_input_field_message(name: &str) -> String {
    format!("There can be only one input field named \"{name}\".")
}

/// Fields of an input object literal must be uniquely named.
#[derive(Debug, Default)]
pub struct UniqueInputFieldNames {
    scopes: Vec<HashMap<SmolStr, NodeId>>,
}

impl Rule for UniqueInputFieldNames {
    fn name(&self) -> &'static str {
        "UniqueInputFieldNames"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar
            .enter(NodeKind::ObjectValue)
            .leave(NodeKind::ObjectValue)
            .enter(NodeKind::ObjectField);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        if node.kind() == NodeKind::ObjectValue {
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
            .ok_or_else(|| RuleDefect::internal(rule, "object field outside an object value"))?;

        match scope.get(name) {
            Some(&first) => {
                let first = ctx
                    .document()
                    .node(first)
                    .ok_or_else(|| RuleDefect::internal(rule, "lost first input field"))?;
                ctx.report(
                    ValidationError::new(CODE, duplicate_input_field_message(name))
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
