use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{Node, NodeId, NodeKind};
use crate::validation::{Rule, RuleDefect, RuleRegistrar, ValidationContext, ValidationError};

pub const CODE: &str = "5.7.1";

/// Message reported for a repeated variable name.
pub fn duplicate_variable_message(name: &str) -> String {
    format!("There can be only one variable named \"{name}\"")
}

/// A GraphQL operation is only valid if all its variables are uniquely named.
///
/// Every later definition of a name is compared against the first one in the
/// same operation, so `k` definitions of one name yield `k - 1` errors.
#[derive(Debug, Default)]
pub struct UniqueVariableNames {
    known: HashMap<SmolStr, NodeId>,
}

impl Rule for UniqueVariableNames {
    fn name(&self) -> &'static str {
        "UniqueVariableNames"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar
            .enter(NodeKind::OperationDefinition)
            .enter(NodeKind::VariableDefinition);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        match node.kind() {
            NodeKind::OperationDefinition => self.known.clear(),
            NodeKind::VariableDefinition => {
                let name = node
                    .name()
                    .ok_or_else(|| RuleDefect::missing_name(self.name(), node))?;

                match self.known.get(name) {
                    Some(&first) => {
                        let first = ctx.document().node(first).ok_or_else(|| {
                            RuleDefect::internal(self.name(), "lost first variable definition")
                        })?;
                        ctx.report(
                            ValidationError::new(CODE, duplicate_variable_message(name))
                                .with_node(first)
                                .with_node(node),
                        );
                    }
                    None => {
                        self.known.insert(name.into(), node.id());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
