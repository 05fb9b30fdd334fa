use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{Node, NodeId, NodeKind};
use crate::validation::{Rule, RuleDefect, RuleRegistrar, ValidationContext, ValidationError};

pub const CODE: &str = "5.2.1.1";

pub fn duplicate_operation_message(name: &str) -> String {
    format!("There can be only one operation named \"{name}\".")
}

/// Named operations must have names unique across the document.
#[derive(Debug, Default)]
pub struct UniqueOperationNames {
    known: HashMap<SmolStr, NodeId>,
}

impl Rule for UniqueOperationNames {
    fn name(&self) -> &'static str {
        "UniqueOperationNames"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar.enter(NodeKind::OperationDefinition);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        let Some(name) = node.name() else {
            return Ok(());
        };

        match self.known.get(name) {
            Some(&first) => {
                let first = ctx
                    .document()
                    .node(first)
                    .ok_or_else(|| RuleDefect::internal(self.name(), "lost first operation"))?;
                ctx.report(
                    ValidationError::new(CODE, duplicate_operation_message(name))
                        .with_node(first)
                        .with_node(node),
                );
            }
            None => {
                self.known.insert(name.into(), node.id());
            }
        }
        Ok(())
    }
}
