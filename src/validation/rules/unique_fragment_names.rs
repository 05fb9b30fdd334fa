use std::collections::HashMap;

use smol_str::SmolStr;

use crate::ast::{Node, NodeId, NodeKind};
use crate::validation::{Rule, RuleDefect, RuleRegistrar, ValidationContext, ValidationError};

pub const CODE: &str = "5.5.1.1";

pub fn duplicate_fragment_message(name: &str) -> String {
    format!("There can be only one fragment named \"{name}\".")
}

/// Fragment definitions must have unique names.
#[derive(Debug, Default)]
pub struct UniqueFragmentNames {
    known: HashMap<SmolStr, NodeId>,
}

impl Rule for UniqueFragmentNames {
    fn name(&self) -> &'static str {
        "UniqueFragmentNames"
    }

    fn validate(&mut self, _ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        registrar.enter(NodeKind::FragmentDefinition);
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        let name = node
            .name()
            .ok_or_else(|| RuleDefect::missing_name(self.name(), node))?;

        match self.known.get(name) {
            Some(&first) => {
                let first = ctx
                    .document()
                    .node(first)
                    .ok_or_else(|| RuleDefect::internal(self.name(), "lost first fragment"))?;
                ctx.report(
                    ValidationError::new(CODE, duplicate_fragment_message(name))
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
