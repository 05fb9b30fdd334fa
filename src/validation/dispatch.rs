//! Single-pass, depth-first dispatch of nodes to registered rules.

use crate::ast::{Node, NodeKind};

use super::combinator::{Phase, Registration};
use super::context::ValidationContext;
use super::error::RuleDefect;
use super::rule::Rule;

/// Walks the tree rooted at `root`, calling registered rule callbacks.
///
/// For every node: path and type are pushed, enter callbacks run in
/// registration order, children are visited in document order, leave
/// callbacks run in the same registration order, then path and type are
/// popped. The first callback error stops the walk and is returned as is.
pub fn traverse(
    root: &Node,
    registration: &Registration,
    rules: &mut [Box<dyn Rule>],
    ctx: &mut ValidationContext<'_>,
) -> Result<(), RuleDefect> {
    Dispatcher {
        registration,
        rules,
    }
    .visit(root, ctx)
}

struct Dispatcher<'r> {
    registration: &'r Registration,
    rules: &'r mut [Box<dyn Rule>],
}

impl Dispatcher<'_> {
    fn visit(&mut self, node: &Node, ctx: &mut ValidationContext<'_>) -> Result<(), RuleDefect> {
        let pushed = ctx.enter_node(node);
        self.dispatch(node, Phase::Enter, ctx)?;

        let is_list = node.kind() == NodeKind::ListValue;
        for (index, child) in node.children().iter().enumerate() {
            if is_list {
                ctx.enter_list_item(index);
                self.visit(child, ctx)?;
                ctx.leave_list_item();
            } else {
                self.visit(child, ctx)?;
            }
        }

        self.dispatch(node, Phase::Leave, ctx)?;
        ctx.leave_node(pushed);
        Ok(())
    }

    fn dispatch(
        &mut self,
        node: &Node,
        phase: Phase,
        ctx: &mut ValidationContext<'_>,
    ) -> Result<(), RuleDefect> {
        let registration = self.registration;
        for &id in registration.callbacks(node.kind(), phase) {
            let rule = &mut self.rules[id.index()];
            ctx.set_active_rule(rule.name());
            match phase {
                Phase::Enter => rule.enter(ctx, node)?,
                Phase::Leave => rule.leave(ctx, node)?,
            }
        }
        Ok(())
    }
}
