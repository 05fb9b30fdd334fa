use crate::ast::{Node, NodeKind};
use crate::validation::{Rule, RuleDefect, RuleRegistrar, ValidationContext, ValidationError};

pub const CODE: &str = "5.2.2.1";

pub const ANONYMOUS_OPERATION_MESSAGE: &str =
    "This anonymous operation must be the only defined operation.";

/// An anonymous operation is only allowed when it is the sole operation.
#[derive(Debug, Default)]
pub struct LoneAnonymousOperation {
    operation_count: usize,
}

impl Rule for LoneAnonymousOperation {
    fn name(&self) -> &'static str {
        "LoneAnonymousOperation"
    }

    fn validate(&mut self, ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>) {
        self.operation_count = ctx.document().operations().count();
        if self.operation_count > 1 {
            registrar.enter(NodeKind::OperationDefinition);
        }
    }

    fn enter(&mut self, ctx: &mut ValidationContext<'_>, node: &Node) -> Result<(), RuleDefect> {
        if node.name().is_none() && self.operation_count > 1 {
            ctx.report(ValidationError::new(CODE, ANONYMOUS_OPERATION_MESSAGE).with_node(node));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Location;
    use crate::validation::rules::test_support::{assert_valid, errors_for};

    #[test]
    fn single_anonymous_operation() {
        assert_valid::<LoneAnonymousOperation>("{ f } fragment F on T { g }");
        assert_valid::<LoneAnonymousOperation>("query A { f } query B { g }");
    }

    #[test]
    fn anonymous_with_siblings() {
        let errors = errors_for::<LoneAnonymousOperation>("{ f }\nquery B { g }\n{ h }");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, ANONYMOUS_OPERATION_MESSAGE);
        assert_eq!(errors[0].locations, vec![Location::new(1, 1)]);
        assert_eq!(errors[1].locations, vec![Location::new(3, 1)]);
    }
}
