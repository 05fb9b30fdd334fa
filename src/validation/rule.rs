//! The rule interface and rule sets.

use std::fmt;
use std::sync::Arc;

use crate::ast::Node;

use super::combinator::RuleRegistrar;
use super::context::ValidationContext;
use super::error::RuleDefect;

/// A unit of validation logic.
///
/// A rule instance lives for exactly one pass. During registration it
/// declares which node kinds it wants to see and in which phase; the
/// dispatcher then calls [`enter`](Rule::enter) and [`leave`](Rule::leave)
/// for matching nodes only. State that must be reset at some scope (per
/// operation, per field, ...) is reset by the rule in the callback that opens
/// that scope.
pub trait Rule: Send {
    /// Stable name used in logs, configuration and diagnostics.
    fn name(&self) -> &'static str;

    /// Declares the rule's callbacks for this pass.
    fn validate(&mut self, ctx: &ValidationContext<'_>, registrar: &mut RuleRegistrar<'_>);

    fn enter(&mut self, _ctx: &mut ValidationContext<'_>, _node: &Node) -> Result<(), RuleDefect> {
        Ok(())
    }

    fn leave(&mut self, _ctx: &mut ValidationContext<'_>, _node: &Node) -> Result<(), RuleDefect> {
        Ok(())
    }
}

/// Creates a fresh rule instance for one pass.
pub type RuleFactory = Arc<dyn Fn() -> Box<dyn Rule> + Send + Sync>;

/// An ordered, shareable set of rule factories.
///
/// Each pass instantiates every rule anew, so a set can be reused across
/// passes and threads without leaking state between them.
#[derive(Clone, Default)]
pub struct RuleSet {
    factories: Vec<RuleFactory>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule factory, such as `|| Box::new(MyRule::default())`.
    pub fn with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Rule> + Send + Sync + 'static,
    {
        self.push(factory);
        self
    }

    /// Appends a rule constructed with `Default`.
    pub fn with_default<R>(self) -> Self
    where
        R: Rule + Default + 'static,
    {
        self.with(|| Box::new(R::default()))
    }

    pub fn push<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Rule> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(factory));
    }

    /// Appends every factory of `other`, keeping its order.
    pub fn extend(&mut self, other: &RuleSet) {
        self.factories.extend(other.factories.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Creates fresh instances of every rule, in set order.
    pub fn instantiate(&self) -> Vec<Box<dyn Rule>> {
        self.factories.iter().map(|factory| factory()).collect()
    }

    /// Names of the rules in this set, in set order.
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|factory| factory().name()).collect()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.names())
            .finish()
    }
}
