//! Merging per-rule callback interests into one dispatch table.

use crate::ast::NodeKind;

/// When a callback runs relative to a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the children are visited.
    Enter,
    /// After every child has been left.
    Leave,
}

/// Position of a rule in the active rule list of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

impl RuleId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Collects callback registrations from every rule of a pass.
///
/// Registration order is preserved per kind and phase, which fixes the order
/// in which callbacks run for a node and therefore the order of reported
/// diagnostics.
#[derive(Debug)]
pub struct VisitorCombinator {
    enter: Vec<Vec<RuleId>>,
    leave: Vec<Vec<RuleId>>,
}

impl VisitorCombinator {
    pub fn new() -> Self {
        Self {
            enter: vec![Vec::new(); NodeKind::COUNT],
            leave: vec![Vec::new(); NodeKind::COUNT],
        }
    }

    /// Adds a callback for `rule`. Registering the same callback twice has
    /// no effect, so each node still sees one call per rule and phase.
    pub fn register(&mut self, rule: RuleId, kind: NodeKind, phase: Phase) {
        let slot = match phase {
            Phase::Enter => &mut self.enter[kind.index()],
            Phase::Leave => &mut self.leave[kind.index()],
        };
        if !slot.contains(&rule) {
            slot.push(rule);
        }
    }

    /// Returns a registrar that records callbacks under `rule`.
    pub fn registrar(&mut self, rule: RuleId) -> RuleRegistrar<'_> {
        RuleRegistrar {
            combinator: self,
            rule,
        }
    }

    /// Freezes the collected callbacks into a lookup table.
    pub fn build(self) -> Registration {
        Registration {
            enter: self.enter,
            leave: self.leave,
        }
    }
}

impl Default for VisitorCombinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration handle given to one rule while it declares its interests.
pub struct RuleRegistrar<'a> {
    combinator: &'a mut VisitorCombinator,
    rule: RuleId,
}

impl RuleRegistrar<'_> {
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// Requests an enter callback for every node of `kind`.
    pub fn enter(&mut self, kind: NodeKind) -> &mut Self {
        self.on(kind, Phase::Enter)
    }

    /// Requests a leave callback for every node of `kind`.
    pub fn leave(&mut self, kind: NodeKind) -> &mut Self {
        self.on(kind, Phase::Leave)
    }

    pub fn on(&mut self, kind: NodeKind, phase: Phase) -> &mut Self {
        self.combinator.register(self.rule, kind, phase);
        self
    }
}

/// Per node kind, the ordered rules to call in each phase.
///
/// Built once per pass; lookups are a table index.
#[derive(Debug, Clone)]
pub struct Registration {
    enter: Vec<Vec<RuleId>>,
    leave: Vec<Vec<RuleId>>,
}

impl Registration {
    /// Returns the rules to call for a node of `kind` in `phase`.
    pub fn callbacks(&self, kind: NodeKind, phase: Phase) -> &[RuleId] {
        let table = match phase {
            Phase::Enter => &self.enter,
            Phase::Leave => &self.leave,
        };
        &table[kind.index()]
    }

    /// Total number of registered callbacks.
    pub fn callback_count(&self) -> usize {
        self.enter.iter().chain(&self.leave).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }

    /// Node kinds with at least one callback, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        NodeKind::ALL.into_iter().filter(|kind| {
            !self.enter[kind.index()].is_empty() || !self.leave[kind.index()].is_empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_registration_order() {
        let mut combinator = VisitorCombinator::new();
        combinator
            .registrar(RuleId::new(1))
            .enter(NodeKind::Field)
            .leave(NodeKind::Field);
        combinator.registrar(RuleId::new(0)).enter(NodeKind::Field);
        combinator.registrar(RuleId::new(2)).leave(NodeKind::Field);

        let registration = combinator.build();
        assert_eq!(
            registration.callbacks(NodeKind::Field, Phase::Enter),
            &[RuleId::new(1), RuleId::new(0)]
        );
        assert_eq!(
            registration.callbacks(NodeKind::Field, Phase::Leave),
            &[RuleId::new(1), RuleId::new(2)]
        );
        assert!(registration.callbacks(NodeKind::Argument, Phase::Enter).is_empty());
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut combinator = VisitorCombinator::new();
        let mut registrar = combinator.registrar(RuleId::new(0));
        registrar.enter(NodeKind::Variable).enter(NodeKind::Variable);

        let registration = combinator.build();
        assert_eq!(registration.callback_count(), 1);
        assert_eq!(
            registration.kinds().collect::<Vec<_>>(),
            vec![NodeKind::Variable]
        );
    }

    #[test]
    fn empty_registration() {
        let registration = VisitorCombinator::new().build();
        assert!(registration.is_empty());
        assert_eq!(registration.kinds().count(), 0);
    }
}
