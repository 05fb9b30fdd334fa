//! The validation engine.
//!
//! A pass works in three steps. Every rule of the active [`RuleSet`] is
//! instantiated and declares, through a [`RuleRegistrar`], the node kinds it
//! wants to see on enter and on leave. The [`VisitorCombinator`] folds these
//! declarations into a [`Registration`] table indexed by node kind. Finally
//! [`traverse`] walks the document once and calls only the registered
//! callbacks, while the [`ValidationContext`] keeps the current path and
//! collects diagnostics.
//!
//! Rules report problems in the document as [`ValidationError`]s and keep
//! going. A [`RuleDefect`] means the rule itself is broken; it aborts the
//! pass.

mod combinator;
mod context;
mod dispatch;
mod error;
mod rule;
pub mod rules;
mod runner;

pub use combinator::{Phase, Registration, RuleId, RuleRegistrar, VisitorCombinator};
pub use context::{TypeInfo, ValidationContext};
pub use dispatch::traverse;
pub use error::{RuleDefect, ValidationError};
pub use rule::{Rule, RuleFactory, RuleSet};
pub use rules::core_rules;
pub use runner::{ValidationConfig, Validator, run};
