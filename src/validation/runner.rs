//! Orchestration of a validation pass.

use serde::{Deserialize, Serialize};

use crate::ast::Document;

use super::combinator::{RuleId, VisitorCombinator};
use super::context::{TypeInfo, ValidationContext};
use super::dispatch::traverse;
use super::error::{RuleDefect, ValidationError};
use super::rule::{Rule, RuleSet};
use super::rules::core_rules;

/// Configuration for validation passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Rule names skipped at registration.
    pub disabled_rules: Vec<String>,

    /// Consult the type information provider while traversing.
    pub track_types: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            track_types: true,
        }
    }
}

impl ValidationConfig {
    /// Reads a configuration from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|name| name == rule)
    }
}

/// Validates documents against a rule set.
///
/// A validator holds no per-pass state: every call to
/// [`validate`](Validator::validate) builds a fresh context and fresh rule
/// instances, so one validator can serve many threads.
pub struct Validator<'t> {
    /// Validation configuration.
    config: ValidationConfig,

    /// Rules to run, in registration order.
    rules: RuleSet,

    /// Optional contextual type lookup.
    type_info: Option<&'t dyn TypeInfo>,
}

impl<'t> Validator<'t> {
    /// Creates a validator running the built-in rules with default configuration.
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
            rules: core_rules(),
            type_info: None,
        }
    }

    /// Creates a validator running the built-in rules with custom configuration.
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            rules: core_rules(),
            type_info: None,
        }
    }

    /// Replaces the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the type information provider.
    pub fn with_type_info(mut self, type_info: &'t dyn TypeInfo) -> Self {
        self.type_info = Some(type_info);
        self
    }

    /// Skips the rule called `name`.
    pub fn disable_rule(mut self, name: impl Into<String>) -> Self {
        self.config.disabled_rules.push(name.into());
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Runs one pass over `document`.
    ///
    /// Returns every diagnostic in traversal order, or the first rule defect.
    pub fn validate(&self, document: &Document) -> Result<Vec<ValidationError>, RuleDefect> {
        self.execute(document, None)
    }

    /// Like [`validate`](Self::validate), with the source text available to
    /// rules through [`ValidationContext::source_text`].
    pub fn validate_with_source(
        &self,
        document: &Document,
        source: &str,
    ) -> Result<Vec<ValidationError>, RuleDefect> {
        self.execute(document, Some(source))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(nodes = document.node_count()))]
    fn execute(
        &self,
        document: &Document,
        source: Option<&str>,
    ) -> Result<Vec<ValidationError>, RuleDefect> {
        let mut ctx = ValidationContext::new(document);
        if let Some(source) = source {
            ctx = ctx.with_source(source);
        }
        if let (true, Some(type_info)) = (self.config.track_types, self.type_info) {
            ctx = ctx.with_type_info(type_info);
        }

        let mut rules: Vec<Box<dyn Rule>> = self
            .rules
            .instantiate()
            .into_iter()
            .filter(|rule| self.config.is_enabled(rule.name()))
            .collect();
        tracing::debug!(
            rules = rules.len(),
            skipped = self.rules.len() - rules.len(),
            "starting validation pass"
        );

        let mut combinator = VisitorCombinator::new();
        for (index, rule) in rules.iter_mut().enumerate() {
            rule.validate(&ctx, &mut combinator.registrar(RuleId::new(index)));
            tracing::trace!(rule = rule.name(), "rule registered");
        }
        let registration = combinator.build();

        if let Err(defect) = traverse(document.root(), &registration, &mut rules, &mut ctx) {
            tracing::warn!(rule = defect.rule(), error = %defect, "validation pass aborted");
            return Err(defect);
        }

        let errors = ctx.into_errors();
        tracing::debug!(errors = errors.len(), "validation pass finished");
        Ok(errors)
    }
}

impl Default for Validator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `rules` over `document` with default configuration.
pub fn run(document: &Document, rules: &RuleSet) -> Result<Vec<ValidationError>, RuleDefect> {
    Validator::new().with_rules(rules.clone()).validate(document)
}
