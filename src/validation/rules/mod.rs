//! Built-in rules that need no schema.

mod lone_anonymous_operation;
mod unique_argument_names;
mod unique_fragment_names;
mod unique_input_field_names;
mod unique_operation_names;
mod unique_variable_names;

pub use lone_anonymous_operation::LoneAnonymousOperation;
pub use unique_argument_names::UniqueArgumentNames;
pub use unique_fragment_names::UniqueFragmentNames;
pub use unique_input_field_names::UniqueInputFieldNames;
pub use unique_operation_names::UniqueOperationNames;
pub use unique_variable_names::{UniqueVariableNames, duplicate_variable_message};

use super::rule::RuleSet;

/// Error codes reported by the built-in rules.
pub mod codes {
    pub use super::lone_anonymous_operation::CODE as LONE_ANONYMOUS_OPERATION;
    pub use super::unique_argument_names::CODE as UNIQUE_ARGUMENT_NAMES;
    pub use super::unique_fragment_names::CODE as UNIQUE_FRAGMENT_NAMES;
    pub use super::unique_input_field_names::CODE as UNIQUE_INPUT_FIELD_NAMES;
    pub use super::unique_operation_names::CODE as UNIQUE_OPERATION_NAMES;
    pub use super::unique_variable_names::CODE as UNIQUE_VARIABLE_NAMES;
}

/// Returns every built-in rule, variable names first.
pub fn core_rules() -> RuleSet {
    RuleSet::new()
        .with_default::<UniqueVariableNames>()
        .with_default::<UniqueOperationNames>()
        .with_default::<LoneAnonymousOperation>()
        .with_default::<UniqueFragmentNames>()
        .with_default::<UniqueArgumentNames>()
        .with_default::<UniqueInputFieldNames>()
}
