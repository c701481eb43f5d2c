//! A composable rule-tree evaluation engine.
//!
//! Validation logic with real branching structure is expressed as a tree of
//! [`Node`]s over [`Condition`]s and [`Rule`]s. The tree is built once and
//! run many times: each run binds one value into a [`Context`], the
//! orchestrator ([`validate`]) walks the tree to find the rules that apply,
//! prepares and executes them, and returns every [`Failure`].
//!
//! ```
//! use ruletree::{
//!     conditional, is_a, leaf, root, typed_rule, validate_with_data, Context, Failure, Hooks,
//! };
//!
//! struct User { email: String }
//!
//! let tree = root([conditional(
//!     is_a::<User>("isUser"),
//!     [leaf([typed_rule::<User, _>("emailRequired", |_, u| {
//!         if u.email.is_empty() {
//!             return Err(Failure::new("email", "email is required", "EMAIL_REQUIRED"));
//!         }
//!         Ok(())
//!     })])],
//! )]);
//!
//! let user = User { email: String::new() };
//! let failures = validate_with_data(&Context::new(), &tree, &Hooks::new(), "signup", user);
//! assert_eq!(failures.codes(), ["EMAIL_REQUIRED"]);
//! ```

mod conditions;
mod dispatch;
mod error;
mod evaluate;
mod rules;
mod types;
mod validate;

pub use conditions::{
    condition, context_condition, impure_context_condition, negate, stateful_condition,
    typed_condition, typed_condition_with_prepare,
};
pub use dispatch::{has_data, is_a, narrows_to, no_data, type_switch};
pub use error::Failures;
pub use rules::{
    any_rule, chain_rules, context_rule, nop_rule, rule, typed_rule, typed_rule_with_prepare,
};
pub use types::{
    all_of, any_of, any_of_labeled, codes, conditional, either, leaf, root, CancelToken, Candidate,
    Condition, ConditionRef, Context, DataRegistry, Evaluable, Failure, Hook, Hooks, Node, Phase,
    Rule, RuleRef, SlotKey, ValidationReport, ROOT_LABEL,
};
pub use validate::{
    validate, validate_detailed, validate_multi, validate_multi_with_data, validate_with_data,
    Target, TreeAndData,
};
