mod condition;
mod context;
mod failure;
mod hooks;
mod node;
mod registry;
mod report;
mod rule;

pub use condition::{Condition, ConditionRef};
pub use context::{CancelToken, Context, SlotKey};
pub use failure::{codes, Failure};
pub use hooks::{Hook, Hooks, Phase};
pub use node::{
    all_of, any_of, any_of_labeled, conditional, either, leaf, root, Evaluable, Node, ROOT_LABEL,
};
pub use registry::DataRegistry;
pub use report::ValidationReport;
pub use rule::{Candidate, Rule, RuleRef};
