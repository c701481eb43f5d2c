use std::fmt;
use std::sync::Arc;

use super::context::Context;
use super::failure::Failure;

/// A named two-phase check.
///
/// `prepare` runs for every candidate rule before any rule executes and may
/// load what `execute` needs. A rule whose `prepare` fails is excluded from
/// execution and its failure is recorded instead.
///
/// Loaded data should be staged on the [`Context`] (see
/// [`Context::stage`]) rather than in fields of the rule, so the same rule
/// instance stays usable by overlapping runs.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn prepare(&self, _ctx: &Context) -> Result<(), Failure> {
        Ok(())
    }

    fn execute(&self, ctx: &Context) -> Result<(), Failure>;
}

/// Shared handle to a rule. Trees hold rules through this so one instance
/// can appear in many trees.
pub type RuleRef = Arc<dyn Rule>;

/// A rule selected by evaluation, paired with the route the tree took to reach it.
#[derive(Clone)]
pub struct Candidate {
    rule: RuleRef,
    path: String,
}

impl Candidate {
    /// Pair `rule` with the execution path that reached it. Caller-supplied
    /// [`Evaluable`](crate::Evaluable) nodes use this to contribute rules.
    #[must_use]
    pub fn new(rule: RuleRef, path: impl Into<String>) -> Self {
        Self {
            rule,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn rule(&self) -> &RuleRef {
        &self.rule
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.rule.name()
    }

    /// Diagnostic route, e.g. `"signup -> root -> isAdult -> leaf -> checkEmail"`.
    #[must_use]
    pub fn execution_path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("rule", &self.rule.name())
            .field("path", &self.path)
            .finish()
    }
}
