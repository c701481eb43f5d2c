use std::fmt;

use super::context::Context;

/// The four ordered phases of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PrepareConditions,
    EvaluateConditions,
    PrepareRules,
    ExecuteRules,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PrepareConditions => write!(f, "prepare_conditions"),
            Phase::EvaluateConditions => write!(f, "evaluate_conditions"),
            Phase::PrepareRules => write!(f, "prepare_rules"),
            Phase::ExecuteRules => write!(f, "execute_rules"),
        }
    }
}

pub type Hook = Box<dyn Fn(&Context) + Send + Sync>;

/// Observers called after each phase of a run. They see the run's context
/// but cannot alter control flow.
///
/// ```
/// use ruletree::Hooks;
///
/// let hooks = Hooks::new()
///     .after_prepare_conditions(|_| println!("conditions ready"))
///     .after_execute_rules(|_| println!("done"));
/// ```
#[derive(Default)]
pub struct Hooks {
    after_prepare_conditions: Option<Hook>,
    after_evaluate_conditions: Option<Hook>,
    after_prepare_rules: Option<Hook>,
    after_execute_rules: Option<Hook>,
}

impl Hooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn after_prepare_conditions(
        mut self,
        hook: impl Fn(&Context) + Send + Sync + 'static,
    ) -> Self {
        self.after_prepare_conditions = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn after_evaluate_conditions(
        mut self,
        hook: impl Fn(&Context) + Send + Sync + 'static,
    ) -> Self {
        self.after_evaluate_conditions = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn after_prepare_rules(
        mut self,
        hook: impl Fn(&Context) + Send + Sync + 'static,
    ) -> Self {
        self.after_prepare_rules = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn after_execute_rules(
        mut self,
        hook: impl Fn(&Context) + Send + Sync + 'static,
    ) -> Self {
        self.after_execute_rules = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire(&self, phase: Phase, ctx: &Context) {
        let hook = match phase {
            Phase::PrepareConditions => &self.after_prepare_conditions,
            Phase::EvaluateConditions => &self.after_evaluate_conditions,
            Phase::PrepareRules => &self.after_prepare_rules,
            Phase::ExecuteRules => &self.after_execute_rules,
        };
        if let Some(hook) = hook {
            hook(ctx);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("after_prepare_conditions", &self.after_prepare_conditions.is_some())
            .field("after_evaluate_conditions", &self.after_evaluate_conditions.is_some())
            .field("after_prepare_rules", &self.after_prepare_rules.is_some())
            .field("after_execute_rules", &self.after_execute_rules.is_some())
            .finish()
    }
}
