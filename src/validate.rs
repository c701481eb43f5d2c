use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::{Candidate, Context, DataRegistry, Evaluable, Failures, Hooks, Phase, ValidationReport};

/// A tree paired with the context (and so the bound data) it runs against.
#[derive(Clone)]
pub struct Target<'a> {
    tree: &'a dyn Evaluable,
    ctx: Context,
}

impl<'a> Target<'a> {
    pub fn new(ctx: Context, tree: &'a dyn Evaluable) -> Self {
        Self { tree, ctx }
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

/// A tree paired with the data to bind for it, for
/// [`validate_multi_with_data`].
pub struct TreeAndData<'a> {
    tree: &'a dyn Evaluable,
    data: DataRegistry,
}

impl<'a> TreeAndData<'a> {
    pub fn new<T: Any + Send + Sync>(tree: &'a dyn Evaluable, data: T) -> Self {
        Self {
            tree,
            data: DataRegistry::new(data),
        }
    }
}

/// Run `tree` against `ctx` in four phases and return every recorded failure.
///
/// 1. Prepare conditions. A failure here aborts the run and is returned as
///    the only failure.
/// 2. Evaluate the tree under the label `name` to collect candidate rules. An
///    unmatched tree simply yields no candidates.
/// 3. Prepare each candidate. A rule that fails to prepare is recorded and
///    skipped; the others continue.
/// 4. Execute each prepared rule, recording every failure.
///
/// Each phase is followed by the matching hook in `hooks`.
///
/// ```
/// use ruletree::{
///     conditional, context_condition, leaf, root, typed_rule, validate, Context, Failure, Hooks,
/// };
///
/// struct User { age: u32 }
///
/// let tree = root([conditional(
///     context_condition("hasUser", |ctx| ctx.get_as::<User>().is_some()),
///     [leaf([typed_rule::<User, _>("isAdult", |_, u| {
///         if u.age < 18 {
///             return Err(Failure::new("age", "must be 18 or older", "UNDERAGE"));
///         }
///         Ok(())
///     })])],
/// )]);
///
/// let ctx = Context::new().with_data(User { age: 16 });
/// let failures = validate(&ctx, &tree, &Hooks::new(), "signup");
/// assert_eq!(failures.codes(), ["UNDERAGE"]);
/// ```
#[instrument(level = "debug", skip_all, fields(run = name))]
pub fn validate(ctx: &Context, tree: &dyn Evaluable, hooks: &Hooks, name: &str) -> Failures {
    run(ctx, &[(tree, ctx)], hooks, name, false).into_failures()
}

/// Bind `data` into a fresh run scope under `ctx`, then [`validate`].
pub fn validate_with_data<T: Any + Send + Sync>(
    ctx: &Context,
    tree: &dyn Evaluable,
    hooks: &Hooks,
    name: &str,
    data: T,
) -> Failures {
    validate(&ctx.with_data(data), tree, hooks, name)
}

/// Like [`validate`] but also reports candidate execution paths, the number
/// of rules executed and the run's duration.
#[instrument(level = "debug", skip_all, fields(run = name))]
pub fn validate_detailed(
    ctx: &Context,
    tree: &dyn Evaluable,
    hooks: &Hooks,
    name: &str,
) -> ValidationReport {
    run(ctx, &[(tree, ctx)], hooks, name, true)
}

/// Run several targets as one batch.
///
/// Condition preparation runs across all targets first and the first failure
/// aborts the whole batch. Each target is then evaluated and its candidates
/// prepared independently, and finally every prepared rule of every target
/// executes. Failures from all targets are returned together. Hooks receive
/// `ctx`, not the per-target contexts.
#[instrument(level = "debug", skip_all, fields(run = name, targets = targets.len()))]
pub fn validate_multi(
    ctx: &Context,
    targets: &[Target<'_>],
    hooks: &Hooks,
    name: &str,
) -> Failures {
    let pairs: Vec<(&dyn Evaluable, &Context)> =
        targets.iter().map(|t| (t.tree, &t.ctx)).collect();
    run(ctx, &pairs, hooks, name, false).into_failures()
}

/// [`validate_multi`] over (tree, data) pairs, each bound in its own run
/// scope under `ctx`.
pub fn validate_multi_with_data(
    ctx: &Context,
    targets: Vec<TreeAndData<'_>>,
    hooks: &Hooks,
    name: &str,
) -> Failures {
    let bound: Vec<Target<'_>> = targets
        .into_iter()
        .map(|t| Target::new(ctx.with_registry(Arc::new(t.data)), t.tree))
        .collect();
    validate_multi(ctx, &bound, hooks, name)
}

fn run(
    hook_ctx: &Context,
    targets: &[(&dyn Evaluable, &Context)],
    hooks: &Hooks,
    name: &str,
    detailed: bool,
) -> ValidationReport {
    let start = Instant::now();

    for (tree, ctx) in targets {
        if let Err(failure) = tree.prepare_conditions(ctx) {
            warn!(
                code = failure.code(),
                field = failure.field(),
                "condition preparation failed, aborting run"
            );
            return ValidationReport::new(
                Failures::new(vec![failure]),
                Vec::new(),
                0,
                start.elapsed(),
            );
        }
    }
    hooks.fire(Phase::PrepareConditions, hook_ctx);

    let evaluated: Vec<Vec<Candidate>> = targets
        .iter()
        .map(|(tree, ctx)| tree.evaluate(ctx, name).1)
        .collect();
    let candidate_count: usize = evaluated.iter().map(Vec::len).sum();
    debug!(
        phase = %Phase::EvaluateConditions,
        candidates = candidate_count,
        "collected candidate rules"
    );
    hooks.fire(Phase::EvaluateConditions, hook_ctx);

    let paths = if detailed {
        evaluated
            .iter()
            .flatten()
            .map(|c| c.execution_path().to_owned())
            .collect()
    } else {
        Vec::new()
    };

    let mut failures = Failures::default();
    let mut prepared: Vec<Vec<Candidate>> = Vec::with_capacity(targets.len());
    for ((_, ctx), candidates) in targets.iter().zip(evaluated) {
        let mut ready = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match candidate.rule().prepare(ctx) {
                Ok(()) => ready.push(candidate),
                Err(failure) => {
                    debug!(
                        rule = candidate.name(),
                        path = candidate.execution_path(),
                        code = failure.code(),
                        "rule preparation failed"
                    );
                    failures.push(failure);
                }
            }
        }
        prepared.push(ready);
    }
    let prepared_count: usize = prepared.iter().map(Vec::len).sum();
    debug!(
        phase = %Phase::PrepareRules,
        prepared = prepared_count,
        failed = failures.len(),
        "prepared rules"
    );
    hooks.fire(Phase::PrepareRules, hook_ctx);

    for ((_, ctx), ready) in targets.iter().zip(&prepared) {
        for candidate in ready {
            if let Err(failure) = candidate.rule().execute(ctx) {
                debug!(
                    rule = candidate.name(),
                    path = candidate.execution_path(),
                    code = failure.code(),
                    "rule failed"
                );
                failures.push(failure);
            }
        }
    }
    debug!(phase = %Phase::ExecuteRules, failures = failures.len(), "executed rules");
    hooks.fire(Phase::ExecuteRules, hook_ctx);

    ValidationReport::new(failures, paths, prepared_count, start.elapsed())
}
