use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::conditions::narrow;
use crate::{codes, Context, Failure, Rule, RuleRef, SlotKey};

struct Pure<F> {
    name: String,
    check: F,
}

impl<F> Rule for Pure<F>
where
    F: Fn() -> Result<(), Failure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _ctx: &Context) -> Result<(), Failure> {
        (self.check)()
    }
}

/// A rule over a zero-argument check, typically closing over the value it checks.
pub fn rule<F>(name: impl Into<String>, check: F) -> RuleRef
where
    F: Fn() -> Result<(), Failure> + Send + Sync + 'static,
{
    Arc::new(Pure {
        name: name.into(),
        check,
    })
}

/// A rule that always passes.
pub fn nop_rule(name: impl Into<String>) -> RuleRef {
    rule(name, || Ok(()))
}

struct Bound<F> {
    name: String,
    check: F,
}

impl<F> Rule for Bound<F>
where
    F: Fn(&Context, &(dyn Any + Send + Sync)) -> Result<(), Failure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &Context) -> Result<(), Failure> {
        let data = ctx.get().ok_or_else(|| Failure::data_not_found(&self.name))?;
        (self.check)(ctx, data)
    }
}

/// A rule over the raw bound value. Fails with `DATA_NOT_FOUND` when nothing is bound.
pub fn context_rule<F>(name: impl Into<String>, check: F) -> RuleRef
where
    F: Fn(&Context, &(dyn Any + Send + Sync)) -> Result<(), Failure> + Send + Sync + 'static,
{
    Arc::new(Bound {
        name: name.into(),
        check,
    })
}

struct Typed<T, F> {
    name: String,
    check: F,
    _input: PhantomData<fn(&T)>,
}

impl<T, F> Rule for Typed<T, F>
where
    T: Any,
    F: Fn(&Context, &T) -> Result<(), Failure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &Context) -> Result<(), Failure> {
        let input = narrow::<T>(ctx, &self.name)?;
        (self.check)(ctx, input)
    }
}

/// A rule over the bound value narrowed to `T`.
///
/// When the bound value is not a `T` the check is never called and the rule
/// fails with `TYPE_MISMATCH`, naming both types.
///
/// ```
/// use ruletree::{typed_rule, Failure};
///
/// struct User { age: u32 }
///
/// let adult = typed_rule::<User, _>("isAdult", |_, user| {
///     if user.age < 18 {
///         return Err(Failure::new("age", "must be 18 or older", "UNDERAGE"));
///     }
///     Ok(())
/// });
/// ```
pub fn typed_rule<T, F>(name: impl Into<String>, check: F) -> RuleRef
where
    T: Any,
    F: Fn(&Context, &T) -> Result<(), Failure> + Send + Sync + 'static,
{
    Arc::new(Typed::<T, F> {
        name: name.into(),
        check,
        _input: PhantomData,
    })
}

struct TypedWithPrepare<In, T, L, F> {
    name: String,
    slot: SlotKey,
    load: L,
    check: F,
    _types: PhantomData<fn(&In) -> T>,
}

impl<In, T, L, F> Rule for TypedWithPrepare<In, T, L, F>
where
    In: Any,
    T: Any + Send + Sync,
    L: Fn(&Context, &In) -> Result<T, Failure> + Send + Sync,
    F: Fn(&Context, &In, &T) -> Result<(), Failure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, ctx: &Context) -> Result<(), Failure> {
        ctx.unstage(self.slot);
        let input = narrow::<In>(ctx, &self.name)?;
        let loaded = (self.load)(ctx, input)?;
        ctx.stage(self.slot, loaded);
        Ok(())
    }

    fn execute(&self, ctx: &Context) -> Result<(), Failure> {
        let input = narrow::<In>(ctx, &self.name)?;
        let loaded = ctx
            .staged::<T>(self.slot)
            .ok_or_else(|| Failure::data_not_prepared(&self.name))?;
        (self.check)(ctx, input, &*loaded)
    }
}

/// A rule that loads data in `prepare` and checks it in `execute`.
///
/// The loaded value is staged on the run's [`Context`], so `execute` fails
/// with `DATA_NOT_PREPARED` when called in a scope where `prepare` did not
/// succeed. Both phases re-narrow the bound value to `In`.
pub fn typed_rule_with_prepare<In, T, L, F>(name: impl Into<String>, load: L, check: F) -> RuleRef
where
    In: Any,
    T: Any + Send + Sync,
    L: Fn(&Context, &In) -> Result<T, Failure> + Send + Sync + 'static,
    F: Fn(&Context, &In, &T) -> Result<(), Failure> + Send + Sync + 'static,
{
    Arc::new(TypedWithPrepare::<In, T, L, F> {
        name: name.into(),
        slot: SlotKey::unique(),
        load,
        check,
        _types: PhantomData,
    })
}

struct AnyRule {
    name: String,
    rules: Vec<RuleRef>,
}

impl Rule for AnyRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, ctx: &Context) -> Result<(), Failure> {
        self.rules.iter().try_for_each(|rule| rule.prepare(ctx))
    }

    fn execute(&self, ctx: &Context) -> Result<(), Failure> {
        let mut failures = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            match rule.execute(ctx) {
                Ok(()) => return Ok(()),
                Err(failure) => failures.push(failure),
            }
        }
        if failures.is_empty() {
            return Ok(());
        }
        let message = failures
            .iter()
            .map(Failure::message)
            .collect::<Vec<_>>()
            .join("; ");
        Err(Failure::new(&self.name, message, codes::NO_ALTERNATIVE_PASSED).with_causes(failures))
    }
}

/// Passes as soon as one of `rules` passes, trying them in order.
///
/// Preparation stops at the first member that fails to prepare. When every
/// member fails, the result is one `NO_ALTERNATIVE_PASSED` failure whose
/// [`causes`](Failure::causes) are the members' failures. An empty group passes.
pub fn any_rule(name: impl Into<String>, rules: impl IntoIterator<Item = RuleRef>) -> RuleRef {
    Arc::new(AnyRule {
        name: name.into(),
        rules: rules.into_iter().collect(),
    })
}

struct Chain {
    name: String,
    rules: Vec<RuleRef>,
}

impl Rule for Chain {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&self, ctx: &Context) -> Result<(), Failure> {
        self.rules.iter().try_for_each(|rule| rule.prepare(ctx))
    }

    fn execute(&self, ctx: &Context) -> Result<(), Failure> {
        self.rules.iter().try_for_each(|rule| rule.execute(ctx))
    }
}

/// Runs `rules` in order, stopping at and returning the first failure.
pub fn chain_rules(name: impl Into<String>, rules: impl IntoIterator<Item = RuleRef>) -> RuleRef {
    Arc::new(Chain {
        name: name.into(),
        rules: rules.into_iter().collect(),
    })
}
