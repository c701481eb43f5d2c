use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Condition, ConditionRef, Context, Failure, SlotKey};

struct Closure<F> {
    name: String,
    predicate: F,
}

impl<F> Condition for Closure<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self, _ctx: &Context) -> bool {
        (self.predicate)()
    }
}

/// A pure condition over a zero-argument predicate.
pub fn condition<F>(name: impl Into<String>, predicate: F) -> ConditionRef
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    Arc::new(Closure {
        name: name.into(),
        predicate,
    })
}

struct ContextPredicate<F> {
    name: String,
    predicate: F,
    pure: bool,
}

impl<F> Condition for ContextPredicate<F>
where
    F: Fn(&Context) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_pure(&self) -> bool {
        self.pure
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        (self.predicate)(ctx)
    }
}

/// A pure condition reading the run's [`Context`], typically its bound data.
///
/// This is the main way to write data-driven conditions for reusable trees:
///
/// ```
/// use ruletree::context_condition;
///
/// struct User { age: u32 }
///
/// let is_adult = context_condition("isAdult", |ctx| {
///     ctx.get_as::<User>().is_some_and(|u| u.age >= 18)
/// });
/// ```
pub fn context_condition<F>(name: impl Into<String>, predicate: F) -> ConditionRef
where
    F: Fn(&Context) -> bool + Send + Sync + 'static,
{
    Arc::new(ContextPredicate {
        name: name.into(),
        predicate,
        pure: true,
    })
}

/// Like [`context_condition`] but declared impure, so branches beneath it are
/// always prepared even when it would evaluate false.
pub fn impure_context_condition<F>(name: impl Into<String>, predicate: F) -> ConditionRef
where
    F: Fn(&Context) -> bool + Send + Sync + 'static,
{
    Arc::new(ContextPredicate {
        name: name.into(),
        predicate,
        pure: false,
    })
}

struct Not {
    name: String,
    inner: ConditionRef,
}

impl Condition for Not {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_pure(&self) -> bool {
        self.inner.is_pure()
    }

    fn prepare(&self, ctx: &Context) -> Result<(), Failure> {
        self.inner.prepare(ctx)
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        !self.inner.is_valid(ctx)
    }
}

/// Logical negation. Purity and preparation follow the wrapped condition.
pub fn negate(inner: ConditionRef) -> ConditionRef {
    Arc::new(Not {
        name: format!("not({})", inner.name()),
        inner,
    })
}

struct Stateful<P, V> {
    name: String,
    prepare: P,
    is_valid: V,
}

impl<P, V> Condition for Stateful<P, V>
where
    P: Fn(&Context) -> Result<(), Failure> + Send + Sync,
    V: Fn(&Context) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_pure(&self) -> bool {
        false
    }

    fn prepare(&self, ctx: &Context) -> Result<(), Failure> {
        (self.prepare)(ctx)
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        (self.is_valid)(ctx)
    }
}

/// An impure condition with an explicit preparation step, e.g. fetching
/// external state that `is_valid` then reads.
pub fn stateful_condition<P, V>(name: impl Into<String>, prepare: P, is_valid: V) -> ConditionRef
where
    P: Fn(&Context) -> Result<(), Failure> + Send + Sync + 'static,
    V: Fn(&Context) -> bool + Send + Sync + 'static,
{
    Arc::new(Stateful {
        name: name.into(),
        prepare,
        is_valid,
    })
}

struct Typed<T, F> {
    name: String,
    predicate: F,
    _input: PhantomData<fn(&T)>,
}

impl<T, F> Condition for Typed<T, F>
where
    T: Any,
    F: Fn(&Context, &T) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        ctx.get_as::<T>()
            .is_some_and(|input| (self.predicate)(ctx, input))
    }
}

/// A pure condition over the bound value narrowed to `T`. False when nothing
/// is bound or the bound value is of another type.
pub fn typed_condition<T, F>(name: impl Into<String>, predicate: F) -> ConditionRef
where
    T: Any,
    F: Fn(&Context, &T) -> bool + Send + Sync + 'static,
{
    Arc::new(Typed::<T, F> {
        name: name.into(),
        predicate,
        _input: PhantomData,
    })
}

struct TypedWithPrepare<In, T, L, F> {
    name: String,
    slot: SlotKey,
    load: L,
    predicate: F,
    _types: PhantomData<fn(&In) -> T>,
}

impl<In, T, L, F> Condition for TypedWithPrepare<In, T, L, F>
where
    In: Any,
    T: Any + Send + Sync,
    L: Fn(&Context, &In) -> Result<T, Failure> + Send + Sync,
    F: Fn(&Context, &In, &T) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_pure(&self) -> bool {
        false
    }

    fn prepare(&self, ctx: &Context) -> Result<(), Failure> {
        ctx.unstage(self.slot);
        let input = narrow::<In>(ctx, &self.name)?;
        let loaded = (self.load)(ctx, input)?;
        ctx.stage(self.slot, loaded);
        Ok(())
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        let Some(input) = ctx.get_as::<In>() else {
            return false;
        };
        ctx.staged::<T>(self.slot)
            .is_some_and(|loaded| (self.predicate)(ctx, input, &*loaded))
    }
}

/// An impure condition that loads data during `prepare` and checks it during
/// `is_valid`.
///
/// `load` receives the bound value narrowed to `In` and returns the data to
/// check, for instance permissions fetched for a user. The loaded value is
/// staged on the run's [`Context`], not on the condition, so a tree holding
/// this condition can serve concurrent runs as long as each binds its own data.
///
/// `prepare` fails with `DATA_NOT_FOUND` or `TYPE_MISMATCH` when the bound
/// value cannot be narrowed, and with the loader's failure when loading fails.
pub fn typed_condition_with_prepare<In, T, L, F>(
    name: impl Into<String>,
    load: L,
    predicate: F,
) -> ConditionRef
where
    In: Any,
    T: Any + Send + Sync,
    L: Fn(&Context, &In) -> Result<T, Failure> + Send + Sync + 'static,
    F: Fn(&Context, &In, &T) -> bool + Send + Sync + 'static,
{
    Arc::new(TypedWithPrepare::<In, T, L, F> {
        name: name.into(),
        slot: SlotKey::unique(),
        load,
        predicate,
        _types: PhantomData,
    })
}

/// Narrow the bound value to `T`, reporting absence or mismatch as a failure
/// attributed to `field`.
pub(crate) fn narrow<'a, T: Any>(ctx: &'a Context, field: &str) -> Result<&'a T, Failure> {
    let registry = ctx.registry().ok_or_else(|| Failure::data_not_found(field))?;
    registry.get_as::<T>().ok_or_else(|| {
        Failure::type_mismatch(field, std::any::type_name::<T>(), registry.type_name())
    })
}
