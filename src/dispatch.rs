//! Conditions that route a merged tree by the runtime type of the bound value.
//!
//! Trees produced independently (say, one per domain type) can be merged
//! under a single [`root`](crate::root) and guarded with these so each
//! subtree only fires for its own type.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Condition, ConditionRef, Context};

struct IsA {
    name: String,
    target: TypeId,
}

impl Condition for IsA {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        ctx.is_type(self.target)
    }
}

/// True when the bound value is exactly a `T`.
///
/// The target type identity is captured once here; each check compares it
/// against the identity the registry recorded at bind time.
///
/// ```
/// use ruletree::{conditional, is_a, leaf, nop_rule, root};
///
/// struct User;
/// struct Product;
///
/// let tree = root([
///     conditional(is_a::<User>("isUser"), [leaf([nop_rule("userRules")])]),
///     conditional(is_a::<Product>("isProduct"), [leaf([nop_rule("productRules")])]),
/// ]);
/// ```
pub fn is_a<T: Any>(name: impl Into<String>) -> ConditionRef {
    Arc::new(IsA {
        name: name.into(),
        target: TypeId::of::<T>(),
    })
}

struct Narrows<T> {
    name: String,
    _target: PhantomData<fn(&T)>,
}

impl<T: Any> Condition for Narrows<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        ctx.get_as::<T>().is_some()
    }
}

/// True when the bound value can be narrowed to `T` by a direct downcast.
pub fn narrows_to<T: Any>(name: impl Into<String>) -> ConditionRef {
    Arc::new(Narrows::<T> {
        name: name.into(),
        _target: PhantomData,
    })
}

struct TypeSwitch<F> {
    name: String,
    check: F,
}

impl<F> Condition for TypeSwitch<F>
where
    F: Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        ctx.get().is_some_and(|data| (self.check)(data))
    }
}

/// Hands the raw bound value to `check`, for dispatch over several types at once.
/// False when nothing is bound.
///
/// ```
/// use ruletree::type_switch;
///
/// let numeric = type_switch("isNumeric", |data| data.is::<i64>() || data.is::<f64>());
/// ```
pub fn type_switch<F>(name: impl Into<String>, check: F) -> ConditionRef
where
    F: Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync + 'static,
{
    Arc::new(TypeSwitch {
        name: name.into(),
        check,
    })
}

struct Bound {
    name: String,
    expected: bool,
}

impl Condition for Bound {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self, ctx: &Context) -> bool {
        ctx.registry().is_some() == self.expected
    }
}

/// True when the context carries bound data.
pub fn has_data(name: impl Into<String>) -> ConditionRef {
    Arc::new(Bound {
        name: name.into(),
        expected: true,
    })
}

/// True when the context carries no bound data.
pub fn no_data(name: impl Into<String>) -> ConditionRef {
    Arc::new(Bound {
        name: name.into(),
        expected: false,
    })
}
