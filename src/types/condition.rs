use std::sync::Arc;

use super::context::Context;
use super::failure::Failure;

/// A named predicate gating whether a tree branch is explored.
///
/// A pure condition promises `prepare` has no observable effect, which lets
/// the engine evaluate it during the preparation pass and skip preparing
/// branches it already knows are unreachable. Impure conditions are always
/// prepared, along with everything beneath them.
pub trait Condition: Send + Sync {
    fn name(&self) -> &str;

    fn is_pure(&self) -> bool {
        true
    }

    fn prepare(&self, _ctx: &Context) -> Result<(), Failure> {
        Ok(())
    }

    fn is_valid(&self, ctx: &Context) -> bool;
}

pub type ConditionRef = Arc<dyn Condition>;
