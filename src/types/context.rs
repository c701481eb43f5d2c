use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::registry::DataRegistry;

/// Cooperative cancellation flag shared between a caller and the checks it runs.
///
/// The engine never polls it; conditions and rules that do slow work should.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Identifies one condition or rule instance's staging slot in a run scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey(u64);

impl SlotKey {
    /// Allocate a key no other instance in this process shares.
    #[must_use]
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type Staged = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Slots(Mutex<HashMap<SlotKey, Staged>>);

/// Execution context threaded through every `prepare`, `is_valid` and
/// `execute` call of a run.
///
/// Carries the bound [`DataRegistry`], the cancellation signal and deadline,
/// and a run-scoped map where prepare-bearing checks stage the data they load.
/// It is deliberately not a general dependency container.
///
/// Binding data with [`with_data`](Self::with_data) or
/// [`with_registry`](Self::with_registry) opens a new run scope: the new
/// binding shadows the old one and staged data starts empty, while
/// cancellation and deadline carry over. Cloning a context shares its scope.
#[derive(Clone, Default)]
pub struct Context {
    registry: Option<Arc<DataRegistry>>,
    cancel: CancelToken,
    deadline: Option<Instant>,
    slots: Arc<Slots>,
}

impl Context {
    /// Create an empty context with no bound data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a registry, shadowing any existing binding, in a fresh run scope.
    ///
    /// Takes `&self` because it derives a child context: the parent keeps its
    /// own binding and staged data, so one base context can spawn a scope per
    /// run or per batch target. The run settings below configure a context in
    /// place and so consume it.
    #[must_use]
    pub fn with_registry(&self, registry: Arc<DataRegistry>) -> Self {
        Self {
            registry: Some(registry),
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            slots: Arc::default(),
        }
    }

    /// Bind `data` in a fresh run scope.
    #[must_use]
    pub fn with_data<T: Any + Send + Sync>(&self, data: T) -> Self {
        self.with_registry(Arc::new(DataRegistry::new(data)))
    }

    /// Share `token` with the caller. Child scopes inherit it.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Child scopes inherit the deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn registry(&self) -> Option<&DataRegistry> {
        self.registry.as_deref()
    }

    /// The raw bound value, if any.
    #[must_use]
    pub fn get(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.registry().map(DataRegistry::get)
    }

    /// The bound value narrowed to `T`. `None` if nothing is bound or the
    /// bound value is of another type.
    #[must_use]
    pub fn get_as<T: Any>(&self) -> Option<&T> {
        self.registry().and_then(DataRegistry::get_as::<T>)
    }

    /// # Panics
    ///
    /// Panics if no data is bound.
    #[must_use]
    pub fn must_get(&self) -> &(dyn Any + Send + Sync) {
        match self.get() {
            Some(v) => v,
            None => panic!("validation data not found in context"),
        }
    }

    /// # Panics
    ///
    /// Panics if no data is bound or it is not a `T`.
    #[must_use]
    pub fn must_get_as<T: Any>(&self) -> &T {
        match self.registry() {
            Some(reg) => reg.must_get_as::<T>(),
            None => panic!(
                "validation data not found in context, expected {}",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Type identity of the bound value.
    #[must_use]
    pub fn type_of(&self) -> Option<TypeId> {
        self.registry().map(DataRegistry::type_id)
    }

    /// Whether the bound value is exactly of the given type.
    #[must_use]
    pub fn is_type(&self, target: TypeId) -> bool {
        self.type_of() == Some(target)
    }

    #[must_use]
    pub fn bound_type_name(&self) -> Option<&'static str> {
        self.registry().map(DataRegistry::type_name)
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when no deadline is set,
    /// zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// True once the token is cancelled or the deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Store a loaded value for `key` in this run scope, replacing any previous one.
    pub fn stage<T: Any + Send + Sync>(&self, key: SlotKey, value: T) {
        self.slots.0.lock().insert(key, Arc::new(value));
    }

    /// Fetch the value staged for `key`, if one of type `T` exists.
    #[must_use]
    pub fn staged<T: Any + Send + Sync>(&self, key: SlotKey) -> Option<Arc<T>> {
        let value = self.slots.0.lock().get(&key).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Drop whatever is staged for `key`.
    pub fn unstage(&self, key: SlotKey) {
        self.slots.0.lock().remove(&key);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("registry", &self.registry)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("deadline", &self.deadline)
            .field("staged", &self.slots.0.lock().len())
            .finish()
    }
}
