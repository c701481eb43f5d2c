use std::any::{Any, TypeId};
use std::fmt;

/// Holds the single value a run validates.
///
/// Binding the value through the [`Context`](super::Context) instead of
/// capturing it in closures is what lets one tree be built once and
/// evaluated against many values. The value's type identity and name are
/// captured at construction so dispatch never recomputes them.
///
/// Note that the registry records the concrete type passed to [`new`](Self::new):
/// binding an `Arc<User>` is not the same as binding a `User`.
pub struct DataRegistry {
    data: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl DataRegistry {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self {
            data: Box::new(data),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The raw bound value.
    #[must_use]
    pub fn get(&self) -> &(dyn Any + Send + Sync) {
        self.data.as_ref()
    }

    /// The bound value narrowed to `T`, or `None` if it is of another type.
    #[must_use]
    pub fn get_as<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Like [`get_as`](Self::get_as) but panics on a type mismatch.
    ///
    /// # Panics
    ///
    /// Panics if the bound value is not a `T`. Only use this where a mismatch
    /// is a programming error rather than a validation outcome.
    #[must_use]
    pub fn must_get_as<T: Any>(&self) -> &T {
        match self.get_as::<T>() {
            Some(v) => v,
            None => panic!(
                "validation data is {}, not {}",
                self.type_name,
                std::any::type_name::<T>()
            ),
        }
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for DataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataRegistry")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct User {
        name: &'static str,
    }

    struct Product;

    #[test]
    fn get_as_matching_type() {
        let reg = DataRegistry::new(User { name: "alice" });
        assert_eq!(reg.get_as::<User>(), Some(&User { name: "alice" }));
    }

    #[test]
    fn get_as_wrong_type() {
        let reg = DataRegistry::new(User { name: "alice" });
        assert!(reg.get_as::<Product>().is_none());
    }

    #[test]
    fn type_identity_is_cached() {
        let reg = DataRegistry::new(42_i64);
        assert_eq!(reg.type_id(), TypeId::of::<i64>());
        assert_eq!(reg.type_name(), "i64");
        assert!(reg.is::<i64>());
        assert!(!reg.is::<i32>());
    }

    #[test]
    fn raw_value_downcasts() {
        let reg = DataRegistry::new(String::from("x"));
        assert_eq!(reg.get().downcast_ref::<String>().map(String::as_str), Some("x"));
    }

    #[test]
    fn wrapped_type_is_distinct() {
        let reg = DataRegistry::new(std::sync::Arc::new(User { name: "bob" }));
        assert!(reg.get_as::<User>().is_none());
        assert!(reg.get_as::<std::sync::Arc<User>>().is_some());
    }

    #[test]
    #[should_panic(expected = "not")]
    fn must_get_as_panics_on_mismatch() {
        let reg = DataRegistry::new(User { name: "alice" });
        let _ = reg.must_get_as::<Product>();
    }
}
