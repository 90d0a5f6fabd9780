use crate::error::{BusError, BusErrorExt, TransformError};
use crate::name::ActionName;
use fxhash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

/// Pure mapping from raw dispatch arguments to an action's value type.
///
/// Multi-argument transforms take a tuple.
pub struct Transform<A, T> {
    apply: Arc<dyn Fn(A) -> Result<T, TransformError> + Send + Sync>,
}

impl<A, T> Transform<A, T> {
    pub fn new<E, F>(f: F) -> Self
    where
        E: Into<TransformError>,
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    {
        Self { apply: Arc::new(move |args| f(args).map_err(Into::into)) }
    }

    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self { apply: Arc::new(move |args| Ok(f(args))) }
    }

    /// # Errors
    /// Whatever the transform itself returns.
    pub fn apply(&self, args: A) -> Result<T, TransformError> {
        (self.apply)(args)
    }
}

impl<A, T> Clone for Transform<A, T> {
    fn clone(&self) -> Self {
        Self { apply: self.apply.clone() }
    }
}

impl<A, T> fmt::Debug for Transform<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("args", &type_name::<A>())
            .field("value", &type_name::<T>())
            .finish()
    }
}

#[derive(Clone)]
struct Entry {
    args: &'static str,
    value: &'static str,
    transform: Arc<dyn Any + Send + Sync>,
}

/// Per-action transforms, fixed before any surface is built from them.
///
/// Actions without an entry pass their single argument through unchanged.
#[derive(Clone, Default)]
pub struct TransformTable {
    entries: FxHashMap<ActionName, Entry>,
}

impl TransformTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fallible transform for `name`, replacing any previous one.
    #[must_use]
    pub fn try_map<A, T, E, F>(self, name: impl Into<ActionName>, f: F) -> Self
    where
        A: 'static,
        T: 'static,
        E: Into<TransformError>,
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    {
        self.with(name, Transform::new(f))
    }

    /// Registers an infallible transform for `name`, replacing any previous one.
    #[must_use]
    pub fn map<A, T, F>(self, name: impl Into<ActionName>, f: F) -> Self
    where
        A: 'static,
        T: 'static,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.with(name, Transform::infallible(f))
    }

    #[must_use]
    pub fn with<A: 'static, T: 'static>(
        mut self,
        name: impl Into<ActionName>,
        transform: Transform<A, T>,
    ) -> Self {
        self.entries.insert(
            name.into(),
            Entry {
                args: type_name::<A>(),
                value: type_name::<T>(),
                transform: Arc::new(transform),
            },
        );
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the typed transform for `name`.
    ///
    /// # Errors
    /// Returns [`BusError::TypeMismatch`] if the registered transform has other
    /// argument or value types.
    pub fn get<A: 'static, T: 'static>(
        &self,
        name: &ActionName,
    ) -> Result<Option<Transform<A, T>>, BusError> {
        let Some(entry) = self.entries.get(name.as_str()) else {
            return Ok(None);
        };
        entry.transform.downcast_ref::<Transform<A, T>>().cloned().map(Some).ok_or_else(|| {
            BusError::type_mismatch(
                format!(
                    "transform maps {} -> {}, requested {} -> {}",
                    entry.args,
                    entry.value,
                    type_name::<A>(),
                    type_name::<T>()
                ),
                name,
            )
        })
    }

    /// Normalizes `args` into the value published for `name`.
    ///
    /// # Errors
    /// Returns [`BusError::TransformFailed`] if the transform fails, or
    /// [`BusError::TypeMismatch`] if the types do not line up.
    pub fn apply<A: 'static, T: 'static>(&self, name: &ActionName, args: A) -> Result<T, BusError> {
        match self.get::<A, T>(name)? {
            Some(transform) => run(&transform, name, args),
            None => passthrough(name, args),
        }
    }
}

impl fmt::Debug for TransformTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().map(ActionName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransformTable").field("actions", &names).finish()
    }
}

pub(crate) fn run<A, T>(transform: &Transform<A, T>, name: &ActionName, args: A) -> Result<T, BusError> {
    transform.apply(args).context(format!("action `{name}`"))
}

/// Checks that an action without a transform takes its value type as argument.
pub(crate) fn ensure_passthrough<A: 'static, T: 'static>(name: &ActionName) -> Result<(), BusError> {
    if TypeId::of::<A>() == TypeId::of::<T>() {
        return Ok(());
    }
    Err(missing_transform::<A, T>(name))
}

/// Identity path for actions without a transform: the argument must already be
/// the value type.
pub(crate) fn passthrough<A: 'static, T: 'static>(name: &ActionName, args: A) -> Result<T, BusError> {
    let boxed: Box<dyn Any> = Box::new(args);
    boxed.downcast::<T>().map(|value| *value).map_err(|_| missing_transform::<A, T>(name))
}

fn missing_transform<A, T>(name: &ActionName) -> BusError {
    BusError::type_mismatch(
        format!(
            "no transform registered; expected an argument of type {}, got {}",
            type_name::<T>(),
            type_name::<A>()
        ),
        name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_count(raw: &'static str) -> i64 {
        raw.trim().parse().unwrap_or(0)
    }

    #[test]
    fn apply_runs_registered_transform() {
        let table = TransformTable::new().map("count", parse_count);
        let name = ActionName::from("count");

        assert_eq!(table.apply::<&'static str, i64>(&name, "4").unwrap(), 4);
        assert_eq!(table.apply::<&'static str, i64>(&name, "not-a-number").unwrap(), 0);
    }

    #[test]
    fn apply_passes_single_argument_through_without_transform() {
        let table = TransformTable::new();
        let value: String = table.apply(&ActionName::from("search"), String::from("abc")).unwrap();
        assert_eq!(value, "abc");
    }

    #[test]
    fn passthrough_rejects_foreign_argument_type() {
        let err = TransformTable::new().apply::<u8, String>(&ActionName::from("search"), 1).unwrap_err();
        assert!(matches!(err, BusError::TypeMismatch { .. }));
    }

    #[test]
    fn multi_argument_transforms_take_tuples() {
        let table = TransformTable::new().map("sum", |(a, b, c): (i32, i32, i32)| a + b + c);
        let total: i32 = table.apply(&ActionName::from("sum"), (1, 2, 3)).unwrap();
        assert_eq!(total, 6);
    }

    #[test]
    fn failing_transform_reports_action_context() {
        let table = TransformTable::new()
            .try_map("count", |raw: String| raw.parse::<i64>());
        let err = table.apply::<String, i64>(&ActionName::from("count"), "x".into()).unwrap_err();

        assert!(matches!(&err, BusError::TransformFailed { context: Some(c), .. } if c == "action `count`"));
    }

    #[test]
    fn get_rejects_mismatched_transform_types() {
        let table = TransformTable::new().map("count", parse_count);
        let err = table.get::<String, i64>(&ActionName::from("count")).unwrap_err();
        assert!(matches!(err, BusError::TypeMismatch { .. }));
        assert!(table.contains("count"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn passthrough_requires_matching_argument_type() {
        let name = ActionName::from("count");
        assert!(ensure_passthrough::<i64, i64>(&name).is_ok());

        let err = ensure_passthrough::<String, i64>(&name).unwrap_err();
        assert!(matches!(&err, BusError::TypeMismatch { context: Some(c), .. } if c == "action `count`"));
    }
}
