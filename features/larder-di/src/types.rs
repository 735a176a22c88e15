use std::{any::Any, sync::Arc};

/// All errors must be clone-free and sendable across threads
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// We assume the container may be shared across threads,
/// so anything stored in it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// An opaque value held by the container.
///
/// Values are reference-counted so a cached resolution, an alias and a
/// caller can all share the same underlying object.
pub type Value = Arc<dyn Any + Send + Sync>;

/// A definition callable: invoked with the entry's bound arguments
/// concatenated with the call-time arguments, in that order.
pub type DefinitionFn = dyn Fn(&[Value]) -> Result<Value, DynError> + Send + Sync;

/// Wraps any injectable value into an opaque container [`Value`].
pub fn value<T: Injectable>(value: T) -> Value {
    Arc::new(value)
}

/// Downcasts an opaque [`Value`] back to a concrete type.
pub fn downcast<T: Injectable>(value: Value) -> Result<Arc<T>, Value> {
    value.downcast::<T>()
}
