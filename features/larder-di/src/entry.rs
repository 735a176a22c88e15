use std::{fmt::Debug, sync::Arc};

use parking_lot::Mutex;

use crate::{
    errors::ContainerError,
    types::{DefinitionFn, DynError, Injectable, Value},
};

/// What an entry holds: a plain value, or a definition that produces one.
pub enum Payload {
    /// A concrete value, returned as-is on every resolution
    Value(Value),
    /// A callable invoked lazily; its result is cached after the first call
    Definition(Arc<DefinitionFn>),
}

/// A single named value-or-definition with lazy, cached resolution.
///
/// Entries are owned by an [`EntryCollection`](crate::EntryCollection);
/// aliases share the same entry by reference rather than copying it.
pub struct Entry {
    id: String,
    payload: Payload,
    state: Mutex<EntryState>,
}

/// Mutable resolution state, guarded as one unit so the
/// check-then-invoke of a first resolution cannot race
#[derive(Default)]
struct EntryState {
    /// Bound arguments, prepended to call-time arguments on every invocation
    arguments: Vec<Value>,
    /// Present once a definition has resolved
    resolved: Option<Value>,
}

impl Entry {
    pub fn new(id: impl Into<String>, payload: Payload) -> Self {
        Entry {
            id: id.into(),
            payload,
            state: Mutex::new(EntryState::default()),
        }
    }

    /// Creates a value entry. Resolution always returns `value` unchanged.
    pub fn value<T: Injectable>(id: impl Into<String>, value: T) -> Self {
        Self::new(id, Payload::Value(Arc::new(value)))
    }

    /// Creates a definition entry around a callable.
    pub fn definition<F>(id: impl Into<String>, definition: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, DynError> + Send + Sync + 'static,
    {
        Self::new(id, Payload::Definition(Arc::new(definition)))
    }

    /// The entry id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true if this entry is a definition
    pub fn is_definition(&self) -> bool {
        matches!(self.payload, Payload::Definition(_))
    }

    /// Appends bound arguments, in the given order.
    ///
    /// Value entries ignore this. Arguments appended after a definition has
    /// resolved take effect on the next forced recomputation.
    pub fn add_arguments<I>(&self, arguments: I) -> &Self
    where
        I: IntoIterator<Item = Value>,
    {
        if self.is_definition() {
            self.state.lock().arguments.extend(arguments);
        }
        self
    }

    /// Handles instantiation and returns the entry's value.
    ///
    /// A value entry returns its payload unchanged, ignoring `arguments` and
    /// `new`. A definition is invoked with its bound arguments followed by
    /// `arguments`; the result is cached and returned on subsequent calls
    /// unless `new` forces a fresh invocation. A failed invocation caches
    /// nothing.
    pub fn resolve(&self, arguments: &[Value], new: bool) -> Result<Value, ContainerError> {
        let definition = match &self.payload {
            Payload::Value(value) => return Ok(value.clone()),
            Payload::Definition(definition) => definition.clone(),
        };

        // Held across the invocation: a racing first resolution must not
        // invoke the definition twice.
        let mut state = self.state.lock();
        if let Some(resolved) = &state.resolved {
            if !new {
                return Ok(resolved.clone());
            }
        }

        let mut call_arguments = state.arguments.clone();
        call_arguments.extend_from_slice(arguments);

        let value = definition(&call_arguments).map_err(ContainerError::Definition)?;
        state.resolved = Some(value.clone());
        Ok(value)
    }
}

impl Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_definition() {
            "definition"
        } else {
            "value"
        };
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("kind", &kind)
            .field("resolved", &self.state.lock().resolved.is_some())
            .finish()
    }
}
