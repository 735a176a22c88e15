use std::{any::type_name, fmt::Debug, sync::Arc};

use parking_lot::Mutex;

use crate::{
    collection::EntryCollection,
    entry::{Entry, Payload},
    errors::ContainerError,
    provider::{EntryProvider, ProviderCollection},
    types::{DynError, Injectable, Value},
};

/// The container facade: an entry collection for what is already known, a
/// provider collection for what can be supplied on demand.
///
/// Resolution routes through the entry collection first; an id only known to
/// a provider triggers that provider's one-time registration before the
/// lookup is retried. The container carries no global state and is passed by
/// reference to collaborators.
pub struct Container {
    entries: EntryCollection,
    providers: ProviderCollection,
    /// Arguments bound onto every subsequently added entry
    entry_arguments: Mutex<Vec<Value>>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_collections(EntryCollection::new(), ProviderCollection::new())
    }

    /// Builds a container around existing collections.
    pub fn with_collections(entries: EntryCollection, providers: ProviderCollection) -> Self {
        Container {
            entries,
            providers,
            entry_arguments: Mutex::new(Vec::new()),
        }
    }

    /// Adds an entry, applying the container-wide bound arguments to it.
    pub fn add_entry(&self, entry: Entry) -> Arc<Entry> {
        let entry = self.entries.add(entry);
        let arguments = self.entry_arguments.lock().clone();
        entry.add_arguments(arguments);
        entry
    }

    /// Constructs and adds an entry from a payload.
    pub fn add(&self, id: impl Into<String>, payload: Payload) -> Arc<Entry> {
        self.add_entry(Entry::new(id, payload))
    }

    /// Adds a value entry; resolution always returns the value unchanged.
    pub fn add_value<T: Injectable>(&self, id: impl Into<String>, value: T) -> Arc<Entry> {
        self.add_entry(Entry::value(id, value))
    }

    /// Adds a definition entry around a callable.
    pub fn add_definition<F>(&self, id: impl Into<String>, definition: F) -> Arc<Entry>
    where
        F: Fn(&[Value]) -> Result<Value, DynError> + Send + Sync + 'static,
    {
        self.add_entry(Entry::definition(id, definition))
    }

    /// Appends arguments that every subsequently added definition entry gets
    /// as bound arguments.
    pub fn with_entry_arguments<I>(&self, arguments: I) -> &Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.entry_arguments.lock().extend(arguments);
        self
    }

    /// Adds an entry provider, booting it now if it is bootable.
    pub fn add_provider(&self, provider: Arc<dyn EntryProvider>) -> &Self {
        self.providers.add(provider, self);
        self
    }

    /// Resolves `id`, returning the cached value for definitions.
    ///
    /// An id only declared by providers triggers their registration first.
    pub fn get(&self, id: &str) -> Result<Value, ContainerError> {
        // One lookup, not has-then-get: an entry removed in between would
        // never reach the provider route.
        match self.entries.get(id) {
            Err(ContainerError::NotFound(_)) => {}
            resolved => return resolved,
        }

        if self.providers.has(id) {
            tracing::debug!("'{}' supplied by a provider, registering", id);
            self.providers.register(id, self);
            // A provider that declared the id but failed to register it
            // surfaces as NotFound here.
            return self.entries.get(id);
        }

        Err(ContainerError::NotFound(id.to_string()))
    }

    /// Resolves `id` and downcasts the value to `T`.
    pub fn get_as<T: Injectable>(&self, id: &str) -> Result<Arc<T>, ContainerError> {
        self.get(id)?
            .downcast::<T>()
            .map_err(|_| ContainerError::Downcast {
                id: id.to_string(),
                requested: type_name::<T>(),
            })
    }

    /// Builds a fresh value for `id`, bypassing and replacing any cache.
    ///
    /// `arguments` are appended after the entry's bound arguments.
    pub fn make(&self, id: &str, arguments: &[Value]) -> Result<Value, ContainerError> {
        match self.entries.resolve(id, arguments, true) {
            Err(ContainerError::NotFound(_)) => {}
            resolved => return resolved,
        }

        if self.providers.has(id) {
            tracing::debug!("'{}' supplied by a provider, registering", id);
            self.providers.register(id, self);
            return self.entries.resolve(id, arguments, true);
        }

        Err(ContainerError::NotFound(id.to_string()))
    }

    /// Returns true if an entry exists or any provider declares `id`.
    ///
    /// Never triggers registration; a true result guarantees a subsequent
    /// `get` will not fail with `NotFound` for a well-behaved provider.
    pub fn has(&self, id: &str) -> bool {
        self.entries.has(id) || self.providers.has(id)
    }

    /// Removes the entry under `id` and every alias pointing at it.
    pub fn remove(&self, id: &str) {
        self.entries.remove(id);
    }

    /// Binds `alias` as a secondary name for `id`.
    pub fn alias(&self, alias: &str, id: &str) -> Result<(), ContainerError> {
        self.entries.alias(alias, id)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::value;

    fn as_u32(resolved: Value) -> u32 {
        *resolved.downcast::<u32>().ok().unwrap()
    }

    #[test]
    fn add_value_then_get() {
        let container = Container::new();
        container.add_value("answer", 42_u32);
        assert_eq!(as_u32(container.get("answer").unwrap()), 42);
    }

    #[test]
    fn add_with_payload_matches_convenience_constructors() {
        let container = Container::new();
        container.add("raw", Payload::Value(value(7_u32)));
        assert_eq!(as_u32(container.get("raw").unwrap()), 7);
    }

    #[test]
    fn get_missing_fails_with_not_found() {
        let container = Container::new();
        let err = container.get("missing").err().unwrap();
        assert!(matches!(err, ContainerError::NotFound(id) if id == "missing"));
    }

    #[test]
    fn get_caches_definitions_and_make_forces_fresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let container = Container::new();
        container.add_definition("counter", move |_| {
            Ok(value(seen.fetch_add(1, Ordering::SeqCst) as u32 + 1))
        });

        assert_eq!(as_u32(container.get("counter").unwrap()), 1);
        assert_eq!(as_u32(container.get("counter").unwrap()), 1);
        assert_eq!(as_u32(container.make("counter", &[]).unwrap()), 2);
        // make replaced the cache
        assert_eq!(as_u32(container.get("counter").unwrap()), 2);
    }

    #[test]
    fn make_appends_call_time_arguments() {
        let container = Container::new();
        container.add_definition("sum", |arguments| {
            let total: u32 = arguments
                .iter()
                .map(|a| *a.clone().downcast::<u32>().ok().unwrap())
                .sum();
            Ok(value(total))
        });
        container.get_as::<u32>("sum").unwrap();

        let total = container
            .make("sum", &[value(1_u32), value(2_u32)])
            .unwrap();
        assert_eq!(as_u32(total), 3);
    }

    #[test]
    fn entry_arguments_apply_to_later_entries_only() {
        let container = Container::new();
        container.add_definition("before", |arguments| Ok(value(arguments.len())));
        container.with_entry_arguments([value(0_u32)]);
        container.add_definition("after", |arguments| Ok(value(arguments.len())));

        assert_eq!(
            *container.get_as::<usize>("before").unwrap(),
            0
        );
        assert_eq!(*container.get_as::<usize>("after").unwrap(), 1);
    }

    #[test]
    fn get_as_downcasts_and_reports_mismatches() {
        let container = Container::new();
        container.add_value("name", "larder");

        assert_eq!(*container.get_as::<&str>("name").unwrap(), "larder");
        let err = container.get_as::<u32>("name").unwrap_err();
        assert!(matches!(err, ContainerError::Downcast { id, .. } if id == "name"));
    }

    #[test]
    fn alias_and_remove_cascade_through_the_facade() {
        let container = Container::new();
        container.add_value("a", 1_u32);
        container.alias("b", "a").unwrap();
        assert_eq!(as_u32(container.get("b").unwrap()), 1);

        container.remove("a");
        assert!(!container.has("a"));
        assert!(!container.has("b"));
    }

    #[test]
    fn alias_to_missing_target_fails() {
        let container = Container::new();
        assert!(matches!(
            container.alias("b", "missing").unwrap_err(),
            ContainerError::AliasTargetMissing { .. }
        ));
    }
}
