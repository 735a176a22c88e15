use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{entry::Entry, errors::ContainerError, types::Value};

/// Owns entries and their aliases, dispatching lookup and resolution by id.
///
/// Aliases are flattened to the canonical entry id when created, so lookup
/// never walks more than one hop and removing an entry can drop every alias
/// pointing at it in a single pass.
pub struct EntryCollection {
    inner: RwLock<CollectionInner>,
}

#[derive(Default)]
struct CollectionInner {
    entries: HashMap<String, Arc<Entry>>,
    /// alias name -> canonical entry id
    aliases: HashMap<String, String>,
}

impl Default for EntryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryCollection {
    pub fn new() -> Self {
        EntryCollection {
            inner: RwLock::new(CollectionInner::default()),
        }
    }

    /// Creates a collection pre-populated with `entries`.
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        let collection = Self::new();
        for entry in entries {
            collection.add(entry);
        }
        collection
    }

    /// Adds an entry, overwriting any previous entry under the same id.
    ///
    /// Returns the stored entry so callers can keep chaining onto it.
    pub fn add(&self, entry: Entry) -> Arc<Entry> {
        let entry = Arc::new(entry);
        self.inner
            .write()
            .entries
            .insert(entry.id().to_string(), entry.clone());
        entry
    }

    /// Returns true if `id` is a direct entry or resolves through an alias.
    pub fn has(&self, id: &str) -> bool {
        let inner = self.inner.read();
        inner.entries.contains_key(id)
            || inner
                .aliases
                .get(id)
                .is_some_and(|canonical| inner.entries.contains_key(canonical))
    }

    /// Resolves `id` with no arguments, returning the cached value if any.
    pub fn get(&self, id: &str) -> Result<Value, ContainerError> {
        self.resolve(id, &[], false)
    }

    /// Looks up `id` (directly or through an alias) and resolves it.
    pub fn resolve(&self, id: &str, arguments: &[Value], new: bool) -> Result<Value, ContainerError> {
        self.entry(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?
            .resolve(arguments, new)
    }

    /// Records `alias` as a secondary name for `id`.
    ///
    /// `id` may itself be an alias; the new alias is flattened onto the same
    /// canonical entry. Fails if `id` is neither an entry nor an alias.
    pub fn alias(&self, alias: &str, id: &str) -> Result<(), ContainerError> {
        let mut inner = self.inner.write();
        let canonical = if inner.entries.contains_key(id) {
            id.to_string()
        } else if let Some(canonical) = inner.aliases.get(id) {
            canonical.clone()
        } else {
            return Err(ContainerError::AliasTargetMissing {
                alias: alias.to_string(),
                target: id.to_string(),
            });
        };
        inner.aliases.insert(alias.to_string(), canonical);
        Ok(())
    }

    /// Removes the entry under `id` and every alias pointing at it.
    ///
    /// When `id` is itself an alias, only that alias mapping is dropped.
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.write();
        inner.aliases.remove(id);
        if inner.entries.remove(id).is_some() {
            inner.aliases.retain(|_, canonical| canonical != id);
        }
    }

    /// Looks up an entry by direct id or alias, without holding the lock
    /// beyond the lookup itself.
    fn entry(&self, id: &str) -> Option<Arc<Entry>> {
        let inner = self.inner.read();
        if let Some(entry) = inner.entries.get(id) {
            return Some(entry.clone());
        }
        inner
            .aliases
            .get(id)
            .and_then(|canonical| inner.entries.get(canonical))
            .cloned()
    }
}
