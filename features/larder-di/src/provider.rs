use std::{collections::HashSet, sync::Arc};

use parking_lot::{Mutex, RwLock};

use crate::container::Container;

/// A unit that declares which identifiers it can supply and registers the
/// matching entries into a container on first demand.
///
/// Implemented by application code; the container only ever asks
/// [`provides`](EntryProvider::provides) and triggers
/// [`register`](EntryProvider::register) lazily, at most once per provider.
pub trait EntryProvider: Send + Sync {
    /// Returns true if this provider can supply `id`.
    fn provides(&self, id: &str) -> bool;

    /// Registers this provider's entries into the container.
    ///
    /// Called at most once over the provider's lifetime, on the first demand
    /// for any id it declares. May re-entrantly add entries or further
    /// providers to the same container.
    fn register(&self, container: &Container);

    /// Providers needing a one-time eager hook return themselves here.
    ///
    /// Checked once, when the provider is added to a collection.
    fn as_bootable(&self) -> Option<&dyn BootableEntryProvider> {
        None
    }
}

/// An [`EntryProvider`] with an eager boot hook.
///
/// `boot` runs synchronously, exactly once, when the provider is first added
/// to a collection; `register` still runs lazily on first demand. Adding the
/// same provider instance again never re-runs `boot`.
pub trait BootableEntryProvider: EntryProvider {
    fn boot(&self, container: &Container);
}

/// Owns providers and triggers their registration exactly once each.
pub struct ProviderCollection {
    /// Insertion order is registration-check order
    providers: RwLock<Vec<Arc<dyn EntryProvider>>>,
    /// Identities of every provider ever added; claimed before booting
    known: Mutex<HashSet<ProviderId>>,
    /// Identity marks of providers whose `register` already ran
    registered: Mutex<HashSet<ProviderId>>,
}

/// Instance identity of a provider: the address of its Arc'd data.
type ProviderId = usize;

fn identity(provider: &Arc<dyn EntryProvider>) -> ProviderId {
    Arc::as_ptr(provider).cast::<()>() as usize
}

impl Default for ProviderCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderCollection {
    pub fn new() -> Self {
        ProviderCollection {
            providers: RwLock::new(Vec::new()),
            known: Mutex::new(HashSet::new()),
            registered: Mutex::new(HashSet::new()),
        }
    }

    /// Adds a provider, booting it first if it is bootable.
    ///
    /// Adding the same instance twice is a no-op and does not re-boot.
    pub fn add(&self, provider: Arc<dyn EntryProvider>, container: &Container) -> &Self {
        // Atomic check-and-insert: the losing side of a racing duplicate
        // add must not boot again.
        if !self.known.lock().insert(identity(&provider)) {
            return self;
        }

        // Boot before storing, outside any lock: the hook may re-entrantly
        // add entries or providers to the same container.
        if let Some(bootable) = provider.as_bootable() {
            tracing::debug!("booting provider before storing it");
            bootable.boot(container);
        }

        self.providers.write().push(provider);
        self
    }

    /// Returns true if any stored provider declares `id`.
    pub fn has(&self, id: &str) -> bool {
        self.snapshot().iter().any(|provider| provider.provides(id))
    }

    /// Triggers registration for every not-yet-registered provider that
    /// declares `id`.
    ///
    /// Deliberately does not stop at the first match: overlapping providers
    /// all register. Iteration is index-stable so a provider may add further
    /// providers while it registers.
    pub fn register(&self, id: &str, container: &Container) {
        let mut index = 0;
        loop {
            let provider = {
                let providers = self.providers.read();
                match providers.get(index) {
                    Some(provider) => provider.clone(),
                    None => break,
                }
            };
            index += 1;

            if self.registered.lock().contains(&identity(&provider)) {
                continue;
            }
            if !provider.provides(id) {
                continue;
            }
            // Mark before invoking so a re-entrant demand for another of
            // this provider's ids cannot trigger it twice.
            if !self.registered.lock().insert(identity(&provider)) {
                continue;
            }

            tracing::debug!("provider registering for '{}'", id);
            provider.register(container);
        }
    }

    /// Clones the list so user `provides` code never runs under the lock.
    fn snapshot(&self) -> Vec<Arc<dyn EntryProvider>> {
        self.providers.read().clone()
    }
}
