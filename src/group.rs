//! Group Module
//!
//! Named cache namespaces that fall back to a loader on a miss, and the
//! registry that keeps them.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, CacheStore};
use crate::error::{CacheError, Result};

// == Getter ==
/// Loads the data for a key when it is not cached.
///
/// Closures of the form `|key: &str| -> anyhow::Result<Vec<u8>>` implement
/// this trait directly.
pub trait Getter: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> Getter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}

// == Group ==
/// A cache namespace with its own capacity and data source.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheStore,
    loads: AtomicU64,
    load_errors: AtomicU64,
}

impl Group {
    // == Constructor ==
    /// Creates an unregistered group. Most callers want
    /// [`GroupRegistry::new_group`] instead.
    pub fn new(name: impl Into<String>, cache_bytes: u64, getter: Arc<dyn Getter>) -> Self {
        Self {
            name: name.into(),
            getter,
            main_cache: CacheStore::new(cache_bytes),
            loads: AtomicU64::new(0),
            load_errors: AtomicU64::new(0),
        }
    }

    // == Get ==
    /// Returns the value for `key`, loading and caching it on a miss.
    ///
    /// The loader runs without any cache lock held. Loader errors are
    /// returned as-is and nothing is cached for the key. Concurrent misses
    /// on one key may each call the loader.
    pub fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        if let Some(value) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key)
    }

    fn load(&self, key: &str) -> Result<ByteView> {
        self.get_locally(key)
    }

    fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.getter.get(key) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.load_errors.fetch_add(1, Ordering::Relaxed);
                warn!(group = %self.name, key, error = %err, "load failed");
                return Err(CacheError::Load(err));
            }
        };
        self.loads.fetch_add(1, Ordering::Relaxed);
        debug!(group = %self.name, key, size = bytes.len(), "loaded");

        let value = ByteView::new(&bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }

    // == Accessors ==
    /// Returns the name the group is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group's byte budget; 0 means unbounded.
    pub fn cache_bytes(&self) -> u64 {
        self.main_cache.cache_bytes()
    }

    // == Stats ==
    /// Returns cache counters plus loader counters for this group.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.main_cache.stats();
        stats.loads = self.loads.load(Ordering::Relaxed);
        stats.load_errors = self.load_errors.load(Ordering::Relaxed);
        stats
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .finish()
    }
}

// == Group Registry ==
/// Name-to-group map.
///
/// Groups are only ever inserted; registering a name again replaces the
/// earlier group for later lookups, while holders of the old `Arc` keep
/// using it. Writes take the lock exclusively, lookups share it.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first access.
    pub fn global() -> &'static GroupRegistry {
        static GLOBAL: OnceLock<GroupRegistry> = OnceLock::new();
        GLOBAL.get_or_init(GroupRegistry::new)
    }

    // == New Group ==
    /// Creates and registers a group.
    pub fn new_group<G>(&self, name: impl Into<String>, cache_bytes: u64, getter: G) -> Arc<Group>
    where
        G: Getter + 'static,
    {
        self.register(Group::new(name, cache_bytes, Arc::new(getter)))
    }

    /// Like [`new_group`](Self::new_group) for a loader that may be absent,
    /// e.g. one picked from configuration.
    pub fn try_new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: u64,
        getter: Option<Arc<dyn Getter>>,
    ) -> Result<Arc<Group>> {
        let name = name.into();
        let getter = getter.ok_or_else(|| CacheError::MissingLoader(name.clone()))?;
        Ok(self.register(Group::new(name, cache_bytes, getter)))
    }

    fn register(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let mut groups = self.groups.write();
        if groups
            .insert(group.name.clone(), group.clone())
            .is_some()
        {
            warn!(group = %group.name, "group re-registered, replacing previous instance");
        }
        info!(group = %group.name, cache_bytes = group.cache_bytes(), "group registered");
        group
    }

    // == Get Group ==
    /// Returns the group registered under `name`.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns the registered group names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Creates a group in the process-wide registry.
pub fn new_group<G>(name: impl Into<String>, cache_bytes: u64, getter: G) -> Arc<Group>
where
    G: Getter + 'static,
{
    GroupRegistry::global().new_group(name, cache_bytes, getter)
}

/// Looks up a group in the process-wide registry.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    GroupRegistry::global().get_group(name)
}
