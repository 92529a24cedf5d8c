//! Consistent Hash Module
//!
//! Maps keys to node names on a hash ring with virtual nodes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Default number of virtual nodes per real node.
pub const DEFAULT_REPLICAS: usize = 50;

/// Hash function placing bytes on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

// == Hash Ring ==
/// Consistent-hash ring.
///
/// Each real node occupies `replicas` positions, the i-th one at
/// `hash(format!("{i}{node}"))`. A key belongs to the first position at or
/// after its own hash, wrapping around to the smallest position.
///
/// The ring is meant to be filled once and then only read; it has no
/// interior locking.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual node positions
    keys: Vec<u32>,
    /// Virtual node position to real node name
    nodes: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring.
    ///
    /// Without a custom hash the ring uses CRC-32 (IEEE), so independently
    /// built rings agree on key ownership.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(default_hash),
            replicas,
            keys: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    // == Add ==
    /// Places every node on the ring.
    ///
    /// Adding a name twice adds its virtual nodes twice. When two nodes hash
    /// to the same position, the one added last owns it.
    pub fn add<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            let name = name.as_ref();
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{}{}", i, name).as_bytes());
                self.keys.push(position);
                self.nodes.insert(position, name.to_string());
            }
            debug!(node = name, replicas = self.replicas, "ring add");
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` for an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&position| position < hash);
        let position = self.keys[idx % self.keys.len()];
        self.nodes.get(&position).map(String::as_str)
    }

    // == Is Empty ==
    /// Returns true when no node has been added.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    // == Length ==
    /// Returns the number of virtual node positions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    // == Replicas ==
    /// Returns the virtual nodes placed per real node.
    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

fn default_hash() -> HashFn {
    Arc::new(crc32fast::hash)
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.keys.len())
            .finish()
    }
}
