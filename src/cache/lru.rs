//! LRU Cache Module
//!
//! Byte-bounded least-recently-used eviction engine.
//!
//! Entries live in a `Vec` and are chained into a doubly linked recency list
//! through indices; a `HashMap` maps each key to its slot. Removing an entry
//! swap-removes its slot and patches the links of the entry that moved, so
//! every operation is O(1) without any `unsafe`.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

// == Value ==
/// Anything stored in an [`LruCache`] must report how many bytes it occupies.
pub trait Value {
    /// Size of the value in bytes, used for capacity accounting.
    fn byte_len(&self) -> usize;
}

impl Value for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl Value for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

/// Callback invoked with every entry removed by eviction.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<V: Value> Node<V> {
    fn footprint(&self) -> u64 {
        self.key.len() as u64 + self.value.byte_len() as u64
    }
}

// == LRU Cache ==
/// A size-bounded LRU cache keyed by strings.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// The footprint of an entry is `key.len() + value.byte_len()`. After every
/// [`add`](LruCache::add) the tail is evicted until the total footprint fits
/// in `max_bytes`. A `max_bytes` of zero means unbounded.
///
/// Not synchronized; wrap it in a lock to share it between threads.
pub struct LruCache<V> {
    max_bytes: u64,
    nbytes: u64,
    nodes: Vec<Node<V>>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Value> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `max_bytes` - Capacity in bytes, `0` for no limit
    /// * `on_evicted` - Optional callback run for each evicted entry
    pub fn new(max_bytes: u64, on_evicted: Option<EvictionCallback<V>>) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            nodes: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key, marking it as most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(&self.nodes[idx].value)
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts until the cache fits.
    ///
    /// Replacing a value keeps a single entry for the key and adjusts the
    /// byte count by the difference between the old and new value sizes.
    /// A value larger than the whole capacity is evicted right away.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            let node = &mut self.nodes[idx];
            self.nbytes -= node.value.byte_len() as u64;
            self.nbytes += value.byte_len() as u64;
            node.value = value;
            debug!(key = %key, bytes = self.nbytes, max_bytes = self.max_bytes, "lru update");
        } else {
            let idx = self.nodes.len();
            let node = Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            };
            self.nbytes += node.footprint();
            self.nodes.push(node);
            self.index.insert(key, idx);
            self.push_front(idx);
            debug!(bytes = self.nbytes, max_bytes = self.max_bytes, "lru insert");
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry.
    ///
    /// Runs the eviction callback and returns the removed pair, or `None`
    /// when the cache is empty.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail?;
        self.unlink(idx);
        let node = self.swap_remove(idx);
        self.index.remove(&node.key);
        self.nbytes -= node.footprint();

        debug!(key = %node.key, bytes = self.nbytes, max_bytes = self.max_bytes, "lru evict");

        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&node.key, &node.value);
        }
        Some((node.key, node.value))
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // == Is Empty ==
    /// Returns true when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // == Bytes ==
    /// Returns the combined footprint of all entries.
    pub fn bytes(&self) -> u64 {
        self.nbytes
    }

    // == Max Bytes ==
    /// Returns the byte budget; 0 means unbounded.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks for a key without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        std::iter::successors(self.head, move |&idx| self.nodes[idx].next).map(move |idx| {
            let node = &self.nodes[idx];
            (node.key.as_str(), &node.value)
        })
    }

    // == List Maintenance ==
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[idx];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.nodes[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &mut self.nodes[idx];
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }

    /// Removes an already unlinked slot, repointing the entry moved into it.
    fn swap_remove(&mut self, idx: usize) -> Node<V> {
        let node = self.nodes.swap_remove(idx);
        if idx < self.nodes.len() {
            let (prev, next) = {
                let moved = &self.nodes[idx];
                (moved.prev, moved.next)
            };
            match prev {
                Some(prev) => self.nodes[prev].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(next) => self.nodes[next].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.index.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }
        node
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("len", &self.nodes.len())
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}
