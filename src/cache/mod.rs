//! Cache Module
//!
//! Byte-bounded LRU eviction plus the thread-safe store wrapped around it.

mod byteview;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use lru::{EvictionCallback, LruCache, Value};
pub use stats::CacheStats;
pub use store::CacheStore;
