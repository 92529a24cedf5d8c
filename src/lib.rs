//! Mini Groupcache - An in-process, byte-bounded group cache
//!
//! Named groups load missing keys through a caller-supplied loader and keep
//! the results in a thread-safe LRU cache. A consistent-hash ring maps keys
//! to owning nodes for deployments that spread groups across peers.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistent_hash;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use consistent_hash::HashRing;
pub use error::{CacheError, KeyNotFound, Result};
pub use group::{get_group, new_group, Getter, Group, GroupRegistry};
pub use peers::{PeerGetter, PeerPicker, PeerRequest, PeerResponse};
