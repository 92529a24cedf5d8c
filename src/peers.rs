//! Peer Module
//!
//! Contracts for locating and querying the node that owns a key. Nothing in
//! the local load path calls these yet; they are the seam a distributed
//! deployment plugs into.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Request sent to the peer owning a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRequest {
    pub group: String,
    pub key: String,
}

/// Value returned by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerResponse {
    pub value: Vec<u8>,
}

// == Peer Picker ==
/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the remote owner of `key`, or `None` when this node should
    /// serve it itself.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value from a remote peer's group.
pub trait PeerGetter: Send + Sync {
    fn get(&self, request: &PeerRequest) -> Result<PeerResponse>;
}
