//! Configuration Module
//!
//! Handles loading node and cache configuration from environment variables.

use std::env;

use crate::consistent_hash::DEFAULT_REPLICAS;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the demo group, in bytes (0 = unbounded)
    pub cache_bytes: u64,
    /// Virtual nodes per real node on the hash ring
    pub ring_replicas: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Name of this node on the hash ring
    pub node_name: String,
    /// Comma-separated names of every node on the ring
    pub peers: String,
    /// Backing store for the demo group ("memory" is the only built-in one)
    pub data_source: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Group capacity in bytes (default: 2048)
    /// - `RING_REPLICAS` - Virtual nodes per node (default: 50)
    /// - `SERVER_PORT` - HTTP server port (default: 9999)
    /// - `NODE_NAME` - This node's ring name (default: "localhost:9999")
    /// - `PEERS` - All ring members, comma-separated (default: `NODE_NAME`)
    /// - `DATA_SOURCE` - Loader backing the demo group (default: "memory")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let node_name = env::var("NODE_NAME").unwrap_or(defaults.node_name);
        Self {
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            ring_replicas: parse_var("RING_REPLICAS").unwrap_or(defaults.ring_replicas),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            peers: env::var("PEERS").unwrap_or_else(|_| node_name.clone()),
            node_name,
            data_source: env::var("DATA_SOURCE").unwrap_or(defaults.data_source),
        }
    }

    /// Returns the ring members, trimmed, without empty entries.
    pub fn peer_list(&self) -> Vec<String> {
        self.peers
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_bytes: 2 << 10,
            ring_replicas: DEFAULT_REPLICAS,
            server_port: 9999,
            node_name: "localhost:9999".to_string(),
            peers: "localhost:9999".to_string(),
            data_source: "memory".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.ring_replicas, 50);
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.data_source, "memory");
        assert_eq!(config.peer_list(), vec!["localhost:9999".to_string()]);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_BYTES");
        env::remove_var("RING_REPLICAS");
        env::remove_var("SERVER_PORT");
        env::remove_var("NODE_NAME");
        env::remove_var("PEERS");
        env::remove_var("DATA_SOURCE");

        let config = Config::from_env();
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.ring_replicas, 50);
        assert_eq!(config.server_port, 9999);
        assert_eq!(config.node_name, "localhost:9999");
        assert_eq!(config.peers, "localhost:9999");
        assert_eq!(config.data_source, "memory");
    }

    #[test]
    fn test_peer_list_trims_entries() {
        let config = Config {
            peers: " a:1, b:2 ,,c:3 ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.peer_list(), vec!["a:1", "b:2", "c:3"]);
    }
}
