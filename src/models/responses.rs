//! Response DTOs for the cache HTTP front end
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{ByteView, CacheStats};

/// Response body for a group lookup (GET /api/:group/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub group: String,
    pub key: String,
    /// The cached value, decoded as UTF-8 (lossy)
    pub value: String,
    /// Size of the value in bytes
    pub size: usize,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: &ByteView) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value: value.to_string_lossy(),
            size: value.len(),
        }
    }
}

/// Response body for the ring lookup (GET /owner/:key)
#[derive(Debug, Clone, Serialize)]
pub struct OwnerResponse {
    pub key: String,
    /// Node owning the key on the hash ring
    pub node: String,
    /// Whether the owner is this node
    pub is_local: bool,
}

impl OwnerResponse {
    pub fn new(key: impl Into<String>, node: impl Into<String>, local_node: &str) -> Self {
        let node = node.into();
        Self {
            key: key.into(),
            is_local: node == local_node,
            node,
        }
    }
}

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub group: String,
    /// Counters and occupancy of the group
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from group statistics
    pub fn new(group: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            group: group.into(),
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("scores", "Tom", &ByteView::from("630"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["group"], "scores");
        assert_eq!(json["key"], "Tom");
        assert_eq!(json["value"], "630");
        assert_eq!(json["size"], 3);
    }

    #[test]
    fn test_owner_response_local_flag() {
        assert!(OwnerResponse::new("k", "node-a", "node-a").is_local);
        assert!(!OwnerResponse::new("k", "node-b", "node-a").is_local);
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            loads: 1,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new("scores", stats);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["group"], "scores");
        assert_eq!(json["hits"], 3);
        assert_eq!(json["loads"], 1);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
