//! Response models for the cache HTTP front end
//!
//! This module defines the DTOs (Data Transfer Objects) serialized into
//! HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{GetResponse, HealthResponse, OwnerResponse, StatsResponse};
