//! API Module
//!
//! HTTP front end exposing cache groups and the hash ring to clients.
//!
//! # Endpoints
//! - `GET /api/:group/:key` - Read a key through its group
//! - `GET /owner/:key` - Ring owner of a key
//! - `GET /stats/:group` - Group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
