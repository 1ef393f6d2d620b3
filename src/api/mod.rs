//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `POST /api/lru` - Store an entry
//! - `GET /api/lru/:key` - Read one entry
//! - `GET /api/lru` - Read every live entry
//! - `DELETE /api/lru/:key` - Delete one entry
//! - `DELETE /api/lru` - Delete every entry
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
