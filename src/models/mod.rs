//! Request and Response models for the cache service API
//!
//! DTOs used to serialize/deserialize HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::CreateRequest;
pub use responses::{DeleteResponse, GetAllResponse, GetResponse, HealthResponse, StatsResponse};
