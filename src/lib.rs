//! Path-based API versioning for axum services.
//!
//! Requests like `/v2/users` are resolved against the configured supported
//! versions, routed as `/users`, and answered with an `API-Version` header.
//! Paths without a version segment use the highest supported version.

pub mod app;
pub mod shared;
pub mod system;
