pub mod config;
pub mod versioning;
