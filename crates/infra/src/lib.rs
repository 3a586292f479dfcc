//! Infrastructure layer: entity stores, cache, façade services, config.

pub mod cache;
pub mod config;
pub mod services;
pub mod store;
