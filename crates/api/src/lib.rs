//! HTTP API: router, request/response mapping, and process wiring.

pub mod app;
pub mod middleware;
