//! Process-wide tracing setup shared by the binary and the tests.

pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, init, init_for_tests};
