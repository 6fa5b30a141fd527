//! Common test utilities for orders-export integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;
