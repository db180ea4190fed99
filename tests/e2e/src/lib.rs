//! End-to-end test support for mnema
//!
//! Shared harness and fixtures used by the journey tests.

pub mod harness;
pub mod mocks;
