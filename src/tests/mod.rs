//! Scenario test suite for the compatibility engine
//!
//! Tests are grouped by layer: category resolution and rule tables, the
//! evaluation algorithm, the message protocol, the worker pool, and
//! property-based invariants.

#[cfg(test)]
mod property_tests;
#[cfg(all(test, not(target_arch = "wasm32")))]
mod worker_tests;
