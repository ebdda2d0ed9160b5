//! Test module for request-plugin-log
//!
//! Unit and property-based tests (proptest) for the lifecycle hooks, timing
//! bookkeeping, context metadata, configuration, loggers and pipeline driver.

#[cfg(test)]
pub mod plugin_tests;
