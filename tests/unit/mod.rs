//! Unit tests for individual components

mod audit_test;
mod config_test;
mod error_test;
mod snapshot_test;
mod util_test;
