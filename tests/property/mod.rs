//! Property-based suites

pub mod retry_proptest;
