//! Helpers for tuning test suites from CI.

pub mod property_test_profile;
