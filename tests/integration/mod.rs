//! Scenario tests for resource set reconciliation.
//!
//! Each scenario follows the host engine's control flow: read state, diff
//! it against configuration, patch, then read again to confirm the plan is
//! empty.

pub mod drift_detection;
pub mod error_handling;
pub mod lifecycle;
pub mod pagination;
pub mod property_tests;
pub mod teardown;
