//! Builder pattern for configuring reconciler instances.
//!
//! This module provides the tunables that bound how the reconciler talks to
//! the remote API: requested page size, patch chunk size, and the retry
//! budget used when reconciling membership.

use crate::api::ResourceSetApi;
use crate::error::{ValidationError, ValidationResult};
use crate::reconciler::ResourceSetReconciler;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`ResourceSetReconciler`].
///
/// Deserializes from partial documents; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Page size requested when listing members. The remote may cap it
    /// lower; pagination is followed either way.
    pub page_size: usize,

    /// Largest number of URLs sent in one create or patch payload.
    pub max_patch_items: usize,

    /// Attempts made by `reconcile_members` before giving up on transient
    /// failures. `1` disables retry.
    pub max_attempts: u32,

    /// Delay between attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_patch_items: 100,
            max_attempts: 3,
            retry_backoff_ms: 200,
        }
    }
}

impl ReconcilerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.page_size == 0 {
            return Err(ValidationError::invalid_configuration(
                "page_size must be at least 1",
            ));
        }

        if self.max_patch_items == 0 {
            return Err(ValidationError::invalid_configuration(
                "max_patch_items must be at least 1",
            ));
        }

        if self.max_attempts == 0 {
            return Err(ValidationError::invalid_configuration(
                "max_attempts must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Builder for configuring and creating reconciler instances.
///
/// # Examples
///
/// ```rust
/// use resource_set_reconciler::ReconcilerBuilder;
/// use resource_set_reconciler::api::InMemoryResourceSetApi;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let reconciler = ReconcilerBuilder::new(InMemoryResourceSetApi::new())
///     .with_page_size(200)
///     .with_max_patch_items(50)
///     .with_max_attempts(5)
///     .build()?;
/// assert_eq!(reconciler.config().max_patch_items, 50);
/// # Ok(())
/// # }
/// ```
pub struct ReconcilerBuilder<A> {
    api: A,
    config: ReconcilerConfig,
}

impl<A: ResourceSetApi> ReconcilerBuilder<A> {
    /// Start from the default configuration.
    pub fn new(api: A) -> Self {
        Self {
            api,
            config: ReconcilerConfig::default(),
        }
    }

    /// Replace the whole configuration, e.g. one loaded from a file.
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn with_max_patch_items(mut self, max_patch_items: usize) -> Self {
        self.config.max_patch_items = max_patch_items;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Build the configured reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfiguration`] if any limit is zero.
    pub fn build(self) -> ValidationResult<ResourceSetReconciler<A>> {
        ResourceSetReconciler::with_config(self.api, self.config)
    }
}
