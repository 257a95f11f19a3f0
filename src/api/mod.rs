//! Remote API abstraction for resource sets.
//!
//! The reconciler talks to the identity platform's administrative API only
//! through the [`ResourceSetApi`] trait. Implementations own transport,
//! authentication, timeouts and retry; the reconciler owns pagination,
//! diffing and error classification.
//!
//! # Architecture
//!
//! The API layer is responsible for:
//! - Issuing one HTTP call per trait method
//! - Reporting the HTTP status of failed calls, or none for transport failures
//! - Returning member pages verbatim so the reconciler can validate them
//!
//! The API layer is NOT responsible for:
//! - Following pagination cursors
//! - Computing membership diffs or chunking patches
//! - Deciding whether an error is retryable
//!
//! # Example Usage
//!
//! ```rust
//! use resource_set_reconciler::api::{InMemoryResourceSetApi, ResourceSetApi};
//! use resource_set_reconciler::resource_set::{CreateResourceSetRequest, MemberSet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryResourceSetApi::new();
//! let request = CreateResourceSetRequest {
//!     label: "help-desk".to_string(),
//!     description: "Resources the help desk may administer".to_string(),
//!     resources: MemberSet::parse(["https://org.example.com/api/v1/users"])?,
//! };
//! let created = api.create_resource_set(&request).await?;
//!
//! // First page of members, as raw JSON
//! let page = api.list_resource_set_members(&created.id, None, 100).await?;
//! assert!(page["resources"].is_array());
//! # Ok(())
//! # }
//! ```

pub mod in_memory;
pub mod page;

pub use in_memory::{Fault, InMemoryApiStats, InMemoryResourceSetApi, MemberOrder};
pub use page::{MemberPage, PageError};

use crate::resource_set::{
    CreateResourceSetRequest, PatchRequest, ResourceSet, ResourceSetId, UpdateResourceSetRequest,
};
use serde_json::Value;
use std::future::Future;

/// Failure reported by a [`ResourceSetApi`] call.
///
/// `status` is the HTTP status of the response, or `None` when no response
/// was received (connection refused, reset, timed out).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
    /// Error body returned by the remote system
    pub payload: Option<Value>,
}

impl ApiError {
    /// A failure where no HTTP response was received.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            payload: None,
        }
    }

    /// A non-2xx HTTP response.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Administrative API operations on resource sets.
///
/// Each method maps to exactly one remote call. Implementations must be
/// usable from async code and shareable across tasks.
pub trait ResourceSetApi: Send + Sync {
    /// Create a resource set with its initial members.
    fn create_resource_set(
        &self,
        request: &CreateResourceSetRequest,
    ) -> impl Future<Output = ApiResult<ResourceSet>> + Send;

    /// Fetch resource set metadata (label, description, timestamps).
    fn get_resource_set(
        &self,
        id: &ResourceSetId,
    ) -> impl Future<Output = ApiResult<ResourceSet>> + Send;

    /// Replace label and description.
    fn update_resource_set(
        &self,
        id: &ResourceSetId,
        request: &UpdateResourceSetRequest,
    ) -> impl Future<Output = ApiResult<ResourceSet>> + Send;

    /// Delete the resource set.
    fn delete_resource_set(&self, id: &ResourceSetId) -> impl Future<Output = ApiResult<()>> + Send;

    /// Fetch one page of members.
    ///
    /// # Arguments
    /// * `id` - The resource set to list
    /// * `after` - Continuation cursor from the previous page, `None` for the first page
    /// * `limit` - Requested page size; the remote may return fewer
    ///
    /// # Returns
    /// The raw page payload. See [`MemberPage::parse`] for the expected shape.
    fn list_resource_set_members(
        &self,
        id: &ResourceSetId,
        after: Option<&str>,
        limit: usize,
    ) -> impl Future<Output = ApiResult<Value>> + Send;

    /// Add and remove members in one call.
    ///
    /// Adding a present member or removing an absent one is a no-op.
    fn patch_resource_set(
        &self,
        id: &ResourceSetId,
        patch: &PatchRequest,
    ) -> impl Future<Output = ApiResult<()>> + Send;
}
