//! Resource set reconciliation for identity platform administrative APIs.
//!
//! A resource set is a named, describable collection of API resource URLs
//! that scopes administrative access. This crate provides the CRUD logic a
//! declarative provisioning tool needs to manage one: pagination-safe
//! member listing, order-insensitive diffing, chunked patching and drift
//! detection against changes made outside the tool.
//!
//! # Core Components
//!
//! - [`ResourceSetReconciler`] - Reads, diffs, patches and verifies membership
//! - [`ResourceSetApi`] - Trait for the remote API client
//! - [`InMemoryResourceSetApi`](api::InMemoryResourceSetApi) - In-memory API for tests and development
//! - [`MemberSet`] - Order-insensitive, deduplicated membership
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resource_set_reconciler::{ResourceSetReconciler, api::InMemoryResourceSetApi};
//! use resource_set_reconciler::resource_set::{DeclaredResourceSet, MemberSet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reconciler = ResourceSetReconciler::new(InMemoryResourceSetApi::new());
//!
//! let declared = DeclaredResourceSet::new(
//!     "help-desk",
//!     "testing, testing",
//!     MemberSet::parse([
//!         "https://org.example.com/api/v1/users",
//!         "https://org.example.com/api/v1/groups",
//!     ])?,
//! )?;
//! let state = reconciler.create(&declared).await?;
//!
//! // Later: has anyone changed membership behind our back?
//! let id = state.id.clone().ok_or("created set has no id")?;
//! let last_known = state.members.clone().unwrap_or_default();
//! let drift = reconciler.detect_drift(&id, &last_known).await?;
//! assert!(drift.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod reconciler;
pub mod resource_set;

// Re-export commonly used types for convenience
pub use api::{ApiError, ResourceSetApi};
pub use error::{ApiOperation, ErrorKind, ReconcileError, ReconcileResult, ValidationError};
pub use reconciler::{
    Drift, MembershipDiff, ReconcilerBuilder, ReconcilerConfig, ResourceSetReconciler,
    compute_diff,
};
pub use resource_set::{
    DeclaredResourceSet, MemberSet, PatchRequest, ResourceSet, ResourceSetId, ResourceSetState,
    ResourceUrl,
};
