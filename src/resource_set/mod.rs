//! Resource set data model.
//!
//! A resource set is a named, describable grouping of API-addressable
//! resource URLs. This module holds the validated value types and the
//! records exchanged with the remote API and with the host engine.
//!
//! # Key Types
//!
//! - [`ResourceSetId`] - Opaque id assigned by the remote system
//! - [`ResourceUrl`] - Validated absolute member URL
//! - [`MemberSet`] - Order-insensitive, deduplicated membership
//! - [`ResourceSet`] - Remote metadata returned by `GetResourceSet`
//! - [`PatchRequest`] - Membership additions and removals
//! - [`ResourceSetState`] - Host-side last-known record

pub mod members;
pub mod model;
pub mod value_objects;

pub use members::MemberSet;
pub use model::{
    CreateResourceSetRequest, DeclaredResourceSet, PatchRequest, ResourceSet, ResourceSetState,
    UpdateResourceSetRequest,
};
pub use value_objects::{ResourceSetId, ResourceUrl};
