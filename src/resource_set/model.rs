//! Resource set records exchanged with the remote API and the host engine.

use crate::error::{ValidationError, ValidationResult};
use crate::resource_set::{MemberSet, ResourceSetId, ResourceUrl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resource set as returned by `GetResourceSet`.
///
/// Members are not part of this payload; they are listed through the
/// paginated members endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSet {
    pub id: ResourceSetId,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Body of `CreateResourceSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResourceSetRequest {
    pub label: String,
    pub description: String,
    pub resources: MemberSet,
}

/// Body of `UpdateResourceSet`; replaces label and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResourceSetRequest {
    pub label: String,
    pub description: String,
}

/// Additive/subtractive membership update sent with `PatchResourceSet`.
///
/// Both halves are sets, so a patch never carries the same URL twice. A
/// URL present in both halves is not meaningful and is never produced by
/// the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRequest {
    #[serde(default, skip_serializing_if = "MemberSet::is_empty")]
    pub additions: MemberSet,
    #[serde(default, skip_serializing_if = "MemberSet::is_empty")]
    pub removals: MemberSet,
}

impl PatchRequest {
    pub fn additions(additions: MemberSet) -> Self {
        Self {
            additions,
            removals: MemberSet::new(),
        }
    }

    pub fn removals(removals: MemberSet) -> Self {
        Self {
            additions: MemberSet::new(),
            removals,
        }
    }

    /// Number of URLs carried by the patch.
    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// Desired resource set as declared in user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredResourceSet {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub members: MemberSet,
}

impl DeclaredResourceSet {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        members: MemberSet,
    ) -> ValidationResult<Self> {
        let declared = Self {
            label: label.into(),
            description: description.into(),
            members,
        };
        declared.validate()?;
        Ok(declared)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        Ok(())
    }
}

/// Last-known state of a resource set, as tracked by the host engine.
///
/// Fields are optional because the host may hold a partially populated
/// record (for example, before the first read after import). Records
/// produced by the reconciler always have every field set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSetState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceSetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<MemberSet>,
    /// `members` in the order the remote listed them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listing: Vec<ResourceUrl>,
}

impl ResourceSetState {
    /// Build a fully populated record from a remote read.
    ///
    /// `listing` is the membership in the remote's listing order.
    pub fn from_remote(resource_set: ResourceSet, listing: Vec<ResourceUrl>) -> Self {
        Self {
            id: Some(resource_set.id),
            label: Some(resource_set.label),
            description: Some(resource_set.description),
            members: Some(listing.iter().cloned().collect()),
            listing,
        }
    }

    /// Members as an indexable list, in the remote's listing order.
    ///
    /// Records whose listing no longer matches `members` (for example after
    /// edits by the host) fall back to lexical order. The order carries no
    /// meaning either way; compare memberships with [`MemberSet`] equality
    /// instead of by position.
    pub fn member_list(&self) -> Vec<String> {
        let Some(members) = self.members.as_ref() else {
            return Vec::new();
        };
        let listed: MemberSet = self.listing.iter().cloned().collect();
        if self.listing.len() == members.len() && &listed == members {
            self.listing.iter().map(|url| url.as_str().to_string()).collect()
        } else {
            members.to_strings()
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.as_ref().map_or(0, MemberSet::len)
    }
}
