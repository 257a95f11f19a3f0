//! Resource set reconciliation.
//!
//! [`ResourceSetReconciler`] drives a resource set's remote membership
//! towards a declared set of URLs. Every operation works on a freshly
//! fetched snapshot and keeps no state between calls; the host planning
//! engine owns the last-applied record.
//!
//! # Control Flow
//!
//! ```text
//! host engine ──read──────▶ fetch metadata + all member pages
//!             ──diff──────▶ compute_diff(declared, actual)
//!             ──update────▶ patch in chunks, re-read to confirm
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use resource_set_reconciler::ResourceSetReconciler;
//! use resource_set_reconciler::api::InMemoryResourceSetApi;
//! use resource_set_reconciler::resource_set::{DeclaredResourceSet, MemberSet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reconciler = ResourceSetReconciler::new(InMemoryResourceSetApi::new());
//!
//! let declared = DeclaredResourceSet::new(
//!     "help-desk",
//!     "Resources the help desk may administer",
//!     MemberSet::parse(["https://org.example.com/api/v1/users"])?,
//! )?;
//! let state = reconciler.create(&declared).await?;
//! assert_eq!(state.member_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod diff;
pub mod drift;


pub use builder::{ReconcilerBuilder, ReconcilerConfig};
pub use diff::{MembershipDiff, compute_diff};
pub use drift::Drift;

use crate::api::{MemberPage, PageError, ResourceSetApi};
use crate::error::{ApiOperation, ReconcileError, ReconcileResult, ValidationResult};
use crate::resource_set::{
    CreateResourceSetRequest, DeclaredResourceSet, MemberSet, ResourceSetId, ResourceSetState,
    ResourceUrl, UpdateResourceSetRequest,
};
use log::{debug, info, trace, warn};
use std::collections::HashSet;

/// Reconciles resource set membership against a remote API.
#[derive(Debug, Clone)]
pub struct ResourceSetReconciler<A: ResourceSetApi> {
    api: A,
    config: ReconcilerConfig,
}

impl<A: ResourceSetApi> ResourceSetReconciler<A> {
    /// Create a reconciler with the default configuration.
    pub fn new(api: A) -> Self {
        Self {
            api,
            config: ReconcilerConfig::default(),
        }
    }

    /// Create a reconciler with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfiguration`] if any limit is zero.
    ///
    /// [`ValidationError::InvalidConfiguration`]: crate::ValidationError::InvalidConfiguration
    pub fn with_config(api: A, config: ReconcilerConfig) -> ValidationResult<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Fetch every member of a resource set.
    ///
    /// Follows continuation cursors until the remote reports no further
    /// page; there is no page or item ceiling. Pages are fetched one after
    /// another because each cursor comes from the previous response.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the resource set does not exist
    /// * `Transient` on transport failure
    /// * `RemoteError` on any other non-2xx response
    /// * `MalformedResponse` if a page or cursor cannot be parsed, or the
    ///   remote hands back a cursor it has already issued
    pub async fn fetch_all_members(&self, id: &ResourceSetId) -> ReconcileResult<MemberSet> {
        Ok(self.list_members(id).await?.into_iter().collect())
    }

    /// Fetch every member in the order the remote lists them.
    ///
    /// A URL repeated across pages is kept at its first position.
    async fn list_members(&self, id: &ResourceSetId) -> ReconcileResult<Vec<ResourceUrl>> {
        let operation = ApiOperation::ListResourceSetMembers;
        let mut listing = Vec::new();
        let mut seen = MemberSet::new();
        let mut issued_cursors = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let payload = self
                .api
                .list_resource_set_members(id, cursor.as_deref(), self.config.page_size)
                .await
                .map_err(|e| ReconcileError::from_api(id.as_str(), operation, e))?;
            let page = MemberPage::parse(payload)
                .map_err(|e| ReconcileError::malformed(id.as_str(), operation, e))?;

            pages += 1;
            trace!(
                "Page {} of resource set '{}': {} member(s), next cursor: {:?}",
                pages,
                id,
                page.members.len(),
                page.next_cursor
            );
            for member in page.members {
                if seen.insert(member.clone()) {
                    listing.push(member);
                }
            }

            match page.next_cursor {
                None => break,
                Some(next) if !issued_cursors.insert(next.clone()) => {
                    return Err(ReconcileError::malformed(
                        id.as_str(),
                        operation,
                        PageError::StalledCursor { cursor: next },
                    ));
                }
                Some(next) => cursor = Some(next),
            }
        }

        debug!(
            "Fetched {} member(s) of resource set '{}' across {} page(s)",
            listing.len(),
            id,
            pages
        );
        Ok(listing)
    }

    /// Compute the membership change from `actual` to `declared`.
    ///
    /// See [`compute_diff`].
    pub fn compute_diff(&self, declared: &MemberSet, actual: &MemberSet) -> MembershipDiff {
        compute_diff(declared, actual)
    }

    /// Apply a membership diff with one patch per chunk.
    ///
    /// An empty diff issues no request. The patches are not atomic as a
    /// whole: if one fails, earlier chunks stay applied. Callers retrying
    /// after an error must re-read membership and compute a new diff
    /// instead of resubmitting this one; [`reconcile_members`] does that.
    ///
    /// [`reconcile_members`]: Self::reconcile_members
    pub async fn apply_diff(
        &self,
        id: &ResourceSetId,
        diff: MembershipDiff,
    ) -> ReconcileResult<()> {
        if diff.is_empty() {
            debug!("Resource set '{}' already matches; nothing to patch", id);
            return Ok(());
        }

        info!(
            "Patching resource set '{}': {} addition(s), {} removal(s)",
            id,
            diff.additions.len(),
            diff.removals.len()
        );

        let patches = diff.into_patches(self.config.max_patch_items);
        let total = patches.len();
        for (index, patch) in patches.iter().enumerate() {
            trace!(
                "Sending patch {}/{} to resource set '{}' ({} URL(s))",
                index + 1,
                total,
                id,
                patch.len()
            );
            if let Err(e) = self.api.patch_resource_set(id, patch).await {
                warn!(
                    "Patch {}/{} to resource set '{}' failed after {} applied: {}",
                    index + 1,
                    total,
                    id,
                    index,
                    e
                );
                return Err(ReconcileError::from_api(
                    id.as_str(),
                    ApiOperation::PatchResourceSet,
                    e,
                ));
            }
        }

        Ok(())
    }

    /// Report membership changes made since `last_known` was recorded.
    pub async fn detect_drift(
        &self,
        id: &ResourceSetId,
        last_known: &MemberSet,
    ) -> ReconcileResult<Drift> {
        let current = self.fetch_all_members(id).await?;
        let drift = Drift::between(last_known, &current);

        if !drift.is_empty() {
            warn!(
                "Resource set '{}' drifted: {} member(s) added and {} removed outside of configuration",
                id,
                drift.added_remotely.len(),
                drift.removed_remotely.len()
            );
        }
        Ok(drift)
    }

    /// Bring remote membership to exactly `declared` and return it.
    ///
    /// Each attempt reads fresh membership, applies the diff, and re-reads
    /// to confirm. Transient failures are retried up to `max_attempts`,
    /// always starting from a new read so partially applied patches are
    /// accounted for. Other errors abort immediately.
    pub async fn reconcile_members(
        &self,
        id: &ResourceSetId,
        declared: &MemberSet,
    ) -> ReconcileResult<MemberSet> {
        let listing = self.reconcile_listing(id, declared).await?;
        Ok(listing.into_iter().collect())
    }

    async fn reconcile_listing(
        &self,
        id: &ResourceSetId,
        declared: &MemberSet,
    ) -> ReconcileResult<Vec<ResourceUrl>> {
        let mut attempt = 1;
        loop {
            match self.try_reconcile_listing(id, declared).await {
                Ok(listing) => return Ok(listing),
                Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                    warn!(
                        "Attempt {}/{} to reconcile resource set '{}' failed, retrying: {}",
                        attempt, self.config.max_attempts, id, e
                    );
                    tokio::time::sleep(self.config.retry_backoff()).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_reconcile_listing(
        &self,
        id: &ResourceSetId,
        declared: &MemberSet,
    ) -> ReconcileResult<Vec<ResourceUrl>> {
        let listing = self.list_members(id).await?;
        let actual: MemberSet = listing.iter().cloned().collect();
        let diff = compute_diff(declared, &actual);
        if diff.is_empty() {
            return Ok(listing);
        }

        self.apply_diff(id, diff).await?;

        let listing = self.list_members(id).await?;
        let confirmed: MemberSet = listing.iter().cloned().collect();
        if &confirmed != declared {
            return Err(ReconcileError::NotConverged {
                resource_set: id.as_str().to_string(),
                missing: declared.difference(&confirmed).len(),
                unexpected: confirmed.difference(declared).len(),
            });
        }
        Ok(listing)
    }

    /// Create a resource set and populate its membership.
    ///
    /// Members beyond the patch payload limit are added with follow-up
    /// patches. The returned state is read back from the remote.
    ///
    /// # Errors
    ///
    /// If the set was created but populating its members then failed, the
    /// error is [`ReconcileError::PartiallyCreated`] carrying the new id.
    /// The caller should record that id and finish with [`update`] rather
    /// than create the set again.
    ///
    /// [`update`]: Self::update
    pub async fn create(
        &self,
        declared: &DeclaredResourceSet,
    ) -> ReconcileResult<ResourceSetState> {
        declared.validate()?;

        let initial: MemberSet = declared
            .members
            .iter()
            .take(self.config.max_patch_items)
            .cloned()
            .collect();

        info!(
            "Creating resource set '{}' with {} of {} member(s)",
            declared.label,
            initial.len(),
            declared.members.len()
        );

        let request = CreateResourceSetRequest {
            label: declared.label.clone(),
            description: declared.description.clone(),
            resources: initial,
        };
        let created = self
            .api
            .create_resource_set(&request)
            .await
            .map_err(|e| {
                ReconcileError::from_api(
                    declared.label.as_str(),
                    ApiOperation::CreateResourceSet,
                    e,
                )
            })?;

        match self.reconcile_listing(&created.id, &declared.members).await {
            Ok(listing) => Ok(ResourceSetState::from_remote(created, listing)),
            Err(e) => {
                warn!(
                    "Resource set '{}' was created but populating its members failed: {}",
                    created.id, e
                );
                Err(ReconcileError::partially_created(created.id, e))
            }
        }
    }

    /// Read the current state of a resource set.
    ///
    /// Returns `None` if the resource set no longer exists, so the host can
    /// drop it from state and plan a recreation.
    pub async fn read(&self, id: &ResourceSetId) -> ReconcileResult<Option<ResourceSetState>> {
        debug!("Reading resource set '{}'", id);

        let resource_set = match self.api.get_resource_set(id).await {
            Ok(resource_set) => resource_set,
            Err(e) if e.is_not_found() => {
                warn!("Resource set '{}' not found; removing from state", id);
                return Ok(None);
            }
            Err(e) => {
                return Err(ReconcileError::from_api(
                    id.as_str(),
                    ApiOperation::GetResourceSet,
                    e,
                ));
            }
        };

        match self.list_members(id).await {
            Ok(listing) => Ok(Some(ResourceSetState::from_remote(resource_set, listing))),
            Err(e) if e.is_not_found() => {
                warn!("Resource set '{}' deleted while reading members", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Update label, description and membership to match `declared`.
    ///
    /// Label and description are only sent when they differ from the
    /// remote values. Membership is reconciled from a fresh read.
    pub async fn update(
        &self,
        id: &ResourceSetId,
        declared: &DeclaredResourceSet,
    ) -> ReconcileResult<ResourceSetState> {
        declared.validate()?;

        let mut resource_set = self
            .api
            .get_resource_set(id)
            .await
            .map_err(|e| ReconcileError::from_api(id.as_str(), ApiOperation::GetResourceSet, e))?;

        if resource_set.label != declared.label || resource_set.description != declared.description
        {
            info!("Updating label and description of resource set '{}'", id);
            let request = UpdateResourceSetRequest {
                label: declared.label.clone(),
                description: declared.description.clone(),
            };
            resource_set = self
                .api
                .update_resource_set(id, &request)
                .await
                .map_err(|e| {
                    ReconcileError::from_api(id.as_str(), ApiOperation::UpdateResourceSet, e)
                })?;
        }

        let listing = self.reconcile_listing(id, &declared.members).await?;
        Ok(ResourceSetState::from_remote(resource_set, listing))
    }

    /// Delete a resource set. Deleting one that is already gone succeeds.
    pub async fn delete(&self, id: &ResourceSetId) -> ReconcileResult<()> {
        info!("Deleting resource set '{}'", id);
        match self.api.delete_resource_set(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Resource set '{}' was already deleted", id);
                Ok(())
            }
            Err(e) => Err(ReconcileError::from_api(
                id.as_str(),
                ApiOperation::DeleteResourceSet,
                e,
            )),
        }
    }

    /// Check whether a resource set exists.
    pub async fn exists(&self, id: &ResourceSetId) -> ReconcileResult<bool> {
        match self.api.get_resource_set(id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(ReconcileError::from_api(
                id.as_str(),
                ApiOperation::GetResourceSet,
                e,
            )),
        }
    }
}
