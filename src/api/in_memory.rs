//! In-memory implementation of the resource set API.
//!
//! This module provides a thread-safe fake of the identity platform's
//! resource set endpoints. It is designed for tests and local development:
//! it enforces the same limits the real API does (page size cap, patch
//! payload cap), renders member pages in the real wire shape, and can
//! inject transport failures or error statuses on demand.
//!
//! # Features
//!
//! * Cursor-based pagination with a configurable page size cap
//! * Configurable member ordering, to prove callers do not rely on it
//! * Patch payload limit, rejected with HTTP 400 like the real API
//! * One-shot fault injection per API operation
//! * Out-of-band patches that bypass call accounting, for drift tests
//!
//! # Example Usage
//!
//! ```rust
//! use resource_set_reconciler::api::{InMemoryResourceSetApi, ResourceSetApi};
//! use resource_set_reconciler::resource_set::{CreateResourceSetRequest, MemberSet, PatchRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryResourceSetApi::new().with_max_page_size(2);
//! let created = api
//!     .create_resource_set(&CreateResourceSetRequest {
//!         label: "ops".to_string(),
//!         description: String::new(),
//!         resources: MemberSet::new(),
//!     })
//!     .await?;
//!
//! // Someone adds a member through the admin console
//! let apps = MemberSet::parse(["https://org.example.com/api/v1/apps"])?;
//! api.apply_external_patch(&created.id, &PatchRequest::additions(apps)).await?;
//!
//! let members = api.members_of(&created.id).await.unwrap_or_default();
//! assert_eq!(members.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::api::page::{next_href, render_page};
use crate::api::{ApiError, ApiResult, ResourceSetApi};
use crate::error::ApiOperation;
use crate::resource_set::{
    CreateResourceSetRequest, MemberSet, PatchRequest, ResourceSet, ResourceSetId,
    UpdateResourceSetRequest,
};
use chrono::Utc;
use log::{debug, trace};
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Page size cap applied by the remote system.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Largest number of URLs accepted in one create or patch payload.
pub const DEFAULT_MAX_PATCH_ITEMS: usize = 100;

/// Order in which members are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberOrder {
    #[default]
    Ascending,
    Descending,
}

/// Failure injected into a single API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// No response received
    Transport(String),
    /// Respond with the given HTTP status
    Status(u16),
    /// Respond 200 with this body; only meaningful for member listing
    MalformedPayload(Value),
}

impl Fault {
    fn into_api_error(self) -> ApiError {
        match self {
            Fault::Transport(message) => ApiError::transport(message),
            Fault::Status(status) => ApiError::status(status, format!("Injected HTTP {}", status))
                .with_payload(error_payload("E0000009", "Internal Server Error")),
            Fault::MalformedPayload(_) => ApiError::status(500, "Malformed payload injected")
                .with_payload(error_payload("E0000009", "Internal Server Error")),
        }
    }
}

#[derive(Debug)]
struct ScheduledFault {
    operation: ApiOperation,
    // Successful calls to let through before firing
    skip: usize,
    fault: Fault,
}

#[derive(Debug)]
struct StoredResourceSet {
    resource_set: ResourceSet,
    members: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct RemoteState {
    sets: HashMap<String, StoredResourceSet>,
    faults: Vec<ScheduledFault>,
    calls: HashMap<ApiOperation, usize>,
}

impl RemoteState {
    /// Count the call and return the fault it should fail with, if any.
    fn begin_call(&mut self, operation: ApiOperation) -> Option<Fault> {
        *self.calls.entry(operation).or_insert(0) += 1;

        let position = self
            .faults
            .iter()
            .position(|scheduled| scheduled.operation == operation)?;

        let scheduled = self.faults.get_mut(position)?;
        if scheduled.skip > 0 {
            scheduled.skip -= 1;
            return None;
        }
        Some(self.faults.remove(position).fault)
    }

    fn stored(&self, id: &ResourceSetId) -> ApiResult<&StoredResourceSet> {
        self.sets.get(id.as_str()).ok_or_else(|| not_found(id))
    }

    fn stored_mut(&mut self, id: &ResourceSetId) -> ApiResult<&mut StoredResourceSet> {
        self.sets.get_mut(id.as_str()).ok_or_else(|| not_found(id))
    }
}

/// Thread-safe in-memory fake of the resource set API.
///
/// Clones share the same remote state, so a test can hand one clone to the
/// reconciler and keep another to act as an out-of-band administrator.
#[derive(Debug, Clone)]
pub struct InMemoryResourceSetApi {
    state: Arc<RwLock<RemoteState>>,
    base_url: String,
    max_page_size: usize,
    max_patch_items: usize,
    member_order: MemberOrder,
}

/// Snapshot counters for debugging and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryApiStats {
    pub resource_set_count: usize,
    pub total_members: usize,
    pub total_calls: usize,
}

impl InMemoryResourceSetApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(RemoteState::default())),
            base_url: "https://org.example.com".to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_patch_items: DEFAULT_MAX_PATCH_ITEMS,
            member_order: MemberOrder::default(),
        }
    }

    /// Origin used in rendered links, without a trailing slash.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub fn with_max_patch_items(mut self, max_patch_items: usize) -> Self {
        self.max_patch_items = max_patch_items.max(1);
        self
    }

    pub fn with_member_order(mut self, member_order: MemberOrder) -> Self {
        self.member_order = member_order;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fail a future call to `operation`.
    ///
    /// The first `skip` calls succeed; the one after fails with `fault`.
    /// Each scheduled fault fires once.
    pub async fn inject_fault(&self, operation: ApiOperation, skip: usize, fault: Fault) {
        let mut state = self.state.write().await;
        state.faults.push(ScheduledFault {
            operation,
            skip,
            fault,
        });
    }

    /// Number of calls made to `operation` so far, including failed ones.
    pub async fn call_count(&self, operation: ApiOperation) -> usize {
        let state = self.state.read().await;
        state.calls.get(&operation).copied().unwrap_or(0)
    }

    pub async fn reset_call_counts(&self) {
        let mut state = self.state.write().await;
        state.calls.clear();
    }

    /// Patch membership directly, as an administrator acting outside the
    /// reconciler would. Bypasses call accounting, faults and payload limits.
    pub async fn apply_external_patch(
        &self,
        id: &ResourceSetId,
        patch: &PatchRequest,
    ) -> ApiResult<()> {
        let mut state = self.state.write().await;
        let stored = state.stored_mut(id)?;
        apply_patch(stored, patch);
        debug!(
            "External patch on resource set '{}': +{} -{}",
            id,
            patch.additions.len(),
            patch.removals.len()
        );
        Ok(())
    }

    /// Current membership, bypassing pagination and call accounting.
    pub async fn members_of(&self, id: &ResourceSetId) -> Option<MemberSet> {
        let state = self.state.read().await;
        let stored = state.sets.get(id.as_str())?;
        MemberSet::parse(stored.members.iter().cloned()).ok()
    }

    pub async fn contains(&self, id: &ResourceSetId) -> bool {
        let state = self.state.read().await;
        state.sets.contains_key(id.as_str())
    }

    pub async fn stats(&self) -> InMemoryApiStats {
        let state = self.state.read().await;
        InMemoryApiStats {
            resource_set_count: state.sets.len(),
            total_members: state.sets.values().map(|stored| stored.members.len()).sum(),
            total_calls: state.calls.values().sum(),
        }
    }

    /// Clear all data, pending faults and counters.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = RemoteState::default();
    }

    fn members_endpoint(&self, id: &ResourceSetId) -> String {
        format!("{}/api/v1/iam/resource-sets/{}/resources", self.base_url, id)
    }

    fn check_payload_size(&self, items: usize) -> ApiResult<()> {
        if items > self.max_patch_items {
            return Err(ApiError::status(
                400,
                format!(
                    "Api validation failed: resources ({} items, at most {} allowed)",
                    items, self.max_patch_items
                ),
            )
            .with_payload(error_payload(
                "E0000001",
                "Api validation failed: resources",
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryResourceSetApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSetApi for InMemoryResourceSetApi {
    async fn create_resource_set(
        &self,
        request: &CreateResourceSetRequest,
    ) -> ApiResult<ResourceSet> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.begin_call(ApiOperation::CreateResourceSet) {
            return Err(fault.into_api_error());
        }

        if request.label.trim().is_empty() {
            return Err(ApiError::status(400, "Api validation failed: label")
                .with_payload(error_payload("E0000001", "Api validation failed: label")));
        }
        self.check_payload_size(request.resources.len())?;

        let id = ResourceSetId::new(format!("iam{}", uuid::Uuid::new_v4().simple()))
            .map_err(|e| ApiError::status(500, e.to_string()))?;
        let now = Utc::now();
        let resource_set = ResourceSet {
            id: id.clone(),
            label: request.label.clone(),
            description: request.description.clone(),
            created: Some(now),
            last_updated: Some(now),
        };

        let members = request.resources.to_strings().into_iter().collect();
        state.sets.insert(
            id.as_str().to_string(),
            StoredResourceSet {
                resource_set: resource_set.clone(),
                members,
            },
        );

        debug!(
            "Created resource set '{}' with {} member(s)",
            id,
            request.resources.len()
        );
        Ok(resource_set)
    }

    async fn get_resource_set(&self, id: &ResourceSetId) -> ApiResult<ResourceSet> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.begin_call(ApiOperation::GetResourceSet) {
            return Err(fault.into_api_error());
        }

        Ok(state.stored(id)?.resource_set.clone())
    }

    async fn update_resource_set(
        &self,
        id: &ResourceSetId,
        request: &UpdateResourceSetRequest,
    ) -> ApiResult<ResourceSet> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.begin_call(ApiOperation::UpdateResourceSet) {
            return Err(fault.into_api_error());
        }

        if request.label.trim().is_empty() {
            return Err(ApiError::status(400, "Api validation failed: label")
                .with_payload(error_payload("E0000001", "Api validation failed: label")));
        }

        let stored = state.stored_mut(id)?;
        stored.resource_set.label = request.label.clone();
        stored.resource_set.description = request.description.clone();
        stored.resource_set.last_updated = Some(Utc::now());
        Ok(stored.resource_set.clone())
    }

    async fn delete_resource_set(&self, id: &ResourceSetId) -> ApiResult<()> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.begin_call(ApiOperation::DeleteResourceSet) {
            return Err(fault.into_api_error());
        }

        state
            .sets
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn list_resource_set_members(
        &self,
        id: &ResourceSetId,
        after: Option<&str>,
        limit: usize,
    ) -> ApiResult<Value> {
        let mut state = self.state.write().await;
        match state.begin_call(ApiOperation::ListResourceSetMembers) {
            Some(Fault::MalformedPayload(payload)) => return Ok(payload),
            Some(fault) => return Err(fault.into_api_error()),
            None => {}
        }

        let stored = state.stored(id)?;
        let page_size = limit.clamp(1, self.max_page_size);

        let candidates: Box<dyn Iterator<Item = &String> + Send + '_> =
            match (self.member_order, after) {
                (MemberOrder::Ascending, None) => Box::new(stored.members.iter()),
                (MemberOrder::Ascending, Some(cursor)) => Box::new(
                    stored
                        .members
                        .range::<str, _>((Bound::Excluded(cursor), Bound::Unbounded)),
                ),
                (MemberOrder::Descending, None) => Box::new(stored.members.iter().rev()),
                (MemberOrder::Descending, Some(cursor)) => Box::new(
                    stored
                        .members
                        .range::<str, _>((Bound::Unbounded, Bound::Excluded(cursor)))
                        .rev(),
                ),
            };

        // One extra item tells us whether another page follows
        let mut page: Vec<String> = candidates.take(page_size + 1).cloned().collect();
        let has_more = page.len() > page_size;
        page.truncate(page_size);

        let endpoint = self.members_endpoint(id);
        let next = match (has_more, page.last()) {
            (true, Some(cursor)) => Some(
                next_href(&endpoint, cursor, page_size)
                    .map_err(|e| ApiError::status(500, format!("Cannot build next link: {}", e)))?,
            ),
            _ => None,
        };

        trace!(
            "Listing {} member(s) of resource set '{}' (after: {:?}, more: {})",
            page.len(),
            id,
            after,
            has_more
        );
        Ok(render_page(&endpoint, &page, next.as_deref()))
    }

    async fn patch_resource_set(&self, id: &ResourceSetId, patch: &PatchRequest) -> ApiResult<()> {
        let mut state = self.state.write().await;
        if let Some(fault) = state.begin_call(ApiOperation::PatchResourceSet) {
            return Err(fault.into_api_error());
        }

        if patch.is_empty() {
            return Err(
                ApiError::status(400, "At least one addition or removal is required")
                    .with_payload(error_payload("E0000001", "Api validation failed: resources")),
            );
        }
        self.check_payload_size(patch.len())?;

        let stored = state.stored_mut(id)?;
        apply_patch(stored, patch);
        Ok(())
    }
}

fn apply_patch(stored: &mut StoredResourceSet, patch: &PatchRequest) {
    for url in &patch.additions {
        stored.members.insert(url.as_str().to_string());
    }
    for url in &patch.removals {
        stored.members.remove(url.as_str());
    }
    stored.resource_set.last_updated = Some(Utc::now());
}

fn not_found(id: &ResourceSetId) -> ApiError {
    ApiError::status(404, format!("Not found: Resource not found: {} (ResourceSet)", id))
        .with_payload(error_payload(
            "E0000007",
            &format!("Not found: Resource not found: {} (ResourceSet)", id),
        ))
}

fn error_payload(code: &str, summary: &str) -> Value {
    json!({
        "errorCode": code,
        "errorSummary": summary,
        "errorLink": code,
        "errorId": format!("oae{}", uuid::Uuid::new_v4().simple()),
        "errorCauses": [],
    })
}
