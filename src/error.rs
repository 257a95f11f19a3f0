//! Error types for resource set reconciliation.
//!
//! Every failure surfaced by the reconciler names the resource set it was
//! working on and the remote API call that failed, so the host planning
//! engine can report a precise message to the user. Errors fall into a small
//! number of [`ErrorKind`]s that drive retry and recreate decisions.

use crate::api::ApiError;
use crate::api::page::PageError;
use crate::resource_set::ResourceSetId;
use serde_json::Value;
use std::fmt;

/// Remote API calls issued by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    CreateResourceSet,
    GetResourceSet,
    UpdateResourceSet,
    DeleteResourceSet,
    ListResourceSetMembers,
    PatchResourceSet,
}

impl ApiOperation {
    /// Name of the call as it appears in error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiOperation::CreateResourceSet => "CreateResourceSet",
            ApiOperation::GetResourceSet => "GetResourceSet",
            ApiOperation::UpdateResourceSet => "UpdateResourceSet",
            ApiOperation::DeleteResourceSet => "DeleteResourceSet",
            ApiOperation::ListResourceSetMembers => "ListResourceSetMembers",
            ApiOperation::PatchResourceSet => "PatchResourceSet",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The resource set no longer exists; the caller should recreate it.
    NotFound,
    /// Network or connection failure; safe to retry with backoff.
    Transient,
    /// Non-2xx, non-404 response; surfaced to the user, never retried.
    RemoteError,
    /// A page payload or continuation cursor could not be parsed.
    MalformedResponse,
    /// Local input was rejected before any request was made.
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Transient => "transient",
            ErrorKind::RemoteError => "remote error",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Validation => "validation",
        };
        f.write_str(name)
    }
}

/// Main error type for reconciler operations.
///
/// The `resource_set` field holds the resource set id, or the label when the
/// failing call was the creation of a set that has no id yet.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("{operation} failed for resource set '{resource_set}': resource set not found")]
    NotFound {
        resource_set: String,
        operation: ApiOperation,
    },

    #[error("{operation} failed for resource set '{resource_set}': transport error: {message}")]
    Transient {
        resource_set: String,
        operation: ApiOperation,
        message: String,
    },

    #[error("{operation} failed for resource set '{resource_set}': HTTP {status}: {message}")]
    Remote {
        resource_set: String,
        operation: ApiOperation,
        status: u16,
        message: String,
        /// Error body returned by the remote system, when it sent one
        payload: Option<Value>,
    },

    #[error("{operation} returned a malformed response for resource set '{resource_set}': {source}")]
    MalformedResponse {
        resource_set: String,
        operation: ApiOperation,
        #[source]
        source: PageError,
    },

    #[error(
        "Resource set '{resource_set}' did not converge after patching: {missing} member(s) missing, {unexpected} unexpected"
    )]
    NotConverged {
        resource_set: String,
        missing: usize,
        unexpected: usize,
    },

    #[error("Resource set '{id}' was created but populating its members failed: {source}")]
    PartiallyCreated {
        /// Id of the set that now exists remotely
        id: ResourceSetId,
        #[source]
        source: Box<ReconcileError>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ReconcileError {
    /// Classify a transport-level failure for the given call.
    ///
    /// Failures without a status are transport errors; 404 means the set is
    /// gone; every other status is a remote error carrying its payload.
    pub fn from_api(
        resource_set: impl Into<String>,
        operation: ApiOperation,
        error: ApiError,
    ) -> Self {
        let resource_set = resource_set.into();
        match error.status {
            None => Self::Transient {
                resource_set,
                operation,
                message: error.message,
            },
            Some(404) => Self::NotFound {
                resource_set,
                operation,
            },
            Some(status) => Self::Remote {
                resource_set,
                operation,
                status,
                message: error.message,
                payload: error.payload,
            },
        }
    }

    /// Create a malformed-response error
    pub fn malformed(
        resource_set: impl Into<String>,
        operation: ApiOperation,
        source: PageError,
    ) -> Self {
        Self::MalformedResponse {
            resource_set: resource_set.into(),
            operation,
            source,
        }
    }

    /// Wrap a failure that happened after `id` was created.
    pub fn partially_created(id: ResourceSetId, source: ReconcileError) -> Self {
        Self::PartiallyCreated {
            id,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::NotFound { .. } => ErrorKind::NotFound,
            ReconcileError::Transient { .. } => ErrorKind::Transient,
            ReconcileError::Remote { .. } | ReconcileError::NotConverged { .. } => {
                ErrorKind::RemoteError
            }
            ReconcileError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ReconcileError::Validation(_) => ErrorKind::Validation,
            ReconcileError::PartiallyCreated { source, .. } => source.kind(),
        }
    }

    /// Whether the failed operation may be retried after re-reading state.
    ///
    /// A partially created set is never retryable as a creation: the caller
    /// must record [`created_id`](Self::created_id) and update it instead.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ReconcileError::PartiallyCreated { .. })
            && self.kind() == ErrorKind::Transient
    }

    /// Id of a resource set that exists remotely despite the failure.
    pub fn created_id(&self) -> Option<&ResourceSetId> {
        match self {
            ReconcileError::PartiallyCreated { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The API call that failed, if the error came from one.
    pub fn operation(&self) -> Option<ApiOperation> {
        match self {
            ReconcileError::NotFound { operation, .. }
            | ReconcileError::Transient { operation, .. }
            | ReconcileError::Remote { operation, .. }
            | ReconcileError::MalformedResponse { operation, .. } => Some(*operation),
            ReconcileError::PartiallyCreated { source, .. } => source.operation(),
            ReconcileError::NotConverged { .. } | ReconcileError::Validation(_) => None,
        }
    }
}

/// Errors raised while validating local input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Resource set id is empty
    #[error("Resource set id cannot be empty")]
    EmptyId,

    /// Resource set label is empty
    #[error("Resource set label cannot be empty")]
    EmptyLabel,

    /// Member URL is not an absolute http(s) URL
    #[error("Invalid resource URL '{url}': {reason}")]
    InvalidResourceUrl { url: String, reason: String },

    /// Reconciler configuration is unusable
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl ValidationError {
    /// Create an invalid resource URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResourceUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
