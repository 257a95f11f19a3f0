//! Error handling tests from the host engine's point of view.

use crate::common::TestContext;
use resource_set_reconciler::api::Fault;
use resource_set_reconciler::resource_set::ResourceSetId;
use resource_set_reconciler::{ApiOperation, ErrorKind, ReconcileError};
use serde_json::json;

#[tokio::test]
async fn test_fetch_missing_set_is_not_found() {
    let ctx = TestContext::new(6001);
    let id = ResourceSetId::new("iamdoesnotexist").unwrap();

    let err = ctx.reconciler.fetch_all_members(&id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.operation(), Some(ApiOperation::ListResourceSetMembers));
}

/// A transport failure mid-reconcile is retried from a fresh read.
#[tokio::test]
async fn test_transient_patch_failure_recovers() {
    let ctx = TestContext::with_patch_limit(6002, 2);
    let declared = ctx.declared("testing", ctx.members(&["a"]));
    let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();

    // Second chunk fails once
    ctx.api
        .inject_fault(
            ApiOperation::PatchResourceSet,
            1,
            Fault::Transport("connection reset".to_string()),
        )
        .await;

    let target = ctx.members(&["b", "c", "d", "e", "f", "g"]);
    let members = ctx.reconciler.reconcile_members(&id, &target).await.unwrap();

    assert_eq!(members, target);
}

/// Server errors surface with their status, payload and the failing call.
#[tokio::test]
async fn test_remote_error_carries_payload() {
    let ctx = TestContext::new(6003);
    let declared = ctx.declared("testing", ctx.members(&["users"]));
    let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();
    ctx.api
        .inject_fault(ApiOperation::PatchResourceSet, 0, Fault::Status(403))
        .await;

    let updated = ctx.declared("testing", ctx.members(&["groups"]));
    let err = ctx.reconciler.update(&id, &updated).await.unwrap_err();

    match &err {
        ReconcileError::Remote {
            status,
            operation,
            payload,
            ..
        } => {
            assert_eq!(*status, 403);
            assert_eq!(*operation, ApiOperation::PatchResourceSet);
            assert!(payload.is_some());
        }
        other => panic!("Expected a remote error, got {:?}", other),
    }
    assert!(err.to_string().contains(id.as_str()));
    assert!(err.to_string().contains("PatchResourceSet"));
}

/// A page that does not match the expected shape is reported, not skipped.
#[tokio::test]
async fn test_malformed_page() {
    let ctx = TestContext::new(6004);
    let declared = ctx.declared("testing", ctx.members(&["users"]));
    let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();
    ctx.api
        .inject_fault(
            ApiOperation::ListResourceSetMembers,
            0,
            Fault::MalformedPayload(json!({ "resources": "not-a-list" })),
        )
        .await;

    let err = ctx.reconciler.fetch_all_members(&id).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_empty_label_rejected_locally() {
    let ctx = TestContext::new(6005);
    let mut declared = ctx.declared("testing", ctx.members(&["users"]));
    declared.label = "  ".to_string();

    let err = ctx.reconciler.create(&declared).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(ctx.api.stats().await.total_calls, 0);
}
