//! Drift detection tests.
//!
//! An administrator edits membership directly on the remote between two
//! applies of the same configuration.

use crate::assert_same_members;
use crate::common::TestContext;
use resource_set_reconciler::api::{InMemoryResourceSetApi, MemberOrder};
use resource_set_reconciler::{ApiOperation, Drift};

/// Out-of-band addition is reported, absorbed, then declared without a
/// redundant patch.
#[tokio::test]
async fn test_external_addition_then_declared() {
    let ctx = TestContext::new(3001);

    // Step 1: {users, groups}
    let step1 = ctx.declared("testing", ctx.members(&["users", "groups"]));
    let mut state = ctx.reconciler.create(&step1).await.unwrap();
    let id = state.id.clone().unwrap();

    // Someone adds apps directly
    ctx.click_ops_add(&id, "apps").await;

    let last_known = state.members.clone().unwrap();
    let drift = ctx.reconciler.detect_drift(&id, &last_known).await.unwrap();
    assert_same_members!(drift.added_remotely, ctx.members(&["apps"]));
    assert!(drift.removed_remotely.is_empty());

    drift.absorb(&mut state);
    assert_eq!(state.member_count(), 3);

    // Step 2: configuration catches up with the remote
    let step2 = ctx.declared("testing", ctx.members(&["users", "groups", "apps"]));
    let actual = ctx.reconciler.fetch_all_members(&id).await.unwrap();
    assert!(ctx.reconciler.compute_diff(&step2.members, &actual).is_empty());

    ctx.api.reset_call_counts().await;
    ctx.reconciler.update(&id, &step2).await.unwrap();
    assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 0);

    // Step 3: back to step 1 removes apps again
    let state = ctx.reconciler.update(&id, &step1).await.unwrap();
    assert_same_members!(state.members.unwrap(), step1.members);
    assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 1);
}

/// Out-of-band removal is reported and reverted by the next apply.
#[tokio::test]
async fn test_external_removal_is_reverted() {
    let ctx = TestContext::new(3002);
    let declared = ctx.declared("testing", ctx.members(&["users", "groups", "apps"]));
    let state = ctx.reconciler.create(&declared).await.unwrap();
    let id = state.id.clone().unwrap();

    ctx.click_ops_remove(&id, "groups").await;

    let drift = ctx
        .reconciler
        .detect_drift(&id, state.members.as_ref().unwrap())
        .await
        .unwrap();
    assert!(drift.added_remotely.is_empty());
    assert_same_members!(drift.removed_remotely, ctx.members(&["groups"]));

    let state = ctx.reconciler.update(&id, &declared).await.unwrap();
    assert_same_members!(state.members.unwrap(), declared.members);
}

/// A remote that returns members in a different order reports no drift.
#[tokio::test]
async fn test_reordering_is_not_drift() {
    let api = InMemoryResourceSetApi::new()
        .with_member_order(MemberOrder::Descending)
        .with_max_page_size(2);
    let ctx = TestContext::with_api(3003, api);
    let declared = ctx.declared(
        "testing",
        ctx.members(&["apps", "groups", "users", "authorizationServers"]),
    );
    let state = ctx.reconciler.create(&declared).await.unwrap();
    let id = state.id.clone().unwrap();

    let drift = ctx
        .reconciler
        .detect_drift(&id, &declared.members)
        .await
        .unwrap();

    assert_eq!(drift, Drift::default());
    // The exposed list follows the remote, not the declaration
    let mut descending = declared.members.to_strings();
    descending.reverse();
    assert_eq!(state.member_list(), descending);
}
