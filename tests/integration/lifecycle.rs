//! Resource set lifecycle tests.
//!
//! Create a set from configuration, change its label, description and
//! membership, then delete it, checking remote state after every step.

use crate::assert_same_members;
use crate::common::TestContext;
use crate::common::fixtures::{basic_members, updated_members};
use resource_set_reconciler::ApiOperation;
use resource_set_reconciler::resource_set::DeclaredResourceSet;

/// Create, update, read back and delete a resource set.
#[tokio::test]
async fn test_basic_then_updated() {
    let ctx = TestContext::new(1001);

    // Step 1: basic configuration
    let basic = ctx.declared("testing, testing", basic_members(&ctx));
    let created = ctx.reconciler.create(&basic).await.unwrap();
    let id = created.id.clone().unwrap();

    assert_eq!(created.label.as_deref(), Some(ctx.resource_name().as_str()));
    assert_eq!(created.description.as_deref(), Some("testing, testing"));
    assert_eq!(created.member_count(), 3);
    assert_same_members!(ctx.api.members_of(&id).await.unwrap(), basic.members);

    // Step 2: updated description and one member fewer
    let updated = ctx.declared("testing, testing updated", updated_members(&ctx));
    let state = ctx.reconciler.update(&id, &updated).await.unwrap();

    assert_eq!(state.description.as_deref(), Some("testing, testing updated"));
    assert_eq!(state.member_count(), 2);
    assert!(!state.members.as_ref().unwrap().contains(&ctx.url("apps")));

    let read = ctx.reconciler.read(&id).await.unwrap().unwrap();
    assert_eq!(read, state);

    // Destroy
    ctx.reconciler.delete(&id).await.unwrap();
    assert!(!ctx.reconciler.exists(&id).await.unwrap());
    assert!(ctx.reconciler.read(&id).await.unwrap().is_none());
}

/// Renaming a set leaves membership untouched and sends no patch.
#[tokio::test]
async fn test_rename_without_membership_change() {
    let ctx = TestContext::new(1002);
    let basic = ctx.declared("testing", basic_members(&ctx));
    let id = ctx.reconciler.create(&basic).await.unwrap().id.unwrap();
    ctx.api.reset_call_counts().await;

    let renamed = DeclaredResourceSet::new(
        format!("{}_renamed", ctx.resource_name()),
        "testing",
        basic_members(&ctx),
    )
    .unwrap();
    let state = ctx.reconciler.update(&id, &renamed).await.unwrap();

    assert_eq!(state.label.as_deref(), Some(renamed.label.as_str()));
    assert_eq!(ctx.api.call_count(ApiOperation::UpdateResourceSet).await, 1);
    assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 0);
}

/// Applying the same configuration twice is a no-op the second time.
#[tokio::test]
async fn test_reapply_is_noop() {
    let ctx = TestContext::new(1003);
    let basic = ctx.declared("testing", basic_members(&ctx));
    let id = ctx.reconciler.create(&basic).await.unwrap().id.unwrap();
    ctx.api.reset_call_counts().await;

    let state = ctx.reconciler.update(&id, &basic).await.unwrap();

    assert_same_members!(state.members.unwrap(), basic.members);
    assert_eq!(ctx.api.call_count(ApiOperation::UpdateResourceSet).await, 0);
    assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 0);
}

/// A set deleted outside configuration reads as absent, and deleting it
/// again still succeeds.
#[tokio::test]
async fn test_deleted_outside_configuration() {
    let ctx = TestContext::new(1004);
    let basic = ctx.declared("testing", basic_members(&ctx));
    let id = ctx.reconciler.create(&basic).await.unwrap().id.unwrap();

    ctx.api.clear().await;

    assert!(ctx.reconciler.read(&id).await.unwrap().is_none());
    ctx.reconciler.delete(&id).await.unwrap();
}
