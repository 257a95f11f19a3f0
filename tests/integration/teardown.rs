//! Teardown tests: declaring an empty membership empties the set.

use crate::common::TestContext;
use resource_set_reconciler::ApiOperation;
use resource_set_reconciler::MemberSet;

#[tokio::test]
async fn test_empty_declaration_removes_everything() {
    let ctx = TestContext::new(4001);
    let declared = ctx.declared("testing", ctx.members(&["a", "b"]));
    let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();

    let actual = ctx.reconciler.fetch_all_members(&id).await.unwrap();
    let diff = ctx.reconciler.compute_diff(&MemberSet::new(), &actual);
    assert!(diff.additions.is_empty());
    assert_eq!(diff.removals, ctx.members(&["a", "b"]));

    ctx.reconciler.apply_diff(&id, diff).await.unwrap();

    assert!(ctx.reconciler.fetch_all_members(&id).await.unwrap().is_empty());
    // The set itself survives with its label
    let state = ctx.reconciler.read(&id).await.unwrap().unwrap();
    assert_eq!(state.label.as_deref(), Some(ctx.resource_name().as_str()));
    assert_eq!(state.member_count(), 0);
}

/// Emptying through `update` and then deleting leaves nothing behind.
#[tokio::test]
async fn test_empty_then_delete() {
    let ctx = TestContext::new(4002);
    let declared = ctx.declared("testing", ctx.members(&["a", "b"]));
    let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();

    let empty = ctx.declared("testing", MemberSet::new());
    let state = ctx.reconciler.update(&id, &empty).await.unwrap();
    assert_eq!(state.member_count(), 0);
    assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 1);

    ctx.reconciler.delete(&id).await.unwrap();
    assert_eq!(ctx.api.stats().await.resource_set_count, 0);
}
